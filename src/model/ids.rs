// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use smol_str::{format_smolstr, SmolStr};

/// Separates the site from the sequence number in ids minted by a gateway (`hq#12`).
pub const SEQ_SEPARATOR: char = '#';

/// Character rules for one kind of id.
pub trait IdKind {
    const LABEL: &'static str;

    /// Characters this kind reserves in addition to `/` and control characters.
    const RESERVED: &'static [char] = &[];
}

/// An opaque site or boundary id.
///
/// Every id is a non-empty file-name segment: no `/` and no control characters. Site ids
/// additionally reserve [`SEQ_SEPARATOR`], so a minted boundary id always splits back into its
/// site and sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: SmolStr,
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdKind> Id<T> {
    pub fn new(value: impl Into<SmolStr>) -> Result<Self, IdError> {
        let value = value.into();
        check::<T>(&value)?;
        Ok(Self::unchecked(value))
    }
}

impl<T> Id<T> {
    fn unchecked(value: SmolStr) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value.into()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T: IdKind> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<T: IdKind> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty { kind: &'static str },
    Forbidden { kind: &'static str, ch: char },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} must not be empty"),
            Self::Forbidden { kind, ch } => write!(f, "{kind} must not contain {ch:?}"),
        }
    }
}

impl std::error::Error for IdError {}

fn check<T: IdKind>(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty { kind: T::LABEL });
    }
    match value
        .chars()
        .find(|ch| *ch == '/' || ch.is_control() || T::RESERVED.contains(ch))
    {
        Some(ch) => Err(IdError::Forbidden { kind: T::LABEL, ch }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SiteIdTag {}

impl IdKind for SiteIdTag {
    const LABEL: &'static str = "site id";
    const RESERVED: &'static [char] = &[SEQ_SEPARATOR];
}

pub type SiteId = Id<SiteIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundaryIdTag {}

impl IdKind for BoundaryIdTag {
    const LABEL: &'static str = "boundary id";
}

/// Boundary ids are whatever the backend hands out; ids minted here look like `<site>#<seq>`.
pub type BoundaryId = Id<BoundaryIdTag>;

impl BoundaryId {
    /// The id of the `seq`-th boundary created in `site_id`.
    pub fn issued(site_id: &SiteId, seq: u64) -> Self {
        // A valid site id never holds the separator, '/' or control characters.
        Self::unchecked(format_smolstr!("{site_id}{SEQ_SEPARATOR}{seq}"))
    }

    /// Sequence number if this id was minted by [`BoundaryId::issued`] for `site_id`.
    pub fn issued_seq(&self, site_id: &SiteId) -> Option<u64> {
        let seq = self
            .as_str()
            .strip_prefix(site_id.as_str())?
            .strip_prefix(SEQ_SEPARATOR)?;
        if seq.starts_with('+') {
            return None;
        }
        seq.parse().ok()
    }
}
