// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence gateway contract for stored boundary records.
//!
//! Every call is a suspension point for the editor. Implementations own the stored default
//! invariant: `create` with `is_default` and `set_default` clear any prior default of the site
//! in the same step.

pub mod memory;

pub use memory::MemoryGateway;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use smol_str::SmolStr;

use crate::model::{BoundaryId, BoundaryRecord, Geometry, SiteId};
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPatch {
    pub name: SmolStr,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    List,
    Create,
    Update,
    Delete,
    SetDefault,
}

impl fmt::Display for GatewayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::SetDefault => "set_default",
        })
    }
}

#[allow(async_fn_in_trait)]
pub trait BoundaryGateway {
    /// Records for a site, in creation order.
    async fn list(&self, site_id: &SiteId) -> Result<Vec<BoundaryRecord>, GatewayError>;

    async fn create(
        &mut self,
        site_id: &SiteId,
        name: &str,
        geometry: &Geometry,
        is_default: bool,
    ) -> Result<BoundaryRecord, GatewayError>;

    async fn update(
        &mut self,
        boundary_id: &BoundaryId,
        patch: &BoundaryPatch,
    ) -> Result<(), GatewayError>;

    async fn delete(&mut self, boundary_id: &BoundaryId) -> Result<(), GatewayError>;

    async fn set_default(
        &mut self,
        site_id: &SiteId,
        boundary_id: &BoundaryId,
    ) -> Result<(), GatewayError>;
}

#[derive(Debug)]
pub enum GatewayError {
    NotFound { boundary_id: BoundaryId },
    WrongSite { boundary_id: BoundaryId, site_id: SiteId },
    Unavailable { operation: GatewayOp, reason: String },
    Timeout { operation: GatewayOp, after: Duration },
    Store(StoreError),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { boundary_id } => write!(f, "boundary {boundary_id} not found"),
            Self::WrongSite {
                boundary_id,
                site_id,
            } => write!(f, "boundary {boundary_id} does not belong to site {site_id}"),
            Self::Unavailable { operation, reason } => {
                write!(f, "{operation} failed: {reason}")
            }
            Self::Timeout { operation, after } => {
                write!(f, "{operation} timed out after {}ms", after.as_millis())
            }
            Self::Store(source) => write!(f, "store error: {source}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(source) => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(source: StoreError) -> Self {
        Self::Store(source)
    }
}

/// Awaits a gateway call, failing with [`GatewayError::Timeout`] once `timeout` elapses.
pub async fn with_timeout<T, F>(
    timeout: Option<Duration>,
    operation: GatewayOp,
    call: F,
) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match timeout {
        Some(after) => tokio::time::timeout(after, call)
            .await
            .map_err(|_| GatewayError::Timeout { operation, after })?,
        None => call.await,
    }
}
