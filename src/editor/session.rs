// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::history::ShapeHistory;
use crate::map::{ListenerId, MapProvider, OverlayHandle};
use crate::model::{BoundaryId, GeometryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Idle,
    Drawing,
    Creating,
    Editing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Drawing => "drawing",
            Self::Creating => "creating",
            Self::Editing => "editing",
        })
    }
}

/// The working overlay together with its listener registration and history.
#[derive(Debug)]
pub(crate) struct ActiveShape {
    overlay: OverlayHandle,
    listener: ListenerId,
    pub(crate) history: ShapeHistory,
}

impl ActiveShape {
    /// Takes ownership of `overlay` and starts listening to it.
    pub(crate) fn open<P>(provider: &mut P, overlay: OverlayHandle, history: ShapeHistory) -> Self
    where
        P: MapProvider + ?Sized,
    {
        let listener = provider.attach_listeners(overlay.id());
        Self {
            overlay,
            listener,
            history,
        }
    }

    pub(crate) fn overlay(&self) -> &OverlayHandle {
        &self.overlay
    }

    /// Swaps in a freshly built overlay; the previous one is detached and removed.
    pub(crate) fn replace_overlay<P>(&mut self, provider: &mut P, overlay: OverlayHandle)
    where
        P: MapProvider + ?Sized,
    {
        provider.detach_listeners(self.listener);
        let previous = std::mem::replace(&mut self.overlay, overlay);
        provider.remove_overlay(previous);
        self.listener = provider.attach_listeners(self.overlay.id());
    }

    pub(crate) fn release<P>(self, provider: &mut P)
    where
        P: MapProvider + ?Sized,
    {
        provider.detach_listeners(self.listener);
        provider.remove_overlay(self.overlay);
    }
}

#[derive(Debug)]
pub(crate) enum EditSession {
    Drawing {
        kind: GeometryKind,
    },
    Creating(ActiveShape),
    Editing {
        target: BoundaryId,
        shape: ActiveShape,
    },
}

impl EditSession {
    pub(crate) fn mode(&self) -> Mode {
        match self {
            Self::Drawing { .. } => Mode::Drawing,
            Self::Creating(_) => Mode::Creating,
            Self::Editing { .. } => Mode::Editing,
        }
    }

    pub(crate) fn target(&self) -> Option<&BoundaryId> {
        match self {
            Self::Editing { target, .. } => Some(target),
            _ => None,
        }
    }

    pub(crate) fn shape(&self) -> Option<&ActiveShape> {
        match self {
            Self::Drawing { .. } => None,
            Self::Creating(shape) | Self::Editing { shape, .. } => Some(shape),
        }
    }

    pub(crate) fn shape_mut(&mut self) -> Option<&mut ActiveShape> {
        match self {
            Self::Drawing { .. } => None,
            Self::Creating(shape) | Self::Editing { shape, .. } => Some(shape),
        }
    }

    /// Tears the session down: stops draw capture, detaches listeners, removes the overlay.
    pub(crate) fn release<P>(self, provider: &mut P)
    where
        P: MapProvider + ?Sized,
    {
        match self {
            Self::Drawing { .. } => provider.stop_drawing(),
            Self::Creating(shape) | Self::Editing { shape, .. } => shape.release(provider),
        }
    }
}
