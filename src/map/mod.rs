// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Map provider boundary.
//!
//! The provider owns native drawables; the editor only ever holds an [`OverlayHandle`], an
//! opaque id plus the shape tag assigned when the overlay was created.

pub mod headless;

pub use headless::HeadlessMap;

use std::fmt;

use crate::model::{Bounds, Geometry, GeometryKind, LatLng};
use crate::visibility::BoundaryRender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

/// Exclusive handle to one provider drawable.
///
/// Not `Clone`: a handle has exactly one owner, and dropping ownership goes through
/// [`MapProvider::remove_overlay`].
#[derive(Debug, PartialEq, Eq)]
pub struct OverlayHandle {
    id: OverlayId,
    kind: GeometryKind,
}

impl OverlayHandle {
    pub fn new(id: OverlayId, kind: GeometryKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Discrete geometry change reported by the provider for a listened overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    VertexSet,
    VertexInsert,
    VertexRemove,
    BoundsChanged,
    RadiusChanged,
    CenterChanged,
    DragEnd,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MapEvent {
    /// The user finished drawing; ownership of the new overlay moves to the receiver.
    OverlayComplete(OverlayHandle),
    Mutated {
        overlay: OverlayId,
        mutation: MutationKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    DrawingUnavailable { kind: GeometryKind },
    Rejected { kind: GeometryKind, reason: String },
    UnknownOverlay { overlay: OverlayId },
    KindMismatch { expected: GeometryKind, found: GeometryKind },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DrawingUnavailable { kind } => write!(f, "cannot start drawing a {kind}"),
            Self::Rejected { kind, reason } => {
                write!(f, "map provider rejected {kind} overlay: {reason}")
            }
            Self::UnknownOverlay { overlay } => write!(f, "unknown overlay {overlay}"),
            Self::KindMismatch { expected, found } => {
                write!(f, "overlay kind mismatch (expected {expected}, found {found})")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Rendering surface the editor drives.
pub trait MapProvider {
    /// Enters draw-capture mode; completion arrives later as [`MapEvent::OverlayComplete`].
    fn start_drawing(&mut self, kind: GeometryKind) -> Result<(), ProviderError>;

    fn stop_drawing(&mut self);

    /// Builds a new, independent overlay from a geometry.
    fn create_overlay(&mut self, geometry: &Geometry) -> Result<OverlayHandle, ProviderError>;

    fn remove_overlay(&mut self, handle: OverlayHandle);

    fn polygon_path(&self, overlay: OverlayId) -> Option<Vec<LatLng>>;

    fn rectangle_bounds(&self, overlay: OverlayId) -> Option<Bounds>;

    /// Center and radius in meters.
    fn circle_shape(&self, overlay: OverlayId) -> Option<(LatLng, f64)>;

    fn attach_listeners(&mut self, overlay: OverlayId) -> ListenerId;

    fn detach_listeners(&mut self, listener: ListenerId);

    /// Replaces every saved-boundary overlay with the given render list.
    fn sync_boundaries(&mut self, renders: &[BoundaryRender]);
}

impl<P: MapProvider + ?Sized> MapProvider for &mut P {
    fn start_drawing(&mut self, kind: GeometryKind) -> Result<(), ProviderError> {
        (**self).start_drawing(kind)
    }

    fn stop_drawing(&mut self) {
        (**self).stop_drawing()
    }

    fn create_overlay(&mut self, geometry: &Geometry) -> Result<OverlayHandle, ProviderError> {
        (**self).create_overlay(geometry)
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        (**self).remove_overlay(handle)
    }

    fn polygon_path(&self, overlay: OverlayId) -> Option<Vec<LatLng>> {
        (**self).polygon_path(overlay)
    }

    fn rectangle_bounds(&self, overlay: OverlayId) -> Option<Bounds> {
        (**self).rectangle_bounds(overlay)
    }

    fn circle_shape(&self, overlay: OverlayId) -> Option<(LatLng, f64)> {
        (**self).circle_shape(overlay)
    }

    fn attach_listeners(&mut self, overlay: OverlayId) -> ListenerId {
        (**self).attach_listeners(overlay)
    }

    fn detach_listeners(&mut self, listener: ListenerId) {
        (**self).detach_listeners(listener)
    }

    fn sync_boundaries(&mut self, renders: &[BoundaryRender]) {
        (**self).sync_boundaries(renders)
    }
}
