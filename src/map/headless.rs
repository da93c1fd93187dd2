// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::{
    ListenerId, MapEvent, MapProvider, MutationKind, OverlayHandle, OverlayId, ProviderError,
};
use crate::model::{Bounds, Geometry, GeometryKind, LatLng};
use crate::visibility::BoundaryRender;

/// In-memory map surface.
///
/// Keeps overlay geometries, listener registrations and the last boundary sync so callers can
/// drive the editor without a real map SDK. The `complete_drawing`/`mutate` helpers play the
/// part of the user's pointer.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_overlay: u64,
    next_listener: u64,
    overlays: BTreeMap<OverlayId, Geometry>,
    listeners: BTreeMap<ListenerId, OverlayId>,
    drawing: Option<GeometryKind>,
    synced: Vec<BoundaryRender>,
    sync_count: usize,
    reject_next_create: Option<String>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drawing(&self) -> Option<GeometryKind> {
        self.drawing
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlay_geometry(&self, overlay: OverlayId) -> Option<&Geometry> {
        self.overlays.get(&overlay)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self, overlay: OverlayId) -> bool {
        self.listeners.values().any(|listened| *listened == overlay)
    }

    pub fn synced(&self) -> &[BoundaryRender] {
        &self.synced
    }

    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    /// Makes the next `create_overlay` call fail.
    pub fn reject_next_create(&mut self, reason: impl Into<String>) {
        self.reject_next_create = Some(reason.into());
    }

    /// Finishes the pending draw with `geometry`.
    pub fn complete_drawing(&mut self, geometry: Geometry) -> Result<MapEvent, ProviderError> {
        let kind = geometry.kind();
        match self.drawing {
            Some(expected) if expected == kind => {}
            _ => return Err(ProviderError::DrawingUnavailable { kind }),
        }
        self.drawing = None;
        let handle = self.insert_overlay(geometry);
        Ok(MapEvent::OverlayComplete(handle))
    }

    /// Changes an overlay in place, the way an SDK does while the user drags.
    ///
    /// Returns the event the SDK would emit, or `None` if nobody listens to that overlay.
    pub fn mutate(
        &mut self,
        overlay: OverlayId,
        geometry: Geometry,
        mutation: MutationKind,
    ) -> Result<Option<MapEvent>, ProviderError> {
        let Some(current) = self.overlays.get_mut(&overlay) else {
            return Err(ProviderError::UnknownOverlay { overlay });
        };
        if current.kind() != geometry.kind() {
            return Err(ProviderError::KindMismatch {
                expected: current.kind(),
                found: geometry.kind(),
            });
        }
        *current = geometry;

        if !self.has_listeners(overlay) {
            return Ok(None);
        }
        Ok(Some(MapEvent::Mutated { overlay, mutation }))
    }

    fn insert_overlay(&mut self, geometry: Geometry) -> OverlayHandle {
        self.next_overlay += 1;
        let id = OverlayId::new(self.next_overlay);
        let kind = geometry.kind();
        self.overlays.insert(id, geometry);
        OverlayHandle::new(id, kind)
    }
}

impl MapProvider for HeadlessMap {
    fn start_drawing(&mut self, kind: GeometryKind) -> Result<(), ProviderError> {
        self.drawing = Some(kind);
        Ok(())
    }

    fn stop_drawing(&mut self) {
        self.drawing = None;
    }

    fn create_overlay(&mut self, geometry: &Geometry) -> Result<OverlayHandle, ProviderError> {
        if let Some(reason) = self.reject_next_create.take() {
            return Err(ProviderError::Rejected {
                kind: geometry.kind(),
                reason,
            });
        }
        Ok(self.insert_overlay(geometry.clone()))
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        let id = handle.id();
        self.overlays.remove(&id);
        self.listeners.retain(|_, overlay| *overlay != id);
    }

    fn polygon_path(&self, overlay: OverlayId) -> Option<Vec<LatLng>> {
        match self.overlays.get(&overlay)? {
            Geometry::Polygon { path } => Some(path.clone()),
            _ => None,
        }
    }

    fn rectangle_bounds(&self, overlay: OverlayId) -> Option<Bounds> {
        match self.overlays.get(&overlay)? {
            Geometry::Rectangle { bounds } => Some(*bounds),
            _ => None,
        }
    }

    fn circle_shape(&self, overlay: OverlayId) -> Option<(LatLng, f64)> {
        match self.overlays.get(&overlay)? {
            Geometry::Circle {
                center,
                radius_meters,
            } => Some((*center, *radius_meters)),
            _ => None,
        }
    }

    fn attach_listeners(&mut self, overlay: OverlayId) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId::new(self.next_listener);
        self.listeners.insert(id, overlay);
        id
    }

    fn detach_listeners(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn sync_boundaries(&mut self, renders: &[BoundaryRender]) {
        self.synced = renders.to_vec();
        self.sync_count += 1;
    }
}
