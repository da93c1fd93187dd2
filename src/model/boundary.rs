// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::geometry::{Geometry, LatLng};
use super::ids::{BoundaryId, SiteId};

/// A named geofence stored for a site.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    boundary_id: BoundaryId,
    site_id: SiteId,
    name: SmolStr,
    geometry: Geometry,
    is_default: bool,
}

impl BoundaryRecord {
    pub fn new(
        boundary_id: BoundaryId,
        site_id: SiteId,
        name: impl Into<SmolStr>,
        geometry: Geometry,
        is_default: bool,
    ) -> Self {
        Self {
            boundary_id,
            site_id,
            name: name.into(),
            geometry,
            is_default,
        }
    }

    pub fn boundary_id(&self) -> &BoundaryId {
        &self.boundary_id
    }

    pub fn site_id(&self) -> &SiteId {
        &self.site_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }
}

/// Ordered boundary cache for one site.
///
/// Order is insertion (creation) order; default reassignment and selection fallback depend on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryList {
    records: Vec<BoundaryRecord>,
}

impl BoundaryList {
    pub fn new(records: Vec<BoundaryRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundaryRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&BoundaryRecord> {
        self.records.first()
    }

    pub fn get(&self, boundary_id: &BoundaryId) -> Option<&BoundaryRecord> {
        self.records
            .iter()
            .find(|record| record.boundary_id() == boundary_id)
    }

    pub fn get_mut(&mut self, boundary_id: &BoundaryId) -> Option<&mut BoundaryRecord> {
        self.records
            .iter_mut()
            .find(|record| record.boundary_id() == boundary_id)
    }

    pub fn contains(&self, boundary_id: &BoundaryId) -> bool {
        self.get(boundary_id).is_some()
    }

    pub fn push(&mut self, record: BoundaryRecord) {
        self.records.push(record);
    }

    pub fn remove(&mut self, boundary_id: &BoundaryId) -> Option<BoundaryRecord> {
        let index = self
            .records
            .iter()
            .position(|record| record.boundary_id() == boundary_id)?;
        Some(self.records.remove(index))
    }

    pub fn default_id(&self) -> Option<&BoundaryId> {
        self.records
            .iter()
            .find(|record| record.is_default())
            .map(BoundaryRecord::boundary_id)
    }

    /// Marks exactly `boundary_id` as default. Returns `false` (and changes nothing) if unknown.
    pub fn set_default(&mut self, boundary_id: &BoundaryId) -> bool {
        if !self.contains(boundary_id) {
            return false;
        }
        for record in &mut self.records {
            let is_target = record.boundary_id() == boundary_id;
            record.set_default(is_target);
        }
        true
    }

    pub fn default_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_default()).count()
    }

    pub fn containing<'a>(&'a self, point: &'a LatLng) -> impl Iterator<Item = &'a BoundaryRecord> {
        self.records
            .iter()
            .filter(move |record| record.geometry().contains(point))
    }
}

impl<'a> IntoIterator for &'a BoundaryList {
    type Item = &'a BoundaryRecord;
    type IntoIter = std::slice::Iter<'a, BoundaryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
