// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Sites own an ordered list of boundaries; each boundary carries one normalized geometry.

pub mod boundary;
pub mod geometry;
pub mod ids;

pub use boundary::{BoundaryList, BoundaryRecord};
pub use geometry::{Bounds, Geometry, GeometryError, GeometryKind, LatLng, EARTH_RADIUS_METERS};
pub use ids::{BoundaryId, Id, IdError, IdKind, SiteId, SEQ_SEPARATOR};
