// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted boundary wire format (JSON).

pub mod wire;

pub use wire::{
    boundary_from_json, boundary_to_json, wire_schema, BoundaryJson, BoundsJson, GeometryJson,
    LatLngJson, WireError,
};
