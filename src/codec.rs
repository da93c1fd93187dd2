// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geometry codec: normalized [`Geometry`] values to and from provider overlays.

use std::fmt;

use crate::map::{MapProvider, OverlayHandle, ProviderError};
use crate::model::{Geometry, GeometryError, GeometryKind};

/// Reads the exact geometry of an overlay, dispatching on the handle's shape tag.
pub fn to_normalized<P>(provider: &P, handle: &OverlayHandle) -> Result<Geometry, ProviderError>
where
    P: MapProvider + ?Sized,
{
    let overlay = handle.id();
    let geometry = match handle.kind() {
        GeometryKind::Polygon => provider.polygon_path(overlay).map(Geometry::polygon),
        GeometryKind::Rectangle => provider.rectangle_bounds(overlay).map(Geometry::rectangle),
        GeometryKind::Circle => provider
            .circle_shape(overlay)
            .map(|(center, radius_meters)| Geometry::circle(center, radius_meters)),
    };
    geometry.ok_or(ProviderError::UnknownOverlay { overlay })
}

/// Builds a fresh overlay from `geometry`. Never touches existing overlays.
pub fn from_normalized<P>(
    provider: &mut P,
    geometry: &Geometry,
) -> Result<OverlayHandle, CloneError>
where
    P: MapProvider + ?Sized,
{
    geometry.validate().map_err(CloneError::InvalidGeometry)?;

    let handle = provider
        .create_overlay(geometry)
        .map_err(CloneError::Provider)?;

    if handle.kind() != geometry.kind() {
        let found = handle.kind();
        provider.remove_overlay(handle);
        return Err(CloneError::Provider(ProviderError::KindMismatch {
            expected: geometry.kind(),
            found,
        }));
    }

    Ok(handle)
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloneError {
    InvalidGeometry(GeometryError),
    Provider(ProviderError),
}

impl fmt::Display for CloneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry(source) => write!(f, "cannot rebuild overlay: {source}"),
            Self::Provider(source) => write!(f, "cannot rebuild overlay: {source}"),
        }
    }
}

impl std::error::Error for CloneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGeometry(source) => Some(source),
            Self::Provider(source) => Some(source),
        }
    }
}
