// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::f64::consts::PI;
use std::fmt;

/// Mean earth radius used for distances and areas.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

const MIN_POLYGON_VERTICES: usize = 3;

/// Planar area (square degrees) at or below which a polygon counts as flat.
const MIN_POLYGON_AREA_DEG2: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance (haversine).
    pub fn distance_meters(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * h.min(1.0).sqrt().asin()
    }
}

/// Axis-aligned lat/lng box. `west > east` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    fn lng_span_degrees(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.east - self.west + 360.0
        } else {
            self.east - self.west
        }
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        if point.lat < self.south || point.lat > self.north {
            return false;
        }
        if self.crosses_antimeridian() {
            point.lng >= self.west || point.lng <= self.east
        } else {
            point.lng >= self.west && point.lng <= self.east
        }
    }

    fn validate(&self) -> Result<(), GeometryError> {
        for corner in [
            LatLng::new(self.north, self.east),
            LatLng::new(self.south, self.west),
        ] {
            if !corner.is_valid() {
                return Err(GeometryError::InvalidCoordinate {
                    lat: corner.lat,
                    lng: corner.lng,
                });
            }
        }
        if self.north < self.south {
            return Err(GeometryError::InvertedBounds {
                north: self.north,
                south: self.south,
            });
        }
        if self.north == self.south || self.east == self.west {
            return Err(GeometryError::DegenerateBounds);
        }
        Ok(())
    }
}

/// Shape tag carried by geometries and overlay handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Polygon,
    Rectangle,
    Circle,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [Self::Polygon, Self::Rectangle, Self::Circle];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polygon => "polygon",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized boundary geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon { path: Vec<LatLng> },
    Rectangle { bounds: Bounds },
    Circle { center: LatLng, radius_meters: f64 },
}

impl Geometry {
    pub fn polygon(path: impl Into<Vec<LatLng>>) -> Self {
        Self::Polygon { path: path.into() }
    }

    pub fn rectangle(bounds: Bounds) -> Self {
        Self::Rectangle { bounds }
    }

    pub fn circle(center: LatLng, radius_meters: f64) -> Self {
        Self::Circle {
            center,
            radius_meters,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Polygon { .. } => GeometryKind::Polygon,
            Self::Rectangle { .. } => GeometryKind::Rectangle,
            Self::Circle { .. } => GeometryKind::Circle,
        }
    }

    /// Checks the constraints a drawable overlay must satisfy.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Polygon { path } => {
                if path.len() < MIN_POLYGON_VERTICES {
                    return Err(GeometryError::TooFewVertices { found: path.len() });
                }
                if let Some(bad) = path.iter().find(|point| !point.is_valid()) {
                    return Err(GeometryError::InvalidCoordinate {
                        lat: bad.lat,
                        lng: bad.lng,
                    });
                }
                if planar_area_deg2(path) <= MIN_POLYGON_AREA_DEG2 {
                    return Err(GeometryError::ZeroArea);
                }
                Ok(())
            }
            Self::Rectangle { bounds } => bounds.validate(),
            Self::Circle {
                center,
                radius_meters,
            } => {
                if !center.is_valid() {
                    return Err(GeometryError::InvalidCoordinate {
                        lat: center.lat,
                        lng: center.lng,
                    });
                }
                if !radius_meters.is_finite() || *radius_meters <= 0.0 {
                    return Err(GeometryError::InvalidRadius {
                        radius: *radius_meters,
                    });
                }
                Ok(())
            }
        }
    }

    /// Smallest lat/lng box enclosing the shape.
    ///
    /// Polygon boxes are computed in plain lat/lng space and never cross the antimeridian.
    pub fn bounding_box(&self) -> Bounds {
        match self {
            Self::Polygon { path } => {
                let mut bounds = Bounds::new(f64::MIN, f64::MAX, f64::MIN, f64::MAX);
                for point in path {
                    bounds.north = bounds.north.max(point.lat);
                    bounds.south = bounds.south.min(point.lat);
                    bounds.east = bounds.east.max(point.lng);
                    bounds.west = bounds.west.min(point.lng);
                }
                bounds
            }
            Self::Rectangle { bounds } => *bounds,
            Self::Circle {
                center,
                radius_meters,
            } => {
                let dlat = (radius_meters / EARTH_RADIUS_METERS).to_degrees();
                let north = (center.lat + dlat).min(90.0);
                let south = (center.lat - dlat).max(-90.0);
                let cos_lat = center.lat.to_radians().cos();
                if cos_lat <= f64::EPSILON || dlat / cos_lat >= 180.0 {
                    return Bounds::new(north, south, 180.0, -180.0);
                }
                let dlng = dlat / cos_lat;
                Bounds::new(
                    north,
                    south,
                    wrap_lng(center.lng + dlng),
                    wrap_lng(center.lng - dlng),
                )
            }
        }
    }

    /// Point-in-geofence test. Edges count as inside for rectangles and circles.
    pub fn contains(&self, point: &LatLng) -> bool {
        match self {
            Self::Polygon { path } => polygon_contains(path, point),
            Self::Rectangle { bounds } => bounds.contains(point),
            Self::Circle {
                center,
                radius_meters,
            } => center.distance_meters(point) <= *radius_meters,
        }
    }

    /// Approximate surface area on a spherical earth.
    pub fn area_square_meters(&self) -> f64 {
        match self {
            Self::Polygon { path } => spherical_polygon_area(path),
            Self::Rectangle { bounds } => {
                let north = bounds.north.to_radians().sin();
                let south = bounds.south.to_radians().sin();
                let lng_span = bounds.lng_span_degrees().to_radians();
                EARTH_RADIUS_METERS * EARTH_RADIUS_METERS * (north - south).abs() * lng_span
            }
            Self::Circle { radius_meters, .. } => PI * radius_meters * radius_meters,
        }
    }
}

fn wrap_lng(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

fn polygon_contains(path: &[LatLng], point: &LatLng) -> bool {
    if path.len() < MIN_POLYGON_VERTICES {
        return false;
    }

    let mut inside = false;
    let mut j = path.len() - 1;
    for i in 0..path.len() {
        let a = path[i];
        let b = path[j];
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let lng_at = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
            if point.lng < lng_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace area in lat/lng space; only used to spot flat rings.
fn planar_area_deg2(path: &[LatLng]) -> f64 {
    let twice: f64 = path
        .iter()
        .zip(path.iter().cycle().skip(1))
        .map(|(a, b)| a.lng * b.lat - b.lng * a.lat)
        .sum();
    (twice / 2.0).abs()
}

fn spherical_polygon_area(path: &[LatLng]) -> f64 {
    if path.len() < MIN_POLYGON_VERTICES {
        return 0.0;
    }

    let mut total = 0.0;
    for (i, a) in path.iter().enumerate() {
        let b = &path[(i + 1) % path.len()];
        let dlng = (b.lng - a.lng).to_radians();
        total += dlng * (2.0 + a.lat.to_radians().sin() + b.lat.to_radians().sin());
    }
    (total * EARTH_RADIUS_METERS * EARTH_RADIUS_METERS / 2.0).abs()
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    TooFewVertices { found: usize },
    InvalidCoordinate { lat: f64, lng: f64 },
    InvertedBounds { north: f64, south: f64 },
    DegenerateBounds,
    ZeroArea,
    InvalidRadius { radius: f64 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewVertices { found } => write!(
                f,
                "polygon needs at least {MIN_POLYGON_VERTICES} vertices (found {found})"
            ),
            Self::InvalidCoordinate { lat, lng } => {
                write!(f, "coordinate out of range (lat={lat}, lng={lng})")
            }
            Self::InvertedBounds { north, south } => {
                write!(f, "rectangle north is below south (north={north}, south={south})")
            }
            Self::DegenerateBounds => f.write_str("rectangle has zero width or height"),
            Self::ZeroArea => f.write_str("polygon encloses no area"),
            Self::InvalidRadius { radius } => {
                write!(f, "circle radius must be positive (radius={radius})")
            }
        }
    }
}

impl std::error::Error for GeometryError {}
