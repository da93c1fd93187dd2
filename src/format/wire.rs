// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{BoundaryId, BoundaryRecord, Bounds, Geometry, IdError, LatLng, SiteId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LatLngJson {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundsJson {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Persisted geometry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeometryJson {
    Polygon { paths: Vec<LatLngJson> },
    Rectangle { bounds: BoundsJson },
    Circle { center: LatLngJson, radius: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundaryJson {
    pub id: String,
    pub site_id: String,
    pub name: String,
    pub geometry: GeometryJson,
    #[serde(default)]
    pub is_default: bool,
}

impl From<LatLng> for LatLngJson {
    fn from(point: LatLng) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
        }
    }
}

impl From<LatLngJson> for LatLng {
    fn from(point: LatLngJson) -> Self {
        LatLng::new(point.lat, point.lng)
    }
}

impl From<Bounds> for BoundsJson {
    fn from(bounds: Bounds) -> Self {
        Self {
            north: bounds.north,
            south: bounds.south,
            east: bounds.east,
            west: bounds.west,
        }
    }
}

impl From<BoundsJson> for Bounds {
    fn from(bounds: BoundsJson) -> Self {
        Bounds::new(bounds.north, bounds.south, bounds.east, bounds.west)
    }
}

impl From<&Geometry> for GeometryJson {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Polygon { path } => Self::Polygon {
                paths: path.iter().copied().map(LatLngJson::from).collect(),
            },
            Geometry::Rectangle { bounds } => Self::Rectangle {
                bounds: (*bounds).into(),
            },
            Geometry::Circle {
                center,
                radius_meters,
            } => Self::Circle {
                center: (*center).into(),
                radius: *radius_meters,
            },
        }
    }
}

/// Decoding is lossless and does not validate shape constraints; stored geometry that cannot
/// be drawn is reported when an overlay is built from it.
impl From<GeometryJson> for Geometry {
    fn from(geometry: GeometryJson) -> Self {
        match geometry {
            GeometryJson::Polygon { paths } => {
                Geometry::polygon(paths.into_iter().map(LatLng::from).collect::<Vec<_>>())
            }
            GeometryJson::Rectangle { bounds } => Geometry::rectangle(bounds.into()),
            GeometryJson::Circle { center, radius } => Geometry::circle(center.into(), radius),
        }
    }
}

pub fn boundary_to_json(record: &BoundaryRecord) -> BoundaryJson {
    BoundaryJson {
        id: record.boundary_id().to_string(),
        site_id: record.site_id().to_string(),
        name: record.name().to_owned(),
        geometry: record.geometry().into(),
        is_default: record.is_default(),
    }
}

pub fn boundary_from_json(boundary_json: BoundaryJson) -> Result<BoundaryRecord, WireError> {
    let boundary_id =
        BoundaryId::new(boundary_json.id.clone()).map_err(|source| WireError::InvalidId {
            field: "id",
            value: boundary_json.id.clone(),
            source,
        })?;
    let site_id =
        SiteId::new(boundary_json.site_id.clone()).map_err(|source| WireError::InvalidId {
            field: "site_id",
            value: boundary_json.site_id,
            source,
        })?;

    let name = boundary_json.name.trim();
    if name.is_empty() {
        return Err(WireError::EmptyName {
            boundary_id: boundary_json.id,
        });
    }

    Ok(BoundaryRecord::new(
        boundary_id,
        site_id,
        name,
        boundary_json.geometry.into(),
        boundary_json.is_default,
    ))
}

/// JSON Schema of a persisted boundary record (and its geometry union).
pub fn wire_schema() -> schemars::Schema {
    schemars::schema_for!(BoundaryJson)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
    EmptyName {
        boundary_id: String,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::EmptyName { boundary_id } => {
                write!(f, "boundary {boundary_id:?} has an empty name")
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            Self::EmptyName { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        boundary_from_json, boundary_to_json, wire_schema, BoundaryJson, GeometryJson, WireError,
    };
    use crate::model::{BoundaryId, BoundaryRecord, Bounds, Geometry, LatLng, SiteId};

    #[test]
    fn polygon_serializes_with_paths_key() {
        let geometry = Geometry::polygon(vec![
            LatLng::new(1.0, 2.0),
            LatLng::new(3.0, 4.0),
            LatLng::new(5.0, 6.0),
        ]);
        let value = serde_json::to_value(GeometryJson::from(&geometry)).expect("json");
        assert_eq!(
            value,
            json!({
                "type": "polygon",
                "paths": [{"lat": 1.0, "lng": 2.0}, {"lat": 3.0, "lng": 4.0}, {"lat": 5.0, "lng": 6.0}]
            })
        );
    }

    #[test]
    fn rectangle_and_circle_match_wire_shape() {
        let rectangle = Geometry::rectangle(Bounds::new(2.0, 1.0, 4.0, 3.0));
        assert_eq!(
            serde_json::to_value(GeometryJson::from(&rectangle)).expect("json"),
            json!({"type": "rectangle", "bounds": {"north": 2.0, "south": 1.0, "east": 4.0, "west": 3.0}})
        );

        let circle = Geometry::circle(LatLng::new(45.0, 15.0), 250.5);
        assert_eq!(
            serde_json::to_value(GeometryJson::from(&circle)).expect("json"),
            json!({"type": "circle", "center": {"lat": 45.0, "lng": 15.0}, "radius": 250.5})
        );
    }

    #[test]
    fn decodes_circle_from_wire_text() {
        let parsed: GeometryJson = serde_json::from_str(
            r#"{"type":"circle","center":{"lat":45.5,"lng":16.25},"radius":120}"#,
        )
        .expect("parse");
        assert_eq!(
            Geometry::from(parsed),
            Geometry::circle(LatLng::new(45.5, 16.25), 120.0)
        );
    }

    #[test]
    fn rejects_unknown_geometry_type() {
        let parsed = serde_json::from_str::<GeometryJson>(r#"{"type":"polyline","paths":[]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn boundary_json_defaults_is_default_to_false() {
        let parsed: BoundaryJson = serde_json::from_str(
            r#"{"id":"hq#1","site_id":"hq","name":"Gate","geometry":{"type":"circle","center":{"lat":1,"lng":2},"radius":3}}"#,
        )
        .expect("parse");
        let record = boundary_from_json(parsed).expect("record");
        assert!(!record.is_default());
        assert_eq!(record.name(), "Gate");
    }

    #[test]
    fn boundary_from_json_rejects_blank_name_and_bad_ids() {
        let mut json = boundary_to_json(&BoundaryRecord::new(
            BoundaryId::new("hq#1").expect("id"),
            SiteId::new("hq").expect("site"),
            "Yard",
            Geometry::circle(LatLng::new(0.0, 0.0), 5.0),
            true,
        ));

        json.name = "   ".to_owned();
        assert!(matches!(
            boundary_from_json(json.clone()),
            Err(WireError::EmptyName { .. })
        ));

        json.name = "Yard".to_owned();
        json.site_id = "a/b".to_owned();
        assert!(matches!(
            boundary_from_json(json),
            Err(WireError::InvalidId { field: "site_id", .. })
        ));
    }

    #[test]
    fn schema_describes_all_geometry_kinds() {
        let schema = serde_json::to_string(&wire_schema()).expect("schema json");
        for kind in ["polygon", "rectangle", "circle"] {
            assert!(schema.contains(kind), "schema misses {kind}: {schema}");
        }
    }
}
