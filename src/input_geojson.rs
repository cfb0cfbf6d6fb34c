// Ingestion of the warehouse payload delivered by the map-drawing shell.
// The payload is loosely structured (the drawing widget emits plain
// GeoJSON), so everything is validated and converted exactly once here;
// the geometry pipeline only ever sees the strict kernel_in types.

use bevy::log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::kernel_in::{Footprint, GeographicVertex, Warehouse, WarehouseKind};

#[derive(Debug, Deserialize)]
pub struct WarehousePayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub height: Option<f64>,
    pub footprint: Option<FootprintPayload>,
}

#[derive(Debug, Deserialize)]
pub struct FootprintPayload {
    pub geometry: Option<GeometryPayload>,
}

#[derive(Debug, Deserialize)]
pub struct GeometryPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub coordinates: Option<Value>,
}

pub fn warehouse_from_slice(bytes: &[u8]) -> Result<Warehouse, serde_json::Error> {
    let payload: WarehousePayload = serde_json::from_slice(bytes)?;
    Ok(ingest(payload))
}

pub fn warehouse_from_str(json: &str) -> Result<Warehouse, serde_json::Error> {
    warehouse_from_slice(json.as_bytes())
}

/// Converts the untyped payload into a `Warehouse`. A malformed or
/// missing footprint becomes `None` here and the default ground later;
/// it never travels further into the pipeline.
pub fn ingest(payload: WarehousePayload) -> Warehouse {
    let kind = match payload.kind.as_deref() {
        Some("closed") => WarehouseKind::Closed,
        Some("open") | None => WarehouseKind::Open,
        Some(other) => {
            warn!("unknown warehouse type {other:?}, treating as open");
            WarehouseKind::Open
        }
    };

    let footprint = payload
        .footprint
        .and_then(|footprint| footprint.geometry)
        .and_then(|geometry| first_ring(&geometry));

    if footprint.is_none() {
        warn!("payload carries no usable footprint ring");
    }

    Warehouse {
        kind,
        height: payload.height,
        footprint,
    }
}

/// Only the first ring of the first polygon is consumed, for Polygon
/// and MultiPolygon alike.
fn first_ring(geometry: &GeometryPayload) -> Option<Footprint> {
    let coordinates = geometry.coordinates.as_ref()?;
    let ring = match geometry.kind.as_deref() {
        Some("Polygon") => coordinates.get(0)?,
        Some("MultiPolygon") => coordinates.get(0)?.get(0)?,
        other => {
            warn!("unsupported geometry type {other:?}");
            return None;
        }
    };

    let vertices = ring_vertices(ring)?;
    Some(Footprint::new(vertices))
}

/// A ring must be an array of `[longitude, latitude]` number pairs.
/// Any malformed entry rejects the whole ring, not just the entry.
fn ring_vertices(ring: &Value) -> Option<Vec<GeographicVertex>> {
    let entries = ring.as_array()?;
    let mut vertices = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair = entry.as_array()?;
        let longitude = pair.first()?.as_f64()?;
        let latitude = pair.get(1)?.as_f64()?;
        vertices.push(GeographicVertex::new(longitude, latitude));
    }
    Some(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    static CLOSED_SQUARE: &str = r#"{
        "type": "closed",
        "height": 5,
        "footprint": { "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.0, 0.001], [0.001, 0.001], [0.001, 0.0], [0.0, 0.0]]]
        }}
    }"#;

    #[test]
    fn full_payload_is_ingested() {
        let warehouse = warehouse_from_str(CLOSED_SQUARE).unwrap();
        assert_eq!(warehouse.kind, WarehouseKind::Closed);
        assert_eq!(warehouse.height, Some(5.0));
        let footprint = warehouse.footprint.unwrap();
        assert_eq!(footprint.len(), 5);
        assert_eq!(footprint.vertices[2], GeographicVertex::new(0.001, 0.001));
    }

    #[test]
    fn multipolygon_takes_first_ring_of_first_polygon() {
        let json = r#"{
            "type": "open",
            "footprint": { "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]], [[[9.0, 9.0]]]]
            }}
        }"#;
        let warehouse = warehouse_from_str(json).unwrap();
        let footprint = warehouse.footprint.unwrap();
        assert_eq!(footprint.len(), 3);
        assert_eq!(footprint.vertices[0], GeographicVertex::new(1.0, 2.0));
    }

    #[test]
    fn missing_geometry_yields_no_footprint() {
        let warehouse = warehouse_from_str(r#"{ "type": "closed", "height": 3 }"#).unwrap();
        assert!(warehouse.footprint.is_none());

        let warehouse = warehouse_from_str(r#"{ "footprint": { "geometry": null } }"#).unwrap();
        assert!(warehouse.footprint.is_none());
    }

    #[test]
    fn malformed_ring_is_rejected_as_a_whole() {
        let json = r#"{
            "footprint": { "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], ["oops", 1.0], [1.0, 1.0]]]
            }}
        }"#;
        let warehouse = warehouse_from_str(json).unwrap();
        assert!(warehouse.footprint.is_none());
    }

    #[test]
    fn unknown_kind_falls_back_to_open() {
        let warehouse = warehouse_from_str(r#"{ "type": "roofless" }"#).unwrap();
        assert_eq!(warehouse.kind, WarehouseKind::Open);
    }
}
