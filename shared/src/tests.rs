//! Tests for the shared domain types
//!
//! Covers:
//! - Coordinate validation and its `[lng, lat]` wire form
//! - Path structural equality used for candidate deduplication
//! - GeoFeature parsing and risk decoration
//! - Wire names of the route records

use serde_json::json;

use crate::types::{
    CandidatePath, Coordinate, CoordinateError, GeoFeature, MergedRoute, Path, RealizedRoute,
    RiskWeight, RouteProfile, RouteRequest,
};

fn coord(lng: f64, lat: f64) -> Coordinate {
    Coordinate::new(lng, lat).unwrap()
}

fn path(points: &[[f64; 2]]) -> Path {
    Path::new(points.iter().map(|p| coord(p[0], p[1])).collect())
}

// ============================================================================
// Coordinate
// ============================================================================

#[test]
fn test_coordinate_accepts_valid_range() {
    let c = coord(-0.1, 51.5);
    assert_eq!(c.lng(), -0.1);
    assert_eq!(c.lat(), 51.5);
    assert!(Coordinate::new(180.0, -90.0).is_ok());
}

#[test]
fn test_coordinate_rejects_out_of_range() {
    assert_eq!(
        Coordinate::new(181.0, 0.0),
        Err(CoordinateError::LongitudeOutOfRange(181.0))
    );
    assert_eq!(
        Coordinate::new(0.0, -91.0),
        Err(CoordinateError::LatitudeOutOfRange(-91.0))
    );
    assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(CoordinateError::NotFinite));
}

#[test]
fn test_coordinate_serializes_as_pair() {
    let value = serde_json::to_value(coord(-0.12, 51.51)).unwrap();
    assert_eq!(value, json!([-0.12, 51.51]));

    let back: Coordinate = serde_json::from_value(json!([3.0, 4.0])).unwrap();
    assert_eq!(back, coord(3.0, 4.0));
}

#[test]
fn test_coordinate_deserialization_validates() {
    assert!(serde_json::from_value::<Coordinate>(json!([200.0, 0.0])).is_err());
    assert!(serde_json::from_value::<Coordinate>(json!([1.0])).is_err());
    assert!(serde_json::from_value::<Coordinate>(json!([1.0, 2.0, 3.0])).is_err());
}

#[test]
fn test_coordinate_from_position() {
    assert_eq!(Coordinate::from_position(&[1.0, 2.0]), Ok(coord(1.0, 2.0)));
    assert_eq!(Coordinate::from_position(&[1.0, 2.0, 300.0]), Ok(coord(1.0, 2.0)));
    assert_eq!(Coordinate::from_position(&[1.0]), Err(CoordinateError::ShortPosition(1)));
    assert_eq!(
        Coordinate::from_position(&[0.0, 95.0, 1.0]),
        Err(CoordinateError::LatitudeOutOfRange(95.0))
    );
}

#[test]
fn test_haversine_one_degree_latitude() {
    let d = coord(0.0, 0.0).haversine_m(&coord(0.0, 1.0));
    assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    assert_eq!(coord(5.0, 5.0).haversine_m(&coord(5.0, 5.0)), 0.0);
}

// ============================================================================
// Path
// ============================================================================

#[test]
fn test_same_geometry_identical_paths() {
    let a = path(&[[0.0, 0.0], [0.0, 1.0], [0.0, 2.0]]);
    let b = path(&[[0.0, 0.0], [0.0, 1.0], [0.0, 2.0]]);
    assert!(a.same_geometry(&b));
}

#[test]
fn test_same_geometry_respects_order() {
    let a = path(&[[0.0, 0.0], [0.0, 1.0]]);
    let b = path(&[[0.0, 1.0], [0.0, 0.0]]);
    assert!(!a.same_geometry(&b));
}

#[test]
fn test_same_geometry_length_mismatch() {
    let a = path(&[[0.0, 0.0], [0.0, 1.0]]);
    let b = path(&[[0.0, 0.0], [0.0, 1.0], [0.0, 1.0]]);
    assert!(!a.same_geometry(&b));
    assert!(Path::default().same_geometry(&Path::default()));
}

#[test]
fn test_same_geometry_ignores_signed_zero() {
    let a = path(&[[0.0, 0.0]]);
    let b = path(&[[-0.0, 0.0]]);
    assert!(a.same_geometry(&b));
}

// ============================================================================
// GeoFeature
// ============================================================================

#[test]
fn test_feature_point_extracted_from_geometry() {
    let feature: GeoFeature = serde_json::from_value(json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [-0.1, 51.5] },
        "properties": { "name": "Bank" }
    }))
    .unwrap();

    assert_eq!(feature.coordinate(), coord(-0.1, 51.5));
}

#[test]
fn test_bare_geometry_point_extracted() {
    let feature: GeoFeature =
        serde_json::from_value(json!({ "type": "Point", "coordinates": [2.35, 48.85] })).unwrap();
    assert_eq!(feature.coordinate(), coord(2.35, 48.85));
}

#[test]
fn test_feature_without_point_rejected() {
    let missing = serde_json::from_value::<GeoFeature>(json!({ "type": "Feature", "properties": {} }));
    assert!(missing.is_err());

    let line = serde_json::from_value::<GeoFeature>(json!({
        "type": "LineString",
        "coordinates": [[0.0, 0.0], [1.0, 1.0]]
    }));
    assert!(line.is_err());
}

#[test]
fn test_with_risk_keeps_existing_properties() {
    let feature: GeoFeature = serde_json::from_value(json!({
        "type": "Feature",
        "id": 7,
        "geometry": { "type": "Point", "coordinates": [-0.1, 51.5] },
        "properties": { "name": "Bank" }
    }))
    .unwrap();

    let decorated = serde_json::to_value(feature.with_risk(4.5)).unwrap();
    assert_eq!(
        decorated,
        json!({
            "type": "Feature",
            "id": 7,
            "geometry": { "type": "Point", "coordinates": [-0.1, 51.5] },
            "properties": { "name": "Bank", "risk": 4.5 }
        })
    );
}

#[test]
fn test_with_risk_creates_properties_when_null() {
    let feature: GeoFeature = serde_json::from_value(json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
        "properties": null
    }))
    .unwrap();

    let decorated = serde_json::to_value(feature.with_risk(1.0)).unwrap();
    assert_eq!(decorated["properties"], json!({ "risk": 1.0 }));
}

#[test]
fn test_with_risk_on_bare_geometry() {
    let feature: GeoFeature =
        serde_json::from_value(json!({ "type": "Point", "coordinates": [0.0, 0.0] })).unwrap();

    let decorated = serde_json::to_value(feature.with_risk(0.25)).unwrap();
    assert_eq!(
        decorated,
        json!({ "type": "Point", "coordinates": [0.0, 0.0], "risk": 0.25 })
    );
}

#[test]
fn test_feature_position_with_altitude() {
    let raw = json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [-0.1, 51.5, 12.0] },
        "properties": { "name": "Bank" }
    });
    let feature: GeoFeature = serde_json::from_value(raw).unwrap();
    assert_eq!(feature.coordinate(), coord(-0.1, 51.5));

    // altitude survives decoration
    let decorated = serde_json::to_value(feature.with_risk(2.0)).unwrap();
    assert_eq!(decorated["geometry"]["coordinates"], json!([-0.1, 51.5, 12.0]));
    assert_eq!(decorated["properties"], json!({ "name": "Bank", "risk": 2.0 }));
}

#[test]
fn test_feature_short_position_is_missing_point() {
    let result = GeoFeature::from_map(
        json!({ "type": "Point", "coordinates": [1.0] })
            .as_object()
            .unwrap()
            .clone(),
    );
    assert_eq!(result, Err(CoordinateError::MissingPoint));
}

// ============================================================================
// Route records
// ============================================================================

#[test]
fn test_route_request_from_candidate() {
    let candidate = CandidatePath {
        path: path(&[[0.0, 0.0], [1.0, 1.0]]),
        risk_weight: 3.5,
    };

    let request = RouteRequest::from(&candidate);
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({ "path": [[0.0, 0.0], [1.0, 1.0]], "riskWeight": 3.5 })
    );
}

#[test]
fn test_realized_route_route_defaults_to_null() {
    let realized: RealizedRoute =
        serde_json::from_value(json!({ "path": [[0.0, 0.0]] })).unwrap();
    assert!(realized.route.is_null());
    assert_eq!(realized.path.len(), 1);
}

#[test]
fn test_merged_route_flattens_profile() {
    let merged = MergedRoute {
        profile: RouteProfile {
            samples: 2,
            total_risk: 3.0,
            mean_risk: 1.5,
            peak_risk: 2.0,
            peak_index: Some(1),
        },
        risk_weight: 3.0,
        search_weights: vec![RiskWeight::LOW, RiskWeight::HIGH],
        route: json!({ "steps": [] }),
        path: path(&[[0.0, 0.0], [0.0, 1.0]]),
    };

    assert_eq!(
        serde_json::to_value(&merged).unwrap(),
        json!({
            "samples": 2,
            "totalRisk": 3.0,
            "meanRisk": 1.5,
            "peakRisk": 2.0,
            "peakIndex": 1,
            "riskWeight": 3.0,
            "searchWeights": [2.0, 10.0],
            "route": { "steps": [] },
            "path": [[0.0, 0.0], [0.0, 1.0]]
        })
    );
}

#[test]
fn test_realized_path_with_altitude() {
    let realized: RealizedRoute = serde_json::from_value(json!({
        "path": [[-0.1, 51.5, 3.0], [-0.12, 51.51, 4.5]],
        "route": { "id": "r1" }
    }))
    .unwrap();

    assert_eq!(realized.path, path(&[[-0.1, 51.5], [-0.12, 51.51]]));
    assert_eq!(
        serde_json::to_value(&realized.path).unwrap(),
        json!([[-0.1, 51.5], [-0.12, 51.51]])
    );
}

#[test]
fn test_path_rejects_short_positions() {
    assert!(serde_json::from_value::<Path>(json!([[0.0, 0.0], [1.0]])).is_err());
    assert!(serde_json::from_value::<Path>(json!([[0.0, 100.0]])).is_err());
}
