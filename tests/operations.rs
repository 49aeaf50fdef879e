//!
//! Integration tests exercising the public API end to end: resolving a
//! CRS by code, finding the operation between two CRSs, and applying it
//! to points.
//!

use approx::assert_abs_diff_eq;
use crsops::authority;
use crsops::crs::{Conversion, Crs, GeodeticCrs, ProjectedCrs};
use crsops::cs::CoordinateSystem;
use crsops::datum::GeodeticDatum;
use crsops::errors::Error;
use crsops::geodesic::Geodesic;
use crsops::operation_finder::find_operation;
use crsops::parameter::{ParameterValue, ParameterValueGroup};
use crsops::projections::{universal_zone, Polyconic};

fn deg(d: f64) -> f64 {
    d.to_radians()
}

#[test]
fn epsg_4326_to_crs_84_is_an_axis_swap() {
    let epsg4326 = authority::resolve_crs("EPSG:4326").unwrap();
    let crs84 = authority::resolve_crs("CRS:84").unwrap();

    let op = find_operation(&epsg4326, &crs84).unwrap();
    let out = op.math_transform.forward(&[40.0, -105.0]).unwrap();
    // EPSG:4326 is lat,lon; CRS:84 is lon,lat -- a pure axis swap.
    assert_abs_diff_eq!(out[0], -105.0);
    assert_abs_diff_eq!(out[1], 40.0);
}

#[test]
fn geodetic_to_pseudo_mercator_matches_known_values() {
    let base = Crs::Geodetic(GeodeticCrs::new("WGS 84 (CRS:84)", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d()).unwrap());
    let params = ParameterValueGroup::new()
        .with("false_easting", ParameterValue::linear(0.0))
        .with("false_northing", ParameterValue::linear(0.0));
    let conv = Conversion::new("Web Mercator", "Popular Visualisation Pseudo Mercator", params);
    let projected =
        Crs::Projected(ProjectedCrs::new("WGS 84 / Pseudo-Mercator", base.clone(), conv, CoordinateSystem::cartesian_2d()).unwrap());

    let op = find_operation(&base, &projected).unwrap();

    // `base`'s axes are in degrees (as EPSG:4326/CRS:84 actually are); the
    // operation's math transform normalises to radians internally before
    // calling the projection core.
    let origin = op.math_transform.forward(&[0.0, 0.0]).unwrap();
    assert_abs_diff_eq!(origin[0], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(origin[1], 0.0, epsilon = 1e-6);

    let at_45n = op.math_transform.forward(&[0.0, 45.0]).unwrap();
    assert_abs_diff_eq!(at_45n[1], 5_621_521.486, epsilon = 1e-2);
}

#[test]
fn polyconic_forward_matches_known_value() {
    let ellipsoid = crsops::ellipsoid::grs80();
    let projection = Polyconic::new(ellipsoid.es).unwrap();
    let params = crsops::projections::ConversionParams {
        central_meridian: 0.0,
        false_easting: 0.0,
        false_northing: 0.0,
        scale_factor: 1.0,
    };
    let conv = crsops::projections::build_conversion(ellipsoid.a, std::sync::Arc::new(projection), params);
    let out = conv.forward(&[deg(10.0), 0.0]).unwrap();
    assert_abs_diff_eq!(out[0], 1_113_194.9, epsilon = 1.0);
    assert_abs_diff_eq!(out[1], 0.0, epsilon = 1e-6);
}

#[test]
fn universal_zone_follows_norway_and_svalbard_carve_outs() {
    let standard = universal_zone(deg(9.0), deg(56.0));
    assert_eq!(standard.zone, 32);

    let norway = universal_zone(deg(5.0), deg(60.0));
    assert_eq!(norway.zone, 32);

    let svalbard = universal_zone(deg(15.0), deg(78.0));
    assert_eq!(svalbard.zone, 33);
}

#[test]
fn universal_dispatches_to_ups_above_84_degrees_north() {
    let crs = authority::universal(0.0, 85.0).unwrap();
    match crs {
        Crs::Projected(p) => assert_eq!(p.conversion.method, "Universal Polar Stereographic"),
        other => panic!("expected projected, got {other:?}"),
    }
}

#[test]
fn geodesic_inverse_converges_near_antipodal_and_rejects_equatorial_antipodal() {
    let g = Geodesic::wgs84();

    // Concrete scenario 6: nearly antipodal, non-equatorial points are a
    // well-posed inverse problem (unlike the truly antipodal equatorial
    // case below) and must converge to a real distance, not just avoid
    // erroring.
    let r = g.inverse(deg(-30.0), deg(0.0), deg(29.9), deg(179.8)).unwrap();
    assert!(r.distance > 19_000_000.0 && r.distance < 20_100_000.0);

    let equatorial = g.inverse(deg(0.0), deg(0.0), deg(0.0), deg(179.0));
    assert!(matches!(equatorial, Err(Error::EquatorialAntipodal)));
}

#[test]
fn unknown_authority_code_reports_which_code() {
    let err = authority::resolve_crs("EPSG:999999").unwrap_err();
    assert!(matches!(err, Error::AuthorityCodeUnknown { .. }));
}

#[test]
fn composite_urn_round_trips_through_its_components() {
    let crs = authority::resolve_crs("urn:ogc:def:crs,crs:EPSG::4326,crs:EPSG::5714").unwrap();
    assert_eq!(crs.dimension(), 3);
}

#[test]
fn compound_geographic_plus_vertical_carries_height_into_geographic3d() {
    // Concrete scenario 3: CompoundCRS(EPSG:4326 + EPSG:5714) -> EPSG:4979
    // must be identity on the horizontal component and a pass-through on
    // the vertical, not a silent drop of the height value.
    let compound = authority::resolve_crs("urn:ogc:def:crs,crs:EPSG::4326,crs:EPSG::5714").unwrap();
    let target = authority::resolve_crs("EPSG:4979").unwrap();

    let op = find_operation(&compound, &target).unwrap();
    // EPSG:4326 is (lat, lon); EPSG:4979 is (lat, lon, height).
    let out = op.math_transform.forward(&[40.0, -105.0, 123.4]).unwrap();
    assert_abs_diff_eq!(out[0], 40.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out[1], -105.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out[2], 123.4, epsilon = 1e-2);
}
