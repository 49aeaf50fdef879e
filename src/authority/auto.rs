//!
//! `AUTO[12]:CODE,[unit,]lon,lat` parameterised projections (spec 4.H):
//! builds a one-off [`Crs::Projected`] centred on the given point, rather
//! than looking anything up in [`super::fallback`] -- these codes describe
//! a projection recipe, not a fixed CRS.
//!
//! Each method name matches one `operation_finder.rs`'s `build_projection`
//! already dispatches, so the registry only has to describe the CRS; the
//! operation finder computes the actual `MathTransform` the same way it
//! would for any other projected CRS.
//!

use crate::crs::{Conversion, Crs, GeodeticCrs, ProjectedCrs};
use crate::cs::CoordinateSystem;
use crate::datum::GeodeticDatum;
use crate::errors::{Error, Result};
use crate::parameter::{ParameterValue, ParameterValueGroup};
use crate::projections::universal_zone;

/// EPSG unit code for the metre -- the only linear unit this crate's AUTO
/// handling supports; any other `unit_code` is rejected rather than
/// silently ignored.
const EPSG_METRE: u32 = 9001;

pub(crate) fn build(method: u32, unit_code: Option<u32>, lon: f64, lat: f64) -> Result<Crs> {
    if let Some(unit) = unit_code {
        if unit != EPSG_METRE {
            return Err(Error::InvalidParameterValue {
                name: "unit".to_string(),
                reason: format!("AUTO unit code {unit} is not supported, only {EPSG_METRE} (metre)"),
            });
        }
    }

    let base = Crs::Geodetic(GeodeticCrs::new("WGS 84", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d())?);

    let (conversion_method, params) = match method {
        42001 => {
            let zone = universal_zone(lon.to_radians(), lat.to_radians());
            (
                "UTM",
                ParameterValueGroup::new()
                    .with("zone", ParameterValue::scale(zone.zone as f64))
                    .with("hemisphere", ParameterValue::scale(if zone.north { 1.0 } else { -1.0 })),
            )
        }
        42002 => (
            "Transverse Mercator",
            ParameterValueGroup::new().with("central_meridian", ParameterValue::angular(lon)),
        ),
        42003 => (
            "Orthographic",
            ParameterValueGroup::new()
                .with("central_meridian", ParameterValue::angular(lon))
                .with("latitude_of_origin", ParameterValue::angular(lat)),
        ),
        42004 => (
            "Equirectangular",
            ParameterValueGroup::new()
                .with("central_meridian", ParameterValue::angular(lon))
                .with("standard_parallel_1", ParameterValue::angular(lat)),
        ),
        42005 => (
            "Mollweide",
            ParameterValueGroup::new().with("central_meridian", ParameterValue::angular(lon)),
        ),
        // Not one of OGC's five registered AUTO codes; a local extension so
        // `AUTO:42006` gives a Mercator centred on the query point the same
        // way the other codes do, since the method is already supported.
        42006 => (
            "Mercator",
            ParameterValueGroup::new().with("central_meridian", ParameterValue::angular(lon)),
        ),
        other => {
            return Err(Error::AuthorityCodeUnknown {
                authority: "AUTO".to_string(),
                code: other.to_string(),
            })
        }
    };

    let conversion = Conversion::new(format!("AUTO:{method}"), conversion_method, params);
    let name = format!("AUTO:{method} ({lon}, {lat})");
    Ok(Crs::Projected(ProjectedCrs::new(name, base, conversion, CoordinateSystem::cartesian_2d())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_utm_picks_method_and_zone() {
        let crs = build(42001, None, -117.0, 33.0).unwrap();
        match crs {
            Crs::Projected(p) => assert_eq!(p.conversion.method, "UTM"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn auto_mollweide_ignores_latitude() {
        let crs = build(42005, None, 10.0, 20.0).unwrap();
        match crs {
            Crs::Projected(p) => assert_eq!(p.conversion.method, "Mollweide"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unsupported_unit_code_is_rejected() {
        assert!(build(42002, Some(9002), 0.0, 0.0).is_err());
    }

    #[test]
    fn unknown_auto_code_is_rejected() {
        assert!(build(99999, None, 0.0, 0.0).is_err());
    }
}
