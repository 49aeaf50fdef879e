//!
//! The hard-coded fallback table (spec 4.H: "a compact hard-coded table
//! acts as fallback for at least..."). No network or filesystem access --
//! every entry here is compiled in, which is also why lookups never
//! return [`crate::errors::Error::AuthorityUnavailable`]: that variant
//! exists for a caller that layers a real EPSG database in front of this
//! registry (the `AuthorityUnavailable` -> fallback sequencing happens
//! there, not in this crate).
//!

use crate::axis::constants::*;
use crate::crs::{Conversion, Crs, GeodeticCrs, TemporalCrs, VerticalCrs};
use crate::cs::CoordinateSystem;
use crate::datum::{GeodeticDatum, TemporalDatum, VerticalDatum};
use crate::ellipsoid::Ellipsoid;
use crate::errors::{Error, Result};
use crate::parameter::{ParameterValue, ParameterValueGroup};
use crate::prime_meridian::GREENWICH;
use crate::projections::{self, UpsHemisphere};

/// A registry entry: the fallback table vends one of these, not always a
/// [`Crs`] (spec: "lookup yields a concrete CRS, datum, ellipsoid,
/// coordinate system, or prime meridian").
#[derive(Debug, Clone)]
pub enum Resolved {
    Crs(Crs),
    Datum(GeodeticDatum),
    Ellipsoid(Ellipsoid),
    PrimeMeridian(crate::prime_meridian::PrimeMeridian),
    CoordinateSystem(CoordinateSystem),
}

fn clarke_1866() -> Ellipsoid {
    Ellipsoid::from_ab(6_378_206.4, 6_356_583.8).expect("Clarke 1866 parameters are valid")
}

fn international_1924() -> Ellipsoid {
    Ellipsoid::from_a_rf(6_378_388.0, 297.0).expect("International 1924 parameters are valid")
}

fn wgs72_ellipsoid() -> Ellipsoid {
    Ellipsoid::from_a_rf(6_378_135.0, 298.26).expect("WGS72 parameters are valid")
}

fn authalic_sphere() -> Ellipsoid {
    Ellipsoid::sphere(crate::ellipsoid::grs80().authalic_radius()).expect("authalic radius is positive")
}

fn wgs84_datum() -> GeodeticDatum {
    GeodeticDatum::wgs84()
}

fn wgs72_datum() -> GeodeticDatum {
    GeodeticDatum::new("WGS 72", wgs72_ellipsoid(), GREENWICH)
}

fn nad83_datum() -> GeodeticDatum {
    GeodeticDatum::new("North American Datum 1983", crate::ellipsoid::grs80(), GREENWICH)
}

/// Named to match `operation_finder.rs`'s `KNOWN_SHIFTS` table exactly, so
/// a query from WGS84 to this datum finds the historical Bursa-Wolf shift
/// instead of falling through to `OperationNotFound`.
fn nad27_datum() -> GeodeticDatum {
    GeodeticDatum::new("North American Datum 1927", clarke_1866(), GREENWICH)
}

fn etrs89_datum() -> GeodeticDatum {
    GeodeticDatum::new("European Terrestrial Reference System 1989", crate::ellipsoid::grs80(), GREENWICH)
}

/// Named to match `KNOWN_SHIFTS`, see [`nad27_datum`].
fn ed50_datum() -> GeodeticDatum {
    GeodeticDatum::new("European Datum 1950", international_1924(), GREENWICH)
}

fn geographic_2d(name: &str, datum: GeodeticDatum, lat_lon: bool) -> Crs {
    let cs = if lat_lon { CoordinateSystem::ellipsoidal_2d_lat_lon() } else { CoordinateSystem::ellipsoidal_2d() };
    Crs::Geodetic(GeodeticCrs::new(name, datum, cs).expect("fallback CRS parameters are valid"))
}

fn geographic_3d(name: &str, datum: GeodeticDatum, lat_lon: bool) -> Crs {
    let cs = if lat_lon { CoordinateSystem::ellipsoidal_3d_lat_lon() } else { CoordinateSystem::ellipsoidal_3d() };
    Crs::Geodetic(GeodeticCrs::new(name, datum, cs).expect("fallback CRS parameters are valid"))
}

fn mean_sea_level_height() -> Crs {
    Crs::Vertical(
        crate::crs::VerticalCrs::new("MSL height", VerticalDatum::new("Mean Sea Level"), CoordinateSystem::vertical())
            .expect("fallback CRS parameters are valid"),
    )
}

fn depth() -> Crs {
    Crs::Vertical(
        VerticalCrs::new("Depth", VerticalDatum::new("Mean Sea Level"), CoordinateSystem::depth())
            .expect("fallback CRS parameters are valid"),
    )
}

fn navd88() -> Crs {
    Crs::Vertical(
        VerticalCrs::new(
            "NAVD88 height",
            VerticalDatum::new("North American Vertical Datum 1988"),
            CoordinateSystem::vertical(),
        )
        .expect("fallback CRS parameters are valid"),
    )
}

/// Temporal CRSs share the same "seconds since a Julian-date origin" unit
/// model; only the origin differs between calendars.
fn temporal(name: &str, origin_julian_date: f64) -> Crs {
    Crs::Temporal(
        TemporalCrs::new(name, TemporalDatum::new(name, origin_julian_date), CoordinateSystem::time())
            .expect("fallback CRS parameters are valid"),
    )
}

/// UTM zone 1..60, N/S, on WGS84 -- built as a [`Crs::Projected`] whose
/// defining `Conversion` names the `"UTM"` method `operation_finder.rs`
/// already dispatches, rather than baking a `MathTransform` in here: the
/// registry's job is describing CRSs, not finding operations between them.
fn utm_on_wgs84(zone: u8, north: bool) -> Result<Crs> {
    if !(1..=60).contains(&zone) {
        return Err(Error::AuthorityCodeUnknown {
            authority: "EPSG".to_string(),
            code: format!("UTM zone {zone}"),
        });
    }
    let base = geographic_2d("WGS 84", wgs84_datum(), false);
    let params = ParameterValueGroup::new()
        .with("zone", ParameterValue::scale(zone as f64))
        .with("hemisphere", ParameterValue::scale(if north { 1.0 } else { -1.0 }));
    let conversion = Conversion::new(format!("UTM zone {zone}{}", if north { "N" } else { "S" }), "UTM", params);
    let name = format!("WGS 84 / UTM zone {zone}{}", if north { "N" } else { "S" });
    Ok(Crs::Projected(crate::crs::ProjectedCrs::new(
        name,
        base,
        conversion,
        CoordinateSystem::cartesian_2d(),
    )?))
}

fn ups_on_wgs84(hemisphere: UpsHemisphere) -> Result<Crs> {
    let base = geographic_2d("WGS 84", wgs84_datum(), false);
    let north = matches!(hemisphere, UpsHemisphere::North);
    let params = ParameterValueGroup::new().with("hemisphere", ParameterValue::scale(if north { 1.0 } else { -1.0 }));
    let conversion = Conversion::new("Universal Polar Stereographic", "Universal Polar Stereographic", params);
    let name = format!("WGS 84 / UPS {}", if north { "North" } else { "South" });
    Ok(Crs::Projected(crate::crs::ProjectedCrs::new(
        name,
        base,
        conversion,
        CoordinateSystem::cartesian_2d(),
    )?))
}

/// Combined UTM/UPS dispatcher by geographic position, matching the real
/// standard's polar carve-out: UPS north of 84N and south of 80S, UTM
/// elsewhere (spec 4.H's "UTM zones 1..60 N/S ... UPS North/South" entries,
/// unified the way a caller actually wants to pick one).
pub fn universal(lon_deg: f64, lat_deg: f64) -> Result<Crs> {
    if lat_deg >= 84.0 {
        return ups_on_wgs84(UpsHemisphere::North);
    }
    if lat_deg <= -80.0 {
        return ups_on_wgs84(UpsHemisphere::South);
    }
    let zone = projections::universal_zone(lon_deg.to_radians(), lat_deg.to_radians());
    utm_on_wgs84(zone.zone, zone.north)
}

pub(crate) fn lookup(authority: &str, code: &str) -> Result<Resolved> {
    match authority {
        "EPSG" => lookup_epsg(code),
        "CRS" => lookup_crs_authority(code),
        "OGC" => lookup_ogc(code),
        other => Err(Error::AuthorityUnavailable { authority: other.to_string() }),
    }
}

fn lookup_epsg(code: &str) -> Result<Resolved> {
    let unknown = || Error::AuthorityCodeUnknown { authority: "EPSG".to_string(), code: code.to_string() };

    if let Some(zone_part) = code.strip_prefix("326") {
        if zone_part.len() == 2 {
            let zone: u8 = zone_part.parse().map_err(|_| unknown())?;
            return Ok(Resolved::Crs(utm_on_wgs84(zone, true)?));
        }
    }
    if let Some(zone_part) = code.strip_prefix("327") {
        if zone_part.len() == 2 {
            let zone: u8 = zone_part.parse().map_err(|_| unknown())?;
            return Ok(Resolved::Crs(utm_on_wgs84(zone, false)?));
        }
    }

    match code {
        "4326" => Ok(Resolved::Crs(geographic_2d("WGS 84", wgs84_datum(), true))),
        "4979" => Ok(Resolved::Crs(geographic_3d("WGS 84", wgs84_datum(), true))),
        "4322" => Ok(Resolved::Crs(geographic_2d("WGS 72", wgs72_datum(), true))),
        "4269" => Ok(Resolved::Crs(geographic_2d("NAD83", nad83_datum(), true))),
        "4267" => Ok(Resolved::Crs(geographic_2d("NAD27", nad27_datum(), true))),
        "4258" => Ok(Resolved::Crs(geographic_2d("ETRS89", etrs89_datum(), true))),
        "4230" => Ok(Resolved::Crs(geographic_2d("ED50", ed50_datum(), true))),
        "6326" => Ok(Resolved::Datum(wgs84_datum())),
        "6322" => Ok(Resolved::Datum(wgs72_datum())),
        "6269" => Ok(Resolved::Datum(nad83_datum())),
        "6267" => Ok(Resolved::Datum(nad27_datum())),
        "6258" => Ok(Resolved::Datum(etrs89_datum())),
        "6230" => Ok(Resolved::Datum(ed50_datum())),
        "7030" => Ok(Resolved::Ellipsoid(crate::ellipsoid::wgs84())),
        "7019" => Ok(Resolved::Ellipsoid(crate::ellipsoid::grs80())),
        "7008" => Ok(Resolved::Ellipsoid(clarke_1866())),
        "7022" => Ok(Resolved::Ellipsoid(international_1924())),
        "7043" => Ok(Resolved::Ellipsoid(wgs72_ellipsoid())),
        "7048" => Ok(Resolved::Ellipsoid(authalic_sphere())),
        "8901" => Ok(Resolved::PrimeMeridian(GREENWICH)),
        "6422" => Ok(Resolved::CoordinateSystem(CoordinateSystem::ellipsoidal_2d_lat_lon())),
        "6423" => Ok(Resolved::CoordinateSystem(CoordinateSystem::ellipsoidal_3d_lat_lon())),
        "4400" => Ok(Resolved::CoordinateSystem(CoordinateSystem::cartesian_2d())),
        "32661" => Ok(Resolved::Crs(ups_on_wgs84(UpsHemisphere::North)?)),
        "32761" => Ok(Resolved::Crs(ups_on_wgs84(UpsHemisphere::South)?)),
        "5714" => Ok(Resolved::Crs(mean_sea_level_height())),
        "5715" => Ok(Resolved::Crs(depth())),
        "5703" => Ok(Resolved::Crs(navd88())),
        _ => Err(unknown()),
    }
}

fn lookup_crs_authority(code: &str) -> Result<Resolved> {
    let unknown = || Error::AuthorityCodeUnknown { authority: "CRS".to_string(), code: code.to_string() };
    match code {
        "27" => Ok(Resolved::Crs(geographic_2d("NAD27", nad27_datum(), false))),
        "83" => Ok(Resolved::Crs(geographic_2d("NAD83", nad83_datum(), false))),
        "84" => Ok(Resolved::Crs(geographic_2d("WGS 84", wgs84_datum(), false))),
        "88" => Ok(Resolved::Crs(navd88())),
        _ => Err(unknown()),
    }
}

/// Temporal CRSs and the authalic-sphere geodetic CRS: none of these have
/// a single EPSG home, so they are vended under a house "OGC" authority,
/// documented as an open-question decision in `DESIGN.md`.
fn lookup_ogc(code: &str) -> Result<Resolved> {
    let unknown = || Error::AuthorityCodeUnknown { authority: "OGC".to_string(), code: code.to_string() };
    match code.to_uppercase().as_str() {
        "AUTHALICSPHERE" => Ok(Resolved::Crs(geographic_2d(
            "Authalic sphere",
            GeodeticDatum::new("Authalic sphere", authalic_sphere(), GREENWICH),
            false,
        ))),
        "JULIANDATE" => Ok(Resolved::Crs(temporal("Julian Date", 0.0))),
        "MODIFIEDJULIANDATE" => Ok(Resolved::Crs(temporal("Modified Julian Date", 2_400_000.5))),
        "TRUNCATEDJULIANDATE" => Ok(Resolved::Crs(temporal("Truncated Julian Date", 2_440_000.5))),
        "DUBLINJULIANDATE" => Ok(Resolved::Crs(temporal("Dublin Julian Date", 2_415_020.0))),
        "TROPICALYEAR" => Ok(Resolved::Crs(temporal("Tropical year", 0.0))),
        "UNIXTIME" => Ok(Resolved::Crs(temporal("Unix time", 2_440_587.5))),
        "JAVATIME" => Ok(Resolved::Crs(temporal("Java time", 2_440_587.5))),
        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_4326_is_lat_lon_wgs84() {
        match lookup("EPSG", "4326").unwrap() {
            Resolved::Crs(Crs::Geodetic(g)) => {
                assert_eq!(g.cs.axes[0].direction, crate::axis::AxisDirection::North);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn crs_84_is_lon_lat_wgs84() {
        match lookup("CRS", "84").unwrap() {
            Resolved::Crs(Crs::Geodetic(g)) => {
                assert_eq!(g.cs.axes[0].direction, crate::axis::AxisDirection::East);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn utm_zone_is_parsed_from_epsg_code() {
        match lookup("EPSG", "32633").unwrap() {
            Resolved::Crs(Crs::Projected(p)) => assert_eq!(p.conversion.method, "UTM"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_code_errors() {
        assert!(lookup("EPSG", "999999").is_err());
    }

    #[test]
    fn unknown_authority_is_unavailable() {
        assert!(matches!(lookup("BOGUS", "1"), Err(Error::AuthorityUnavailable { .. })));
    }

    #[test]
    fn universal_picks_ups_above_84_degrees() {
        let crs = universal(10.0, 85.0).unwrap();
        match crs {
            Crs::Projected(p) => assert_eq!(p.conversion.method, "Universal Polar Stereographic"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn universal_picks_utm_at_mid_latitudes() {
        let crs = universal(10.0, 45.0).unwrap();
        match crs {
            Crs::Projected(p) => assert_eq!(p.conversion.method, "UTM"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
