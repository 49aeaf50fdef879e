//!
//! Authority Registry (spec component H): turns a code string
//! (`EPSG:4326`, `CRS:84`, `AUTO:42001,-117,33`, ...) into a concrete CRS,
//! datum, ellipsoid, coordinate system, or prime meridian.
//!
//! `grammar.rs` parses the string into a small AST, `fallback.rs` holds
//! the compiled-in lookup table the spec requires as a baseline, and
//! `auto.rs` builds the one-off projected CRSs the `AUTO`/`AUTO2` forms
//! describe. Results are cached by the original code string behind a
//! `Mutex`, lazily populated on first use and shared for the life of the
//! process -- the "double-checked initialisation is acceptable since the
//! computed value is immutable" allowance of spec section 5.
//!

mod auto;
mod fallback;
mod grammar;

use crate::crs::Crs;
use crate::cs::CoordinateSystem;
use crate::datum::GeodeticDatum;
use crate::ellipsoid::Ellipsoid;
use crate::errors::{Error, Result};
use crate::prime_meridian::PrimeMeridian;
use fallback::Resolved;
use grammar::Code;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

struct Registry {
    cache: Mutex<HashMap<String, Resolved>>,
}

impl Registry {
    fn new() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }

    fn get_or_resolve(&self, code: &str) -> Result<Resolved> {
        if let Some(hit) = self.cache.lock().expect("registry cache lock poisoned").get(code) {
            return Ok(hit.clone());
        }
        let resolved = resolve_uncached(code)?;
        self.cache
            .lock()
            .expect("registry cache lock poisoned")
            .entry(code.to_string())
            .or_insert_with(|| resolved.clone());
        Ok(resolved)
    }
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

fn resolve_uncached(code: &str) -> Result<Resolved> {
    let parsed = grammar::parse(code)?;
    resolve_code(&parsed)
}

fn resolve_code(parsed: &Code) -> Result<Resolved> {
    match parsed {
        Code::Simple { authority, code } => fallback::lookup(authority, code),
        Code::Composite(parts) => {
            let mut components = Vec::with_capacity(parts.len());
            for part in parts {
                match resolve_code(part)? {
                    Resolved::Crs(c) => components.push(c),
                    _ => {
                        return Err(Error::IllegalProperty {
                            key: "composite",
                            value: "a composite URN's component must itself resolve to a CRS".to_string(),
                        })
                    }
                }
            }
            Ok(Resolved::Crs(Crs::Compound(crate::crs::CompoundCrs::new("Composite CRS", components)?)))
        }
        Code::Auto { method, unit_code, lon, lat } => Ok(Resolved::Crs(auto::build(*method, *unit_code, *lon, *lat)?)),
    }
}

fn expect_crs(code: &str, resolved: Resolved) -> Result<Crs> {
    match resolved {
        Resolved::Crs(c) => Ok(c),
        _ => Err(Error::IllegalProperty {
            key: "code",
            value: format!("'{code}' does not resolve to a CRS"),
        }),
    }
}

/// Resolve a code string to a [`Crs`]. Accepts every form of spec 4.H:
/// `AUTHORITY:CODE`, `AUTHORITY::CODE`, the `urn:`/`http:` long forms,
/// composite URNs, and `AUTO[12]:CODE,[unit,]lon,lat`.
pub fn resolve_crs(code: &str) -> Result<Crs> {
    expect_crs(code, REGISTRY.get_or_resolve(code)?)
}

/// Resolve a code string to a [`GeodeticDatum`] (e.g. `EPSG:6326`).
pub fn resolve_datum(code: &str) -> Result<GeodeticDatum> {
    match REGISTRY.get_or_resolve(code)? {
        Resolved::Datum(d) => Ok(d),
        _ => Err(Error::IllegalProperty {
            key: "code",
            value: format!("'{code}' does not resolve to a datum"),
        }),
    }
}

/// Resolve a code string to an [`Ellipsoid`] (e.g. `EPSG:7030`).
pub fn resolve_ellipsoid(code: &str) -> Result<Ellipsoid> {
    match REGISTRY.get_or_resolve(code)? {
        Resolved::Ellipsoid(e) => Ok(e),
        _ => Err(Error::IllegalProperty {
            key: "code",
            value: format!("'{code}' does not resolve to an ellipsoid"),
        }),
    }
}

/// Resolve a code string to a [`PrimeMeridian`] (e.g. `EPSG:8901`).
pub fn resolve_prime_meridian(code: &str) -> Result<PrimeMeridian> {
    match REGISTRY.get_or_resolve(code)? {
        Resolved::PrimeMeridian(pm) => Ok(pm),
        _ => Err(Error::IllegalProperty {
            key: "code",
            value: format!("'{code}' does not resolve to a prime meridian"),
        }),
    }
}

/// Resolve a code string to a [`CoordinateSystem`] (e.g. `EPSG:6422`).
pub fn resolve_coordinate_system(code: &str) -> Result<CoordinateSystem> {
    match REGISTRY.get_or_resolve(code)? {
        Resolved::CoordinateSystem(cs) => Ok(cs),
        _ => Err(Error::IllegalProperty {
            key: "code",
            value: format!("'{code}' does not resolve to a coordinate system"),
        }),
    }
}

/// The combined UTM/UPS dispatcher: UTM in the 1..60 zone band, UPS on
/// either polar cap, on WGS84. Not itself a registry code (a caller who
/// already knows `(lon, lat)` has no code to look up), but built from the
/// same fallback entries `EPSG:326xx`/`EPSG:327xx`/`EPSG:3266 1`/`761`
/// resolve to.
pub fn universal(lon_deg: f64, lat_deg: f64) -> Result<Crs> {
    fallback::universal(lon_deg, lat_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_and_caches_a_simple_code() {
        let a = resolve_crs("EPSG:4326").unwrap();
        let b = resolve_crs("EPSG:4326").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn resolves_composite_urn_to_compound_crs() {
        let crs = resolve_crs("urn:ogc:def:crs,crs:EPSG::4326,crs:EPSG::5714").unwrap();
        match crs {
            Crs::Compound(c) => assert_eq!(c.components.len(), 2),
            other => panic!("expected compound, got {other:?}"),
        }
    }

    #[test]
    fn resolves_auto_code() {
        let crs = resolve_crs("AUTO:42003,-100,40").unwrap();
        match crs {
            Crs::Projected(p) => assert_eq!(p.conversion.method, "Orthographic"),
            other => panic!("expected projected, got {other:?}"),
        }
    }

    #[test]
    fn resolve_datum_rejects_a_crs_code() {
        assert!(resolve_datum("EPSG:4326").is_err());
    }

    #[test]
    fn resolve_ellipsoid_accepts_the_ellipsoid_code() {
        let e = resolve_ellipsoid("EPSG:7030").unwrap();
        assert!(e.a > 6_378_000.0);
    }

    #[test]
    fn universal_dispatcher_matches_fallback_lookup() {
        let direct = universal(2.0, 48.0).unwrap();
        let via_epsg = resolve_crs("EPSG:32631").unwrap();
        assert_eq!(direct, via_epsg);
    }
}
