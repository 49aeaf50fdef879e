//!
//! The CRS model (spec component D): a tagged union over every kind of
//! coordinate reference system the finder needs to reason about.
//!
//! Apache SIS and the GeoTools/PROJJSON family model this with a class
//! hierarchy (`SingleCRS` -> `GeodeticCRS`/`ProjectedCRS`/...) and dispatch
//! on it with `instanceof` ladders; per `SPEC_FULL.md`'s design notes we
//! flatten that into one enum with exhaustive `match` in
//! `operation_finder.rs`; and a `HasBaseCrs` capability trait stands in for
//! the bit of the hierarchy (`GeneralDerivedCRS`) that both `Projected` and
//! `Derived` share.
//!

use crate::cs::{CoordinateSystem, CsKind};
use crate::datum::{EngineeringDatum, GeodeticDatum, TemporalDatum, VerticalDatum};
use crate::errors::{Error, Result};
use crate::parameter::ParameterValueGroup;

/// The parameterised projection or other coordinate conversion that
/// anchors a [`ProjectedCrs`] or [`DerivedCrs`] to its base CRS. Lossless
/// and reversible in principle (an operation built from it is classified
/// `Conversion`, never `Transformation`).
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub name: String,
    pub method: &'static str,
    pub parameters: ParameterValueGroup,
}

impl Conversion {
    pub fn new(name: impl Into<String>, method: &'static str, parameters: ParameterValueGroup) -> Self {
        Self {
            name: name.into(),
            method,
            parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeodeticCrs {
    pub name: String,
    pub datum: GeodeticDatum,
    pub cs: CoordinateSystem,
}

impl GeodeticCrs {
    pub fn new(name: impl Into<String>, datum: GeodeticDatum, cs: CoordinateSystem) -> Result<Self> {
        match cs.kind {
            CsKind::Ellipsoidal2D | CsKind::Ellipsoidal3D | CsKind::Cartesian3D | CsKind::Spherical => {}
            other => {
                return Err(Error::IllegalProperty {
                    key: "cs",
                    value: format!("{other:?} is not a valid geodetic coordinate system kind"),
                })
            }
        }
        Ok(Self {
            name: name.into(),
            datum,
            cs,
        })
    }

    pub fn dimension(&self) -> usize {
        self.cs.dimension()
    }

    /// Ellipsoidal (geographic) coordinates, as opposed to geocentric.
    pub fn is_geographic(&self) -> bool {
        matches!(self.cs.kind, CsKind::Ellipsoidal2D | CsKind::Ellipsoidal3D)
    }

    pub fn is_geocentric(&self) -> bool {
        matches!(self.cs.kind, CsKind::Cartesian3D | CsKind::Spherical)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedCrs {
    pub name: String,
    pub base: Box<Crs>,
    pub conversion: Conversion,
    pub cs: CoordinateSystem,
}

impl ProjectedCrs {
    pub fn new(name: impl Into<String>, base: Crs, conversion: Conversion, cs: CoordinateSystem) -> Result<Self> {
        match &base {
            Crs::Geodetic(g) if g.is_geographic() => {}
            other => {
                return Err(Error::IllegalProperty {
                    key: "base",
                    value: format!("{} is not a geographic CRS", other.name()),
                })
            }
        }
        if !matches!(cs.kind, CsKind::Cartesian2D) {
            return Err(Error::IllegalProperty {
                key: "cs",
                value: format!("{:?} is not a valid projected coordinate system kind", cs.kind),
            });
        }
        Ok(Self {
            name: name.into(),
            base: Box::new(base),
            conversion,
            cs,
        })
    }

    /// The base geographic CRS's datum; projected CRSs never own a datum
    /// directly.
    pub fn base_geodetic(&self) -> &GeodeticCrs {
        match self.base.as_ref() {
            Crs::Geodetic(g) => g,
            _ => unreachable!("validated at construction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalCrs {
    pub name: String,
    pub datum: VerticalDatum,
    pub cs: CoordinateSystem,
}

impl VerticalCrs {
    pub fn new(name: impl Into<String>, datum: VerticalDatum, cs: CoordinateSystem) -> Result<Self> {
        if !matches!(cs.kind, CsKind::Vertical) {
            return Err(Error::IllegalProperty {
                key: "cs",
                value: format!("{:?} is not a valid vertical coordinate system kind", cs.kind),
            });
        }
        Ok(Self {
            name: name.into(),
            datum,
            cs,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalCrs {
    pub name: String,
    pub datum: TemporalDatum,
    pub cs: CoordinateSystem,
}

impl TemporalCrs {
    pub fn new(name: impl Into<String>, datum: TemporalDatum, cs: CoordinateSystem) -> Result<Self> {
        if !matches!(cs.kind, CsKind::Time) {
            return Err(Error::IllegalProperty {
                key: "cs",
                value: format!("{:?} is not a valid temporal coordinate system kind", cs.kind),
            });
        }
        Ok(Self {
            name: name.into(),
            datum,
            cs,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineeringCrs {
    pub name: String,
    pub datum: EngineeringDatum,
    pub cs: CoordinateSystem,
}

impl EngineeringCrs {
    pub fn new(name: impl Into<String>, datum: EngineeringDatum, cs: CoordinateSystem) -> Self {
        Self {
            name: name.into(),
            datum,
            cs,
        }
    }
}

/// An ordered list of single CRSs whose dimension is the sum of its
/// components'. Construction flattens any nested compound (spec: "no
/// nesting in the public contract") so the finder only ever has to
/// consider one level.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundCrs {
    pub name: String,
    pub components: Vec<Crs>,
}

impl CompoundCrs {
    pub fn new(name: impl Into<String>, components: Vec<Crs>) -> Result<Self> {
        if components.len() < 2 {
            return Err(Error::IllegalProperty {
                key: "components",
                value: "a compound CRS needs at least two components".to_string(),
            });
        }
        let mut flat = Vec::with_capacity(components.len());
        for c in components {
            match c {
                Crs::Compound(inner) => flat.extend(inner.components),
                other => flat.push(other),
            }
        }
        Ok(Self {
            name: name.into(),
            components: flat,
        })
    }

    pub fn dimension(&self) -> usize {
        self.components.iter().map(Crs::dimension).sum()
    }
}

/// A CRS derived from a (possibly itself derived) base CRS by a defining
/// conversion that is not a map projection in the EPSG-registry sense
/// (e.g. a derived engineering or parametric CRS). Distinguished from
/// [`ProjectedCrs`] only by the base CRS's kind; the finder handles both
/// through the same [`HasBaseCrs`] capability.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedCrs {
    pub name: String,
    pub base: Box<Crs>,
    pub conversion: Conversion,
    pub cs: CoordinateSystem,
}

impl DerivedCrs {
    pub fn new(name: impl Into<String>, base: Crs, conversion: Conversion, cs: CoordinateSystem) -> Self {
        Self {
            name: name.into(),
            base: Box::new(base),
            conversion,
            cs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Crs {
    Geodetic(GeodeticCrs),
    Projected(ProjectedCrs),
    Vertical(VerticalCrs),
    Temporal(TemporalCrs),
    Engineering(EngineeringCrs),
    Compound(CompoundCrs),
    Derived(DerivedCrs),
}

impl Crs {
    pub fn name(&self) -> &str {
        match self {
            Crs::Geodetic(c) => &c.name,
            Crs::Projected(c) => &c.name,
            Crs::Vertical(c) => &c.name,
            Crs::Temporal(c) => &c.name,
            Crs::Engineering(c) => &c.name,
            Crs::Compound(c) => &c.name,
            Crs::Derived(c) => &c.name,
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Crs::Geodetic(c) => c.dimension(),
            Crs::Projected(c) => c.cs.dimension(),
            Crs::Vertical(c) => c.cs.dimension(),
            Crs::Temporal(c) => c.cs.dimension(),
            Crs::Engineering(c) => c.cs.dimension(),
            Crs::Compound(c) => c.dimension(),
            Crs::Derived(c) => c.cs.dimension(),
        }
    }

    /// The coordinate system directly owned by this CRS. `None` for
    /// `Compound`, which has no single CS of its own.
    pub fn cs(&self) -> Option<&CoordinateSystem> {
        match self {
            Crs::Geodetic(c) => Some(&c.cs),
            Crs::Projected(c) => Some(&c.cs),
            Crs::Vertical(c) => Some(&c.cs),
            Crs::Temporal(c) => Some(&c.cs),
            Crs::Engineering(c) => Some(&c.cs),
            Crs::Compound(_) => None,
            Crs::Derived(c) => Some(&c.cs),
        }
    }

    /// Rule 1 of the operation finder's case analysis: deep value equality
    /// of the whole CRS description (datum, coordinate system, and for
    /// derived/projected kinds, the defining conversion and base CRS too).
    pub fn is_metadata_equal(&self, other: &Crs) -> bool {
        self == other
    }

    /// Does this CRS, or any CRS it is built from, carry a base CRS and a
    /// defining conversion? See [`HasBaseCrs`].
    pub fn as_has_base(&self) -> Option<&dyn HasBaseCrs> {
        match self {
            Crs::Projected(c) => Some(c),
            Crs::Derived(c) => Some(c),
            _ => None,
        }
    }
}

/// Capability shared by [`ProjectedCrs`] and [`DerivedCrs`]: both are "a
/// base CRS plus a defining conversion", which is all
/// `operation_finder.rs`'s `Derived -> *` rules need to know.
pub trait HasBaseCrs {
    fn base_crs(&self) -> &Crs;
    fn defining_conversion(&self) -> &Conversion;
}

impl HasBaseCrs for ProjectedCrs {
    fn base_crs(&self) -> &Crs {
        &self.base
    }
    fn defining_conversion(&self) -> &Conversion {
        &self.conversion
    }
}

impl HasBaseCrs for DerivedCrs {
    fn base_crs(&self) -> &Crs {
        &self.base
    }
    fn defining_conversion(&self) -> &Conversion {
        &self.conversion
    }
}

/// A CRS plus an optional coordinate epoch (spec REDESIGN FLAGS: "the
/// source notes it does not yet support coordinate epoch"; this crate
/// models the field so callers can be told clearly with
/// [`Error::UnsupportedEpochShift`] rather than silently dropping it).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMetadata {
    pub crs: Crs,
    pub epoch: Option<f64>,
}

impl CoordinateMetadata {
    pub fn new(crs: Crs) -> Self {
        Self { crs, epoch: None }
    }

    pub fn with_epoch(crs: Crs, epoch: f64) -> Self {
        Self { crs, epoch: Some(epoch) }
    }

    /// Both metadata objects must either both lack an epoch or share the
    /// same one; anything else means the finder would have to reduce
    /// coordinates between two different realisation epochs of the same
    /// dynamic frame, which this crate does not attempt.
    pub fn check_epoch_compatible(&self, other: &CoordinateMetadata) -> Result<()> {
        match (self.epoch, other.epoch) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) if a == b => Ok(()),
            _ => Err(Error::UnsupportedEpochShift),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::CoordinateSystem;
    use crate::datum::GeodeticDatum;

    fn wgs84_geo_lon_lat() -> Crs {
        Crs::Geodetic(GeodeticCrs::new("WGS 84 (lon,lat)", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d()).unwrap())
    }

    fn wgs84_geo_lat_lon() -> Crs {
        Crs::Geodetic(
            GeodeticCrs::new(
                "WGS 84",
                GeodeticDatum::wgs84(),
                CoordinateSystem::ellipsoidal_2d_lat_lon(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn same_description_is_metadata_equal() {
        assert!(wgs84_geo_lon_lat().is_metadata_equal(&wgs84_geo_lon_lat()));
    }

    #[test]
    fn different_axis_order_is_not_metadata_equal() {
        assert!(!wgs84_geo_lon_lat().is_metadata_equal(&wgs84_geo_lat_lon()));
    }

    #[test]
    fn compound_flattens_nested_compounds() {
        let vertical = Crs::Vertical(
            VerticalCrs::new("MSL height", VerticalDatum::new("Mean Sea Level"), CoordinateSystem::vertical()).unwrap(),
        );
        let inner = Crs::Compound(CompoundCrs::new("inner", vec![wgs84_geo_lon_lat(), vertical.clone()]).unwrap());
        let temporal = Crs::Temporal(TemporalCrs::new("time", crate::datum::TemporalDatum::new("Unix", 2_440_587.5), CoordinateSystem::time()).unwrap());
        let outer = CompoundCrs::new("outer", vec![inner, temporal]).unwrap();
        assert_eq!(outer.components.len(), 3);
        assert!(outer.components.iter().all(|c| !matches!(c, Crs::Compound(_))));
    }

    #[test]
    fn rejects_projected_crs_on_non_geographic_base() {
        let geocentric = Crs::Geodetic(GeodeticCrs::new("geocentric", GeodeticDatum::wgs84(), CoordinateSystem::geocentric()).unwrap());
        let conversion = Conversion::new("bogus", "Bogus", ParameterValueGroup::new());
        let err = ProjectedCrs::new("bad", geocentric, conversion, CoordinateSystem::cartesian_2d());
        assert!(err.is_err());
    }

    #[test]
    fn epoch_mismatch_is_rejected() {
        let a = CoordinateMetadata::with_epoch(wgs84_geo_lon_lat(), 2020.0);
        let b = CoordinateMetadata::with_epoch(wgs84_geo_lon_lat(), 2021.0);
        assert!(matches!(a.check_epoch_compatible(&b), Err(Error::UnsupportedEpochShift)));
    }
}
