//!
//! The operation finder: given a source and a target CRS, builds the
//! `MathTransform` pipeline between them.
//!
//! The strategy is the "peel toward the base CRS" reduction: a
//! [`crate::crs::Crs::Compound`] is decomposed component by component, and
//! any CRS with a base (`Projected`, `Derived`) is stripped down one layer
//! at a time via [`crate::crs::HasBaseCrs`] until both sides are single,
//! base-kind CRSs of the same family (`Geodetic`-`Geodetic`,
//! `Vertical`-`Vertical`, ...), at which point a base-kind-specific rule
//! applies. This is "late binding": the finder never consults a
//! precomputed operation path, it derives one fresh for every query, which
//! is also why every call carries its own recursion guard rather than a
//! shared one -- a single finder instance is used for exactly one query.
//!
//! [`find_operation`] returns the single best operation; [`find_operations`]
//! returns every alternative this finder can rank, falling back to a
//! single-element vector wherever there is only one way to build the
//! pipeline.
//!

use crate::crs::{CompoundCrs, Crs, EngineeringCrs, GeodeticCrs, TemporalCrs, VerticalCrs};
use crate::cs::{same_axis_family, CoordinateSystem, CsKind};
use crate::datum::{self, BursaWolf, GeodeticDatum};
use crate::ellipsoid::Ellipsoid;
use crate::errors::{Error, Result};
use crate::math_transform::{AffineTransform, Concatenated, MathTransform, MathTransformRef, SelectDimensions};
use crate::matrix::Matrix;
use crate::operation::{CoordinateOperation, OperationKind};
use crate::parameter::ParameterValueGroup;
use crate::projections::{
    self, universal, universal_polar_stereographic, AlbersEqualArea, Equirectangular, LambertConformalConic,
    Mercator, Mollweide, Orthographic, PolarStereographic, Polyconic, Sinusoidal, TransverseMercator,
    UpsHemisphere, UtmZone,
};
use std::sync::Arc;

/// Two geodetic datums whose ellipsoid and prime-meridian parameters agree
/// within this tolerance are treated as the same datum (no shift needed),
/// matching `GeodeticDatum::is_equivalent_to`'s documented purpose.
const DATUM_TOLERANCE: f64 = 1e-6;

/// Find the coordinate operation transforming coordinates valid in
/// `source` into coordinates valid in `target`.
pub fn find_operation(source: &Crs, target: &Crs) -> Result<CoordinateOperation> {
    let mut path = Vec::new();
    find_operation_guarded(source, target, &mut path)
}

/// As [`find_operation`], but first checks the two CRSs' coordinate
/// epochs are compatible (see [`crate::crs::CoordinateMetadata`]).
pub fn find_operation_with_metadata(
    source: &crate::crs::CoordinateMetadata,
    target: &crate::crs::CoordinateMetadata,
) -> Result<CoordinateOperation> {
    source.check_epoch_compatible(target)?;
    find_operation(&source.crs, &target.crs)
}

/// As [`find_operation`], but returns every viable alternative this finder
/// can construct for the pair, ranked best (most direct / most preferred)
/// first -- the plural entry point of spec 4.I ("create_operations ...
/// may return multiple ranked alternatives"). Most CRS pairs have exactly
/// one viable construction, so this is a single-element vector wrapping
/// [`find_operation`]'s own result; `Geodetic -> Geodetic` datum shifts
/// are the one case spec 4.I names multiple methods for by name
/// ("Position Vector / Geocentric Translation / Abridged Molodensky /
/// Identity"), so that's the one place more than one comes back -- see
/// [`geodetic_to_geodetic_candidates`].
pub fn find_operations(source: &Crs, target: &Crs) -> Result<Vec<CoordinateOperation>> {
    if let (Crs::Geodetic(s), Crs::Geodetic(t)) = (source, target) {
        if let Some(candidates) = geodetic_to_geodetic_candidates(s, t)? {
            return Ok(candidates);
        }
    }
    Ok(vec![find_operation(source, target)?])
}

/// Alias for [`find_operation`] matching spec 4.I's own naming.
pub fn create_operation(source: &Crs, target: &Crs) -> Result<CoordinateOperation> {
    find_operation(source, target)
}

/// Alias for [`find_operations`] matching spec 4.I's own naming.
pub fn create_operations(source: &Crs, target: &Crs) -> Result<Vec<CoordinateOperation>> {
    find_operations(source, target)
}

fn find_operation_guarded(source: &Crs, target: &Crs, path: &mut Vec<(String, String)>) -> Result<CoordinateOperation> {
    let key = (source.name().to_string(), target.name().to_string());
    if path.contains(&key) {
        return Err(Error::RecursiveCreate {
            pair: format!("{} -> {}", key.0, key.1),
        });
    }
    path.push(key);
    let result = find_operation_inner(source, target, path);
    path.pop();
    result
}

fn find_operation_inner(source: &Crs, target: &Crs, path: &mut Vec<(String, String)>) -> Result<CoordinateOperation> {
    if source.is_metadata_equal(target) {
        return Ok(CoordinateOperation::identity(source.dimension(), source.name().to_string()));
    }

    match (source, target) {
        (Crs::Compound(a), Crs::Compound(b)) => return compound_to_compound(a, b, path),
        (Crs::Compound(a), _) => return compound_to_single(a, target, path),
        (_, Crs::Compound(b)) => {
            return Err(Error::OperationNotFound {
                source: source.name().to_string(),
                target: b.name.clone(),
            })
        }
        _ => {}
    }

    if let Some(has_base) = target.as_has_base() {
        let op_to_base = find_operation_guarded(source, has_base.base_crs(), path)?;
        let conv_mt = conversion_transform(has_base.base_crs(), has_base.defining_conversion(), target.cs().unwrap())?;
        let conv_op = CoordinateOperation::new(
            format!("{} conversion", target.name()),
            OperationKind::Conversion,
            has_base.base_crs().name(),
            target.name(),
            conv_mt,
        );
        return Ok(CoordinateOperation::concatenate(vec![op_to_base, conv_op]));
    }

    if let Some(has_base) = source.as_has_base() {
        let conv_mt = conversion_transform(has_base.base_crs(), has_base.defining_conversion(), source.cs().unwrap())?;
        let inv_mt = conv_mt.try_inverse()?;
        let conv_op = CoordinateOperation::new(
            format!("{} inverse conversion", source.name()),
            OperationKind::Conversion,
            source.name(),
            has_base.base_crs().name(),
            inv_mt,
        );
        let rest = find_operation_guarded(has_base.base_crs(), target, path)?;
        return Ok(CoordinateOperation::concatenate(vec![conv_op, rest]));
    }

    match (source, target) {
        (Crs::Geodetic(s), Crs::Geodetic(t)) => geodetic_to_geodetic(s, t),
        (Crs::Vertical(s), Crs::Vertical(t)) => vertical_to_vertical(s, t),
        (Crs::Temporal(s), Crs::Temporal(t)) => temporal_to_temporal(s, t),
        (Crs::Engineering(s), Crs::Engineering(t)) => engineering_to_engineering(s, t),
        _ => Err(Error::OperationNotFound {
            source: source.name().to_string(),
            target: target.name().to_string(),
        }),
    }
}

/// Glue a sequence of per-component sub-operations into one transform over
/// the whole compound dimension, each acting through a [`PassThrough`]-like
/// window that shrinks or grows as earlier components change dimension.
fn compose_components(ops: &[CoordinateOperation], component_in_dims: &[usize]) -> MathTransformRef {
    let mut steps: Vec<MathTransformRef> = Vec::with_capacity(ops.len());
    let mut total_dim: usize = component_in_dims.iter().sum();
    let mut offset = 0usize;
    for (op, &in_dim) in ops.iter().zip(component_in_dims.iter()) {
        let mt = op.math_transform.clone();
        let out_dim = mt.dim_out();
        steps.push(crate::math_transform::PassThrough::new(mt, offset, total_dim));
        total_dim = total_dim - in_dim + out_dim;
        offset += out_dim;
    }
    Concatenated::new(steps)
}

fn combine_accuracy(ops: &[CoordinateOperation]) -> Option<f64> {
    ops.iter()
        .filter_map(|o| o.accuracy_metres)
        .fold(None, |acc, a| Some(acc.map_or(a, |acc: f64| acc.max(a))))
}

fn compound_to_compound(a: &CompoundCrs, b: &CompoundCrs, path: &mut Vec<(String, String)>) -> Result<CoordinateOperation> {
    if a.components.len() != b.components.len() {
        return Err(Error::OperationNotFound {
            source: a.name.clone(),
            target: b.name.clone(),
        });
    }
    let mut ops = Vec::with_capacity(a.components.len());
    for (ca, cb) in a.components.iter().zip(b.components.iter()) {
        ops.push(find_operation_guarded(ca, cb, path)?);
    }
    let in_dims: Vec<usize> = a.components.iter().map(Crs::dimension).collect();
    let mt = compose_components(&ops, &in_dims);
    let kind = ops
        .iter()
        .map(|o| o.kind)
        .reduce(|x, y| if x == OperationKind::Transformation || y == OperationKind::Transformation {
            OperationKind::Transformation
        } else {
            OperationKind::Conversion
        })
        .unwrap_or(OperationKind::Conversion);
    Ok(CoordinateOperation {
        name: format!("{} -> {}", a.name, b.name),
        kind,
        source_name: a.name.clone(),
        target_name: b.name.clone(),
        math_transform: mt,
        accuracy_metres: combine_accuracy(&ops),
    })
}

/// `Compound(Geographic, Vertical) -> Geographic3D` (spec 4.I: "Geodetic ->
/// Vertical: via an interpolation CRS (3D geographic) plus an
/// ellipsoidal-height extractor ... plus an inner vertical-CRS step"). The
/// horizontal and vertical components are resolved independently and
/// merged into the target's interleaved 3D layout, so the vertical value
/// flows through instead of being dropped like any other compound
/// component the target doesn't address (see concrete scenario 3).
fn compound_geographic_and_vertical_to_geodetic3d(
    a: &CompoundCrs,
    target_geo: &GeodeticCrs,
    path: &mut Vec<(String, String)>,
) -> Result<Option<CoordinateOperation>> {
    if a.components.len() != 2 {
        return Ok(None);
    }
    let (horiz_cs, vert_axis_index) = match target_geo.cs.split_horizontal_vertical() {
        Some(split) => split,
        None => return Ok(None),
    };
    let vertical_index = a.components.iter().position(|c| matches!(c, Crs::Vertical(_)));
    let geo_index = a
        .components
        .iter()
        .position(|c| matches!(c, Crs::Geodetic(g) if g.is_geographic() && g.dimension() == 2));
    let (vi, gi) = match (vertical_index, geo_index) {
        (Some(vi), Some(gi)) => (vi, gi),
        _ => return Ok(None),
    };

    let geo_component = match &a.components[gi] {
        Crs::Geodetic(g) => g,
        _ => unreachable!("checked above"),
    };
    let vertical_component = match &a.components[vi] {
        Crs::Vertical(v) => v,
        _ => unreachable!("checked above"),
    };

    let target_horizontal = Crs::Geodetic(GeodeticCrs::new(format!("{} (horizontal)", target_geo.name), target_geo.datum.clone(), horiz_cs)?);
    let horizontal_op = find_operation_guarded(&a.components[gi], &target_horizontal, path)?;

    let target_vertical_axis = &target_geo.cs.axes[vert_axis_index];
    let vertical_axis = &vertical_component.cs.axes[0];
    let ratio = vertical_axis.unit.ratio_to(&target_vertical_axis.unit)?;
    let sign = if vertical_axis.direction == target_vertical_axis.direction {
        1.0
    } else if vertical_axis.direction.is_opposite_of(&target_vertical_axis.direction) {
        -1.0
    } else {
        1.0
    };

    let geo_offset: usize = a.components[..gi].iter().map(Crs::dimension).sum();
    let vert_offset: usize = a.components[..vi].iter().map(Crs::dimension).sum();
    let mt = GeodeticPlusVertical::new(horizontal_op.math_transform.clone(), sign * ratio, 0.0, geo_offset, vert_offset, a.dimension());

    Ok(Some(CoordinateOperation {
        name: format!("{} -> {}", a.name, target_geo.name),
        kind: horizontal_op.kind,
        source_name: a.name.clone(),
        target_name: target_geo.name.clone(),
        math_transform: mt,
        accuracy_metres: horizontal_op.accuracy_metres,
    }))
}

/// Find an operation from a compound source to a single-CRS target by
/// trying each component in turn -- whichever one the target is reachable
/// from (by family or through further base peeling) wins. The other
/// components' dimensions are simply dropped.
fn compound_to_single(a: &CompoundCrs, target: &Crs, path: &mut Vec<(String, String)>) -> Result<CoordinateOperation> {
    if let Crs::Geodetic(target_geo) = target {
        if let Some(op) = compound_geographic_and_vertical_to_geodetic3d(a, target_geo, path)? {
            return Ok(op);
        }
    }

    let total_in = a.dimension();
    let mut offset = 0usize;
    let mut last_err = None;
    for comp in &a.components {
        let dim = comp.dimension();
        match find_operation_guarded(comp, target, path) {
            Ok(sub) => {
                let select = SelectDimensions::new((offset..offset + dim).collect(), total_in);
                let mt = Concatenated::new(vec![select, sub.math_transform.clone()]);
                return Ok(CoordinateOperation {
                    name: format!("{} -> {}", a.name, target.name()),
                    kind: sub.kind,
                    source_name: a.name.clone(),
                    target_name: target.name().to_string(),
                    math_transform: mt,
                    accuracy_metres: sub.accuracy_metres,
                });
            }
            Err(e) => last_err = Some(e),
        }
        offset += dim;
    }
    Err(last_err.unwrap_or(Error::OperationNotFound {
        source: a.name.clone(),
        target: target.name().to_string(),
    }))
}

/// Build the full base-CRS-to-derived-CRS transform for a defining
/// conversion: normalise into the projection's expected (lon, lat)
/// radians layout, apply the method, denormalise into the derived CRS's
/// actual coordinate system.
fn conversion_transform(base: &Crs, conv: &crate::crs::Conversion, own_cs: &CoordinateSystem) -> Result<MathTransformRef> {
    let geodetic = match base {
        Crs::Geodetic(g) => g,
        other => {
            return Err(Error::IllegalProperty {
                key: "base",
                value: format!("conversion method '{}' requires a geodetic base CRS, got {}", conv.method, other.name()),
            })
        }
    };
    let canonical_in = CoordinateSystem::ellipsoidal_2d_radians();
    let axis_in = geodetic_cs_change(&geodetic.cs, &canonical_in)?;
    let core = build_projection(conv.method, &geodetic.datum.ellipsoid, &conv.parameters)?;
    let canonical_out = CoordinateSystem::cartesian_2d();
    let axis_out = AffineTransform::new(canonical_out.normalization_matrix_to(own_cs)?);
    Ok(Concatenated::new(vec![axis_in, core, axis_out]))
}

/// Dispatch a conversion method name to the projection it names, applying
/// the common affine surround ([`projections::ConversionParams`]) built
/// from whichever of its parameters are present.
fn build_projection(method: &str, ellipsoid: &Ellipsoid, params: &ParameterValueGroup) -> Result<MathTransformRef> {
    let a = ellipsoid.a;
    let es = ellipsoid.es;
    let e = ellipsoid.e;
    let conv_params = projections::ConversionParams {
        central_meridian: params.get_angular_or("central_meridian", 0.0)?,
        false_easting: params.get_linear_or("false_easting", 0.0)?,
        false_northing: params.get_linear_or("false_northing", 0.0)?,
        scale_factor: params.get_scale_or("scale_factor", 1.0)?,
    };

    match method {
        "Mercator" => Ok(projections::build_conversion(a, Arc::new(Mercator::new(e)?), conv_params)),
        "Popular Visualisation Pseudo Mercator" => {
            Ok(projections::build_conversion(a, Arc::new(Mercator::spherical()), conv_params))
        }
        "Transverse Mercator" => Ok(projections::build_conversion(a, Arc::new(TransverseMercator::new(es)?), conv_params)),
        "UTM" => {
            let zone = params.get_scale_or("zone", 0.0)? as u8;
            if zone == 0 {
                return Err(Error::MissingParameter("zone"));
            }
            let north = params.get_scale_or("hemisphere", 1.0)? >= 0.0;
            universal(a, es, UtmZone { zone, north })
        }
        "Universal Polar Stereographic" => {
            let north = params.get_scale_or("hemisphere", 1.0)? >= 0.0;
            let hemisphere = if north { UpsHemisphere::North } else { UpsHemisphere::South };
            universal_polar_stereographic(a, e, hemisphere)
        }
        "Polar Stereographic" => {
            let lat_origin = params.get_angular_or("latitude_of_origin", std::f64::consts::FRAC_PI_2)?;
            let hemisphere = if lat_origin >= 0.0 { UpsHemisphere::North } else { UpsHemisphere::South };
            Ok(projections::build_conversion(a, Arc::new(PolarStereographic::new(e, hemisphere)?), conv_params))
        }
        "Lambert Conformal Conic" => {
            let phi0 = params.get_angular_or("latitude_of_origin", 0.0)?;
            let phi1 = params.get_angular("standard_parallel_1")?;
            let phi2 = params.get_angular_or("standard_parallel_2", phi1)?;
            Ok(projections::build_conversion(a, Arc::new(LambertConformalConic::new(e, phi0, phi1, phi2)?), conv_params))
        }
        "Albers Equal Area" => {
            let phi0 = params.get_angular_or("latitude_of_origin", 0.0)?;
            let phi1 = params.get_angular("standard_parallel_1")?;
            let phi2 = params.get_angular_or("standard_parallel_2", phi1)?;
            Ok(projections::build_conversion(a, Arc::new(AlbersEqualArea::new(es, phi0, phi1, phi2)?), conv_params))
        }
        "Polyconic" => Ok(projections::build_conversion(a, Arc::new(Polyconic::new(es)?), conv_params)),
        "Sinusoidal" => Ok(projections::build_conversion(a, Arc::new(Sinusoidal::new(es)?), conv_params)),
        "Mollweide" => Ok(projections::build_conversion(a, Arc::new(Mollweide::new()), conv_params)),
        "Orthographic" => {
            let phi0 = params.get_angular_or("latitude_of_origin", 0.0)?;
            Ok(projections::build_conversion(a, Arc::new(Orthographic::new(phi0)), conv_params))
        }
        "Equirectangular" => {
            let phi1 = params.get_angular_or("standard_parallel_1", 0.0)?;
            Ok(projections::build_conversion(a, Arc::new(Equirectangular::new(phi1)), conv_params))
        }
        other => Err(Error::IllegalProperty {
            key: "method",
            value: format!("unknown conversion method '{other}'"),
        }),
    }
}

/// Whether a geodetic coordinate system represents ellipsoidal
/// (lon/lat/height) or geocentric (X/Y/Z) coordinates. `Spherical` is
/// carried in [`CsKind`] for completeness but has no conversion path here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Representation {
    Ellipsoidal,
    Geocentric,
    Unsupported,
}

fn representation(kind: CsKind) -> Representation {
    match kind {
        CsKind::Ellipsoidal2D | CsKind::Ellipsoidal3D => Representation::Ellipsoidal,
        CsKind::Cartesian3D => Representation::Geocentric,
        _ => Representation::Unsupported,
    }
}

fn canonical_cs(repr: Representation) -> CoordinateSystem {
    match repr {
        Representation::Ellipsoidal => CoordinateSystem::ellipsoidal_3d_radians(),
        Representation::Geocentric => CoordinateSystem::geocentric(),
        Representation::Unsupported => unreachable!("checked by caller"),
    }
}

/// An axis/unit/dimension change between two ellipsoidal coordinate
/// systems (e.g. lat/lon degrees 2D -> lon/lat/height radians-metres 3D).
/// Equal-dimension cases go through [`CoordinateSystem::normalization_matrix_to`]
/// (a plain affine, which folds with neighbours); this only handles the
/// case where a height axis needs to be dropped or defaulted to zero,
/// which a square augmented-affine matrix cannot express.
fn geodetic_cs_change(source: &CoordinateSystem, target: &CoordinateSystem) -> Result<MathTransformRef> {
    if source.dimension() == target.dimension() {
        return Ok(AffineTransform::new(source.normalization_matrix_to(target)?));
    }
    Ok(EllipsoidalAxisChange::new(source.clone(), target.clone()))
}

#[derive(Debug, Clone)]
struct EllipsoidalAxisChange {
    source: CoordinateSystem,
    target: CoordinateSystem,
}

impl EllipsoidalAxisChange {
    fn new(source: CoordinateSystem, target: CoordinateSystem) -> MathTransformRef {
        Arc::new(Self { source, target })
    }
}

impl MathTransform for EllipsoidalAxisChange {
    fn dim_in(&self) -> usize {
        self.source.dimension()
    }
    fn dim_out(&self) -> usize {
        self.target.dimension()
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.source.dimension() {
            return Err(Error::MismatchedDimensions {
                expected: self.source.dimension(),
                actual: input.len(),
            });
        }
        let mut out = Vec::with_capacity(self.target.dimension());
        for dst_axis in &self.target.axes {
            match self
                .source
                .axes
                .iter()
                .enumerate()
                .find(|(_, a)| same_axis_family(a.direction, dst_axis.direction))
            {
                Some((si, src_axis)) => {
                    let ratio = src_axis.unit.ratio_to(&dst_axis.unit)?;
                    let sign = if src_axis.direction == dst_axis.direction {
                        1.0
                    } else if src_axis.direction.is_opposite_of(&dst_axis.direction) {
                        -1.0
                    } else {
                        1.0
                    };
                    out.push(sign * ratio * input[si]);
                }
                // No matching source axis (promoting 2D to 3D): default
                // the missing height to zero, the conventional ellipsoidal
                // surface value.
                None => out.push(0.0),
            }
        }
        Ok(out)
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(EllipsoidalAxisChange::new(self.target.clone(), self.source.clone()))
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Merges an independently-computed horizontal 2D result and a scaled
/// vertical scalar into one 3D output vector, reading both halves from
/// arbitrary (possibly non-adjacent) offsets of a wider input. This is the
/// glue `compound_geographic_and_vertical_to_geodetic3d` uses so the
/// vertical component's value is carried through rather than defaulted.
#[derive(Debug, Clone)]
struct GeodeticPlusVertical {
    horizontal: MathTransformRef,
    vertical_scale: f64,
    vertical_offset: f64,
    horiz_offset: usize,
    vert_offset: usize,
    dim_in: usize,
}

impl GeodeticPlusVertical {
    fn new(
        horizontal: MathTransformRef,
        vertical_scale: f64,
        vertical_offset: f64,
        horiz_offset: usize,
        vert_offset: usize,
        dim_in: usize,
    ) -> MathTransformRef {
        Arc::new(Self {
            horizontal,
            vertical_scale,
            vertical_offset,
            horiz_offset,
            vert_offset,
            dim_in,
        })
    }
}

impl MathTransform for GeodeticPlusVertical {
    fn dim_in(&self) -> usize {
        self.dim_in
    }
    fn dim_out(&self) -> usize {
        3
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.dim_in {
            return Err(Error::MismatchedDimensions {
                expected: self.dim_in,
                actual: input.len(),
            });
        }
        let horiz_out = self.horizontal.forward(&input[self.horiz_offset..self.horiz_offset + 2])?;
        let height = input[self.vert_offset] * self.vertical_scale + self.vertical_offset;
        Ok(vec![horiz_out[0], horiz_out[1], height])
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Geodetic (lon, lat, height) <-> geocentric (X, Y, Z) conversion,
/// wrapping `datum::geodetic_to_geocentric`/`geocentric_to_geodetic`.
#[derive(Debug, Clone)]
struct GeocentricConversion {
    ellipsoid: Ellipsoid,
    to_geocentric: bool,
}

impl GeocentricConversion {
    fn new(ellipsoid: Ellipsoid, to_geocentric: bool) -> MathTransformRef {
        Arc::new(Self { ellipsoid, to_geocentric })
    }
}

impl MathTransform for GeocentricConversion {
    fn dim_in(&self) -> usize {
        3
    }
    fn dim_out(&self) -> usize {
        3
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != 3 {
            return Err(Error::MismatchedDimensions { expected: 3, actual: input.len() });
        }
        let out = if self.to_geocentric {
            datum::geodetic_to_geocentric(input[0], input[1], input[2], &self.ellipsoid)
        } else {
            datum::geocentric_to_geodetic(input[0], input[1], input[2], &self.ellipsoid)
        };
        Ok(vec![out.0, out.1, out.2])
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(GeocentricConversion::new(self.ellipsoid, !self.to_geocentric))
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Abridged Molodensky datum shift, operating directly on ellipsoidal
/// (lon, lat, height) coordinates rather than round-tripping through
/// geocentric XYZ -- the finder picks this path when the known shift is a
/// pure translation (see `datum::abridged_molodensky`'s doc comment).
#[derive(Debug, Clone)]
struct AbridgedMolodenskyTransform {
    source: Ellipsoid,
    target: Ellipsoid,
    dx: f64,
    dy: f64,
    dz: f64,
}

impl MathTransform for AbridgedMolodenskyTransform {
    fn dim_in(&self) -> usize {
        3
    }
    fn dim_out(&self) -> usize {
        3
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != 3 {
            return Err(Error::MismatchedDimensions { expected: 3, actual: input.len() });
        }
        let (lon, lat, h) = datum::abridged_molodensky(input[0], input[1], input[2], &self.source, &self.target, self.dx, self.dy, self.dz);
        Ok(vec![lon, lat, h])
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(Arc::new(AbridgedMolodenskyTransform {
            source: self.target,
            target: self.source,
            dx: -self.dx,
            dy: -self.dy,
            dz: -self.dz,
        }))
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A known geocentric datum shift, plus its documented accuracy. Pulled
/// from a small static table of well-known historical shifts; anything
/// not listed there yields [`Error::OperationNotFound`], matching the
/// library's position that it does not embed the full EPSG transformation
/// dataset.
#[derive(Debug, Clone, Copy)]
struct DatumShift {
    params: BursaWolf,
    accuracy_metres: f64,
}

impl DatumShift {
    fn is_pure_translation(&self) -> bool {
        self.params.rx == 0.0 && self.params.ry == 0.0 && self.params.rz == 0.0 && self.params.scale == 1.0
    }
}

#[rustfmt::skip]
const KNOWN_SHIFTS: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("WGS 84", "North American Datum 1927", -8.0,  160.0,  176.0, 25.0),
    ("WGS 84", "European Datum 1950",      -87.0,  -98.0, -121.0,  3.0),
];

fn known_datum_shift(a: &GeodeticDatum, b: &GeodeticDatum) -> Option<DatumShift> {
    for &(n1, n2, dx, dy, dz, accuracy_metres) in KNOWN_SHIFTS {
        if a.name.eq_ignore_ascii_case(n1) && b.name.eq_ignore_ascii_case(n2) {
            return Some(DatumShift {
                params: BursaWolf::translation(dx, dy, dz),
                accuracy_metres,
            });
        }
        if a.name.eq_ignore_ascii_case(n2) && b.name.eq_ignore_ascii_case(n1) {
            return Some(DatumShift {
                params: BursaWolf::translation(-dx, -dy, -dz),
                accuracy_metres,
            });
        }
    }
    None
}

fn bursa_wolf_matrix(bw: &BursaWolf) -> Matrix {
    let s = bw.scale;
    #[rustfmt::skip]
    let linear = [
        s,        -s * bw.rz,  s * bw.ry,
        s * bw.rz,  s,        -s * bw.rx,
       -s * bw.ry,  s * bw.rx,  s,
    ];
    Matrix::affine(3, &linear, &[bw.dx, bw.dy, bw.dz])
}

fn geodetic_to_geodetic(s: &GeodeticCrs, t: &GeodeticCrs) -> Result<CoordinateOperation> {
    let s_repr = representation(s.cs.kind);
    let t_repr = representation(t.cs.kind);
    if s_repr == Representation::Unsupported || t_repr == Representation::Unsupported {
        return Err(Error::OperationNotFound {
            source: s.name.clone(),
            target: t.name.clone(),
        });
    }

    if s.datum.is_equivalent_to(&t.datum, DATUM_TOLERANCE) {
        return geodetic_axis_change(s, t, s_repr, t_repr);
    }

    let candidates = geodetic_to_geodetic_candidates(s, t)?.ok_or_else(|| Error::OperationNotFound {
        source: s.name.clone(),
        target: t.name.clone(),
    })?;
    Ok(candidates.into_iter().next().expect("Some(candidates) is never empty"))
}

/// Same-datum `Geodetic -> Geodetic`: a pure axis/unit/representation
/// change (ellipsoidal <-> geocentric, 2D <-> 3D, axis reorder), never a
/// datum shift. Spec 4.I's "Identity" method, generalised past the
/// literal no-op to cover the representation change a CRS pair like
/// `EPSG:4326` -> `EPSG:4978` still needs on the same datum.
fn geodetic_axis_change(s: &GeodeticCrs, t: &GeodeticCrs, s_repr: Representation, t_repr: Representation) -> Result<CoordinateOperation> {
    let mt = if s_repr == t_repr {
        match s_repr {
            Representation::Ellipsoidal => geodetic_cs_change(&s.cs, &t.cs)?,
            Representation::Geocentric => AffineTransform::new(s.cs.normalization_matrix_to(&t.cs)?),
            Representation::Unsupported => unreachable!(),
        }
    } else {
        let axis_in = match s_repr {
            Representation::Ellipsoidal => geodetic_cs_change(&s.cs, &canonical_cs(s_repr))?,
            Representation::Geocentric => AffineTransform::new(s.cs.normalization_matrix_to(&canonical_cs(s_repr))?),
            Representation::Unsupported => unreachable!(),
        };
        let core = GeocentricConversion::new(s.datum.ellipsoid, t_repr == Representation::Geocentric);
        let axis_out = match t_repr {
            Representation::Ellipsoidal => geodetic_cs_change(&canonical_cs(t_repr), &t.cs)?,
            Representation::Geocentric => AffineTransform::new(canonical_cs(t_repr).normalization_matrix_to(&t.cs)?),
            Representation::Unsupported => unreachable!(),
        };
        Concatenated::new(vec![axis_in, core, axis_out])
    };
    Ok(CoordinateOperation::new(
        format!("{} -> {} (axis/dimension change)", s.name, t.name),
        OperationKind::Conversion,
        s.name.clone(),
        t.name.clone(),
        mt,
    ))
}

/// Every named datum-shift method spec 4.I lists for `Geodetic ->
/// Geodetic` when the two datums differ ("Position Vector / Geocentric
/// Translation / Abridged Molodensky / Identity"), ranked best first.
/// `None` when there is nothing to rank: same datum (only the axis
/// change in [`geodetic_axis_change`] applies), an unsupported
/// representation, or no known shift between the datums -- in all three
/// cases the caller falls through to its ordinary error path.
///
/// Position Vector / Geocentric Translation (the full geocentric-XYZ
/// round trip) is exact for any Bursa-Wolf parameter set and always
/// applies; Abridged Molodensky is a first-order approximation valid
/// only when the shift is a pure translation, in which case it ranks
/// first -- matching this finder's pre-existing preference for the
/// cheaper method when it is applicable.
fn geodetic_to_geodetic_candidates(s: &GeodeticCrs, t: &GeodeticCrs) -> Result<Option<Vec<CoordinateOperation>>> {
    let s_repr = representation(s.cs.kind);
    let t_repr = representation(t.cs.kind);
    if s_repr == Representation::Unsupported || t_repr == Representation::Unsupported {
        return Ok(None);
    }
    if s.datum.is_equivalent_to(&t.datum, DATUM_TOLERANCE) {
        return Ok(None);
    }
    let shift = match known_datum_shift(&s.datum, &t.datum) {
        Some(shift) => shift,
        None => return Ok(None),
    };

    let mut steps = Vec::new();
    steps.push(match s_repr {
        Representation::Ellipsoidal => geodetic_cs_change(&s.cs, &CoordinateSystem::ellipsoidal_3d_radians())?,
        Representation::Geocentric => AffineTransform::new(s.cs.normalization_matrix_to(&CoordinateSystem::geocentric())?),
        Representation::Unsupported => unreachable!(),
    });
    if s_repr == Representation::Ellipsoidal {
        steps.push(GeocentricConversion::new(s.datum.ellipsoid, true));
    }
    steps.push(AffineTransform::new(bursa_wolf_matrix(&shift.params)));
    if t_repr == Representation::Ellipsoidal {
        steps.push(GeocentricConversion::new(t.datum.ellipsoid, false));
    }
    steps.push(match t_repr {
        Representation::Ellipsoidal => geodetic_cs_change(&CoordinateSystem::ellipsoidal_3d_radians(), &t.cs)?,
        Representation::Geocentric => AffineTransform::new(CoordinateSystem::geocentric().normalization_matrix_to(&t.cs)?),
        Representation::Unsupported => unreachable!(),
    });
    let position_vector_op = CoordinateOperation::new(
        format!("{} -> {} (Position Vector transformation)", s.name, t.name),
        OperationKind::Transformation,
        s.name.clone(),
        t.name.clone(),
        Concatenated::new(steps),
    )
    .with_accuracy(shift.accuracy_metres);

    let molodensky_op = (s_repr == Representation::Ellipsoidal && t_repr == Representation::Ellipsoidal && shift.is_pure_translation())
        .then(|| -> Result<CoordinateOperation> {
            let axis_in = geodetic_cs_change(&s.cs, &CoordinateSystem::ellipsoidal_3d_radians())?;
            let core: MathTransformRef = Arc::new(AbridgedMolodenskyTransform {
                source: s.datum.ellipsoid,
                target: t.datum.ellipsoid,
                dx: shift.params.dx,
                dy: shift.params.dy,
                dz: shift.params.dz,
            });
            let axis_out = geodetic_cs_change(&CoordinateSystem::ellipsoidal_3d_radians(), &t.cs)?;
            Ok(CoordinateOperation::new(
                format!("{} -> {} (Abridged Molodensky transformation)", s.name, t.name),
                OperationKind::Transformation,
                s.name.clone(),
                t.name.clone(),
                Concatenated::new(vec![axis_in, core, axis_out]),
            )
            .with_accuracy(shift.accuracy_metres))
        })
        .transpose()?;

    Ok(Some(match molodensky_op {
        Some(m) => vec![m, position_vector_op],
        None => vec![position_vector_op],
    }))
}

fn vertical_to_vertical(s: &VerticalCrs, t: &VerticalCrs) -> Result<CoordinateOperation> {
    if !s.datum.is_equivalent_to(&t.datum) {
        return Err(Error::OperationNotFound {
            source: s.name.clone(),
            target: t.name.clone(),
        });
    }
    let m = s.cs.normalization_matrix_to(&t.cs)?;
    Ok(CoordinateOperation::new(
        format!("{} -> {}", s.name, t.name),
        OperationKind::Conversion,
        s.name.clone(),
        t.name.clone(),
        AffineTransform::new(m),
    ))
}

fn temporal_to_temporal(s: &TemporalCrs, t: &TemporalCrs) -> Result<CoordinateOperation> {
    let day = crate::units::find_unit("day").expect("day unit is registered");
    let s_to_day = s.cs.axes[0].unit.ratio_to(&day)?;
    let day_to_t = day.ratio_to(&t.cs.axes[0].unit)?;
    let scale = s_to_day * day_to_t;
    let offset_days = s.datum.origin_julian_date - t.datum.origin_julian_date;
    let translation = offset_days * day_to_t;
    let m = Matrix::affine(1, &[scale], &[translation]);
    Ok(CoordinateOperation::new(
        format!("{} -> {}", s.name, t.name),
        OperationKind::Conversion,
        s.name.clone(),
        t.name.clone(),
        AffineTransform::new(m),
    ))
}

/// Engineering datums carry no numeric parameters, so two distinct ones
/// can only ever be related by an operation the caller supplies
/// themselves (see [`crate::datum::EngineeringDatum`]'s doc comment).
fn engineering_to_engineering(s: &EngineeringCrs, t: &EngineeringCrs) -> Result<CoordinateOperation> {
    Err(Error::OperationNotFound {
        source: s.name.clone(),
        target: t.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{Conversion, ProjectedCrs};
    use crate::parameter::ParameterValue;
    use approx::assert_abs_diff_eq;

    fn wgs84_lon_lat() -> Crs {
        Crs::Geodetic(GeodeticCrs::new("WGS 84 (CRS:84)", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d()).unwrap())
    }

    fn wgs84_lat_lon() -> Crs {
        Crs::Geodetic(
            GeodeticCrs::new("WGS 84", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d_lat_lon()).unwrap(),
        )
    }

    #[test]
    fn identical_crs_yields_identity() {
        let op = find_operation(&wgs84_lon_lat(), &wgs84_lon_lat()).unwrap();
        let out = op.math_transform.forward(&[1.0, 2.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn axis_order_mismatch_produces_a_swap() {
        let op = find_operation(&wgs84_lat_lon(), &wgs84_lon_lat()).unwrap();
        assert_eq!(op.kind, OperationKind::Conversion);
        let out = op.math_transform.forward(&[40.0, -105.0]).unwrap();
        assert_abs_diff_eq!(out[0], -105.0);
        assert_abs_diff_eq!(out[1], 40.0);
    }

    #[test]
    fn geodetic_to_pseudo_mercator() {
        let base = wgs84_lon_lat();
        let params = ParameterValueGroup::new()
            .with("false_easting", ParameterValue::linear(0.0))
            .with("false_northing", ParameterValue::linear(0.0));
        let conv = Conversion::new("Web Mercator", "Popular Visualisation Pseudo Mercator", params);
        let projected = Crs::Projected(
            ProjectedCrs::new("WGS 84 / Pseudo-Mercator", base, conv, CoordinateSystem::cartesian_2d()).unwrap(),
        );
        let op = find_operation(&wgs84_lon_lat(), &projected).unwrap();
        let out = op.math_transform.forward(&[0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(out[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn unknown_datum_pair_is_not_found() {
        let a = Crs::Geodetic(GeodeticCrs::new("A", GeodeticDatum::new("Made Up Datum", crate::ellipsoid::wgs84(), crate::prime_meridian::GREENWICH), CoordinateSystem::ellipsoidal_2d()).unwrap());
        let op = find_operation(&a, &wgs84_lon_lat());
        assert!(matches!(op, Err(Error::OperationNotFound { .. })));
    }

    #[test]
    fn find_operations_wraps_a_single_result_for_ordinary_pairs() {
        let ops = find_operations(&wgs84_lat_lon(), &wgs84_lon_lat()).unwrap();
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn find_operations_ranks_molodensky_ahead_of_position_vector() {
        let wgs84 = wgs84_lon_lat();
        let nad27 = crate::authority::resolve_crs("EPSG:4267").unwrap();
        let ops = find_operations(&wgs84, &nad27).unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops[0].name.contains("Molodensky"));
        assert!(ops[1].name.contains("Position Vector"));
        // find_operation (singular) must agree with the top-ranked alternative.
        let primary = find_operation(&wgs84, &nad27).unwrap();
        assert_eq!(primary.name, ops[0].name);
    }

    #[test]
    fn create_operation_and_create_operations_alias_the_finder() {
        let ops = create_operations(&wgs84_lat_lon(), &wgs84_lon_lat()).unwrap();
        let single = create_operation(&wgs84_lat_lon(), &wgs84_lon_lat()).unwrap();
        assert_eq!(ops[0].name, single.name);
    }

    #[test]
    fn recursion_guard_trips_on_self_referential_path() {
        let mut path = vec![("A".to_string(), "B".to_string())];
        let err = find_operation_guarded(
            &Crs::Geodetic(GeodeticCrs::new("A", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d()).unwrap()),
            &Crs::Geodetic(GeodeticCrs::new("B", GeodeticDatum::wgs84(), CoordinateSystem::ellipsoidal_2d_lat_lon()).unwrap()),
            &mut path,
        );
        assert!(matches!(err, Err(Error::RecursiveCreate { .. })));
    }
}
