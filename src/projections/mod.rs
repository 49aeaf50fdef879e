//!
//! Map projections.
//!
//! Each projection implements the [`Projection`] trait on *normalised*
//! coordinates: input longitude/latitude already in radians relative to the
//! projection's own central meridian, output in ellipsoid-radius units
//! (i.e. as if `a == 1`). [`build_conversion`] surrounds a `Projection`
//! with the normalization/denormalization affine pair described in spec
//! section 4.F, producing the `MathTransform` the operation finder actually
//! wires into a pipeline. Keeping the affine pair separate from the
//! nonlinear core is what lets `operation_finder.rs` merge the
//! denormalization of one step with the normalization of the next by plain
//! matrix multiplication.
//!

mod albers_equal_area;
mod equirectangular;
mod lambert_conformal_conic;
mod mercator;
mod mollweide;
mod orthographic;
mod polar_stereographic;
mod polyconic;
mod sinusoidal;
mod transverse_mercator;
mod utm;

pub use albers_equal_area::AlbersEqualArea;
pub use equirectangular::Equirectangular;
pub use lambert_conformal_conic::LambertConformalConic;
pub use mercator::Mercator;
pub use mollweide::Mollweide;
pub use orthographic::Orthographic;
pub use polar_stereographic::{universal_polar_stereographic, PolarStereographic, UpsHemisphere};
pub use polyconic::Polyconic;
pub use sinusoidal::Sinusoidal;
pub use transverse_mercator::TransverseMercator;
pub use utm::{universal, universal_zone, UtmZone};

use crate::errors::Result;
use crate::math_transform::{AffineTransform, Concatenated, Jacobian, MathTransform, MathTransformRef};
use crate::matrix::Matrix;
use std::fmt;
use std::sync::Arc;

/// The evaluable core of a map projection: forward/inverse on normalised
/// ellipsoidal coordinates, with an optional analytical derivative.
/// Implementors are expected to special-case `e == 0` internally (the
/// "spherical specialisation" of spec 4.F) rather than exposing a second
/// type, since every concrete projection in this module has a closed-form
/// spherical degenerate.
pub trait Projection: fmt::Debug + Send + Sync {
    /// `(lambda, phi)` in radians -> `(x, y)` in ellipsoid-radius units.
    fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)>;

    /// `(x, y)` in ellipsoid-radius units -> `(lambda, phi)` in radians.
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)>;

    /// Analytical Jacobian at `(lambda, phi)`, where available.
    fn derivative(&self, _lam: f64, _phi: f64) -> Option<Jacobian> {
        None
    }

    fn name(&self) -> &'static str;
}

/// Wraps a [`Projection`] as a 2D-to-2D [`MathTransform`] on normalised
/// coordinates (no scale, no false easting/northing -- those live in the
/// surrounding affines built by [`build_conversion`]).
#[derive(Debug, Clone)]
struct ProjectedTransform(Arc<dyn Projection>);

impl MathTransform for ProjectedTransform {
    fn dim_in(&self) -> usize {
        2
    }
    fn dim_out(&self) -> usize {
        2
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let (x, y) = self.0.forward(input[0], input[1])?;
        Ok(vec![x, y])
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(Arc::new(InverseProjectedTransform(self.0.clone())))
    }
    fn jacobian(&self, input: &[f64]) -> Option<Jacobian> {
        self.0.derivative(input[0], input[1])
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[derive(Debug, Clone)]
struct InverseProjectedTransform(Arc<dyn Projection>);

impl MathTransform for InverseProjectedTransform {
    fn dim_in(&self) -> usize {
        2
    }
    fn dim_out(&self) -> usize {
        2
    }
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let (lam, phi) = self.0.inverse(input[0], input[1])?;
        Ok(vec![lam, phi])
    }
    fn try_inverse(&self) -> Result<MathTransformRef> {
        Ok(Arc::new(ProjectedTransform(self.0.clone())))
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Parameters common to essentially every projection's affine surround:
/// central meridian and false easting/northing are folded into the
/// normalization/denormalization matrices; `scale_factor` and the
/// ellipsoid's semi-major axis are folded into denormalization only.
#[derive(Debug, Clone, Copy)]
pub struct ConversionParams {
    pub central_meridian: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub scale_factor: f64,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            central_meridian: 0.0,
            false_easting: 0.0,
            false_northing: 0.0,
            scale_factor: 1.0,
        }
    }
}

/// Build the full forward `MathTransform` for a projection: normalise
/// (subtract central meridian), project, denormalise (scale by `a *
/// scale_factor`, add false easting/northing).
pub fn build_conversion(a: f64, projection: Arc<dyn Projection>, params: ConversionParams) -> MathTransformRef {
    let normalize = AffineTransform::new(Matrix::affine(
        2,
        &[1., 0., 0., 1.],
        &[-params.central_meridian, 0.0],
    ));
    let core: MathTransformRef = Arc::new(ProjectedTransform(projection));
    let k = a * params.scale_factor;
    let denormalize = AffineTransform::new(Matrix::affine(
        2,
        &[k, 0., 0., k],
        &[params.false_easting, params.false_northing],
    ));
    Concatenated::new(vec![normalize, core, denormalize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn build_conversion_applies_scale_and_false_origin() {
        let merc = Arc::new(Mercator::new(0.0).unwrap());
        let conv = build_conversion(
            6_378_137.0,
            merc,
            ConversionParams {
                central_meridian: 0.0,
                false_easting: 1000.0,
                false_northing: 2000.0,
                scale_factor: 1.0,
            },
        );
        let out = conv.forward(&[0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(out[0], 1000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 2000.0, epsilon = 1e-6);
    }
}
