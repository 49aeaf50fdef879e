use super::consts::{EPS_12, PI, TAU};

/// Reduce a longitude (radians) to `(-pi, pi]`, letting it slightly
/// overshoot the bound to avoid spurious sign flips right at the date line.
pub(crate) fn adjlon(mut lon: f64) -> f64 {
    if lon.abs() >= PI + EPS_12 {
        lon += PI;
        lon -= TAU * (lon / TAU).floor();
        lon -= PI;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn within_range_is_unchanged() {
        assert_abs_diff_eq!(adjlon(0.1), 0.1);
    }

    #[test]
    fn wraps_past_the_date_line() {
        assert_abs_diff_eq!(adjlon(PI + 0.1), -PI + 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(adjlon(-PI - 0.1), PI - 0.1, epsilon = 1e-12);
    }
}
