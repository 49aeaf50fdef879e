use geo_types::{Coord, Point};

use crate::transform::Transform;

impl Transform for Point {
    fn dim(&self) -> usize {
        2
    }
    fn write_into(&self, buf: &mut [f64]) {
        buf[0] = self.0.x;
        buf[1] = self.0.y;
    }
    fn read_from(&mut self, buf: &[f64]) {
        self.0.x = buf[0];
        self.0.y = buf[1];
    }
}

impl Transform for Coord {
    fn dim(&self) -> usize {
        2
    }
    fn write_into(&self, buf: &mut [f64]) {
        buf[0] = self.x;
        buf[1] = self.y;
    }
    fn read_from(&mut self, buf: &[f64]) {
        self.x = buf[0];
        self.y = buf[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority;
    use crate::transform::transform;
    use approx::assert_abs_diff_eq;

    #[test]
    fn transforms_a_geo_types_point_in_place() {
        let geo = authority::resolve_crs("CRS:84").unwrap();
        let utm = authority::universal(2.3522, 48.8566).unwrap();

        let mut pt = Point::new(2.3522, 48.8566);
        transform(&geo, &utm, &mut pt).unwrap();
        assert!(pt.x() > 400_000.0 && pt.x() < 500_000.0);

        transform(&utm, &geo, &mut pt).unwrap();
        assert_abs_diff_eq!(pt.x(), 2.3522, epsilon = 1e-6);
        assert_abs_diff_eq!(pt.y(), 48.8566, epsilon = 1e-6);
    }
}
