//!
//! [`Transform`] implementations for the primitive point representations
//! callers are likely to already have lying around.
//!

use crate::transform::Transform;

impl Transform for (f64, f64) {
    fn dim(&self) -> usize {
        2
    }
    fn write_into(&self, buf: &mut [f64]) {
        buf[0] = self.0;
        buf[1] = self.1;
    }
    fn read_from(&mut self, buf: &[f64]) {
        self.0 = buf[0];
        self.1 = buf[1];
    }
}

impl Transform for (f64, f64, f64) {
    fn dim(&self) -> usize {
        3
    }
    fn write_into(&self, buf: &mut [f64]) {
        buf[0] = self.0;
        buf[1] = self.1;
        buf[2] = self.2;
    }
    fn read_from(&mut self, buf: &[f64]) {
        self.0 = buf[0];
        self.1 = buf[1];
        self.2 = buf[2];
    }
}

impl Transform for [f64; 2] {
    fn dim(&self) -> usize {
        2
    }
    fn write_into(&self, buf: &mut [f64]) {
        buf.copy_from_slice(self);
    }
    fn read_from(&mut self, buf: &[f64]) {
        self.copy_from_slice(buf);
    }
}

impl Transform for [f64; 3] {
    fn dim(&self) -> usize {
        3
    }
    fn write_into(&self, buf: &mut [f64]) {
        buf.copy_from_slice(self);
    }
    fn read_from(&mut self, buf: &[f64]) {
        self.copy_from_slice(buf);
    }
}

#[cfg(feature = "geo-types")]
mod geo_types;
