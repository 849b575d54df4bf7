// dw-core/src/units.rs

use uom::si::f64::Length as UomLength;
use uom::si::length::{foot, inch as uom_inch};

use crate::Real;

// Public canonical unit types (SI, f64)
pub type Length = UomLength;

/// Canvas pixels per foot at the default zoom.
pub const DEFAULT_PIXELS_PER_FOOT: Real = 12.0;

#[inline]
pub fn ft(v: f64) -> Length {
    Length::new::<foot>(v)
}

#[inline]
pub fn inch(v: f64) -> Length {
    Length::new::<uom_inch>(v)
}

#[inline]
pub fn as_feet(l: Length) -> f64 {
    l.get::<foot>()
}

#[inline]
pub fn as_inches(l: Length) -> f64 {
    l.get::<uom_inch>()
}

/// Conversion between physical lengths and canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasScale {
    pub pixels_per_foot: Real,
}

impl CanvasScale {
    pub fn new(pixels_per_foot: Real) -> Self {
        Self { pixels_per_foot }
    }

    pub fn to_canvas(&self, length: Length) -> Real {
        as_feet(length) * self.pixels_per_foot
    }
}

impl Default for CanvasScale {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_FOOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_feet_is_120_pixels() {
        let scale = CanvasScale::default();
        assert!((scale.to_canvas(ft(10.0)) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn canvas_units_follow_scale() {
        let scale = CanvasScale::new(24.0);
        assert!((scale.to_canvas(inch(6.0)) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn inches_and_feet_agree() {
        assert!((as_inches(ft(1.0)) - 12.0).abs() < 1e-9);
    }
}
