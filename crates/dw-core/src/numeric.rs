use crate::DwError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, DwError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DwError::NonFinite { what, value: v })
    }
}

/// Absolute difference between two headings in degrees, folded into `[0, 180]`.
pub fn angle_difference_deg(a: Real, b: Real) -> Real {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Euclidean distance between two canvas points.
pub fn distance(a: (Real, Real), b: (Real, Real)) -> Real {
    (b.0 - a.0).hypot(b.1 - a.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn angle_difference_folds() {
        assert_eq!(angle_difference_deg(0.0, 90.0), 90.0);
        assert_eq!(angle_difference_deg(350.0, 10.0), 20.0);
        assert_eq!(angle_difference_deg(0.0, 180.0), 180.0);
        assert_eq!(angle_difference_deg(-90.0, 90.0), 180.0);
        assert_eq!(angle_difference_deg(720.0, 45.0), 45.0);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
    }

    proptest! {
        #[test]
        fn angle_difference_in_range(a in -1080.0_f64..1080.0, b in -1080.0_f64..1080.0) {
            let d = angle_difference_deg(a, b);
            prop_assert!((0.0..=180.0).contains(&d));
            prop_assert!((d - angle_difference_deg(b, a)).abs() < 1e-9);
        }
    }
}
