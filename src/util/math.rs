//! Math type re-exports and small numeric helpers.
//!
//! The codec does all of its matrix/quaternion work in double precision,
//! so only the `D`-prefixed glam types are re-exported here.

// Re-export glam types
pub use glam::{DMat3, DMat4, DQuat, DVec2, DVec3, DVec4};

/// Linear interpolation between `a` and `b` with `t` in [0, 1].
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Round to six decimal digits, the precision the text format carries.
#[inline]
pub fn round6(v: f64) -> f64 {
    (v * 1.0e6).round() / 1.0e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(1.23456789), 1.234568);
        assert_eq!(round6(-0.0000004), -0.0);
        assert_eq!(round6(45.0), 45.0);
    }
}
