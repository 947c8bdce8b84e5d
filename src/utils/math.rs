//! Additional math helpers layered on top of `glam`.

use glam::Vec2;

/// Planar operations `glam::Vec2` does not name directly.
pub trait Vec2Ext {
    /// Scalar 2D cross product (`x1 * y2 - y1 * x2`).
    fn cross(self, other: Vec2) -> f32;

    /// Rotates the point around `center` by `angle` radians.
    fn rotate_about(self, center: Vec2, angle: f32) -> Vec2;

    /// Unit vector in the same direction, or `fallback` when the length is
    /// zero or not finite.
    fn normalize_or_fallback(self, fallback: Vec2) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn cross(self, other: Vec2) -> f32 {
        self.perp_dot(other)
    }

    #[inline]
    fn rotate_about(self, center: Vec2, angle: f32) -> Vec2 {
        center + Vec2::from_angle(angle).rotate(self - center)
    }

    #[inline]
    fn normalize_or_fallback(self, fallback: Vec2) -> Vec2 {
        self.try_normalize().unwrap_or(fallback)
    }
}

/// Linear velocity of a point at lever arm `r` produced by angular velocity `w`.
#[inline]
pub fn cross_scalar(w: f32, r: Vec2) -> Vec2 {
    Vec2::new(-w * r.y, w * r.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotate_about_quarter_turn() {
        let p = Vec2::new(2.0, 1.0).rotate_about(Vec2::new(1.0, 1.0), FRAC_PI_2);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn cross_matches_angular_lever() {
        let r = Vec2::new(3.0, -1.0);
        let n = Vec2::new(0.6, 0.8);
        let w = 2.5;
        assert_relative_eq!(cross_scalar(w, r).dot(n), w * r.cross(n), epsilon = 1e-5);
    }

    #[test]
    fn degenerate_vectors_use_fallback() {
        assert_eq!(Vec2::ZERO.normalize_or_fallback(Vec2::X), Vec2::X);
        assert_eq!(
            Vec2::new(0.0, 4.0).normalize_or_fallback(Vec2::X),
            Vec2::Y
        );
    }
}
