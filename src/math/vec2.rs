//! 2D vectors and the unit-direction invariant type.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};
use vek::Vec2 as VekVec2;

/// An ordered pair of reals.
///
/// Thin wrapper around `vek::Vec2<f64>` rather than using it directly: it
/// keeps the public surface of this crate independent of `vek`'s own
/// version churn, the way the teacher wraps `nalgebra`/`vek` types behind
/// its own `Iso`/`Rotation` in `math.rs`.
pub type Vec2 = VekVec2<f64>;

/// Squared length, avoiding a `sqrt` when only comparing magnitudes.
#[inline]
pub fn length_squared(v: Vec2) -> f64 {
    v.dot(v)
}

/// Perpendicular dot product (2D cross product), `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Cross of a scalar (out-of-plane angular velocity) with a vector,
/// producing the linear velocity contribution `ω × r`.
#[inline]
pub fn cross_scalar_vec(s: f64, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// Unit-length direction vector.
///
/// The zero vector is a valid, distinguishable `UnitVec2` value
/// (`UnitVec2::invalid()`) rather than a panic, per the data model:
/// callers that fail to normalize (e.g. two coincident contact points)
/// get a representable "no direction" rather than a NaN explosion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitVec2 {
    cos: f64,
    sin: f64,
}

impl UnitVec2 {
    /// The positive X axis; the identity direction.
    pub const UNIT_X: Self = Self { cos: 1.0, sin: 0.0 };
    /// The positive Y axis.
    pub const UNIT_Y: Self = Self { cos: 0.0, sin: 1.0 };

    /// The distinguishable "no direction" value.
    #[inline]
    pub const fn invalid() -> Self {
        Self { cos: 0.0, sin: 0.0 }
    }

    /// Whether this is the invalid (zero) direction.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.cos != 0.0 || self.sin != 0.0
    }

    /// Normalize a vector into a unit direction.
    ///
    /// Returns [`UnitVec2::invalid`] if `v` is (numerically) the zero
    /// vector, matching the source's `UnitVec2::Get` out-parameter for
    /// magnitude alongside a safe fallback direction.
    #[inline]
    pub fn new_normalize(v: Vec2) -> (Self, f64) {
        let len = (v.x * v.x + v.y * v.y).sqrt();
        if len < f64::EPSILON {
            (Self::invalid(), 0.0)
        } else {
            (
                Self {
                    cos: v.x / len,
                    sin: v.y / len,
                },
                len,
            )
        }
    }

    /// Construct directly from an already-normalized `(cos, sin)` pair.
    #[inline]
    pub fn from_cos_sin(cos: f64, sin: f64) -> Self {
        Self { cos, sin }
    }

    /// Construct from an angle in radians.
    #[inline]
    pub fn from_angle(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { cos, sin }
    }

    /// Angle in radians, `atan2(sin, cos)`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.sin.atan2(self.cos)
    }

    /// Cosine component.
    #[inline]
    pub const fn cos(self) -> f64 {
        self.cos
    }

    /// Sine component.
    #[inline]
    pub const fn sin(self) -> f64 {
        self.sin
    }

    /// As a plain `Vec2`.
    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.cos, self.sin)
    }

    /// The perpendicular (rotated +90°) direction.
    #[inline]
    pub fn perp(self) -> Self {
        Self {
            cos: -self.sin,
            sin: self.cos,
        }
    }

    /// Rotate a point by this direction, treated as a rotation.
    #[inline]
    pub fn rotate(self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.cos * point.x - self.sin * point.y,
            self.sin * point.x + self.cos * point.y,
        )
    }

    /// Inverse-rotate a point (rotate by the conjugate direction).
    #[inline]
    pub fn inverse_rotate(self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.cos * point.x + self.sin * point.y,
            -self.sin * point.x + self.cos * point.y,
        )
    }
}

impl Default for UnitVec2 {
    #[inline]
    fn default() -> Self {
        Self::UNIT_X
    }
}

/// Compose two rotations (multiply as complex numbers).
impl Mul for UnitVec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            cos: self.cos * rhs.cos - self.sin * rhs.sin,
            sin: self.sin * rhs.cos + self.cos * rhs.sin,
        }
    }
}

impl Neg for UnitVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

impl Add<f64> for UnitVec2 {
    type Output = Self;
    #[inline]
    fn add(self, radians: f64) -> Self {
        self * Self::from_angle(radians)
    }
}

impl Sub<f64> for UnitVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, radians: f64) -> Self {
        self * Self::from_angle(-radians)
    }
}

impl AddAssign<f64> for UnitVec2 {
    #[inline]
    fn add_assign(&mut self, radians: f64) {
        *self = *self + radians;
    }
}

impl SubAssign<f64> for UnitVec2 {
    #[inline]
    fn sub_assign(&mut self, radians: f64) {
        *self = *self - radians;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_normalizes_to_invalid() {
        let (dir, len) = UnitVec2::new_normalize(Vec2::zero());
        assert_eq!(dir, UnitVec2::invalid());
        assert_eq!(len, 0.0);
        assert!(!dir.is_valid());
    }

    #[test]
    fn rotate_and_inverse_rotate_round_trip() {
        let dir = UnitVec2::from_angle(0.7);
        let p = Vec2::new(3.0, -2.0);
        let rotated = dir.rotate(p);
        let back = dir.inverse_rotate(rotated);
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn composition_adds_angles() {
        let a = UnitVec2::from_angle(0.3);
        let b = UnitVec2::from_angle(0.4);
        let composed = a * b;
        assert!((composed.angle() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn perp_is_90_degrees() {
        let dir = UnitVec2::UNIT_X;
        assert_eq!(dir.perp(), UnitVec2::UNIT_Y);
    }
}
