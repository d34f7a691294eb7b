//! Rigid transformations and swept motion.

use super::vec2::{UnitVec2, Vec2};

/// A rigid transformation: a rotation followed by a translation.
///
/// Identity is `(origin, +x axis)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    /// Translation component.
    pub position: Vec2,
    /// Rotation component.
    pub rotation: UnitVec2,
}

impl Transformation {
    /// The identity transformation.
    pub const IDENTITY: Self = Self {
        position: Vec2 { x: 0.0, y: 0.0 },
        rotation: UnitVec2::UNIT_X,
    };

    /// Construct from a position and rotation.
    #[inline]
    pub fn new(position: Vec2, rotation: UnitVec2) -> Self {
        Self { position, rotation }
    }

    /// Transform a local point into world space.
    #[inline]
    pub fn transform(&self, local_point: Vec2) -> Vec2 {
        self.rotation.rotate(local_point) + self.position
    }

    /// Transform a world point into this transform's local space.
    #[inline]
    pub fn inverse_transform(&self, world_point: Vec2) -> Vec2 {
        self.rotation.inverse_rotate(world_point - self.position)
    }

    /// Transform a local direction into world space (rotation only).
    #[inline]
    pub fn transform_direction(&self, local_dir: Vec2) -> Vec2 {
        self.rotation.rotate(local_dir)
    }

    /// Transform a world direction into local space (rotation only).
    #[inline]
    pub fn inverse_transform_direction(&self, world_dir: Vec2) -> Vec2 {
        self.rotation.inverse_rotate(world_dir)
    }

    /// Compose two transforms: `self * other`, applying `other` first.
    #[inline]
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            position: self.transform(other.position),
        }
    }

    /// `self.inverse() * other`, the transform of `other` relative to `self`.
    #[inline]
    pub fn inv_mul(&self, other: &Self) -> Self {
        Self {
            rotation: -self.rotation * other.rotation,
            position: self.inverse_transform(other.position),
        }
    }
}

impl Default for Transformation {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Motion of a body's center of mass over one step, enabling partial-step
/// re-interpolation for continuous collision detection.
///
/// `local_center` is the body-local center of mass (the sweep interpolates
/// the center of mass, not the body origin, to keep rotation numerically
/// well-behaved); `transform_at` reconstructs the full world transform at a
/// given `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Local center of mass, in body-local coordinates.
    pub local_center: Vec2,
    /// Center of mass position at the start of the step.
    pub center0: Vec2,
    /// Center of mass position at the end of the step (or "current").
    pub center1: Vec2,
    /// Orientation at the start of the step.
    pub rotation0: UnitVec2,
    /// Orientation at the end of the step (or "current").
    pub rotation1: UnitVec2,
    /// How far along the step `center0`/`rotation0` are, in `[0, 1]`.
    pub alpha0: f64,
}

impl Sweep {
    /// Construct a sweep at rest at the given world transform.
    pub fn at_rest(transform: Transformation, local_center: Vec2) -> Self {
        let center = transform.transform(local_center);
        Self {
            local_center,
            center0: center,
            center1: center,
            rotation0: transform.rotation,
            rotation1: transform.rotation,
            alpha0: 0.0,
        }
    }

    /// Interpolate the transform at `alpha ∈ [alpha0, 1]`.
    ///
    /// At `alpha == alpha0` this reproduces `(center0, rotation0)`; at
    /// `alpha == 1` it reproduces `(center1, rotation1)`.
    pub fn transform_at(&self, alpha: f64) -> Transformation {
        let denom = 1.0 - self.alpha0;
        let t = if denom.abs() < f64::EPSILON {
            1.0
        } else {
            (alpha - self.alpha0) / denom
        };

        let center = self.center0 + (self.center1 - self.center0) * t;
        let rotation = slerp(self.rotation0, self.rotation1, t);

        // The sweep interpolates the center of mass; recover the body
        // origin by rotating the local center offset back out.
        let position = center - rotation.rotate(self.local_center);
        Transformation::new(position, rotation)
    }

    /// Re-anchor `alpha0` to `alpha`, reinterpolating `center0`/`rotation0`
    /// while leaving `center1`/`rotation1` fixed. Used by the TOI phase to
    /// "fast-forward" a body's sweep to the instant of its earliest
    /// impact, so the next TOI query starts from there instead of from the
    /// beginning of the step.
    pub fn advance(&mut self, alpha: f64) {
        debug_assert!(alpha >= self.alpha0 && alpha <= 1.0);
        let denom = 1.0 - self.alpha0;
        let t = if denom.abs() < f64::EPSILON {
            0.0
        } else {
            (alpha - self.alpha0) / denom
        };

        self.center0 += (self.center1 - self.center0) * t;
        self.rotation0 = slerp(self.rotation0, self.rotation1, t);
        self.alpha0 = alpha;
    }

    /// Normalize `rotation0`/`rotation1` (guards drift after many small
    /// incremental updates); a no-op here since `UnitVec2` is always
    /// constructed from a normalized `(cos, sin)` pair, kept for parity
    /// with the source's `Sweep::Normalize` which re-derives the angle
    /// modulo 2π.
    pub fn normalize(&mut self) {}
}

/// Linear interpolation between two unit directions by angle, which is
/// adequate for the small per-substep rotations the solver produces (no
/// need for true spherical interpolation in 2D — "slerp" here just means
/// interpolating the scalar angle and re-deriving `(cos, sin)`).
fn slerp(a: UnitVec2, b: UnitVec2, t: f64) -> UnitVec2 {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    let relative = (-a) * b;
    a * UnitVec2::from_angle(relative.angle() * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_inverse_transform_round_trip() {
        let xf = Transformation::new(Vec2::new(3.0, -1.0), UnitVec2::from_angle(0.5));
        let p = Vec2::new(2.0, 4.0);
        let local = xf.inverse_transform(xf.transform(p));
        assert!((local.x - p.x).abs() < 1e-9);
        assert!((local.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn sweep_endpoints_reproduce_exactly() {
        let xf0 = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::from_angle(0.0));
        let sweep = Sweep::at_rest(xf0, Vec2::zero());
        let mut sweep = sweep;
        sweep.center1 = Vec2::new(1.0, 2.0);
        sweep.rotation1 = UnitVec2::from_angle(0.3);

        let at0 = sweep.transform_at(0.0);
        assert!((at0.position.x - sweep.center0.x).abs() < 1e-9);

        let at1 = sweep.transform_at(1.0);
        assert!((at1.position.x - sweep.center1.x).abs() < 1e-9);
        assert!((at1.position.y - sweep.center1.y).abs() < 1e-9);
    }

    #[test]
    fn advance_reanchors_alpha0() {
        let xf0 = Transformation::IDENTITY;
        let mut sweep = Sweep::at_rest(xf0, Vec2::zero());
        sweep.center1 = Vec2::new(10.0, 0.0);

        sweep.advance(0.5);
        assert_eq!(sweep.alpha0, 0.5);
        assert!((sweep.center0.x - 5.0).abs() < 1e-9);

        // Interpolating from the new alpha0 to 1 should still land on center1.
        let at1 = sweep.transform_at(1.0);
        assert!((at1.position.x - 10.0).abs() < 1e-9);
    }
}
