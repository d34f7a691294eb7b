//! The joint seam: a trait any bilateral constraint implements, plus the
//! one concrete joint shipped against it.
//!
//! Only [`DistanceJoint`] is implemented as a worked example of the
//! trait. Revolute, prismatic, pulley, weld, and the rest of a typical
//! joint catalog are out of scope here — `Joint` is the extension point
//! a caller would implement the others against.

use crate::dynamics::body::{Body, BodyId};
use crate::dynamics::island::VelocityState;
use crate::math::Vec2;

/// Per-body read access a joint needs to build and solve its constraint,
/// mirroring the source's `BodyConstraint`: position/velocity plus the
/// inverse mass properties, addressed by island index rather than by
/// arena key so the solver can pass plain slices.
#[derive(Debug, Clone, Copy)]
pub struct JointBodyState {
    /// Center of mass position.
    pub center: Vec2,
    /// Orientation, radians.
    pub angle: f64,
    /// Linear velocity.
    pub linear_velocity: Vec2,
    /// Angular velocity, radians/second.
    pub angular_velocity: f64,
    /// `1 / mass`.
    pub inv_mass: f64,
    /// `1 / rotational inertia`.
    pub inv_rot_inertia: f64,
}

impl JointBodyState {
    pub(crate) fn from_body(body: &Body) -> Self {
        Self {
            center: body.sweep.center1,
            angle: body.sweep.rotation1.angle(),
            linear_velocity: body.linear_velocity,
            angular_velocity: body.angular_velocity,
            inv_mass: body.inv_mass,
            inv_rot_inertia: body.inv_rot_inertia,
        }
    }
}

/// A bilateral velocity/position constraint between exactly two bodies.
///
/// The three-phase call sequence mirrors the contact solver's own
/// warm-start / velocity-iterate / position-iterate structure (spec.md
/// solver phases), so a joint and a contact can be mixed freely within
/// one island's solve.
pub trait Joint {
    /// The first body.
    fn body_a(&self) -> BodyId;
    /// The second body.
    fn body_b(&self) -> BodyId;

    /// Compute the effective mass and bias terms for this step and apply
    /// the warm-start impulse carried over from the previous step to both
    /// bodies' velocity state.
    fn init_velocity_constraints(&mut self, a: &mut VelocityState, b: &mut VelocityState, a_state: &JointBodyState, b_state: &JointBodyState, dt: f64, warm_start: bool);

    /// One sequential-impulse velocity iteration.
    fn solve_velocity_constraints(&mut self, a: &mut VelocityState, b: &mut VelocityState, a_state: &JointBodyState, b_state: &JointBodyState);

    /// One Baumgarte-style position correction iteration; returns the
    /// remaining constraint error so the solver can judge convergence.
    fn solve_position_constraints(&mut self, a_center: &mut Vec2, a_angle: &mut f64, b_center: &mut Vec2, b_angle: &mut f64, a: &JointBodyState, b: &JointBodyState) -> f64;
}

/// Keeps the distance between two anchor points at a target length,
/// optionally as a soft (mass-spring-damper) constraint rather than a
/// rigid one.
///
/// Grounded on the source's `b2DistanceJoint`: a soft constraint uses
/// `frequency`/`damping_ratio` to derive a `gamma`/`bias` pair folded
/// into the effective mass, so `frequency == 0` recovers the rigid case
/// exactly (`gamma == 0`, `bias == 0`).
#[derive(Debug, Clone)]
pub struct DistanceJoint {
    body_a: BodyId,
    body_b: BodyId,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    length: f64,
    frequency: f64,
    damping_ratio: f64,

    // Per-step scratch, recomputed in `init_velocity_constraints`.
    u: Vec2,
    r_a: Vec2,
    r_b: Vec2,
    inv_mass_sum: f64,
    gamma: f64,
    bias: f64,
    impulse: f64,
}

impl DistanceJoint {
    /// A new distance joint between two local anchor points.
    pub fn new(body_a: BodyId, body_b: BodyId, local_anchor_a: Vec2, local_anchor_b: Vec2, length: f64) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            length: length.max(crate::constants::LINEAR_SLOP),
            frequency: 0.0,
            damping_ratio: 0.0,
            u: Vec2::zero(),
            r_a: Vec2::zero(),
            r_b: Vec2::zero(),
            inv_mass_sum: 0.0,
            gamma: 0.0,
            bias: 0.0,
            impulse: 0.0,
        }
    }

    /// Soften the constraint into a mass-spring-damper (0 disables
    /// softness and restores a rigid rod).
    pub fn with_softness(mut self, frequency: f64, damping_ratio: f64) -> Self {
        self.frequency = frequency.max(0.0);
        self.damping_ratio = damping_ratio;
        self
    }

    /// The rest length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The current accumulated normal impulse (for warm-start inspection
    /// or debugging).
    pub fn impulse(&self) -> f64 {
        self.impulse
    }
}

impl Joint for DistanceJoint {
    fn body_a(&self) -> BodyId {
        self.body_a
    }

    fn body_b(&self) -> BodyId {
        self.body_b
    }

    fn init_velocity_constraints(&mut self, a: &mut VelocityState, b: &mut VelocityState, a_state: &JointBodyState, b_state: &JointBodyState, dt: f64, warm_start: bool) {
        let a_body = a_state;
        let b_body = b_state;
        let rot_a = crate::math::UnitVec2::from_angle(a_body.angle);
        let rot_b = crate::math::UnitVec2::from_angle(b_body.angle);
        self.r_a = rot_a.rotate(self.local_anchor_a);
        self.r_b = rot_b.rotate(self.local_anchor_b);

        let d = (b.center + self.r_b) - (a.center + self.r_a);
        let (dir, length) = crate::math::UnitVec2::new_normalize(d);
        self.u = if dir.is_valid() {
            dir.as_vec2()
        } else {
            Vec2::new(1.0, 0.0)
        };

        let cr_a_u = crate::math::cross(self.r_a, self.u);
        let cr_b_u = crate::math::cross(self.r_b, self.u);
        let inv_mass = a_body.inv_mass + a_body.inv_rot_inertia * cr_a_u * cr_a_u + b_body.inv_mass + b_body.inv_rot_inertia * cr_b_u * cr_b_u;
        self.inv_mass_sum = if inv_mass > 0.0 { 1.0 / inv_mass } else { 0.0 };

        if self.frequency > 0.0 {
            let omega = 2.0 * std::f64::consts::PI * self.frequency;
            let c = length - self.length;
            let k = inv_mass;
            let m = if k > 0.0 { 1.0 / k } else { 0.0 };
            let cc = 2.0 * m * self.damping_ratio * omega;
            let kk = m * omega * omega;
            self.gamma = dt * (cc + dt * kk);
            self.gamma = if self.gamma > 0.0 { 1.0 / self.gamma } else { 0.0 };
            self.bias = c * dt * kk * self.gamma;
            let inv_eff = inv_mass + self.gamma;
            self.inv_mass_sum = if inv_eff > 0.0 { 1.0 / inv_eff } else { 0.0 };
        } else {
            self.gamma = 0.0;
            self.bias = 0.0;
        }

        if !warm_start {
            self.impulse = 0.0;
        }

        let p = self.u * self.impulse;
        a.linear_velocity -= p * a_body.inv_mass;
        a.angular_velocity -= a_body.inv_rot_inertia * crate::math::cross(self.r_a, p);
        b.linear_velocity += p * b_body.inv_mass;
        b.angular_velocity += b_body.inv_rot_inertia * crate::math::cross(self.r_b, p);
    }

    fn solve_velocity_constraints(&mut self, a: &mut VelocityState, b: &mut VelocityState, a_state: &JointBodyState, b_state: &JointBodyState) {
        let vp_a = a.linear_velocity + crate::math::cross_scalar_vec(a.angular_velocity, self.r_a);
        let vp_b = b.linear_velocity + crate::math::cross_scalar_vec(b.angular_velocity, self.r_b);
        let cdot = self.u.dot(vp_b - vp_a);

        let impulse = -self.inv_mass_sum * (cdot + self.bias + self.gamma * self.impulse);
        self.impulse += impulse;

        let p = self.u * impulse;
        a.linear_velocity -= p * a_state.inv_mass;
        a.angular_velocity -= a_state.inv_rot_inertia * crate::math::cross(self.r_a, p);
        b.linear_velocity += p * b_state.inv_mass;
        b.angular_velocity += b_state.inv_rot_inertia * crate::math::cross(self.r_b, p);
    }

    fn solve_position_constraints(&mut self, a_center: &mut Vec2, a_angle: &mut f64, b_center: &mut Vec2, b_angle: &mut f64, a: &JointBodyState, b: &JointBodyState) -> f64 {
        if self.frequency > 0.0 {
            // A soft joint has no position correction; drift is absorbed
            // by the spring.
            return 0.0;
        }

        let rot_a = crate::math::UnitVec2::from_angle(*a_angle);
        let rot_b = crate::math::UnitVec2::from_angle(*b_angle);
        let r_a = rot_a.rotate(self.local_anchor_a);
        let r_b = rot_b.rotate(self.local_anchor_b);

        let d = (*b_center + r_b) - (*a_center + r_a);
        let (dir, length) = crate::math::UnitVec2::new_normalize(d);
        let u = if dir.is_valid() { dir.as_vec2() } else { Vec2::new(1.0, 0.0) };
        let c = (length - self.length).clamp(-crate::constants::MAX_LINEAR_CORRECTION, crate::constants::MAX_LINEAR_CORRECTION);

        let cr_a = crate::math::cross(r_a, u);
        let cr_b = crate::math::cross(r_b, u);
        let inv_mass = a.inv_mass + a.inv_rot_inertia * cr_a * cr_a + b.inv_mass + b.inv_rot_inertia * cr_b * cr_b;
        let inv_mass_sum = if inv_mass > 0.0 { 1.0 / inv_mass } else { 0.0 };
        let impulse = -inv_mass_sum * c;
        let p = u * impulse;

        *a_center -= p * a.inv_mass;
        *a_angle -= a.inv_rot_inertia * crate::math::cross(r_a, p);
        *b_center += p * b.inv_mass;
        *b_angle += b.inv_rot_inertia * crate::math::cross(r_b, p);

        c.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_id() -> BodyId {
        BodyId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn rigid_distance_joint_pulls_back_to_rest_length() {
        let mut joint = DistanceJoint::new(dummy_id(), dummy_id(), Vec2::zero(), Vec2::zero(), 1.0);

        let a = JointBodyState {
            center: Vec2::zero(),
            angle: 0.0,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_rot_inertia: 1.0,
        };
        let b = JointBodyState {
            center: Vec2::new(2.0, 0.0),
            angle: 0.0,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_rot_inertia: 1.0,
        };

        let mut va = VelocityState::default();
        let mut vb = VelocityState::default();
        joint.init_velocity_constraints(&mut va, &mut vb, &a, &b, 1.0 / 60.0, false);

        let mut a_center = a.center;
        let mut a_angle = a.angle;
        let mut b_center = b.center;
        let mut b_angle = b.angle;
        let error_before = (b_center - a_center).magnitude() - joint.length();

        let _ = joint.solve_position_constraints(&mut a_center, &mut a_angle, &mut b_center, &mut b_angle, &a, &b);

        let error_after = (b_center - a_center).magnitude() - joint.length();
        assert!(error_after.abs() < error_before.abs());
    }

    #[test]
    fn soft_joint_skips_position_correction() {
        let mut joint = DistanceJoint::new(dummy_id(), dummy_id(), Vec2::zero(), Vec2::zero(), 1.0).with_softness(2.0, 0.5);

        let a = JointBodyState {
            center: Vec2::zero(),
            angle: 0.0,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_rot_inertia: 1.0,
        };
        let b = JointBodyState {
            center: Vec2::new(2.0, 0.0),
            angle: 0.0,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_rot_inertia: 1.0,
        };

        let mut a_center = a.center;
        let mut a_angle = a.angle;
        let mut b_center = b.center;
        let mut b_angle = b.angle;
        let residual = joint.solve_position_constraints(&mut a_center, &mut a_angle, &mut b_center, &mut b_angle, &a, &b);
        assert_eq!(residual, 0.0);
        assert_eq!(a_center, Vec2::zero());
    }
}
