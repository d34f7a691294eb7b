//! The mutable simulation body: transformation, sweep, velocities and the
//! fixture/contact/joint adjacency lists the island assembler walks.

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::dynamics::contact::ContactId;
use crate::math::{Sweep, Transformation, Vec2};

new_key_type! {
    /// Stable handle to a body; invalidated (and thus rejected by the
    /// arena lookup) once the body is destroyed.
    pub struct BodyId;
    /// Stable handle to a fixture.
    pub struct FixtureId;
    /// Stable handle to a joint.
    pub struct JointId;
}

/// A body's motion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum BodyType {
    /// Never moves; infinite mass; other bodies collide against it but
    /// it never responds.
    #[default]
    Static,
    /// Moves at a prescribed velocity, unaffected by forces or contacts.
    Kinematic,
    /// Full rigid-body simulation: forces, contacts and joints all act.
    Dynamic,
}

bitflags::bitflags! {
    /// Per-body state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BodyFlags: u16 {
        /// Participates in velocity/position integration this step.
        const AWAKE = 1 << 0;
        /// May be put to sleep once its island quiesces.
        const ALLOW_SLEEP = 1 << 1;
        /// `invRotInertia` is forced to 0 regardless of fixture mass.
        const FIXED_ROTATION = 1 << 2;
        /// Eligible for TOI sub-stepping against other dynamic bodies
        /// (not just static/kinematic ones).
        const BULLET = 1 << 3;
        /// Participates in simulation at all (a disabled body has no
        /// proxies and is skipped by islands).
        const ENABLED = 1 << 4;
        /// Already claimed by the current island-assembly pass.
        const ISLANDED = 1 << 5;
    }
}

/// Construction parameters for [`crate::dynamics::world::World::create_body`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BodyConf {
    /// Motion category.
    pub body_type: BodyType,
    /// Initial world-space position (body origin, not center of mass).
    pub position: Vec2,
    /// Initial orientation, in radians.
    pub angle: f64,
    /// Initial linear velocity.
    pub linear_velocity: Vec2,
    /// Initial angular velocity, in radians/second.
    pub angular_velocity: f64,
    /// Multiplicative linear damping per second.
    pub linear_damping: f64,
    /// Multiplicative angular damping per second.
    pub angular_damping: f64,
    /// Whether this body may fall asleep.
    pub allow_sleep: bool,
    /// Initial awake state.
    pub awake: bool,
    /// Locks rotational inertia to infinite (no rotation from contacts).
    pub fixed_rotation: bool,
    /// Opts into dynamic-vs-dynamic TOI sub-stepping.
    pub bullet: bool,
    /// Whether the body participates in simulation at creation.
    pub enabled: bool,
    /// Multiplier applied to world gravity for this body.
    pub gravity_scale: f64,
}

impl Default for BodyConf {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vec2::zero(),
            angle: 0.0,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            allow_sleep: true,
            awake: true,
            fixed_rotation: false,
            bullet: false,
            enabled: true,
            gravity_scale: 1.0,
        }
    }
}

/// A link from a body to one contact it participates in, stored on the
/// body so the island assembler can walk `b.contact_edges` without going
/// through the contact arena's full key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEdge {
    /// The other body in this contact.
    pub other: BodyId,
    /// The contact itself.
    pub contact: ContactId,
}

/// A link from a body to one joint it participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointEdge {
    /// The other body in this joint.
    pub other: BodyId,
    /// The joint itself.
    pub joint: JointId,
}

/// A rigid body.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) body_type: BodyType,
    pub(crate) transform: Transformation,
    pub(crate) sweep: Sweep,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: f64,
    pub(crate) linear_damping: f64,
    pub(crate) angular_damping: f64,
    pub(crate) inv_mass: f64,
    pub(crate) inv_rot_inertia: f64,
    pub(crate) local_center: Vec2,
    pub(crate) force: Vec2,
    pub(crate) torque: f64,
    pub(crate) gravity_scale: f64,
    pub(crate) flags: BodyFlags,
    pub(crate) sleep_time: f64,
    pub(crate) fixtures: SmallVec<[FixtureId; 4]>,
    pub(crate) contact_edges: Vec<ContactEdge>,
    pub(crate) joint_edges: Vec<JointEdge>,
}

impl Body {
    pub(crate) fn new(conf: &BodyConf) -> Self {
        let rotation = crate::math::UnitVec2::from_angle(conf.angle);
        let transform = Transformation::new(conf.position, rotation);
        let sweep = Sweep::at_rest(transform, Vec2::zero());

        let mut flags = BodyFlags::empty();
        flags.set(BodyFlags::ALLOW_SLEEP, conf.allow_sleep);
        flags.set(BodyFlags::AWAKE, conf.awake || conf.body_type == BodyType::Static);
        flags.set(BodyFlags::FIXED_ROTATION, conf.fixed_rotation);
        flags.set(BodyFlags::BULLET, conf.bullet);
        flags.set(BodyFlags::ENABLED, conf.enabled);

        let (inv_mass, inv_rot_inertia) = match conf.body_type {
            BodyType::Dynamic => (1.0, 1.0),
            _ => (0.0, 0.0),
        };

        Self {
            body_type: conf.body_type,
            transform,
            sweep,
            linear_velocity: if conf.body_type == BodyType::Static {
                Vec2::zero()
            } else {
                conf.linear_velocity
            },
            angular_velocity: if conf.body_type == BodyType::Static {
                0.0
            } else {
                conf.angular_velocity
            },
            linear_damping: conf.linear_damping,
            angular_damping: conf.angular_damping,
            inv_mass,
            inv_rot_inertia,
            local_center: Vec2::zero(),
            force: Vec2::zero(),
            torque: 0.0,
            gravity_scale: conf.gravity_scale,
            flags,
            sleep_time: 0.0,
            fixtures: SmallVec::new(),
            contact_edges: Vec::new(),
            joint_edges: Vec::new(),
        }
    }

    /// Motion category.
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Current world transform (body origin, not center of mass).
    pub fn transform(&self) -> Transformation {
        self.transform
    }

    /// Current sweep (interpolated motion across the in-progress step).
    pub fn sweep(&self) -> Sweep {
        self.sweep
    }

    /// Current linear velocity.
    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    /// Current angular velocity, radians/second.
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// `1 / mass`; 0 for static/kinematic bodies.
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// `1 / rotational inertia`; 0 for static/kinematic bodies or a
    /// fixed-rotation dynamic body.
    pub fn inv_rot_inertia(&self) -> f64 {
        self.inv_rot_inertia
    }

    /// Whether this body currently participates in velocity/position
    /// integration.
    pub fn is_awake(&self) -> bool {
        self.flags.contains(BodyFlags::AWAKE)
    }

    /// Whether this body is eligible for dynamic-vs-dynamic TOI handling.
    pub fn is_bullet(&self) -> bool {
        self.flags.contains(BodyFlags::BULLET)
    }

    /// Whether this body participates in simulation at all.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(BodyFlags::ENABLED)
    }

    pub(crate) fn set_awake(&mut self, awake: bool) {
        if self.body_type == BodyType::Static {
            return;
        }
        if awake {
            self.flags.insert(BodyFlags::AWAKE);
            self.sleep_time = 0.0;
        } else {
            self.flags.remove(BodyFlags::AWAKE);
            self.sleep_time = 0.0;
            self.linear_velocity = Vec2::zero();
            self.angular_velocity = 0.0;
        }
    }

    pub(crate) fn is_islanded(&self) -> bool {
        self.flags.contains(BodyFlags::ISLANDED)
    }

    pub(crate) fn set_islanded(&mut self, value: bool) {
        self.flags.set(BodyFlags::ISLANDED, value);
    }

    /// Apply a world-space force at the body's center of mass (next
    /// integration step only).
    pub fn apply_force_to_center(&mut self, force: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.wake_up_for_mutation();
        self.force += force;
    }

    /// Apply a world-space impulse at the body's center of mass,
    /// immediately changing velocity.
    pub fn apply_linear_impulse_to_center(&mut self, impulse: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.wake_up_for_mutation();
        self.linear_velocity += impulse * self.inv_mass;
    }

    fn wake_up_for_mutation(&mut self) {
        if !self.is_awake() {
            self.set_awake(true);
        }
    }

    /// Recompute `inv_mass`/`inv_rot_inertia`/`local_center` from the
    /// supplied fixture mass data (density-weighted sum plus
    /// parallel-axis shift of the combined inertia to the new center).
    pub(crate) fn set_mass_from_fixtures(&mut self, mass_data: &[crate::shape::MassData]) {
        if self.body_type != BodyType::Dynamic {
            self.inv_mass = 0.0;
            self.inv_rot_inertia = 0.0;
            self.local_center = Vec2::zero();
            return;
        }

        let mut mass = 0.0;
        let mut center = Vec2::zero();
        let mut rot_inertia = 0.0;

        for data in mass_data {
            mass += data.mass;
            center += data.center * data.mass;
            rot_inertia += data.rot_inertia;
        }

        if mass > 0.0 {
            self.inv_mass = 1.0 / mass;
            center = center / mass;
        } else {
            // Degenerate (no fixtures, or all zero-density): keep unit
            // mass so the body still integrates under gravity rather
            // than becoming accidentally static.
            self.inv_mass = 1.0;
        }

        if self.flags.contains(BodyFlags::FIXED_ROTATION) {
            self.inv_rot_inertia = 0.0;
        } else if rot_inertia > 0.0 && mass > 0.0 {
            // Shift from local origin to the body's own center of mass.
            rot_inertia -= mass * center.dot(center);
            debug_assert!(rot_inertia > 0.0, "mass data yields non-positive inertia");
            self.inv_rot_inertia = 1.0 / rot_inertia;
        } else {
            self.inv_rot_inertia = 0.0;
        }

        let old_center = self.sweep.center1;
        self.local_center = center;
        self.sweep.local_center = center;
        self.sweep.center0 = self.transform.transform(center);
        self.sweep.center1 = self.sweep.center0;
        self.linear_velocity += crate::math::cross_scalar_vec(
            self.angular_velocity,
            self.sweep.center1 - old_center,
        );
    }
}
