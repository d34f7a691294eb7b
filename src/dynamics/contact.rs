//! A potentially-touching ordered pair of fixture-children and its
//! per-step update state machine.

use slotmap::new_key_type;

use crate::collision::manifold::Manifold;
use crate::collision::narrowphase;
use crate::dynamics::fixture::{mix_friction, mix_restitution, Filter, Fixture, FixtureId};
use crate::math::Transformation;

new_key_type! {
    /// Stable handle to a contact.
    pub struct ContactId;
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct ContactFlags: u8 {
        /// Current manifold has one or more points (the pair is
        /// "touching" this step).
        const TOUCHING = 1 << 0;
        /// Either fixture is a sensor: no solver impulse is generated
        /// even while touching.
        const SENSOR = 1 << 1;
        /// Suppressed (filter rejects the pair, or the user disabled it);
        /// no narrow-phase work is done while set.
        const ENABLED = 1 << 2;
        /// Claimed by the current island-assembly pass.
        const ISLANDED = 1 << 3;
        /// A fixture's filter changed since the last update; forces a
        /// `ShouldCollide` re-check on the next `update`.
        const FILTER_DIRTY = 1 << 4;
        /// At least one body is a bullet, or both are non-bullet dynamic
        /// bodies moving fast enough to need TOI handling.
        const TOI_CANDIDATE = 1 << 5;
    }
}

/// Outcome of one [`Contact::update`] call, consumed by the world to
/// decide which listener callbacks to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchingTransition {
    /// Touching state did not change.
    Unchanged,
    /// Was not touching, now is: fire `begin_contact`.
    Began,
    /// Was touching, now is not: fire `end_contact`.
    Ended,
}

/// A potentially-touching pair of fixture children.
#[derive(Debug, Clone)]
pub struct Contact {
    pub(crate) fixture_a: FixtureId,
    pub(crate) child_a: usize,
    pub(crate) fixture_b: FixtureId,
    pub(crate) child_b: usize,

    pub(crate) manifold: Manifold,
    flags: ContactFlags,

    pub(crate) friction: f64,
    pub(crate) restitution: f64,
    pub(crate) tangent_speed: f64,

    pub(crate) toi: f64,
    pub(crate) toi_count: u32,
}

impl Contact {
    pub(crate) fn new(fixture_a: FixtureId, child_a: usize, fixture_b: FixtureId, child_b: usize, a: &Fixture, b: &Fixture) -> Self {
        let mut flags = ContactFlags::ENABLED;
        flags.set(ContactFlags::SENSOR, a.is_sensor() || b.is_sensor());

        Self {
            fixture_a,
            child_a,
            fixture_b,
            child_b,
            manifold: Manifold::unset(),
            flags,
            friction: mix_friction(a.friction(), b.friction()),
            restitution: mix_restitution(a.restitution(), b.restitution()),
            tangent_speed: 0.0,
            toi: 1.0,
            toi_count: 0,
        }
    }

    /// The first fixture.
    pub fn fixture_a(&self) -> FixtureId {
        self.fixture_a
    }

    /// The second fixture.
    pub fn fixture_b(&self) -> FixtureId {
        self.fixture_b
    }

    /// The shape child index on fixture A this contact covers.
    pub fn child_a(&self) -> usize {
        self.child_a
    }

    /// The shape child index on fixture B this contact covers.
    pub fn child_b(&self) -> usize {
        self.child_b
    }

    /// The current manifold (empty/unset if not touching).
    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// Whether the manifold currently has any points.
    pub fn is_touching(&self) -> bool {
        self.flags.contains(ContactFlags::TOUCHING)
    }

    /// Whether either fixture is a sensor (no collision response, but
    /// still reported to listeners).
    pub fn is_sensor(&self) -> bool {
        self.flags.contains(ContactFlags::SENSOR)
    }

    /// Whether this contact currently participates in narrow-phase and
    /// solving.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ContactFlags::ENABLED)
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(ContactFlags::ENABLED, enabled);
    }

    pub(crate) fn mark_filter_dirty(&mut self) {
        self.flags.insert(ContactFlags::FILTER_DIRTY);
    }

    pub(crate) fn is_islanded(&self) -> bool {
        self.flags.contains(ContactFlags::ISLANDED)
    }

    pub(crate) fn set_islanded(&mut self, value: bool) {
        self.flags.set(ContactFlags::ISLANDED, value);
    }

    /// How many TOI sub-steps this contact has participated in this
    /// world step.
    pub fn toi_count(&self) -> u32 {
        self.toi_count
    }

    pub(crate) fn reset_toi_count(&mut self) {
        self.toi_count = 0;
    }

    /// Regenerate the manifold from the current fixture shapes and
    /// transforms, re-check filtering if dirty, and warm-start the new
    /// manifold's points from the old one by matching [`crate::collision::manifold::ContactFeature`]s.
    ///
    /// Returns whether (and how) the touching state changed, so the
    /// caller can fire `begin_contact`/`end_contact`.
    pub(crate) fn update(&mut self, a: &Fixture, b: &Fixture, xf_a: &Transformation, xf_b: &Transformation) -> TouchingTransition {
        if self.flags.contains(ContactFlags::FILTER_DIRTY) {
            self.flags.remove(ContactFlags::FILTER_DIRTY);
            let should_collide = Filter::should_collide(&a.filter(), &b.filter());
            self.set_enabled(should_collide);
        }

        if !self.is_enabled() {
            let was_touching = self.is_touching();
            self.manifold = Manifold::unset();
            self.flags.remove(ContactFlags::TOUCHING);
            return if was_touching { TouchingTransition::Ended } else { TouchingTransition::Unchanged };
        }

        let old_manifold = std::mem::replace(&mut self.manifold, Manifold::unset());

        let mut new_manifold = narrowphase::collide(a.shape(), self.child_a, xf_a, b.shape(), self.child_b, xf_b);

        for point in new_manifold.points.iter_mut() {
            for old_point in old_manifold.points.iter() {
                if old_point.feature == point.feature {
                    point.normal_impulse = old_point.normal_impulse;
                    point.tangent_impulse = old_point.tangent_impulse;
                    break;
                }
            }
        }

        let was_touching = old_manifold.is_touching();
        let now_touching = new_manifold.is_touching();
        self.flags.set(ContactFlags::TOUCHING, now_touching);
        self.manifold = new_manifold;

        match (was_touching, now_touching) {
            (false, true) => TouchingTransition::Began,
            (true, false) => TouchingTransition::Ended,
            _ => TouchingTransition::Unchanged,
        }
    }
}
