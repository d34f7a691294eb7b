//! The world: owns every body, fixture, contact and joint, plus the
//! broad-phase, and drives one `step` through the pre-phase, regular
//! phase and TOI phase in sequence.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::broadphase::dynamic_tree::ProxyId;
use crate::broadphase::{BroadPhase, ProxyPair};
use crate::collision::aabb::{Aabb, RayCastInput, RayCastOutput};
use crate::collision::manifold::Manifold;
use crate::collision::toi::{time_of_impact, TimeOfImpactInput, TimeOfImpactState};
use crate::constants;
use crate::dynamics::body::{Body, BodyConf, BodyId, BodyType, ContactEdge, JointEdge, JointId};
use crate::dynamics::contact::{Contact, ContactId, TouchingTransition};
use crate::dynamics::fixture::{Filter, Fixture, FixtureConf, FixtureId};
use crate::dynamics::island::{self, Island};
use crate::dynamics::joint::Joint;
use crate::dynamics::solver::{self, PhaseConf};
use crate::error::{PhysicsError, Result};
use crate::math::Vec2;
use crate::shape::DistanceProxy;

/// Construction parameters for a [`World`].
#[derive(Debug, Clone, Copy)]
pub struct WorldConf {
    /// Constant world-space acceleration applied to every dynamic body
    /// (scaled per-body by `gravityScale`).
    pub gravity: Vec2,
    /// Smallest vertex radius a fixture's shape may have.
    pub min_vertex_radius: f64,
    /// Largest vertex radius a fixture's shape may have.
    pub max_vertex_radius: f64,
}

impl Default for WorldConf {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            min_vertex_radius: constants::DEFAULT_MIN_VERTEX_RADIUS,
            max_vertex_radius: constants::DEFAULT_MAX_VERTEX_RADIUS,
        }
    }
}

/// Per-step tuning, mirroring the source's `TimeStep`/`StepConf`.
#[derive(Debug, Clone, Copy)]
pub struct StepConf {
    /// Step duration.
    pub dt: f64,
    /// Regular-phase velocity iterations.
    pub velocity_iterations: u32,
    /// Regular-phase position iterations.
    pub position_iterations: u32,
    /// TOI-phase velocity iterations.
    pub toi_velocity_iterations: u32,
    /// TOI-phase position iterations.
    pub toi_position_iterations: u32,
    /// Regular-phase position-correction rate.
    pub resolution_rate: f64,
    /// TOI sub-step position-correction rate.
    pub toi_resolution_rate: f64,
    /// Relative approach speed below which restitution is ignored.
    pub velocity_threshold: f64,
    /// Whether to warm-start contacts/joints from the previous step.
    pub warm_starting: bool,
    /// Whether bodies may fall asleep.
    pub allow_sleeping: bool,
    /// Whether the TOI phase runs at all.
    pub continuous_physics: bool,
    /// Ceiling on outer TOI-search iterations per `step`.
    pub max_toi_steps: u32,
    /// Ceiling on TOI sub-steps any one contact may participate in per
    /// `step` (the live-lock fallback).
    pub max_sub_steps: u32,
    /// Whether `step` clears accumulated force/torque at the end.
    pub auto_clear_forces: bool,
}

impl Default for StepConf {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            velocity_iterations: constants::REG_VELOCITY_ITERATIONS,
            position_iterations: constants::REG_POSITION_ITERATIONS,
            toi_velocity_iterations: constants::TOI_VELOCITY_ITERATIONS,
            toi_position_iterations: constants::TOI_POSITION_ITERATIONS,
            resolution_rate: constants::REGULAR_RESOLUTION_RATE,
            toi_resolution_rate: constants::TOI_RESOLUTION_RATE,
            velocity_threshold: constants::VELOCITY_THRESHOLD,
            warm_starting: true,
            allow_sleeping: true,
            continuous_physics: true,
            max_toi_steps: constants::MAX_TOI_STEPS,
            max_sub_steps: constants::MAX_SUB_STEPS,
            auto_clear_forces: true,
        }
    }
}

/// Counters reported back from one `World::step` call. No phase ever
/// fails outright; degenerate or capped conditions show up here instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepStats {
    /// Islands solved this step.
    pub island_count: u32,
    /// Contacts that exist after the pre-phase.
    pub contact_count: u32,
    /// Of those, how many are touching.
    pub touching_count: u32,
    /// Total TOI sub-steps taken across the whole step.
    pub toi_sub_steps: u32,
    /// `begin_contact` callbacks fired.
    pub began_count: u32,
    /// `end_contact` callbacks fired.
    pub ended_count: u32,
    /// TOI searches that hit `maxToiIters` without resolving.
    pub max_toi_iters_hit: u32,
    /// TOI bisections that hit `maxRootIters`.
    pub max_root_iters_hit: u32,
}

/// Caller-supplied contact event sink. All methods default to no-ops, so a
/// listener only needs to implement the callbacks it cares about.
pub trait ContactListener {
    /// Touching flipped false -> true this step.
    fn begin_contact(&mut self, _contact: ContactId) {}
    /// Touching flipped true -> false this step.
    fn end_contact(&mut self, _contact: ContactId) {}
    /// Called for every touching, non-sensor contact once per step, right
    /// after the narrow-phase update and before the velocity solver runs.
    /// `_old_manifold` is the manifold from *before* this step's update, so
    /// a listener can diff against it; the contract's cancellable enable
    /// flag is left to the caller to act on via
    /// [`World::set_contact_enabled`] from within this callback.
    fn pre_solve(&mut self, _contact: ContactId, _old_manifold: &Manifold) {}
    /// Called for every touching, non-sensor contact once per step, after
    /// its velocity iterations, with the accumulated normal impulse of
    /// each manifold point in point order.
    fn post_solve(&mut self, _contact: ContactId, _normal_impulses: &[f64]) {}
}

/// Broad-phase proxy payload: which fixture, and which shape child.
type ProxyData = (FixtureId, usize);

/// Owns every body, fixture, contact and joint in one simulation, plus
/// the broad-phase they're all registered with.
pub struct World {
    gravity: Vec2,
    min_vertex_radius: f64,
    max_vertex_radius: f64,

    bodies: SlotMap<BodyId, Body>,
    fixtures: SlotMap<FixtureId, Fixture>,
    contacts: SlotMap<ContactId, Contact>,
    joints: SlotMap<JointId, Box<dyn Joint>>,

    broad_phase: BroadPhase<ProxyData>,
    contact_pairs: HashMap<ProxyPair, ContactId>,

    listener: Option<Box<dyn ContactListener>>,
    locked: bool,
}

impl World {
    /// An empty world.
    pub fn new(conf: WorldConf) -> Self {
        Self {
            gravity: conf.gravity,
            min_vertex_radius: conf.min_vertex_radius,
            max_vertex_radius: conf.max_vertex_radius,
            bodies: SlotMap::with_key(),
            fixtures: SlotMap::with_key(),
            contacts: SlotMap::with_key(),
            joints: SlotMap::with_key(),
            broad_phase: BroadPhase::new(),
            contact_pairs: HashMap::new(),
            listener: None,
            locked: false,
        }
    }

    /// Install (or remove, with `None`) the contact event listener.
    pub fn set_contact_listener(&mut self, listener: Option<Box<dyn ContactListener>>) {
        self.listener = listener;
    }

    /// World gravity.
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn assert_unlocked(&self) -> Result<()> {
        if self.locked {
            Err(PhysicsError::WorldLocked)
        } else {
            Ok(())
        }
    }

    // ---------------------------------------------------------------
    // Body lifecycle
    // ---------------------------------------------------------------

    /// Create a new body.
    pub fn create_body(&mut self, conf: &BodyConf) -> Result<BodyId> {
        self.assert_unlocked()?;
        if !conf.position.x.is_finite() || !conf.position.y.is_finite() {
            return Err(PhysicsError::NonFinite { field: "position" });
        }
        if !conf.angle.is_finite() {
            return Err(PhysicsError::NonFinite { field: "angle" });
        }
        Ok(self.bodies.insert(Body::new(conf)))
    }

    /// Destroy a body and everything attached to it (fixtures, contacts,
    /// joints).
    pub fn destroy_body(&mut self, id: BodyId) -> Result<()> {
        self.assert_unlocked()?;
        let fixtures: Vec<FixtureId> = self.bodies.get(id).ok_or(PhysicsError::UnknownBody)?.fixtures.to_vec();
        for fixture_id in fixtures {
            self.destroy_fixture(fixture_id)?;
        }
        let joints: Vec<JointId> = self
            .bodies
            .get(id)
            .ok_or(PhysicsError::UnknownBody)?
            .joint_edges
            .iter()
            .map(|e| e.joint)
            .collect();
        for joint_id in joints {
            self.destroy_joint(joint_id)?;
        }
        self.bodies.remove(id);
        Ok(())
    }

    /// Read-only access to a body.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Mutable access to a body.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    /// Every live body id, in arena order.
    pub fn body_ids(&self) -> Vec<BodyId> {
        self.bodies.keys().collect()
    }

    pub(crate) fn mark_islanded(&mut self, id: BodyId, value: bool) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.set_islanded(value);
        }
    }

    // ---------------------------------------------------------------
    // Fixture lifecycle
    // ---------------------------------------------------------------

    /// Attach a new fixture to `body`.
    pub fn create_fixture(&mut self, body: BodyId, conf: &FixtureConf) -> Result<FixtureId> {
        self.assert_unlocked()?;
        if !self.bodies.contains_key(body) {
            return Err(PhysicsError::UnknownBody);
        }
        if !conf.density.is_finite() || conf.density < 0.0 {
            return Err(PhysicsError::InvalidDensity(conf.density));
        }
        let radius = conf.shape.vertex_radius();
        if radius < self.min_vertex_radius || radius > self.max_vertex_radius {
            return Err(PhysicsError::VertexRadiusOutOfRange(radius, self.min_vertex_radius, self.max_vertex_radius));
        }

        let fixture = Fixture::new(body, conf);
        let fixture_id = self.fixtures.insert(fixture);

        let xf = self.bodies[body].transform();
        let child_count = self.fixtures[fixture_id].shape().child_count();
        let mut proxies = Vec::with_capacity(child_count);
        for child in 0..child_count {
            let aabb = self.fixtures[fixture_id].shape().compute_aabb(&xf, child).fattened(constants::AABB_EXTENSION);
            proxies.push(self.broad_phase.create_proxy(aabb, (fixture_id, child)));
        }
        self.fixtures[fixture_id].proxies = proxies;

        self.bodies[body].fixtures.push(fixture_id);
        self.recompute_mass(body);

        Ok(fixture_id)
    }

    /// Detach and destroy a fixture, along with any contacts it
    /// participates in.
    pub fn destroy_fixture(&mut self, id: FixtureId) -> Result<()> {
        self.assert_unlocked()?;
        let fixture = self.fixtures.get(id).ok_or(PhysicsError::UnknownFixture)?;
        let body = fixture.body;

        let stale: Vec<ContactId> = self
            .bodies
            .get(body)
            .map(|b| b.contact_edges.iter().filter(|e| self.touches_fixture(e.contact, id)).map(|e| e.contact).collect())
            .unwrap_or_default();
        for contact_id in stale {
            self.destroy_contact(contact_id);
        }

        for &proxy in &self.fixtures[id].proxies {
            self.broad_phase.destroy_proxy(proxy);
        }
        self.fixtures.remove(id);

        if let Some(b) = self.bodies.get_mut(body) {
            b.fixtures.retain(|&f| f != id);
        }
        self.recompute_mass(body);

        Ok(())
    }

    fn touches_fixture(&self, contact: ContactId, fixture: FixtureId) -> bool {
        self.contacts.get(contact).is_some_and(|c| c.fixture_a() == fixture || c.fixture_b() == fixture)
    }

    /// Read-only access to a fixture.
    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id)
    }

    fn recompute_mass(&mut self, body: BodyId) {
        let Some(b) = self.bodies.get(body) else { return };
        let mass_data: Vec<crate::shape::MassData> = b.fixtures.iter().map(|&f| self.fixtures[f].shape().compute_mass(self.fixtures[f].density())).collect();
        self.bodies[body].set_mass_from_fixtures(&mass_data);
    }

    // ---------------------------------------------------------------
    // Joint lifecycle
    // ---------------------------------------------------------------

    /// Create a joint between the two bodies it names.
    pub fn create_joint(&mut self, joint: Box<dyn Joint>) -> Result<JointId> {
        self.assert_unlocked()?;
        let (a, b) = (joint.body_a(), joint.body_b());
        if !self.bodies.contains_key(a) || !self.bodies.contains_key(b) {
            return Err(PhysicsError::UnknownBody);
        }
        let id = self.joints.insert(joint);
        self.bodies[a].joint_edges.push(JointEdge { other: b, joint: id });
        self.bodies[b].joint_edges.push(JointEdge { other: a, joint: id });
        Ok(id)
    }

    /// Destroy a joint.
    pub fn destroy_joint(&mut self, id: JointId) -> Result<()> {
        self.assert_unlocked()?;
        let joint = self.joints.get(id).ok_or(PhysicsError::UnknownJoint)?;
        let (a, b) = (joint.body_a(), joint.body_b());
        if let Some(body) = self.bodies.get_mut(a) {
            body.joint_edges.retain(|e| e.joint != id);
        }
        if let Some(body) = self.bodies.get_mut(b) {
            body.joint_edges.retain(|e| e.joint != id);
        }
        self.joints.remove(id);
        Ok(())
    }

    /// Read-only access to a joint.
    pub fn joint(&self, id: JointId) -> Option<&dyn Joint> {
        self.joints.get(id).map(|j| j.as_ref())
    }

    /// Mutable access to a joint.
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut (dyn Joint + 'static)> {
        self.joints.get_mut(id).map(|j| j.as_mut())
    }

    // ---------------------------------------------------------------
    // Contacts
    // ---------------------------------------------------------------

    /// Read-only access to a contact.
    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(id)
    }

    pub(crate) fn contact_mut(&mut self, id: ContactId) -> Option<&mut Contact> {
        self.contacts.get_mut(id)
    }

    pub(crate) fn fire_post_solve(&mut self, id: ContactId, normal_impulses: &[f64]) {
        if let Some(listener) = self.listener.as_mut() {
            listener.post_solve(id, normal_impulses);
        }
    }

    /// Override a contact's enabled state (e.g. from a `pre_solve`
    /// listener callback deciding to suppress this step's response).
    pub fn set_contact_enabled(&mut self, id: ContactId, enabled: bool) {
        if let Some(c) = self.contacts.get_mut(id) {
            c.set_enabled(enabled);
        }
    }

    fn destroy_contact(&mut self, id: ContactId) {
        let Some(contact) = self.contacts.get(id) else { return };
        let (fixture_a, fixture_b) = (contact.fixture_a(), contact.fixture_b());
        let (body_a, body_b) = (self.fixtures[fixture_a].body(), self.fixtures[fixture_b].body());

        if let Some(b) = self.bodies.get_mut(body_a) {
            b.contact_edges.retain(|e| e.contact != id);
        }
        if let Some(b) = self.bodies.get_mut(body_b) {
            b.contact_edges.retain(|e| e.contact != id);
        }
        self.contact_pairs.retain(|_, &mut cid| cid != id);
        self.contacts.remove(id);
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Visit every fixture/child whose proxy overlaps `aabb`; `visit`
    /// returns `false` to stop the query early.
    pub fn query_aabb(&self, aabb: &Aabb, mut visit: impl FnMut(FixtureId, usize) -> bool) {
        self.broad_phase.query(aabb, |proxy| {
            let &(fixture, child) = self.broad_phase.user_data(proxy);
            visit(fixture, child)
        });
    }

    /// Cast a ray through the world; `visit` receives each hit fixture,
    /// the hit point, the outward normal, and the hit fraction, and
    /// returns the new fraction to clip the search to (return `0.0` to
    /// stop, or the input fraction to keep searching past this hit).
    pub fn ray_cast(&self, input: &RayCastInput, mut visit: impl FnMut(FixtureId, usize, Vec2, Vec2, f64) -> f64) {
        self.broad_phase.ray_cast(input, |proxy, ray| {
            let &(fixture_id, child) = self.broad_phase.user_data(proxy);
            let Some(fixture) = self.fixtures.get(fixture_id) else {
                return ray.max_fraction;
            };
            let body = &self.bodies[fixture.body()];
            let local_ray = RayCastInput {
                p1: body.transform().inverse_transform(ray.p1),
                p2: body.transform().inverse_transform(ray.p2),
                max_fraction: ray.max_fraction,
            };
            let proxy_shape = fixture.shape().proxy(child);
            match ray_cast_proxy(&proxy_shape, &local_ray) {
                Some(output) => {
                    let point = body.transform().transform(local_ray.p1 + (local_ray.p2 - local_ray.p1) * output.fraction);
                    let normal = body.transform().transform_direction(output.normal);
                    visit(fixture_id, child, point, normal, output.fraction)
                }
                None => ray.max_fraction,
            }
        });
    }

    // ---------------------------------------------------------------
    // Step
    // ---------------------------------------------------------------

    /// Advance the simulation by `conf.dt`.
    pub fn step(&mut self, conf: &StepConf) -> StepStats {
        let mut stats = StepStats::default();

        self.locked = true;
        self.update_contacts(&mut stats);
        self.locked = false;

        let phase_conf = PhaseConf {
            velocity_iterations: conf.velocity_iterations,
            position_iterations: conf.position_iterations,
            resolution_rate: conf.resolution_rate,
            velocity_threshold: conf.velocity_threshold,
            warm_starting: conf.warm_starting,
            allow_sleeping: conf.allow_sleeping,
        };

        let islands = island::build_islands(self);
        stats.island_count = islands.len() as u32;
        for body in self.bodies.values_mut() {
            body.set_islanded(false);
        }
        for island in &islands {
            solver::solve_regular_phase(self, island, &phase_conf, conf.dt, self.gravity);
            self.synchronize_fixtures(&island.bodies);
        }

        if conf.continuous_physics {
            self.solve_toi_phase(conf, &mut stats);
        }

        if conf.auto_clear_forces {
            for body in self.bodies.values_mut() {
                body.force = Vec2::zero();
                body.torque = 0.0;
            }
        }

        stats.contact_count = self.contacts.len() as u32;
        stats.touching_count = self.contacts.values().filter(|c| c.is_touching()).count() as u32;

        stats
    }

    /// Pre-phase: drain broad-phase pairs into new/destroyed contacts,
    /// then regenerate every remaining contact's manifold.
    fn update_contacts(&mut self, stats: &mut StepStats) {
        for pair in self.broad_phase.update_pairs() {
            let &(fixture_a, child_a) = self.broad_phase.user_data(pair.low);
            let &(fixture_b, child_b) = self.broad_phase.user_data(pair.high);

            if self.contact_pairs.contains_key(&pair) {
                continue;
            }

            let body_a = self.fixtures[fixture_a].body();
            let body_b = self.fixtures[fixture_b].body();
            if body_a == body_b {
                continue;
            }
            if !Filter::should_collide(&self.fixtures[fixture_a].filter(), &self.fixtures[fixture_b].filter()) {
                continue;
            }

            let contact = Contact::new(fixture_a, child_a, fixture_b, child_b, &self.fixtures[fixture_a], &self.fixtures[fixture_b]);
            let contact_id = self.contacts.insert(contact);
            self.contact_pairs.insert(pair, contact_id);

            self.bodies[body_a].contact_edges.push(ContactEdge { other: body_b, contact: contact_id });
            self.bodies[body_b].contact_edges.push(ContactEdge { other: body_a, contact: contact_id });

            #[cfg(feature = "verbose-logging")]
            log::debug!("created contact {contact_id:?} between {fixture_a:?}/{child_a} and {fixture_b:?}/{child_b}");
        }

        let stale: Vec<(ProxyPair, ContactId)> = self
            .contact_pairs
            .iter()
            .filter(|(pair, _)| !self.broad_phase.test_overlap(pair.low, pair.high))
            .map(|(&pair, &id)| (pair, id))
            .collect();
        for (pair, id) in stale {
            self.contact_pairs.remove(&pair);
            self.destroy_contact(id);
        }

        let contact_ids: Vec<ContactId> = self.contacts.keys().collect();
        for id in contact_ids {
            let (fixture_a, fixture_b) = {
                let c = &self.contacts[id];
                (c.fixture_a(), c.fixture_b())
            };
            let xf_a = self.bodies[self.fixtures[fixture_a].body()].transform();
            let xf_b = self.bodies[self.fixtures[fixture_b].body()].transform();

            let old_manifold = self.contacts[id].manifold().clone();

            let World { fixtures, contacts, .. } = self;
            let fa = &fixtures[fixture_a];
            let fb = &fixtures[fixture_b];
            let transition = contacts[id].update(fa, fb, &xf_a, &xf_b);

            match transition {
                TouchingTransition::Began => {
                    stats.began_count += 1;
                    if let Some(listener) = self.listener.as_mut() {
                        listener.begin_contact(id);
                    }
                }
                TouchingTransition::Ended => {
                    stats.ended_count += 1;
                    if let Some(listener) = self.listener.as_mut() {
                        listener.end_contact(id);
                    }
                }
                TouchingTransition::Unchanged => {}
            }

            let contact = &self.contacts[id];
            if contact.is_touching() && !contact.is_sensor() {
                if let Some(listener) = self.listener.as_mut() {
                    listener.pre_solve(id, &old_manifold);
                }
            }
        }
    }

    /// Post-phase: push each moved body's fixture AABBs back into the
    /// broad-phase.
    fn synchronize_fixtures(&mut self, bodies: &[BodyId]) {
        for &id in bodies {
            let Some(body) = self.bodies.get(id) else { continue };
            let xf = body.transform();
            let fixtures = body.fixtures.clone();
            for fixture_id in fixtures {
                let (proxies, child_count) = {
                    let f = &self.fixtures[fixture_id];
                    (f.proxies.clone(), f.shape().child_count())
                };
                for child in 0..child_count {
                    let aabb = self.fixtures[fixture_id].shape().compute_aabb(&xf, child);
                    let displacement = body.sweep().center1 - body.sweep().center0;
                    self.broad_phase.move_proxy(proxies[child], aabb.fattened(constants::AABB_EXTENSION), displacement);
                }
            }
        }
    }

    /// TOI phase: repeatedly find the globally-earliest unresolved
    /// contact TOI, advance its two bodies to that instant, and sub-step
    /// a mini-island seeded from them.
    fn solve_toi_phase(&mut self, conf: &StepConf, stats: &mut StepStats) {
        for _ in 0..conf.max_toi_steps {
            let mut min_alpha = 1.0;
            let mut min_contact: Option<ContactId> = None;

            for (id, contact) in self.contacts.iter() {
                if !contact.is_enabled() || contact.is_sensor() || contact.toi_count() >= conf.max_sub_steps {
                    continue;
                }
                let body_a = self.fixtures[contact.fixture_a()].body();
                let body_b = self.fixtures[contact.fixture_b()].body();
                let a = &self.bodies[body_a];
                let b = &self.bodies[body_b];
                if !toi_eligible(a, b) {
                    continue;
                }

                let alpha = if contact.is_touching() {
                    1.0
                } else {
                    self.contact_toi(id, stats)
                };
                if alpha < min_alpha {
                    min_alpha = alpha;
                    min_contact = Some(id);
                }
            }

            let Some(contact_id) = min_contact else { break };
            if min_alpha >= 1.0 {
                break;
            }

            let (body_a, body_b) = {
                let c = &self.contacts[contact_id];
                (self.fixtures[c.fixture_a()].body(), self.fixtures[c.fixture_b()].body())
            };

            for &id in &[body_a, body_b] {
                let body = &mut self.bodies[id];
                if body.sweep().alpha0 < min_alpha {
                    let mut sweep = body.sweep();
                    sweep.advance(min_alpha);
                    body.sweep = sweep;
                    body.transform = sweep.transform_at(1.0);
                }
            }

            let island = self.build_toi_island(body_a, body_b, conf.max_sub_steps);
            let sub_dt = (1.0 - min_alpha) * conf.dt;
            let phase_conf = PhaseConf {
                velocity_iterations: conf.toi_velocity_iterations,
                position_iterations: conf.toi_position_iterations,
                resolution_rate: conf.toi_resolution_rate,
                velocity_threshold: conf.velocity_threshold,
                warm_starting: false,
                allow_sleeping: false,
            };
            solver::solve_regular_phase(self, &island, &phase_conf, sub_dt, self.gravity);
            self.synchronize_fixtures(&island.bodies);

            for &id in &island.contacts {
                if let Some(c) = self.contacts.get_mut(id) {
                    c.toi_count += 1;
                }
            }
            stats.toi_sub_steps += 1;

            for body in self.bodies.values_mut() {
                body.set_islanded(false);
            }
        }
    }

    fn contact_toi(&self, id: ContactId, stats: &mut StepStats) -> f64 {
        let contact = &self.contacts[id];
        let fixture_a = &self.fixtures[contact.fixture_a()];
        let fixture_b = &self.fixtures[contact.fixture_b()];
        let body_a = &self.bodies[fixture_a.body()];
        let body_b = &self.bodies[fixture_b.body()];

        let proxy_a = fixture_a.shape().proxy(contact.child_a());
        let proxy_b = fixture_b.shape().proxy(contact.child_b());

        let input = TimeOfImpactInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            sweep_a: body_a.sweep(),
            sweep_b: body_b.sweep(),
            t_max: 1.0,
        };
        let total_radius = fixture_a.shape().vertex_radius() + fixture_b.shape().vertex_radius();
        let output = time_of_impact(&input, total_radius);

        match output.state {
            TimeOfImpactState::Touching => output.t,
            TimeOfImpactState::MaxToiIters => {
                stats.max_toi_iters_hit += 1;
                1.0
            }
            TimeOfImpactState::MaxRootIters => {
                stats.max_root_iters_hit += 1;
                1.0
            }
            _ => 1.0,
        }
    }

    /// BFS out from the two TOI bodies, freezing every body that isn't
    /// dynamic-and-bullet-eligible; only touching, enabled, non-sensor
    /// contacts propagate the walk, and joints are not traversed (TOI
    /// sub-steps are stateless w.r.t. joints per the phase contract).
    fn build_toi_island(&mut self, seed_a: BodyId, seed_b: BodyId, max_sub_steps: u32) -> Island {
        let mut island = Island::default();
        let mut stack = vec![seed_a, seed_b];

        while let Some(id) = stack.pop() {
            if self.bodies.get(id).is_some_and(|b| b.is_islanded()) {
                continue;
            }
            let Some(body) = self.bodies.get(id) else { continue };
            // Static and kinematic bodies join as frozen participants -- the
            // solver sees them but never integrates them -- they just don't
            // propagate the walk to whatever else they touch.
            let frozen = body.body_type() != BodyType::Dynamic;

            self.mark_islanded(id, true);
            island.bodies.push(id);
            if frozen {
                continue;
            }

            let edges = self.bodies[id].contact_edges.clone();
            for edge in edges {
                let Some(contact) = self.contacts.get(edge.contact) else { continue };
                if !contact.is_touching() || !contact.is_enabled() || contact.is_sensor() || contact.toi_count() >= max_sub_steps {
                    continue;
                }
                if !island.contacts.contains(&edge.contact) {
                    island.contacts.push(edge.contact);
                }
                if !self.bodies.get(edge.other).is_some_and(|o| o.is_islanded()) {
                    stack.push(edge.other);
                }
            }
        }

        island
    }
}

fn toi_eligible(a: &Body, b: &Body) -> bool {
    let a_dynamic = a.body_type() == BodyType::Dynamic;
    let b_dynamic = b.body_type() == BodyType::Dynamic;
    if !a_dynamic && !b_dynamic {
        return false;
    }
    // A non-bullet dynamic body only gets TOI sub-stepping against a static
    // fixture; paired with another dynamic or a moving kinematic body, one
    // side must be a bullet.
    let a_static = a.body_type() == BodyType::Static;
    let b_static = b.body_type() == BodyType::Static;
    if !a_static && !b_static && !(a.is_bullet() || b.is_bullet()) {
        return false;
    }
    a.is_enabled() && b.is_enabled() && a.is_awake() && b.is_awake()
}

/// Ray-cast a single shape child in its own local frame. Dispatches on
/// the proxy's shape: one vertex is a disk, two vertices with no normals
/// is a bare segment, anything else is a convex polygon.
fn ray_cast_proxy(proxy: &DistanceProxy, input: &RayCastInput) -> Option<RayCastOutput> {
    if proxy.vertices.len() == 1 {
        ray_cast_circle(proxy.vertex(0), proxy.vertex_radius, input)
    } else if proxy.normals.is_empty() {
        ray_cast_segment(proxy.vertex(0), proxy.vertex(1), input)
    } else {
        ray_cast_polygon(proxy, input)
    }
}

/// Box2D's `b2CircleShape::RayCast`: solve `|p1 + t*d - center| = r` for
/// the smaller root.
fn ray_cast_circle(center: Vec2, radius: f64, input: &RayCastInput) -> Option<RayCastOutput> {
    let s = input.p1 - center;
    let b = s.dot(s) - radius * radius;

    let d = input.p2 - input.p1;
    let rr = d.dot(d);
    if rr < f64::EPSILON {
        return None;
    }

    let c = s.dot(d);
    let sigma = c * c - rr * b;
    if sigma < 0.0 {
        return None;
    }

    let mut t = -(c + sigma.sqrt());
    if t < 0.0 || input.max_fraction * rr < t {
        return None;
    }
    t /= rr;

    let point = input.p1 + d * t;
    Some(RayCastOutput {
        normal: (point - center).normalized(),
        fraction: t,
    })
}

/// Box2D's `b2EdgeShape::RayCast`: intersect the ray with the edge's
/// supporting line, then clip to the edge's own extent. Ignores the
/// proxy's vertex radius, matching the source's edge-shape convention.
fn ray_cast_segment(v1: Vec2, v2: Vec2, input: &RayCastInput) -> Option<RayCastOutput> {
    let e = v2 - v1;
    let length = e.magnitude();
    if length < f64::EPSILON {
        return None;
    }
    let e_unit = e / length;
    let normal = Vec2::new(e_unit.y, -e_unit.x);

    let d = input.p2 - input.p1;
    let denom = normal.dot(d);
    if denom.abs() < f64::EPSILON {
        return None;
    }

    let t = normal.dot(v1 - input.p1) / denom;
    if t < 0.0 || t > input.max_fraction {
        return None;
    }

    let point = input.p1 + d * t;
    let s = (point - v1).dot(e_unit);
    if s < 0.0 || s > length {
        return None;
    }

    let normal = if denom > 0.0 { -normal } else { normal };
    Some(RayCastOutput { normal, fraction: t })
}

/// Box2D's `b2PolygonShape::RayCast`: clip the ray's parametric interval
/// against each face's half-plane, tracking which face produced the
/// tightest lower bound.
fn ray_cast_polygon(proxy: &DistanceProxy, input: &RayCastInput) -> Option<RayCastOutput> {
    let mut lower = 0.0f64;
    let mut upper = input.max_fraction;
    let mut index: Option<usize> = None;

    let d = input.p2 - input.p1;

    for i in 0..proxy.vertices.len() {
        let numerator = proxy.normals[i].dot(proxy.vertex(i) - input.p1);
        let denominator = proxy.normals[i].dot(d);

        if denominator == 0.0 {
            if numerator < 0.0 {
                return None;
            }
        } else if denominator < 0.0 && numerator < lower * denominator {
            lower = numerator / denominator;
            index = Some(i);
        } else if denominator > 0.0 && numerator < upper * denominator {
            upper = numerator / denominator;
        }

        if upper < lower {
            return None;
        }
    }

    index.map(|i| RayCastOutput {
        normal: proxy.normals[i],
        fraction: lower,
    })
}
