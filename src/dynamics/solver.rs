//! The sequential-impulse velocity/position solver.
//!
//! Shared by the regular phase (one pass per island, every body involved)
//! and the TOI phase (one pass per mini-island, most bodies frozen).
//! Grounded on the source's `ContactSolver`/`b2ContactSolver`: per-contact
//! `VelocityConstraint`/`PositionConstraint` objects built once per phase,
//! then iterated by index against flat `VelocityState`/`PositionState`
//! slices rather than walking the body arena on every iteration.

use arrayvec::ArrayVec;

use crate::collision::manifold::{Manifold, WorldManifold, MAX_MANIFOLD_POINTS};
use crate::dynamics::body::{BodyFlags, BodyId, BodyType};
use crate::dynamics::contact::ContactId;
use crate::dynamics::island::{Island, PositionState, VelocityState};
use crate::dynamics::joint::{Joint, JointBodyState};
use crate::dynamics::world::World;
use crate::math::{cross, cross_scalar_vec, length_squared, Transformation, UnitVec2, Vec2};

/// Tuning knobs for one solve pass, distinct for the regular vs TOI
/// phases (spec.md §4.8/§4.9 differ in iteration counts and resolution
/// rate).
#[derive(Debug, Clone, Copy)]
pub struct PhaseConf {
    /// Velocity iterations.
    pub velocity_iterations: u32,
    /// Position iterations.
    pub position_iterations: u32,
    /// How much of the penetration to remove per position iteration.
    pub resolution_rate: f64,
    /// Relative approach speed below which restitution is ignored.
    pub velocity_threshold: f64,
    /// Whether to apply warm-started impulses before the velocity
    /// iterations.
    pub warm_starting: bool,
    /// Whether the sleep heuristic (Phase H) may put bodies to sleep this
    /// phase; the TOI phase always passes `false` since a body mid
    /// sub-step shouldn't drop out of the simulation.
    pub allow_sleeping: bool,
}

struct VelocityConstraintPoint {
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f64,
    tangent_mass: f64,
    velocity_bias: f64,
    normal_impulse: f64,
    tangent_impulse: f64,
}

struct VelocityConstraint {
    contact: ContactId,
    index_a: usize,
    index_b: usize,
    normal: Vec2,
    friction: f64,
    restitution: f64,
    tangent_speed: f64,
    points: ArrayVec<VelocityConstraintPoint, MAX_MANIFOLD_POINTS>,
}

struct PositionConstraint {
    index_a: usize,
    index_b: usize,
    manifold: Manifold,
    local_center_a: Vec2,
    local_center_b: Vec2,
    radius_a: f64,
    radius_b: f64,
}

/// Read-only per-body constants the solver needs alongside the mutable
/// velocity/position state, mirroring the source's `BodyConstraint`.
#[derive(Debug, Clone, Copy)]
struct BodyConstants {
    inv_mass: f64,
    inv_rot_inertia: f64,
    local_center: Vec2,
}

/// The body-origin transform for a center-of-mass position/angle pair.
fn origin_transform(center: Vec2, angle: f64, local_center: Vec2) -> Transformation {
    let rotation = UnitVec2::from_angle(angle);
    Transformation::new(center - rotation.rotate(local_center), rotation)
}

/// Gather the island's bodies into flat velocity/position/constant
/// slices, indexed the same way as `island.bodies`.
fn gather_body_state(world: &World, bodies: &[BodyId]) -> (Vec<VelocityState>, Vec<PositionState>, Vec<BodyConstants>) {
    let mut velocities = Vec::with_capacity(bodies.len());
    let mut positions = Vec::with_capacity(bodies.len());
    let mut constants = Vec::with_capacity(bodies.len());

    for &id in bodies {
        let body = world.body(id).expect("island body must exist");
        velocities.push(VelocityState {
            linear_velocity: body.linear_velocity(),
            angular_velocity: body.angular_velocity(),
        });
        positions.push(PositionState {
            center: body.sweep().center1,
            angle: body.sweep().rotation1.angle(),
        });
        constants.push(BodyConstants {
            inv_mass: body.inv_mass(),
            inv_rot_inertia: body.inv_rot_inertia(),
            local_center: body.local_center,
        });
    }

    (velocities, positions, constants)
}

fn body_index(bodies: &[BodyId], id: BodyId) -> usize {
    bodies.iter().position(|&b| b == id).expect("contact/joint body must be a member of its own island")
}

/// Phase A: build one [`VelocityConstraint`] and [`PositionConstraint`]
/// per contact from its current manifold.
fn build_contact_constraints(
    world: &World,
    bodies: &[BodyId],
    contacts: &[ContactId],
    positions: &[PositionState],
    velocities: &[VelocityState],
    constants: &[BodyConstants],
    conf: &PhaseConf,
) -> (Vec<VelocityConstraint>, Vec<PositionConstraint>) {
    let mut velocity_constraints = Vec::with_capacity(contacts.len());
    let mut position_constraints = Vec::with_capacity(contacts.len());

    for &contact_id in contacts {
        let contact = world.contact(contact_id).expect("island contact must exist");
        if contact.is_sensor() || !contact.is_touching() {
            continue;
        }

        let fixture_a = world.fixture(contact.fixture_a()).expect("contact fixture A must exist");
        let fixture_b = world.fixture(contact.fixture_b()).expect("contact fixture B must exist");
        let index_a = body_index(bodies, fixture_a.body());
        let index_b = body_index(bodies, fixture_b.body());

        let ca = constants[index_a];
        let cb = constants[index_b];
        let xf_a = origin_transform(positions[index_a].center, positions[index_a].angle, ca.local_center);
        let xf_b = origin_transform(positions[index_b].center, positions[index_b].angle, cb.local_center);
        let radius_a = fixture_a.shape().vertex_radius();
        let radius_b = fixture_b.shape().vertex_radius();

        let world_manifold = WorldManifold::new(&contact.manifold, &xf_a, radius_a, &xf_b, radius_b);
        let normal = world_manifold.normal;
        let tangent = Vec2::new(normal.y, -normal.x);

        let mut vc = VelocityConstraint {
            contact: contact_id,
            index_a,
            index_b,
            normal,
            friction: contact.friction,
            restitution: contact.restitution,
            tangent_speed: contact.tangent_speed,
            points: ArrayVec::new(),
        };

        let va = velocities[index_a];
        let vb = velocities[index_b];

        for (i, point) in contact.manifold.points.iter().enumerate() {
            let wp = &world_manifold.points[i];
            let r_a = wp.point - positions[index_a].center;
            let r_b = wp.point - positions[index_b].center;

            let rn_a = cross(r_a, normal);
            let rn_b = cross(r_b, normal);
            let k_normal = ca.inv_mass + cb.inv_mass + ca.inv_rot_inertia * rn_a * rn_a + cb.inv_rot_inertia * rn_b * rn_b;
            let normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

            let rt_a = cross(r_a, tangent);
            let rt_b = cross(r_b, tangent);
            let k_tangent = ca.inv_mass + cb.inv_mass + ca.inv_rot_inertia * rt_a * rt_a + cb.inv_rot_inertia * rt_b * rt_b;
            let tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

            let rel_velocity = (vb.linear_velocity + cross_scalar_vec(vb.angular_velocity, r_b)) - (va.linear_velocity + cross_scalar_vec(va.angular_velocity, r_a));
            let approach_speed = rel_velocity.dot(normal);
            let velocity_bias = if approach_speed < -conf.velocity_threshold {
                -contact.restitution * approach_speed
            } else {
                0.0
            };

            let _ = vc.points.try_push(VelocityConstraintPoint {
                r_a,
                r_b,
                normal_mass,
                tangent_mass,
                velocity_bias,
                normal_impulse: point.normal_impulse,
                tangent_impulse: point.tangent_impulse,
            });
        }

        velocity_constraints.push(vc);
        position_constraints.push(PositionConstraint {
            index_a,
            index_b,
            manifold: contact.manifold.clone(),
            local_center_a: ca.local_center,
            local_center_b: cb.local_center,
            radius_a,
            radius_b,
        });
    }

    (velocity_constraints, position_constraints)
}

/// Phase D: one velocity-iteration pass over all joints, then all
/// contacts (friction first, then normal, each point solved
/// sequentially — the two-point block LCP solve the source offers as an
/// optional fast path is not implemented; plain sequential solving
/// converges to the same fixed point, just in a few more iterations).
fn solve_velocity_iteration(
    world: &mut World,
    bodies: &[BodyId],
    joints: &[crate::dynamics::body::JointId],
    velocity_constraints: &mut [VelocityConstraint],
    velocities: &mut [VelocityState],
    constants: &[BodyConstants],
) {
    for &joint_id in joints {
        let (body_a, body_b, index_a, index_b) = {
            let joint = world.joint(joint_id).expect("island joint must exist");
            (joint.body_a(), joint.body_b(), body_index(bodies, joint.body_a()), body_index(bodies, joint.body_b()))
        };
        let a_state = JointBodyState {
            center: world.body(body_a).expect("joint body must exist").sweep().center1,
            angle: world.body(body_a).expect("joint body must exist").sweep().rotation1.angle(),
            linear_velocity: velocities[index_a].linear_velocity,
            angular_velocity: velocities[index_a].angular_velocity,
            inv_mass: constants[index_a].inv_mass,
            inv_rot_inertia: constants[index_a].inv_rot_inertia,
        };
        let b_state = JointBodyState {
            center: world.body(body_b).expect("joint body must exist").sweep().center1,
            angle: world.body(body_b).expect("joint body must exist").sweep().rotation1.angle(),
            linear_velocity: velocities[index_b].linear_velocity,
            angular_velocity: velocities[index_b].angular_velocity,
            inv_mass: constants[index_b].inv_mass,
            inv_rot_inertia: constants[index_b].inv_rot_inertia,
        };

        let mut va = velocities[index_a];
        let mut vb = velocities[index_b];
        world.joint_mut(joint_id).expect("island joint must exist").solve_velocity_constraints(&mut va, &mut vb, &a_state, &b_state);
        velocities[index_a] = va;
        velocities[index_b] = vb;
    }

    for vc in velocity_constraints.iter_mut() {
        let ca = constants[vc.index_a];
        let cb = constants[vc.index_b];
        let mut va = velocities[vc.index_a];
        let mut vb = velocities[vc.index_b];

        let tangent = Vec2::new(vc.normal.y, -vc.normal.x);

        for p in vc.points.iter_mut() {
            let dv = (vb.linear_velocity + cross_scalar_vec(vb.angular_velocity, p.r_b)) - (va.linear_velocity + cross_scalar_vec(va.angular_velocity, p.r_a));
            let vt = dv.dot(tangent) - vc.tangent_speed;
            let mut lambda = p.tangent_mass * -vt;
            let max_friction = vc.friction * p.normal_impulse;
            let new_impulse = (p.tangent_impulse + lambda).clamp(-max_friction, max_friction);
            lambda = new_impulse - p.tangent_impulse;
            p.tangent_impulse = new_impulse;

            let impulse = tangent * lambda;
            va.linear_velocity -= impulse * ca.inv_mass;
            va.angular_velocity -= ca.inv_rot_inertia * cross(p.r_a, impulse);
            vb.linear_velocity += impulse * cb.inv_mass;
            vb.angular_velocity += cb.inv_rot_inertia * cross(p.r_b, impulse);
        }

        for p in vc.points.iter_mut() {
            let dv = (vb.linear_velocity + cross_scalar_vec(vb.angular_velocity, p.r_b)) - (va.linear_velocity + cross_scalar_vec(va.angular_velocity, p.r_a));
            let vn = dv.dot(vc.normal);
            let mut lambda = -p.normal_mass * (vn - p.velocity_bias);
            let new_impulse = (p.normal_impulse + lambda).max(0.0);
            lambda = new_impulse - p.normal_impulse;
            p.normal_impulse = new_impulse;

            let impulse = vc.normal * lambda;
            va.linear_velocity -= impulse * ca.inv_mass;
            va.angular_velocity -= ca.inv_rot_inertia * cross(p.r_a, impulse);
            vb.linear_velocity += impulse * cb.inv_mass;
            vb.angular_velocity += cb.inv_rot_inertia * cross(p.r_b, impulse);
        }

        velocities[vc.index_a] = va;
        velocities[vc.index_b] = vb;
    }
}

/// Phase E: write each contact's final accumulated impulses back onto its
/// manifold (so the next step's `Contact::update` can warm-start from
/// them) and report them to the listener's `post_solve`.
fn store_impulses(world: &mut World, velocity_constraints: &[VelocityConstraint]) {
    for vc in velocity_constraints {
        let mut normal_impulses: ArrayVec<f64, MAX_MANIFOLD_POINTS> = ArrayVec::new();
        if let Some(contact) = world.contact_mut(vc.contact) {
            for (i, p) in vc.points.iter().enumerate() {
                if let Some(point) = contact.manifold.points.get_mut(i) {
                    point.normal_impulse = p.normal_impulse;
                    point.tangent_impulse = p.tangent_impulse;
                }
                let _ = normal_impulses.try_push(p.normal_impulse);
            }
        }
        world.fire_post_solve(vc.contact, &normal_impulses);
    }
}

/// Phase F: one position-iteration pass over contacts. Returns the worst
/// (most negative) separation seen, so the caller can exit early once
/// it's no worse than `-3 * LINEAR_SLOP`.
fn solve_contact_positions(position_constraints: &[PositionConstraint], positions: &mut [PositionState], constants: &[BodyConstants], conf: &PhaseConf) -> f64 {
    let mut min_separation = 0.0f64;

    for pc in position_constraints {
        let ca = constants[pc.index_a];
        let cb = constants[pc.index_b];
        let mut pa = positions[pc.index_a];
        let mut pb = positions[pc.index_b];

        let xf_a = origin_transform(pa.center, pa.angle, pc.local_center_a);
        let xf_b = origin_transform(pb.center, pb.angle, pc.local_center_b);
        let world_manifold = WorldManifold::new(&pc.manifold, &xf_a, pc.radius_a, &xf_b, pc.radius_b);

        for (i, _) in pc.manifold.points.iter().enumerate() {
            let wp = &world_manifold.points[i];
            min_separation = min_separation.min(wp.separation);

            let r_a = wp.point - pa.center;
            let r_b = wp.point - pb.center;
            let normal = world_manifold.normal;

            let rn_a = cross(r_a, normal);
            let rn_b = cross(r_b, normal);
            let k = ca.inv_mass + cb.inv_mass + ca.inv_rot_inertia * rn_a * rn_a + cb.inv_rot_inertia * rn_b * rn_b;
            let inv_k = if k > 0.0 { 1.0 / k } else { 0.0 };

            let c = (wp.separation + crate::constants::LINEAR_SLOP).clamp(-crate::constants::MAX_LINEAR_CORRECTION, 0.0);
            let impulse = inv_k * -conf.resolution_rate * c;
            let p = normal * impulse;

            pa.center -= p * ca.inv_mass;
            pa.angle -= ca.inv_rot_inertia * cross(r_a, p);
            pb.center += p * cb.inv_mass;
            pb.angle += cb.inv_rot_inertia * cross(r_b, p);
        }

        positions[pc.index_a] = pa;
        positions[pc.index_b] = pb;
    }

    min_separation
}

/// One position-iteration pass over joints; returns the worst absolute
/// residual reported, for the same early-exit test as the contacts.
fn solve_joint_positions(world: &mut World, bodies: &[BodyId], joints: &[crate::dynamics::body::JointId], positions: &mut [PositionState], constants: &[BodyConstants]) -> f64 {
    let mut worst = 0.0f64;

    for &joint_id in joints {
        let (body_a, body_b, index_a, index_b) = {
            let joint = world.joint(joint_id).expect("island joint must exist");
            (joint.body_a(), joint.body_b(), body_index(bodies, joint.body_a()), body_index(bodies, joint.body_b()))
        };

        let a_state = JointBodyState {
            center: positions[index_a].center,
            angle: positions[index_a].angle,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            inv_mass: constants[index_a].inv_mass,
            inv_rot_inertia: constants[index_a].inv_rot_inertia,
        };
        let b_state = JointBodyState {
            center: positions[index_b].center,
            angle: positions[index_b].angle,
            linear_velocity: Vec2::zero(),
            angular_velocity: 0.0,
            inv_mass: constants[index_b].inv_mass,
            inv_rot_inertia: constants[index_b].inv_rot_inertia,
        };

        let mut a_center = positions[index_a].center;
        let mut a_angle = positions[index_a].angle;
        let mut b_center = positions[index_b].center;
        let mut b_angle = positions[index_b].angle;

        let residual = world
            .joint_mut(joint_id)
            .expect("island joint must exist")
            .solve_position_constraints(&mut a_center, &mut a_angle, &mut b_center, &mut b_angle, &a_state, &b_state);

        positions[index_a] = PositionState { center: a_center, angle: a_angle };
        positions[index_b] = PositionState { center: b_center, angle: b_angle };
        worst = worst.max(residual);
    }

    worst
}

/// Integrate velocities under gravity/force/damping (Phase B), in place.
fn integrate_forces(world: &World, bodies: &[BodyId], velocities: &mut [VelocityState], dt: f64, gravity: Vec2) {
    for (i, &id) in bodies.iter().enumerate() {
        let body = world.body(id).expect("island body must exist");
        if body.body_type() != BodyType::Dynamic {
            continue;
        }
        let mut v = velocities[i].linear_velocity + (gravity * body.gravity_scale + body.force * body.inv_mass()) * dt;
        let mut w = velocities[i].angular_velocity + dt * body.inv_rot_inertia() * body.torque;
        v *= 1.0 / (1.0 + dt * body.linear_damping);
        w *= 1.0 / (1.0 + dt * body.angular_damping);
        velocities[i] = VelocityState {
            linear_velocity: v,
            angular_velocity: w,
        };
    }
}

/// Apply warm-started impulses (Phase C) to both contacts and joints.
fn warm_start(
    world: &mut World,
    bodies: &[BodyId],
    joints: &[crate::dynamics::body::JointId],
    velocity_constraints: &mut [VelocityConstraint],
    velocities: &mut [VelocityState],
    constants: &[BodyConstants],
    dt: f64,
) {
    for vc in velocity_constraints.iter_mut() {
        let ca = constants[vc.index_a];
        let cb = constants[vc.index_b];
        let mut va = velocities[vc.index_a];
        let mut vb = velocities[vc.index_b];
        let tangent = Vec2::new(vc.normal.y, -vc.normal.x);

        for p in vc.points.iter() {
            let impulse = vc.normal * p.normal_impulse + tangent * p.tangent_impulse;
            va.linear_velocity -= impulse * ca.inv_mass;
            va.angular_velocity -= ca.inv_rot_inertia * cross(p.r_a, impulse);
            vb.linear_velocity += impulse * cb.inv_mass;
            vb.angular_velocity += cb.inv_rot_inertia * cross(p.r_b, impulse);
        }

        velocities[vc.index_a] = va;
        velocities[vc.index_b] = vb;
    }

    for &joint_id in joints {
        let (body_a, body_b, index_a, index_b) = {
            let joint = world.joint(joint_id).expect("island joint must exist");
            (joint.body_a(), joint.body_b(), body_index(bodies, joint.body_a()), body_index(bodies, joint.body_b()))
        };
        let a_state = JointBodyState {
            center: world.body(body_a).expect("joint body must exist").sweep().center1,
            angle: world.body(body_a).expect("joint body must exist").sweep().rotation1.angle(),
            linear_velocity: velocities[index_a].linear_velocity,
            angular_velocity: velocities[index_a].angular_velocity,
            inv_mass: constants[index_a].inv_mass,
            inv_rot_inertia: constants[index_a].inv_rot_inertia,
        };
        let b_state = JointBodyState {
            center: world.body(body_b).expect("joint body must exist").sweep().center1,
            angle: world.body(body_b).expect("joint body must exist").sweep().rotation1.angle(),
            linear_velocity: velocities[index_b].linear_velocity,
            angular_velocity: velocities[index_b].angular_velocity,
            inv_mass: constants[index_b].inv_mass,
            inv_rot_inertia: constants[index_b].inv_rot_inertia,
        };
        let mut va = velocities[index_a];
        let mut vb = velocities[index_b];
        world
            .joint_mut(joint_id)
            .expect("island joint must exist")
            .init_velocity_constraints(&mut va, &mut vb, &a_state, &b_state, dt, true);
        velocities[index_a] = va;
        velocities[index_b] = vb;
    }
}

/// Integrate positions from velocities (Phase E), clamping per-step
/// translation/rotation so a fast body can't tunnel past the solver's
/// own assumptions in one step.
fn integrate_positions(velocities: &[VelocityState], positions: &mut [PositionState], dt: f64) {
    for (i, v) in velocities.iter().enumerate() {
        let mut translation = v.linear_velocity * dt;
        if length_squared(translation) > crate::constants::MAX_TRANSLATION * crate::constants::MAX_TRANSLATION {
            let ratio = crate::constants::MAX_TRANSLATION / translation.magnitude();
            translation *= ratio;
        }
        let mut rotation = v.angular_velocity * dt;
        if rotation.abs() > crate::constants::MAX_ROTATION {
            let ratio = crate::constants::MAX_ROTATION / rotation.abs();
            rotation *= ratio;
        }
        positions[i].center += translation;
        positions[i].angle += rotation;
    }
}

/// Phases B-H of the regular solver phase for one island.
///
/// Integrates forces into velocity, warm-starts, runs the velocity and
/// position iteration passes, writes results back to the bodies, and
/// applies the sleep heuristic.
pub fn solve_regular_phase(world: &mut World, island: &Island, conf: &PhaseConf, dt: f64, gravity: Vec2) {
    let bodies = &island.bodies;
    let (mut velocities, mut positions, constants) = gather_body_state(world, bodies);

    integrate_forces(world, bodies, &mut velocities, dt, gravity);

    let (mut velocity_constraints, position_constraints) = build_contact_constraints(world, bodies, &island.contacts, &positions, &velocities, &constants, conf);

    if conf.warm_starting {
        warm_start(world, bodies, &island.joints, &mut velocity_constraints, &mut velocities, &constants, dt);
    }

    for _ in 0..conf.velocity_iterations {
        solve_velocity_iteration(world, bodies, &island.joints, &mut velocity_constraints, &mut velocities, &constants);
    }

    store_impulses(world, &velocity_constraints);

    integrate_positions(&velocities, &mut positions, dt);

    for _ in 0..conf.position_iterations {
        let contact_separation = solve_contact_positions(&position_constraints, &mut positions, &constants, conf);
        let joint_residual = solve_joint_positions(world, bodies, &island.joints, &mut positions, &constants);
        if contact_separation >= -3.0 * crate::constants::LINEAR_SLOP && joint_residual <= crate::constants::LINEAR_SLOP {
            break;
        }
    }

    writeback(world, bodies, &velocities, &positions);
    if conf.allow_sleeping {
        apply_sleep(world, bodies, &velocities, dt);
    }
}

fn writeback(world: &mut World, bodies: &[BodyId], velocities: &[VelocityState], positions: &[PositionState]) {
    for (i, &id) in bodies.iter().enumerate() {
        let local_center = world.body(id).expect("island body must exist").local_center;
        let body = world.body_mut(id).expect("island body must exist");
        body.linear_velocity = velocities[i].linear_velocity;
        body.angular_velocity = velocities[i].angular_velocity;
        body.sweep.center1 = positions[i].center;
        body.sweep.rotation1 = UnitVec2::from_angle(positions[i].angle);
        body.transform = origin_transform(positions[i].center, positions[i].angle, local_center);
    }
}

fn apply_sleep(world: &mut World, bodies: &[BodyId], velocities: &[VelocityState], dt: f64) {
    let mut min_sleep_time = f64::INFINITY;

    for (i, &id) in bodies.iter().enumerate() {
        let body = match world.body_mut(id) {
            Some(b) => b,
            None => continue,
        };
        if body.body_type() == BodyType::Static {
            continue;
        }

        let allow_sleep = body.flags.contains(BodyFlags::ALLOW_SLEEP);
        let lin_sq = length_squared(velocities[i].linear_velocity);
        let ang_sq = velocities[i].angular_velocity * velocities[i].angular_velocity;

        if !allow_sleep || lin_sq > crate::constants::LINEAR_SLEEP_TOLERANCE_SQ || ang_sq > crate::constants::ANGULAR_SLEEP_TOLERANCE_SQ {
            body.sleep_time = 0.0;
            min_sleep_time = 0.0;
        } else {
            body.sleep_time += dt;
            min_sleep_time = min_sleep_time.min(body.sleep_time);
        }
    }

    if min_sleep_time >= crate::constants::TIME_TO_SLEEP {
        for &id in bodies {
            if let Some(body) = world.body_mut(id) {
                body.set_awake(false);
            }
        }
    }
}
