//! Island assembly: groups bodies, contacts and joints that can affect
//! each other this step into independently solvable batches.
//!
//! Grounded on the source's `Island`/`b2Island`: a depth-first walk
//! seeded from each not-yet-islanded awake dynamic body, crossing a
//! contact or joint edge only if it's actually touching/enabled, and
//! treating static bodies as graph leaves — they join an island but never
//! propagate the walk onward, since an infinite-mass body can't transmit
//! motion between two otherwise-disconnected islands.

use smallvec::SmallVec;

use crate::dynamics::body::{BodyId, BodyType, JointId};
use crate::dynamics::contact::ContactId;
use crate::dynamics::world::World;
use crate::math::Vec2;

/// Per-body linear/angular velocity scratch a joint or contact solver
/// reads and writes during one velocity-iteration pass, addressed by
/// island-local index rather than arena key.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityState {
    /// Linear velocity.
    pub linear_velocity: Vec2,
    /// Angular velocity, radians/second.
    pub angular_velocity: f64,
}

/// Per-body position scratch the position-iteration pass reads and
/// writes; kept separate from the live `Sweep` until writeback so a
/// position-iteration that doesn't converge can still commit its partial
/// progress without re-deriving it from the sweep.
#[derive(Debug, Clone, Copy)]
pub struct PositionState {
    /// Center of mass position.
    pub center: Vec2,
    /// Orientation, radians.
    pub angle: f64,
}

/// One connected batch of bodies/contacts/joints to hand to the solver.
///
/// Capacity is bounded the way the source bounds an `Island`'s backing
/// arrays: a world-wide cap rather than a per-island one, since the
/// number of islands in a step isn't known up front.
#[derive(Debug, Default)]
pub struct Island {
    /// Bodies in this island, in DFS-discovery order. Index 0..n is the
    /// `VelocityState`/`PositionState` index space the solver uses.
    pub bodies: Vec<BodyId>,
    /// Contacts entirely contained within this island.
    pub contacts: Vec<ContactId>,
    /// Joints entirely contained within this island.
    pub joints: Vec<JointId>,
}

impl Island {
    /// Number of bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Walk the contact/joint graph from every not-yet-islanded awake,
/// enabled, non-static body, producing one [`Island`] per connected
/// component. Static bodies are added to whichever island(s) touch them
/// but never marked islanded themselves, so they can terminate multiple
/// islands' walks without merging those islands together.
pub fn build_islands(world: &mut World) -> Vec<Island> {
    let mut islands = Vec::new();
    let mut stack: SmallVec<[BodyId; 64]> = SmallVec::new();

    let seeds: Vec<BodyId> = world
        .body_ids()
        .into_iter()
        .filter(|&id| {
            world.body(id).is_some_and(|body| {
                body.is_enabled() && body.is_awake() && body.body_type() != BodyType::Static && !body.is_islanded()
            })
        })
        .collect();

    for seed in seeds {
        if world.body(seed).is_some_and(|b| b.is_islanded()) {
            continue;
        }

        let mut island = Island::default();
        stack.push(seed);

        while let Some(body_id) = stack.pop() {
            let body_type = match world.body(body_id) {
                Some(b) => b.body_type(),
                None => continue,
            };

            // Dynamic/kinematic bodies are claimed by exactly one island for
            // the rest of this step. Static bodies are never claimed globally
            // -- they can terminate any number of islands -- so dedupe them
            // against this island's own body list instead.
            if body_type != BodyType::Static {
                if world.body(body_id).is_some_and(|b| b.is_islanded()) {
                    continue;
                }
                world.mark_islanded(body_id, true);
            } else if island.bodies.contains(&body_id) {
                continue;
            }

            island.bodies.push(body_id);

            // A static body is a graph leaf: it joins the island but its own
            // contacts/joints were already (or will be) picked up from the
            // non-static side, so don't walk its edges.
            if body_type == BodyType::Static {
                continue;
            }

            let (contact_edges, joint_edges) = {
                let body = world.body(body_id).expect("just-islanded body must still exist");
                (body.contact_edges.clone(), body.joint_edges.clone())
            };

            for edge in &contact_edges {
                let touches = world
                    .contact(edge.contact)
                    .is_some_and(|contact| contact.is_touching() && contact.is_enabled());
                if !touches {
                    continue;
                }
                if !island.contacts.contains(&edge.contact) {
                    island.contacts.push(edge.contact);
                }
                let reachable = world.body(edge.other).is_some_and(|o| o.is_enabled() && !o.is_islanded());
                if reachable {
                    stack.push(edge.other);
                }
            }

            for edge in &joint_edges {
                if !island.joints.contains(&edge.joint) {
                    island.joints.push(edge.joint);
                }
                let reachable = world.body(edge.other).is_some_and(|o| o.is_enabled() && !o.is_islanded());
                if reachable {
                    stack.push(edge.other);
                }
            }
        }

        islands.push(island);
    }

    islands
}
