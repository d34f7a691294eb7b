//! A 2D rigid-body physics core: broad-phase, narrow-phase, island
//! assembly and a sequential-impulse constraint solver, following the
//! source's step structure (pre-phase, regular phase, TOI phase).
//!
//! The [`dynamics::world::World`] is the entry point: create bodies and
//! fixtures on it, optionally join them with a [`dynamics::joint::Joint`],
//! and call [`dynamics::world::World::step`] once per frame.

pub mod broadphase;
pub mod collision;
pub mod constants;
pub mod dynamics;
pub mod error;
pub mod math;
pub mod shape;

pub use dynamics::world::{ContactListener, StepConf, StepStats, World, WorldConf};
pub use dynamics::{Body, BodyConf, BodyId, BodyType, Contact, ContactId, Fixture, FixtureConf, FixtureId, Joint, JointId};
pub use error::{PhysicsError, Result};
pub use shape::Shape;
