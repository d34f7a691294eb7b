//! The dynamics layer: bodies, fixtures, contacts, joints, islands, the
//! sequential-impulse solver, and the [`world::World`] that ties them
//! together into one `step`.

pub mod body;
pub mod contact;
pub mod fixture;
pub mod island;
pub mod joint;
pub mod solver;
pub mod world;

pub use body::{Body, BodyConf, BodyId, BodyType, FixtureId, JointId};
pub use contact::{Contact, ContactId, TouchingTransition};
pub use fixture::{Filter, Fixture, FixtureConf};
pub use island::{Island, PositionState, VelocityState};
pub use joint::{DistanceJoint, Joint};
pub use world::{ContactListener, StepConf, StepStats, World, WorldConf};
