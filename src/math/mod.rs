//! 2D vector math, rotations, transforms and swept motion.

pub mod transform;
pub mod vec2;

pub use transform::{Sweep, Transformation};
pub use vec2::{cross, cross_scalar_vec, length_squared, UnitVec2, Vec2};
