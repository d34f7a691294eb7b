//! Collision geometry: AABBs, the GJK distance algorithm, time-of-impact,
//! and the per-shape-pair manifold generators.

pub mod aabb;
pub mod distance;
pub mod manifold;
pub mod narrowphase;
pub mod toi;

pub use aabb::{Aabb, RayCastInput, RayCastOutput};
pub use distance::{DistanceInput, DistanceOutput, SimplexCache};
pub use manifold::{ContactFeature, Manifold, ManifoldPoint, ManifoldType};
pub use toi::{TimeOfImpactInput, TimeOfImpactOutput, TimeOfImpactState};
