//! Mass properties derived from a shape and a density.

use crate::math::Vec2;

/// Mass, centroid and rotational inertia of a shape at a given density.
///
/// `rot_inertia` is about the shape's local origin (not its centroid);
/// `Body::set_mass_from_fixtures` shifts it to the body's combined center
/// of mass using the parallel axis theorem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MassData {
    /// Mass of the shape.
    pub mass: f64,
    /// Centroid, in the shape's local frame.
    pub center: Vec2,
    /// Rotational inertia about the shape's local origin.
    pub rot_inertia: f64,
}
