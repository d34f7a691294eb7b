//! Multi-convex shape: a fixed set of convex polygon children.

use crate::collision::aabb::Aabb;
use crate::math::{Transformation, Vec2};
use crate::shape::massdata::MassData;
use crate::shape::polygon::ConvexPolygon;
use crate::shape::proxy::DistanceProxy;

/// A composite of convex polygon children, e.g. an L-shaped platform
/// represented as two boxes. No automatic decomposition is performed —
/// callers supply already-convex pieces (decomposition belongs to the
/// external shape-authoring tooling, out of this crate's scope).
#[derive(Debug, Clone, PartialEq)]
pub struct MultiConvex {
    /// The convex pieces.
    pub children: Vec<ConvexPolygon>,
}

impl MultiConvex {
    /// Construct from already-convex children.
    pub fn new(children: Vec<ConvexPolygon>) -> Self {
        debug_assert!(!children.is_empty());
        Self { children }
    }

    /// Number of convex children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Distance proxy for child `index`.
    pub fn proxy(&self, index: usize) -> DistanceProxy {
        self.children[index].proxy()
    }

    /// World-space AABB of child `index`.
    pub fn compute_aabb(&self, xf: &Transformation, index: usize) -> Aabb {
        self.children[index].compute_aabb(xf)
    }

    /// Combined mass properties, summing each child's contribution and
    /// composing their inertias (all already about the shared local
    /// origin, so no extra parallel-axis shift is needed here).
    pub fn compute_mass(&self, density: f64) -> MassData {
        let mut mass = 0.0;
        let mut center = Vec2::zero();
        let mut rot_inertia = 0.0;

        for child in &self.children {
            let data = child.compute_mass(density);
            mass += data.mass;
            center += data.center * data.mass;
            rot_inertia += data.rot_inertia;
        }

        let center = if mass > f64::EPSILON {
            center / mass
        } else {
            Vec2::zero()
        };

        MassData {
            mass,
            center,
            rot_inertia,
        }
    }
}
