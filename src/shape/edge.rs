//! Edge (line segment) shape, with optional ghost neighbors for smooth
//! chaining.

use smallvec::SmallVec;

use crate::collision::aabb::Aabb;
use crate::constants::POLYGON_RADIUS;
use crate::math::{Transformation, Vec2};
use crate::shape::massdata::MassData;
use crate::shape::proxy::DistanceProxy;

/// A line segment `v1 -> v2`, optionally aware of the vertices before and
/// after it in a parent chain (`v0`, `v3`).
///
/// Ghost vertices let the narrow-phase generators restrict the admissible
/// contact-normal half-plane to avoid "internal edge" collisions when a
/// body slides smoothly across a run of chained edges (a polygon colliding
/// with the *back* side of one edge while straddling the seam with its
/// neighbor) — see [`crate::collision::narrowphase::edge_polygon`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Vertex before `v1` in the parent chain, if any.
    pub v0: Option<Vec2>,
    /// First endpoint.
    pub v1: Vec2,
    /// Second endpoint.
    pub v2: Vec2,
    /// Vertex after `v2` in the parent chain, if any.
    pub v3: Option<Vec2>,
    /// Vertex skin radius.
    pub vertex_radius: f64,
}

impl Edge {
    /// A bare edge with no chain neighbors.
    pub fn new(v1: Vec2, v2: Vec2) -> Self {
        Self {
            v0: None,
            v1,
            v2,
            v3: None,
            vertex_radius: POLYGON_RADIUS,
        }
    }

    /// An edge with one or both ghost neighbors set, as produced by a
    /// parent [`crate::shape::chain::Chain`].
    pub fn with_neighbors(v0: Option<Vec2>, v1: Vec2, v2: Vec2, v3: Option<Vec2>) -> Self {
        Self {
            v0,
            v1,
            v2,
            v3,
            vertex_radius: POLYGON_RADIUS,
        }
    }

    /// Always one child.
    pub fn child_count(&self) -> usize {
        1
    }

    /// Distance proxy (just the two endpoints; ghost vertices don't
    /// participate in GJK, only in manifold-normal admissibility).
    pub fn proxy(&self) -> DistanceProxy {
        DistanceProxy::for_segment(self.v1, self.v2, self.vertex_radius)
    }

    /// World-space AABB.
    pub fn compute_aabb(&self, xf: &Transformation) -> Aabb {
        let p1 = xf.transform(self.v1);
        let p2 = xf.transform(self.v2);
        let skin = Vec2::new(self.vertex_radius, self.vertex_radius);
        Aabb::new(
            Vec2::new(p1.x.min(p2.x), p1.y.min(p2.y)) - skin,
            Vec2::new(p1.x.max(p2.x), p1.y.max(p2.y)) + skin,
        )
    }

    /// Edges have no area; mass is zero (a ground/world edge is always
    /// paired with a `Static` body so this is never exercised for a
    /// dynamic body's own mass computation).
    pub fn compute_mass(&self, _density: f64) -> MassData {
        MassData {
            mass: 0.0,
            center: (self.v1 + self.v2) / 2.0,
            rot_inertia: 0.0,
        }
    }

    /// The two endpoints as a tiny polygon-like vertex list, for code that
    /// wants a uniform "vertices" view (the reference/incident-face
    /// clipping routines).
    pub fn vertices(&self) -> SmallVec<[Vec2; 2]> {
        let mut v = SmallVec::new();
        v.push(self.v1);
        v.push(self.v2);
        v
    }
}
