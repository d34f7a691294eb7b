//! The shape catalog: disk, edge, convex polygon, chain, multi-convex.
//!
//! Treated as an external collaborator per spec scope — the core only
//! needs each shape's child count, per-child [`proxy::DistanceProxy`] and
//! AABB/mass. Re-architected as a tagged union (sum type) with static
//! dispatch rather than the source's `Shape` class hierarchy with a
//! virtual-dispatch visitor, per the redesign note: the shape-kind
//! universe is small, closed and performance-critical, so a `match` beats
//! a vtable.

pub mod chain;
pub mod disk;
pub mod edge;
pub mod massdata;
pub mod multi;
pub mod polygon;
pub mod proxy;

use crate::collision::aabb::Aabb;
use crate::math::Transformation;

pub use chain::Chain;
pub use disk::Disk;
pub use edge::Edge;
pub use massdata::MassData;
pub use multi::MultiConvex;
pub use polygon::ConvexPolygon;
pub use proxy::DistanceProxy;

/// Any of the supported shape kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A circle.
    Disk(Disk),
    /// A line segment, possibly ghost-neighbor aware.
    Edge(Edge),
    /// A convex polygon.
    Polygon(ConvexPolygon),
    /// An open polyline of neighbor-aware edges.
    Chain(Chain),
    /// A composite of convex polygons.
    Multi(MultiConvex),
}

impl Shape {
    /// Number of independently-collidable children this shape has.
    ///
    /// 1 for everything except [`Shape::Chain`] (`vertices.len() - 1`) and
    /// [`Shape::Multi`] (one per convex piece).
    pub fn child_count(&self) -> usize {
        match self {
            Shape::Disk(d) => d.child_count(),
            Shape::Edge(e) => e.child_count(),
            Shape::Polygon(p) => p.child_count(),
            Shape::Chain(c) => c.child_count(),
            Shape::Multi(m) => m.child_count(),
        }
    }

    /// The distance proxy for child `index`.
    ///
    /// For [`Shape::Chain`] this synthesizes the child's edge (with ghost
    /// vertices) first.
    pub fn proxy(&self, index: usize) -> DistanceProxy {
        match self {
            Shape::Disk(d) => {
                debug_assert_eq!(index, 0);
                d.proxy()
            }
            Shape::Edge(e) => {
                debug_assert_eq!(index, 0);
                e.proxy()
            }
            Shape::Polygon(p) => {
                debug_assert_eq!(index, 0);
                p.proxy()
            }
            Shape::Chain(c) => c.child_edge(index).proxy(),
            Shape::Multi(m) => m.proxy(index),
        }
    }

    /// World-space AABB of child `index`.
    pub fn compute_aabb(&self, xf: &Transformation, index: usize) -> Aabb {
        match self {
            Shape::Disk(d) => {
                debug_assert_eq!(index, 0);
                d.compute_aabb(xf)
            }
            Shape::Edge(e) => {
                debug_assert_eq!(index, 0);
                e.compute_aabb(xf)
            }
            Shape::Polygon(p) => {
                debug_assert_eq!(index, 0);
                p.compute_aabb(xf)
            }
            Shape::Chain(c) => c.child_edge(index).compute_aabb(xf),
            Shape::Multi(m) => m.compute_aabb(xf, index),
        }
    }

    /// Mass properties at the given density, summed over all children
    /// where applicable.
    pub fn compute_mass(&self, density: f64) -> MassData {
        match self {
            Shape::Disk(d) => d.compute_mass(density),
            Shape::Edge(e) => e.compute_mass(density),
            Shape::Polygon(p) => p.compute_mass(density),
            Shape::Chain(c) => c.compute_mass(density),
            Shape::Multi(m) => m.compute_mass(density),
        }
    }

    /// This shape's vertex ("skin") radius. For composite/chain shapes
    /// this is the radius of child 0 — all children of one shape share a
    /// vertex radius in this crate's model.
    pub fn vertex_radius(&self) -> f64 {
        match self {
            Shape::Disk(d) => d.radius,
            Shape::Edge(e) => e.vertex_radius,
            Shape::Polygon(p) => p.vertex_radius,
            Shape::Chain(_) => crate::constants::POLYGON_RADIUS,
            Shape::Multi(m) => m.children.first().map_or(0.0, |c| c.vertex_radius),
        }
    }

    /// A coarse discriminant used by narrow-phase dispatch, collapsing
    /// [`Shape::Chain`] to [`ShapeKind::Edge`] (its children are
    /// synthesized edges) per spec.md §4.5.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Disk(_) => ShapeKind::Disk,
            Shape::Edge(_) | Shape::Chain(_) => ShapeKind::Edge,
            Shape::Polygon(_) | Shape::Multi(_) => ShapeKind::Polygon,
        }
    }
}

/// The coarse shape-kind discriminant the narrow-phase dispatches on.
///
/// [`Shape::Multi`] collapses to `Polygon` because the narrow-phase always
/// operates on one already-selected convex child at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A disk.
    Disk,
    /// An edge (bare or chain-synthesized).
    Edge,
    /// A convex polygon (bare or a multi-convex child).
    Polygon,
}
