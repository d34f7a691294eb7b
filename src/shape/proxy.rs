//! The distance proxy: a uniform read-only view of one shape child,
//! consumed by GJK, TOI and the narrow-phase manifold generators.

use smallvec::SmallVec;

use crate::math::Vec2;

/// Maximum vertices any single distance proxy can hold.
///
/// Disks use 1, edges use 2, convex polygons up to this bound (matching
/// the source's `MaxShapeVertices` == 8).
pub const MAX_PROXY_VERTICES: usize = 8;

/// `(vertexRadius, vertices, normals)` view of a shape, read by value.
///
/// `normals[i]` is the outward normal of the edge from `vertices[i]` to
/// `vertices[(i + 1) % vertices.len()]`; for a single-vertex proxy (a
/// disk) `normals` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceProxy {
    /// The "skin" radius rounding every vertex of this proxy.
    pub vertex_radius: f64,
    /// Ordered vertex list, in the shape's local frame.
    pub vertices: SmallVec<[Vec2; MAX_PROXY_VERTICES]>,
    /// Outward unit normals, matching `vertices` (one shorter for open
    /// polylines like a bare edge without neighbors, same length for a
    /// closed polygon).
    pub normals: SmallVec<[Vec2; MAX_PROXY_VERTICES]>,
}

impl DistanceProxy {
    /// A single-point proxy (a disk).
    pub fn for_point(center: Vec2, vertex_radius: f64) -> Self {
        let mut vertices = SmallVec::new();
        vertices.push(center);
        Self {
            vertex_radius,
            vertices,
            normals: SmallVec::new(),
        }
    }

    /// A two-point proxy (a bare edge, no neighbor smoothing).
    pub fn for_segment(a: Vec2, b: Vec2, vertex_radius: f64) -> Self {
        let mut vertices = SmallVec::new();
        vertices.push(a);
        vertices.push(b);
        Self {
            vertex_radius,
            vertices,
            normals: SmallVec::new(),
        }
    }

    /// A closed-polygon proxy.
    pub fn for_polygon(
        vertices: SmallVec<[Vec2; MAX_PROXY_VERTICES]>,
        normals: SmallVec<[Vec2; MAX_PROXY_VERTICES]>,
        vertex_radius: f64,
    ) -> Self {
        debug_assert_eq!(vertices.len(), normals.len());
        Self {
            vertex_radius,
            vertices,
            normals,
        }
    }

    /// Number of vertices in this proxy.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether this proxy has no vertices (never constructed by this
    /// crate, but kept so callers can guard defensively).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The vertex furthest in direction `d`.
    ///
    /// Returns its index so callers (GJK) can track which vertex pair
    /// produced a given simplex vertex for cycle detection.
    pub fn support(&self, d: Vec2) -> usize {
        let mut best_index = 0;
        let mut best_value = self.vertices[0].dot(d);
        for (i, v) in self.vertices.iter().enumerate().skip(1) {
            let value = v.dot(d);
            if value > best_value {
                best_value = value;
                best_index = i;
            }
        }
        best_index
    }

    /// Vertex at `index`.
    #[inline]
    pub fn vertex(&self, index: usize) -> Vec2 {
        self.vertices[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_picks_furthest_vertex() {
        let mut vertices = SmallVec::new();
        vertices.push(Vec2::new(-1.0, 0.0));
        vertices.push(Vec2::new(1.0, 0.0));
        vertices.push(Vec2::new(0.0, 1.0));
        let proxy = DistanceProxy {
            vertex_radius: 0.0,
            vertices,
            normals: SmallVec::new(),
        };

        assert_eq!(proxy.support(Vec2::new(1.0, 0.0)), 1);
        assert_eq!(proxy.support(Vec2::new(-1.0, 0.0)), 0);
        assert_eq!(proxy.support(Vec2::new(0.0, 1.0)), 2);
    }
}
