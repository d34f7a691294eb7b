//! Edge-polygon manifold generator.
//!
//! Treats the edge as a degenerate two-vertex, one-face "polygon" and
//! runs the same reference/incident-face + clipping pipeline as
//! polygon-polygon, but first derives an [`EdgeInfo`] from the edge's
//! ghost vertices (if any) to restrict the admissible normal half-plane —
//! this is what suppresses "ghost collisions" against the back of an
//! interior edge when a polygon slides smoothly across a chain.

use arrayvec::ArrayVec;

use crate::collision::manifold::{ContactFeature, FeatureType, Manifold, ManifoldPoint, ManifoldType};
use crate::math::{Transformation, Vec2};
use crate::shape::{ConvexPolygon, Edge};

/// Admissible-normal bookkeeping derived from an edge's ghost vertices.
///
/// `normal` is the edge's own (front-side) normal. `lower_limit` and
/// `upper_limit` bound the polygon-normal direction that's allowed to
/// produce a contact: outside that range the geometry continues smoothly
/// into the neighbor edge, so a "contact" there would be a spurious ghost
/// collision against an internal seam.
struct EdgeInfo {
    v1: Vec2,
    v2: Vec2,
    normal: Vec2,
    lower_limit: Vec2,
    upper_limit: Vec2,
    convex1: bool,
    convex2: bool,
}

impl EdgeInfo {
    fn new(edge: &Edge) -> Self {
        let v1 = edge.v1;
        let v2 = edge.v2;
        let e = v2 - v1;
        let (normal, _) = crate::math::UnitVec2::new_normalize(Vec2::new(e.y, -e.x));
        let normal = normal.as_vec2();

        let (lower_limit, convex1) = match edge.v0 {
            Some(v0) => {
                let e0 = v1 - v0;
                let (n0, _) = crate::math::UnitVec2::new_normalize(Vec2::new(e0.y, -e0.x));
                let convex = crate::math::cross(e0, e) > 0.0;
                (n0.as_vec2(), convex)
            }
            None => (normal, true),
        };

        let (upper_limit, convex2) = match edge.v3 {
            Some(v3) => {
                let e1 = v3 - v2;
                let (n1, _) = crate::math::UnitVec2::new_normalize(Vec2::new(e1.y, -e1.x));
                let convex = crate::math::cross(e, e1) > 0.0;
                (n1.as_vec2(), convex)
            }
            None => (normal, true),
        };

        Self {
            v1,
            v2,
            normal,
            lower_limit,
            upper_limit,
            convex1,
            convex2,
        }
    }

    /// Whether `n` (a candidate contact normal, in the edge's local frame)
    /// falls in the admissible half-plane at this edge's start vertex.
    fn admissible_at_start(&self, n: Vec2) -> bool {
        if self.convex1 {
            n.dot(self.lower_limit) >= -1e-6 || n.dot(self.normal) >= 0.999
        } else {
            true
        }
    }

    /// Same, at the end vertex.
    fn admissible_at_end(&self, n: Vec2) -> bool {
        if self.convex2 {
            n.dot(self.upper_limit) >= -1e-6 || n.dot(self.normal) >= 0.999
        } else {
            true
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    point: Vec2,
    index: usize,
}

fn clip_segment(
    input: [ClipVertex; 2],
    normal: Vec2,
    offset: f64,
    clip_index: usize,
) -> ArrayVec<ClipVertex, 2> {
    let mut out = ArrayVec::new();
    let d0 = normal.dot(input[0].point) - offset;
    let d1 = normal.dot(input[1].point) - offset;

    if d0 <= 0.0 {
        let _ = out.try_push(input[0]);
    }
    if d1 <= 0.0 {
        let _ = out.try_push(input[1]);
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        let point = input[0].point + (input[1].point - input[0].point) * t;
        let _ = out.try_push(ClipVertex { point, index: clip_index });
    }
    out
}

/// Manifold between an edge (A) and a convex polygon (B), in edge A's
/// local frame.
pub fn collide_edge_and_polygon(
    edge: &Edge,
    xf_a: &Transformation,
    polygon: &ConvexPolygon,
    xf_b: &Transformation,
) -> Manifold {
    let info = EdgeInfo::new(edge);
    let total_radius = edge.vertex_radius + polygon.vertex_radius;

    // Polygon vertices/normals in the edge's local frame.
    let poly_n = polygon.vertex_count();
    let to_edge_local = |p: Vec2| xf_a.inverse_transform(xf_b.transform(p));
    let normal_to_edge_local = |n: Vec2| xf_a.inverse_transform_direction(xf_b.transform_direction(n));

    // Separation of the edge's single face against the polygon.
    let mut edge_separation = f64::INFINITY;
    for i in 0..poly_n {
        let v = to_edge_local(polygon.vertices[i]);
        edge_separation = edge_separation.min(info.normal.dot(v - info.v1));
    }
    if edge_separation > total_radius {
        return Manifold::unset();
    }

    // Separation of the polygon's best edge against the edge's two
    // vertices.
    let mut poly_separation = f64::NEG_INFINITY;
    let mut poly_edge = 0;
    for i in 0..poly_n {
        let n_local = normal_to_edge_local(polygon.normals[i]);
        let v_local = to_edge_local(polygon.vertices[i]);
        let s = n_local.dot(info.v1 - v_local).min(n_local.dot(info.v2 - v_local));
        if s > poly_separation {
            poly_separation = s;
            poly_edge = i;
        }
    }
    if poly_separation > total_radius {
        return Manifold::unset();
    }

    let edge_is_reference = edge_separation >= poly_separation - 0.1 * crate::constants::LINEAR_SLOP;

    if edge_is_reference {
        let candidate_normal = info.normal;
        if !info.admissible_at_start(candidate_normal) || !info.admissible_at_end(candidate_normal) {
            // Ghost-suppressed: the geometry continues smoothly here, so
            // no contact is reported from this edge for this approach
            // direction.
            return Manifold::unset();
        }

        // Incident face: polygon edge most anti-parallel to `info.normal`.
        let mut incident_edge = 0;
        let mut min_dot = f64::INFINITY;
        for i in 0..poly_n {
            let n_local = normal_to_edge_local(polygon.normals[i]);
            let d = info.normal.dot(n_local);
            if d < min_dot {
                min_dot = d;
                incident_edge = i;
            }
        }

        let inc_v1 = to_edge_local(polygon.vertices[incident_edge]);
        let inc_v2 = to_edge_local(polygon.vertices[(incident_edge + 1) % poly_n]);

        let tangent = {
            let e = info.v2 - info.v1;
            let (dir, _) = crate::math::UnitVec2::new_normalize(e);
            dir.as_vec2()
        };

        let incident = [
            ClipVertex { point: inc_v1, index: incident_edge },
            ClipVertex { point: inc_v2, index: (incident_edge + 1) % poly_n },
        ];

        let side1 = clip_segment(incident, -tangent, -tangent.dot(info.v1), usize::MAX);
        if side1.len() < 2 {
            return Manifold::unset();
        }
        let side1: [ClipVertex; 2] = [side1[0], side1[1]];
        let side2 = clip_segment(side1, tangent, tangent.dot(info.v2), usize::MAX);
        if side2.len() < 2 {
            return Manifold::unset();
        }

        let front_offset = info.normal.dot(info.v1);
        let mut manifold = Manifold {
            kind: ManifoldType::FaceA,
            local_point: (info.v1 + info.v2) * 0.5,
            local_normal: info.normal,
            points: Default::default(),
        };

        for cv in &side2 {
            let separation = info.normal.dot(cv.point) - front_offset;
            if separation <= total_radius {
                let _ = manifold.points.try_push(ManifoldPoint {
                    local_point: cv.point,
                    normal_impulse: 0.0,
                    tangent_impulse: 0.0,
                    feature: ContactFeature {
                        index_a: 0,
                        index_b: cv.index as u8,
                        type_a: FeatureType::Face,
                        type_b: FeatureType::Vertex,
                    },
                });
            }
        }
        manifold
    } else {
        // Polygon owns the reference face; the edge is the (two-point)
        // incident segment.
        let ref_n_local = normal_to_edge_local(polygon.normals[poly_edge]);
        if !info.admissible_at_start(-ref_n_local) && !info.admissible_at_end(-ref_n_local) {
            return Manifold::unset();
        }

        let ref_v1 = to_edge_local(polygon.vertices[poly_edge]);
        let ref_v2 = to_edge_local(polygon.vertices[(poly_edge + 1) % poly_n]);

        let incident = [
            ClipVertex { point: info.v1, index: 0 },
            ClipVertex { point: info.v2, index: 1 },
        ];

        let tangent = {
            let e = ref_v2 - ref_v1;
            let (dir, _) = crate::math::UnitVec2::new_normalize(e);
            dir.as_vec2()
        };

        let side1 = clip_segment(incident, -tangent, -tangent.dot(ref_v1), usize::MAX);
        if side1.len() < 2 {
            return Manifold::unset();
        }
        let side1: [ClipVertex; 2] = [side1[0], side1[1]];
        let side2 = clip_segment(side1, tangent, tangent.dot(ref_v2), usize::MAX);
        if side2.len() < 2 {
            return Manifold::unset();
        }

        let front_offset = ref_n_local.dot(ref_v1);
        let mut manifold = Manifold {
            kind: ManifoldType::FaceB,
            local_point: (ref_v1 + ref_v2) * 0.5,
            local_normal: ref_n_local,
            points: Default::default(),
        };

        for cv in &side2 {
            let separation = ref_n_local.dot(cv.point) - front_offset;
            if separation <= total_radius {
                let _ = manifold.points.try_push(ManifoldPoint {
                    local_point: cv.point,
                    normal_impulse: 0.0,
                    tangent_impulse: 0.0,
                    feature: ContactFeature {
                        index_a: cv.index as u8,
                        index_b: poly_edge as u8,
                        type_a: FeatureType::Vertex,
                        type_b: FeatureType::Face,
                    },
                });
            }
        }
        manifold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::UnitVec2;

    #[test]
    fn box_resting_on_bare_edge_touches() {
        let edge = Edge::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));
        let poly = ConvexPolygon::box_shape(0.5, 0.5, Vec2::zero());

        let xf_a = Transformation::IDENTITY;
        let xf_b = Transformation::new(Vec2::new(0.0, 0.6), UnitVec2::UNIT_X);

        let manifold = collide_edge_and_polygon(&edge, &xf_a, &poly, &xf_b);
        assert!(manifold.is_touching());
    }

    #[test]
    fn box_far_above_edge_does_not_touch() {
        let edge = Edge::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));
        let poly = ConvexPolygon::box_shape(0.5, 0.5, Vec2::zero());

        let xf_a = Transformation::IDENTITY;
        let xf_b = Transformation::new(Vec2::new(0.0, 10.0), UnitVec2::UNIT_X);

        let manifold = collide_edge_and_polygon(&edge, &xf_a, &poly, &xf_b);
        assert!(!manifold.is_touching());
    }
}
