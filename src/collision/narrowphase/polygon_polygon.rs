//! Polygon-polygon manifold generator: separating-axis search for the
//! reference/incident face pair, then Sutherland–Hodgman clipping of the
//! incident segment against the reference face's side planes.

use arrayvec::ArrayVec;

use crate::collision::manifold::{ContactFeature, FeatureType, Manifold, ManifoldPoint, ManifoldType};
use crate::math::{Transformation, Vec2};
use crate::shape::ConvexPolygon;

/// Find the edge of `poly` (under `xf`) with maximum separation against
/// `other` (under `other_xf`). Returns `(edge_index, separation)`.
fn find_max_separation(
    poly: &ConvexPolygon,
    xf: &Transformation,
    other: &ConvexPolygon,
    other_xf: &Transformation,
) -> (usize, f64) {
    let to_other_local = |p: Vec2| other_xf.inverse_transform(xf.transform(p));

    let mut best_edge = 0;
    let mut best_separation = f64::NEG_INFINITY;

    for i in 0..poly.vertex_count() {
        // Normal and vertex transformed into `other`'s local frame.
        let n_world = xf.transform_direction(poly.normals[i]);
        let n_local = other_xf.inverse_transform_direction(n_world);
        let v_local = to_other_local(poly.vertices[i]);

        let mut min_proj = f64::INFINITY;
        for &ov in other.vertices.iter() {
            let proj = n_local.dot(ov - v_local);
            min_proj = min_proj.min(proj);
        }

        if min_proj > best_separation {
            best_separation = min_proj;
            best_edge = i;
        }
    }

    (best_edge, best_separation)
}

/// One endpoint of an incident segment, carrying the vertex index it came
/// from (for contact-feature identity) and whether it's already been
/// clipped against a side plane.
#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    point: Vec2,
    index: usize,
}

/// Clip the 2-point segment `input` against the half-plane
/// `dot(normal, p) <= offset`, keeping points on the inside and
/// interpolating a new point at the crossing if exactly one survives.
fn clip_segment(
    input: [ClipVertex; 2],
    normal: Vec2,
    offset: f64,
    clip_edge_index: usize,
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
        let _ = out.try_push(ClipVertex {
            point,
            index: clip_edge_index,
        });
    }

    out
}

/// Manifold between two convex polygons, owned by whichever polygon has
/// the larger separating-axis separation.
pub fn collide_polygons(
    poly_a: &ConvexPolygon,
    xf_a: &Transformation,
    poly_b: &ConvexPolygon,
    xf_b: &Transformation,
) -> Manifold {
    let total_radius = poly_a.vertex_radius + poly_b.vertex_radius;

    let (edge_a, separation_a) = find_max_separation(poly_a, xf_a, poly_b, xf_b);
    if separation_a > total_radius {
        return Manifold::unset();
    }

    let (edge_b, separation_b) = find_max_separation(poly_b, xf_b, poly_a, xf_a);
    if separation_b > total_radius {
        return Manifold::unset();
    }

    let (reference_is_a, ref_poly, ref_xf, ref_edge, inc_poly, inc_xf) = if separation_b > separation_a + 0.1 * crate::constants::LINEAR_SLOP {
        (false, poly_b, xf_b, edge_b, poly_a, xf_a)
    } else {
        (true, poly_a, xf_a, edge_a, poly_b, xf_b)
    };

    let ref_n = ref_poly.vertex_count();
    let ref_v1 = ref_poly.vertices[ref_edge];
    let ref_v2 = ref_poly.vertices[(ref_edge + 1) % ref_n];
    let ref_normal_world = ref_xf.transform_direction(ref_poly.normals[ref_edge]);

    // Incident face: the one whose normal is most anti-parallel to the
    // reference normal.
    let inc_n = inc_poly.vertex_count();
    let mut incident_edge = 0;
    let mut min_dot = f64::INFINITY;
    for i in 0..inc_n {
        let n_world = inc_xf.transform_direction(inc_poly.normals[i]);
        let d = ref_normal_world.dot(n_world);
        if d < min_dot {
            min_dot = d;
            incident_edge = i;
        }
    }

    let inc_v1_world = inc_xf.transform(inc_poly.vertices[incident_edge]);
    let inc_v2_world = inc_xf.transform(inc_poly.vertices[(incident_edge + 1) % inc_n]);

    // Work in the reference polygon's local frame.
    let incident = [
        ClipVertex {
            point: ref_xf.inverse_transform(inc_v1_world),
            index: incident_edge,
        },
        ClipVertex {
            point: ref_xf.inverse_transform(inc_v2_world),
            index: (incident_edge + 1) % inc_n,
        },
    ];

    let tangent = {
        let e = ref_v2 - ref_v1;
        let (dir, _) = crate::math::UnitVec2::new_normalize(e);
        dir.as_vec2()
    };

    let side1 = clip_segment(incident, -tangent, -tangent.dot(ref_v1), (ref_edge + ref_n - 1) % ref_n);
    if side1.len() < 2 {
        return Manifold::unset();
    }
    let side1: [ClipVertex; 2] = [side1[0], side1[1]];

    let side2 = clip_segment(side1, tangent, tangent.dot(ref_v2), (ref_edge + 1) % ref_n);
    if side2.len() < 2 {
        return Manifold::unset();
    }

    let ref_normal_local = ref_poly.normals[ref_edge];
    let front_offset = ref_normal_local.dot(ref_v1);

    let mut manifold = Manifold {
        kind: if reference_is_a { ManifoldType::FaceA } else { ManifoldType::FaceB },
        local_point: (ref_v1 + ref_v2) * 0.5,
        local_normal: ref_normal_local,
        points: Default::default(),
    };

    for cv in &side2 {
        let separation = ref_normal_local.dot(cv.point) - front_offset;
        if separation <= total_radius {
            let (feature_a, feature_b) = if reference_is_a {
                (ref_edge as u8, cv.index as u8)
            } else {
                (cv.index as u8, ref_edge as u8)
            };
            let _ = manifold.points.try_push(ManifoldPoint {
                local_point: cv.point,
                normal_impulse: 0.0,
                tangent_impulse: 0.0,
                feature: ContactFeature {
                    index_a: feature_a,
                    index_b: feature_b,
                    type_a: FeatureType::Face,
                    type_b: FeatureType::Vertex,
                },
            });
        }
    }

    manifold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::UnitVec2;

    #[test]
    fn stacked_boxes_produce_two_point_manifold() {
        let poly_a = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());
        let poly_b = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());

        let xf_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf_b = Transformation::new(Vec2::new(0.0, 1.95), UnitVec2::UNIT_X);

        let manifold = collide_polygons(&poly_a, &xf_a, &poly_b, &xf_b);
        assert!(manifold.is_touching());
        assert_eq!(manifold.points.len(), 2);
    }

    #[test]
    fn separated_boxes_do_not_touch() {
        let poly_a = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());
        let poly_b = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());

        let xf_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf_b = Transformation::new(Vec2::new(0.0, 10.0), UnitVec2::UNIT_X);

        let manifold = collide_polygons(&poly_a, &xf_a, &poly_b, &xf_b);
        assert!(!manifold.is_touching());
    }
}
