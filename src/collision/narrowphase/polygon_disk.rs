//! Polygon-disk manifold generator: locate the disk center's Voronoi
//! region against the polygon (vertex, edge, or interior) and build the
//! single resulting manifold point.

use crate::collision::manifold::{ContactFeature, FeatureType, Manifold, ManifoldPoint, ManifoldType};
use crate::math::{Transformation, Vec2};
use crate::shape::{ConvexPolygon, Disk};

/// Manifold between a convex polygon (A) and a disk (B), in polygon A's
/// local frame.
pub fn collide_polygon_and_disk(
    polygon: &ConvexPolygon,
    xf_a: &Transformation,
    disk: &Disk,
    xf_b: &Transformation,
) -> Manifold {
    // Disk center in the polygon's local frame.
    let center = xf_a.inverse_transform(xf_b.transform(disk.center));
    let total_radius = polygon.vertex_radius + disk.radius;

    // Find the edge with maximum separation (the edge whose outward
    // normal the center is furthest along, i.e. least negative or most
    // positive projection past the edge).
    let n = polygon.vertex_count();
    let mut best_separation = f64::NEG_INFINITY;
    let mut best_edge = 0;
    for i in 0..n {
        let separation = polygon.normals[i].dot(center - polygon.vertices[i]);
        if separation > total_radius {
            // Short-circuit: the disk is entirely beyond this edge.
            return Manifold::unset();
        }
        if separation > best_separation {
            best_separation = separation;
            best_edge = i;
        }
    }

    let v1 = polygon.vertices[best_edge];
    let v2 = polygon.vertices[(best_edge + 1) % n];

    let local_normal;
    let local_point;
    let feature_index;
    let feature_type;

    if best_separation < f64::EPSILON {
        // Center is inside the polygon: the reference edge's own normal
        // is the contact normal, and the contact point projects onto
        // that edge.
        local_normal = polygon.normals[best_edge];
        local_point = (v1 + v2) * 0.5;
        feature_index = best_edge as u8;
        feature_type = FeatureType::Face;
    } else {
        let u1 = (center - v1).dot(v2 - v1);
        let u2 = (center - v2).dot(v1 - v2);

        if u1 <= 0.0 {
            if (center - v1).dot(center - v1) > total_radius * total_radius {
                return Manifold::unset();
            }
            let (dir, _) = crate::math::UnitVec2::new_normalize(center - v1);
            local_normal = dir.as_vec2();
            local_point = v1;
            feature_index = best_edge as u8;
            feature_type = FeatureType::Vertex;
        } else if u2 <= 0.0 {
            if (center - v2).dot(center - v2) > total_radius * total_radius {
                return Manifold::unset();
            }
            let (dir, _) = crate::math::UnitVec2::new_normalize(center - v2);
            local_normal = dir.as_vec2();
            local_point = v2;
            feature_index = ((best_edge + 1) % n) as u8;
            feature_type = FeatureType::Vertex;
        } else {
            // Edge voronoi region.
            let normal = polygon.normals[best_edge];
            if (center - v1).dot(normal) > total_radius {
                return Manifold::unset();
            }
            local_normal = normal;
            local_point = (v1 + v2) * 0.5;
            feature_index = best_edge as u8;
            feature_type = FeatureType::Face;
        }
    }

    let mut manifold = Manifold {
        kind: ManifoldType::FaceA,
        local_point,
        local_normal,
        points: Default::default(),
    };
    let _ = manifold.points.try_push(ManifoldPoint {
        local_point: Vec2::zero(),
        normal_impulse: 0.0,
        tangent_impulse: 0.0,
        feature: ContactFeature {
            index_a: feature_index,
            index_b: 0,
            type_a: feature_type,
            type_b: FeatureType::Vertex,
        },
    });
    manifold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::UnitVec2;

    #[test]
    fn disk_resting_on_box_top_face_touches() {
        let poly = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());
        let disk = Disk::new(0.5);
        let xf_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf_b = Transformation::new(Vec2::new(0.0, 1.3), UnitVec2::UNIT_X);

        let manifold = collide_polygon_and_disk(&poly, &xf_a, &disk, &xf_b);
        assert!(manifold.is_touching());
        assert_eq!(manifold.kind, ManifoldType::FaceA);
    }

    #[test]
    fn disk_far_away_does_not_touch() {
        let poly = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());
        let disk = Disk::new(0.5);
        let xf_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf_b = Transformation::new(Vec2::new(0.0, 10.0), UnitVec2::UNIT_X);

        let manifold = collide_polygon_and_disk(&poly, &xf_a, &disk, &xf_b);
        assert!(!manifold.is_touching());
    }

    #[test]
    fn disk_near_box_corner_uses_vertex_region() {
        let poly = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());
        let disk = Disk::new(0.5);
        let xf_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf_b = Transformation::new(Vec2::new(1.3, 1.3), UnitVec2::UNIT_X);

        let manifold = collide_polygon_and_disk(&poly, &xf_a, &disk, &xf_b);
        assert!(manifold.is_touching());
        assert_eq!(manifold.points[0].feature.type_a, FeatureType::Vertex);
    }
}
