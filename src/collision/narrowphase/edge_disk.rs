//! Edge-disk manifold generator: the disk's Voronoi region against the
//! single segment (before-start, on-segment, after-end).

use crate::collision::manifold::{ContactFeature, FeatureType, Manifold, ManifoldPoint, ManifoldType};
use crate::math::{Transformation, Vec2};
use crate::shape::{Disk, Edge};

/// Manifold between an edge (A) and a disk (B), in edge A's local frame.
pub fn collide_edge_and_disk(edge: &Edge, xf_a: &Transformation, disk: &Disk, xf_b: &Transformation) -> Manifold {
    let center = xf_a.inverse_transform(xf_b.transform(disk.center));
    let total_radius = edge.vertex_radius + disk.radius;

    let a = edge.v1;
    let b = edge.v2;
    let e = b - a;

    let u = e.dot(b - center);
    let v = e.dot(center - a);

    let (local_normal, local_point, feature_type);

    if v <= 0.0 {
        if (center - a).dot(center - a) > total_radius * total_radius {
            return Manifold::unset();
        }
        let (dir, _) = crate::math::UnitVec2::new_normalize(center - a);
        local_normal = dir.as_vec2();
        local_point = a;
        feature_type = FeatureType::Vertex;
    } else if u <= 0.0 {
        if (center - b).dot(center - b) > total_radius * total_radius {
            return Manifold::unset();
        }
        let (dir, _) = crate::math::UnitVec2::new_normalize(center - b);
        local_normal = dir.as_vec2();
        local_point = b;
        feature_type = FeatureType::Vertex;
    } else {
        let e_len_sq = e.dot(e);
        if e_len_sq < f64::EPSILON {
            return Manifold::unset();
        }
        let projected = a * (u / e_len_sq) + b * (v / e_len_sq);
        let normal_dir = center - projected;
        let dist_sq = normal_dir.dot(normal_dir);
        if dist_sq > total_radius * total_radius {
            return Manifold::unset();
        }
        let mut normal = crate::math::UnitVec2::new_normalize(normal_dir).0.as_vec2();
        if crate::math::cross(e, normal) < 0.0 {
            // Keep the normal pointing away from the edge's "solid" side
            // (outward, consistent regardless of which side the disk
            // approaches from).
            normal = -normal;
        }
        local_normal = normal;
        local_point = projected;
        feature_type = FeatureType::Face;
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
            index_a: 0,
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
    fn disk_above_edge_midpoint_touches() {
        let edge = Edge::new(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0));
        let disk = Disk::new(0.5);
        let xf_a = Transformation::IDENTITY;
        let xf_b = Transformation::new(Vec2::new(0.0, 0.3), UnitVec2::UNIT_X);

        let manifold = collide_edge_and_disk(&edge, &xf_a, &disk, &xf_b);
        assert!(manifold.is_touching());
    }

    #[test]
    fn disk_beyond_edge_endpoint_does_not_touch() {
        let edge = Edge::new(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0));
        let disk = Disk::new(0.5);
        let xf_a = Transformation::IDENTITY;
        let xf_b = Transformation::new(Vec2::new(5.0, 0.0), UnitVec2::UNIT_X);

        let manifold = collide_edge_and_disk(&edge, &xf_a, &disk, &xf_b);
        assert!(!manifold.is_touching());
    }
}
