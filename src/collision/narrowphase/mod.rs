//! Per-shape-kind-pair manifold generators.
//!
//! Each function takes the two shape children already resolved to a
//! concrete geometry (a disk center+radius, a polygon's vertex/normal
//! list, an edge's two endpoints + optional ghost neighbors) plus the two
//! shapes' world transforms, and returns a [`Manifold`] in shape A's (or
//! B's, per `ManifoldType`) local frame. Chain children are resolved to
//! their synthetic edge by the caller before reaching here (§4.5).

mod edge_disk;
mod edge_polygon;
mod polygon_disk;
mod polygon_polygon;

pub use edge_disk::collide_edge_and_disk;
pub use edge_polygon::collide_edge_and_polygon;
pub use polygon_disk::collide_polygon_and_disk;
pub use polygon_polygon::collide_polygons;

use crate::collision::manifold::{ContactFeature, FeatureType, Manifold, ManifoldPoint, ManifoldType};
use crate::math::{Transformation, Vec2};
use crate::shape::{Disk, Shape};

/// Disk-disk: the simplest generator, a single point at the midpoint of
/// the two surface points if the centers are closer than the sum of
/// radii.
pub fn collide_disks(disk_a: &Disk, xf_a: &Transformation, disk_b: &Disk, xf_b: &Transformation) -> Manifold {
    let point_a = xf_a.transform(disk_a.center);
    let point_b = xf_b.transform(disk_b.center);
    let d = point_b - point_a;
    let dist_sq = crate::math::length_squared(d);
    let total_radius = disk_a.radius + disk_b.radius;

    if dist_sq > total_radius * total_radius {
        return Manifold::unset();
    }

    let mut manifold = Manifold {
        kind: ManifoldType::Circles,
        local_point: disk_a.center,
        local_normal: Vec2::zero(),
        points: Default::default(),
    };
    let _ = manifold.points.try_push(ManifoldPoint {
        local_point: disk_b.center,
        normal_impulse: 0.0,
        tangent_impulse: 0.0,
        feature: ContactFeature {
            index_a: 0,
            index_b: 0,
            type_a: FeatureType::Vertex,
            type_b: FeatureType::Vertex,
        },
    });
    manifold
}

/// Dispatch to the generator for `(kind_a, kind_b)`, resolving each shape
/// to its `child_index`'d child first (chains collapse to their synthetic
/// edge, per [`Shape::kind`]).
pub fn collide(
    shape_a: &Shape,
    child_a: usize,
    xf_a: &Transformation,
    shape_b: &Shape,
    child_b: usize,
    xf_b: &Transformation,
) -> Manifold {
    use crate::shape::ShapeKind::*;

    match (shape_a.kind(), shape_b.kind()) {
        (Disk, Disk) => {
            collide_disks(resolved_disk(shape_a), xf_a, resolved_disk(shape_b), xf_b)
        }
        (Polygon, Disk) => {
            let poly = resolved_polygon(shape_a, child_a);
            collide_polygon_and_disk(&poly, xf_a, resolved_disk(shape_b), xf_b)
        }
        (Disk, Polygon) => {
            let poly = resolved_polygon(shape_b, child_b);
            let mut m = collide_polygon_and_disk(&poly, xf_b, resolved_disk(shape_a), xf_a);
            flip(&mut m);
            m
        }
        (Polygon, Polygon) => {
            let poly_a = resolved_polygon(shape_a, child_a);
            let poly_b = resolved_polygon(shape_b, child_b);
            collide_polygons(&poly_a, xf_a, &poly_b, xf_b)
        }
        (Edge, Disk) => {
            let edge = resolved_edge(shape_a, child_a);
            collide_edge_and_disk(&edge, xf_a, resolved_disk(shape_b), xf_b)
        }
        (Disk, Edge) => {
            let edge = resolved_edge(shape_b, child_b);
            let mut m = collide_edge_and_disk(&edge, xf_b, resolved_disk(shape_a), xf_a);
            flip(&mut m);
            m
        }
        (Edge, Polygon) => {
            let edge = resolved_edge(shape_a, child_a);
            let poly = resolved_polygon(shape_b, child_b);
            collide_edge_and_polygon(&edge, xf_a, &poly, xf_b)
        }
        (Polygon, Edge) => {
            let edge = resolved_edge(shape_b, child_b);
            let poly = resolved_polygon(shape_a, child_a);
            let mut m = collide_edge_and_polygon(&edge, xf_b, &poly, xf_a);
            flip(&mut m);
            m
        }
    }
}

fn resolved_disk(shape: &Shape) -> &Disk {
    match shape {
        Shape::Disk(d) => d,
        _ => unreachable!("resolved_disk called on a non-disk shape"),
    }
}

fn resolved_polygon(shape: &Shape, child: usize) -> crate::shape::ConvexPolygon {
    match shape {
        crate::shape::Shape::Polygon(p) => p.clone(),
        crate::shape::Shape::Multi(m) => m.children[child].clone(),
        _ => unreachable!("resolved_polygon called on a non-polygon shape"),
    }
}

fn resolved_edge(shape: &Shape, child: usize) -> crate::shape::Edge {
    match shape {
        crate::shape::Shape::Edge(e) => *e,
        crate::shape::Shape::Chain(c) => c.child_edge(child),
        _ => unreachable!("resolved_edge called on a non-edge shape"),
    }
}

/// Swap a manifold generated as "A vs B" into "B vs A": flip the
/// reference-face type and every feature's (A, B) roles.
fn flip(manifold: &mut Manifold) {
    manifold.kind = match manifold.kind {
        ManifoldType::FaceA => ManifoldType::FaceB,
        ManifoldType::FaceB => ManifoldType::FaceA,
        other => other,
    };
    for p in &mut manifold.points {
        std::mem::swap(&mut p.feature.index_a, &mut p.feature.index_b);
        std::mem::swap(&mut p.feature.type_a, &mut p.feature.type_b);
    }
}
