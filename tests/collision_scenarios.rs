//! Scenario-level tests against the collision primitives directly:
//! ray-casting, manifold generation, and time-of-impact.

use rigid2d::collision::aabb::{Aabb, RayCastInput};
use rigid2d::collision::manifold::ManifoldType;
use rigid2d::collision::narrowphase::{collide_disks, collide_polygons};
use rigid2d::collision::toi::{time_of_impact, TimeOfImpactInput, TimeOfImpactState};
use rigid2d::math::{Sweep, Transformation, Vec2};
use rigid2d::shape::{ConvexPolygon, Disk};

#[test]
fn aabb_ray_cast_hits_face_with_expected_normal_and_fraction() {
    let aabb = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
    let input = RayCastInput {
        p1: Vec2::new(-1.0, 1.0),
        p2: Vec2::new(3.0, 1.0),
        max_fraction: 1.0,
    };
    let hit = aabb.ray_cast(&input).expect("ray should hit the box");
    assert!((hit.fraction - 0.25).abs() < 1e-9);
    assert!((hit.normal.x + 1.0).abs() < 1e-9);
    assert!(hit.normal.y.abs() < 1e-9);
}

#[test]
fn overlapping_disks_produce_one_point_circles_manifold() {
    let a = Disk::with_center(Vec2::zero(), 1.0);
    let b = Disk::with_center(Vec2::zero(), 1.0);
    let xf_a = Transformation::new(Vec2::new(3.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);
    let xf_b = Transformation::new(Vec2::new(3.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);

    let manifold = collide_disks(&a, &xf_a, &b, &xf_b);
    assert_eq!(manifold.kind, ManifoldType::Circles);
    assert_eq!(manifold.points.len(), 1);

    let world = rigid2d::collision::manifold::WorldManifold::new(&manifold, &xf_a, a.radius, &xf_b, b.radius);
    assert!((world.points[0].separation + 2.0).abs() < 1e-9);
}

#[test]
fn overlapping_squares_produce_two_point_face_manifold_along_x() {
    let a = ConvexPolygon::box_shape(0.5, 0.5, Vec2::zero());
    let b = ConvexPolygon::box_shape(0.5, 0.5, Vec2::zero());
    let xf_a = Transformation::new(Vec2::new(0.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);
    let xf_b = Transformation::new(Vec2::new(0.5, 0.0), rigid2d::math::UnitVec2::UNIT_X);

    let manifold = collide_polygons(&a, &xf_a, &b, &xf_b);
    assert!(matches!(manifold.kind, ManifoldType::FaceA | ManifoldType::FaceB));
    assert_eq!(manifold.points.len(), 2);

    let normal = match manifold.kind {
        ManifoldType::FaceA => xf_a.transform_direction(manifold.local_normal),
        ManifoldType::FaceB => xf_b.transform_direction(manifold.local_normal),
        _ => unreachable!(),
    };
    assert!(normal.x.abs() > 0.99, "normal should point along x, got {normal:?}");
}

#[test]
fn approaching_disks_report_touching_near_two_thirds() {
    let proxy_a = Disk::with_center(Vec2::zero(), 1.0).proxy();
    let proxy_b = Disk::with_center(Vec2::zero(), 1.0).proxy();

    let xf_a0 = Transformation::new(Vec2::new(-3.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);
    let xf_a1 = Transformation::new(Vec2::new(0.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);
    let xf_b0 = Transformation::new(Vec2::new(3.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);
    let xf_b1 = Transformation::new(Vec2::new(0.0, 0.0), rigid2d::math::UnitVec2::UNIT_X);

    let mut sweep_a = Sweep::at_rest(xf_a0, Vec2::zero());
    sweep_a.center1 = xf_a1.position;
    let mut sweep_b = Sweep::at_rest(xf_b0, Vec2::zero());
    sweep_b.center1 = xf_b1.position;

    let input = TimeOfImpactInput {
        proxy_a: &proxy_a,
        proxy_b: &proxy_b,
        sweep_a,
        sweep_b,
        t_max: 1.0,
    };
    let output = time_of_impact(&input, 2.0);

    assert_eq!(output.state, TimeOfImpactState::Touching);
    assert!((output.t - 2.0 / 3.0).abs() < 0.01, "expected t ~ 2/3, got {}", output.t);
}
