//! A bridge of hinged segments settling under gravity (spec.md §8
//! scenario 6). No revolute joint is implemented, so each hinge is a
//! near-rigid `DistanceJoint` pinning coincident anchor points between
//! neighboring segments -- a stand-in, not a true two-degree-of-freedom
//! hinge, so the assertions below check monotonic settling rather than
//! an exact catenary sag.

use rigid2d::dynamics::fixture::FixtureConf;
use rigid2d::dynamics::joint::DistanceJoint;
use rigid2d::math::Vec2;
use rigid2d::shape::{ConvexPolygon, Shape};
use rigid2d::{BodyConf, BodyType, StepConf, World, WorldConf};

const SEGMENT_COUNT: usize = 30;
const HALF_WIDTH: f64 = 0.5;
const HALF_HEIGHT: f64 = 0.125;

#[test]
fn bridge_of_hinged_segments_sags_and_settles() {
    let mut world = World::new(WorldConf {
        gravity: Vec2::new(0.0, -10.0),
        ..WorldConf::default()
    });

    let left_anchor = world
        .create_body(&BodyConf {
            body_type: BodyType::Static,
            position: Vec2::new(-(SEGMENT_COUNT as f64) * HALF_WIDTH, 10.0),
            ..BodyConf::default()
        })
        .unwrap();
    let right_anchor = world
        .create_body(&BodyConf {
            body_type: BodyType::Static,
            position: Vec2::new((SEGMENT_COUNT as f64) * HALF_WIDTH, 10.0),
            ..BodyConf::default()
        })
        .unwrap();

    let mut segments = Vec::with_capacity(SEGMENT_COUNT);
    for i in 0..SEGMENT_COUNT {
        let x = -(SEGMENT_COUNT as f64) * HALF_WIDTH + (2 * i + 1) as f64 * HALF_WIDTH;
        let body = world
            .create_body(&BodyConf {
                body_type: BodyType::Dynamic,
                position: Vec2::new(x, 10.0),
                ..BodyConf::default()
            })
            .unwrap();
        world
            .create_fixture(
                body,
                &FixtureConf {
                    shape: Shape::Polygon(ConvexPolygon::box_shape(HALF_WIDTH, HALF_HEIGHT, Vec2::zero())),
                    density: 1.0,
                    friction: 0.2,
                    ..FixtureConf::default()
                },
            )
            .unwrap();
        segments.push(body);
    }

    world
        .create_joint(Box::new(DistanceJoint::new(left_anchor, segments[0], Vec2::zero(), Vec2::new(-HALF_WIDTH, 0.0), 0.0)))
        .unwrap();
    for i in 0..SEGMENT_COUNT - 1 {
        world
            .create_joint(Box::new(DistanceJoint::new(
                segments[i],
                segments[i + 1],
                Vec2::new(HALF_WIDTH, 0.0),
                Vec2::new(-HALF_WIDTH, 0.0),
                0.0,
            )))
            .unwrap();
    }
    world
        .create_joint(Box::new(DistanceJoint::new(
            segments[SEGMENT_COUNT - 1],
            right_anchor,
            Vec2::new(HALF_WIDTH, 0.0),
            Vec2::zero(),
            0.0,
        )))
        .unwrap();

    let conf = StepConf {
        dt: 1.0 / 60.0,
        velocity_iterations: 8,
        position_iterations: 3,
        ..StepConf::default()
    };

    let middle = segments[SEGMENT_COUNT / 2];
    let mut min_y = world.body(middle).unwrap().transform().position.y;
    for _ in 0..120 {
        world.step(&conf);
        let y = world.body(middle).unwrap().transform().position.y;
        min_y = min_y.min(y);
    }

    let final_y = world.body(middle).unwrap().transform().position.y;
    assert!(final_y < 10.0, "middle segment should sag below its rest height, got {final_y}");
    assert!((final_y - min_y).abs() < 2.0, "middle segment should have stabilized rather than still falling, min={min_y} final={final_y}");

    let left_pin = world.body(left_anchor).unwrap().transform().position;
    let left_seg_edge = world.body(segments[0]).unwrap().transform().position - Vec2::new(HALF_WIDTH, 0.0);
    assert!((left_pin - left_seg_edge).magnitude() < 0.5, "left hinge should stay near its anchor");

    let right_pin = world.body(right_anchor).unwrap().transform().position;
    let right_seg_edge = world.body(segments[SEGMENT_COUNT - 1]).unwrap().transform().position + Vec2::new(HALF_WIDTH, 0.0);
    assert!((right_pin - right_seg_edge).magnitude() < 0.5, "right hinge should stay near its anchor");

    for &id in &segments {
        let v = world.body(id).unwrap().linear_velocity().magnitude();
        assert!(v < 5.0, "segment velocity should have decayed toward rest, got {v}");
    }
}
