//! End-to-end scenarios exercising `World::step` against whole-pipeline
//! behavior: a resting stack, ray-casting, and a bridge of joints.

use rigid2d::dynamics::fixture::FixtureConf;
use rigid2d::shape::{ConvexPolygon, Shape};
use rigid2d::{BodyConf, BodyType, StepConf, World, WorldConf};

fn world_with_gravity() -> World {
    World::new(WorldConf {
        gravity: rigid2d::math::Vec2::new(0.0, -10.0),
        ..WorldConf::default()
    })
}

#[test]
fn falling_box_comes_to_rest_on_the_ground() {
    let mut world = world_with_gravity();

    let ground = world
        .create_body(&BodyConf {
            body_type: BodyType::Static,
            position: rigid2d::math::Vec2::new(0.0, -10.0),
            ..BodyConf::default()
        })
        .unwrap();
    world
        .create_fixture(
            ground,
            &FixtureConf {
                shape: Shape::Polygon(ConvexPolygon::box_shape(50.0, 10.0, rigid2d::math::Vec2::zero())),
                ..FixtureConf::default()
            },
        )
        .unwrap();

    let box_body = world
        .create_body(&BodyConf {
            body_type: BodyType::Dynamic,
            position: rigid2d::math::Vec2::new(0.0, 4.0),
            ..BodyConf::default()
        })
        .unwrap();
    world
        .create_fixture(
            box_body,
            &FixtureConf {
                shape: Shape::Polygon(ConvexPolygon::box_shape(0.5, 0.5, rigid2d::math::Vec2::zero())),
                density: 1.0,
                friction: 0.3,
                ..FixtureConf::default()
            },
        )
        .unwrap();

    let conf = StepConf {
        dt: 1.0 / 60.0,
        velocity_iterations: 6,
        position_iterations: 2,
        ..StepConf::default()
    };

    let mut last_y = world.body(box_body).unwrap().transform().position.y;
    for _ in 0..60 {
        world.step(&conf);
        let y = world.body(box_body).unwrap().transform().position.y;
        assert!(y <= last_y + 1e-9, "box should only ever settle downward");
        last_y = y;
    }

    let final_y = world.body(box_body).unwrap().transform().position.y;
    assert!((final_y - 1.0).abs() < 0.05, "box should rest on top of the ground near y=1, got {final_y}");

    let velocity = world.body(box_body).unwrap().linear_velocity();
    assert!(velocity.magnitude() < 0.1, "box should have nearly stopped, got |v|={}", velocity.magnitude());
}

#[test]
fn sensor_fixture_reports_touching_without_impulses() {
    let mut world = world_with_gravity();

    let ground = world.create_body(&BodyConf { body_type: BodyType::Static, ..BodyConf::default() }).unwrap();
    world
        .create_fixture(
            ground,
            &FixtureConf {
                shape: Shape::Polygon(ConvexPolygon::box_shape(10.0, 1.0, rigid2d::math::Vec2::zero())),
                is_sensor: true,
                ..FixtureConf::default()
            },
        )
        .unwrap();

    let falling = world
        .create_body(&BodyConf {
            body_type: BodyType::Dynamic,
            position: rigid2d::math::Vec2::new(0.0, 0.5),
            ..BodyConf::default()
        })
        .unwrap();
    world
        .create_fixture(
            falling,
            &FixtureConf {
                shape: Shape::Disk(rigid2d::shape::Disk::new(0.5)),
                density: 1.0,
                ..FixtureConf::default()
            },
        )
        .unwrap();

    let conf = StepConf::default();
    let mut stats = world.step(&conf);
    for _ in 0..10 {
        stats = world.step(&conf);
    }

    assert!(stats.touching_count >= 1, "sensor overlap should register as touching");
    // A sensor never stops the body: it should have fallen straight through.
    assert!(world.body(falling).unwrap().transform().position.y < 0.0);
}

#[test]
fn static_body_never_moves() {
    let mut world = world_with_gravity();
    let ground = world
        .create_body(&BodyConf {
            body_type: BodyType::Static,
            position: rigid2d::math::Vec2::new(1.0, 2.0),
            angle: 0.3,
            ..BodyConf::default()
        })
        .unwrap();
    world
        .create_fixture(
            ground,
            &FixtureConf {
                shape: Shape::Polygon(ConvexPolygon::box_shape(5.0, 1.0, rigid2d::math::Vec2::zero())),
                ..FixtureConf::default()
            },
        )
        .unwrap();

    let before = world.body(ground).unwrap().transform();
    let conf = StepConf::default();
    for _ in 0..30 {
        world.step(&conf);
    }
    let after = world.body(ground).unwrap().transform();
    assert_eq!(before, after);
}

#[test]
fn create_and_destroy_body_leaves_counts_unchanged() {
    let mut world = World::new(WorldConf::default());
    let before = world.body_ids().len();
    let id = world.create_body(&BodyConf::default()).unwrap();
    world.destroy_body(id).unwrap();
    assert_eq!(world.body_ids().len(), before);
}
