//! Attaches a shape to a body with material and filtering data, and owns
//! the one broad-phase proxy per shape child.

use crate::broadphase::dynamic_tree::ProxyId;
use crate::dynamics::body::BodyId;
use crate::shape::Shape;

/// Collision filtering data, checked before the narrow-phase runs.
///
/// Two fixtures collide iff they share no group, or their group differs
/// from zero with opposite sign and the category/mask bitmasks also
/// intersect — matching the source's layered group-then-bitmask scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Filter {
    /// The categories this fixture belongs to.
    pub category_bits: u16,
    /// The categories this fixture collides with.
    pub mask_bits: u16,
    /// Overrides category/mask when nonzero and matching: positive values
    /// always collide with each other, negative values never do.
    pub group_index: i16,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xFFFF,
            group_index: 0,
        }
    }
}

impl Filter {
    /// Whether two filters allow a collision.
    pub fn should_collide(a: &Filter, b: &Filter) -> bool {
        if a.group_index == b.group_index && a.group_index != 0 {
            return a.group_index > 0;
        }
        (a.mask_bits & b.category_bits) != 0 && (a.category_bits & b.mask_bits) != 0
    }
}

/// Construction parameters for [`crate::dynamics::world::World::create_fixture`].
#[derive(Debug, Clone)]
pub struct FixtureConf {
    /// The shape to attach. Owned by the fixture once created.
    pub shape: Shape,
    /// Mass per unit area/volume, used to derive the body's mass data.
    pub density: f64,
    /// Coulomb friction coefficient, usually in `[0, 1]`.
    pub friction: f64,
    /// Coefficient of restitution, usually in `[0, 1]`.
    pub restitution: f64,
    /// When true, the fixture generates contacts but never a collision
    /// response.
    pub is_sensor: bool,
    /// Collision filtering data.
    pub filter: Filter,
}

impl Default for FixtureConf {
    fn default() -> Self {
        Self {
            shape: Shape::Disk(crate::shape::Disk::new(0.5)),
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            filter: Filter::default(),
        }
    }
}

/// A shape attached to a body, plus the material/filter data contacts
/// read when generating a manifold.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub(crate) body: BodyId,
    pub(crate) shape: Shape,
    pub(crate) density: f64,
    pub(crate) friction: f64,
    pub(crate) restitution: f64,
    pub(crate) is_sensor: bool,
    pub(crate) filter: Filter,
    pub(crate) proxies: Vec<ProxyId>,
}

impl Fixture {
    pub(crate) fn new(body: BodyId, conf: &FixtureConf) -> Self {
        Self {
            body,
            shape: conf.shape.clone(),
            density: conf.density.max(0.0),
            friction: conf.friction,
            restitution: conf.restitution,
            is_sensor: conf.is_sensor,
            filter: conf.filter,
            proxies: Vec::new(),
        }
    }

    /// The body this fixture is attached to.
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// The attached shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mass per unit area/volume.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Coulomb friction coefficient.
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Coefficient of restitution.
    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Whether this fixture is sensor-only (no collision response).
    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    /// Collision filtering data.
    pub fn filter(&self) -> Filter {
        self.filter
    }
}

/// Mixing rule for two fixtures' friction: geometric mean, per the
/// source's default `MixFriction`.
pub(crate) fn mix_friction(a: f64, b: f64) -> f64 {
    (a * b).max(0.0).sqrt()
}

/// Mixing rule for two fixtures' restitution: the larger value wins, per
/// the source's default `MixRestitution`.
pub(crate) fn mix_restitution(a: f64, b: f64) -> f64 {
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_collide() {
        let a = Filter::default();
        let b = Filter::default();
        assert!(Filter::should_collide(&a, &b));
    }

    #[test]
    fn negative_shared_group_never_collides() {
        let a = Filter {
            group_index: -1,
            ..Filter::default()
        };
        let b = Filter {
            group_index: -1,
            ..Filter::default()
        };
        assert!(!Filter::should_collide(&a, &b));
    }

    #[test]
    fn positive_shared_group_always_collides() {
        let a = Filter {
            group_index: 2,
            category_bits: 0,
            mask_bits: 0,
            ..Filter::default()
        };
        let b = Filter {
            group_index: 2,
            category_bits: 0,
            mask_bits: 0,
            ..Filter::default()
        };
        assert!(Filter::should_collide(&a, &b));
    }

    #[test]
    fn friction_mixes_geometrically() {
        assert!((mix_friction(0.0, 1.0) - 0.0).abs() < 1e-9);
        assert!((mix_friction(0.4, 0.4) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn restitution_mixes_as_max() {
        assert_eq!(mix_restitution(0.2, 0.8), 0.8);
    }
}
