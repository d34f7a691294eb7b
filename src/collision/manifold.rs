//! Contact manifolds: the 0–2 point contact patch between two shape
//! children, in one shape's local frame so it survives re-transformation
//! across a step without precision loss.

use arrayvec::ArrayVec;

use crate::math::Vec2;

/// Maximum simultaneous contact points in one manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// Identifies which vertex/face pairing on each shape produced a manifold
/// point, so warm-starting can match points across steps even as the
/// point *count* or *order* changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactFeature {
    /// Index on shape A (a vertex or face index, per `type_a`).
    pub index_a: u8,
    /// Index on shape B.
    pub index_b: u8,
    /// Kind of feature on shape A.
    pub type_a: FeatureType,
    /// Kind of feature on shape B.
    pub type_b: FeatureType,
}

/// Whether a [`ContactFeature`] index names a vertex or a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureType {
    /// A vertex.
    #[default]
    Vertex,
    /// A face (edge).
    Face,
}

/// One point of contact: local position plus its identity and the
/// warm-started impulses carried from the previous step's matching point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManifoldPoint {
    /// Local-space contact point (frame depends on [`ManifoldType`]).
    pub local_point: Vec2,
    /// Accumulated normal impulse, carried across steps for warm-start.
    pub normal_impulse: f64,
    /// Accumulated tangent (friction) impulse, carried across steps.
    pub tangent_impulse: f64,
    /// Identity used to match this point across consecutive steps.
    pub feature: ContactFeature,
}

/// Discriminates what `local_point`/`local_normal` mean in a [`Manifold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifoldType {
    /// No contact.
    #[default]
    Unset,
    /// `local_point` is shape A's center, the single point is shape B's
    /// center; used for disk-disk and polygon-disk (vertex region).
    Circles,
    /// `local_point`/`local_normal` describe a reference face on shape A;
    /// manifold points are incident-shape contact points in A's frame.
    FaceA,
    /// Symmetric to `FaceA` with the reference face on shape B.
    FaceB,
}

/// A 0–2 point contact patch between two shape children, in local
/// coordinates of whichever shape owns the reference feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifold {
    /// What `local_point`/`local_normal` mean.
    pub kind: ManifoldType,
    /// Reference point (a face point or a disk center, per `kind`).
    pub local_point: Vec2,
    /// Reference normal, in the same local frame as `local_point`.
    pub local_normal: Vec2,
    /// The contact points themselves.
    pub points: ArrayVec<ManifoldPoint, MAX_MANIFOLD_POINTS>,
}

impl Manifold {
    /// The empty (non-touching) manifold.
    pub fn unset() -> Self {
        Self::default()
    }

    /// Whether this manifold has at least one point (the contact is
    /// "touching" per the contact lifecycle state machine).
    pub fn is_touching(&self) -> bool {
        !self.points.is_empty()
    }
}

/// World-space rendering of a manifold: one world normal plus one world
/// contact point per manifold point, each with its separation — this is
/// what the velocity/position solver actually consumes.
#[derive(Debug, Clone)]
pub struct WorldManifoldPoint {
    /// World-space contact point (the midpoint of the two shapes' surface
    /// points at this feature).
    pub point: Vec2,
    /// Signed separation at this point (negative is penetrating).
    pub separation: f64,
}

/// World-space normal plus per-point data, computed from a local
/// [`Manifold`] and the two shapes' current world transforms plus their
/// vertex radii.
#[derive(Debug, Clone)]
pub struct WorldManifold {
    /// Contact normal, pointing from shape A toward shape B.
    pub normal: Vec2,
    /// Per-point world data, same order/length as the source manifold.
    pub points: ArrayVec<WorldManifoldPoint, MAX_MANIFOLD_POINTS>,
}

impl WorldManifold {
    /// Derive world-space normal/points/separations from a local manifold.
    pub fn new(
        manifold: &Manifold,
        xf_a: &crate::math::Transformation,
        radius_a: f64,
        xf_b: &crate::math::Transformation,
        radius_b: f64,
    ) -> Self {
        let mut points = ArrayVec::new();

        if manifold.points.is_empty() {
            return Self {
                normal: Vec2::new(1.0, 0.0),
                points,
            };
        }

        let normal = match manifold.kind {
            ManifoldType::Unset => Vec2::new(1.0, 0.0),
            ManifoldType::Circles => {
                let point_a = xf_a.transform(manifold.local_point);
                let point_b = xf_b.transform(manifold.points[0].local_point);
                let (dir, len) = crate::math::UnitVec2::new_normalize(point_b - point_a);
                if len < f64::EPSILON {
                    Vec2::new(1.0, 0.0)
                } else {
                    dir.as_vec2()
                }
            }
            ManifoldType::FaceA => xf_a.transform_direction(manifold.local_normal),
            ManifoldType::FaceB => xf_b.transform_direction(manifold.local_normal),
        };

        for p in &manifold.points {
            let (point, separation) = match manifold.kind {
                ManifoldType::Circles => {
                    let point_a = xf_a.transform(manifold.local_point);
                    let point_b = xf_b.transform(p.local_point);
                    let clip_a = point_a + normal * radius_a;
                    let clip_b = point_b - normal * radius_b;
                    (
                        (clip_a + clip_b) * 0.5,
                        (point_b - point_a).dot(normal) - radius_a - radius_b,
                    )
                }
                ManifoldType::FaceA => {
                    let plane_point = xf_a.transform(manifold.local_point);
                    let clip_point = xf_b.transform(p.local_point);
                    let separation = (clip_point - plane_point).dot(normal) - radius_a - radius_b;
                    (clip_point - normal * (0.5 * (radius_b - radius_a) + 0.5 * separation), separation)
                }
                ManifoldType::FaceB => {
                    let plane_point = xf_b.transform(manifold.local_point);
                    let clip_point = xf_a.transform(p.local_point);
                    let separation = (clip_point - plane_point).dot(normal) - radius_a - radius_b;
                    (clip_point - normal * (0.5 * (radius_a - radius_b) + 0.5 * separation), separation)
                }
                ManifoldType::Unset => (Vec2::zero(), 0.0),
            };
            let _ = points.try_push(WorldManifoldPoint { point, separation });
        }

        Self { normal, points }
    }
}
