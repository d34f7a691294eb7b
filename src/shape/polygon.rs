//! Convex polygon shape.

use smallvec::SmallVec;

use crate::collision::aabb::Aabb;
use crate::constants::POLYGON_RADIUS;
use crate::error::PhysicsError;
use crate::math::{Transformation, Vec2};
use crate::shape::massdata::MassData;
use crate::shape::proxy::{DistanceProxy, MAX_PROXY_VERTICES};

/// A convex polygon: 3..N ordered CCW vertices with matching outward
/// normals and a precomputed centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    /// Ordered, counter-clockwise vertices in local space.
    pub vertices: SmallVec<[Vec2; MAX_PROXY_VERTICES]>,
    /// Outward unit normal of the edge from `vertices[i]` to
    /// `vertices[i + 1]`.
    pub normals: SmallVec<[Vec2; MAX_PROXY_VERTICES]>,
    /// Centroid (area-weighted, not vertex-averaged).
    pub centroid: Vec2,
    /// Vertex "skin" radius.
    pub vertex_radius: f64,
}

impl ConvexPolygon {
    /// Build a convex polygon from an arbitrary point cloud by taking its
    /// convex hull (Andrew's monotone chain / gift-wrapping over a sorted
    /// point set).
    ///
    /// Fails with [`PhysicsError::DegeneratePolygon`] if fewer than 3
    /// distinct, non-collinear vertices survive hulling.
    pub fn from_points(points: &[Vec2]) -> Result<Self, PhysicsError> {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            return Err(PhysicsError::DegeneratePolygon(hull.len()));
        }
        Ok(Self::from_hull(hull, POLYGON_RADIUS))
    }

    /// Build an axis-aligned box polygon, half-extents `(hx, hy)`, centered
    /// on `center`.
    pub fn box_shape(hx: f64, hy: f64, center: Vec2) -> Self {
        let raw = vec![
            center + Vec2::new(-hx, -hy),
            center + Vec2::new(hx, -hy),
            center + Vec2::new(hx, hy),
            center + Vec2::new(-hx, hy),
        ];
        Self::from_hull(raw, POLYGON_RADIUS)
    }

    /// Construct directly from an already-convex, already-CCW hull.
    fn from_hull(hull: Vec<Vec2>, vertex_radius: f64) -> Self {
        let n = hull.len();
        let mut normals = SmallVec::with_capacity(n);
        for i in 0..n {
            let edge = hull[(i + 1) % n] - hull[i];
            let (normal, _) = crate::math::vec2::UnitVec2::new_normalize(Vec2::new(edge.y, -edge.x));
            normals.push(normal.as_vec2());
        }
        let centroid = polygon_centroid(&hull);
        let mut vertices = SmallVec::with_capacity(n);
        vertices.extend(hull);

        Self {
            vertices,
            normals,
            centroid,
            vertex_radius,
        }
    }

    /// Number of edges/vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Always one child (the polygon itself is already convex).
    pub fn child_count(&self) -> usize {
        1
    }

    /// Distance proxy for this polygon.
    pub fn proxy(&self) -> DistanceProxy {
        DistanceProxy::for_polygon(self.vertices.clone(), self.normals.clone(), self.vertex_radius)
    }

    /// World-space AABB.
    pub fn compute_aabb(&self, xf: &Transformation) -> Aabb {
        let mut lower = xf.transform(self.vertices[0]);
        let mut upper = lower;
        for &v in self.vertices.iter().skip(1) {
            let p = xf.transform(v);
            lower = Vec2::new(lower.x.min(p.x), lower.y.min(p.y));
            upper = Vec2::new(upper.x.max(p.x), upper.y.max(p.y));
        }
        let skin = Vec2::new(self.vertex_radius, self.vertex_radius);
        Aabb::new(lower - skin, upper + skin)
    }

    /// Mass properties at the given density, via the standard polygon
    /// triangle-fan decomposition.
    pub fn compute_mass(&self, density: f64) -> MassData {
        debug_assert!(self.vertices.len() >= 3);

        // Triangle fan from the first vertex; accumulate area, centroid and
        // rotational inertia per triangle (the textbook approach, used
        // throughout the reference pack's polygon mass routines).
        let reference = self.vertices[0];
        let mut area = 0.0;
        let mut center = Vec2::zero();
        let mut rot_inertia = 0.0;

        let k_inv3 = 1.0 / 3.0;

        for i in 1..self.vertices.len() - 1 {
            let e1 = self.vertices[i] - reference;
            let e2 = self.vertices[i + 1] - reference;

            let d = crate::math::cross(e1, e2);
            let triangle_area = 0.5 * d;
            area += triangle_area;

            center += (e1 + e2) * triangle_area * k_inv3;

            let intx2 = e1.x * e1.x + e1.x * e2.x + e2.x * e2.x;
            let inty2 = e1.y * e1.y + e1.y * e2.y + e2.y * e2.y;
            rot_inertia += (0.25 * k_inv3 * d) * (intx2 + inty2);
        }

        let mass = density * area;
        let center = if area > f64::EPSILON {
            center / area
        } else {
            Vec2::zero()
        };
        let centroid_world = center + reference;

        // `rot_inertia` so far is about the triangle-fan reference vertex;
        // shift it to the polygon's local origin via the parallel axis
        // theorem (subtracting out the offset to the local centroid, then
        // adding back the offset from the origin to that centroid).
        let mut rot_inertia = density * rot_inertia;
        rot_inertia += mass * (centroid_world.dot(centroid_world) - center.dot(center));

        MassData {
            mass,
            center: centroid_world,
            rot_inertia,
        }
    }
}

/// Area-weighted centroid of a simple (non-self-intersecting) polygon.
fn polygon_centroid(vertices: &[Vec2]) -> Vec2 {
    let reference = vertices[0];
    let mut area = 0.0;
    let mut center = Vec2::zero();

    for i in 1..vertices.len() - 1 {
        let e1 = vertices[i] - reference;
        let e2 = vertices[i + 1] - reference;
        let d = crate::math::cross(e1, e2);
        let triangle_area = 0.5 * d;
        area += triangle_area;
        center += (e1 + e2) * (triangle_area / 3.0);
    }

    if area.abs() < f64::EPSILON {
        reference
    } else {
        center / area + reference
    }
}

/// Convex hull of a point set via Andrew's monotone chain, deduplicating
/// near-coincident points and returned in CCW order.
fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup_by(|a, b| (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);

    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: Vec2, a: Vec2, b: Vec2| crate::math::cross(a - o, b - o);

    let mut lower: Vec<Vec2> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2
            && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Vec2> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2
            && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_shape_has_four_vertices() {
        let poly = ConvexPolygon::box_shape(1.0, 1.0, Vec2::zero());
        assert_eq!(poly.vertex_count(), 4);
    }

    #[test]
    fn unit_box_mass_and_inertia() {
        let poly = ConvexPolygon::box_shape(0.5, 0.5, Vec2::zero());
        let mass_data = poly.compute_mass(1.0);
        assert!((mass_data.mass - 1.0).abs() < 1e-9);
        // I = m * (w^2 + h^2) / 12 for a 1x1 box about its centroid; the
        // centroid is the local origin here so no parallel-axis shift.
        let expected = 1.0 * (1.0 + 1.0) / 12.0;
        assert!((mass_data.rot_inertia - expected).abs() < 1e-6);
    }

    #[test]
    fn degenerate_point_cloud_is_rejected() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert!(matches!(
            ConvexPolygon::from_points(&pts),
            Err(PhysicsError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn hull_of_redundant_interior_points_is_still_a_box() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 1.0), // interior point, dropped by hulling
        ];
        let poly = ConvexPolygon::from_points(&pts).unwrap();
        assert_eq!(poly.vertex_count(), 4);
    }
}
