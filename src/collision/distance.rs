//! The Gilbert–Johnson–Keerthi (GJK) closest-point algorithm on the
//! Minkowski difference of two [`DistanceProxy`]s, with a warm-startable
//! simplex cache.

use arrayvec::ArrayVec;

use crate::constants::MAX_DISTANCE_ITERS;
use crate::math::{Transformation, Vec2};
use crate::shape::DistanceProxy;

/// One vertex of the working simplex: a support-pair `(indexA, indexB)`
/// plus its witness points and the Minkowski-difference point they yield.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SimplexVertex {
    index_a: usize,
    index_b: usize,
    w_a: Vec2,
    w_b: Vec2,
    w: Vec2,
    /// Barycentric weight assigned during the last `solve`.
    a: f64,
}

/// The simplex under construction: 1 to 3 vertices of the Minkowski
/// difference, closest-point solved each iteration.
#[derive(Debug, Clone)]
struct Simplex {
    vertices: ArrayVec<SimplexVertex, 3>,
}

impl Simplex {
    fn from_cache(
        cache: &SimplexCache,
        proxy_a: &DistanceProxy,
        xf_a: &Transformation,
        proxy_b: &DistanceProxy,
        xf_b: &Transformation,
    ) -> Self {
        let mut vertices = ArrayVec::new();
        if !cache.index_pairs.is_empty() {
            for &(ia, ib) in &cache.index_pairs {
                vertices.push(make_vertex(ia, ib, proxy_a, xf_a, proxy_b, xf_b));
            }
        } else {
            vertices.push(make_vertex(0, 0, proxy_a, xf_a, proxy_b, xf_b));
        }
        Self { vertices }
    }

    fn search_direction(&self) -> Vec2 {
        match self.vertices.len() {
            1 => -self.vertices[0].w,
            2 => {
                let e = self.vertices[1].w - self.vertices[0].w;
                let sgn = crate::math::cross(e, -self.vertices[0].w);
                if sgn > 0.0 {
                    Vec2::new(-e.y, e.x)
                } else {
                    Vec2::new(e.y, -e.x)
                }
            }
            _ => Vec2::zero(),
        }
    }

    fn witness_points(&self) -> (Vec2, Vec2) {
        match self.vertices.len() {
            1 => (self.vertices[0].w_a, self.vertices[0].w_b),
            2 => {
                let v0 = &self.vertices[0];
                let v1 = &self.vertices[1];
                (
                    v0.w_a * v0.a + v1.w_a * v1.a,
                    v0.w_b * v0.a + v1.w_b * v1.a,
                )
            }
            3 => {
                let v0 = &self.vertices[0];
                let v1 = &self.vertices[1];
                let v2 = &self.vertices[2];
                let p = v0.w_a * v0.a + v1.w_a * v1.a + v2.w_a * v2.a;
                (p, p)
            }
            _ => unreachable!(),
        }
    }

    /// Reduce the simplex to its subset closest to the origin, assigning
    /// barycentric weights in the process. This is the heart of GJK: a
    /// duplicated index pair after this reduction means we've cycled.
    fn solve(&mut self) {
        match self.vertices.len() {
            1 => {
                self.vertices[0].a = 1.0;
            }
            2 => self.solve2(),
            3 => self.solve3(),
            _ => unreachable!(),
        }
    }

    fn solve2(&mut self) {
        let w1 = self.vertices[0].w;
        let w2 = self.vertices[1].w;
        let e12 = w2 - w1;

        let d12_2 = -w1.dot(e12);
        if d12_2 <= 0.0 {
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
            return;
        }

        let d12_1 = w2.dot(e12);
        if d12_1 <= 0.0 {
            self.vertices[1].a = 1.0;
            self.vertices[0] = self.vertices[1];
            self.vertices.truncate(1);
            return;
        }

        let inv_d12 = 1.0 / (d12_1 + d12_2);
        self.vertices[0].a = d12_1 * inv_d12;
        self.vertices[1].a = d12_2 * inv_d12;
    }

    fn solve3(&mut self) {
        let w1 = self.vertices[0].w;
        let w2 = self.vertices[1].w;
        let w3 = self.vertices[2].w;

        let e12 = w2 - w1;
        let w1e12 = w1.dot(e12);
        let w2e12 = w2.dot(e12);
        let d12_1 = w2e12;
        let d12_2 = -w1e12;

        let e13 = w3 - w1;
        let w1e13 = w1.dot(e13);
        let w3e13 = w3.dot(e13);
        let d13_1 = w3e13;
        let d13_2 = -w1e13;

        let e23 = w3 - w2;
        let w2e23 = w2.dot(e23);
        let w3e23 = w3.dot(e23);
        let d23_1 = w3e23;
        let d23_2 = -w2e23;

        let n123 = crate::math::cross(e12, e13);

        let d123_1 = n123 * crate::math::cross(w2, w3);
        let d123_2 = n123 * crate::math::cross(w3, w1);
        let d123_3 = n123 * crate::math::cross(w1, w2);

        if d12_2 <= 0.0 && d13_2 <= 0.0 {
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
        } else if d12_1 > 0.0 && d12_2 > 0.0 && d123_3 <= 0.0 {
            let inv = 1.0 / (d12_1 + d12_2);
            self.vertices[0].a = d12_1 * inv;
            self.vertices[1].a = d12_2 * inv;
            self.vertices.truncate(2);
        } else if d13_1 > 0.0 && d13_2 > 0.0 && d123_2 <= 0.0 {
            let inv = 1.0 / (d13_1 + d13_2);
            self.vertices[0].a = d13_1 * inv;
            self.vertices[2].a = d13_2 * inv;
            let v2 = self.vertices[2];
            self.vertices[1] = v2;
            self.vertices.truncate(2);
        } else if d12_1 <= 0.0 && d23_2 <= 0.0 {
            self.vertices[1].a = 1.0;
            let v1 = self.vertices[1];
            self.vertices[0] = v1;
            self.vertices.truncate(1);
        } else if d13_1 <= 0.0 && d23_1 <= 0.0 {
            self.vertices[2].a = 1.0;
            let v2 = self.vertices[2];
            self.vertices[0] = v2;
            self.vertices.truncate(1);
        } else if d23_1 > 0.0 && d23_2 > 0.0 && d123_1 <= 0.0 {
            let inv = 1.0 / (d23_1 + d23_2);
            self.vertices[1].a = d23_1 * inv;
            self.vertices[2].a = d23_2 * inv;
            let (v1, v2) = (self.vertices[1], self.vertices[2]);
            self.vertices[0] = v1;
            self.vertices[1] = v2;
            self.vertices.truncate(2);
        } else {
            let inv = 1.0 / (d123_1 + d123_2 + d123_3);
            self.vertices[0].a = d123_1 * inv;
            self.vertices[1].a = d123_2 * inv;
            self.vertices[2].a = d123_3 * inv;
        }
    }
}

fn make_vertex(
    index_a: usize,
    index_b: usize,
    proxy_a: &DistanceProxy,
    xf_a: &Transformation,
    proxy_b: &DistanceProxy,
    xf_b: &Transformation,
) -> SimplexVertex {
    let w_a = xf_a.transform(proxy_a.vertex(index_a));
    let w_b = xf_b.transform(proxy_b.vertex(index_b));
    SimplexVertex {
        index_a,
        index_b,
        w_a,
        w_b,
        w: w_b - w_a,
        a: 0.0,
    }
}

/// Warm-startable state carried between successive `distance` calls on
/// the same fixture pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimplexCache {
    /// Cached simplex "size" metric (length for 2 points, area for 3),
    /// compared against the freshly recomputed metric to decide whether
    /// the cached index pairs are still trustworthy.
    pub metric: f64,
    /// The `(indexA, indexB)` support pairs of the cached simplex.
    pub index_pairs: ArrayVec<(usize, usize), 3>,
}

/// Input to [`distance`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceInput<'a> {
    /// Shape A's distance proxy.
    pub proxy_a: &'a DistanceProxy,
    /// Shape B's distance proxy.
    pub proxy_b: &'a DistanceProxy,
    /// Shape A's world transform.
    pub transform_a: Transformation,
    /// Shape B's world transform.
    pub transform_b: Transformation,
    /// Whether to subtract each proxy's vertex radius from the reported
    /// distance (used by TOI, which wants a skin-to-skin separation).
    pub use_radii: bool,
}

/// Why GJK stopped iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceTermination {
    /// Distance to origin converged within tolerance.
    Converged,
    /// A support point repeated an already-present index pair (cycle).
    DuplicatePoint,
    /// The iteration ceiling was hit.
    MaxIterations,
}

/// Output of [`distance`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceOutput {
    /// Closest point on shape A (in world space), excluding vertex radius.
    pub point_a: Vec2,
    /// Closest point on shape B (in world space), excluding vertex radius.
    pub point_b: Vec2,
    /// Distance between `point_a` and `point_b`, adjusted by the vertex
    /// radii when `use_radii` was set.
    pub distance: f64,
    /// GJK iterations performed.
    pub iterations: u32,
    /// Termination reason.
    pub termination: DistanceTermination,
}

/// Closest-distance query between two distance proxies under their world
/// transforms, with simplex warm-starting via `cache`.
///
/// `cache` is read to seed the initial simplex and overwritten with the
/// result's index pairs and metric on return (matching `b2Distance`'s
/// in/out `SimplexCache` parameter).
pub fn distance(input: &DistanceInput, cache: &mut SimplexCache) -> DistanceOutput {
    let proxy_a = input.proxy_a;
    let proxy_b = input.proxy_b;

    let recomputed_metric = recompute_metric(cache, proxy_a, &input.transform_a, proxy_b, &input.transform_b);
    let warm_start = cache.metric > 0.0 && (recomputed_metric - cache.metric).abs() < 0.5 * recomputed_metric.max(cache.metric);

    let mut simplex = if warm_start {
        Simplex::from_cache(cache, proxy_a, &input.transform_a, proxy_b, &input.transform_b)
    } else {
        let fresh = SimplexCache::default();
        Simplex::from_cache(&fresh, proxy_a, &input.transform_a, proxy_b, &input.transform_b)
    };

    let mut seen: ArrayVec<(usize, usize), 4> = ArrayVec::new();
    for v in &simplex.vertices {
        let _ = seen.try_push((v.index_a, v.index_b));
    }

    let mut iterations = 0;
    let mut termination = DistanceTermination::Converged;

    while iterations < MAX_DISTANCE_ITERS {
        simplex.solve();

        if simplex.vertices.len() == 3 {
            // Origin enclosed by the triangle simplex: the shapes overlap.
            break;
        }

        let d = simplex.search_direction();
        if crate::math::length_squared(d) < f64::EPSILON * f64::EPSILON {
            break;
        }

        let index_a = proxy_a.support(input.transform_a.inverse_transform_direction(-d));
        let index_b = proxy_b.support(input.transform_b.inverse_transform_direction(d));

        iterations += 1;

        if seen.iter().any(|&(ia, ib)| ia == index_a && ib == index_b) {
            termination = DistanceTermination::DuplicatePoint;
            break;
        }
        let _ = seen.try_push((index_a, index_b));

        let new_vertex = make_vertex(index_a, index_b, proxy_a, &input.transform_a, proxy_b, &input.transform_b);
        if simplex.vertices.try_push(new_vertex).is_err() {
            break;
        }
    }

    if iterations >= MAX_DISTANCE_ITERS {
        termination = DistanceTermination::MaxIterations;
    }

    let (mut point_a, mut point_b) = simplex.witness_points();
    let mut distance = (point_a - point_b).magnitude();

    cache.index_pairs = simplex.vertices.iter().map(|v| (v.index_a, v.index_b)).collect();
    cache.metric = match simplex.vertices.len() {
        1 => 0.0,
        2 => (simplex.vertices[1].w - simplex.vertices[0].w).magnitude(),
        3 => {
            let e1 = simplex.vertices[1].w - simplex.vertices[0].w;
            let e2 = simplex.vertices[2].w - simplex.vertices[0].w;
            crate::math::cross(e1, e2).abs()
        }
        _ => 0.0,
    };

    if input.use_radii {
        if distance < f64::EPSILON {
            // Degenerate: shapes' cores already coincide, pick the current
            // closest-point-to-origin midpoint rather than dividing by
            // zero below.
            let mid = (point_a + point_b) * 0.5;
            point_a = mid;
            point_b = mid;
        } else {
            let normal = (point_b - point_a) / distance;
            point_a += normal * proxy_a.vertex_radius;
            point_b -= normal * proxy_b.vertex_radius;
        }
        distance = (distance - proxy_a.vertex_radius - proxy_b.vertex_radius).max(0.0);
    }

    DistanceOutput {
        point_a,
        point_b,
        distance,
        iterations,
        termination,
    }
}

fn recompute_metric(
    cache: &SimplexCache,
    proxy_a: &DistanceProxy,
    xf_a: &Transformation,
    proxy_b: &DistanceProxy,
    xf_b: &Transformation,
) -> f64 {
    match cache.index_pairs.len() {
        2 => {
            let (a0, b0) = cache.index_pairs[0];
            let (a1, b1) = cache.index_pairs[1];
            let w0 = xf_b.transform(proxy_b.vertex(b0)) - xf_a.transform(proxy_a.vertex(a0));
            let w1 = xf_b.transform(proxy_b.vertex(b1)) - xf_a.transform(proxy_a.vertex(a1));
            (w1 - w0).magnitude()
        }
        3 => {
            let (a0, b0) = cache.index_pairs[0];
            let (a1, b1) = cache.index_pairs[1];
            let (a2, b2) = cache.index_pairs[2];
            let w0 = xf_b.transform(proxy_b.vertex(b0)) - xf_a.transform(proxy_a.vertex(a0));
            let w1 = xf_b.transform(proxy_b.vertex(b1)) - xf_a.transform(proxy_a.vertex(a1));
            let w2 = xf_b.transform(proxy_b.vertex(b2)) - xf_a.transform(proxy_a.vertex(a2));
            crate::math::cross(w1 - w0, w2 - w0).abs()
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_disks_report_gap_distance() {
        let proxy_a = DistanceProxy::for_point(Vec2::zero(), 0.0);
        let proxy_b = DistanceProxy::for_point(Vec2::zero(), 0.0);
        let input = DistanceInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            transform_a: Transformation::new(Vec2::new(0.0, 0.0), crate::math::UnitVec2::UNIT_X),
            transform_b: Transformation::new(Vec2::new(5.0, 0.0), crate::math::UnitVec2::UNIT_X),
            use_radii: false,
        };
        let mut cache = SimplexCache::default();
        let out = distance(&input, &mut cache);
        assert!((out.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_points_report_zero_distance() {
        let proxy_a = DistanceProxy::for_point(Vec2::zero(), 0.0);
        let proxy_b = DistanceProxy::for_point(Vec2::zero(), 0.0);
        let input = DistanceInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            transform_a: Transformation::IDENTITY,
            transform_b: Transformation::IDENTITY,
            use_radii: false,
        };
        let mut cache = SimplexCache::default();
        let out = distance(&input, &mut cache);
        assert!(out.distance < 1e-9);
    }

    #[test]
    fn vertex_radii_shrink_reported_distance() {
        let proxy_a = DistanceProxy::for_point(Vec2::zero(), 1.0);
        let proxy_b = DistanceProxy::for_point(Vec2::zero(), 1.0);
        let input = DistanceInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            transform_a: Transformation::new(Vec2::new(0.0, 0.0), crate::math::UnitVec2::UNIT_X),
            transform_b: Transformation::new(Vec2::new(5.0, 0.0), crate::math::UnitVec2::UNIT_X),
            use_radii: true,
        };
        let mut cache = SimplexCache::default();
        let out = distance(&input, &mut cache);
        assert!((out.distance - 3.0).abs() < 1e-9);
    }
}
