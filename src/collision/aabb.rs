//! Axis-aligned bounding box: the primitive shared by the dynamic tree,
//! the shape library's `compute_aabb`, and ray queries.

use crate::math::Vec2;

/// `lower <= upper` componentwise. An empty/invalid box (as produced by
/// [`Aabb::empty`]) violates that invariant on purpose, as a neutral
/// element for [`Aabb::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Lower-left corner.
    pub lower: Vec2,
    /// Upper-right corner.
    pub upper: Vec2,
}

impl Aabb {
    /// Construct from a lower and upper corner. Does not assert
    /// `lower <= upper`; degenerate boxes are only ever produced
    /// internally and immediately unioned away.
    #[inline]
    pub fn new(lower: Vec2, upper: Vec2) -> Self {
        Self { lower, upper }
    }

    /// The neutral element for repeated [`Aabb::union`]: inverted bounds
    /// so the first real union collapses to the other operand exactly.
    #[inline]
    pub fn empty() -> Self {
        Self {
            lower: Vec2::new(f64::INFINITY, f64::INFINITY),
            upper: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.lower + self.upper) * 0.5
    }

    /// Half-extents.
    #[inline]
    pub fn extents(&self) -> Vec2 {
        (self.upper - self.lower) * 0.5
    }

    /// Perimeter (twice the sum of side lengths).
    #[inline]
    pub fn perimeter(&self) -> f64 {
        let d = self.upper - self.lower;
        2.0 * (d.x + d.y)
    }

    /// Area.
    #[inline]
    pub fn area(&self) -> f64 {
        let d = self.upper - self.lower;
        d.x * d.y
    }

    /// The smallest box containing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            lower: Vec2::new(self.lower.x.min(other.lower.x), self.lower.y.min(other.lower.y)),
            upper: Vec2::new(self.upper.x.max(other.upper.x), self.upper.y.max(other.upper.y)),
        }
    }

    /// Expand this box in place to also contain `point`.
    #[inline]
    pub fn include_point(&mut self, point: Vec2) {
        self.lower = Vec2::new(self.lower.x.min(point.x), self.lower.y.min(point.y));
        self.upper = Vec2::new(self.upper.x.max(point.x), self.upper.y.max(point.y));
    }

    /// Expand this box in place to also contain `other`.
    #[inline]
    pub fn include_aabb(&mut self, other: &Aabb) {
        *self = self.union(other);
    }

    /// Grow (or shrink, with a negative `amount`) this box by `amount` on
    /// every side.
    #[inline]
    pub fn fattened(&self, amount: f64) -> Aabb {
        let r = Vec2::new(amount, amount);
        Aabb {
            lower: self.lower - r,
            upper: self.upper + r,
        }
    }

    /// Whether `self` fully contains `other`.
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.lower.x <= other.lower.x
            && self.lower.y <= other.lower.y
            && other.upper.x <= self.upper.x
            && other.upper.y <= self.upper.y
    }

    /// Whether `self` and `other` overlap (touching counts as overlap).
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.lower.x <= other.upper.x
            && self.lower.y <= other.upper.y
            && other.lower.x <= self.upper.x
            && other.lower.y <= self.upper.y
    }

    /// Slab-test ray intersection against this box, restricted to the
    /// segment `[input.p1, input.p1 + max_fraction * (p2 - p1)]`.
    ///
    /// Returns `None` on a miss or if the hit fraction exceeds
    /// `input.max_fraction`.
    pub fn ray_cast(&self, input: &RayCastInput) -> Option<RayCastOutput> {
        let mut t_min = 0.0f64;
        let mut t_max = input.max_fraction;

        let d = input.p2 - input.p1;

        let mut normal = Vec2::zero();

        for axis in 0..2 {
            let (d_axis, p1_axis, lower_axis, upper_axis) = if axis == 0 {
                (d.x, input.p1.x, self.lower.x, self.upper.x)
            } else {
                (d.y, input.p1.y, self.lower.y, self.upper.y)
            };

            if d_axis.abs() < f64::EPSILON {
                // Parallel to this slab: must already be within bounds.
                if p1_axis < lower_axis || p1_axis > upper_axis {
                    return None;
                }
            } else {
                let inv_d = 1.0 / d_axis;
                let mut t1 = (lower_axis - p1_axis) * inv_d;
                let mut t2 = (upper_axis - p1_axis) * inv_d;
                let mut sign = -1.0;

                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                    sign = 1.0;
                }

                if t1 > t_min {
                    normal = Vec2::zero();
                    if axis == 0 {
                        normal.x = sign;
                    } else {
                        normal.y = sign;
                    }
                    t_min = t1;
                }

                t_max = t_max.min(t2);

                if t_min > t_max {
                    return None;
                }
            }
        }

        Some(RayCastOutput {
            normal,
            fraction: t_min,
        })
    }
}

/// A ray query: the segment from `p1` to `p2`, truncated to
/// `max_fraction` of its length (1.0 for the full segment).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastInput {
    /// Ray origin.
    pub p1: Vec2,
    /// Ray end (at `max_fraction = 1.0`).
    pub p2: Vec2,
    /// Fraction of `p2 - p1` to consider; hits beyond this are misses.
    pub max_fraction: f64,
}

/// A successful ray-cast hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastOutput {
    /// Outward surface normal at the hit point.
    pub normal: Vec2,
    /// Fraction along `p2 - p1` at which the hit occurred.
    pub fraction: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_empty_and_box_is_the_box() {
        let b = Aabb::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0));
        let u = Aabb::empty().union(&b);
        assert_eq!(u, b);
    }

    #[test]
    fn overlap_detects_touching_boxes() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn contains_is_strict_about_bounds() {
        let outer = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let inner = Aabb::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn ray_cast_hits_box_face() {
        let b = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        let input = RayCastInput {
            p1: Vec2::new(-5.0, 0.0),
            p2: Vec2::new(5.0, 0.0),
            max_fraction: 1.0,
        };
        let hit = b.ray_cast(&input).expect("ray should hit the box");
        assert!((hit.fraction - 0.4).abs() < 1e-9);
        assert!((hit.normal.x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn ray_cast_misses_when_truncated_by_max_fraction() {
        let b = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        let input = RayCastInput {
            p1: Vec2::new(-5.0, 0.0),
            p2: Vec2::new(5.0, 0.0),
            max_fraction: 0.1,
        };
        assert!(b.ray_cast(&input).is_none());
    }

    #[test]
    fn ray_cast_misses_box_entirely() {
        let b = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        let input = RayCastInput {
            p1: Vec2::new(-5.0, 5.0),
            p2: Vec2::new(5.0, 5.0),
            max_fraction: 1.0,
        };
        assert!(b.ray_cast(&input).is_none());
    }
}
