//! Time-of-impact: given two shapes swept from `alpha0` to `1`, find the
//! earliest fraction at which their fattened separation reaches the
//! target depth, via advancing GJK plus a 1D bisection root-find.

use crate::collision::distance::{distance, DistanceInput, SimplexCache};
use crate::constants::{LINEAR_SLOP, MAX_ROOT_ITERS, MAX_TOI_ITERS};
use crate::math::{Sweep, Vec2};
use crate::shape::DistanceProxy;

/// Input to [`time_of_impact`].
#[derive(Debug, Clone)]
pub struct TimeOfImpactInput<'a> {
    /// Shape A's distance proxy.
    pub proxy_a: &'a DistanceProxy,
    /// Shape B's distance proxy.
    pub proxy_b: &'a DistanceProxy,
    /// Shape A's swept motion.
    pub sweep_a: Sweep,
    /// Shape B's swept motion.
    pub sweep_b: Sweep,
    /// Stop the search once the interpolation fraction reaches this value
    /// (normally 1.0; a contact already processed this step may restrict
    /// the search to `[alpha0, t_max]`).
    pub t_max: f64,
}

/// Outcome of a TOI search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfImpactState {
    /// Never got close enough within `[0, t_max]`: shapes stay separated.
    Separated,
    /// Touching (at the target depth) at the returned fraction.
    Touching,
    /// Already overlapping at `t = 0` (initial penetration).
    Overlapped,
    /// Bisection root-find exhausted its iteration cap.
    MaxRootIters,
    /// Outer advancement exhausted its iteration cap.
    MaxToiIters,
}

/// Output of [`time_of_impact`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOfImpactOutput {
    /// Why the search stopped.
    pub state: TimeOfImpactState,
    /// The fraction in `[0, t_max]` at which `state` was determined.
    pub t: f64,
}

/// Evaluates separation along the GJK-derived separating axis for a given
/// interpolation fraction, without mutating any shared cache.
///
/// This mirrors the source's `SeparationFunction`: for a point-point or
/// point-face pair this is a linear function of `t` so bisection
/// converges quickly; for polygon-polygon with a changing reference face
/// it can be mildly non-monotonic, which is why the outer loop re-derives
/// the axis from a fresh GJK call each advancement instead of trusting
/// one axis for the whole sweep.
struct SeparationFunction<'a> {
    proxy_a: &'a DistanceProxy,
    proxy_b: &'a DistanceProxy,
    sweep_a: Sweep,
    sweep_b: Sweep,
    local_point: Vec2,
    axis: Vec2,
    kind: SeparationKind,
}

#[derive(Clone, Copy)]
enum SeparationKind {
    Points,
    FaceA,
    FaceB,
}

impl<'a> SeparationFunction<'a> {
    fn new(
        cache: &SimplexCache,
        proxy_a: &'a DistanceProxy,
        sweep_a: Sweep,
        proxy_b: &'a DistanceProxy,
        sweep_b: Sweep,
        t: f64,
    ) -> Self {
        let xf_a = sweep_a.transform_at(t);
        let xf_b = sweep_b.transform_at(t);

        if cache.index_pairs.len() == 1 {
            let (ia, ib) = cache.index_pairs[0];
            let local_a = proxy_a.vertex(ia);
            let local_b = proxy_b.vertex(ib);
            let point_a = xf_a.transform(local_a);
            let point_b = xf_b.transform(local_b);
            let (axis, _) = crate::math::UnitVec2::new_normalize(point_b - point_a);
            Self {
                proxy_a,
                proxy_b,
                sweep_a,
                sweep_b,
                local_point: Vec2::zero(),
                axis: axis.as_vec2(),
                kind: SeparationKind::Points,
            }
        } else {
            // Two points on proxy A share index -> A owns the reference
            // face; otherwise B does.
            let (a0, b0) = cache.index_pairs[0];
            let (a1, _b1) = cache.index_pairs[1];
            if a0 == a1 {
                let local_b0 = proxy_b.vertex(b0);
                let local_a_v1 = proxy_a.vertex(a0);
                let local_a_v2 = proxy_a.vertex(cache.index_pairs[1].0);
                let edge = local_a_v2 - local_a_v1;
                let (normal, _) = crate::math::UnitVec2::new_normalize(Vec2::new(edge.y, -edge.x));
                Self {
                    proxy_a,
                    proxy_b,
                    sweep_a,
                    sweep_b,
                    local_point: (local_a_v1 + local_a_v2) * 0.5,
                    axis: normal.as_vec2(),
                    kind: SeparationKind::FaceA,
                }
                .reoriented(local_b0)
            } else {
                let local_a0 = proxy_a.vertex(a0);
                let local_b_v1 = proxy_b.vertex(b0);
                let local_b_v2 = proxy_b.vertex(cache.index_pairs[1].1);
                let edge = local_b_v2 - local_b_v1;
                let (normal, _) = crate::math::UnitVec2::new_normalize(Vec2::new(edge.y, -edge.x));
                Self {
                    proxy_a,
                    proxy_b,
                    sweep_a,
                    sweep_b,
                    local_point: (local_b_v1 + local_b_v2) * 0.5,
                    axis: normal.as_vec2(),
                    kind: SeparationKind::FaceB,
                }
                .reoriented(local_a0)
            }
        }
    }

    /// Flip `axis` if it points the wrong way relative to a reference
    /// point on the other shape, so `evaluate` always returns a signed
    /// separation that's negative when overlapping.
    fn reoriented(self, other_local_point: Vec2) -> Self {
        let xf = match self.kind {
            SeparationKind::FaceA => self.sweep_a.transform_at(self.sweep_a.alpha0),
            SeparationKind::FaceB => self.sweep_b.transform_at(self.sweep_b.alpha0),
            SeparationKind::Points => return self,
        };
        let world_point = xf.transform(self.local_point);
        let world_axis = xf.transform_direction(self.axis);
        let other_xf = match self.kind {
            SeparationKind::FaceA => self.sweep_b.transform_at(self.sweep_b.alpha0),
            _ => self.sweep_a.transform_at(self.sweep_a.alpha0),
        };
        let other_world = other_xf.transform(other_local_point);
        if (other_world - world_point).dot(world_axis) < 0.0 {
            Self {
                axis: -self.axis,
                ..self
            }
        } else {
            self
        }
    }

    fn evaluate(&self, t: f64) -> f64 {
        let xf_a = self.sweep_a.transform_at(t);
        let xf_b = self.sweep_b.transform_at(t);

        match self.kind {
            SeparationKind::Points => {
                let index_a = self.proxy_a.support(xf_a.inverse_transform_direction(-self.axis));
                let index_b = self.proxy_b.support(xf_b.inverse_transform_direction(self.axis));
                let point_a = xf_a.transform(self.proxy_a.vertex(index_a));
                let point_b = xf_b.transform(self.proxy_b.vertex(index_b));
                (point_b - point_a).dot(self.axis)
            }
            SeparationKind::FaceA => {
                let normal = xf_a.transform_direction(self.axis);
                let plane_point = xf_a.transform(self.local_point);
                let index_b = self.proxy_b.support(xf_b.inverse_transform_direction(-normal));
                let point_b = xf_b.transform(self.proxy_b.vertex(index_b));
                (point_b - plane_point).dot(normal)
            }
            SeparationKind::FaceB => {
                let normal = xf_b.transform_direction(self.axis);
                let plane_point = xf_b.transform(self.local_point);
                let index_a = self.proxy_a.support(xf_a.inverse_transform_direction(-normal));
                let point_a = xf_a.transform(self.proxy_a.vertex(index_a));
                (point_a - plane_point).dot(normal)
            }
        }
    }
}

/// Advancing-simplex time-of-impact search between two swept shapes.
///
/// `target` is the desired fattened separation (usually
/// `totalRadius - 3 * linearSlop`, a small negative-of-touching value so
/// the bodies stop just before their cores would intersect).
pub fn time_of_impact(input: &TimeOfImpactInput, total_radius: f64) -> TimeOfImpactOutput {
    let target = (total_radius - 3.0 * LINEAR_SLOP).max(LINEAR_SLOP);
    let tolerance = 0.25 * LINEAR_SLOP;

    let mut t1 = 0.0f64;
    let mut cache = SimplexCache::default();

    for _ in 0..MAX_TOI_ITERS {
        let xf_a = input.sweep_a.transform_at(t1);
        let xf_b = input.sweep_b.transform_at(t1);

        let dist_input = DistanceInput {
            proxy_a: input.proxy_a,
            proxy_b: input.proxy_b,
            transform_a: xf_a,
            transform_b: xf_b,
            use_radii: false,
        };
        let dist_output = distance(&dist_input, &mut cache);

        if dist_output.distance <= 0.0 {
            return TimeOfImpactOutput {
                state: TimeOfImpactState::Overlapped,
                t: 0.0,
            };
        }

        if dist_output.distance < target + tolerance {
            return TimeOfImpactOutput {
                state: TimeOfImpactState::Touching,
                t: t1,
            };
        }

        let fcn = SeparationFunction::new(&cache, input.proxy_a, input.sweep_a, input.proxy_b, input.sweep_b, t1);

        let t2 = input.t_max;
        let mut a1 = t1;
        let s1 = fcn.evaluate(t1);
        let s2 = fcn.evaluate(t2);

        if s2 > target + tolerance {
            return TimeOfImpactOutput {
                state: TimeOfImpactState::Separated,
                t: input.t_max,
            };
        }
        if s2 > target - tolerance {
            // Never gets closer than `target` before `t_max`: this
            // advancement's axis is satisfied for the rest of the sweep.
            t1 = t2;
            continue;
        }

        // Bisect (Regula-Falsi) between `a1` (separation `s1`, not yet at
        // target) and `a2` (separation `s2`, past it) for the root along
        // this advancement's separating axis.
        let mut a2 = t2;
        let mut sa = s1;
        let mut sb = s2;
        let mut root_iters = 0;
        while root_iters < MAX_ROOT_ITERS {
            root_iters += 1;
            let t = if (sa - sb).abs() > f64::EPSILON {
                a1 + (target - sa) * (a2 - a1) / (sb - sa)
            } else {
                0.5 * (a1 + a2)
            };
            let s = fcn.evaluate(t);
            if (s - target).abs() < tolerance {
                a2 = t;
                break;
            }
            if s > target {
                a1 = t;
                sa = s;
            } else {
                a2 = t;
                sb = s;
            }
        }

        if root_iters >= MAX_ROOT_ITERS {
            return TimeOfImpactOutput {
                state: TimeOfImpactState::MaxRootIters,
                t: a2,
            };
        }

        t1 = a2;
        let s_final = fcn.evaluate(t1);
        if (s_final - target).abs() < tolerance {
            return TimeOfImpactOutput {
                state: TimeOfImpactState::Touching,
                t: t1,
            };
        }
    }

    TimeOfImpactOutput {
        state: TimeOfImpactState::MaxToiIters,
        t: t1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Transformation, UnitVec2};

    #[test]
    fn approaching_disks_report_touching_before_overlap() {
        let proxy_a = DistanceProxy::for_point(Vec2::zero(), 0.5);
        let proxy_b = DistanceProxy::for_point(Vec2::zero(), 0.5);

        let xf0_a = Transformation::new(Vec2::new(-5.0, 0.0), UnitVec2::UNIT_X);
        let xf1_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf0_b = Transformation::new(Vec2::new(5.0, 0.0), UnitVec2::UNIT_X);
        let xf1_b = Transformation::new(Vec2::new(0.5, 0.0), UnitVec2::UNIT_X);

        let mut sweep_a = Sweep::at_rest(xf0_a, Vec2::zero());
        sweep_a.center1 = xf1_a.position;
        let mut sweep_b = Sweep::at_rest(xf0_b, Vec2::zero());
        sweep_b.center1 = xf1_b.position;

        let input = TimeOfImpactInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            sweep_a,
            sweep_b,
            t_max: 1.0,
        };

        let output = time_of_impact(&input, 1.0);
        assert!(matches!(
            output.state,
            TimeOfImpactState::Touching | TimeOfImpactState::Separated
        ));
        if output.state == TimeOfImpactState::Touching {
            assert!(output.t > 0.0 && output.t < 1.0);
        }
    }

    #[test]
    fn already_overlapping_disks_report_overlapped() {
        let proxy_a = DistanceProxy::for_point(Vec2::zero(), 1.0);
        let proxy_b = DistanceProxy::for_point(Vec2::zero(), 1.0);

        let xf_a = Transformation::new(Vec2::new(0.0, 0.0), UnitVec2::UNIT_X);
        let xf_b = Transformation::new(Vec2::new(0.1, 0.0), UnitVec2::UNIT_X);

        let sweep_a = Sweep::at_rest(xf_a, Vec2::zero());
        let sweep_b = Sweep::at_rest(xf_b, Vec2::zero());

        let input = TimeOfImpactInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            sweep_a,
            sweep_b,
            t_max: 1.0,
        };

        let output = time_of_impact(&input, 2.0);
        assert_eq!(output.state, TimeOfImpactState::Overlapped);
    }
}
