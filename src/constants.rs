//! Default tuning constants, mirroring the source's `Settings`/`b2Settings`.
//!
//! These are the defaults baked into `StepConf::default()`, `WorldConf`,
//! and shape construction; callers needing different tuning override the
//! individual fields rather than these constants directly.

/// Default linear slop: the amount of penetration the solver tolerates
/// rather than correcting it all the way to zero (prevents jitter from
/// overcorrection).
pub const LINEAR_SLOP: f64 = 0.005;

/// Default angular slop, in radians.
pub const ANGULAR_SLOP: f64 = 2.0 / 180.0 * std::f64::consts::PI;

/// Default "skin" radius every polygon gets, rounding its corners by a
/// small fixed amount so GJK/manifold generation never has to handle an
/// exactly-zero-radius convex hull.
pub const POLYGON_RADIUS: f64 = 2.0 * LINEAR_SLOP;

/// Default maximum position correction applied in one position-solver
/// iteration.
pub const MAX_LINEAR_CORRECTION: f64 = 0.2;

/// Default maximum angular correction applied in one position-solver
/// iteration, in radians.
pub const MAX_ANGULAR_CORRECTION: f64 = 8.0 / 180.0 * std::f64::consts::PI;

/// Default maximum translation a body may undergo in one (sub-)step.
pub const MAX_TRANSLATION: f64 = 2.0;

/// Default maximum rotation a body may undergo in one (sub-)step, radians.
pub const MAX_ROTATION: f64 = 0.5 * std::f64::consts::PI;

/// Default Baumgarte stabilization rate for the regular position solver.
pub const REGULAR_RESOLUTION_RATE: f64 = 0.2;

/// Default stabilization rate for the TOI position solver (more aggressive
/// since TOI sub-steps are shorter).
pub const TOI_RESOLUTION_RATE: f64 = 0.75;

/// Velocity below which a collision is treated as perfectly inelastic.
pub const VELOCITY_THRESHOLD: f64 = 1.0;

/// Amount a moving proxy's fattened AABB is expanded beyond the tight box.
pub const AABB_EXTENSION: f64 = 0.1;

/// Multiplier applied to a proxy's displacement when re-fattening its
/// AABB after an out-of-bounds move, so fast but still sub-CCD motion
/// doesn't immediately re-trigger a move next step.
pub const AABB_DISPLACE_MULTIPLIER: f64 = 2.0;

/// Default regular-phase velocity iterations.
pub const REG_VELOCITY_ITERATIONS: u32 = 8;

/// Default regular-phase position iterations.
pub const REG_POSITION_ITERATIONS: u32 = 3;

/// Default TOI-phase velocity iterations.
pub const TOI_VELOCITY_ITERATIONS: u32 = 4;

/// Default TOI-phase position iterations.
pub const TOI_POSITION_ITERATIONS: u32 = 20;

/// Default ceiling on TOI sub-steps per step (the livelock-prevention
/// fallback from spec.md §9(b)).
pub const MAX_SUB_STEPS: u32 = 8;

/// Default ceiling on outer TOI-search iterations in `World::step`.
pub const MAX_TOI_STEPS: u32 = 20;

/// Default ceiling on GJK iterations.
pub const MAX_DISTANCE_ITERS: u32 = 20;

/// Default ceiling on TOI root-find bisection iterations (per outer
/// advancement).
pub const MAX_ROOT_ITERS: u32 = 50;

/// Default ceiling on outer TOI advancement iterations (per contact).
pub const MAX_TOI_ITERS: u32 = 20;

/// Minimum still-time, in seconds, before an island's bodies may sleep.
pub const TIME_TO_SLEEP: f64 = 0.5;

/// Linear velocity squared below which a body is considered "still" for
/// sleep purposes.
pub const LINEAR_SLEEP_TOLERANCE_SQ: f64 = 0.01 * 0.01;

/// Angular velocity squared below which a body is considered "still" for
/// sleep purposes.
pub const ANGULAR_SLEEP_TOLERANCE_SQ: f64 = {
    let tol = 2.0 / 180.0 * std::f64::consts::PI;
    tol * tol
};

/// Default minimum vertex radius a world will accept for a shape.
pub const DEFAULT_MIN_VERTEX_RADIUS: f64 = 0.0;

/// Default maximum vertex radius a world will accept for a shape.
pub const DEFAULT_MAX_VERTEX_RADIUS: f64 = 255.0 * LINEAR_SLOP;
