//! Public error type for invalid-argument and shape-build failures.
//!
//! Numerical degeneracies and iteration ceilings are *not* represented
//! here — per the error taxonomy, those are recovered locally inside the
//! solver and surfaced through [`crate::dynamics::world::StepStats`]
//! instead of a `Result`.

use thiserror::Error;

/// Failure modes the public API can report to a caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// A `BodyId` that doesn't (or no longer) refers to a live body.
    #[error("unknown body id")]
    UnknownBody,
    /// A `FixtureId` that doesn't (or no longer) refers to a live fixture.
    #[error("unknown fixture id")]
    UnknownFixture,
    /// A `JointId` that doesn't (or no longer) refers to a live joint.
    #[error("unknown joint id")]
    UnknownJoint,
    /// A mutating call was made from inside a listener callback.
    #[error("world is locked during a callback")]
    WorldLocked,
    /// A fixture density was negative or non-finite.
    #[error("invalid fixture density {0} (must be finite and >= 0)")]
    InvalidDensity(f64),
    /// A position/velocity/angle field was NaN or infinite.
    #[error("non-finite value supplied for {field}")]
    NonFinite {
        /// Name of the offending field, for diagnostics.
        field: &'static str,
    },
    /// A convex polygon was built from too few (or degenerate) vertices.
    #[error("polygon needs at least 3 distinct, non-collinear vertices, got {0}")]
    DegeneratePolygon(usize),
    /// A vertex radius fell outside the world's configured bounds.
    #[error("vertex radius {0} outside configured [{1}, {2}] bounds")]
    VertexRadiusOutOfRange(f64, f64, f64),
}

/// Convenience alias for fallible public API calls.
pub type Result<T> = std::result::Result<T, PhysicsError>;
