//! Error types for the viewport-adaptive resampler.

/// All fallible operations in this crate return `Result<_, VarError>`.
///
/// There are no retries and no partial results: a failing block aborts the
/// whole [`crate::var::resample`] call, and a failing FSMR call aborts the
/// whole resample of that block.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VarError {
    /// Target size not divisible by blocksize, a malformed cubemap canvas,
    /// or a `Region` whose two `CoordMap`s collide on the same 3D axis.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A source image's shape doesn't match its configured projection size,
    /// or FSMR input lengths disagree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A block's maximum incident angle exceeded pi/2.
    #[error("incident angle too large: {max_theta} > pi/2")]
    IncidentAngleTooLarge {
        /// The offending angle, in radians.
        max_theta: f64,
    },

    /// `K <= 0`, negative `sigma`, or a non-finite input where a finite
    /// value is required.
    #[error("numeric domain error: {0}")]
    NumericDomain(String),
}

/// Convenience alias used throughout the crate.
pub type VarResult<T> = Result<T, VarError>;
