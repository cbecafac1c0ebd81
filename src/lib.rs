//! # var-core -- Viewport-Adaptive Resampling between spherical projections
//!
//! Converts 360-degree imagery between equirectangular, cubemap, and
//! perspective projections by resampling each output block under a
//! rotation that aligns it with a shared perspective tangent plane, using
//! frequency-selective mesh-to-mesh resampling (FSMR) to reconstruct
//! values at the reprojected sample positions.
//!
//! ## Quick start
//!
//! ```rust
//! use var_core::prelude::*;
//!
//! let src_size = Size::new(64, 64);
//! let tar_size = Size::new(64, 64);
//! let image = Image::zeros(src_size);
//!
//! let resampler = ViewportAdaptiveResampler::new(
//!     src_size,
//!     Box::new(ErpProjection::new(src_size)),
//!     tar_size,
//!     Box::new(ErpProjection::new(tar_size)),
//!     Box::new(FsmrResampler::default()),
//!     VarOptions::default(),
//! )
//! .unwrap();
//!
//! let out = resampler.resample(&image).unwrap();
//! assert_eq!(out.size(), tar_size);
//! ```
//!
//! ## Architecture
//!
//! - [`coords`] -- Cartesian/polar/spherical coordinate conversion (C1)
//! - [`projection`] -- ERP, CMP, and Perspective projection algebra (C2)
//! - [`fsmr`] -- Frequency-selective mesh-to-mesh resampling engine (C3)
//! - [`resampler`] -- The `MeshResampler` adapter trait and FSMR binding (C4)
//! - [`var`] -- The block-wise viewport-adaptive resampling pipeline (C5)
//! - [`geometry`] -- Shared data model: `Image`, `SphereField`, rotations
//! - [`error`] -- `VarError` and the crate-wide `Result` alias

pub mod coords;
pub mod error;
pub mod fsmr;
pub mod geometry;
pub mod projection;
pub mod resampler;
pub mod var;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::error::{VarError, VarResult};
    pub use crate::fsmr::{resample_fsmr, FsmrOptions};
    pub use crate::geometry::{Image, Point2, Size, SphereField};
    pub use crate::projection::{CmpProjection, ErpProjection, PerspectiveProjection, Projection};
    pub use crate::resampler::{FsmrResampler, MeshResampler};
    pub use crate::var::{cmp_size, resample, ViewportAdaptiveResampler, VarOptions};
}
