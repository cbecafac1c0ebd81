//! Mesh-to-mesh resampler adapter (C4): the uniform callback the
//! viewport-adaptive resampler dispatches each block through.

use crate::error::VarResult;
use crate::fsmr::{self, FsmrOptions};
use crate::geometry::Point2;

/// A callable taking `(src_pts, src_vals, tgt_pts)` and returning values at
/// `tgt_pts`. Columns of the point slices are `(x, y)` in that order.
pub trait MeshResampler {
    fn resample(
        &self,
        src_pts: &[Point2],
        src_vals: &[f64],
        tgt_pts: &[Point2],
    ) -> VarResult<Vec<f64>>;
}

impl<F> MeshResampler for F
where
    F: Fn(&[Point2], &[f64], &[Point2]) -> VarResult<Vec<f64>>,
{
    fn resample(
        &self,
        src_pts: &[Point2],
        src_vals: &[f64],
        tgt_pts: &[Point2],
    ) -> VarResult<Vec<f64>> {
        self(src_pts, src_vals, tgt_pts)
    }
}

/// A [`MeshResampler`] backed by FSMR, binding a fixed set of
/// hyperparameters across every block it's asked to resample.
#[derive(Debug, Clone, PartialEq)]
pub struct FsmrResampler {
    opts: FsmrOptions,
}

impl FsmrResampler {
    pub fn new(opts: FsmrOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &FsmrOptions {
        &self.opts
    }
}

impl Default for FsmrResampler {
    fn default() -> Self {
        Self {
            opts: FsmrOptions::default(),
        }
    }
}

impl MeshResampler for FsmrResampler {
    fn resample(
        &self,
        src_pts: &[Point2],
        src_vals: &[f64],
        tgt_pts: &[Point2],
    ) -> VarResult<Vec<f64>> {
        fsmr::resample_fsmr(src_pts, src_vals, tgt_pts, &self.opts, None)
    }
}
