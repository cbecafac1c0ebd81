//! Frequency-Selective Mesh-to-mesh Resampling (FSMR): matching-pursuit
//! reconstruction on a 2D DCT dictionary evaluated at irregular mesh
//! positions.

use crate::error::{VarError, VarResult};
use crate::geometry::Point2;

/// A `[K^2, N]` row-major DCT dictionary: `data[(k*K+l)*n_cols + n]` holds
/// the `(k, l)` atom evaluated at mesh point `n`. Mirrors
/// [`crate::tensor::MetricTensor4`]'s flattened-row-major-plus-accessor
/// shape in the teacher crate.
#[derive(Debug, Clone, PartialEq)]
pub struct DctDictionary {
    k: usize,
    n: usize,
    data: Vec<f64>,
}

impl DctDictionary {
    /// Number of frequency pairs per axis.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of mesh points each atom is evaluated at.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of atoms, `K^2`.
    #[inline]
    pub fn num_atoms(&self) -> usize {
        self.k * self.k
    }

    #[inline]
    pub fn get(&self, atom: usize, point: usize) -> f64 {
        self.data[atom * self.n + point]
    }

    #[inline]
    pub fn row(&self, atom: usize) -> &[f64] {
        &self.data[atom * self.n..(atom + 1) * self.n]
    }
}

#[inline]
fn dct_alpha(k: usize, l: usize, kk: f64) -> f64 {
    match (k, l) {
        (0, 0) => 1.0 / kk,
        (0, _) | (_, 0) => std::f64::consts::SQRT_2 / kk,
        _ => 2.0 / kk,
    }
}

/// Build the `[K^2, N]` DCT dictionary for the given mesh points.
///
/// `K <= 0` is a programmer error caught by [`resample_fsmr`]'s validation
/// before this is ever called, so it isn't re-checked here.
pub fn dct_basis_dict(k: usize, pts: &[Point2]) -> DctDictionary {
    let n = pts.len();
    let kk = k as f64;
    let mut data = vec![0.0; k * k * n];
    for kf in 0..k {
        for lf in 0..k {
            let alpha = dct_alpha(kf, lf, kk);
            let atom = kf * k + lf;
            let row = &mut data[atom * n..(atom + 1) * n];
            for (i, p) in pts.iter().enumerate() {
                let cy = ((std::f64::consts::PI / kk) * (p.y - 0.5) * kf as f64).cos();
                let cx = ((std::f64::consts::PI / kk) * (p.x - 0.5) * lf as f64).cos();
                row[i] = alpha * cy * cx;
            }
        }
    }
    DctDictionary { k, n, data }
}

/// Frequency-decay weights `f[(k,l)] = sigma^sqrt(k^2+l^2)`, row-major into
/// length `K^2`, matching [`dct_basis_dict`]'s atom indexing.
pub fn dct_frequency_weighting(k: usize, sigma: f64) -> Vec<f64> {
    let mut weights = vec![0.0; k * k];
    for kf in 0..k {
        for lf in 0..k {
            let freq = ((kf * kf + lf * lf) as f64).sqrt();
            weights[kf * k + lf] = sigma.powf(freq);
        }
    }
    weights
}

/// Greedy matching pursuit against a DCT dictionary. Runs exactly `t`
/// iterations; no convergence or early-exit test is defined.
pub fn matching_pursuit(
    dict: &DctDictionary,
    signal: &[f64],
    weights: &[f64],
    freq_weights: &[f64],
    gamma: f64,
    t: usize,
) -> Vec<f64> {
    let num_atoms = dict.num_atoms();
    let n = dict.n();
    let mut residual = signal.to_vec();
    let mut coeffs = vec![0.0; num_atoms];

    let mut denom = vec![0.0; num_atoms];
    for atom in 0..num_atoms {
        let row = dict.row(atom);
        denom[atom] = (0..n).map(|i| row[i] * row[i] * weights[i]).sum();
    }

    for _ in 0..t {
        let mut best_atom = 0;
        let mut best_obj = f64::NEG_INFINITY;
        let mut best_p = 0.0;
        for atom in 0..num_atoms {
            let row = dict.row(atom);
            let p: f64 = (0..n).map(|i| row[i] * residual[i] * weights[i]).sum();
            let obj = if denom[atom] > 0.0 {
                freq_weights[atom] * p * p / denom[atom]
            } else {
                0.0
            };
            if obj > best_obj {
                best_obj = obj;
                best_atom = atom;
                best_p = p;
            }
        }
        let a = best_p / denom[best_atom];
        coeffs[best_atom] += gamma * a;
        let row = dict.row(best_atom);
        for i in 0..n {
            residual[i] -= gamma * a * row[i];
        }
    }

    coeffs
}

/// Evaluate coefficients `c` against a target dictionary: `D'^T * c`.
pub fn dct_synthesize(dict: &DctDictionary, coeffs: &[f64]) -> Vec<f64> {
    let n = dict.n();
    let mut out = vec![0.0; n];
    for atom in 0..dict.num_atoms() {
        let c = coeffs[atom];
        if c == 0.0 {
            continue;
        }
        let row = dict.row(atom);
        for i in 0..n {
            out[i] += row[i] * c;
        }
    }
    out
}

/// Hyperparameters for [`resample_fsmr`] and [`crate::resampler::FsmrResampler`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsmrOptions {
    pub k: usize,
    pub gamma: f64,
    pub sigma: f64,
    pub shift: f64,
    pub t: usize,
}

impl Default for FsmrOptions {
    fn default() -> Self {
        Self {
            k: 32,
            gamma: 0.5,
            sigma: 0.93,
            shift: 16.0,
            t: 1000,
        }
    }
}

/// Resample `src_vals`, known at `src_pts`, onto `tgt_pts` via DCT
/// matching pursuit. Does not mutate its inputs: `shift` is applied to
/// local copies of the point arrays.
pub fn resample_fsmr(
    src_pts: &[Point2],
    src_vals: &[f64],
    tgt_pts: &[Point2],
    opts: &FsmrOptions,
    weights: Option<&[f64]>,
) -> VarResult<Vec<f64>> {
    if opts.k == 0 {
        return Err(VarError::NumericDomain(format!(
            "K must be positive, got {}",
            opts.k
        )));
    }
    if opts.sigma < 0.0 {
        return Err(VarError::NumericDomain(format!(
            "sigma must be non-negative, got {}",
            opts.sigma
        )));
    }
    if src_pts.len() != src_vals.len() {
        return Err(VarError::DimensionMismatch(format!(
            "src_pts has {} points but src_vals has {} values",
            src_pts.len(),
            src_vals.len()
        )));
    }
    if let Some(w) = weights {
        if w.len() != src_pts.len() {
            return Err(VarError::DimensionMismatch(format!(
                "weights has {} entries but src_pts has {}",
                w.len(),
                src_pts.len()
            )));
        }
    }

    let shift = Point2::splat(opts.shift);
    let src_pts_shifted: Vec<Point2> = src_pts.iter().map(|p| *p + shift).collect();
    let tgt_pts_shifted: Vec<Point2> = tgt_pts.iter().map(|p| *p + shift).collect();

    let dict_src = dct_basis_dict(opts.k, &src_pts_shifted);
    let freq = dct_frequency_weighting(opts.k, opts.sigma);
    let owned_weights;
    let w: &[f64] = match weights {
        Some(w) => w,
        None => {
            owned_weights = vec![1.0; src_pts.len()];
            &owned_weights
        }
    };

    let coeffs = matching_pursuit(&dict_src, src_vals, w, &freq, opts.gamma, opts.t);

    let dict_tgt = dct_basis_dict(opts.k, &tgt_pts_shifted);
    Ok(dct_synthesize(&dict_tgt, &coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_points(k: usize) -> Vec<Point2> {
        let mut pts = Vec::with_capacity(k * k);
        for y in 0..k {
            for x in 0..k {
                pts.push(Point2::new(x as f64 + 0.5, y as f64 + 0.5));
            }
        }
        pts
    }

    #[test]
    fn fsmr_identity_on_regular_grid() {
        // Scenario S4.
        let k = 4;
        let pts = grid_points(k);
        let src_vals: Vec<f64> = (0..pts.len()).map(|i| (i as f64 * 1.7).sin()).collect();

        let opts = FsmrOptions {
            k,
            gamma: 1.0,
            sigma: 0.93,
            shift: 0.0,
            t: 64,
        };
        let out = resample_fsmr(&pts, &src_vals, &pts, &opts, None).unwrap();
        for (a, b) in out.iter().zip(&src_vals) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn matching_pursuit_recovers_a_pure_atom() {
        // Invariant 4: idempotence on the basis.
        let k = 4;
        let pts = grid_points(k);
        let dict = dct_basis_dict(k, &pts);
        let target_atom = 5;
        let signal = dict.row(target_atom).to_vec();
        let weights = vec![1.0; pts.len()];
        let freq = dct_frequency_weighting(k, 0.93);

        let c = matching_pursuit(&dict, &signal, &weights, &freq, 0.5, 50);
        assert!((c[target_atom] - 1.0).abs() < 0.5f64.powi(50));
        for (i, &ci) in c.iter().enumerate() {
            if i != target_atom {
                assert!(ci.abs() < 0.5f64.powi(50) + 1e-9);
            }
        }
    }

    #[test]
    fn matching_pursuit_is_exact_on_dc_in_one_step() {
        // Invariant 5: exactness on DC.
        let k = 4;
        let pts = grid_points(k);
        let dict = dct_basis_dict(k, &pts);
        let v = 3.25;
        let signal = vec![v; pts.len()];
        let weights = vec![1.0; pts.len()];
        let freq = dct_frequency_weighting(k, 0.93);

        let c = matching_pursuit(&dict, &signal, &weights, &freq, 1.0, 1);
        assert_relative_eq!(c[0], v, epsilon = 1e-9);
        for &ci in &c[1..] {
            assert_relative_eq!(ci, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn resample_fsmr_rejects_bad_k() {
        let pts = vec![Point2::new(0.5, 0.5)];
        let vals = vec![1.0];
        let opts = FsmrOptions {
            k: 0,
            ..FsmrOptions::default()
        };
        assert!(resample_fsmr(&pts, &vals, &pts, &opts, None).is_err());
    }

    #[test]
    fn resample_fsmr_rejects_length_mismatch() {
        let pts = vec![Point2::new(0.5, 0.5), Point2::new(1.5, 1.5)];
        let vals = vec![1.0];
        let opts = FsmrOptions::default();
        assert!(resample_fsmr(&pts, &vals, &pts, &opts, None).is_err());
    }

    #[test]
    fn resample_fsmr_does_not_mutate_inputs() {
        let pts = grid_points(4);
        let pts_before = pts.clone();
        let vals: Vec<f64> = (0..pts.len()).map(|i| i as f64).collect();
        let opts = FsmrOptions::default();
        let _ = resample_fsmr(&pts, &vals, &pts, &opts, None).unwrap();
        assert_eq!(pts, pts_before);
    }
}
