//! Viewport-adaptive resampler (C5): block-wise resampling where each
//! target block is processed under a rotation that aligns it with a
//! shared perspective tangent plane.

use crate::error::{VarError, VarResult};
use crate::geometry::{rotation_to_optical_axis, Image, Point2, Size, SphereField};
use crate::projection::{PerspectiveProjection, Projection};
use crate::resampler::MeshResampler;
use glam::DVec3;
use std::f64::consts::FRAC_PI_2;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Construction inputs beyond the two projections and the mesh resampler.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarOptions {
    pub blocksize: usize,
    pub incident_angle_factor: f64,
    pub parallel: bool,
}

impl Default for VarOptions {
    fn default() -> Self {
        Self {
            blocksize: 8,
            incident_angle_factor: 2.0,
            parallel: true,
        }
    }
}

fn build_sphere_field(size: Size, proj: &dyn Projection) -> SphereField {
    let mut data = Vec::with_capacity(size.len());
    for y in 0..size.height {
        for x in 0..size.width {
            data.push(proj.to_sphere(y as f64, x as f64));
        }
    }
    SphereField::new(size, data)
}

/// Row 0 of a rotation matrix, i.e. `(col0.x, col1.x, col2.x)` for the
/// column-major `DMat3` storage -- used to test incidence cheaply without
/// fully rotating every candidate source sample.
#[inline]
fn row0(r: &glam::DMat3) -> DVec3 {
    DVec3::new(r.x_axis.x, r.y_axis.x, r.z_axis.x)
}

/// A precomputed, reusable block-wise resampler between two spherical
/// projections.
pub struct ViewportAdaptiveResampler {
    size_src: Size,
    size_tar: Size,
    proj_tar: Box<dyn Projection + Sync>,
    mesh_resampler: Box<dyn MeshResampler + Sync>,
    aux: PerspectiveProjection,
    s_src: SphereField,
    s_tar: SphereField,
    opts: VarOptions,
}

impl ViewportAdaptiveResampler {
    /// Precompute the per-pixel sphere-coordinate buffers for both
    /// projections and the auxiliary perspective projection used to flatten
    /// each block into a local tangent plane.
    pub fn new(
        size_src: Size,
        proj_src: Box<dyn Projection + Sync>,
        size_tar: Size,
        proj_tar: Box<dyn Projection + Sync>,
        mesh_resampler: Box<dyn MeshResampler + Sync>,
        opts: VarOptions,
    ) -> VarResult<Self> {
        if opts.blocksize == 0
            || size_tar.height % opts.blocksize != 0
            || size_tar.width % opts.blocksize != 0
        {
            return Err(VarError::InvalidConfig(format!(
                "target size {}x{} is not divisible by blocksize {}",
                size_tar.height, size_tar.width, opts.blocksize
            )));
        }

        log::debug!(
            "precomputing sphere fields: src={}x{} tar={}x{} blocksize={}",
            size_src.height,
            size_src.width,
            size_tar.height,
            size_tar.width,
            opts.blocksize
        );

        let aux = PerspectiveProjection::new(proj_src.focal_length(), (0.0, 0.0));
        let s_src = build_sphere_field(size_src, proj_src.as_ref());
        let s_tar = build_sphere_field(size_tar, proj_tar.as_ref());

        Ok(Self {
            size_src,
            size_tar,
            proj_tar,
            mesh_resampler,
            aux,
            s_src,
            s_tar,
            opts,
        })
    }

    pub fn size_src(&self) -> Size {
        self.size_src
    }

    pub fn size_tar(&self) -> Size {
        self.size_tar
    }

    /// Resample `image` (which must match `size_src`) into a new image of
    /// `size_tar`. Callable repeatedly; no mutable state crosses calls.
    pub fn resample(&self, image: &Image) -> VarResult<Image> {
        if image.size() != self.size_src {
            return Err(VarError::DimensionMismatch(format!(
                "image_src is {}x{}, expected {}x{}",
                image.size().height,
                image.size().width,
                self.size_src.height,
                self.size_src.width
            )));
        }

        let b = self.opts.blocksize;
        let wt = self.size_tar.width;
        let n_row_blocks = self.size_tar.height / b;
        let n_col_blocks = wt / b;

        #[cfg(feature = "rayon")]
        if self.opts.parallel {
            let rows: Vec<VarResult<Vec<f64>>> = (0..n_row_blocks)
                .into_par_iter()
                .map(|i| {
                    let mut band = vec![0.0; b * wt];
                    for j in 0..n_col_blocks {
                        let vals = self.process_block(image, i, j)?;
                        for dy in 0..b {
                            for dx in 0..b {
                                band[dy * wt + j * b + dx] = vals[dy * b + dx];
                            }
                        }
                    }
                    Ok(band)
                })
                .collect();

            let mut out = Image::zeros(self.size_tar);
            let out_slice = out.as_mut_slice();
            for (i, band) in rows.into_iter().enumerate() {
                let band = band?;
                out_slice[i * b * wt..(i + 1) * b * wt].copy_from_slice(&band);
            }
            return Ok(out);
        }

        let mut out = Image::zeros(self.size_tar);
        for i in 0..n_row_blocks {
            for j in 0..n_col_blocks {
                let vals = self.process_block(image, i, j)?;
                for dy in 0..b {
                    for dx in 0..b {
                        out.set(i * b + dy, j * b + dx, vals[dy * b + dx]);
                    }
                }
            }
        }
        Ok(out)
    }

    fn process_block(&self, image: &Image, i: usize, j: usize) -> VarResult<Vec<f64>> {
        let b = self.opts.blocksize;
        let yc = (i as f64 + 0.5) * b as f64 - 0.5;
        let xc = (j as f64 + 0.5) * b as f64 - 0.5;
        let v = self.proj_tar.to_sphere(yc, xc);
        let r = rotation_to_optical_axis(v);
        let r0 = row0(&r);

        let mut blk_dirs_rot = Vec::with_capacity(b * b);
        let mut max_theta = f64::NEG_INFINITY;
        for dy in 0..b {
            for dx in 0..b {
                let dir = self.s_tar.get(i * b + dy, j * b + dx);
                let rotated = r * dir;
                let theta = (-rotated.x).acos();
                if theta > max_theta {
                    max_theta = theta;
                }
                blk_dirs_rot.push(rotated);
            }
        }
        let max_theta = self.opts.incident_angle_factor * max_theta;
        if max_theta > FRAC_PI_2 {
            return Err(VarError::IncidentAngleTooLarge { max_theta });
        }

        let (hs, ws) = (self.size_src.height, self.size_src.width);
        let mut src_pts = Vec::new();
        let mut src_vals = Vec::new();
        for y in 0..hs {
            for x in 0..ws {
                let dir = self.s_src.get(y, x);
                if dir.x.is_nan() {
                    continue;
                }
                let theta_src = (-r0.dot(dir)).acos();
                if theta_src < max_theta {
                    let rotated = r * dir;
                    let sample = self.aux.from_sphere(rotated);
                    src_pts.push(Point2::new(sample.x, sample.y));
                    src_vals.push(image.get(y, x));
                }
            }
        }

        let tgt_pts: Vec<Point2> = blk_dirs_rot
            .iter()
            .map(|&dir| {
                let sample = self.aux.from_sphere(dir);
                Point2::new(sample.x, sample.y)
            })
            .collect();

        log::trace!(
            "block ({i},{j}): {} source samples kept, max_theta={max_theta:.4}",
            src_pts.len()
        );

        self.mesh_resampler.resample(&src_pts, &src_vals, &tgt_pts)
    }
}

/// Build a [`ViewportAdaptiveResampler`] and run it once. `progress`
/// enables per-block info-level logging; it is purely observational and
/// never affects the output.
#[allow(clippy::too_many_arguments)]
pub fn resample(
    image_src: &Image,
    proj_src: Box<dyn Projection + Sync>,
    size_tar: Size,
    proj_tar: Box<dyn Projection + Sync>,
    mesh_resampler: Box<dyn MeshResampler + Sync>,
    opts: VarOptions,
    progress: bool,
) -> VarResult<Image> {
    let resampler = ViewportAdaptiveResampler::new(
        image_src.size(),
        proj_src,
        size_tar,
        proj_tar,
        mesh_resampler,
        opts,
    )?;
    if progress {
        log::info!(
            "resampling {}x{} -> {}x{}",
            resampler.size_src().height,
            resampler.size_src().width,
            resampler.size_tar().height,
            resampler.size_tar().width
        );
    }
    resampler.resample(image_src)
}

/// Pick a cubemap canvas size `(2F, 3F)` for an equirectangular source of
/// `erp_size`, rounding `F` to a multiple of `block`.
pub fn cmp_size(erp_size: Size, block: usize) -> Size {
    let base = ((erp_size.height as f64 * erp_size.width as f64 / 6.0).sqrt()).floor() as usize;
    let rem = base % block;
    let mut f = if rem < block / 2 {
        base + (block - rem)
    } else {
        base - rem
    };
    if f < block {
        f = block;
    }
    Size::new(2 * f, 3 * f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{CmpProjection, ErpProjection};
    use crate::resampler::FsmrResampler;

    fn nearest_neighbor(
        src_pts: &[Point2],
        src_vals: &[f64],
        tgt_pts: &[Point2],
    ) -> VarResult<Vec<f64>> {
        Ok(tgt_pts
            .iter()
            .map(|t| {
                let (idx, _) = src_pts
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (i, s.distance_squared(*t)))
                    .fold((0usize, f64::INFINITY), |best, cur| {
                        if cur.1 < best.1 {
                            cur
                        } else {
                            best
                        }
                    });
                src_vals[idx]
            })
            .collect())
    }

    #[test]
    fn cmp_size_is_divisible_by_block() {
        // Invariant 7.
        for &(h, w) in &[(512usize, 1024usize), (1024, 2048), (2000, 4000)] {
            let size = cmp_size(Size::new(h, w), 32);
            assert_eq!(size.height % 2, 0);
            assert_eq!(size.width % 3, 0);
            let f = size.height / 2;
            assert_eq!(f % 32, 0);
            assert!(f >= 32);
        }
    }

    #[test]
    fn cmp_size_rounds_up_when_base_is_already_a_multiple_of_block() {
        // floor(sqrt(512*48/6)) = 64, already a multiple of 32; the
        // rounding rule still rounds up a full block (0 < block/2).
        let size = cmp_size(Size::new(512, 48), 32);
        assert_eq!(size, Size::new(192, 288));
    }

    #[test]
    fn rejects_target_size_not_divisible_by_blocksize() {
        let result = ViewportAdaptiveResampler::new(
            Size::new(16, 32),
            Box::new(ErpProjection::new(Size::new(16, 32))),
            Size::new(15, 32),
            Box::new(ErpProjection::new(Size::new(15, 32))),
            Box::new(FsmrResampler::default()),
            VarOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn identity_resample_with_nearest_neighbor_stub() {
        // Scenario S5.
        let size = Size::new(64, 64);
        let mut image = Image::zeros(size);
        for y in 0..size.height {
            for x in 0..size.width {
                image.set(y, x, (y * size.width + x) as f64);
            }
        }

        let resampler = ViewportAdaptiveResampler::new(
            size,
            Box::new(ErpProjection::new(size)),
            size,
            Box::new(ErpProjection::new(size)),
            Box::new(nearest_neighbor),
            VarOptions {
                blocksize: 8,
                incident_angle_factor: 2.0,
                parallel: false,
            },
        )
        .unwrap();

        let out = resampler.resample(&image).unwrap();
        for y in 0..size.height {
            for x in 0..size.width {
                assert!((out.get(y, x) - image.get(y, x)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn erp_cmp_erp_round_trip_preserves_smooth_signal() {
        // Scenario S6 (PSNR floor over the non-polar band).
        let erp_size = Size::new(64, 128);
        let cmp = cmp_size(erp_size, 16);

        let mut image = Image::zeros(erp_size);
        for y in 0..erp_size.height {
            for x in 0..erp_size.width {
                let val = 128.0
                    + 64.0 * (x as f64 / erp_size.width as f64 * std::f64::consts::TAU).sin()
                    + 32.0 * (y as f64 / erp_size.height as f64 * std::f64::consts::PI).cos();
                image.set(y, x, val);
            }
        }

        let to_cmp = ViewportAdaptiveResampler::new(
            erp_size,
            Box::new(ErpProjection::new(erp_size)),
            cmp,
            Box::new(CmpProjection::new(cmp).unwrap()),
            Box::new(FsmrResampler::default()),
            VarOptions {
                blocksize: 16,
                ..VarOptions::default()
            },
        )
        .unwrap();
        let cmp_image = to_cmp.resample(&image).unwrap();

        let to_erp = ViewportAdaptiveResampler::new(
            cmp,
            Box::new(CmpProjection::new(cmp).unwrap()),
            erp_size,
            Box::new(ErpProjection::new(erp_size)),
            Box::new(FsmrResampler::default()),
            VarOptions {
                blocksize: 16,
                ..VarOptions::default()
            },
        )
        .unwrap();
        let round_tripped = to_erp.resample(&cmp_image).unwrap();

        let lo = erp_size.height / 6;
        let hi = 5 * erp_size.height / 6;
        let mut mse = 0.0;
        let mut n = 0.0;
        for y in lo..hi {
            for x in 0..erp_size.width {
                let d = round_tripped.get(y, x) - image.get(y, x);
                mse += d * d;
                n += 1.0;
            }
        }
        mse /= n;
        let psnr = if mse <= 0.0 {
            f64::INFINITY
        } else {
            20.0 * 255.0f64.log10() - 10.0 * mse.log10()
        };
        assert!(psnr >= 28.0, "psnr={psnr}");
    }
}
