//! Cubemap projection (CMP): six unfolded cube faces laid out in a 2x3
//! grid (top, left, front, right, back, bottom), each an `F x F` square.

use super::{Projection, ProjectionSample};
use crate::error::{VarError, VarResult};
use crate::geometry::Size;
use glam::DVec3;
use std::f64::consts::PI;

/// One of the three Cartesian axes a [`CoordMap`] can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis3 {
    X,
    Y,
    Z,
}

impl Axis3 {
    #[inline]
    fn component(self, v: DVec3) -> f64 {
        match self {
            Axis3::X => v.x,
            Axis3::Y => v.y,
            Axis3::Z => v.z,
        }
    }
}

/// A linear map between a 2D interval on the unfolded canvas and a 3D
/// interval on one of the cube's axes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CoordMap {
    interval_2d: (f64, f64),
    interval_3d: (f64, f64),
    axis_3d: Axis3,
}

impl CoordMap {
    const fn new(interval_2d: (f64, f64), interval_3d: (f64, f64), axis_3d: Axis3) -> Self {
        Self {
            interval_2d,
            interval_3d,
            axis_3d,
        }
    }

    #[inline]
    fn lerp(val: f64, a1: f64, b1: f64, a2: f64, b2: f64) -> f64 {
        (val - a1) * ((b2 - a2) / (b1 - a1)) + a2
    }

    #[inline]
    fn val3d_for_2d(&self, val2d: f64) -> f64 {
        Self::lerp(
            val2d,
            self.interval_2d.0,
            self.interval_2d.1,
            self.interval_3d.0,
            self.interval_3d.1,
        )
    }

    #[inline]
    fn val2d_for_3d(&self, val3d: f64) -> f64 {
        Self::lerp(
            val3d,
            self.interval_3d.0,
            self.interval_3d.1,
            self.interval_2d.0,
            self.interval_2d.1,
        )
    }
}

/// One of the six cube faces.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Region {
    x_map: CoordMap,
    y_map: CoordMap,
    plane_axis_3d: Axis3,
    plane_val_3d: f64,
}

impl Region {
    fn new(x_map: CoordMap, y_map: CoordMap, plane_val_3d: f64) -> VarResult<Self> {
        if x_map.axis_3d == y_map.axis_3d {
            return Err(VarError::InvalidConfig(format!(
                "cubemap region: x and y maps share the same 3d axis ({:?})",
                x_map.axis_3d
            )));
        }
        let plane_axis_3d = [Axis3::X, Axis3::Y, Axis3::Z]
            .into_iter()
            .find(|a| *a != x_map.axis_3d && *a != y_map.axis_3d)
            .expect("exactly one axis remains once x and y are distinct");
        Ok(Self {
            x_map,
            y_map,
            plane_axis_3d,
            plane_val_3d,
        })
    }

    fn within_region_mask(&self, y: f64, x: f64) -> bool {
        let (ylo, yhi) = (
            self.y_map.interval_2d.0.min(self.y_map.interval_2d.1),
            self.y_map.interval_2d.0.max(self.y_map.interval_2d.1),
        );
        let (xlo, xhi) = (
            self.x_map.interval_2d.0.min(self.x_map.interval_2d.1),
            self.x_map.interval_2d.0.max(self.x_map.interval_2d.1),
        );
        y >= ylo && y <= yhi && x >= xlo && x <= xhi
    }

    fn within_cubeface_mask(&self, dir: DVec3) -> bool {
        let plane_val = self.plane_axis_3d.component(dir);
        let other1 = self.x_map.axis_3d.component(dir).abs();
        let other2 = self.y_map.axis_3d.component(dir).abs();
        let sign_ok = if self.plane_val_3d > 0.0 {
            plane_val > 0.0
        } else {
            plane_val < 0.0
        };
        sign_ok && plane_val.abs() > other1 && plane_val.abs() > other2
    }

    /// Map normalized 2D canvas coordinates `(yn, xn)` to a point on the
    /// cube face (not yet normalized to the unit sphere).
    fn to_3d(&self, y: f64, x: f64) -> DVec3 {
        let mut out = DVec3::ZERO;
        let set = |v: &mut DVec3, axis: Axis3, val: f64| match axis {
            Axis3::X => v.x = val,
            Axis3::Y => v.y = val,
            Axis3::Z => v.z = val,
        };
        set(&mut out, self.y_map.axis_3d, self.y_map.val3d_for_2d(y));
        set(&mut out, self.x_map.axis_3d, self.x_map.val3d_for_2d(x));
        set(&mut out, self.plane_axis_3d, self.plane_val_3d);
        out
    }

    /// Map a unit-sphere direction known to lie within this region's
    /// cubeface back to normalized 2D canvas coordinates `(yn, xn)`.
    ///
    /// The ray from the origin through `dir` hits the cube face's plane at
    /// `scale = plane_val_3d / dir[plane_axis]`; since `dir` is already
    /// unit-length along the same ray, the intersection point is simply
    /// `dir * scale`.
    fn to_2d(&self, dir: DVec3) -> (f64, f64) {
        let scale = self.plane_val_3d / self.plane_axis_3d.component(dir);
        let p = dir * scale;
        let y = self.y_map.val2d_for_3d(self.y_map.axis_3d.component(p));
        let x = self.x_map.val2d_for_3d(self.x_map.axis_3d.component(p));
        (y, x)
    }
}

/// Cubemap projection over a `(2F, 3F)` canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CmpProjection {
    size: Size,
    regions: [Region; 6],
}

impl CmpProjection {
    /// Build the six fixed cube-face regions for a canvas of the given
    /// size. Errors if the canvas isn't a `2F x 3F` shape.
    pub fn new(size: Size) -> VarResult<Self> {
        if size.height == 0 || size.width == 0 || size.height % 2 != 0 || size.width % 3 != 0 {
            return Err(VarError::InvalidConfig(format!(
                "cubemap canvas {}x{} is not a 2F x 3F shape",
                size.height, size.width
            )));
        }
        let face = size.height / 2;
        if size.width / 3 != face {
            return Err(VarError::InvalidConfig(format!(
                "cubemap canvas {}x{} has inconsistent face size (height/2={} != width/3={})",
                size.height,
                size.width,
                face,
                size.width / 3
            )));
        }

        let top = Region::new(
            CoordMap::new((0.0, 1.0 / 3.0), (-1.0, 1.0), Axis3::X),
            CoordMap::new((0.5, 1.0), (-1.0, 1.0), Axis3::Y),
            1.0,
        )?;
        let left = Region::new(
            CoordMap::new((0.0, 1.0 / 3.0), (1.0, -1.0), Axis3::X),
            CoordMap::new((0.0, 0.5), (1.0, -1.0), Axis3::Z),
            -1.0,
        )?;
        let front = Region::new(
            CoordMap::new((1.0 / 3.0, 2.0 / 3.0), (-1.0, 1.0), Axis3::Y),
            CoordMap::new((0.0, 0.5), (1.0, -1.0), Axis3::Z),
            -1.0,
        )?;
        let right = Region::new(
            CoordMap::new((2.0 / 3.0, 1.0), (-1.0, 1.0), Axis3::X),
            CoordMap::new((0.0, 0.5), (1.0, -1.0), Axis3::Z),
            1.0,
        )?;
        let back = Region::new(
            CoordMap::new((1.0 / 3.0, 2.0 / 3.0), (1.0, -1.0), Axis3::Z),
            CoordMap::new((0.5, 1.0), (-1.0, 1.0), Axis3::Y),
            1.0,
        )?;
        let bottom = Region::new(
            CoordMap::new((2.0 / 3.0, 1.0), (1.0, -1.0), Axis3::X),
            CoordMap::new((0.5, 1.0), (-1.0, 1.0), Axis3::Y),
            -1.0,
        )?;

        Ok(Self {
            size,
            regions: [top, left, front, right, back, bottom],
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Cube face side length `F`.
    pub fn face_size(&self) -> usize {
        self.size.height / 2
    }
}

impl Projection for CmpProjection {
    fn focal_length(&self) -> f64 {
        1.0 / (PI / self.size.height as f64).tan()
    }

    fn to_sphere(&self, y: f64, x: f64) -> DVec3 {
        let yn = (y + 0.5) / self.size.height as f64;
        let xn = (x + 0.5) / self.size.width as f64;
        for region in &self.regions {
            if region.within_region_mask(yn, xn) {
                let p = region.to_3d(yn, xn);
                return p.normalize();
            }
        }
        DVec3::NAN
    }

    fn from_sphere(&self, dir: DVec3) -> ProjectionSample {
        for region in &self.regions {
            if region.within_cubeface_mask(dir) {
                let (yn, xn) = region.to_2d(dir);
                let y = yn * self.size.height as f64 - 0.5;
                let x = xn * self.size.width as f64 - 0.5;
                return ProjectionSample::new(y, x);
            }
        }
        ProjectionSample::new(f64::NAN, f64::NAN)
    }
}
