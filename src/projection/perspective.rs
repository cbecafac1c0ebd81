//! Perspective (pinhole) projection, the one concrete [`super::Radial`]
//! implementation.

use super::Radial;
use crate::coords;
use glam::DVec3;
use std::f64::consts::PI;

/// A pinhole camera projection: `radius(theta) = f * tan(theta)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerspectiveProjection {
    focal_length: f64,
    optical_center: (f64, f64),
}

impl PerspectiveProjection {
    pub fn new(focal_length: f64, optical_center: (f64, f64)) -> Self {
        Self {
            focal_length,
            optical_center,
        }
    }

    /// [`Projection::to_sphere`] with Virtual Image Plane compensation.
    /// When `vip` is set, the ray is reflected through the origin
    /// (`phi -= pi`, `theta = pi - theta`) to mark what would otherwise
    /// land behind the image plane. Unused by the viewport-adaptive
    /// resampler, which always keeps `vip = false`; kept for callers that
    /// need the reflected ray directly.
    pub fn to_sphere_vip(&self, y: f64, x: f64, vip: bool) -> DVec3 {
        let (cy, cx) = self.optical_center;
        let (r, mut phi) = coords::cart_to_polar(y - cy, x - cx);
        let mut theta = self.theta(r);
        if vip {
            phi -= PI;
            theta = PI - theta;
        }
        let (xsr, ysr, zsr) = coords::sph_to_cart(1.0, theta, phi);
        DVec3::new(-zsr, xsr, -ysr)
    }
}

impl Radial for PerspectiveProjection {
    fn optical_center(&self) -> (f64, f64) {
        self.optical_center
    }

    fn focal_length(&self) -> f64 {
        self.focal_length
    }

    fn max_fov(&self) -> f64 {
        PI
    }

    fn radius(&self, theta: f64) -> f64 {
        self.focal_length * theta.tan()
    }

    fn theta(&self, radius: f64) -> f64 {
        (radius / self.focal_length).atan()
    }
}
