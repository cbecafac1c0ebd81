//! Equirectangular projection (ERP).

use super::{Projection, ProjectionSample};
use crate::coords;
use crate::geometry::Size;
use glam::DVec3;
use std::f64::consts::PI;

/// Equirectangular (latitude/longitude) projection over a full `(H, W)`
/// canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErpProjection {
    size: Size,
}

impl ErpProjection {
    pub fn new(size: Size) -> Self {
        Self { size }
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl Projection for ErpProjection {
    fn focal_length(&self) -> f64 {
        1.0 / (PI / self.size.height as f64).tan()
    }

    fn to_sphere(&self, y: f64, x: f64) -> DVec3 {
        let phi = -((x + 0.5) / self.size.width as f64) * 2.0 * PI;
        let theta = ((y + 0.5) / self.size.height as f64) * PI;
        let (x, y, z) = coords::sph_to_cart(1.0, theta, phi);
        DVec3::new(x, y, z)
    }

    fn from_sphere(&self, dir: DVec3) -> ProjectionSample {
        let (_, theta, mut phi) = coords::cart_to_sph(dir.x, dir.y, dir.z);
        if phi > 0.0 {
            phi -= 2.0 * PI;
        }
        let y = (theta / PI) * self.size.height as f64 - 0.5;
        let x = -(phi / (2.0 * PI)) * self.size.width as f64 - 0.5;
        ProjectionSample::new(y, x)
    }
}
