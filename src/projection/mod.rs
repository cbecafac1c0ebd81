//! Projection algebra: bidirectional pixel <-> unit-sphere mappings.
//!
//! [`Projection`] is the interface every concrete projection (equirectangular,
//! cubemap, perspective) implements. [`Radial`] is a narrower interface for
//! lens-like projections defined purely by a radius/incident-angle pair;
//! any `Radial` gets a [`Projection`] impl for free via the blanket impl
//! below, the way [`crate::geodesic`]-adjacent traits in the teacher crate
//! layer derived behavior on top of a minimal required set.

mod cmp;
mod erp;
mod perspective;

pub use cmp::CmpProjection;
pub use erp::ErpProjection;
pub use perspective::PerspectiveProjection;

use crate::coords;
use glam::DVec3;

/// The result of reprojecting a unit-sphere direction back to pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSample {
    pub y: f64,
    pub x: f64,
    /// True when the ray would land behind the image plane. Always `false`
    /// for projections without a notion of "behind" (ERP, CMP).
    pub behind: bool,
}

impl ProjectionSample {
    fn new(y: f64, x: f64) -> Self {
        Self {
            y,
            x,
            behind: false,
        }
    }
}

/// Forward/inverse mapping between pixel coordinates and points on the unit
/// sphere.
pub trait Projection {
    /// Focal length, in pixels, used to build the auxiliary perspective
    /// projection in the viewport-adaptive resampler.
    fn focal_length(&self) -> f64;

    /// Map a pixel coordinate to a point on the unit sphere. Returns a NaN
    /// vector for pixels outside the projection's valid domain (e.g. a
    /// cubemap inter-face seam); callers must filter.
    fn to_sphere(&self, y: f64, x: f64) -> DVec3;

    /// Map a point on the unit sphere back to pixel coordinates.
    fn from_sphere(&self, dir: DVec3) -> ProjectionSample;
}

/// A radial (lens-like) projection: a pixel's distance from the optical
/// center determines its incident angle with respect to the optical axis,
/// and vice versa.
pub trait Radial {
    /// Optical center in pixels, `(cy, cx)`.
    fn optical_center(&self) -> (f64, f64);

    fn focal_length(&self) -> f64;

    /// Maximum field of view this projection can represent.
    fn max_fov(&self) -> f64;

    /// Radius on the sensor for a given incident angle w.r.t. the optical
    /// axis.
    fn radius(&self, theta: f64) -> f64;

    /// Incident angle w.r.t. the optical axis for a given radius on the
    /// sensor.
    fn theta(&self, radius: f64) -> f64;
}

/// Shared forward mapping for any [`Radial`] projection: go through
/// `(r, phi) = cart_to_polar(y - cy, x - cx)`, then a fixed axis rewiring
/// so the optical axis points toward `-x` on the sphere, `+y` is image
/// right, and `+z` is image up.
pub(crate) fn radial_to_sphere<R: Radial + ?Sized>(proj: &R, y: f64, x: f64) -> DVec3 {
    let (cy, cx) = proj.optical_center();
    let (r, phi) = coords::cart_to_polar(y - cy, x - cx);
    let theta = proj.theta(r);
    let (xsr, ysr, zsr) = coords::sph_to_cart(1.0, theta, phi);
    DVec3::new(-zsr, xsr, -ysr)
}

/// Shared inverse mapping for any [`Radial`] projection.
pub(crate) fn radial_from_sphere<R: Radial + ?Sized>(proj: &R, dir: DVec3) -> ProjectionSample {
    let (_, theta, phi) = coords::cart_to_sph(dir.y, -dir.z, -dir.x);
    let r = proj.radius(theta);
    let (y, x) = coords::polar_to_cart(r, phi);
    let (cy, cx) = proj.optical_center();
    ProjectionSample {
        y: y + cy,
        x: x + cx,
        behind: r < 0.0,
    }
}

impl<T: Radial> Projection for T {
    fn focal_length(&self) -> f64 {
        Radial::focal_length(self)
    }

    fn to_sphere(&self, y: f64, x: f64) -> DVec3 {
        radial_to_sphere(self, y, x)
    }

    fn from_sphere(&self, dir: DVec3) -> ProjectionSample {
        radial_from_sphere(self, dir)
    }
}
