//! Cartesian <-> polar and Cartesian <-> spherical coordinate conversions.
//!
//! Pure, stateless, panic-free: non-finite inputs propagate as NaN rather
//! than erroring, since the resampling pipeline relies on NaN passthrough
//! for masking (see [`crate::projection::cmp`]).

/// Convert 2D Cartesian `(y, x)` to polar `(r, phi)`.
#[inline]
pub fn cart_to_polar(y: f64, x: f64) -> (f64, f64) {
    (y.hypot(x), y.atan2(x))
}

/// Convert polar `(r, phi)` to 2D Cartesian `(y, x)`.
///
/// Note the non-standard convention (swapped relative to the usual
/// `x = r*cos(phi), y = r*sin(phi)`): here `y` uses `sin` and `x` uses
/// `cos`. This is load-bearing for the projection math throughout this
/// crate and must not be "fixed" to the textbook convention.
#[inline]
pub fn polar_to_cart(r: f64, phi: f64) -> (f64, f64) {
    (r * phi.sin(), r * phi.cos())
}

/// Convert 3D Cartesian `(x, y, z)` to spherical `(r, theta, phi)`.
///
/// `theta` is measured from `+z`, in `[0, pi]`. `phi` is `atan2(y, x)`, in
/// `(-pi, pi]`.
#[inline]
pub fn cart_to_sph(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let r = (x * x + y * y + z * z).sqrt();
    let theta = (z / r).acos();
    let phi = y.atan2(x);
    (r, theta, phi)
}

/// Convert spherical `(r, theta, phi)` to 3D Cartesian `(x, y, z)`.
#[inline]
pub fn sph_to_cart(r: f64, theta: f64, phi: f64) -> (f64, f64, f64) {
    let sin_theta = theta.sin();
    (
        r * sin_theta * phi.cos(),
        r * sin_theta * phi.sin(),
        r * theta.cos(),
    )
}

/// Elementwise [`cart_to_polar`] over equal-length slices.
pub fn cart_to_polar_many(y: &[f64], x: &[f64]) -> (Vec<f64>, Vec<f64>) {
    y.iter()
        .zip(x)
        .map(|(&y, &x)| cart_to_polar(y, x))
        .unzip()
}

/// Elementwise [`sph_to_cart`] over equal-length slices.
pub fn sph_to_cart_many(r: &[f64], theta: &[f64], phi: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut xs = Vec::with_capacity(r.len());
    let mut ys = Vec::with_capacity(r.len());
    let mut zs = Vec::with_capacity(r.len());
    for ((&r, &theta), &phi) in r.iter().zip(theta).zip(phi) {
        let (x, y, z) = sph_to_cart(r, theta, phi);
        xs.push(x);
        ys.push(y);
        zs.push(z);
    }
    (xs, ys, zs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn cart_to_polar_matches_known_point() {
        let (r, phi) = cart_to_polar(1.0, 0.0);
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
        assert_relative_eq!(phi, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn polar_to_cart_roundtrips_through_cart_to_polar() {
        let (y, x) = (3.0, -4.0);
        let (r, phi) = cart_to_polar(y, x);
        let (y2, x2) = polar_to_cart(r, phi);
        assert_relative_eq!(y, y2, epsilon = 1e-9);
        assert_relative_eq!(x, x2, epsilon = 1e-9);
    }

    #[test]
    fn sph_cart_roundtrip() {
        let (r, theta, phi) = (2.0, 1.1, -2.4);
        let (x, y, z) = sph_to_cart(r, theta, phi);
        let (r2, theta2, phi2) = cart_to_sph(x, y, z);
        assert_relative_eq!(r, r2, epsilon = 1e-9);
        assert_relative_eq!(theta, theta2, epsilon = 1e-9);
        assert_relative_eq!(phi, phi2, epsilon = 1e-9);
    }

    #[test]
    fn north_pole_is_theta_zero() {
        let (_, theta, _) = cart_to_sph(0.0, 0.0, 1.0);
        assert_relative_eq!(theta, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn south_pole_is_theta_pi() {
        let (_, theta, _) = cart_to_sph(0.0, 0.0, -1.0);
        assert_relative_eq!(theta, PI, epsilon = 1e-12);
    }

    #[test]
    fn nan_propagates_rather_than_panicking() {
        let (r, phi) = cart_to_polar(f64::NAN, 1.0);
        assert!(r.is_nan());
        assert!(phi.is_nan());
    }
}
