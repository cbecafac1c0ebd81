//! Core data model: image/mesh sample storage and rigid rotations.

use glam::{DMat3, DVec2, DVec3};

/// A `(height, width)` pair of positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub height: usize,
    pub width: usize,
}

impl Size {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A 2D point. Columns are `(x, y)`, matching the mesh-to-mesh resampler
/// contract's coordinate order.
pub type Point2 = DVec2;

/// A row-major grid of real-valued samples, `(y, x)` with `y in [0, H)`,
/// `x in [0, W)`. Pixel centers lie at integer coordinates; the continuous
/// coordinate of pixel `(y, x)` is `(y + 0.5, x + 0.5)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    size: Size,
    data: Vec<f64>,
}

impl Image {
    /// Build an image from row-major data. Panics if `data.len() !=
    /// size.len()` -- this is a programmer error, not a runtime one, since
    /// callers construct `data` themselves.
    pub fn from_vec(size: Size, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), size.len(), "Image data length must match size");
        Self { size, data }
    }

    /// Build a zero-filled image of the given size.
    pub fn zeros(size: Size) -> Self {
        Self {
            size,
            data: vec![0.0; size.len()],
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> f64 {
        self.data[y * self.size.width + x]
    }

    #[inline]
    pub fn set(&mut self, y: usize, x: usize, value: f64) {
        self.data[y * self.size.width + x] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// A precomputed per-pixel unit-sphere direction buffer, row-major over the
/// same `(y, x)` layout as [`Image`]. This is the concrete realization of
/// the `S_src`/`S_tar` buffers in the viewport-adaptive resampling
/// algorithm.
#[derive(Debug, Clone)]
pub struct SphereField {
    size: Size,
    data: Vec<DVec3>,
}

impl SphereField {
    pub fn new(size: Size, data: Vec<DVec3>) -> Self {
        assert_eq!(data.len(), size.len());
        Self { size, data }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> DVec3 {
        self.data[y * self.size.width + x]
    }

    #[inline]
    pub fn as_slice(&self) -> &[DVec3] {
        &self.data
    }
}

/// Build the rotation matrix that carries the unit vector `v` to
/// `(-1, 0, 0)`, aligning a target block's center with the perspective
/// camera's optical axis.
///
/// `R = R_y(beta) * R_z(gamma)` with `gamma = pi - atan2(y, x)` and
/// `beta = -atan2(z', |x'|)` where `(x', y', z') = R_z(gamma) * v`.
pub fn rotation_to_optical_axis(v: DVec3) -> DMat3 {
    let gamma = std::f64::consts::PI - v.y.atan2(v.x);
    let (sg, cg) = gamma.sin_cos();
    // Row-major R_z(gamma), built via from_cols (column-major storage).
    let rz = DMat3::from_cols(
        DVec3::new(cg, sg, 0.0),
        DVec3::new(-sg, cg, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
    );
    let v_prime = rz * v;
    let beta = -(v_prime.z.atan2(v_prime.x.abs()));
    let (sb, cb) = beta.sin_cos();
    let ry = DMat3::from_cols(
        DVec3::new(cb, 0.0, -sb),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(sb, 0.0, cb),
    );
    ry * rz
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn image_get_set_roundtrip() {
        let mut img = Image::zeros(Size::new(2, 3));
        img.set(1, 2, 4.5);
        assert_eq!(img.get(1, 2), 4.5);
        assert_eq!(img.get(0, 0), 0.0);
    }

    #[test]
    fn rotation_sends_vector_to_negative_x_axis() {
        let v = DVec3::new(0.3, 0.2, 0.9).normalize();
        let r = rotation_to_optical_axis(v);
        let rotated = r * v;
        assert_relative_eq!(rotated.x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(rotated.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(rotated.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rotation_is_orthogonal() {
        let v = DVec3::new(-0.5, 0.5, 0.1).normalize();
        let r = rotation_to_optical_axis(v);
        let rt = r.transpose();
        let identity = r * rt;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(identity.col(i)[j], expected, epsilon = 1e-9);
            }
        }
    }
}
