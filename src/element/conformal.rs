use super::{frame::LocalFrame, ElementError, GeometryStage, Triangle, DEGENERACY_TOLERANCE};
use nalgebra::Matrix2;
use num_complex::Complex64;

/// Map from an element's complex local coordinates (τ, τ̄) to master triangle coordinates (ξ, η)
///
/// With z1 and z2 the complex local coordinates of the second and third vertices, a point
/// τ = ξ z1 + η z2 has master coordinates
/// ```text
///     | ξ |          1         |  conj(z2)   -z2 |   | τ       |
///     |   |  =  ------------ * |                 | * |         |
///     | η |      z1 z̄2 - z2 z̄1  | -conj(z1)    z1 |   | conj(τ) |
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConformalMap {
    matrix: Matrix2<Complex64>,
    z: [Complex64; 2],
}

impl ConformalMap {
    /// Build the map of a triangle using its (already computed) local frame
    ///
    /// Returns an error if the triangle has (near) zero area
    pub fn new(triangle: &Triangle, frame: &LocalFrame) -> Result<Self, ElementError> {
        let z1 = frame.tau(triangle.vertices[1]);
        let z2 = frame.tau(triangle.vertices[2]);

        // twice the signed area times 2i
        let det = z1 * z2.conj() - z2 * z1.conj();
        if !det.is_finite() || det.norm() <= DEGENERACY_TOLERANCE * z1.norm() * z2.norm() {
            return Err(ElementError::DegenerateElement {
                stage: GeometryStage::Determinant,
            });
        }

        Ok(Self {
            matrix: Matrix2::new(z2.conj(), -z2, -z1.conj(), z1) / det,
            z: [z1, z2],
        })
    }

    /// Build the local frame and the map of a triangle
    pub fn from_triangle(triangle: &Triangle) -> Result<Self, ElementError> {
        let frame = LocalFrame::new(triangle)?;
        Self::new(triangle, &frame)
    }

    pub fn matrix(&self) -> &Matrix2<Complex64> {
        &self.matrix
    }

    /// Local complex coordinate of the second vertex
    pub fn z1(&self) -> Complex64 {
        self.z[0]
    }

    /// Local complex coordinate of the third vertex
    pub fn z2(&self) -> Complex64 {
        self.z[1]
    }

    /// Local complex coordinates of all three vertices: [0, z1, z2]
    pub fn vertex_tau(&self) -> [Complex64; 3] {
        [Complex64::new(0.0, 0.0), self.z[0], self.z[1]]
    }

    /// Master triangle coordinates (ξ, η) of a local point τ
    pub fn to_master(&self, tau: Complex64) -> [f64; 2] {
        let m = &self.matrix;
        let xi = m[(0, 0)] * tau + m[(0, 1)] * tau.conj();
        let eta = m[(1, 0)] * tau + m[(1, 1)] * tau.conj();
        // imaginary parts vanish up to round-off
        [xi.re, eta.re]
    }

    /// Local point τ at master triangle coordinates (ξ, η)
    pub fn from_master(&self, [xi, eta]: [f64; 2]) -> Complex64 {
        self.z[0] * xi + self.z[1] * eta
    }
}
