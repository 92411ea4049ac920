use super::{conformal::ConformalMap, shift::shift_matrix, ElementError, Triangle};
use nalgebra::{Matrix2, Matrix3, Matrix6, Vector6};
use num_complex::Complex64;
use std::fmt;

/// Positive per-vertex weights which place the edge nodes away from the edge midpoints
///
/// The node on the edge between vertices `a` and `b` sits at `(w_a * v_a + w_b * v_b) / (w_a + w_b)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeights {
    w: [f64; 3],
}

impl VertexWeights {
    pub fn new(w: [f64; 3]) -> Result<Self, ElementError> {
        for (vertex, weight) in w.iter().enumerate() {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(ElementError::InvalidWeight {
                    vertex,
                    weight: *weight,
                });
            }
        }
        Ok(Self { w })
    }

    pub const fn equal() -> Self {
        Self { w: [1.0; 3] }
    }

    pub fn as_array(&self) -> [f64; 3] {
        self.w
    }

    /// Relative weight of vertex `a` on the edge it shares with vertex `b`
    pub fn edge_fraction(&self, a: usize, b: usize) -> f64 {
        self.w[a] / (self.w[a] + self.w[b])
    }
}

impl std::ops::Index<usize> for VertexWeights {
    type Output = f64;
    fn index(&self, index: usize) -> &Self::Output {
        &self.w[index]
    }
}

/// Placement of the edge nodes of a quadratic element
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePartition {
    /// edge nodes at the edge midpoints
    Uniform,
    /// edge nodes placed according to vertex weights
    NonUniform(VertexWeights),
}

impl EdgePartition {
    pub fn non_uniform(w: [f64; 3]) -> Result<Self, ElementError> {
        Ok(Self::NonUniform(VertexWeights::new(w)?))
    }

    pub fn weights(&self) -> VertexWeights {
        match self {
            Self::Uniform => VertexWeights::equal(),
            Self::NonUniform(weights) => *weights,
        }
    }

    /// Master triangle coordinates (ξ, η) of the 6 nodes
    ///
    /// Vertex nodes 0, 1, 2 followed by edge nodes 3, 4, 5 (node `n + 3` is opposite vertex `n`)
    pub fn master_nodes(&self) -> [[f64; 2]; 6] {
        let w = self.weights();
        [
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [w.edge_fraction(1, 2), w.edge_fraction(2, 1)],
            [0.0, w.edge_fraction(2, 0)],
            [w.edge_fraction(1, 0), 0.0],
        ]
    }

    /// Shape function coefficients (rows) over the master triangle in the monomials [1, ξ, η, ξ², η², ξη]
    pub fn master_coefficients(&self) -> Matrix6<f64> {
        match self {
            Self::Uniform => Matrix6::from_row_slice(&[
                1.0, -3.0, -3.0, 2.0, 2.0, 4.0, //
                0.0, -1.0, 0.0, 2.0, 0.0, 0.0, //
                0.0, 0.0, -1.0, 0.0, 2.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 0.0, 4.0, //
                0.0, 0.0, 4.0, 0.0, -4.0, -4.0, //
                0.0, 4.0, 0.0, -4.0, 0.0, -4.0, //
            ]),
            Self::NonUniform(w) => {
                let p12 = w[0] / w[1];
                let p13 = w[0] / w[2];
                let p23 = w[1] / w[2];

                // (w_a + w_b) / w_b and (w_a + w_b) / w_a for each edge
                let c122 = p12 + 1.0;
                let c121 = 1.0 / p12 + 1.0;
                let c133 = p13 + 1.0;
                let c131 = 1.0 / p13 + 1.0;
                let c233 = p23 + 1.0;
                let c232 = 1.0 / p23 + 1.0;

                // (w_a + w_b)² / (w_a w_b)
                let c12q = c121 + c122;
                let c13q = c131 + c133;
                let c23q = c232 + c233;

                Matrix6::from_row_slice(&[
                    1.0, -p12 - 2.0, -p13 - 2.0, c122, c133, p12 + p13 + 2.0, //
                    0.0, -1.0 / p12, 0.0, c121, 0.0, 1.0 / p12 - p23, //
                    0.0, 0.0, -1.0 / p13, 0.0, c131, 1.0 / p13 - 1.0 / p23, //
                    0.0, 0.0, 0.0, 0.0, 0.0, c23q, //
                    0.0, 0.0, c13q, 0.0, -c13q, -c13q, //
                    0.0, c12q, 0.0, -c12q, 0.0, -c12q, //
                ])
            }
        }
    }
}

impl Default for EdgePartition {
    fn default() -> Self {
        Self::Uniform
    }
}

impl fmt::Display for EdgePartition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "Uniform"),
            Self::NonUniform(w) => write!(f, "NonUniform[{}, {}, {}]", w[0], w[1], w[2]),
        }
    }
}

/// Values of the monomials [1, τ, τ̄, τ², τ̄², ττ̄] at τ
pub fn monomials(tau: Complex64) -> Vector6<Complex64> {
    let tau_c = tau.conj();
    Vector6::new(
        Complex64::new(1.0, 0.0),
        tau,
        tau_c,
        tau * tau,
        tau_c * tau_c,
        tau * tau_c,
    )
}

/// How [ξ², η², ξη] are expressed in [τ², τ̄², ττ̄], given ξ = aτ + bτ̄ and η = cτ + dτ̄
pub fn quadratic_extension(m: &Matrix2<Complex64>) -> Matrix3<Complex64> {
    let (a, b) = (m[(0, 0)], m[(0, 1)]);
    let (c, d) = (m[(1, 0)], m[(1, 1)]);

    Matrix3::new(
        a * a, b * b, a * b * 2.0, //
        c * c, d * d, c * d * 2.0, //
        a * c, b * d, a * d + b * c,
    )
}

/// Block diagonal change of basis from [1, ξ, η, ξ², η², ξη] to [1, τ, τ̄, τ², τ̄², ττ̄]
pub fn basis_change(m: &Matrix2<Complex64>) -> Matrix6<Complex64> {
    let q = quadratic_extension(m);
    let mut t = Matrix6::zeros();

    t[(0, 0)] = Complex64::new(1.0, 0.0);
    for j in 0..2 {
        for k in 0..2 {
            t[(j + 1, k + 1)] = m[(j, k)];
        }
    }
    for j in 0..3 {
        for k in 0..3 {
            t[(j + 3, k + 3)] = q[(j, k)];
        }
    }

    t
}

/// Coefficients of an element's 6 quadratic shape functions
///
/// Row `i` holds shape function `i` in the monomials [1, τ, τ̄, τ², τ̄², ττ̄] of the element's
/// local complex coordinate. Shape function `i` is 1 at node `i` and 0 at the other 5 nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeFnMatrix {
    pub coefficients: Matrix6<Complex64>,
    pub partition: EdgePartition,
}

impl ShapeFnMatrix {
    pub fn new(triangle: &Triangle, partition: &EdgePartition) -> Result<Self, ElementError> {
        let map = ConformalMap::from_triangle(triangle)?;
        Ok(Self::from_map(&map, partition))
    }

    /// Midpoint edge nodes
    pub fn uniform(triangle: &Triangle) -> Result<Self, ElementError> {
        Self::new(triangle, &EdgePartition::Uniform)
    }

    /// Edge nodes placed according to vertex weights
    pub fn non_uniform(triangle: &Triangle, weights: [f64; 3]) -> Result<Self, ElementError> {
        Self::new(triangle, &EdgePartition::non_uniform(weights)?)
    }

    pub fn from_map(map: &ConformalMap, partition: &EdgePartition) -> Self {
        let master = partition
            .master_coefficients()
            .map(|c| Complex64::new(c, 0.0));
        Self {
            coefficients: master * basis_change(map.matrix()),
            partition: *partition,
        }
    }

    /// Values of the 6 shape functions at local point τ
    pub fn eval(&self, tau: Complex64) -> Vector6<Complex64> {
        self.coefficients * monomials(tau)
    }

    /// Real values of the 6 shape functions at local point τ (the imaginary parts vanish up to round-off)
    pub fn values(&self, tau: Complex64) -> [f64; 6] {
        let v = self.eval(tau);
        [v[0].re, v[1].re, v[2].re, v[3].re, v[4].re, v[5].re]
    }

    /// Coefficients with respect to the monomials of (τ - z)
    pub fn shifted(&self, z: Complex64) -> Matrix6<Complex64> {
        self.coefficients * shift_matrix(z)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_triangles::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    fn partitions() -> Vec<EdgePartition> {
        vec![
            EdgePartition::Uniform,
            EdgePartition::non_uniform([1.0, 1.0, 1.0]).unwrap(),
            EdgePartition::non_uniform([2.0, 1.0, 0.5]).unwrap(),
            EdgePartition::non_uniform([0.3, 4.0, 1.7]).unwrap(),
        ]
    }

    #[test]
    fn master_coefficients_are_nodal() {
        for partition in partitions() {
            let c = partition.master_coefficients();
            for (j, [xi, eta]) in partition.master_nodes().iter().enumerate() {
                let m = [1.0, *xi, *eta, xi * xi, eta * eta, xi * eta];
                for i in 0..6 {
                    let value: f64 = (0..6).map(|k| c[(i, k)] * m[k]).sum();
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_abs_diff_eq!(value, expected, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn shape_functions_are_nodal() {
        for t in [unit_right(), tilted(), skewed()] {
            let map = t.conformal_map().unwrap();
            for partition in partitions() {
                let sfm = ShapeFnMatrix::from_map(&map, &partition);
                for (j, node) in partition.master_nodes().iter().enumerate() {
                    let values = sfm.values(map.from_master(*node));
                    for (i, value) in values.iter().enumerate() {
                        let expected = if i == j { 1.0 } else { 0.0 };
                        assert_abs_diff_eq!(*value, expected, epsilon = 1e-10);
                    }
                }
            }
        }
    }

    #[test]
    fn shape_functions_are_real_and_sum_to_one() {
        let sfm = ShapeFnMatrix::non_uniform(&tilted(), [1.5, 0.7, 2.2]).unwrap();
        for tau in [Complex64::new(0.3, 0.2), Complex64::new(-1.0, 0.4), Complex64::new(0.8, 1.1)] {
            let v = sfm.eval(tau);
            let sum: f64 = v.iter().map(|c| c.re).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-10);
            for c in v.iter() {
                assert_abs_diff_eq!(c.im, 0.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn equal_weights_reduce_to_uniform() {
        for t in [unit_right(), tilted(), skewed()] {
            let uniform = ShapeFnMatrix::uniform(&t).unwrap();
            let equal = ShapeFnMatrix::non_uniform(&t, [1.0, 1.0, 1.0]).unwrap();
            let scaled = ShapeFnMatrix::non_uniform(&t, [3.5, 3.5, 3.5]).unwrap();

            for ((u, e), s) in uniform
                .coefficients
                .iter()
                .zip(equal.coefficients.iter())
                .zip(scaled.coefficients.iter())
            {
                assert_abs_diff_eq!((u - e).norm(), 0.0, epsilon = 1e-12);
                assert_abs_diff_eq!((u - s).norm(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn unit_right_first_shape_fn() {
        let t = unit_right();
        let sfm = t.shape_fn_matrix(&EdgePartition::Uniform).unwrap();
        let map = t.conformal_map().unwrap();

        assert_abs_diff_eq!(sfm.values(map.from_master([0.0, 0.0]))[0], 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(sfm.values(map.from_master([1.0, 0.0]))[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(sfm.values(map.from_master([0.0, 1.0]))[0], 0.0, epsilon = 1e-14);
        // (1 - x - y)(1 - 2x - 2y) at the centroid
        assert_abs_diff_eq!(
            sfm.values(Complex64::new(1.0 / 3.0, 1.0 / 3.0))[0],
            -1.0 / 9.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn shifted_coefficients_match_unshifted_polynomials() {
        let sfm = ShapeFnMatrix::uniform(&skewed()).unwrap();
        let z = Complex64::new(0.9, -0.35);
        let shifted = sfm.shifted(z);

        let tau = Complex64::new(0.4, 0.6);
        let direct = sfm.eval(tau);
        let via_shift = shifted * monomials(tau - z);
        for (a, b) in direct.iter().zip(via_shift.iter()) {
            assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_weights_fail() {
        let t = tilted();
        assert_eq!(
            ShapeFnMatrix::non_uniform(&t, [1.0, 0.0, 1.0]),
            Err(ElementError::InvalidWeight {
                vertex: 1,
                weight: 0.0
            })
        );
        assert!(ShapeFnMatrix::non_uniform(&t, [1.0, 1.0, -2.0]).is_err());
        assert!(VertexWeights::new([f64::INFINITY, 1.0, 1.0]).is_err());
    }

    #[test]
    fn degenerate_element_fails() {
        assert!(matches!(
            ShapeFnMatrix::non_uniform(&colinear(), [1.0, 2.0, 3.0]),
            Err(ElementError::DegenerateElement { .. })
        ));
    }
}
