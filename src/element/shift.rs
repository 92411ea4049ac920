use nalgebra::Matrix6;
use num_complex::Complex64;

/// Re-centering of the quadratic monomial basis at `z`
///
/// Row `k` expresses monomial `k` of [1, τ, τ̄, τ², τ̄², ττ̄] in terms of the monomials of
/// (τ - z): [1, (τ - z), (τ̄ - z̄), (τ - z)², (τ̄ - z̄)², (τ - z)(τ̄ - z̄)].
///
/// Right-multiplying a shape function matrix by this matrix gives the shape functions'
/// coefficients relative to `z` (typically a field point's local coordinate).
pub fn shift_matrix(z: Complex64) -> Matrix6<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let zc = z.conj();

    Matrix6::from_row_slice(&[
        one, zero, zero, zero, zero, zero, //
        z, one, zero, zero, zero, zero, //
        zc, zero, one, zero, zero, zero, //
        z * z, z * 2.0, zero, one, zero, zero, //
        zc * zc, zero, zc * 2.0, zero, one, zero, //
        z * zc, zc, z, zero, zero, one, //
    ])
}
