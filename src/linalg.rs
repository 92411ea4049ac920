use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Default largest system solved with a dense factorization
pub const MAX_DENSE_SIZE: usize = 20_000;

/// Solves the dense linear systems assembled over a Mesh (A x = b)
pub trait DenseSolver {
    fn solve(&self, a: DMatrix<f64>, b: DVector<f64>) -> Result<DVector<f64>, SolveError>;
}

/// Direct solution using Nalgebra's LU decomposition with partial pivoting
///
/// Systems with more than `max_size` rows are refused.
#[derive(Clone, Copy, Debug)]
pub struct NalgebraLu {
    pub max_size: usize,
}

impl NalgebraLu {
    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size }
    }
}

impl Default for NalgebraLu {
    fn default() -> Self {
        Self::with_max_size(MAX_DENSE_SIZE)
    }
}

impl DenseSolver for NalgebraLu {
    fn solve(&self, a: DMatrix<f64>, b: DVector<f64>) -> Result<DVector<f64>, SolveError> {
        if a.nrows() > self.max_size {
            return Err(SolveError::ProblemTooLarge {
                size: a.nrows(),
                max: self.max_size,
            });
        }
        if !a.is_square() || a.nrows() != b.len() {
            return Err(SolveError::DimensionMismatch {
                rows: a.nrows(),
                cols: a.ncols(),
                rhs: b.len(),
            });
        }

        log::trace!("Solving dense {0}x{0} system via LU", a.nrows());

        a.lu().solve(&b).ok_or(SolveError::Singular)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("Matrix is {rows}x{cols} with a right-hand side of length {rhs}; Cannot Solve!")]
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },
    #[error("Matrix is singular; Cannot Solve!")]
    Singular,
    #[error("Matrix Exceeded Maximum Size ({size} > {max}); Cannot Solve!")]
    ProblemTooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_small_system() {
        let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let x_expected = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let b = &a * &x_expected;

        let x = NalgebraLu::default().solve(a, b).unwrap();
        for (xi, ei) in x.iter().zip(x_expected.iter()) {
            assert!((xi - ei).abs() < 1e-12);
        }
    }

    #[test]
    fn singular_system() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(NalgebraLu::default().solve(a, b), Err(SolveError::Singular));
    }

    #[test]
    fn mismatched_dimensions() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(
            NalgebraLu::default().solve(a, b),
            Err(SolveError::DimensionMismatch {
                rows: 3,
                cols: 3,
                rhs: 2
            })
        );
    }

    #[test]
    fn size_cap_is_configurable() {
        let a = DMatrix::<f64>::identity(4, 4);
        let b = DVector::from_element(4, 1.0);

        assert_eq!(
            NalgebraLu::with_max_size(3).solve(a.clone(), b.clone()),
            Err(SolveError::ProblemTooLarge { size: 4, max: 3 })
        );
        let x = NalgebraLu::with_max_size(4).solve(a, b).unwrap();
        assert!(x.iter().all(|xi| (xi - 1.0).abs() < 1e-15));
        assert_eq!(NalgebraLu::default().max_size, MAX_DENSE_SIZE);
    }
}
