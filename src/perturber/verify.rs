use ndarray::prelude::*;

use crate::defaults::METRIC_SYMMETRY_TOL;

/// Debug-build check that a metric block is symmetric. The overlap and
/// Fock blocks are Gram-type matrices of Hermitian excitation operators on
/// a real reference; an asymmetric block means one of the contraction
/// kernels mixed up an index and the computation must not continue.
pub(crate) fn debug_assert_symmetric(name: &str, mat: &Array2<f64>) {
    if cfg!(debug_assertions) {
        for row in 0..mat.nrows() {
            for col in 0..row {
                let delta = (mat[[row, col]] - mat[[col, row]]).abs();
                assert!(
                    delta <= METRIC_SYMMETRY_TOL,
                    "{} block is not symmetric: |[{}, {}] - [{}, {}]| = {:e}",
                    name,
                    row,
                    col,
                    col,
                    row,
                    delta
                );
            }
        }
    }
}
