// src/linalg_backends.rs

use ndarray::{Array1, Array2};
use std::error::Error;
use std::marker::PhantomData;

#[cfg(not(any(feature = "backend_faer", feature = "lapack")))]
compile_error!("enable one linear algebra backend: `backend_faer` or one of the `backend_openblas*` / `backend_mkl*` features");

/// Output of a symmetric eigendecomposition.
#[derive(Debug)]
pub struct EighOutput<F: 'static> {
    /// Eigenvalues, sorted in ascending order.
    pub eigenvalues: Array1<F>,
    /// Eigenvectors as columns of the matrix.
    /// eigenvectors.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<F>,
}

/// Symmetric eigendecomposition (LAPACK DSYEVD-style). Only the upper
/// triangle of `matrix` is guaranteed to be read.
pub trait BackendEigh<F: 'static + Copy + Send + Sync> {
    fn eigh_upper(&self, matrix: &Array2<F>) -> Result<EighOutput<F>, Box<dyn Error + Send + Sync>>;
}

/// Dispatches to the backend selected by Cargo features. faer wins when both are enabled.
#[derive(Debug, Default, Copy, Clone)]
pub struct LinAlgBackendProvider<F: 'static + Copy + Send + Sync> {
    _phantom: PhantomData<F>,
}

impl<F: 'static + Copy + Send + Sync> LinAlgBackendProvider<F> {
    pub fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

fn check_square<F>(matrix: &Array2<F>) -> Result<(), Box<dyn Error + Send + Sync>> {
    if matrix.nrows() != matrix.ncols() {
        return Err(format!(
            "matrix must be square for eigendecomposition, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )
        .into());
    }
    Ok(())
}

// --- ndarray-linalg (LAPACK) backend ---
#[cfg(feature = "lapack")]
mod lapack_specific_code {
    use super::{check_square, BackendEigh, EighOutput};
    use ndarray::{Array1, Array2};
    use ndarray_linalg::{Eigh as NdLinalgEigh, UPLO};
    use std::error::Error;

    #[derive(Debug, Default, Copy, Clone)]
    pub struct NdarrayLinAlgBackend;

    impl BackendEigh<f64> for NdarrayLinAlgBackend {
        fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput<f64>, Box<dyn Error + Send + Sync>> {
            check_square(matrix)?;
            if matrix.is_empty() {
                return Ok(EighOutput { eigenvalues: Array1::zeros(0), eigenvectors: Array2::zeros((0, 0)) });
            }
            let (eigenvalues, eigenvectors) = matrix
                .eigh(UPLO::Upper)
                .map_err(|e| -> Box<dyn Error + Send + Sync> { Box::new(e) })?;
            Ok(EighOutput { eigenvalues, eigenvectors })
        }
    }
}

#[cfg(feature = "lapack")]
pub use lapack_specific_code::NdarrayLinAlgBackend;

// --- faer backend ---
#[cfg(feature = "backend_faer")]
mod faer_specific_code {
    use super::{check_square, BackendEigh, EighOutput};
    use faer::{Mat, Side};
    use ndarray::{Array1, Array2};
    use std::error::Error;

    #[derive(Debug, Default, Copy, Clone)]
    pub struct FaerLinAlgBackend;

    impl BackendEigh<f64> for FaerLinAlgBackend {
        fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput<f64>, Box<dyn Error + Send + Sync>> {
            check_square(matrix)?;
            let n = matrix.nrows();
            if n == 0 {
                return Ok(EighOutput { eigenvalues: Array1::zeros(0), eigenvectors: Array2::zeros((0, 0)) });
            }
            // Copy into faer's column-major storage, mirroring the upper triangle
            // so the result does not depend on which side faer reads.
            let faer_mat = Mat::<f64>::from_fn(n, n, |i, j| {
                if i <= j { matrix[[i, j]] } else { matrix[[j, i]] }
            });
            let evd = faer_mat
                .as_ref()
                .self_adjoint_eigen(Side::Upper)
                .map_err(|e| -> Box<dyn Error + Send + Sync> {
                    format!("faer eigendecomposition failed: {:?}", e).into()
                })?;
            let s = evd.S().column_vector();
            let u = evd.U();
            let eigenvalues = Array1::from_shape_fn(n, |i| s[i]);
            let eigenvectors = Array2::from_shape_fn((n, n), |(i, j)| u[(i, j)]);
            Ok(EighOutput { eigenvalues, eigenvectors })
        }
    }
}

#[cfg(feature = "backend_faer")]
pub use faer_specific_code::FaerLinAlgBackend;

impl BackendEigh<f64> for LinAlgBackendProvider<f64> {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput<f64>, Box<dyn Error + Send + Sync>> {
        #[cfg(feature = "backend_faer")]
        {
            FaerLinAlgBackend.eigh_upper(matrix)
        }
        #[cfg(all(not(feature = "backend_faer"), feature = "lapack"))]
        {
            NdarrayLinAlgBackend.eigh_upper(matrix)
        }
    }
}
