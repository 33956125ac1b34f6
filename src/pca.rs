// Principal component analysis (PCA)

use crate::error::{PcaError, Result};
use crate::linalg_backends::{BackendEigh, LinAlgBackendProvider};
use crate::table::NumericTable;
use log::{debug, info, warn};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;

/// Eigenvalues at or below this fraction of the largest one are treated as exactly zero.
const ZERO_EIGENVALUE_RTOL: f64 = 1e-10;

/// The outcome of one PCA run over a validated table.
///
/// Immutable once computed: every field is reachable through a read-only
/// accessor only, and a new table needs a new call to [`compute`].
#[derive(Debug, Clone, Serialize)]
pub struct PcaResult {
    /// Input rows projected onto the principal axes.
    /// Shape: (n_rows, k_components)
    scores: Array2<f64>,
    /// Variance captured by each axis, descending, non-negative.
    /// Shape: (k_components)
    eigenvalues: Array1<f64>,
    /// Unit-norm principal axes, one per row, in the original coordinates.
    /// Shape: (k_components, n_features)
    eigenvectors: Array2<f64>,
    /// Each eigenvalue divided by the total variance of the input.
    /// Shape: (k_components)
    explained_variance_ratio: Array1<f64>,
    /// Column means subtracted before projection.
    /// Shape: (n_features)
    mean: Array1<f64>,
    /// Sum of all eigenvalues of the full covariance structure.
    total_variance: f64,
}

impl PcaResult {
    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// Loadings, shape (k_components, n_features); row i is principal axis i.
    pub fn eigenvectors(&self) -> &Array2<f64> {
        &self.eigenvectors
    }

    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn total_variance(&self) -> f64 {
        self.total_variance
    }

    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Running sum of the explained variance ratio.
    pub fn cumulative_explained_variance(&self) -> Array1<f64> {
        let mut acc = 0.0;
        self.explained_variance_ratio.mapv(|r| {
            acc += r;
            acc
        })
    }

    /// Projects new rows onto the fitted principal axes.
    ///
    /// * `x` - Rows to project, shape (m_samples, n_features).
    ///
    /// # Errors
    /// Returns `PcaError::Computation` if the column count does not match the
    /// data the result was computed from.
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(PcaError::computation(format!(
                "input has {} columns but the decomposition was computed on {}",
                x.ncols(),
                self.n_features()
            )));
        }
        let centered = &x - &self.mean;
        Ok(centered.dot(&self.eigenvectors.t()))
    }
}

/// Computes the `k` leading principal components of `table`.
///
/// Columns are centered on their means (not scaled), the sample covariance
/// (`n - 1` denominator) is eigendecomposed, and the centered rows are
/// projected onto the `k` axes of largest eigenvalue.
///
/// When the table has more columns than rows, the rows×rows Gram matrix is
/// decomposed instead and its eigenvectors are mapped back into feature space.
/// Its non-zero eigenvalues are the same as those of the covariance matrix.
///
/// Each axis is oriented so that its largest-magnitude loading is positive.
///
/// # Errors
/// Returns `PcaError::Computation` if `k` is outside `1..=n_cols`, the table has
/// fewer than 2 rows, all columns are constant, `k` exceeds the rank available
/// on the Gram path, or the eigendecomposition fails.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use pca_workbench::{compute, validate_array, ValidationPolicy};
///
/// let table = validate_array(
///     array![[1.0, 2.0, 0.5], [2.0, 4.1, 0.4], [3.0, 6.2, 0.6], [4.0, 7.9, 0.5]],
///     &ValidationPolicy::default(),
/// )
/// .unwrap();
/// let result = compute(&table, 2).unwrap();
/// assert_eq!(result.scores().dim(), (4, 2));
/// assert!(result.eigenvalues()[0] >= result.eigenvalues()[1]);
/// ```
pub fn compute(table: &NumericTable, k: usize) -> Result<PcaResult> {
    compute_with_backend(table, k, &LinAlgBackendProvider::<f64>::new())
}

/// [`compute`] with an explicit eigendecomposition backend.
pub fn compute_with_backend<B: BackendEigh<f64>>(
    table: &NumericTable,
    k: usize,
    backend: &B,
) -> Result<PcaResult> {
    let data = table.view();
    let (n_samples, n_features) = data.dim();

    if k == 0 || k > n_features {
        return Err(PcaError::computation(format!(
            "requested {} components, but only 1..={} are possible for this table",
            k, n_features
        )));
    }
    if n_samples < 2 {
        return Err(PcaError::computation(format!(
            "at least 2 rows are required, found {}",
            n_samples
        )));
    }

    // Centering a constant column leaves rounding residue, so zero spread is
    // decided on the raw values.
    if data.columns().into_iter().all(|col| is_constant(col)) {
        return Err(PcaError::computation(
            "the table has zero total variance (every column is constant)",
        ));
    }

    let mean_vector = data
        .mean_axis(Axis(0))
        .ok_or_else(|| PcaError::computation("failed to compute column means"))?;
    let centered = &data - &mean_vector;
    let denom = (n_samples - 1) as f64;

    let (eigenvalues, rotation, total_variance) = if n_features <= n_samples {
        covariance_axes(&centered, k, denom, backend)?
    } else {
        gram_axes(&centered, k, denom, backend)?
    };

    let mut rotation = rotation;
    orient_axes(&mut rotation);

    let scores = centered.dot(&rotation);
    let explained_variance_ratio = eigenvalues.mapv(|v| v / total_variance);
    let eigenvectors = rotation.t().to_owned();

    info!(
        "Computed {} of {} components on {}x{} table, explained variance {:.4}",
        k,
        n_features,
        n_samples,
        n_features,
        explained_variance_ratio.sum()
    );

    Ok(PcaResult {
        scores,
        eigenvalues,
        eigenvectors,
        explained_variance_ratio,
        mean: mean_vector,
        total_variance,
    })
}

/// Sorted, clamped eigenpairs of a symmetric matrix.
struct SortedEigen {
    values: Vec<f64>,
    vectors: Vec<Array1<f64>>,
}

fn sorted_eigenpairs<B: BackendEigh<f64>>(
    matrix: &Array2<f64>,
    backend: &B,
    label: &str,
) -> Result<SortedEigen> {
    let out = backend.eigh_upper(matrix).map_err(|e| {
        PcaError::computation(format!("eigendecomposition of the {} matrix failed: {}", label, e))
    })?;
    if out.eigenvalues.iter().any(|v| !v.is_finite())
        || out.eigenvectors.iter().any(|v| !v.is_finite())
    {
        return Err(PcaError::computation(format!(
            "eigendecomposition of the {} matrix produced non-finite values",
            label
        )));
    }

    let mut eig_pairs: Vec<(f64, Array1<f64>)> = out
        .eigenvalues
        .into_iter()
        .zip(out.eigenvectors.columns().into_iter().map(|col| col.to_owned()))
        .collect();
    // Stable sort: tied eigenvalues keep the backend's order.
    eig_pairs.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let largest = eig_pairs.first().map_or(0.0, |(v, _)| *v).max(0.0);
    let threshold = largest * ZERO_EIGENVALUE_RTOL;
    let (values, vectors) = eig_pairs
        .into_iter()
        .map(|(v, vec)| (if v <= threshold { 0.0 } else { v }, vec))
        .unzip();
    Ok(SortedEigen { values, vectors })
}

fn total_of(values: &[f64]) -> Result<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(PcaError::computation(
            "the table has zero total variance (every column is constant)",
        ));
    }
    Ok(total)
}

/// (A) features×features covariance. Returns (eigenvalues, rotation (n_features × k), total).
fn covariance_axes<B: BackendEigh<f64>>(
    centered: &Array2<f64>,
    k: usize,
    denom: f64,
    backend: &B,
) -> Result<(Array1<f64>, Array2<f64>, f64)> {
    let mut cov_matrix = centered.t().dot(centered);
    cov_matrix /= denom;
    debug!("Decomposing {}x{} covariance matrix", cov_matrix.nrows(), cov_matrix.ncols());

    let eig = sorted_eigenpairs(&cov_matrix, backend, "covariance")?;
    let total_variance = total_of(&eig.values)?;

    let n_features = centered.ncols();
    let mut rotation = Array2::<f64>::zeros((n_features, k));
    for i in 0..k {
        let mut axis = eig.vectors[i].clone();
        let norm = axis.dot(&axis).sqrt();
        if norm <= 1e-12 {
            return Err(PcaError::computation(format!(
                "principal axis {} has zero length",
                i + 1
            )));
        }
        axis.mapv_inplace(|x| x / norm);
        rotation.slice_mut(s![.., i]).assign(&axis);
    }
    let zero_axes = eig.values[..k].iter().filter(|v| **v == 0.0).count();
    if zero_axes > 0 {
        warn!("{} of the {} requested components capture no variance", zero_axes, k);
    }
    Ok((Array1::from(eig.values[..k].to_vec()), rotation, total_variance))
}

/// (B) Gram trick: samples×samples matrix, axes mapped back with Xᵀu / sqrt(λ(n-1)).
fn gram_axes<B: BackendEigh<f64>>(
    centered: &Array2<f64>,
    k: usize,
    denom: f64,
    backend: &B,
) -> Result<(Array1<f64>, Array2<f64>, f64)> {
    let mut gram_matrix = centered.dot(&centered.t());
    gram_matrix /= denom;
    debug!("Decomposing {}x{} Gram matrix", gram_matrix.nrows(), gram_matrix.ncols());

    let eig = sorted_eigenpairs(&gram_matrix, backend, "Gram")?;
    let total_variance = total_of(&eig.values)?;

    let rank = eig.values.iter().filter(|v| **v > 0.0).count();
    if k > rank {
        return Err(PcaError::computation(format!(
            "requested {} components but the data has rank {} ({} rows, {} columns)",
            k,
            rank,
            centered.nrows(),
            centered.ncols()
        )));
    }

    let mut rotation = Array2::<f64>::zeros((centered.ncols(), k));
    for i in 0..k {
        let lam_sqrt = eig.values[i].sqrt();
        let mut axis = centered.t().dot(&eig.vectors[i]);
        axis.mapv_inplace(|x| x / (lam_sqrt * denom.sqrt()));
        // Re-normalise against rounding in the mapping.
        let norm = axis.dot(&axis).sqrt();
        if norm <= 1e-12 {
            return Err(PcaError::computation(format!(
                "principal axis {} has zero length",
                i + 1
            )));
        }
        axis.mapv_inplace(|x| x / norm);
        rotation.slice_mut(s![.., i]).assign(&axis);
    }
    Ok((Array1::from(eig.values[..k].to_vec()), rotation, total_variance))
}

fn is_constant(col: ArrayView1<'_, f64>) -> bool {
    match col.first() {
        Some(&first) => col.iter().all(|&x| x == first),
        None => true,
    }
}

/// Flips each axis (column) so that its largest-magnitude entry is positive.
fn orient_axes(rotation: &mut Array2<f64>) {
    for mut axis in rotation.columns_mut() {
        if let Some(pivot) = largest_magnitude(axis.view()) {
            if pivot < 0.0 {
                axis.mapv_inplace(|x| -x);
            }
        }
    }
}

fn largest_magnitude(v: ArrayView1<'_, f64>) -> Option<f64> {
    v.iter().copied().fold(None, |best, x| match best {
        Some(b) if x.abs() <= f64::abs(b) => Some(b),
        _ => Some(x),
    })
}
