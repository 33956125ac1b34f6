// src/table.rs

use crate::error::{PcaError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;

/// Text cells exactly as the loader read them. All rows have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
    n_cols: usize,
}

impl RawTable {
    /// Builds a table from rows of cells. Fails with a description if the rows
    /// are not all the same length.
    pub fn from_rows(rows: Vec<Vec<String>>) -> std::result::Result<Self, String> {
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                n_cols
            ));
        }
        Ok(Self { rows, n_cols })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
}

/// A validated table of finite reals, shape (n_rows, n_cols).
///
/// The only way to obtain one is through [`validate`] or [`validate_array`],
/// so every instance holds finite values only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericTable {
    data: Array2<f64>,
}

impl NumericTable {
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// The first three columns as points, if the table has that many.
    pub fn first_three_columns(&self) -> Option<Vec<[f64; 3]>> {
        if self.n_cols() < 3 {
            return None;
        }
        Some(
            self.data
                .axis_iter(Axis(0))
                .map(|row| [row[0], row[1], row[2]])
                .collect(),
        )
    }
}

/// Rules applied by validation beyond "every cell is a finite number".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Minimum number of columns, `None` to accept any width.
    pub min_columns: Option<usize>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_columns: Some(3),
        }
    }
}

/// Parses and checks a raw table.
///
/// Cells must parse as finite `f64` values; the column minimum of `policy`
/// is checked afterwards.
///
/// # Errors
/// * `PcaError::NonNumericInput` for the first cell (row-major) that is not a finite real.
/// * `PcaError::InsufficientColumns` if the table is narrower than `policy.min_columns`.
pub fn validate(raw: &RawTable, policy: &ValidationPolicy) -> Result<NumericTable> {
    let (n_rows, n_cols) = (raw.n_rows(), raw.n_cols());
    let mut values = Vec::with_capacity(n_rows * n_cols);
    for (row_idx, row) in raw.rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let token = cell.trim();
            match token.parse::<f64>() {
                Ok(v) if v.is_finite() => values.push(v),
                _ => {
                    return Err(PcaError::NonNumericInput {
                        row: row_idx,
                        column: col_idx,
                        token: cell.clone(),
                    })
                }
            }
        }
    }
    let data = Array2::from_shape_vec((n_rows, n_cols), values)
        .map_err(|e| PcaError::computation(format!("failed to shape table: {}", e)))?;
    check_columns(n_cols, policy)?;
    Ok(NumericTable { data })
}

/// Checks an array that is already numeric, rejecting NaN and infinities.
pub fn validate_array(data: Array2<f64>, policy: &ValidationPolicy) -> Result<NumericTable> {
    if let Some(((row, column), v)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PcaError::NonNumericInput {
            row,
            column,
            token: v.to_string(),
        });
    }
    check_columns(data.ncols(), policy)?;
    Ok(NumericTable { data })
}

fn check_columns(found: usize, policy: &ValidationPolicy) -> Result<()> {
    match policy.min_columns {
        Some(required) if found < required => {
            Err(PcaError::InsufficientColumns { found, required })
        }
        _ => Ok(()),
    }
}
