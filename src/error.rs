// src/error.rs

use thiserror::Error;

/// Every failure the workbench can report to a user.
///
/// Variants map one-to-one onto the stages of an analysis run: loading the
/// file, validating its cells, choosing a component count, computing the
/// decomposition and writing the results. None of them are retried.
#[derive(Debug, Error)]
pub enum PcaError {
    /// The input file could not be read or parsed as delimited text.
    #[error("failed to load data from {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    /// A cell is not a finite real number.
    #[error("the file must contain only numeric data: cell at row {row}, column {column} is {token:?}")]
    NonNumericInput {
        row: usize,
        column: usize,
        token: String,
    },

    #[error("the table must have at least {required} columns, found {found}")]
    InsufficientColumns { found: usize, required: usize },

    #[error("{input:?} is not a valid integer")]
    NotAnInteger { input: String },

    #[error("the number of components must be between 1 and {max}, got {value}")]
    OutOfRange { value: i64, max: usize },

    /// Any numerical failure of the decomposition, including invalid component counts.
    #[error("PCA computation failed: {0}")]
    Computation(String),

    #[error("failed to write results to {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: String, reason: String },
}

impl PcaError {
    pub(crate) fn computation<S: Into<String>>(msg: S) -> Self {
        PcaError::Computation(msg.into())
    }

    pub(crate) fn write<P: AsRef<std::path::Path>, E: std::fmt::Display>(path: P, err: E) -> Self {
        PcaError::Write {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PcaError>;
