// src/report.rs

//! Presentation-ready views of a [`PcaResult`]: text summaries and the plain
//! arrays a plotting surface needs.

use crate::pca::PcaResult;
use crate::table::NumericTable;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Values joined by ", ", each with `decimals` places.
pub fn format_values(values: ArrayView1<'_, f64>, decimals: usize) -> String {
    values
        .iter()
        .map(|v| format!("{:.*}", decimals, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per row, entries separated by two spaces.
pub fn format_matrix(values: ArrayView2<'_, f64>, decimals: usize) -> String {
    values
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .map(|v| format!("{:.*}", decimals, v))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Eigenvalues, eigenvectors and explained variance as a block of text.
pub fn eigen_summary(result: &PcaResult, decimals: usize) -> String {
    let variance_lines: String = variance_bars(result)
        .iter()
        .map(|bar| format!("  PC{}: {:.2}%\n", bar.component, bar.percent))
        .collect();
    format!(
        "Eigenvalues:\n{}\n\nEigenvectors:\n{}\n\nExplained variance:\n{}  total: {:.2}%",
        format_values(result.eigenvalues().view(), decimals),
        format_matrix(result.eigenvectors().view(), decimals),
        variance_lines,
        result.explained_variance_ratio().sum() * 100.0
    )
}

/// Which side of the first principal axis a projected point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Positive,
    NonPositive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub pc1: f64,
    pub pc2: f64,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceBar {
    /// 1-based component index.
    pub component: usize,
    pub percent: f64,
}

/// Everything a plotting surface draws for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    /// First three input columns, absent for narrower tables.
    pub raw_points_3d: Option<Vec<[f64; 3]>>,
    /// Scores on PC1/PC2, absent when fewer than two components were kept.
    pub score_points: Option<Vec<ScorePoint>>,
    pub variance_bars: Vec<VarianceBar>,
}

impl PlotData {
    pub fn new(table: &NumericTable, result: &PcaResult) -> Self {
        Self {
            raw_points_3d: table.first_three_columns(),
            score_points: score_points(result),
            variance_bars: variance_bars(result),
        }
    }
}

fn score_points(result: &PcaResult) -> Option<Vec<ScorePoint>> {
    let scores = result.scores();
    if scores.ncols() < 2 {
        return None;
    }
    Some(
        scores
            .axis_iter(Axis(0))
            .map(|row| ScorePoint {
                pc1: row[0],
                pc2: row[1],
                side: if row[0] > 0.0 { Side::Positive } else { Side::NonPositive },
            })
            .collect(),
    )
}

pub fn variance_bars(result: &PcaResult) -> Vec<VarianceBar> {
    result
        .explained_variance_ratio()
        .iter()
        .enumerate()
        .map(|(i, r)| VarianceBar {
            component: i + 1,
            percent: r * 100.0,
        })
        .collect()
}
