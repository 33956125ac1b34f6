// src/export.rs

use crate::error::{PcaError, Result};
use crate::pca::PcaResult;
use crate::report::PlotData;
use crate::table::NumericTable;
use log::info;
use rust_xlsxwriter::{Chart, ChartType, Color, Format, Workbook, Worksheet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const SCORES_SHEET: &str = "Transformed Data";
pub const VARIANCE_SHEET: &str = "Explained Variance";

/// Fill applied to the PC1/PC2 score columns.
const HIGHLIGHT_RGB: u32 = 0xFFFF99;

/// Persists one analysis to a destination path.
pub trait Exporter {
    /// Writes the results and returns the path actually written, which may
    /// differ from `path` when a default extension is added.
    fn export(&self, table: &NumericTable, result: &PcaResult, path: &Path) -> Result<PathBuf>;
}

/// Appends `.extension` when `path` has none.
pub fn with_default_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}

/// Rounds half away from zero. Values that cannot be scaled exactly are returned unchanged.
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Excel workbook with a scores sheet and an explained-variance sheet with a bar chart.
#[derive(Debug, Clone, Copy)]
pub struct WorkbookExporter {
    pub score_decimals: u32,
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        Self { score_decimals: 3 }
    }
}

impl WorkbookExporter {
    fn write_scores(&self, worksheet: &mut Worksheet, result: &PcaResult) -> std::result::Result<(), String> {
        let scores = result.scores();
        let (n_rows, k) = scores.dim();
        let eigen_col = u16::try_from(k).map_err(|_| format!("{} components do not fit in a sheet", k))?;
        if u32::try_from(n_rows).map_or(true, |n| n >= 1_048_576) {
            return Err(format!("{} rows do not fit in a sheet", n_rows));
        }

        let header = Format::new().set_bold();
        let highlight = Format::new().set_background_color(Color::RGB(HIGHLIGHT_RGB));
        let e = |err: rust_xlsxwriter::XlsxError| err.to_string();

        worksheet.set_name(SCORES_SHEET).map_err(e)?;
        for j in 0..k {
            worksheet
                .write_string_with_format(0, j as u16, &format!("PC{}", j + 1), &header)
                .map_err(e)?;
        }
        worksheet
            .write_string_with_format(0, eigen_col, &format!("Eigenvalues (PC1-PC{})", k), &header)
            .map_err(e)?;

        for ((i, j), &v) in scores.indexed_iter() {
            let (row, col) = (i as u32 + 1, j as u16);
            let value = round_to(v, self.score_decimals);
            if j < 2 {
                worksheet.write_number_with_format(row, col, value, &highlight).map_err(e)?;
            } else {
                worksheet.write_number(row, col, value).map_err(e)?;
            }
        }
        for (i, eigenvalue) in result.eigenvalues().iter().enumerate().take(n_rows) {
            worksheet
                .write_string(i as u32 + 1, eigen_col, &format!("PC{}: {:.4}", i + 1, eigenvalue))
                .map_err(e)?;
        }
        Ok(())
    }

    fn write_variance(&self, worksheet: &mut Worksheet, result: &PcaResult) -> std::result::Result<(), String> {
        let ratios = result.explained_variance_ratio();
        let header = Format::new().set_bold();
        let e = |err: rust_xlsxwriter::XlsxError| err.to_string();

        worksheet.set_name(VARIANCE_SHEET).map_err(e)?;
        worksheet.write_string_with_format(0, 0, "Component", &header).map_err(e)?;
        worksheet.write_string_with_format(0, 1, "Explained Variance", &header).map_err(e)?;
        for (i, &ratio) in ratios.iter().enumerate() {
            let row = i as u32 + 1;
            worksheet.write_number(row, 0, (i + 1) as f64).map_err(e)?;
            worksheet.write_number(row, 1, ratio).map_err(e)?;
        }

        let last_row = ratios.len() as u32;
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_categories((VARIANCE_SHEET, 1, 0, last_row, 0))
            .set_values((VARIANCE_SHEET, 1, 1, last_row, 1));
        chart.title().set_name("Explained Variance by Component");
        chart.x_axis().set_name("Principal Component");
        chart.y_axis().set_name("Explained Variance Ratio");
        worksheet.insert_chart(4, 4, &chart).map_err(e)?;
        Ok(())
    }
}

impl Exporter for WorkbookExporter {
    fn export(&self, _table: &NumericTable, result: &PcaResult, path: &Path) -> Result<PathBuf> {
        let path = with_default_extension(path, "xlsx");
        let mut workbook = Workbook::new();

        self.write_scores(workbook.add_worksheet(), result)
            .map_err(|reason| PcaError::write(&path, reason))?;
        self.write_variance(workbook.add_worksheet(), result)
            .map_err(|reason| PcaError::write(&path, reason))?;

        workbook.save(&path).map_err(|e| PcaError::write(&path, e))?;
        info!(
            "Wrote {} scores x {} components to {}",
            result.scores().nrows(),
            result.n_components(),
            path.display()
        );
        Ok(path)
    }
}

/// Pretty-printed JSON of [`PlotData`] for an external plotting surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotDataExporter;

impl Exporter for PlotDataExporter {
    fn export(&self, table: &NumericTable, result: &PcaResult, path: &Path) -> Result<PathBuf> {
        let path = with_default_extension(path, "json");
        let file = File::create(&path).map_err(|e| PcaError::write(&path, e))?;
        let plot = PlotData::new(table, result);
        serde_json::to_writer_pretty(BufWriter::new(file), &plot)
            .map_err(|e| PcaError::write(&path, e))?;
        info!("Wrote plot data to {}", path.display());
        Ok(path)
    }
}

/// Where the plot data goes when it accompanies a workbook: `<stem>.plot.json`.
pub fn plot_data_path(workbook_path: &Path) -> PathBuf {
    workbook_path.with_extension("plot.json")
}
