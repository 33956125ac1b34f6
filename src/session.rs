// src/session.rs

use crate::components::resolve_component_count;
use crate::config::AnalyzerConfig;
use crate::error::{PcaError, Result};
use crate::export::{plot_data_path, Exporter, PlotDataExporter, WorkbookExporter};
use crate::loader::load_csv;
use crate::pca::{compute, PcaResult};
use crate::report::{eigen_summary, PlotData};
use crate::table::{validate, NumericTable, ValidationPolicy};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// The user-facing side of a run: pickers, prompts and messages.
///
/// Every method blocks until the user answers. `None` always means the user
/// cancelled.
pub trait Interaction {
    fn select_input_file(&mut self) -> Option<PathBuf>;
    /// Returns the raw text typed for the component count (1..=`max_components`).
    fn request_component_count(&mut self, max_components: usize) -> Option<String>;
    fn select_output_file(&mut self) -> Option<PathBuf>;
    fn show_analysis(&mut self, analysis: &Analysis, summary: &str);
    fn report_error(&mut self, error: &PcaError);
    fn confirm_saved(&mut self, paths: &[PathBuf]);
}

/// A loaded table together with its decomposition.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: PathBuf,
    pub table: NumericTable,
    pub result: PcaResult,
}

impl Analysis {
    pub fn plot_data(&self) -> PlotData {
        PlotData::new(&self.table, &self.result)
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// No input file was selected.
    Closed,
    /// The user backed out of the component prompt.
    Cancelled,
    /// The run stopped on an error, which has already been reported.
    Failed(PcaError),
    /// `exported` lists the files written, empty if the user skipped saving
    /// or nothing could be written.
    Completed {
        analysis: Analysis,
        exported: Vec<PathBuf>,
    },
}

/// What [`Session::export`] wrote before finishing or failing.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub error: Option<PcaError>,
}

/// Runs analyses with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: AnalyzerConfig,
}

impl Session {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            min_columns: self.config.min_columns,
        }
    }

    /// Load, validate, choose the component count and compute.
    ///
    /// Returns `Ok(None)` if the component prompt was cancelled.
    pub fn analyze_file<F>(&self, path: &Path, prompt: F) -> Result<Option<Analysis>>
    where
        F: FnOnce(usize) -> Option<String>,
    {
        let raw = load_csv(path)?;
        let table = validate(&raw, &self.validation_policy())?;
        let k = match resolve_component_count(self.config.component_policy, table.n_cols(), prompt)? {
            Some(k) => k,
            None => return Ok(None),
        };
        let result = compute(&table, k)?;
        Ok(Some(Analysis {
            source: path.to_path_buf(),
            table,
            result,
        }))
    }

    /// Writes the workbook, plus the plot data if configured.
    ///
    /// Stops at the first failure. Files saved before it are still listed in
    /// the report.
    pub fn export(&self, analysis: &Analysis, path: &Path) -> ExportReport {
        let mut report = ExportReport::default();
        let exporter = WorkbookExporter {
            score_decimals: self.config.score_decimals,
        };
        let workbook = match exporter.export(&analysis.table, &analysis.result, path) {
            Ok(workbook) => workbook,
            Err(err) => {
                report.error = Some(err);
                return report;
            }
        };
        let plot_path = plot_data_path(&workbook);
        report.written.push(workbook);
        if self.config.export_plot_data {
            match PlotDataExporter.export(&analysis.table, &analysis.result, &plot_path) {
                Ok(plot) => report.written.push(plot),
                Err(err) => report.error = Some(err),
            }
        }
        report
    }

    /// One pass of: pick file → validate → component count → compute → show → optionally save.
    pub fn run_once(&self, ui: &mut dyn Interaction) -> Outcome {
        let Some(path) = ui.select_input_file() else {
            return Outcome::Closed;
        };
        info!("Analyzing {}", path.display());

        let analysis = match self.analyze_file(&path, |max| ui.request_component_count(max)) {
            Ok(Some(analysis)) => analysis,
            Ok(None) => return Outcome::Cancelled,
            Err(err) => {
                warn!("Analysis of {} failed: {}", path.display(), err);
                ui.report_error(&err);
                return Outcome::Failed(err);
            }
        };

        let summary = eigen_summary(&analysis.result, self.config.summary_decimals);
        ui.show_analysis(&analysis, &summary);

        let mut exported = Vec::new();
        if let Some(out_path) = ui.select_output_file() {
            let report = self.export(&analysis, &out_path);
            if !report.written.is_empty() {
                ui.confirm_saved(&report.written);
            }
            if let Some(err) = &report.error {
                warn!("Export to {} failed: {}", out_path.display(), err);
                ui.report_error(err);
            }
            exported = report.written;
        }
        Outcome::Completed { analysis, exported }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentPolicy;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Scripted {
        inputs: VecDeque<Option<PathBuf>>,
        components: VecDeque<Option<String>>,
        outputs: VecDeque<Option<PathBuf>>,
        prompted_max: Vec<usize>,
        errors: Vec<String>,
        summaries: Vec<String>,
        saved: Vec<PathBuf>,
    }

    impl Interaction for Scripted {
        fn select_input_file(&mut self) -> Option<PathBuf> {
            self.inputs.pop_front().flatten()
        }
        fn request_component_count(&mut self, max_components: usize) -> Option<String> {
            self.prompted_max.push(max_components);
            self.components.pop_front().flatten()
        }
        fn select_output_file(&mut self) -> Option<PathBuf> {
            self.outputs.pop_front().flatten()
        }
        fn show_analysis(&mut self, _analysis: &Analysis, summary: &str) {
            self.summaries.push(summary.to_string());
        }
        fn report_error(&mut self, error: &PcaError) {
            self.errors.push(error.to_string());
        }
        fn confirm_saved(&mut self, paths: &[PathBuf]) {
            self.saved.extend_from_slice(paths);
        }
    }

    fn write_csv(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    const DATA: &str = "2.5,2.4,1.2,0.1\n0.5,0.7,0.3,0.4\n2.2,2.9,1.1,0.2\n1.9,2.2,0.8,0.9\n3.1,3.0,1.6,0.3\n2.3,2.7,1.0,0.6\n";

    #[test]
    fn cancelled_file_selection() {
        let mut ui = Scripted::default();
        ui.inputs.push_back(None);
        assert!(matches!(Session::default().run_once(&mut ui), Outcome::Closed));
    }

    #[test]
    fn prompted_run_computes_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "data.csv", DATA);
        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(input));
        ui.components.push_back(Some("3".into()));
        ui.outputs.push_back(Some(dir.path().join("out")));

        let outcome = Session::default().run_once(&mut ui);
        match outcome {
            Outcome::Completed { analysis, exported } => {
                assert_eq!(analysis.result.scores().dim(), (6, 3));
                assert_eq!(exported, vec![dir.path().join("out.xlsx")]);
                assert!(exported[0].exists());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(ui.prompted_max, vec![4]);
        assert!(ui.errors.is_empty());
        assert_eq!(ui.summaries.len(), 1);
        assert_eq!(ui.saved.len(), 1);
    }

    #[test]
    fn fixed_policy_skips_prompt_and_writes_plot_data() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "data.csv", DATA);
        let session = Session::new(AnalyzerConfig {
            component_policy: ComponentPolicy::Fixed { components: 2 },
            export_plot_data: true,
            ..AnalyzerConfig::default()
        });
        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(input));
        ui.outputs.push_back(Some(dir.path().join("out.xlsx")));

        match session.run_once(&mut ui) {
            Outcome::Completed { analysis, exported } => {
                assert_eq!(analysis.result.n_components(), 2);
                assert_eq!(exported.len(), 2);
                assert!(dir.path().join("out.plot.json").exists());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(ui.prompted_max.is_empty());
    }

    #[test]
    fn bad_component_text_is_reported_without_result() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "data.csv", DATA);
        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(input));
        ui.components.push_back(Some("abc".into()));

        let outcome = Session::default().run_once(&mut ui);
        assert!(matches!(outcome, Outcome::Failed(PcaError::NotAnInteger { .. })));
        assert_eq!(ui.errors.len(), 1);
        assert!(ui.summaries.is_empty());
    }

    #[test]
    fn cancelled_component_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "data.csv", DATA);
        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(input));
        ui.components.push_back(None);
        assert!(matches!(Session::default().run_once(&mut ui), Outcome::Cancelled));
        assert!(ui.errors.is_empty());
    }

    #[test]
    fn narrow_and_non_numeric_files_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let narrow = write_csv(&dir, "narrow.csv", "1,2\n3,4\n5,7\n");
        let text = write_csv(&dir, "text.csv", "1,2,3\n4,five,6\n");

        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(narrow));
        assert!(matches!(
            Session::default().run_once(&mut ui),
            Outcome::Failed(PcaError::InsufficientColumns { found: 2, required: 3 })
        ));

        ui.inputs.push_back(Some(text));
        assert!(matches!(
            Session::default().run_once(&mut ui),
            Outcome::Failed(PcaError::NonNumericInput { .. })
        ));
        assert_eq!(ui.errors.len(), 2);
        assert!(ui.prompted_max.is_empty());
    }

    #[test]
    fn failed_export_still_returns_the_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "data.csv", DATA);
        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(input));
        ui.components.push_back(Some("2".into()));
        ui.outputs.push_back(Some(dir.path().join("no-such-dir").join("out.xlsx")));

        match Session::default().run_once(&mut ui) {
            Outcome::Completed { exported, .. } => assert!(exported.is_empty()),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(ui.errors.len(), 1);
        assert!(ui.saved.is_empty());
    }

    #[test]
    fn workbook_is_reported_when_plot_data_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "data.csv", DATA);
        fs::create_dir(dir.path().join("out.plot.json")).unwrap();
        let session = Session::new(AnalyzerConfig {
            export_plot_data: true,
            ..AnalyzerConfig::default()
        });
        let mut ui = Scripted::default();
        ui.inputs.push_back(Some(input));
        ui.components.push_back(Some("2".into()));
        ui.outputs.push_back(Some(dir.path().join("out.xlsx")));

        match session.run_once(&mut ui) {
            Outcome::Completed { exported, .. } => {
                assert_eq!(exported, vec![dir.path().join("out.xlsx")]);
                assert!(exported[0].is_file());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(ui.saved, vec![dir.path().join("out.xlsx")]);
        assert_eq!(ui.errors.len(), 1);
    }
}
