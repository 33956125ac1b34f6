use pca_workbench::{
    Analysis, AnalyzerConfig, ComponentPolicy, Interaction, Outcome, PcaError, PlotData, Session,
};
use std::fs;
use std::path::PathBuf;

/// Answers every prompt from fixed values, recording what was shown.
struct Answers {
    input: Option<PathBuf>,
    components: Option<String>,
    output: Option<PathBuf>,
    shown: Vec<String>,
    errors: Vec<String>,
}

impl Interaction for Answers {
    fn select_input_file(&mut self) -> Option<PathBuf> {
        self.input.take()
    }
    fn request_component_count(&mut self, _max_components: usize) -> Option<String> {
        self.components.take()
    }
    fn select_output_file(&mut self) -> Option<PathBuf> {
        self.output.take()
    }
    fn show_analysis(&mut self, _analysis: &Analysis, summary: &str) {
        self.shown.push(summary.to_string());
    }
    fn report_error(&mut self, error: &PcaError) {
        self.errors.push(error.to_string());
    }
    fn confirm_saved(&mut self, _paths: &[PathBuf]) {}
}

const DATA: &str = "\
5.1,3.5,1.4,0.2
4.9,3.0,1.4,0.2
6.2,3.4,5.4,2.3
5.9,3.0,5.1,1.8
5.5,2.3,4.0,1.3
6.5,2.8,4.6,1.5
5.0,3.6,1.4,0.2
6.7,3.1,4.4,1.4
";

#[test]
fn full_run_writes_workbook_and_plot_data() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("iris.csv");
    fs::write(&input, DATA).unwrap();

    let session = Session::new(AnalyzerConfig {
        export_plot_data: true,
        ..AnalyzerConfig::default()
    });
    let mut ui = Answers {
        input: Some(input),
        components: Some("2".into()),
        output: Some(dir.path().join("iris_pca")),
        shown: Vec::new(),
        errors: Vec::new(),
    };

    let (analysis, exported) = match session.run_once(&mut ui) {
        Outcome::Completed { analysis, exported } => (analysis, exported),
        other => panic!("unexpected outcome {:?}", other),
    };
    assert!(ui.errors.is_empty(), "{:?}", ui.errors);
    assert!(ui.shown[0].starts_with("Eigenvalues:"));

    assert_eq!(exported[0], dir.path().join("iris_pca.xlsx"));
    assert_eq!(exported[1], dir.path().join("iris_pca.plot.json"));
    let plot: PlotData = serde_json::from_str(&fs::read_to_string(&exported[1]).unwrap()).unwrap();
    let expected = analysis.plot_data();
    for (read, want) in plot.variance_bars.iter().zip(&expected.variance_bars) {
        assert_eq!(read.component, want.component);
        assert!((read.percent - want.percent).abs() < 1e-9);
    }
    assert_eq!(plot.raw_points_3d.unwrap().len(), 8);
    assert_eq!(plot.score_points.unwrap().len(), 8);
    assert_eq!(plot.variance_bars.len(), 2);
}

#[test]
fn relaxed_column_minimum_accepts_two_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pairs.csv");
    fs::write(&input, "1.0,2.1\n2.0,3.9\n3.0,6.2\n4.0,7.8\n").unwrap();

    let session = Session::new(AnalyzerConfig {
        component_policy: ComponentPolicy::Fixed { components: 2 },
        min_columns: None,
        ..AnalyzerConfig::default()
    });
    let mut ui = Answers {
        input: Some(input),
        components: None,
        output: None,
        shown: Vec::new(),
        errors: Vec::new(),
    };
    match session.run_once(&mut ui) {
        Outcome::Completed { analysis, exported } => {
            assert!(exported.is_empty());
            assert!(analysis.plot_data().raw_points_3d.is_none());
            assert_eq!(analysis.result.n_components(), 2);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn unreadable_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = Answers {
        input: Some(dir.path().join("missing.csv")),
        components: None,
        output: None,
        shown: Vec::new(),
        errors: Vec::new(),
    };
    assert!(matches!(
        Session::default().run_once(&mut ui),
        Outcome::Failed(PcaError::Load { .. })
    ));
    assert_eq!(ui.errors.len(), 1);
    assert!(ui.shown.is_empty());
}
