use anyhow::{Context, Result};
use pca_workbench::{Analysis, AnalyzerConfig, Interaction, Outcome, PcaError, Session};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const CONFIG_FILE: &str = "pca_workbench.json";

/// Line-oriented stand-in for the file pickers and message boxes.
struct TerminalInteraction<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalInteraction<R, W> {
    /// Prints `prompt` and reads one line. Blank lines and end of input count as cancel.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        write!(self.output, "{}", prompt).ok()?;
        self.output.flush().ok()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.to_string())
                }
            }
        }
    }

    fn say(&mut self, text: &str) {
        // A closed terminal leaves nobody to tell.
        let _ = writeln!(self.output, "{}", text);
    }
}

impl<R: BufRead, W: Write> Interaction for TerminalInteraction<R, W> {
    fn select_input_file(&mut self) -> Option<PathBuf> {
        self.ask("\nCSV file to analyze (blank to quit): ").map(PathBuf::from)
    }

    fn request_component_count(&mut self, max_components: usize) -> Option<String> {
        self.ask(&format!("Number of principal components (1-{}): ", max_components))
    }

    fn select_output_file(&mut self) -> Option<PathBuf> {
        self.ask("Save transformed data to (.xlsx, blank to skip): ").map(PathBuf::from)
    }

    fn show_analysis(&mut self, analysis: &Analysis, summary: &str) {
        self.say(&format!(
            "\nPCA of {} ({} rows x {} columns)\n",
            analysis.source.display(),
            analysis.table.n_rows(),
            analysis.table.n_cols()
        ));
        self.say(summary);
    }

    fn report_error(&mut self, error: &PcaError) {
        self.say(&format!("Error: {}", error));
    }

    fn confirm_saved(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.say(&format!("Saved {}", path.display()));
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = AnalyzerConfig::load_or_default(CONFIG_FILE)
        .with_context(|| format!("reading {}", CONFIG_FILE))?;
    let session = Session::new(config);

    let stdin = io::stdin();
    let mut ui = TerminalInteraction {
        input: stdin.lock(),
        output: io::stdout(),
    };
    ui.say("PCA workbench");

    loop {
        match session.run_once(&mut ui) {
            Outcome::Closed => break,
            Outcome::Cancelled => ui.say("Cancelled."),
            Outcome::Failed(_) | Outcome::Completed { .. } => {}
        }
    }
    Ok(())
}
