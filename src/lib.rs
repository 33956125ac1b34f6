// Principal component analysis workbench

#![doc = include_str!("../README.md")]

pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod linalg_backends;
pub mod loader;
pub mod pca;
pub mod report;
pub mod session;
pub mod table;

pub use components::{component_count_prompt_validate, resolve_component_count};
pub use config::{AnalyzerConfig, ComponentPolicy};
pub use error::{PcaError, Result};
pub use export::{Exporter, PlotDataExporter, WorkbookExporter};
pub use loader::{load_csv, load_csv_from_reader};
pub use pca::{compute, compute_with_backend, PcaResult};
pub use report::{eigen_summary, PlotData};
pub use session::{Analysis, ExportReport, Interaction, Outcome, Session};
pub use table::{validate, validate_array, NumericTable, RawTable, ValidationPolicy};
