// Compiles IAC energy-savings recommendation documents into one assessment
// report.
//
// A run reads every recommendation document, orders and numbers them by
// payback, computes the portfolio figures, restyles numbered copies and
// assembles the final report from the report templates.
pub mod arc;
pub mod assembly;
pub mod config;
pub mod document;
pub mod energy;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod plant;
pub mod reports;
pub mod restyle;
pub mod savings;
pub mod summary_table;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::{ReportError, Result};
pub use pipeline::{compile, CompileOutcome};
