//! Compliance report generation: a persisted match result goes in, a
//! Hebrew plain-text report comes out.

mod error;
pub mod input;
#[cfg(feature = "http")]
pub mod ollama;
pub mod prompt;
pub mod writer;

pub use error::ReportError;
pub use input::{load_report_input, ReportInput};
#[cfg(feature = "http")]
pub use ollama::OllamaReportWriter;
pub use writer::{generate_report, report_id, ReportWriter};
