//! Report export artifacts.
//!
//! An exporter turns a list of reports into the bytes of one downloadable
//! file. CSV is the only format rendered here.

mod csv;

pub use self::csv::{DetailCsvExporter, SummaryCsvExporter};

use serde::Deserialize;
use thiserror::Error;

use crate::report::FinancialReport;

/// Errors raised while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV encoding failed.
    #[error("csv encoding failed: {0}")]
    Csv(#[from] ::csv::Error),

    /// Flushing the output buffer failed.
    #[error("failed to flush export: {0}")]
    Io(String),
}

/// Renders reports into a downloadable artifact.
pub trait ReportExporter: Send + Sync {
    /// MIME type of the artifact.
    fn content_type(&self) -> &'static str;

    /// File extension without the dot.
    fn file_extension(&self) -> &'static str;

    /// Renders `reports` in the given order.
    fn export(&self, reports: &[FinancialReport]) -> Result<Vec<u8>, ExportError>;
}

/// Export layout requested by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One row per report.
    #[default]
    Summary,
    /// One row per line item.
    Detail,
}

impl ExportFormat {
    /// The exporter rendering this layout.
    #[must_use]
    pub fn exporter(self) -> Box<dyn ReportExporter> {
        match self {
            Self::Summary => Box::new(SummaryCsvExporter),
            Self::Detail => Box::new(DetailCsvExporter),
        }
    }
}
