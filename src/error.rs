use thiserror::Error;

/// Errors from loading exports, writing outputs and reading configuration.
/// The aggregators themselves never fail.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input file extension is neither `.json` nor `.csv`.
    #[error("Unsupported input format '{extension}': expected .json or .csv")]
    UnsupportedFormat {
        /// The extension that was found (empty when there was none).
        extension: String,
    },

    #[error("Invalid reference time '{value}': expected an RFC 3339 timestamp")]
    InvalidReferenceTime { value: String },

    #[error("No reports loaded. Please load the export first (option 1).")]
    NoData,
}
