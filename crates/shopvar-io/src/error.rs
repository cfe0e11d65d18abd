use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read spreadsheet {path}: {reason}")]
    Spreadsheet { path: String, reason: String },

    #[error("input has no header row")]
    MissingHeader,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}
