use thiserror::Error;

/// Why a data source never produced a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("failed to parse {source_name} at line {line}: {reason}")]
    ParseFailed {
        source_name: String,
        line: u64,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no chart surface named `{0}`")]
    TargetNotFound(String),
}
