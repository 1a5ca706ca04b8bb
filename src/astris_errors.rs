use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstrisError {
    #[error("Invalid data source descriptor: {0}")]
    InvalidDataSource(String),

    #[error("Remote sources are disabled (build without the `remote` feature): {0}")]
    RemoteDisabled(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "remote")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Waypoint table parsing failed: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Star catalog decoding failed: {0}")]
    StarDecodeError(#[from] prost::DecodeError),

    #[error("Background task failed: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),

    #[error("Search worker is no longer running")]
    SearchWorkerGone,

    #[error("A previous prefetch failed; the catalog will not be loaded in this process")]
    PrefetchPreviouslyFailed,

    #[error("Catalog is not loaded yet")]
    CatalogNotLoaded,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}

impl PartialEq for AstrisError {
    fn eq(&self, other: &Self) -> bool {
        use AstrisError::*;
        match (self, other) {
            (InvalidDataSource(a), InvalidDataSource(b)) => a == b,
            (RemoteDisabled(a), RemoteDisabled(b)) => a == b,
            (InvalidLogFilter(a), InvalidLogFilter(b)) => a == b,
            (StarDecodeError(a), StarDecodeError(b)) => a == b,

            // Wrapped foreign errors are not comparable: same variant means equal
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "remote")]
            (ReqwestError(_), ReqwestError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (TaskJoinError(_), TaskJoinError(_)) => true,

            (SearchWorkerGone, SearchWorkerGone) => true,
            (PrefetchPreviouslyFailed, PrefetchPreviouslyFailed) => true,
            (CatalogNotLoaded, CatalogNotLoaded) => true,

            _ => false,
        }
    }
}
