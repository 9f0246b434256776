use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {document} document: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("policy data unavailable: {0}")]
    PolicyDataUnavailable(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Composite key and coordinate parsing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("malformed policy key '{0}' (expected dimension|phase|policy)")]
    Malformed(String),

    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    #[error("empty policy id in key '{0}'")]
    EmptyPolicyId(String),
}
