use thiserror::Error;

pub type Result<T> = std::result::Result<T, StateError>;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid selection snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
