use policy_catalog::PolicyKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("unknown policy '{0}'")]
    UnknownPolicy(PolicyKey),

    #[error("invalid engine profile: {0}")]
    InvalidProfile(String),

    #[error("malformed engine profile: {0}")]
    ProfileSyntax(#[from] toml::de::Error),
}
