use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("missing credential: set {0} or add it to the api section of orderboard.yaml")]
    MissingCredential(&'static str),

    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("authentication failed (HTTP 401): check the API username and key")]
    Unauthorized,

    #[error("access denied (HTTP 403): the API credentials cannot read this resource")]
    Forbidden,

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// True for errors that must halt a run before any data is shown.
    pub fn is_auth(&self) -> bool {
        matches!(self, BoardError::Unauthorized | BoardError::Forbidden)
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
