use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnyRunError {
    #[error("API key not configured. Add 'api_key' to the [default] section of ~/.config/anyrun.ini.")]
    NoApiKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {}: {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} does not exist after writing", .0.display())]
    NotWritten(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    NotImplemented(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnyRunError {
    /// Wrap an IO error with the path being written
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Get user-friendly hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoApiKey => Some(
                "Create ~/.config/anyrun.ini (or /etc/anyrun/anyrun.ini) containing:\n\
                 [default]\n\
                 api_key = YOUR_KEY"
                    .to_string(),
            ),
            Self::Status { status: 401 | 403, .. } => {
                Some("Check the api_key in your anyrun.ini.".to_string())
            }
            Self::Status { status: 404, .. } => {
                Some("Check the task id; the sandbox has no such resource.".to_string())
            }
            Self::Network(_) => Some("Check your internet connection and try again.".to_string()),
            Self::Write { .. } => Some("Check permissions and free space for the output path.".to_string()),
            _ => None,
        }
    }

    /// HTTP status code, when the failure came from the remote service
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnyRunError>;
