use thiserror::Error;

/// Storage and routing error types.
///
/// Each variant maps to an HTTP status code via [`StorageError::status_code`].
/// Backend failures keep the original cause attached so callers can log the
/// chain while showing users only the human-readable summary.
#[derive(Error, Debug)]
pub enum StorageError {
    // --- 400 Bad Request ---
    #[error("Validation error: {0}")]
    Validation(String),

    // --- 404 Not Found ---
    #[error("{0}")]
    NotFound(String),

    // --- 500 Internal Server Error ---
    /// The authorization endpoint could not be reached or answered
    /// malformed data. Routing treats this as "not authorized" rather than
    /// failing the call; the variant exists for the endpoint's own error
    /// path and for diagnostics.
    #[error("Authorization check failed")]
    AuthorizationCheckFailed,

    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- 503 Service Unavailable ---
    #[error("Local storage is not available")]
    StorageUnavailable,
}

impl StorageError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::AuthorizationCheckFailed | Self::Backend { .. } | Self::Serialization(_) => 500,
            Self::StorageUnavailable => 503,
        }
    }

    // --- Constructors ---

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn backend(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            cause: Box::new(cause),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Setup-time validation failures for a user-supplied remote store
/// connection. Distinguishable so the caller can show a precise message;
/// steady-state CRUD never returns these.
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("Invalid API key. Please check your anon key.")]
    BadCredential,

    #[error("Table '{0}' not found. Please create the required table.")]
    MissingTable(String),

    #[error("Unable to connect to the remote store. Please check your URL and try again.")]
    Unreachable(#[source] reqwest::Error),
}
