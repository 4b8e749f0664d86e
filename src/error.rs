use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Location unavailable: {0}")]
    Location(String),

    #[error("Service unavailable: circuit breaker for '{0}' is open")]
    CircuitOpen(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn location<S: Into<String>>(msg: S) -> Self {
        Self::Location(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            Self::Json(_)
            | Self::Anyhow(_)
            | Self::InvalidInput(_)
            | Self::Config(_)
            | Self::Location(_)
            | Self::CircuitOpen(_)
            | Self::NotFound(_) => false,
        }
    }

    pub fn is_pii_safe(&self) -> bool {
        match self {
            Self::Network(_) | Self::Json(_) | Self::Io(_) | Self::Anyhow(_) => false,
            Self::Api { .. }
            | Self::InvalidInput(_)
            | Self::Config(_)
            | Self::Location(_)
            | Self::CircuitOpen(_)
            | Self::NotFound(_) => true,
        }
    }

    pub fn to_safe_string(&self) -> String {
        if self.is_pii_safe() {
            self.to_string()
        } else {
            match self {
                Self::Network(_) => "Network request failed".to_string(),
                Self::Json(_) => "Server returned malformed data".to_string(),
                Self::Io(_) => "File operation failed".to_string(),
                _ => "Operation failed".to_string(),
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
