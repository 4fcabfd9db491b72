//! Error types for the Drive music client
//!
//! Errors are grouped by where they surface: session/auth, the internal batch
//! API and its envelope parsing, and everything else. Nothing here is retried
//! automatically; callers get the error as-is.

use thiserror::Error;

/// Result type alias using our DriveError type
pub type Result<T> = std::result::Result<T, DriveError>;

/// Maximum number of characters of a raw response kept for diagnostics
pub const RESPONSE_PREVIEW_LEN: usize = 500;

/// Main error type for the Drive music client
#[derive(Error, Debug)]
pub enum DriveError {
    // ===== Session / Auth Errors =====

    /// No usable session, or the remote rejected it (401/403).
    /// The session has already been cleared when this comes from a remote call.
    #[error("Login required")]
    LoginRequired,

    /// Cookie captured at login carries no session secret field
    #[error("Required authentication cookie (SAPISID) not found")]
    MissingCredential,

    // ===== API Errors =====

    /// A value expected in a scraped page was not there
    #[error("Failed to extract {what} from Drive page")]
    ExtractionFailed { what: String },

    /// Response body contained no JSON object outside of string literals
    #[error("No JSON found in response")]
    NoJsonFound { response_preview: Option<String> },

    /// A JSON object started but its braces never balanced
    #[error("Incomplete JSON found in response (unclosed braces)")]
    UnclosedJson { response_preview: Option<String> },

    /// The embedded JSON could not be decoded into the expected shape
    #[error("Invalid API response: {message}")]
    InvalidApiResponse {
        message: String,
        /// First few hundred characters of the raw body
        response_preview: Option<String>,
    },

    /// Any non-2xx status other than 401/403
    #[error("API request failed: {message}")]
    ApiRequestFailed {
        message: String,
        /// HTTP status code if available
        status_code: Option<u16>,
        /// Endpoint that failed
        endpoint: Option<String>,
    },

    /// Transport-level failure (DNS, connect, TLS, timeout)
    #[error("Network error: {message}")]
    NetworkError { message: String },

    // ===== Input / Configuration Errors =====

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Overlay metadata could not be fetched or decoded
    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl DriveError {
    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        DriveError::InvalidInput(message.into())
    }

    /// Create an ApiRequestFailed error
    pub fn api_failed<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
    ) -> Self {
        DriveError::ApiRequestFailed {
            message: message.into(),
            status_code,
            endpoint,
        }
    }

    /// Create an ExtractionFailed error
    pub fn extraction_failed<S: Into<String>>(what: S) -> Self {
        DriveError::ExtractionFailed { what: what.into() }
    }

    /// Create an InvalidApiResponse error keeping a bounded preview of the body
    pub fn invalid_response<S: Into<String>>(message: S, body: &str) -> Self {
        DriveError::InvalidApiResponse {
            message: message.into(),
            response_preview: Some(preview(body)),
        }
    }

    /// Check if error is due to authentication/authorization
    ///
    /// Returns `true` when the host should re-prompt the login flow.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            DriveError::LoginRequired | DriveError::MissingCredential
        )
    }

    /// Check if error came from decoding the batch envelope
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            DriveError::NoJsonFound { .. }
                | DriveError::UnclosedJson { .. }
                | DriveError::InvalidApiResponse { .. }
                | DriveError::SerdeJsonError(_)
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            DriveError::LoginRequired => {
                "Your Google Drive session has expired. Please log in again.".to_string()
            }
            DriveError::MissingCredential => {
                "Login failed: Required authentication cookie (SAPISID) not found. Please complete Google sign-in.".to_string()
            }
            DriveError::ExtractionFailed { .. } => {
                "Could not read your Google Drive session. Please log in again.".to_string()
            }
            DriveError::NetworkError { message } => {
                format!("Could not reach Google Drive: {}", message)
            }
            _ => self.to_string(),
        }
    }
}

/// Truncate a response body to [`RESPONSE_PREVIEW_LEN`] characters
pub fn preview(body: &str) -> String {
    body.chars().take(RESPONSE_PREVIEW_LEN).collect()
}
