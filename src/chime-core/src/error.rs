use thiserror::Error;

/// Failure categories surfaced by the client and mapped onto bridge status
/// codes at the export boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("deadline exceeded: {message}")]
    Timeout { message: String },
    #[error("http error {code}: {body}")]
    Http { code: u16, body: String },
    #[error("session expired; login required")]
    SessionExpired,
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("malformed response: {skipped} record(s) rejected")]
    Parse { skipped: u32 },
    #[error("login failed with remote code {remote_code}: {message}")]
    LoginFailed { remote_code: i64, message: String },
    #[error("{message}")]
    Internal { message: String },
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The stable status code for this error, identical across every
    /// exported entry point.
    pub fn status_code(&self) -> i32 {
        match self {
            BridgeError::Network { .. } => status::NETWORK,
            BridgeError::Timeout { .. } => status::TIMEOUT,
            BridgeError::Http { .. } => status::HTTP,
            BridgeError::SessionExpired => status::SESSION_EXPIRED,
            BridgeError::InvalidArgument { .. } => status::INVALID_ARGUMENT,
            BridgeError::Parse { .. } => status::PARSE,
            BridgeError::LoginFailed { .. } => status::LOGIN_FAILED,
            BridgeError::Internal { .. } => status::INTERNAL,
        }
    }
}

/// Status codes returned by the exported entry points. `OK` is zero; every
/// error kind is a distinct negative value.
pub mod status {
    pub const OK: i32 = 0;
    pub const NETWORK: i32 = -1;
    pub const TIMEOUT: i32 = -2;
    pub const HTTP: i32 = -3;
    pub const SESSION_EXPIRED: i32 = -4;
    pub const INVALID_ARGUMENT: i32 = -5;
    pub const PARSE: i32 = -6;
    pub const LOGIN_FAILED: i32 = -7;
    pub const NOT_INITIALIZED: i32 = -8;
    pub const INTERNAL: i32 = -9;
}
