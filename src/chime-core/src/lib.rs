pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod paths;
pub mod redact;
pub mod secrets;

pub use config::{Config, ConfigError, LogLevel, LoggingConfig, ServiceConfig, ValidationError};
pub use error::{status, BridgeError, BridgeResult};
pub use logging::{init_logging, init_logging_with_sink, LoggingError, LoggingGuard};
pub use paths::{AppDirs, DirsError};

pub const APP_NAME: &str = "chime";
pub const APP_AUTHOR: &str = "Chime";
pub const APP_QUALIFIER: &str = "io";
