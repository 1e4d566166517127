use crate::host_log::HostLogMakeWriter;
use chime_client::ChimeClient;
use chime_core::{init_logging_with_sink, AppDirs, BridgeError, Config};
use std::ffi::c_char;
use std::sync::RwLock;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Host logging sink: receives a level (0 trace .. 4 error) and a
/// NUL-terminated UTF-8 message valid only for the duration of the call.
pub type LogCallback = extern "C" fn(level: i32, message: *const c_char);

/// Everything one bridge instance owns: configuration-derived client, the
/// runtime that backs the blocking export surface, and the logging guard.
/// Constructed once by `BridgeInitialize` and threaded through every export.
pub(crate) struct BridgeContext {
    pub(crate) runtime: Runtime,
    pub(crate) client: ChimeClient,
    _logging: Option<chime_core::LoggingGuard>,
}

static CONTEXT: RwLock<Option<BridgeContext>> = RwLock::new(None);

/// Build the process-wide context. A second call while initialized is a
/// no-op: host plugins may fire their load hook more than once.
pub(crate) fn initialize(log_callback: Option<LogCallback>) -> Result<(), BridgeError> {
    let mut guard = CONTEXT.write().unwrap_or_else(|e| e.into_inner());
    if guard.is_some() {
        return Ok(());
    }

    let dirs = AppDirs::discover().map_err(|e| BridgeError::internal(e.to_string()))?;
    let config = Config::load_or_default(&dirs).map_err(|e| BridgeError::internal(e.to_string()))?;

    // Logging is never required for correctness; a failed subscriber
    // install (e.g. another tracing consumer in the same process) is
    // tolerated.
    let sink = log_callback.map(|cb| BoxMakeWriter::new(HostLogMakeWriter::new(cb)));
    let logging = init_logging_with_sink(&config.logging, &dirs, sink).ok();

    let runtime = Runtime::new().map_err(|e| BridgeError::internal(e.to_string()))?;
    let client = ChimeClient::from_config(&config)?;

    *guard = Some(BridgeContext {
        runtime,
        client,
        _logging: logging,
    });
    tracing::info!("bridge initialized");
    Ok(())
}

pub(crate) fn shutdown() {
    let mut guard = CONTEXT.write().unwrap_or_else(|e| e.into_inner());
    if let Some(ctx) = guard.take() {
        tracing::info!("bridge shutting down");
        let BridgeContext {
            runtime,
            client,
            _logging,
        } = ctx;
        drop(client);
        // Give fire-and-forget notifications a moment to drain.
        runtime.shutdown_timeout(Duration::from_millis(250));
    }
}

/// Run `f` against the live context, or `None` when the bridge has not been
/// initialized.
pub(crate) fn with_context<R>(f: impl FnOnce(&BridgeContext) -> R) -> Option<R> {
    let guard = CONTEXT.read().unwrap_or_else(|e| e.into_inner());
    guard.as_ref().map(f)
}

#[cfg(test)]
pub(crate) fn install_for_tests(client: ChimeClient) {
    let mut guard = CONTEXT.write().unwrap_or_else(|e| e.into_inner());
    let runtime = Runtime::new().expect("test runtime");
    *guard = Some(BridgeContext {
        runtime,
        client,
        _logging: None,
    });
}

#[cfg(test)]
pub(crate) fn clear_for_tests() {
    let mut guard = CONTEXT.write().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}
