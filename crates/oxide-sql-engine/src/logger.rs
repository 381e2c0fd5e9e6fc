//! Diagnostics emitted by clients.
//!
//! Capability shims report through a [`Logger`] rather than failing, so
//! callers can decide where those messages go.

/// Receives client diagnostics.
pub trait Logger: Send + Sync {
    /// A condition the caller should know about; execution continues.
    fn warn(&self, message: &str);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
