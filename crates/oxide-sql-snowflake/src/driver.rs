//! The outbound driver interface.
//!
//! This is the surface the dialect layer needs from a Snowflake driver: a
//! session that connects, executes statements (handing back a cancellable
//! handle before the result arrives), streams rows, and reports
//! asynchronous errors to registered listeners.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use oxide_sql_engine::query::CompiledQuery;
use oxide_sql_engine::{DriverError, StatementInfo};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::ConnectionSettings;

/// Receives session-level errors raised outside of any statement.
pub type ErrorListener = Box<dyn Fn(&DriverError) + Send + Sync>;

/// Rows produced by a streaming cursor.
pub type RowStream = BoxStream<'static, Result<JsonValue, DriverError>>;

/// Option key that turns on result streaming.
pub const STREAM_RESULT: &str = "streamResult";

/// A statement execution request.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRequest {
    /// SQL text.
    pub sql_text: String,
    /// Positional binds.
    pub binds: Vec<JsonValue>,
    /// Whether rows are delivered through a stream.
    pub stream_result: bool,
    /// Extra driver options.
    pub options: JsonMap<String, JsonValue>,
}

impl StatementRequest {
    /// Builds a buffered request for `query`.
    #[must_use]
    pub fn buffered(query: &CompiledQuery) -> Self {
        Self {
            sql_text: query.sql.clone(),
            binds: query.bindings.iter().map(|v| v.to_json()).collect(),
            stream_result: false,
            options: JsonMap::new(),
        }
    }

    /// Builds a streaming request for `query`; the query's own options
    /// override the defaults.
    #[must_use]
    pub fn streaming(query: &CompiledQuery) -> Self {
        let mut options = query.options.clone();
        let stream_result = options
            .remove(STREAM_RESULT)
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        Self {
            sql_text: query.sql.clone(),
            binds: query.bindings.iter().map(|v| v.to_json()).collect(),
            stream_result,
            options,
        }
    }
}

/// What a buffered statement produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOutput {
    /// Rows, with column names as the backend reports them.
    pub rows: Option<Vec<JsonValue>>,
}

/// A statement that has started executing.
#[async_trait]
pub trait RunningStatement: Send + Sync {
    /// Statement metadata.
    fn info(&self) -> StatementInfo;

    /// Asks the backend to stop the statement.
    async fn cancel(&self) -> Result<(), DriverError>;
}

/// A started execution: the cancellable handle and the pending result.
pub struct Execution {
    /// Handle valid until `completion` resolves.
    pub statement: Arc<dyn RunningStatement>,
    /// Resolves once the backend has finished.
    pub completion: BoxFuture<'static, Result<StatementOutput, DriverError>>,
}

/// A backend session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Authenticates and opens the session.
    async fn connect(&self) -> Result<(), DriverError>;

    /// Starts a buffered statement.
    fn execute(&self, request: StatementRequest) -> Execution;

    /// Starts a statement and returns its row cursor.
    fn stream_rows(&self, request: StatementRequest) -> RowStream;

    /// Closes the session.
    async fn destroy(&self) -> Result<(), DriverError>;

    /// Probes whether the session is still usable.
    async fn is_valid(&self) -> Result<bool, DriverError>;

    /// Registers an error listener.
    fn on_error(&self, listener: ErrorListener);

    /// Drops every registered listener.
    fn remove_all_listeners(&self);

    /// Number of registered listeners.
    fn listener_count(&self) -> usize;
}

/// Creates sessions.
pub trait Driver: Send + Sync {
    /// Creates an unconnected session for `settings`.
    fn create_connection(&self, settings: &ConnectionSettings) -> Arc<dyn Session>;
}
