//! Response shapes exchanged between a client and the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::query::CompiledQuery;

/// Metadata describing an executed (or executing) statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementInfo {
    /// Backend query id.
    pub query_id: String,
    /// The SQL text that was sent.
    pub sql_text: String,
}

impl StatementInfo {
    /// Creates statement metadata.
    #[must_use]
    pub fn new(query_id: impl Into<String>, sql_text: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            sql_text: sql_text.into(),
        }
    }
}

/// The backend-native result of a statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// Row set, if the backend returned one.
    pub rows: Option<Vec<JsonValue>>,
    /// Statement metadata.
    pub statement: Option<StatementInfo>,
}

/// A compiled query together with the response it produced.
///
/// `response` is `None` when there was nothing to run.
#[derive(Debug, Clone)]
pub struct QueryEnvelope {
    /// The statement that ran.
    pub query: CompiledQuery,
    /// What the backend returned.
    pub response: Option<RawResponse>,
}

/// The caller-facing result of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResult {
    /// Nothing was executed.
    Empty,
    /// The raw backend response, unchanged.
    Raw(RawResponse),
    /// A row set.
    Rows(Vec<JsonValue>),
    /// A single row, or `Null` when there was none.
    Row(JsonValue),
    /// Affected row count.
    Count(i64),
    /// Any other value produced by an output hook.
    Value(JsonValue),
}

impl EngineResult {
    /// Returns the row set carried by this result, if any.
    #[must_use]
    pub fn rows(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Raw(raw) => raw.rows.as_deref(),
            Self::Rows(rows) => Some(rows),
            Self::Empty | Self::Row(_) | Self::Count(_) | Self::Value(_) => None,
        }
    }
}
