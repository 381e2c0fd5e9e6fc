//! Error types shared by every backend client.
//!
//! Backend-originated failures are carried verbatim in [`DriverError`] and
//! surfaced through [`ClientError`] without rewriting their content.

/// An error reported by a backend driver.
///
/// Cloneable so a single failure can be delivered to more than one
/// consumer (for example a stream destination and the awaiting caller).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    /// Human-readable message from the backend.
    pub message: String,
    /// Backend error code, if any.
    pub code: Option<String>,
    /// SQLSTATE, if the backend reported one.
    pub sql_state: Option<String>,
}

impl DriverError {
    /// Creates a driver error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            sql_state: None,
        }
    }

    /// Sets the backend error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the SQLSTATE.
    #[must_use]
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }
}

/// Errors raised while turning builder descriptions into SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The statement needs a table and none was given.
    #[error("Table name is required for {0}")]
    MissingTable(&'static str),

    /// The statement needs at least one column.
    #[error("At least one column is required for {0}")]
    EmptyColumns(&'static str),

    /// The construct cannot be expressed in the target dialect.
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        /// Dialect name.
        dialect: &'static str,
        /// The generic construct that was requested.
        feature: &'static str,
    },
}

/// Errors surfaced by a client to the engine.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Acquiring a session failed (authentication, network negotiation).
    #[error(transparent)]
    Connection(DriverError),

    /// Closing a session failed. The connection is marked disposed.
    #[error(transparent)]
    Destroy(DriverError),

    /// Cancelling the running statement failed.
    #[error(transparent)]
    Cancel(DriverError),

    /// The backend rejected a statement.
    #[error(transparent)]
    Execution(DriverError),

    /// A row stream failed part way through.
    #[error(transparent)]
    Stream(DriverError),

    /// A streaming query was started without SQL text.
    #[error("query is empty")]
    EmptyQuery,

    /// A statement is already running on the connection.
    #[error("Connection already has a running statement ({0})")]
    StatementInProgress(String),

    /// Compilation failed before anything reached the backend.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl ClientError {
    /// Returns the backend error carried by this error, if any.
    #[must_use]
    pub const fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Connection(e)
            | Self::Destroy(e)
            | Self::Cancel(e)
            | Self::Execution(e)
            | Self::Stream(e) => Some(e),
            Self::EmptyQuery | Self::StatementInProgress(_) | Self::Compile(_) => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_is_surfaced_verbatim() {
        let err = DriverError::new("SQL compilation error: object 'X' does not exist")
            .with_code("002003")
            .with_sql_state("42S02");
        let client = ClientError::Execution(err.clone());

        assert_eq!(client.to_string(), err.message);
        assert_eq!(client.driver_error(), Some(&err));
    }

    #[test]
    fn test_empty_query_message() {
        assert_eq!(ClientError::EmptyQuery.to_string(), "query is empty");
        assert!(ClientError::EmptyQuery.driver_error().is_none());
    }

    #[test]
    fn test_unsupported_message() {
        let err = CompileError::Unsupported {
            dialect: "snowflake",
            feature: "returning",
        };
        assert_eq!(err.to_string(), "snowflake does not support returning");
    }
}
