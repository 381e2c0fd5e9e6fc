//! The client contract.
//!
//! A [`Client`] is everything the engine needs from a backend: compilers,
//! the raw connection lifecycle used by the pool, statement execution and
//! response shaping. Identifier quoting comes from the
//! [`IdentifierWrapper`] supertrait.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::compiler::{ColumnBuilder, ColumnCompiler, QueryCompiler, SchemaCompiler, TableCompiler};
use crate::error::{DriverError, Result};
use crate::formatter::IdentifierWrapper;
use crate::query::{CompiledQuery, QueryBuilder, QueryContext};
use crate::response::{EngineResult, QueryEnvelope};
use crate::schema::{ColumnType, SchemaBuilder, TableBuilder};
use crate::transaction::{Transaction, TransactionScope};

/// Destination for streamed rows. A failure is delivered as a single `Err`.
pub type RowSink = mpsc::Sender<std::result::Result<JsonValue, DriverError>>;

/// A backend client.
#[async_trait]
pub trait Client: IdentifierWrapper + Send + Sync {
    /// A raw backend connection, owned by the pool.
    type Connection: Send + Sync;

    /// Dialect name.
    fn dialect(&self) -> &'static str;

    /// Driver name.
    fn driver_name(&self) -> &'static str;

    /// Resolves the query compiler for `builder`.
    fn query_compiler<'a>(&'a self, builder: &'a QueryBuilder) -> Box<dyn QueryCompiler + 'a>;

    /// Resolves the table compiler for `builder`.
    fn table_compiler<'a>(&'a self, builder: &'a TableBuilder) -> Box<dyn TableCompiler + 'a>;

    /// Resolves the schema compiler for `builder`.
    fn schema_compiler<'a>(&'a self, builder: &'a SchemaBuilder) -> Box<dyn SchemaCompiler + 'a>;

    /// Resolves the column compiler.
    fn column_compiler(&self) -> Box<dyn ColumnCompiler + '_>;

    /// Starts a column description with this client's modifier behaviour.
    fn column_builder(&self, name: &str, column_type: ColumnType) -> ColumnBuilder<'_>;

    /// Creates a transaction on `connection`.
    fn transaction<'a>(
        &'a self,
        connection: &'a Self::Connection,
        nested: bool,
    ) -> Box<dyn TransactionScope + 'a>
    where
        Self: Sized,
    {
        Box::new(Transaction::new(self, connection, nested))
    }

    /// Opens a new backend session.
    async fn acquire_raw_connection(&self) -> Result<Self::Connection>;

    /// Reports whether a connection is still usable. Never fails.
    async fn validate_connection(&self, connection: &Self::Connection) -> bool;

    /// Closes a backend session.
    async fn destroy_raw_connection(&self, connection: &Self::Connection) -> Result<()>;

    /// Cancels the statement running on `connection`.
    async fn cancel_query(&self, connection: &Self::Connection) -> Result<()>;

    /// Whether [`Client::cancel_query`] is supported.
    fn can_cancel_query(&self) -> bool {
        false
    }

    /// Runs a statement and attaches the backend response.
    async fn query(
        &self,
        connection: &Self::Connection,
        query: CompiledQuery,
    ) -> Result<QueryEnvelope>;

    /// Runs a statement and forwards its rows to `sink`.
    async fn stream(
        &self,
        connection: &Self::Connection,
        query: CompiledQuery,
        sink: RowSink,
    ) -> Result<()>;

    /// Shapes a backend response into the engine's result contract.
    fn process_response(&self, envelope: QueryEnvelope) -> EngineResult;

    /// Final pass over a shaped result.
    fn post_process_response(
        &self,
        result: EngineResult,
        context: Option<&QueryContext>,
    ) -> EngineResult {
        let _ = context;
        result
    }

    /// Runs a statement end to end: execute, shape, post-process.
    async fn run(&self, connection: &Self::Connection, query: CompiledQuery) -> Result<EngineResult> {
        let context = query.context.clone();
        let envelope = self.query(connection, query).await?;
        let result = self.process_response(envelope);
        Ok(self.post_process_response(result, context.as_ref()))
    }
}
