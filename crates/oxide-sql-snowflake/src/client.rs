//! The Snowflake client.

use std::sync::Arc;

use async_trait::async_trait;
use oxide_sql_engine::compiler::{
    ColumnBuilder, ColumnCompiler, QueryCompiler, SchemaCompiler, TableCompiler,
};
use oxide_sql_engine::formatter::IdentifierWrapper;
use oxide_sql_engine::logger::Logger;
use oxide_sql_engine::{
    Client, ColumnType, CompiledQuery, EngineResult, QueryBuilder, QueryContext, QueryEnvelope,
    Result, RowSink, SchemaBuilder, TableBuilder, Transaction, TransactionScope,
};

use crate::compiler::{
    DialectContext, SnowflakeColumnBuilder, SnowflakeColumnCompiler, SnowflakeQueryCompiler,
    SnowflakeSchemaCompiler, SnowflakeTableCompiler,
};
use crate::config::{ConnectionSettings, SnowflakeConfig, DIALECT, DRIVER_NAME};
use crate::connection::{Connection, ConnectionManager};
use crate::driver::Driver;
use crate::executor;
use crate::response::{self, SnowflakeWrapper};
use crate::transaction::SnowflakeTransaction;

/// Snowflake implementation of the engine's [`Client`].
pub struct SnowflakeClient {
    config: SnowflakeConfig,
    connections: ConnectionManager,
    wrapper: SnowflakeWrapper,
    column_builder: SnowflakeColumnBuilder,
}

impl SnowflakeClient {
    /// Creates a client opening sessions through `driver`.
    #[must_use]
    pub fn new(config: SnowflakeConfig, driver: Arc<dyn Driver>) -> Self {
        let connections = ConnectionManager::new(driver, config.connection.clone());
        let wrapper = SnowflakeWrapper::new(config.wrap_identifier.clone());
        let column_builder = SnowflakeColumnBuilder::new(Arc::clone(&config.logger));
        Self {
            config,
            connections,
            wrapper,
            column_builder,
        }
    }

    /// The configuration this client was created with.
    #[must_use]
    pub const fn config(&self) -> &SnowflakeConfig {
        &self.config
    }

    /// The normalized settings sessions are opened with.
    #[must_use]
    pub const fn connection_settings(&self) -> &ConnectionSettings {
        self.connections.settings()
    }

    fn logger(&self) -> &dyn Logger {
        self.config.logger.as_ref()
    }

    fn dialect_context(&self) -> DialectContext<'_> {
        DialectContext {
            wrapper: &self.wrapper,
            logger: self.logger(),
        }
    }
}

impl IdentifierWrapper for SnowflakeClient {
    fn wrap_identifier(
        &self,
        value: &str,
        default_wrap: &dyn Fn(&str) -> String,
        context: Option<&QueryContext>,
    ) -> String {
        self.wrapper.wrap_identifier(value, default_wrap, context)
    }
}

#[async_trait]
impl Client for SnowflakeClient {
    type Connection = Connection;

    fn dialect(&self) -> &'static str {
        DIALECT
    }

    fn driver_name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn query_compiler<'a>(&'a self, builder: &'a QueryBuilder) -> Box<dyn QueryCompiler + 'a> {
        Box::new(SnowflakeQueryCompiler::new(builder, self.dialect_context()))
    }

    fn table_compiler<'a>(&'a self, builder: &'a TableBuilder) -> Box<dyn TableCompiler + 'a> {
        Box::new(SnowflakeTableCompiler::new(
            builder,
            self.dialect_context(),
            None,
        ))
    }

    fn schema_compiler<'a>(&'a self, builder: &'a SchemaBuilder) -> Box<dyn SchemaCompiler + 'a> {
        Box::new(SnowflakeSchemaCompiler::new(builder, self.dialect_context()))
    }

    fn column_compiler(&self) -> Box<dyn ColumnCompiler + '_> {
        Box::new(SnowflakeColumnCompiler::new())
    }

    fn column_builder(&self, name: &str, column_type: ColumnType) -> ColumnBuilder<'_> {
        ColumnBuilder::new(&self.column_builder, name, column_type)
    }

    fn transaction<'a>(
        &'a self,
        connection: &'a Self::Connection,
        nested: bool,
    ) -> Box<dyn TransactionScope + 'a>
    where
        Self: Sized,
    {
        Box::new(SnowflakeTransaction::new(
            Transaction::new(self, connection, nested),
            self.logger(),
        ))
    }

    async fn acquire_raw_connection(&self) -> Result<Connection> {
        self.connections.acquire().await
    }

    async fn validate_connection(&self, connection: &Connection) -> bool {
        self.connections.validate(connection).await
    }

    async fn destroy_raw_connection(&self, connection: &Connection) -> Result<()> {
        self.connections.destroy(connection).await
    }

    async fn cancel_query(&self, connection: &Connection) -> Result<()> {
        self.connections.cancel(connection).await
    }

    async fn query(&self, connection: &Connection, query: CompiledQuery) -> Result<QueryEnvelope> {
        executor::execute(connection, query).await
    }

    async fn stream(
        &self,
        connection: &Connection,
        query: CompiledQuery,
        sink: RowSink,
    ) -> Result<()> {
        executor::execute_streaming(connection, query, sink).await
    }

    fn process_response(&self, envelope: QueryEnvelope) -> EngineResult {
        response::process_response(envelope)
    }

    fn post_process_response(
        &self,
        result: EngineResult,
        context: Option<&QueryContext>,
    ) -> EngineResult {
        response::post_process_response(
            result,
            context,
            self.config.post_process_response.as_ref(),
        )
    }
}

impl std::fmt::Debug for SnowflakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
