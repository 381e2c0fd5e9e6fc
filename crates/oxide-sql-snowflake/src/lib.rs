//! # oxide-sql-snowflake
//!
//! Snowflake client for `oxide-sql-engine`.
//!
//! [`SnowflakeClient`] implements the engine's [`Client`] contract on top of
//! a [`Driver`]: it opens and closes sessions for the pool, runs statements,
//! shapes responses, and provides compilers that speak Snowflake SQL.
//!
//! # How Snowflake differs from other dialects
//!
//! - **[Identifier resolution]**: unquoted identifiers are stored and
//!   reported in upper case. Identifiers are upper-cased before quoting,
//!   and result rows come back with lower-case keys.
//! - **[AUTOINCREMENT]**: auto-increment columns use the `AUTOINCREMENT`
//!   keyword and have no unsigned variants.
//! - **[Semi-structured data]**: JSON columns are `VARIANT`. There is no
//!   `ENUM` type; enumerations become `VARCHAR`.
//! - **Constraints are informational**: primary keys are recorded but not
//!   enforced, so a column-level primary key is compiled as `NOT NULL`.
//! - **No indexes**: index requests are ignored with a warning.
//! - **No savepoints**: nested transactions run as part of their parent;
//!   the savepoint operations are ignored with a warning.
//! - **DML results**: inserts, updates and deletes report their counts as
//!   rows (`number of rows inserted`, ...), which are summed.
//!
//! [Identifier resolution]: https://docs.snowflake.com/en/sql-reference/identifiers-syntax
//! [AUTOINCREMENT]: https://docs.snowflake.com/en/sql-reference/sql/create-table
//! [Semi-structured data]: https://docs.snowflake.com/en/sql-reference/data-types-semistructured
//!
//! ## Example
//!
//! ```rust
//! use oxide_sql_engine::compiler::{ColumnCompiler, QueryCompiler};
//! use oxide_sql_engine::{ColumnType, QueryBuilder, TracingLogger};
//! use oxide_sql_snowflake::compiler::{DialectContext, SnowflakeColumnCompiler, SnowflakeQueryCompiler};
//! use oxide_sql_snowflake::SnowflakeWrapper;
//!
//! let columns = SnowflakeColumnCompiler::new();
//! assert_eq!(columns.column_type(&ColumnType::Json), "variant");
//!
//! let wrapper = SnowflakeWrapper::default();
//! let dialect = DialectContext { wrapper: &wrapper, logger: &TracingLogger };
//! let builder = QueryBuilder::select("users").where_eq("id", 7_i64);
//! let query = SnowflakeQueryCompiler::new(&builder, dialect).to_sql().unwrap();
//! assert_eq!(query.sql, r#"select * from "USERS" where "ID" = ?"#);
//! ```

pub mod client;
pub mod compiler;
pub mod config;
pub mod connection;
pub mod driver;
pub mod executor;
pub mod response;
pub mod transaction;

pub use client::SnowflakeClient;
pub use config::{ConnectionSettings, SnowflakeConfig, DIALECT, DRIVER_NAME};
pub use connection::{Connection, ConnectionManager};
pub use driver::{Driver, Execution, RunningStatement, Session, StatementOutput, StatementRequest};
pub use oxide_sql_engine::Client;
pub use response::SnowflakeWrapper;
pub use transaction::SnowflakeTransaction;
