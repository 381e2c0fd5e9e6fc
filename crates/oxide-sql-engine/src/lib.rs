//! # oxide-sql-engine
//!
//! The dialect-neutral contracts of the oxide-sql query and migration
//! engine, as seen by a backend client.
//!
//! The engine describes work as plain data ([`QueryBuilder`],
//! [`TableBuilder`], [`SchemaBuilder`]) and asks a [`Client`] for the
//! compilers that turn it into SQL. The client also owns the raw connection
//! lifecycle, statement execution and response shaping, so a new backend is
//! added by implementing [`Client`] without touching the engine.
//!
//! ## Column compilation
//!
//! [`ColumnCompiler`] provides a shared base dialect. A backend overrides
//! only the constructs where it diverges:
//!
//! ```rust
//! use oxide_sql_engine::compiler::ColumnCompiler;
//! use oxide_sql_engine::schema::ColumnType;
//!
//! struct NoEnums;
//!
//! impl ColumnCompiler for NoEnums {
//!     fn enu(&self, _values: &[String]) -> String {
//!         String::from("varchar")
//!     }
//! }
//!
//! assert_eq!(NoEnums.column_type(&ColumnType::Enum(vec!["a".into()])), "varchar");
//! assert_eq!(NoEnums.column_type(&ColumnType::Integer), "int");
//! ```

pub mod client;
pub mod compiler;
pub mod error;
pub mod formatter;
pub mod logger;
pub mod query;
pub mod response;
pub mod schema;
pub mod transaction;
pub mod value;

pub use client::{Client, RowSink};
pub use compiler::{ColumnBuilder, ColumnCompiler, QueryCompiler, SchemaCompiler, TableCompiler};
pub use error::{ClientError, CompileError, DriverError, Result};
pub use formatter::{Formatter, IdentifierWrapper, default_wrap};
pub use logger::{Logger, TracingLogger};
pub use query::{CompiledQuery, QueryBuilder, QueryContext, QueryMethod};
pub use response::{EngineResult, QueryEnvelope, RawResponse, StatementInfo};
pub use schema::{ColumnDefinition, ColumnType, SchemaBuilder, SchemaCommand, TableBuilder};
pub use transaction::{Transaction, TransactionScope};
pub use value::{SqlValue, ToSqlValue};
