//! Compiler contracts.
//!
//! A client resolves one compiler per compilation context. Compilers are
//! cheap values borrowing the builder description and the client's
//! read-only dialect tables, so nothing shared is mutated while compiling.

mod column;

pub use column::{
    ColumnBuilder, ColumnBuilderDialect, ColumnCompiler, DefaultColumnBuilder,
    DefaultColumnCompiler,
};

use crate::error::CompileError;
use crate::query::CompiledQuery;

/// Compiles a DML/query description into one statement.
pub trait QueryCompiler {
    /// Produces the statement.
    ///
    /// # Errors
    ///
    /// Fails when the description cannot be expressed in the dialect.
    fn to_sql(&self) -> Result<CompiledQuery, CompileError>;
}

/// Compiles one create/alter table description.
pub trait TableCompiler {
    /// Produces the statements, in execution order.
    ///
    /// # Errors
    ///
    /// Fails when a command cannot be expressed in the dialect.
    fn to_sql(&self) -> Result<Vec<CompiledQuery>, CompileError>;
}

/// Compiles a sequence of schema calls.
pub trait SchemaCompiler {
    /// Produces the statements, in execution order.
    ///
    /// # Errors
    ///
    /// Fails when a command cannot be expressed in the dialect.
    fn to_sql(&self) -> Result<Vec<CompiledQuery>, CompileError>;
}
