//! Snowflake column types and column modifiers.

use std::sync::Arc;

use oxide_sql_engine::compiler::{
    ColumnBuilderDialect, ColumnCompiler, DefaultColumnBuilder, DefaultColumnCompiler,
};
use oxide_sql_engine::logger::Logger;
use oxide_sql_engine::ColumnDefinition;

use super::capability::{fragment, shim, Shim};

/// Column compiler for Snowflake.
///
/// Overrides the constructs Snowflake spells differently and leaves the rest
/// to the base dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnowflakeColumnCompiler {
    base: DefaultColumnCompiler,
}

impl SnowflakeColumnCompiler {
    /// Creates a column compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: DefaultColumnCompiler,
        }
    }
}

impl ColumnCompiler for SnowflakeColumnCompiler {
    fn increments(&self) -> String {
        fragment("increments").map_or_else(|| self.base.increments(), String::from)
    }

    fn big_increments(&self) -> String {
        fragment("bigincrements").map_or_else(|| self.base.big_increments(), String::from)
    }

    fn medium_integer(&self) -> String {
        fragment("mediumint").map_or_else(|| self.base.medium_integer(), String::from)
    }

    fn decimal(&self, precision: Option<u8>, scale: Option<u8>) -> String {
        match (precision, fragment("decimal")) {
            (None, Some(sql)) => String::from(sql),
            _ => self.base.decimal(precision, scale),
        }
    }

    // Snowflake's double takes no precision; a precise double is a decimal.
    fn double(&self, precision: Option<u8>, scale: Option<u8>) -> String {
        match (precision, fragment("double")) {
            (None, Some(sql)) => String::from(sql),
            (None, None) => self.base.double(None, scale),
            (Some(_), _) => self.base.decimal(precision, scale),
        }
    }

    fn enu(&self, values: &[String]) -> String {
        fragment("enu").map_or_else(|| self.base.enu(values), String::from)
    }

    fn json(&self) -> String {
        fragment("json").map_or_else(|| self.base.json(), String::from)
    }

    fn jsonb(&self) -> String {
        fragment("jsonb").map_or_else(|| self.base.jsonb(), String::from)
    }
}

/// Column modifiers as Snowflake honours them.
///
/// `primary` marks the column NOT NULL; `index` is ignored with a warning.
#[derive(Clone)]
pub struct SnowflakeColumnBuilder {
    logger: Arc<dyn Logger>,
}

impl SnowflakeColumnBuilder {
    /// Creates the builder behaviour, reporting through `logger`.
    #[must_use]
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl ColumnBuilderDialect for SnowflakeColumnBuilder {
    fn primary(&self, column: &mut ColumnDefinition, constraint_name: Option<String>) {
        match shim("primary") {
            Some(Shim::NotNullable) => column.nullable = Some(false),
            _ => DefaultColumnBuilder.primary(column, constraint_name),
        }
    }

    fn index(&self, column: &mut ColumnDefinition, index_name: Option<String>) {
        match shim("index").and_then(Shim::warning) {
            Some(message) => self.logger.warn(message),
            None => DefaultColumnBuilder.index(column, index_name),
        }
    }
}

impl std::fmt::Debug for SnowflakeColumnBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeColumnBuilder").finish_non_exhaustive()
    }
}
