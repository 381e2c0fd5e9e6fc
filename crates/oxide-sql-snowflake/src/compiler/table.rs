//! Create/alter table compilation.

use oxide_sql_engine::compiler::{ColumnCompiler, TableCompiler};
use oxide_sql_engine::formatter::Formatter;
use oxide_sql_engine::schema::{TableAction, TableCommand};
use oxide_sql_engine::{CompileError, CompiledQuery, TableBuilder};
use tracing::debug;

use super::capability::{shim, Shim};
use super::{DialectContext, SnowflakeColumnCompiler};

/// Compiles one [`TableBuilder`] to Snowflake DDL.
pub struct SnowflakeTableCompiler<'a> {
    builder: &'a TableBuilder,
    dialect: DialectContext<'a>,
    schema: Option<&'a str>,
    columns: SnowflakeColumnCompiler,
}

impl<'a> SnowflakeTableCompiler<'a> {
    /// Creates a compiler; table names are qualified with `schema` when given.
    #[must_use]
    pub const fn new(
        builder: &'a TableBuilder,
        dialect: DialectContext<'a>,
        schema: Option<&'a str>,
    ) -> Self {
        Self {
            builder,
            dialect,
            schema,
            columns: SnowflakeColumnCompiler::new(),
        }
    }

    fn table_name(&self) -> String {
        match self.schema {
            Some(schema) if !self.builder.name.contains('.') => {
                format!("{schema}.{}", self.builder.name)
            }
            _ => self.builder.name.clone(),
        }
    }

    fn constraint_name(&self, columns: &[String], suffix: &str, name: Option<&String>) -> String {
        name.cloned().unwrap_or_else(|| {
            let base = self.builder.name.replace(['.', '-'], "_");
            let generated = match suffix {
                "pkey" => format!("{base}_pkey"),
                _ => format!("{base}_{}_{suffix}", columns.join("_")),
            };
            generated.to_lowercase()
        })
    }

    fn constraint(
        &self,
        f: &Formatter<'_>,
        kind: &str,
        suffix: &str,
        columns: &[String],
        name: Option<&String>,
    ) -> String {
        format!(
            "constraint {} {kind} ({})",
            f.wrap(&self.constraint_name(columns, suffix, name)),
            f.columnize(columns)
        )
    }

    fn warn_unsupported(&self, construct: &str) {
        if let Some(message) = shim(construct).and_then(Shim::warning) {
            self.dialect.logger.warn(message);
        }
    }
}

impl TableCompiler for SnowflakeTableCompiler<'_> {
    fn to_sql(&self) -> Result<Vec<CompiledQuery>, CompileError> {
        let f = Formatter::new(self.dialect.wrapper, None);
        let table = f.wrap(&self.table_name());
        let creating = matches!(
            self.builder.action,
            TableAction::Create | TableAction::CreateIfNotExists
        );
        let mut statements = Vec::new();

        if creating {
            if self.builder.columns.is_empty() {
                return Err(CompileError::EmptyColumns("create table"));
            }
            let mut definitions: Vec<String> = self
                .builder
                .columns
                .iter()
                .map(|column| self.columns.compile_column(column, &f))
                .collect();
            for command in &self.builder.commands {
                match command {
                    TableCommand::Primary { columns, name } => definitions.push(
                        self.constraint(&f, "primary key", "pkey", columns, name.as_ref()),
                    ),
                    TableCommand::Unique { columns, name } => definitions.push(
                        self.constraint(&f, "unique", "unique", columns, name.as_ref()),
                    ),
                    _ => {}
                }
            }
            let if_not_exists = if self.builder.action == TableAction::CreateIfNotExists {
                "if not exists "
            } else {
                ""
            };
            statements.push(format!(
                "create table {if_not_exists}{table} ({})",
                definitions.join(", ")
            ));
        } else {
            for column in &self.builder.columns {
                statements.push(format!(
                    "alter table {table} add column {}",
                    self.columns.compile_column(column, &f)
                ));
            }
        }

        if self.builder.columns.iter().any(|c| c.index.is_some()) {
            self.warn_unsupported("index");
        }

        for command in &self.builder.commands {
            match command {
                TableCommand::DropColumns(columns) => {
                    let dropped: Vec<String> = columns.iter().map(|c| f.wrap(c)).collect();
                    statements.push(format!(
                        "alter table {table} drop column {}",
                        dropped.join(", ")
                    ));
                }
                TableCommand::RenameColumn { from, to } => statements.push(format!(
                    "alter table {table} rename column {} to {}",
                    f.wrap(from),
                    f.wrap(to)
                )),
                TableCommand::Primary { columns, name } if !creating => statements.push(format!(
                    "alter table {table} add {}",
                    self.constraint(&f, "primary key", "pkey", columns, name.as_ref())
                )),
                TableCommand::Unique { columns, name } if !creating => statements.push(format!(
                    "alter table {table} add {}",
                    self.constraint(&f, "unique", "unique", columns, name.as_ref())
                )),
                TableCommand::Primary { .. } | TableCommand::Unique { .. } => {}
                TableCommand::Index { .. } => self.warn_unsupported("index"),
                TableCommand::DropIndex { .. } => self.warn_unsupported("dropIndex"),
                TableCommand::Comment(comment) => statements.push(format!(
                    "comment on table {table} is '{}'",
                    comment.replace('\'', "''")
                )),
            }
        }

        debug!(table = %self.builder.name, statements = statements.len(), "Compiled table");
        Ok(statements.into_iter().map(CompiledQuery::raw).collect())
    }
}
