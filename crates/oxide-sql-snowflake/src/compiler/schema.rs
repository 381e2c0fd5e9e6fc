//! Schema-level compilation.

use std::sync::Arc;

use oxide_sql_engine::compiler::{SchemaCompiler, TableCompiler};
use oxide_sql_engine::formatter::Formatter;
use oxide_sql_engine::{
    CompileError, CompiledQuery, EngineResult, QueryMethod, RawResponse, SchemaBuilder,
    SchemaCommand, SqlValue,
};
use serde_json::Value as JsonValue;

use super::{split_qualified, stored_name, DialectContext, SnowflakeTableCompiler};

/// Compiles a [`SchemaBuilder`] to Snowflake DDL, in call order.
pub struct SnowflakeSchemaCompiler<'a> {
    builder: &'a SchemaBuilder,
    dialect: DialectContext<'a>,
}

impl<'a> SnowflakeSchemaCompiler<'a> {
    /// Creates a compiler for `builder`.
    #[must_use]
    pub const fn new(builder: &'a SchemaBuilder, dialect: DialectContext<'a>) -> Self {
        Self { builder, dialect }
    }

    fn qualified(&self, table: &str) -> String {
        match self.builder.schema.as_deref() {
            Some(schema) if !table.contains('.') => format!("{schema}.{table}"),
            _ => table.to_string(),
        }
    }

    /// An `information_schema` lookup resolving to whether any row matched.
    fn exists_query(&self, view: &str, table: &str, column: Option<&str>) -> CompiledQuery {
        let qualified = self.qualified(table);
        let (schema, table) = split_qualified(&qualified);
        let mut sql = format!("select * from information_schema.{view} where table_name = ?");
        let mut bindings = vec![SqlValue::Text(stored_name(table))];
        if let Some(column) = column {
            sql.push_str(" and column_name = ?");
            bindings.push(SqlValue::Text(stored_name(column)));
        }
        match schema {
            Some(schema) => {
                sql.push_str(" and table_schema = ?");
                bindings.push(SqlValue::Text(stored_name(schema)));
            }
            None => sql.push_str(" and table_schema = current_schema()"),
        }
        CompiledQuery::new(QueryMethod::Select, sql)
            .with_bindings(bindings)
            .with_output(Arc::new(|response: RawResponse| {
                let found = response.rows.is_some_and(|rows| !rows.is_empty());
                EngineResult::Value(JsonValue::Bool(found))
            }))
    }
}

impl SchemaCompiler for SnowflakeSchemaCompiler<'_> {
    fn to_sql(&self) -> Result<Vec<CompiledQuery>, CompileError> {
        let f = Formatter::new(self.dialect.wrapper, None);
        let mut statements = Vec::new();
        for command in &self.builder.commands {
            match command {
                SchemaCommand::Table(table) => statements.extend(
                    SnowflakeTableCompiler::new(
                        table,
                        self.dialect,
                        self.builder.schema.as_deref(),
                    )
                    .to_sql()?,
                ),
                SchemaCommand::DropTable(table) => statements.push(CompiledQuery::raw(format!(
                    "drop table {}",
                    f.wrap(&self.qualified(table))
                ))),
                SchemaCommand::DropTableIfExists(table) => statements.push(CompiledQuery::raw(
                    format!("drop table if exists {}", f.wrap(&self.qualified(table))),
                )),
                SchemaCommand::RenameTable { from, to } => {
                    statements.push(CompiledQuery::raw(format!(
                        "alter table {} rename to {}",
                        f.wrap(&self.qualified(from)),
                        f.wrap(&self.qualified(to))
                    )));
                }
                SchemaCommand::HasTable(table) => {
                    statements.push(self.exists_query("tables", table, None));
                }
                SchemaCommand::HasColumn { table, column } => {
                    statements.push(self.exists_query("columns", table, Some(column)));
                }
                SchemaCommand::CreateSchema(schema) => statements.push(CompiledQuery::raw(
                    format!("create schema {}", f.wrap(schema)),
                )),
                SchemaCommand::CreateSchemaIfNotExists(schema) => statements.push(
                    CompiledQuery::raw(format!("create schema if not exists {}", f.wrap(schema))),
                ),
                SchemaCommand::DropSchema(schema) => statements.push(CompiledQuery::raw(
                    format!("drop schema {}", f.wrap(schema)),
                )),
                SchemaCommand::DropSchemaIfExists(schema) => statements.push(CompiledQuery::raw(
                    format!("drop schema if exists {}", f.wrap(schema)),
                )),
                SchemaCommand::Raw(sql) => statements.push(CompiledQuery::raw(sql.clone())),
            }
        }
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use oxide_sql_engine::schema::TableAction;
    use oxide_sql_engine::{ColumnDefinition, ColumnType, TableBuilder, TracingLogger};
    use serde_json::json;

    use super::*;
    use crate::response::SnowflakeWrapper;

    fn compile(builder: &SchemaBuilder) -> Vec<CompiledQuery> {
        let wrapper = SnowflakeWrapper::default();
        let dialect = DialectContext {
            wrapper: &wrapper,
            logger: &TracingLogger,
        };
        SnowflakeSchemaCompiler::new(builder, dialect)
            .to_sql()
            .unwrap()
    }

    fn sql(statements: &[CompiledQuery]) -> Vec<&str> {
        statements.iter().map(|q| q.sql.as_str()).collect()
    }

    #[test]
    fn test_statements_follow_call_order() {
        let builder = SchemaBuilder::new()
            .push(SchemaCommand::CreateSchemaIfNotExists("staging".into()))
            .push(SchemaCommand::Table(
                TableBuilder::new("loads", TableAction::Create)
                    .column(ColumnDefinition::new("id", ColumnType::Integer)),
            ))
            .push(SchemaCommand::RenameTable {
                from: "loads".into(),
                to: "load_runs".into(),
            })
            .push(SchemaCommand::DropTableIfExists("tmp".into()))
            .push(SchemaCommand::DropSchema("old".into()))
            .push(SchemaCommand::Raw("alter warehouse resume".into()));

        assert_eq!(
            sql(&compile(&builder)),
            vec![
                "create schema if not exists \"STAGING\"",
                "create table \"LOADS\" (\"ID\" int)",
                "alter table \"LOADS\" rename to \"LOAD_RUNS\"",
                "drop table if exists \"TMP\"",
                "drop schema \"OLD\"",
                "alter warehouse resume",
            ]
        );
    }

    #[test]
    fn test_schema_scoped_tables() {
        let builder = SchemaBuilder::new()
            .with_schema("staging")
            .push(SchemaCommand::DropTable("loads".into()));
        assert_eq!(sql(&compile(&builder)), vec!["drop table \"STAGING\".\"LOADS\""]);
    }

    #[test]
    fn test_has_table_uses_stored_names() {
        let builder = SchemaBuilder::new().push(SchemaCommand::HasTable("users".into()));
        let statements = compile(&builder);
        let query = &statements[0];

        assert_eq!(
            query.sql,
            "select * from information_schema.tables where table_name = ? \
             and table_schema = current_schema()"
        );
        assert_eq!(query.bindings, vec![SqlValue::Text("USERS".into())]);

        let output = query.output.clone().expect("exists output");
        assert_eq!(
            output(RawResponse {
                rows: Some(vec![json!({"TABLE_NAME": "USERS"})]),
                statement: None,
            }),
            EngineResult::Value(json!(true))
        );
        assert_eq!(
            output(RawResponse {
                rows: Some(vec![]),
                statement: None,
            }),
            EngineResult::Value(json!(false))
        );
    }

    #[test]
    fn test_has_column_in_schema() {
        let builder = SchemaBuilder::new()
            .with_schema("crm")
            .push(SchemaCommand::HasColumn {
                table: "contacts".into(),
                column: "email".into(),
            });
        let statements = compile(&builder);

        assert_eq!(
            statements[0].sql,
            "select * from information_schema.columns where table_name = ? \
             and column_name = ? and table_schema = ?"
        );
        assert_eq!(
            statements[0].bindings,
            vec![
                SqlValue::Text("CONTACTS".into()),
                SqlValue::Text("EMAIL".into()),
                SqlValue::Text("CRM".into()),
            ]
        );
    }
}
