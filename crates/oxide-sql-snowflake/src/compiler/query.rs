//! Query compilation.

use std::sync::Arc;

use oxide_sql_engine::compiler::QueryCompiler;
use oxide_sql_engine::formatter::Formatter;
use oxide_sql_engine::query::{OutputFn, WhereClause};
use oxide_sql_engine::{
    CompileError, CompiledQuery, EngineResult, QueryBuilder, QueryMethod, RawResponse, SqlValue,
};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use super::capability::ensure_supported;
use super::{field, split_qualified, stored_name, DialectContext};

type Compiled = (String, Vec<SqlValue>);

/// Compiles a [`QueryBuilder`] to Snowflake SQL.
pub struct SnowflakeQueryCompiler<'a> {
    builder: &'a QueryBuilder,
    dialect: DialectContext<'a>,
}

impl<'a> SnowflakeQueryCompiler<'a> {
    /// Creates a compiler for `builder`.
    #[must_use]
    pub const fn new(builder: &'a QueryBuilder, dialect: DialectContext<'a>) -> Self {
        Self { builder, dialect }
    }

    fn formatter(&self) -> Formatter<'a> {
        Formatter::new(self.dialect.wrapper, self.builder.context.as_ref())
    }

    fn table(&self, statement: &'static str) -> Result<&'a str, CompileError> {
        self.builder
            .table
            .as_deref()
            .ok_or(CompileError::MissingTable(statement))
    }

    fn where_clause(&self, f: &Formatter<'_>, bindings: &mut Vec<SqlValue>) -> String {
        if self.builder.wheres.is_empty() {
            return String::new();
        }
        let mut conditions = Vec::with_capacity(self.builder.wheres.len());
        for clause in &self.builder.wheres {
            let condition = match clause {
                WhereClause::Compare {
                    column,
                    operator,
                    value,
                } => {
                    bindings.push(value.clone());
                    format!("{} {operator} ?", f.wrap(column))
                }
                WhereClause::In { values, .. } if values.is_empty() => String::from("1 = 0"),
                WhereClause::In { column, values } => {
                    bindings.extend(values.iter().cloned());
                    format!("{} in ({})", f.wrap(column), f.parameters(values.len()))
                }
                WhereClause::Null { column, negated } => {
                    let not = if *negated { "not " } else { "" };
                    format!("{} is {not}null", f.wrap(column))
                }
            };
            conditions.push(condition);
        }
        format!(" where {}", conditions.join(" and "))
    }

    fn select(&self, f: &Formatter<'_>, limit: Option<u64>) -> Result<Compiled, CompileError> {
        let table = self.table("select")?;
        let mut bindings = Vec::new();
        let mut sql = format!(
            "select {} from {}",
            f.columnize(&self.builder.columns),
            f.wrap(table)
        );
        sql.push_str(&self.where_clause(f, &mut bindings));
        if !self.builder.orders.is_empty() {
            let orders: Vec<String> = self
                .builder
                .orders
                .iter()
                .map(|o| {
                    let direction = if o.descending { "desc" } else { "asc" };
                    format!("{} {direction}", f.wrap(&o.column))
                })
                .collect();
            sql.push_str(" order by ");
            sql.push_str(&orders.join(", "));
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" limit {limit}"));
        }
        if let Some(offset) = self.builder.offset {
            sql.push_str(&format!(" offset {offset}"));
        }
        Ok((sql, bindings))
    }

    fn insert(&self, f: &Formatter<'_>) -> Result<Compiled, CompileError> {
        let table = self.table("insert")?;
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.builder.insert {
            for (column, _) in row {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        if columns.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut bindings = Vec::new();
        let mut tuples = Vec::with_capacity(self.builder.insert.len());
        for row in &self.builder.insert {
            let mut slots = Vec::with_capacity(columns.len());
            for column in &columns {
                match row.iter().find(|(c, _)| c == column) {
                    Some((_, value)) => {
                        bindings.push(value.clone());
                        slots.push("?");
                    }
                    None => slots.push("DEFAULT"),
                }
            }
            tuples.push(format!("({})", slots.join(", ")));
        }

        let wrapped: Vec<String> = columns.iter().map(|c| f.wrap(c)).collect();
        let sql = format!(
            "insert into {} ({}) values {}",
            f.wrap(table),
            wrapped.join(", "),
            tuples.join(", ")
        );
        Ok((sql, bindings))
    }

    fn update(&self, f: &Formatter<'_>) -> Result<Compiled, CompileError> {
        let table = self.table("update")?;
        if self.builder.update.is_empty() {
            return Err(CompileError::EmptyColumns("update"));
        }
        let mut bindings = Vec::new();
        let assignments: Vec<String> = self
            .builder
            .update
            .iter()
            .map(|(column, value)| {
                bindings.push(value.clone());
                format!("{} = ?", f.wrap(column))
            })
            .collect();
        let mut sql = format!("update {} set {}", f.wrap(table), assignments.join(", "));
        sql.push_str(&self.where_clause(f, &mut bindings));
        Ok((sql, bindings))
    }

    fn delete(&self, f: &Formatter<'_>) -> Result<Compiled, CompileError> {
        let table = self.table("delete")?;
        let mut bindings = Vec::new();
        let mut sql = format!("delete from {}", f.wrap(table));
        sql.push_str(&self.where_clause(f, &mut bindings));
        Ok((sql, bindings))
    }

    fn column_info(&self) -> Result<Compiled, CompileError> {
        let (schema, table) = split_qualified(self.table("columnInfo")?);
        let mut sql =
            String::from("select * from information_schema.columns where table_name = ?");
        let mut bindings = vec![SqlValue::Text(stored_name(table))];
        match schema {
            Some(schema) => {
                sql.push_str(" and table_schema = ?");
                bindings.push(SqlValue::Text(stored_name(schema)));
            }
            None => sql.push_str(" and table_schema = current_schema()"),
        }
        Ok((sql, bindings))
    }
}

impl QueryCompiler for SnowflakeQueryCompiler<'_> {
    fn to_sql(&self) -> Result<CompiledQuery, CompileError> {
        if !self.builder.returning.is_empty() {
            ensure_supported("returning")?;
        }
        let f = self.formatter();
        let method = self.builder.method;
        let (sql, bindings) = match method {
            QueryMethod::Raw => self.builder.raw.clone().unwrap_or_default(),
            QueryMethod::Select | QueryMethod::Pluck => self.select(&f, self.builder.limit)?,
            QueryMethod::First => self.select(&f, Some(1))?,
            QueryMethod::Insert => self.insert(&f)?,
            QueryMethod::Update => self.update(&f)?,
            QueryMethod::Delete => self.delete(&f)?,
            QueryMethod::Truncate => (
                format!("truncate table {}", f.wrap(self.table("truncate")?)),
                Vec::new(),
            ),
            QueryMethod::ColumnInfo => self.column_info()?,
        };

        let mut compiled = CompiledQuery::new(method, sql).with_bindings(bindings);
        compiled.options = self.builder.options.clone();
        compiled.context = self.builder.context.clone();
        match method {
            QueryMethod::Pluck => compiled.pluck = self.builder.columns.first().cloned(),
            QueryMethod::ColumnInfo => {
                compiled.output = Some(column_info_output(self.builder.columns.first().cloned()));
            }
            _ => {}
        }
        Ok(compiled)
    }
}

/// Builds `{ column: { type, maxLength, nullable, defaultValue } }` from
/// `information_schema.columns` rows, or one column's entry when
/// `column` is given.
fn column_info_output(column: Option<String>) -> OutputFn {
    Arc::new(move |response: RawResponse| {
        let mut columns = JsonMap::new();
        for row in response.rows.unwrap_or_default() {
            let Some(name) = field(&row, "COLUMN_NAME").and_then(JsonValue::as_str) else {
                continue;
            };
            let text = |key: &str| field(&row, key).cloned().unwrap_or(JsonValue::Null);
            let data_type = field(&row, "DATA_TYPE")
                .and_then(JsonValue::as_str)
                .map(str::to_lowercase);
            let nullable = field(&row, "IS_NULLABLE").and_then(JsonValue::as_str) == Some("YES");
            columns.insert(
                name.to_lowercase(),
                json!({
                    "type": data_type,
                    "maxLength": text("CHARACTER_MAXIMUM_LENGTH"),
                    "nullable": nullable,
                    "defaultValue": text("COLUMN_DEFAULT"),
                }),
            );
        }
        match &column {
            Some(column) => EngineResult::Value(
                columns
                    .remove(&column.to_lowercase())
                    .unwrap_or(JsonValue::Null),
            ),
            None => EngineResult::Value(JsonValue::Object(columns)),
        }
    })
}

#[cfg(test)]
mod tests {
    use oxide_sql_engine::TracingLogger;

    use super::*;
    use crate::response::SnowflakeWrapper;

    fn compile(builder: &QueryBuilder) -> Result<CompiledQuery, CompileError> {
        let wrapper = SnowflakeWrapper::default();
        let dialect = DialectContext {
            wrapper: &wrapper,
            logger: &TracingLogger,
        };
        SnowflakeQueryCompiler::new(builder, dialect).to_sql()
    }

    #[test]
    fn test_select_with_clauses() {
        let query = compile(
            &QueryBuilder::select("users")
                .columns(&["id", "name as n"])
                .where_eq("active", true)
                .where_in("role", vec!["admin", "staff"])
                .where_null("deleted_at", false)
                .order_by("id", true)
                .limit(10)
                .offset(20),
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "select \"ID\", \"NAME\" as \"N\" from \"USERS\" where \"ACTIVE\" = ? \
             and \"ROLE\" in (?, ?) and \"DELETED_AT\" is null order by \"ID\" desc \
             limit 10 offset 20"
        );
        assert_eq!(
            query.bindings,
            vec![
                SqlValue::Bool(true),
                SqlValue::Text("admin".into()),
                SqlValue::Text("staff".into()),
            ]
        );
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let query =
            compile(&QueryBuilder::select("users").where_in::<i64>("id", vec![])).unwrap();
        assert_eq!(query.sql, "select * from \"USERS\" where 1 = 0");
    }

    #[test]
    fn test_first_and_pluck() {
        let first = compile(&QueryBuilder::first("users").where_eq("id", 1_i64)).unwrap();
        assert_eq!(first.sql, "select * from \"USERS\" where \"ID\" = ? limit 1");
        assert_eq!(first.method, QueryMethod::First);

        let pluck = compile(&QueryBuilder::pluck("users", "email")).unwrap();
        assert_eq!(pluck.sql, "select \"EMAIL\" from \"USERS\"");
        assert_eq!(pluck.pluck.as_deref(), Some("email"));
    }

    #[test]
    fn test_multi_row_insert() {
        let query = compile(
            &QueryBuilder::insert("users")
                .row(vec![("id", SqlValue::Int(1)), ("name", SqlValue::Text("Ann".into()))])
                .row(vec![("id", SqlValue::Int(2))]),
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "insert into \"USERS\" (\"ID\", \"NAME\") values (?, ?), (?, DEFAULT)"
        );
        assert_eq!(query.bindings.len(), 3);
    }

    #[test]
    fn test_empty_insert_compiles_to_nothing() {
        let query = compile(&QueryBuilder::insert("users")).unwrap();
        assert!(query.is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let update = compile(
            &QueryBuilder::update("users")
                .set("name", "Bo")
                .where_eq("id", 2_i64),
        )
        .unwrap();
        assert_eq!(update.sql, "update \"USERS\" set \"NAME\" = ? where \"ID\" = ?");
        assert_eq!(
            update.bindings,
            vec![SqlValue::Text("Bo".into()), SqlValue::Int(2)]
        );

        let delete = compile(&QueryBuilder::delete("users").where_op("id", ">", 5_i64)).unwrap();
        assert_eq!(delete.sql, "delete from \"USERS\" where \"ID\" > ?");

        let err = compile(&QueryBuilder::update("users")).unwrap_err();
        assert_eq!(err, CompileError::EmptyColumns("update"));
    }

    #[test]
    fn test_truncate() {
        let query = compile(&QueryBuilder::truncate("events")).unwrap();
        assert_eq!(query.sql, "truncate table \"EVENTS\"");
    }

    #[test]
    fn test_returning_is_rejected() {
        let err = compile(
            &QueryBuilder::insert("users")
                .row(vec![("id", SqlValue::Int(1))])
                .returning(&["id"]),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Unsupported { feature: "returning", .. }));
    }

    #[test]
    fn test_raw_passes_through() {
        let query =
            compile(&QueryBuilder::raw("select current_version()", vec![])).unwrap();
        assert_eq!(query.sql, "select current_version()");
        assert_eq!(query.method, QueryMethod::Raw);
    }

    #[test]
    fn test_column_info() {
        let query = compile(&QueryBuilder::column_info("analytics.events", None)).unwrap();
        assert_eq!(
            query.sql,
            "select * from information_schema.columns where table_name = ? and table_schema = ?"
        );
        assert_eq!(
            query.bindings,
            vec![
                SqlValue::Text("EVENTS".into()),
                SqlValue::Text("ANALYTICS".into()),
            ]
        );

        let output = query.output.expect("column info output");
        let result = output(RawResponse {
            rows: Some(vec![json!({
                "COLUMN_NAME": "ID",
                "DATA_TYPE": "NUMBER",
                "CHARACTER_MAXIMUM_LENGTH": null,
                "IS_NULLABLE": "NO",
                "COLUMN_DEFAULT": null,
            })]),
            statement: None,
        });
        assert_eq!(
            result,
            EngineResult::Value(json!({
                "id": {"type": "number", "maxLength": null, "nullable": false, "defaultValue": null}
            }))
        );
    }

    #[test]
    fn test_single_column_info() {
        let query = compile(&QueryBuilder::column_info("events", Some("Name"))).unwrap();
        assert!(query.sql.ends_with("table_schema = current_schema()"));

        let output = query.output.expect("column info output");
        let result = output(RawResponse {
            rows: Some(vec![json!({
                "COLUMN_NAME": "NAME",
                "DATA_TYPE": "TEXT",
                "CHARACTER_MAXIMUM_LENGTH": 255,
                "IS_NULLABLE": "YES",
                "COLUMN_DEFAULT": null,
            })]),
            statement: None,
        });
        assert_eq!(
            result,
            EngineResult::Value(
                json!({"type": "text", "maxLength": 255, "nullable": true, "defaultValue": null})
            )
        );
    }
}
