//! Query descriptions and compiled statements.
//!
//! [`QueryBuilder`] is the dialect-neutral description the engine hands to
//! a query compiler; [`CompiledQuery`] is what comes back and what the
//! executor consumes exactly once.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::response::{EngineResult, RawResponse, StatementInfo};
use crate::value::{SqlValue, ToSqlValue};

/// The kind of statement, used to shape the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMethod {
    /// Raw SQL.
    Raw,
    /// `SELECT` returning all rows.
    Select,
    /// `SELECT` returning the first row.
    First,
    /// `SELECT` returning a single column's values.
    Pluck,
    /// `INSERT`.
    Insert,
    /// `UPDATE`.
    Update,
    /// `DELETE`.
    Delete,
    /// `TRUNCATE`.
    Truncate,
    /// Column metadata lookup.
    ColumnInfo,
}

impl QueryMethod {
    /// Returns the engine-facing name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Select => "select",
            Self::First => "first",
            Self::Pluck => "pluck",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Truncate => "truncate",
            Self::ColumnInfo => "columnInfo",
        }
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called with the running statement once execution starts.
pub type StatementHook = Arc<dyn Fn(&StatementInfo) + Send + Sync>;

/// Turns a raw response into the caller-facing result, bypassing the
/// client's default response shaping.
pub type OutputFn = Arc<dyn Fn(RawResponse) -> EngineResult + Send + Sync>;

/// Caller-supplied data that travels with a query.
#[derive(Clone, Default)]
pub struct QueryContext {
    /// Free-form data for identifier and response hooks.
    pub data: JsonValue,
    on_statement: Option<StatementHook>,
}

impl QueryContext {
    /// Creates a context carrying `data`.
    #[must_use]
    pub fn new(data: JsonValue) -> Self {
        Self {
            data,
            on_statement: None,
        }
    }

    /// Registers a hook notified when the statement starts running.
    #[must_use]
    pub fn on_statement(mut self, hook: impl Fn(&StatementInfo) + Send + Sync + 'static) -> Self {
        self.on_statement = Some(Arc::new(hook));
        self
    }

    /// Invokes the statement hook, if any.
    pub fn notify_statement(&self, statement: &StatementInfo) {
        if let Some(hook) = &self.on_statement {
            hook(statement);
        }
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("data", &self.data)
            .field("on_statement", &self.on_statement.is_some())
            .finish()
    }
}

/// A WHERE condition.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// `column <op> ?`
    Compare {
        /// Column name.
        column: String,
        /// Comparison operator (`=`, `<>`, `<`, `like`, ...).
        operator: String,
        /// Bound value.
        value: SqlValue,
    },
    /// `column in (?, ?, ...)`
    In {
        /// Column name.
        column: String,
        /// Bound values.
        values: Vec<SqlValue>,
    },
    /// `column is [not] null`
    Null {
        /// Column name.
        column: String,
        /// `is not null` when true.
        negated: bool,
    },
}

/// An ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column name.
    pub column: String,
    /// Descending when true.
    pub descending: bool,
}

/// Dialect-neutral description of a DML/query statement.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    /// Statement kind.
    pub method: QueryMethod,
    /// Target table.
    pub table: Option<String>,
    /// Selected columns (empty means `*`).
    pub columns: Vec<String>,
    /// WHERE conditions, joined with `and`.
    pub wheres: Vec<WhereClause>,
    /// ORDER BY terms.
    pub orders: Vec<OrderBy>,
    /// LIMIT.
    pub limit: Option<u64>,
    /// OFFSET.
    pub offset: Option<u64>,
    /// Rows to insert, each as column/value pairs.
    pub insert: Vec<Vec<(String, SqlValue)>>,
    /// Assignments for UPDATE.
    pub update: Vec<(String, SqlValue)>,
    /// RETURNING columns.
    pub returning: Vec<String>,
    /// Raw SQL and its bindings.
    pub raw: Option<(String, Vec<SqlValue>)>,
    /// Extra driver options.
    pub options: JsonMap<String, JsonValue>,
    /// Caller context.
    pub context: Option<QueryContext>,
}

impl QueryBuilder {
    fn with_method(method: QueryMethod, table: Option<String>) -> Self {
        Self {
            method,
            table,
            columns: Vec::new(),
            wheres: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            insert: Vec::new(),
            update: Vec::new(),
            returning: Vec::new(),
            raw: None,
            options: JsonMap::new(),
            context: None,
        }
    }

    /// Starts a `SELECT` on `table`.
    #[must_use]
    pub fn select(table: impl Into<String>) -> Self {
        Self::with_method(QueryMethod::Select, Some(table.into()))
    }

    /// Starts a `SELECT` whose response is the first row.
    #[must_use]
    pub fn first(table: impl Into<String>) -> Self {
        Self::with_method(QueryMethod::First, Some(table.into()))
    }

    /// Starts a `SELECT` whose response is one column's values.
    #[must_use]
    pub fn pluck(table: impl Into<String>, column: impl Into<String>) -> Self {
        let mut builder = Self::with_method(QueryMethod::Pluck, Some(table.into()));
        builder.columns.push(column.into());
        builder
    }

    /// Starts an `INSERT` into `table`.
    #[must_use]
    pub fn insert(table: impl Into<String>) -> Self {
        Self::with_method(QueryMethod::Insert, Some(table.into()))
    }

    /// Starts an `UPDATE` of `table`.
    #[must_use]
    pub fn update(table: impl Into<String>) -> Self {
        Self::with_method(QueryMethod::Update, Some(table.into()))
    }

    /// Starts a `DELETE` from `table`.
    #[must_use]
    pub fn delete(table: impl Into<String>) -> Self {
        Self::with_method(QueryMethod::Delete, Some(table.into()))
    }

    /// Starts a `TRUNCATE` of `table`.
    #[must_use]
    pub fn truncate(table: impl Into<String>) -> Self {
        Self::with_method(QueryMethod::Truncate, Some(table.into()))
    }

    /// Starts a column metadata lookup, optionally for a single column.
    #[must_use]
    pub fn column_info(table: impl Into<String>, column: Option<&str>) -> Self {
        let mut builder = Self::with_method(QueryMethod::ColumnInfo, Some(table.into()));
        builder.columns.extend(column.map(String::from));
        builder
    }

    /// Wraps raw SQL.
    #[must_use]
    pub fn raw(sql: impl Into<String>, bindings: Vec<SqlValue>) -> Self {
        let mut builder = Self::with_method(QueryMethod::Raw, None);
        builder.raw = Some((sql.into(), bindings));
        builder
    }

    /// Sets the selected columns.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn where_eq<T: ToSqlValue>(self, column: &str, value: T) -> Self {
        self.where_op(column, "=", value)
    }

    /// Adds `column <operator> value`.
    #[must_use]
    pub fn where_op<T: ToSqlValue>(mut self, column: &str, operator: &str, value: T) -> Self {
        self.wheres.push(WhereClause::Compare {
            column: column.into(),
            operator: operator.into(),
            value: value.to_sql_value(),
        });
        self
    }

    /// Adds `column in (...)`.
    #[must_use]
    pub fn where_in<T: ToSqlValue>(mut self, column: &str, values: Vec<T>) -> Self {
        self.wheres.push(WhereClause::In {
            column: column.into(),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
        });
        self
    }

    /// Adds `column is null`, or `is not null` when `negated`.
    #[must_use]
    pub fn where_null(mut self, column: &str, negated: bool) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.into(),
            negated,
        });
        self
    }

    /// Adds an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.orders.push(OrderBy {
            column: column.into(),
            descending,
        });
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a row to insert.
    #[must_use]
    pub fn row(mut self, values: Vec<(&str, SqlValue)>) -> Self {
        self.insert
            .push(values.into_iter().map(|(c, v)| (String::from(c), v)).collect());
        self
    }

    /// Adds an UPDATE assignment.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.update.push((column.into(), value.to_sql_value()));
        self
    }

    /// Requests RETURNING columns.
    #[must_use]
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning = cols.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds a driver option.
    #[must_use]
    pub fn option(mut self, key: &str, value: JsonValue) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Attaches a caller context.
    #[must_use]
    pub fn context(mut self, context: QueryContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// A compiled statement: SQL text, positional bindings and options.
#[derive(Clone)]
pub struct CompiledQuery {
    /// SQL text. Empty means "nothing to run".
    pub sql: String,
    /// Positional bindings.
    pub bindings: Vec<SqlValue>,
    /// Statement kind.
    pub method: QueryMethod,
    /// Driver options, merged into the execution request.
    pub options: JsonMap<String, JsonValue>,
    /// Caller context.
    pub context: Option<QueryContext>,
    /// Column whose values a pluck returns.
    pub pluck: Option<String>,
    /// Custom response shaping.
    pub output: Option<OutputFn>,
}

impl CompiledQuery {
    /// Creates a compiled statement without bindings.
    #[must_use]
    pub fn new(method: QueryMethod, sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
            method,
            options: JsonMap::new(),
            context: None,
            pluck: None,
            output: None,
        }
    }

    /// Creates a raw statement.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(QueryMethod::Raw, sql)
    }

    /// Sets the bindings.
    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<SqlValue>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Sets the output hook.
    #[must_use]
    pub fn with_output(mut self, output: OutputFn) -> Self {
        self.output = Some(output);
        self
    }

    /// Returns whether there is no SQL to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

impl fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("sql", &self.sql)
            .field("bindings", &self.bindings)
            .field("method", &self.method)
            .field("options", &self.options)
            .field("context", &self.context)
            .field("pluck", &self.pluck)
            .field("output", &self.output.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_builder_collects_clauses() {
        let query = QueryBuilder::select("users")
            .columns(&["id", "name"])
            .where_eq("active", true)
            .where_in("role", vec!["admin", "staff"])
            .order_by("id", true)
            .limit(10);

        assert_eq!(query.method, QueryMethod::Select);
        assert_eq!(query.columns, vec!["id", "name"]);
        assert_eq!(query.wheres.len(), 2);
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_empty_compiled_query() {
        assert!(CompiledQuery::raw("").is_empty());
        assert!(CompiledQuery::raw("  \n").is_empty());
        assert!(!CompiledQuery::raw("select 1").is_empty());
    }

    #[test]
    fn test_statement_hook() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let ctx = QueryContext::default().on_statement(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        ctx.notify_statement(&StatementInfo::new("01a2", "select 1"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
