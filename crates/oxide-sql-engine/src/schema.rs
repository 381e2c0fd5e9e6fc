//! Schema descriptions handed to the table and schema compilers.
//!
//! These are plain data: the engine's fluent builders produce them and each
//! dialect's compilers turn them into SQL.

use crate::value::SqlValue;

/// Generic column types the engine can express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer primary key.
    Increments,
    /// Auto-incrementing big integer primary key.
    BigIncrements,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    BigInteger,
    /// Medium integer (3 bytes where supported).
    MediumInteger,
    /// Small integer (2 bytes).
    SmallInteger,
    /// Tiny integer (1 byte).
    TinyInteger,
    /// Single precision float.
    Float {
        /// Total digits.
        precision: Option<u8>,
        /// Digits after the decimal point.
        scale: Option<u8>,
    },
    /// Double precision float.
    Double {
        /// Total digits.
        precision: Option<u8>,
        /// Digits after the decimal point.
        scale: Option<u8>,
    },
    /// Exact numeric.
    Decimal {
        /// Total digits.
        precision: Option<u8>,
        /// Digits after the decimal point.
        scale: Option<u8>,
    },
    /// Variable-length string.
    String(Option<u32>),
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Date.
    Date,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
    /// Time of day.
    Time,
    /// Binary data.
    Binary(Option<u32>),
    /// UUID.
    Uuid,
    /// Enumerated values.
    Enum(Vec<String>),
    /// JSON document.
    Json,
    /// Binary JSON document.
    Jsonb,
    /// A backend-specific type spelled verbatim.
    Specific(String),
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal rendered inline.
    Value(SqlValue),
    /// Raw SQL expression (e.g., `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of the default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Value(value) => value.to_sql_inline(),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// A complete column description.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Generic type.
    pub column_type: ColumnType,
    /// `Some(false)` for NOT NULL, `Some(true)` for explicit NULL.
    pub nullable: Option<bool>,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Whether a UNIQUE constraint was requested.
    pub unique: bool,
    /// Primary key request, with optional constraint name.
    pub primary: Option<Option<String>>,
    /// Index request, with optional index name.
    pub index: Option<Option<String>>,
    /// Column comment.
    pub comment: Option<String>,
    /// Collation for string columns.
    pub collation: Option<String>,
}

impl ColumnDefinition {
    /// Creates a new column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: None,
            default: None,
            unique: false,
            primary: None,
            index: None,
            comment: None,
            collation: None,
        }
    }
}

/// Table-level commands that are not column definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    /// Drop columns.
    DropColumns(Vec<String>),
    /// Rename a column.
    RenameColumn {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Primary key over the given columns.
    Primary {
        /// Columns.
        columns: Vec<String>,
        /// Optional constraint name.
        name: Option<String>,
    },
    /// Unique constraint over the given columns.
    Unique {
        /// Columns.
        columns: Vec<String>,
        /// Optional constraint name.
        name: Option<String>,
    },
    /// Index over the given columns.
    Index {
        /// Columns.
        columns: Vec<String>,
        /// Optional index name.
        name: Option<String>,
    },
    /// Drop an index.
    DropIndex {
        /// Columns the index was created over.
        columns: Vec<String>,
        /// Optional index name.
        name: Option<String>,
    },
    /// Table comment.
    Comment(String),
}

/// Whether a table description creates or alters a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    /// `CREATE TABLE`.
    Create,
    /// `CREATE TABLE IF NOT EXISTS`.
    CreateIfNotExists,
    /// `ALTER TABLE`.
    Alter,
}

/// Description of one create/alter table call.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBuilder {
    /// Table name.
    pub name: String,
    /// Create or alter.
    pub action: TableAction,
    /// Columns to create or add.
    pub columns: Vec<ColumnDefinition>,
    /// Additional commands, in call order.
    pub commands: Vec<TableCommand>,
}

impl TableBuilder {
    /// Starts a table description.
    #[must_use]
    pub fn new(name: impl Into<String>, action: TableAction) -> Self {
        Self {
            name: name.into(),
            action,
            columns: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a table-level command.
    #[must_use]
    pub fn command(mut self, command: TableCommand) -> Self {
        self.commands.push(command);
        self
    }
}

/// A single schema-level call.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaCommand {
    /// Create or alter a table.
    Table(TableBuilder),
    /// Drop a table.
    DropTable(String),
    /// Drop a table if it exists.
    DropTableIfExists(String),
    /// Rename a table.
    RenameTable {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Check whether a table exists.
    HasTable(String),
    /// Check whether a column exists.
    HasColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// Create a schema.
    CreateSchema(String),
    /// Create a schema if it does not exist.
    CreateSchemaIfNotExists(String),
    /// Drop a schema.
    DropSchema(String),
    /// Drop a schema if it exists.
    DropSchemaIfExists(String),
    /// Raw SQL passed through as-is.
    Raw(String),
}

/// An ordered sequence of schema calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaBuilder {
    /// Schema the calls run in, if not the session default.
    pub schema: Option<String>,
    /// Calls in order.
    pub commands: Vec<SchemaCommand>,
}

impl SchemaBuilder {
    /// Creates an empty schema builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scopes table operations to a schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Appends a call.
    #[must_use]
    pub fn push(mut self, command: SchemaCommand) -> Self {
        self.commands.push(command);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_value_to_sql() {
        assert_eq!(DefaultValue::Value(SqlValue::Null).to_sql(), "NULL");
        assert_eq!(DefaultValue::Value(SqlValue::Int(42)).to_sql(), "42");
        assert_eq!(
            DefaultValue::Value(SqlValue::Text("it's".into())).to_sql(),
            "'it''s'"
        );
        assert_eq!(
            DefaultValue::Expression("CURRENT_TIMESTAMP".into()).to_sql(),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_table_builder_keeps_call_order() {
        let table = TableBuilder::new("users", TableAction::Alter)
            .column(ColumnDefinition::new("email", ColumnType::String(Some(255))))
            .command(TableCommand::DropColumns(vec!["legacy".into()]))
            .command(TableCommand::Comment("people".into()));

        assert_eq!(table.columns.len(), 1);
        assert_eq!(
            table.commands,
            vec![
                TableCommand::DropColumns(vec!["legacy".into()]),
                TableCommand::Comment("people".into()),
            ]
        );
    }
}
