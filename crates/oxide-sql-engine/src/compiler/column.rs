//! Column compilation and column building.
//!
//! [`ColumnCompiler`] maps every generic column construct to SQL text. Its
//! provided methods are the shared base dialect (MySQL-flavoured); a backend
//! overrides only the constructs where it diverges and reaches the base
//! through [`DefaultColumnCompiler`] when it needs to delegate explicitly.
//!
//! [`ColumnBuilderDialect`] does the same for the builder-side column
//! modifiers that some backends cannot honour (`primary`, `index`).

use crate::formatter::Formatter;
use crate::schema::{ColumnDefinition, ColumnType, DefaultValue};
use crate::value::ToSqlValue;

/// Translates generic column constructs into SQL type fragments.
pub trait ColumnCompiler {
    /// Auto-incrementing integer primary key.
    fn increments(&self) -> String {
        String::from("int unsigned not null auto_increment primary key")
    }

    /// Auto-incrementing big integer primary key.
    fn big_increments(&self) -> String {
        String::from("bigint unsigned not null auto_increment primary key")
    }

    /// 4-byte integer.
    fn integer(&self) -> String {
        String::from("int")
    }

    /// 8-byte integer.
    fn big_integer(&self) -> String {
        String::from("bigint")
    }

    /// 3-byte integer.
    fn medium_integer(&self) -> String {
        String::from("mediumint")
    }

    /// 2-byte integer.
    fn small_integer(&self) -> String {
        String::from("smallint")
    }

    /// 1-byte integer.
    fn tiny_integer(&self) -> String {
        String::from("tinyint")
    }

    /// Single precision float.
    fn floating(&self, precision: Option<u8>, scale: Option<u8>) -> String {
        format!("float({}, {})", precision.unwrap_or(8), scale.unwrap_or(2))
    }

    /// Double precision float.
    fn double(&self, precision: Option<u8>, scale: Option<u8>) -> String {
        match precision {
            Some(p) => format!("double({p}, {})", scale.unwrap_or(2)),
            None => String::from("double"),
        }
    }

    /// Exact numeric.
    fn decimal(&self, precision: Option<u8>, scale: Option<u8>) -> String {
        format!("decimal({}, {})", precision.unwrap_or(8), scale.unwrap_or(2))
    }

    /// Variable-length string.
    fn string(&self, length: Option<u32>) -> String {
        format!("varchar({})", length.unwrap_or(255))
    }

    /// Unbounded text.
    fn text(&self) -> String {
        String::from("text")
    }

    /// Boolean.
    fn boolean(&self) -> String {
        String::from("boolean")
    }

    /// Date.
    fn date(&self) -> String {
        String::from("date")
    }

    /// Date and time.
    fn datetime(&self) -> String {
        String::from("datetime")
    }

    /// Timestamp.
    fn timestamp(&self) -> String {
        String::from("timestamp")
    }

    /// Time of day.
    fn time(&self) -> String {
        String::from("time")
    }

    /// Binary data.
    fn binary(&self, length: Option<u32>) -> String {
        length.map_or_else(|| String::from("blob"), |n| format!("varbinary({n})"))
    }

    /// UUID.
    fn uuid(&self) -> String {
        String::from("char(36)")
    }

    /// Enumerated values.
    fn enu(&self, values: &[String]) -> String {
        let allowed: Vec<String> = values
            .iter()
            .map(|v| format!("'{}'", v.replace('\'', "''")))
            .collect();
        format!("enum({})", allowed.join(", "))
    }

    /// JSON document.
    fn json(&self) -> String {
        String::from("json")
    }

    /// Binary JSON document.
    fn jsonb(&self) -> String {
        String::from("json")
    }

    /// A type spelled verbatim.
    fn specific_type(&self, name: &str) -> String {
        name.to_string()
    }

    /// Dispatches a generic type to its construct.
    fn column_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Increments => self.increments(),
            ColumnType::BigIncrements => self.big_increments(),
            ColumnType::Integer => self.integer(),
            ColumnType::BigInteger => self.big_integer(),
            ColumnType::MediumInteger => self.medium_integer(),
            ColumnType::SmallInteger => self.small_integer(),
            ColumnType::TinyInteger => self.tiny_integer(),
            ColumnType::Float { precision, scale } => self.floating(*precision, *scale),
            ColumnType::Double { precision, scale } => self.double(*precision, *scale),
            ColumnType::Decimal { precision, scale } => self.decimal(*precision, *scale),
            ColumnType::String(length) => self.string(*length),
            ColumnType::Text => self.text(),
            ColumnType::Boolean => self.boolean(),
            ColumnType::Date => self.date(),
            ColumnType::DateTime => self.datetime(),
            ColumnType::Timestamp => self.timestamp(),
            ColumnType::Time => self.time(),
            ColumnType::Binary(length) => self.binary(*length),
            ColumnType::Uuid => self.uuid(),
            ColumnType::Enum(values) => self.enu(values),
            ColumnType::Json => self.json(),
            ColumnType::Jsonb => self.jsonb(),
            ColumnType::Specific(name) => self.specific_type(name),
        }
    }

    /// Renders the modifiers that follow the type.
    fn modifiers(&self, column: &ColumnDefinition) -> Vec<String> {
        let mut parts = Vec::new();
        match column.nullable {
            Some(false) => parts.push(String::from("not null")),
            Some(true) => parts.push(String::from("null")),
            None => {}
        }
        if let Some(ref default) = column.default {
            parts.push(format!("default {}", default.to_sql()));
        }
        if column.unique {
            parts.push(String::from("unique"));
        }
        if column.primary.is_some()
            && !matches!(
                column.column_type,
                ColumnType::Increments | ColumnType::BigIncrements
            )
        {
            parts.push(String::from("primary key"));
        }
        if let Some(ref comment) = column.comment {
            parts.push(format!("comment '{}'", comment.replace('\'', "''")));
        }
        if let Some(ref collation) = column.collation {
            parts.push(format!("collate '{collation}'"));
        }
        parts
    }

    /// Renders a full column definition.
    fn compile_column(&self, column: &ColumnDefinition, formatter: &Formatter<'_>) -> String {
        let mut sql = format!(
            "{} {}",
            formatter.wrap(&column.name),
            self.column_type(&column.column_type)
        );
        for modifier in self.modifiers(column) {
            sql.push(' ');
            sql.push_str(&modifier);
        }
        sql
    }
}

/// The shared base column compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultColumnCompiler;

impl ColumnCompiler for DefaultColumnCompiler {}

/// Builder-side behaviour for column modifiers.
pub trait ColumnBuilderDialect {
    /// Marks the column as (part of) the primary key.
    fn primary(&self, column: &mut ColumnDefinition, constraint_name: Option<String>) {
        column.primary = Some(constraint_name);
    }

    /// Requests an index on the column.
    fn index(&self, column: &mut ColumnDefinition, index_name: Option<String>) {
        column.index = Some(index_name);
    }
}

/// The shared base column builder behaviour.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultColumnBuilder;

impl ColumnBuilderDialect for DefaultColumnBuilder {}

/// Fluent column builder bound to a dialect's modifier behaviour.
pub struct ColumnBuilder<'d> {
    dialect: &'d dyn ColumnBuilderDialect,
    column: ColumnDefinition,
}

impl<'d> ColumnBuilder<'d> {
    /// Creates a builder for a column of `column_type`.
    #[must_use]
    pub fn new(
        dialect: &'d dyn ColumnBuilderDialect,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            dialect,
            column: ColumnDefinition::new(name, column_type),
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_nullable(mut self) -> Self {
        self.column.nullable = Some(false);
        self
    }

    /// Marks the column explicitly nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.column.nullable = Some(true);
        self
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_to<T: ToSqlValue>(mut self, value: T) -> Self {
        self.column.default = Some(DefaultValue::Value(value.to_sql_value()));
        self
    }

    /// Sets a raw SQL default expression.
    #[must_use]
    pub fn default_raw(mut self, expr: impl Into<String>) -> Self {
        self.column.default = Some(DefaultValue::Expression(expr.into()));
        self
    }

    /// Adds a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.column.unique = true;
        self
    }

    /// Marks the column as primary key, as the dialect understands it.
    #[must_use]
    pub fn primary(mut self, constraint_name: Option<&str>) -> Self {
        let dialect = self.dialect;
        dialect.primary(&mut self.column, constraint_name.map(String::from));
        self
    }

    /// Requests an index, as the dialect understands it.
    #[must_use]
    pub fn index(mut self, index_name: Option<&str>) -> Self {
        let dialect = self.dialect;
        dialect.index(&mut self.column, index_name.map(String::from));
        self
    }

    /// Sets a comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.column.comment = Some(comment.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.column.collation = Some(collation.into());
        self
    }

    /// Finishes the column.
    #[must_use]
    pub fn build(self) -> ColumnDefinition {
        self.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::IdentifierWrapper;

    struct Plain;

    impl IdentifierWrapper for Plain {}

    #[test]
    fn test_base_type_mapping() {
        let compiler = DefaultColumnCompiler;
        assert_eq!(
            compiler.column_type(&ColumnType::Increments),
            "int unsigned not null auto_increment primary key"
        );
        assert_eq!(
            compiler.column_type(&ColumnType::Decimal {
                precision: Some(10),
                scale: None
            }),
            "decimal(10, 2)"
        );
        assert_eq!(
            compiler.column_type(&ColumnType::Double {
                precision: None,
                scale: None
            }),
            "double"
        );
        assert_eq!(
            compiler.column_type(&ColumnType::Enum(vec!["a".into(), "b".into()])),
            "enum('a', 'b')"
        );
        assert_eq!(compiler.column_type(&ColumnType::Jsonb), "json");
        assert_eq!(compiler.column_type(&ColumnType::String(None)), "varchar(255)");
    }

    #[test]
    fn test_compile_column_with_modifiers() {
        let dialect = DefaultColumnBuilder;
        let column = ColumnBuilder::new(&dialect, "status", ColumnType::String(Some(20)))
            .not_nullable()
            .default_to("new")
            .comment("workflow state")
            .build();

        let formatter = Formatter::new(&Plain, None);
        assert_eq!(
            DefaultColumnCompiler.compile_column(&column, &formatter),
            "\"status\" varchar(20) not null default 'new' comment 'workflow state'"
        );
    }

    #[test]
    fn test_default_builder_records_primary_and_index() {
        let dialect = DefaultColumnBuilder;
        let column = ColumnBuilder::new(&dialect, "code", ColumnType::String(None))
            .primary(Some("pk_code"))
            .index(None)
            .build();

        assert_eq!(column.primary, Some(Some(String::from("pk_code"))));
        assert_eq!(column.index, Some(None));
    }
}
