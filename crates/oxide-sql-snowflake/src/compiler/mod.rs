//! Snowflake compilers.
//!
//! One compiler value is created per compilation context. Compilers only
//! borrow the builder description and read the shared capability table.

pub mod capability;
mod column;
mod query;
mod schema;
mod table;

pub use column::{SnowflakeColumnBuilder, SnowflakeColumnCompiler};
pub use query::SnowflakeQueryCompiler;
pub use schema::SnowflakeSchemaCompiler;
pub use table::SnowflakeTableCompiler;

use oxide_sql_engine::formatter::IdentifierWrapper;
use oxide_sql_engine::logger::Logger;
use serde_json::Value as JsonValue;

/// Client-provided pieces a compiler needs.
#[derive(Clone, Copy)]
pub struct DialectContext<'a> {
    /// Identifier casing.
    pub wrapper: &'a dyn IdentifierWrapper,
    /// Destination of capability warnings.
    pub logger: &'a dyn Logger,
}

/// Spells an identifier the way Snowflake stores it in
/// `information_schema`: unquoted names are upper-cased, quoted names keep
/// their case and lose the quotes.
pub(crate) fn stored_name(identifier: &str) -> String {
    let trimmed = identifier.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(quoted) => quoted.replace("\"\"", "\""),
        None => trimmed.to_uppercase(),
    }
}

/// Splits `schema.table` into its parts.
pub(crate) fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((schema, table)) => (Some(schema), table),
        None => (None, name),
    }
}

/// Reads a field from a backend row, falling back to a case-insensitive
/// match on the key.
pub(crate) fn field<'r>(row: &'r JsonValue, key: &str) -> Option<&'r JsonValue> {
    let object = row.as_object()?;
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name("users"), "USERS");
        assert_eq!(stored_name("\"MixedCase\""), "MixedCase");
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("analytics.events"), (Some("analytics"), "events"));
        assert_eq!(split_qualified("events"), (None, "events"));
    }

    #[test]
    fn test_field_lookup() {
        let row = json!({"COLUMN_NAME": "ID"});
        assert_eq!(field(&row, "COLUMN_NAME"), Some(&json!("ID")));
        assert_eq!(field(&row, "column_name"), Some(&json!("ID")));
        assert_eq!(field(&json!(3), "x"), None);
    }
}
