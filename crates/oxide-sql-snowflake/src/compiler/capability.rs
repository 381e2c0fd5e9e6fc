//! What Snowflake does with each generic construct it diverges on.

use std::collections::HashMap;
use std::sync::LazyLock;

use oxide_sql_engine::CompileError;

use crate::config::DIALECT;

/// Warning emitted for index requests.
pub const INDEX_WARNING: &str = "Snowflake does not support the creation of indexes.";

/// Warning emitted for savepoint operations.
pub const SAVEPOINT_WARNING: &str = "Snowflake does not support savepoints.";

/// How a generic construct is adapted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shim {
    /// Emit this fragment instead of the generic one.
    Native(&'static str),
    /// Map the generic type onto this backend type.
    Substitute(&'static str),
    /// Honour the request as NOT NULL.
    NotNullable,
    /// Do nothing and warn with this message.
    Ignored(&'static str),
    /// Refuse to compile.
    Rejected,
}

impl Shim {
    /// The SQL fragment this shim emits, if any.
    #[must_use]
    pub const fn fragment(self) -> Option<&'static str> {
        match self {
            Self::Native(sql) | Self::Substitute(sql) => Some(sql),
            Self::NotNullable | Self::Ignored(_) | Self::Rejected => None,
        }
    }

    /// The warning this shim emits, if any.
    #[must_use]
    pub const fn warning(self) -> Option<&'static str> {
        match self {
            Self::Ignored(message) => Some(message),
            _ => None,
        }
    }
}

static CAPABILITIES: LazyLock<HashMap<&'static str, Shim>> = LazyLock::new(|| {
    HashMap::from([
        ("increments", Shim::Native("int not null autoincrement primary key")),
        ("bigincrements", Shim::Native("bigint not null autoincrement primary key")),
        ("mediumint", Shim::Substitute("integer")),
        ("decimal", Shim::Native("decimal")),
        ("double", Shim::Native("double")),
        ("enu", Shim::Substitute("varchar")),
        ("json", Shim::Substitute("variant")),
        ("jsonb", Shim::Substitute("variant")),
        ("primary", Shim::NotNullable),
        ("index", Shim::Ignored(INDEX_WARNING)),
        ("dropIndex", Shim::Ignored(INDEX_WARNING)),
        ("savepoint", Shim::Ignored(SAVEPOINT_WARNING)),
        ("release", Shim::Ignored(SAVEPOINT_WARNING)),
        ("rollbackTo", Shim::Ignored(SAVEPOINT_WARNING)),
        ("returning", Shim::Rejected),
    ])
});

/// Looks up the shim for `construct`. `None` means the base dialect applies.
#[must_use]
pub fn shim(construct: &str) -> Option<Shim> {
    CAPABILITIES.get(construct).copied()
}

/// The fragment registered for `construct`, if it has one.
#[must_use]
pub fn fragment(construct: &str) -> Option<&'static str> {
    shim(construct).and_then(Shim::fragment)
}

/// Fails when `construct` is rejected by this dialect.
///
/// # Errors
///
/// Returns [`CompileError::Unsupported`] for rejected constructs.
pub fn ensure_supported(construct: &'static str) -> Result<(), CompileError> {
    match shim(construct) {
        Some(Shim::Rejected) => Err(CompileError::Unsupported {
            dialect: DIALECT,
            feature: construct,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(fragment("json"), Some("variant"));
        assert_eq!(shim("primary"), Some(Shim::NotNullable));
        assert_eq!(shim("index").and_then(Shim::warning), Some(INDEX_WARNING));
        assert_eq!(shim("release").and_then(Shim::warning), Some(SAVEPOINT_WARNING));
        assert_eq!(shim("integer"), None);
    }

    #[test]
    fn test_returning_is_rejected() {
        let err = ensure_supported("returning").unwrap_err();
        assert_eq!(err.to_string(), "snowflake does not support returning");
        assert!(ensure_supported("index").is_ok());
    }
}
