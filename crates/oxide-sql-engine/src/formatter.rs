//! Identifier wrapping.
//!
//! Every identifier a compiler emits goes through [`Formatter::wrap`], which
//! splits aliases and dotted paths and hands each segment to the client's
//! [`IdentifierWrapper`] together with [`default_wrap`].

use std::sync::LazyLock;

use regex::Regex;

use crate::query::QueryContext;

static ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+as\s+").expect("Invalid alias pattern regex"));

/// Quotes a single identifier segment with double quotes.
///
/// `*` is left bare; embedded quotes are doubled.
#[must_use]
pub fn default_wrap(value: &str) -> String {
    if value == "*" {
        return String::from("*");
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Customizes how identifier segments are quoted.
pub trait IdentifierWrapper {
    /// Wraps one identifier segment. `default_wrap` is the engine's own
    /// quoting function.
    fn wrap_identifier(
        &self,
        value: &str,
        default_wrap: &dyn Fn(&str) -> String,
        context: Option<&QueryContext>,
    ) -> String {
        let _ = context;
        default_wrap(value)
    }
}

/// Wraps identifiers for one compilation context.
pub struct Formatter<'a> {
    wrapper: &'a dyn IdentifierWrapper,
    context: Option<&'a QueryContext>,
}

impl<'a> Formatter<'a> {
    /// Creates a formatter.
    #[must_use]
    pub fn new(wrapper: &'a dyn IdentifierWrapper, context: Option<&'a QueryContext>) -> Self {
        Self { wrapper, context }
    }

    /// Wraps a possibly dotted, possibly aliased identifier.
    #[must_use]
    pub fn wrap(&self, value: &str) -> String {
        if let Some(found) = ALIAS.find(value) {
            let column = &value[..found.start()];
            let alias = &value[found.end()..];
            return format!("{} as {}", self.wrap(column), self.wrap_segment(alias));
        }
        value
            .split('.')
            .map(|segment| self.wrap_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Wraps and comma-joins a column list; empty means `*`.
    #[must_use]
    pub fn columnize(&self, columns: &[String]) -> String {
        if columns.is_empty() {
            return String::from("*");
        }
        columns
            .iter()
            .map(|c| self.wrap(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns `count` comma-separated placeholders.
    #[must_use]
    pub fn parameters(&self, count: usize) -> String {
        vec![crate::value::SqlValue::placeholder(); count].join(", ")
    }

    fn wrap_segment(&self, segment: &str) -> String {
        self.wrapper
            .wrap_identifier(segment.trim(), &default_wrap, self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl IdentifierWrapper for Plain {}

    struct Upper;

    impl IdentifierWrapper for Upper {
        fn wrap_identifier(
            &self,
            value: &str,
            default_wrap: &dyn Fn(&str) -> String,
            _context: Option<&QueryContext>,
        ) -> String {
            default_wrap(&value.to_uppercase())
        }
    }

    #[test]
    fn test_default_wrap() {
        assert_eq!(default_wrap("users"), "\"users\"");
        assert_eq!(default_wrap("*"), "*");
        assert_eq!(default_wrap("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_wrap_dotted_and_aliased() {
        let formatter = Formatter::new(&Plain, None);
        assert_eq!(formatter.wrap("public.users"), "\"public\".\"users\"");
        assert_eq!(formatter.wrap("users.*"), "\"users\".*");
        assert_eq!(formatter.wrap("name AS n"), "\"name\" as \"n\"");
    }

    #[test]
    fn test_wrap_goes_through_wrapper() {
        let formatter = Formatter::new(&Upper, None);
        assert_eq!(formatter.wrap("app.users as u"), "\"APP\".\"USERS\" as \"U\"");
        assert_eq!(formatter.columnize(&[]), "*");
        assert_eq!(
            formatter.columnize(&["id".into(), "name".into()]),
            "\"ID\", \"NAME\""
        );
    }

    #[test]
    fn test_parameters() {
        let formatter = Formatter::new(&Plain, None);
        assert_eq!(formatter.parameters(3), "?, ?, ?");
        assert_eq!(formatter.parameters(0), "");
    }
}
