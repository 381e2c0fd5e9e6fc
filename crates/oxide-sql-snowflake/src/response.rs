//! Response normalization and identifier casing.
//!
//! Snowflake folds unquoted identifiers to upper case and reports column
//! names that way. Outbound identifiers are therefore upper-cased before
//! quoting, and inbound rows get lower-case keys, so callers see the same
//! shape they would from other backends.

use oxide_sql_engine::formatter::IdentifierWrapper;
use oxide_sql_engine::{EngineResult, QueryContext, QueryEnvelope, QueryMethod, RawResponse};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::{PostProcessHook, WrapIdentifierHook};

/// Name of the per-row count field for a mutation, as the backend reports it.
#[must_use]
pub const fn affected_rows_field(method: QueryMethod) -> Option<&'static str> {
    match method {
        QueryMethod::Insert => Some("number of rows inserted"),
        QueryMethod::Update => Some("number of rows updated"),
        QueryMethod::Delete => Some("number of rows deleted"),
        _ => None,
    }
}

/// Shapes a backend response for the engine.
#[must_use]
pub fn process_response(envelope: QueryEnvelope) -> EngineResult {
    let QueryEnvelope { query, response } = envelope;
    if let Some(output) = &query.output {
        return output(response.unwrap_or_default());
    }
    let Some(response) = response else {
        return EngineResult::Empty;
    };

    match query.method {
        QueryMethod::Raw => EngineResult::Raw(response),
        QueryMethod::Select => EngineResult::Rows(response.rows.unwrap_or_default()),
        QueryMethod::First => EngineResult::Row(
            response
                .rows
                .and_then(|rows| rows.into_iter().next())
                .unwrap_or(JsonValue::Null),
        ),
        QueryMethod::Pluck => {
            let column = query.pluck.unwrap_or_default();
            let values = response
                .rows
                .unwrap_or_default()
                .into_iter()
                .map(|row| pluck_value(row, &column))
                .collect();
            EngineResult::Rows(values)
        }
        QueryMethod::Insert | QueryMethod::Update | QueryMethod::Delete => {
            match affected_rows(query.method, &response) {
                Some(count) => EngineResult::Count(count),
                None => EngineResult::Raw(response),
            }
        }
        QueryMethod::Truncate | QueryMethod::ColumnInfo => match response {
            RawResponse {
                rows: Some(rows),
                statement: Some(_),
            } => EngineResult::Rows(rows),
            other => EngineResult::Raw(other),
        },
    }
}

/// Sums the count field over the rows that carry it; `None` if none does.
fn affected_rows(method: QueryMethod, response: &RawResponse) -> Option<i64> {
    let field = affected_rows_field(method)?;
    response
        .rows
        .as_deref()?
        .iter()
        .filter_map(|row| row.get(field).and_then(JsonValue::as_i64))
        .fold(None, |sum, count| Some(sum.unwrap_or(0).saturating_add(count)))
}

fn pluck_value(row: JsonValue, column: &str) -> JsonValue {
    match row {
        JsonValue::Object(mut map) => {
            if let Some(value) = map.remove(column) {
                return value;
            }
            let key = map.keys().find(|k| k.eq_ignore_ascii_case(column)).cloned();
            key.and_then(|k| map.remove(&k)).unwrap_or(JsonValue::Null)
        }
        _ => JsonValue::Null,
    }
}

/// Lower-cases the keys of an object row. Other values pass through.
#[must_use]
pub fn lowercase_keys(row: JsonValue) -> JsonValue {
    match row {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect::<JsonMap<_, _>>(),
        ),
        other => other,
    }
}

fn lowercase_rows(rows: Vec<JsonValue>) -> Vec<JsonValue> {
    rows.into_iter().map(lowercase_keys).collect()
}

/// Final pass over a shaped result. `hook` replaces the default, which
/// lower-cases the keys of every row.
#[must_use]
pub fn post_process_response(
    result: EngineResult,
    context: Option<&QueryContext>,
    hook: Option<&PostProcessHook>,
) -> EngineResult {
    if let Some(hook) = hook {
        return hook(result, context);
    }
    match result {
        EngineResult::Raw(mut raw) => {
            raw.rows = raw.rows.map(lowercase_rows);
            EngineResult::Raw(raw)
        }
        EngineResult::Rows(rows) => EngineResult::Rows(lowercase_rows(rows)),
        EngineResult::Row(row) => EngineResult::Row(lowercase_keys(row)),
        EngineResult::Value(JsonValue::Array(rows)) => {
            EngineResult::Value(JsonValue::Array(lowercase_rows(rows)))
        }
        EngineResult::Value(JsonValue::Object(mut map)) => {
            if let Some(JsonValue::Array(rows)) = map.remove("rows") {
                map.insert(String::from("rows"), JsonValue::Array(lowercase_rows(rows)));
            }
            EngineResult::Value(JsonValue::Object(map))
        }
        other => other,
    }
}

/// Snowflake identifier casing, optionally replaced by a caller hook.
#[derive(Clone, Default)]
pub struct SnowflakeWrapper {
    hook: Option<WrapIdentifierHook>,
}

impl SnowflakeWrapper {
    /// Creates a wrapper; `hook` replaces the default casing when given.
    #[must_use]
    pub const fn new(hook: Option<WrapIdentifierHook>) -> Self {
        Self { hook }
    }
}

impl IdentifierWrapper for SnowflakeWrapper {
    fn wrap_identifier(
        &self,
        value: &str,
        default_wrap: &dyn Fn(&str) -> String,
        context: Option<&QueryContext>,
    ) -> String {
        if let Some(hook) = &self.hook {
            return hook(value, default_wrap, context);
        }
        if value.starts_with('"') {
            default_wrap(value)
        } else {
            default_wrap(&value.to_uppercase())
        }
    }
}

impl std::fmt::Debug for SnowflakeWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeWrapper")
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
