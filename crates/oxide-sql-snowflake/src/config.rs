//! Connection settings and client configuration.

use std::fmt;
use std::sync::Arc;

use oxide_sql_engine::logger::{Logger, TracingLogger};
use oxide_sql_engine::{EngineResult, QueryContext};
use serde::{Deserialize, Serialize};

/// Dialect name reported to the engine.
pub const DIALECT: &str = "snowflake";

/// Driver name reported to the engine.
pub const DRIVER_NAME: &str = "snowflake-sdk";

/// Replaces the default response post-processing.
pub type PostProcessHook =
    Arc<dyn Fn(EngineResult, Option<&QueryContext>) -> EngineResult + Send + Sync>;

/// Replaces the default identifier wrapping. Receives the segment, the
/// engine's default wrapping function and the caller context.
pub type WrapIdentifierHook =
    Arc<dyn Fn(&str, &dyn Fn(&str) -> String, Option<&QueryContext>) -> String + Send + Sync>;

/// Settings handed to the driver when opening a session.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// `<account>.<region>` host, from which account and region are
    /// derived when not given.
    pub host: Option<String>,
    /// Account identifier.
    pub account: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Login name, as the engine spells it.
    pub user: Option<String>,
    /// Login name, as the driver spells it.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Default database.
    pub database: Option<String>,
    /// Default schema.
    pub schema: Option<String>,
    /// Warehouse.
    pub warehouse: Option<String>,
    /// Role.
    pub role: Option<String>,
    /// Authenticator (`SNOWFLAKE`, `EXTERNALBROWSER`, `OAUTH`, ...).
    pub authenticator: Option<String>,
    /// Application name reported to the server.
    pub application: Option<String>,
}

fn is_missing(field: Option<&String>) -> bool {
    field.is_none_or(String::is_empty)
}

impl ConnectionSettings {
    /// Fills the driver-facing fields from the engine-facing ones.
    ///
    /// `username` is copied from `user` when absent. A dotted `host` yields
    /// `account` (first segment) and `region` (second segment), each only
    /// when absent.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if is_missing(self.username.as_ref()) && !is_missing(self.user.as_ref()) {
            self.username.clone_from(&self.user);
        }
        if let Some(host) = self.host.as_deref() {
            let mut segments = host.split('.');
            let account = segments.next().filter(|s| !s.is_empty()).map(String::from);
            let region = segments.next().filter(|s| !s.is_empty()).map(String::from);
            if is_missing(self.account.as_ref()) {
                self.account = account;
            }
            if is_missing(self.region.as_ref()) {
                self.region = region;
            }
        }
        self
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("account", &self.account)
            .field("region", &self.region)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Configuration of a [`SnowflakeClient`](crate::SnowflakeClient).
#[derive(Clone)]
pub struct SnowflakeConfig {
    /// Session settings.
    pub connection: ConnectionSettings,
    /// Custom response post-processing.
    pub post_process_response: Option<PostProcessHook>,
    /// Custom identifier wrapping.
    pub wrap_identifier: Option<WrapIdentifierHook>,
    /// Destination of client diagnostics.
    pub logger: Arc<dyn Logger>,
}

impl SnowflakeConfig {
    /// Creates a configuration with default hooks and a `tracing` logger.
    #[must_use]
    pub fn new(connection: ConnectionSettings) -> Self {
        Self {
            connection,
            post_process_response: None,
            wrap_identifier: None,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Sets the response post-processing hook.
    #[must_use]
    pub fn with_post_process_response(
        mut self,
        hook: impl Fn(EngineResult, Option<&QueryContext>) -> EngineResult + Send + Sync + 'static,
    ) -> Self {
        self.post_process_response = Some(Arc::new(hook));
        self
    }

    /// Sets the identifier wrapping hook.
    #[must_use]
    pub fn with_wrap_identifier(
        mut self,
        hook: impl Fn(&str, &dyn Fn(&str) -> String, Option<&QueryContext>) -> String
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.wrap_identifier = Some(Arc::new(hook));
        self
    }

    /// Sets the diagnostics logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

impl fmt::Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("connection", &self.connection)
            .field("post_process_response", &self.post_process_response.is_some())
            .field("wrap_identifier", &self.wrap_identifier.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_is_copied_to_username() {
        let settings = ConnectionSettings {
            user: Some("loader".into()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(settings.username.as_deref(), Some("loader"));
        assert_eq!(settings.user.as_deref(), Some("loader"));

        let settings = ConnectionSettings {
            user: Some("loader".into()),
            username: Some("owner".into()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(settings.username.as_deref(), Some("owner"));
    }

    #[test]
    fn test_host_yields_account_and_region() {
        let settings = ConnectionSettings {
            host: Some("xy12345.eu-central-1".into()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(settings.account.as_deref(), Some("xy12345"));
        assert_eq!(settings.region.as_deref(), Some("eu-central-1"));
    }

    #[test]
    fn test_explicit_account_wins_over_host() {
        let settings = ConnectionSettings {
            host: Some("xy12345.eu-central-1".into()),
            account: Some("ab999".into()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(settings.account.as_deref(), Some("ab999"));
        assert_eq!(settings.region.as_deref(), Some("eu-central-1"));
    }

    #[test]
    fn test_host_without_region() {
        let settings = ConnectionSettings {
            host: Some("xy12345".into()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(settings.account.as_deref(), Some("xy12345"));
        assert_eq!(settings.region, None);
    }

    #[test]
    fn test_deserialize_settings() {
        let settings: ConnectionSettings = serde_json::from_str(
            r#"{"host": "acme.us-east-1", "user": "etl", "warehouse": "LOAD_WH"}"#,
        )
        .unwrap();
        let settings = settings.normalize();

        assert_eq!(settings.account.as_deref(), Some("acme"));
        assert_eq!(settings.username.as_deref(), Some("etl"));
        assert_eq!(settings.warehouse.as_deref(), Some("LOAD_WH"));
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = ConnectionSettings {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }
}
