//! Transactions without savepoints.
//!
//! Snowflake has no savepoints. The savepoint operations warn and do
//! nothing, and a nested transaction therefore runs as part of its parent.

use async_trait::async_trait;
use oxide_sql_engine::logger::Logger;
use oxide_sql_engine::{Client, Result, Transaction, TransactionScope};
use tracing::debug;

use crate::compiler::capability::{shim, Shim};

/// Snowflake's transaction scope, wrapping the generic [`Transaction`].
pub struct SnowflakeTransaction<'a, C: Client> {
    inner: Transaction<'a, C>,
    logger: &'a dyn Logger,
}

impl<'a, C: Client> SnowflakeTransaction<'a, C> {
    /// Wraps `inner`, reporting ignored savepoint operations to `logger`.
    #[must_use]
    pub fn new(inner: Transaction<'a, C>, logger: &'a dyn Logger) -> Self {
        Self { inner, logger }
    }

    fn ignore(&self, construct: &str) {
        debug!(trx = %self.inner.id(), operation = construct, "Skipping savepoint operation");
        if let Some(message) = shim(construct).and_then(Shim::warning) {
            self.logger.warn(message);
        }
    }
}

#[async_trait]
impl<'a, C: Client> TransactionScope for SnowflakeTransaction<'a, C> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn is_nested(&self) -> bool {
        self.inner.is_nested()
    }

    async fn begin(&self) -> Result<()> {
        if self.is_nested() {
            return self.savepoint().await;
        }
        self.inner.begin().await
    }

    async fn commit(&self) -> Result<()> {
        if self.is_nested() {
            return self.release().await;
        }
        self.inner.commit().await
    }

    async fn rollback(&self) -> Result<()> {
        if self.is_nested() {
            return self.rollback_to().await;
        }
        self.inner.rollback().await
    }

    async fn savepoint(&self) -> Result<()> {
        self.ignore("savepoint");
        Ok(())
    }

    async fn release(&self) -> Result<()> {
        self.ignore("release");
        Ok(())
    }

    async fn rollback_to(&self) -> Result<()> {
        self.ignore("rollbackTo");
        Ok(())
    }
}
