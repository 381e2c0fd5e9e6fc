//! Transactions.
//!
//! [`Transaction`] is the generic implementation: plain `BEGIN`/`COMMIT`/
//! `ROLLBACK` at the top level and savepoints for nested transactions.
//! Backends that cannot honour part of this wrap it in their own
//! [`TransactionScope`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::client::Client;
use crate::error::Result;
use crate::query::CompiledQuery;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Transaction-scoped operations.
#[async_trait]
pub trait TransactionScope: Send + Sync {
    /// Identifier used for this transaction's savepoint.
    fn id(&self) -> &str;

    /// Whether this transaction runs inside another one.
    fn is_nested(&self) -> bool;

    /// Starts the transaction.
    async fn begin(&self) -> Result<()>;

    /// Commits the transaction.
    async fn commit(&self) -> Result<()>;

    /// Rolls the whole transaction back.
    async fn rollback(&self) -> Result<()>;

    /// Creates this transaction's savepoint.
    async fn savepoint(&self) -> Result<()>;

    /// Releases this transaction's savepoint.
    async fn release(&self) -> Result<()>;

    /// Rolls back to this transaction's savepoint.
    async fn rollback_to(&self) -> Result<()>;
}

/// The generic transaction.
pub struct Transaction<'a, C: Client> {
    client: &'a C,
    connection: &'a C::Connection,
    nested: bool,
    id: String,
}

impl<'a, C: Client> Transaction<'a, C> {
    /// Creates a transaction on `connection`. A nested transaction uses
    /// savepoints instead of `BEGIN`/`COMMIT`.
    #[must_use]
    pub fn new(client: &'a C, connection: &'a C::Connection, nested: bool) -> Self {
        let id = format!("trx{}", NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            client,
            connection,
            nested,
            id,
        }
    }

    async fn run(&self, sql: String) -> Result<()> {
        debug!(trx = %self.id, sql = %sql, "Transaction statement");
        self.client
            .query(self.connection, CompiledQuery::raw(sql))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<'a, C: Client> TransactionScope for Transaction<'a, C> {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_nested(&self) -> bool {
        self.nested
    }

    async fn begin(&self) -> Result<()> {
        if self.nested {
            return self.savepoint().await;
        }
        self.run(String::from("BEGIN;")).await
    }

    async fn commit(&self) -> Result<()> {
        if self.nested {
            return self.release().await;
        }
        self.run(String::from("COMMIT;")).await
    }

    async fn rollback(&self) -> Result<()> {
        if self.nested {
            return self.rollback_to().await;
        }
        self.run(String::from("ROLLBACK;")).await
    }

    async fn savepoint(&self) -> Result<()> {
        self.run(format!("SAVEPOINT {};", self.id)).await
    }

    async fn release(&self) -> Result<()> {
        self.run(format!("RELEASE SAVEPOINT {};", self.id)).await
    }

    async fn rollback_to(&self) -> Result<()> {
        self.run(format!("ROLLBACK TO SAVEPOINT {};", self.id)).await
    }
}
