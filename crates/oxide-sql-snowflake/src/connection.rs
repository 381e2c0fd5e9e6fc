//! Connection lifecycle.
//!
//! [`ConnectionManager`] opens, validates, closes and cancels Snowflake
//! sessions on behalf of the engine's pool. Each [`Connection`] carries a
//! disposed marker, set by the session's error listener or a failed close,
//! and a slot holding the statement currently running on it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use oxide_sql_engine::{ClientError, DriverError, Result, StatementInfo};
use tracing::{debug, warn};

use crate::config::ConnectionSettings;
use crate::driver::{Driver, RunningStatement, Session};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum StatementSlot {
    Idle,
    Starting,
    Running(Arc<dyn RunningStatement>),
}

/// A raw Snowflake session as handed to the pool.
pub struct Connection {
    id: u64,
    session: Arc<dyn Session>,
    disposed: Arc<Mutex<Option<DriverError>>>,
    slot: Mutex<StatementSlot>,
    closed: AtomicBool,
}

impl Connection {
    /// Process-unique connection id, used in logs.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The underlying session.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// The error that made this connection unusable, if any.
    #[must_use]
    pub fn disposed(&self) -> Option<DriverError> {
        lock(&self.disposed).clone()
    }

    /// Whether the connection carries a disposed marker.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        lock(&self.disposed).is_some()
    }

    /// Whether the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Metadata of the statement currently running, if any.
    #[must_use]
    pub fn running_statement(&self) -> Option<StatementInfo> {
        match &*lock(&self.slot) {
            StatementSlot::Running(statement) => Some(statement.info()),
            StatementSlot::Idle | StatementSlot::Starting => None,
        }
    }

    fn mark_disposed(&self, error: DriverError) {
        *lock(&self.disposed) = Some(error);
    }

    fn current_statement(&self) -> Option<Arc<dyn RunningStatement>> {
        match &*lock(&self.slot) {
            StatementSlot::Running(statement) => Some(Arc::clone(statement)),
            StatementSlot::Idle | StatementSlot::Starting => None,
        }
    }

    /// Reserves the statement slot. The slot is freed when the guard is
    /// dropped, including when the awaiting future is dropped.
    pub(crate) fn reserve_statement(&self) -> Result<StatementGuard<'_>> {
        let mut slot = lock(&self.slot);
        match &*slot {
            StatementSlot::Idle => {
                *slot = StatementSlot::Starting;
                Ok(StatementGuard { connection: self })
            }
            StatementSlot::Starting => Err(ClientError::StatementInProgress(String::from(
                "starting",
            ))),
            StatementSlot::Running(statement) => {
                Err(ClientError::StatementInProgress(statement.info().query_id))
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("disposed", &self.disposed())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Holds a connection's statement slot.
pub(crate) struct StatementGuard<'a> {
    connection: &'a Connection,
}

impl StatementGuard<'_> {
    /// Records the handle of the statement that started running.
    pub(crate) fn attach(&self, statement: Arc<dyn RunningStatement>) {
        *lock(&self.connection.slot) = StatementSlot::Running(statement);
    }
}

impl Drop for StatementGuard<'_> {
    fn drop(&mut self) {
        *lock(&self.connection.slot) = StatementSlot::Idle;
    }
}

/// Opens and closes sessions through a [`Driver`].
pub struct ConnectionManager {
    driver: Arc<dyn Driver>,
    settings: ConnectionSettings,
}

impl ConnectionManager {
    /// Creates a manager; `settings` are normalized once here.
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, settings: ConnectionSettings) -> Self {
        Self {
            driver,
            settings: settings.normalize(),
        }
    }

    /// The normalized settings sessions are opened with.
    #[must_use]
    pub const fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`] carrying the driver's error when
    /// the session cannot be opened. Listeners registered on the failed
    /// session are removed first.
    pub async fn acquire(&self) -> Result<Connection> {
        let session = self.driver.create_connection(&self.settings);
        let disposed = Arc::new(Mutex::new(None));
        let marker = Arc::clone(&disposed);
        session.on_error(Box::new(move |error: &DriverError| {
            *lock(&marker) = Some(error.clone());
        }));

        if let Err(error) = session.connect().await {
            session.remove_all_listeners();
            warn!(
                account = ?self.settings.account,
                error = %error,
                "Failed to open Snowflake session"
            );
            return Err(ClientError::Connection(error));
        }

        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(connection = id, account = ?self.settings.account, "Opened Snowflake session");
        Ok(Connection {
            id,
            session,
            disposed,
            slot: Mutex::new(StatementSlot::Idle),
            closed: AtomicBool::new(false),
        })
    }

    /// Reports whether `connection` can still be used. Never fails.
    pub async fn validate(&self, connection: &Connection) -> bool {
        if connection.is_disposed() || connection.is_closed() {
            return false;
        }
        match connection.session.is_valid().await {
            Ok(valid) => valid,
            Err(error) => {
                debug!(connection = connection.id, error = %error, "Validity probe failed");
                false
            }
        }
    }

    /// Closes `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Destroy`] when the session fails to close; the
    /// connection is then marked disposed. Listeners are removed either way.
    pub async fn destroy(&self, connection: &Connection) -> Result<()> {
        let outcome = connection.session.destroy().await;
        connection.closed.store(true, Ordering::Release);
        if let Err(ref error) = outcome {
            connection.mark_disposed(error.clone());
            warn!(connection = connection.id, error = %error, "Failed to close Snowflake session");
        } else {
            debug!(connection = connection.id, "Closed Snowflake session");
        }
        connection.session.remove_all_listeners();
        outcome.map_err(ClientError::Destroy)
    }

    /// Cancels the statement running on `connection`. Does nothing when no
    /// statement is running.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancel`] when the backend refuses.
    pub async fn cancel(&self, connection: &Connection) -> Result<()> {
        let Some(statement) = connection.current_statement() else {
            debug!(connection = connection.id, "No running statement to cancel");
            return Ok(());
        };
        let info = statement.info();
        debug!(connection = connection.id, query_id = %info.query_id, "Cancelling statement");
        statement.cancel().await.map_err(ClientError::Cancel)
    }
}
