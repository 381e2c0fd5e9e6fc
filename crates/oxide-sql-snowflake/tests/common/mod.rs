#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{FutureExt, StreamExt};
use oxide_sql_engine::logger::Logger;
use oxide_sql_engine::{DriverError, StatementInfo};
use oxide_sql_snowflake::driver::{ErrorListener, RowStream};
use oxide_sql_snowflake::{
    ConnectionSettings, Driver, Execution, RunningStatement, Session, SnowflakeClient,
    SnowflakeConfig, StatementOutput, StatementRequest,
};
use serde_json::Value as JsonValue;
use tokio::sync::oneshot;

type Scripted = Result<Option<Vec<JsonValue>>, DriverError>;

/// Everything the scripted driver records and can be told to do.
#[derive(Default)]
pub struct DriverState {
    pub settings: Mutex<Option<ConnectionSettings>>,
    pub connects: AtomicUsize,
    pub destroys: AtomicUsize,
    pub cancels: AtomicUsize,
    pub executed: Mutex<Vec<StatementRequest>>,
    pub streamed: Mutex<Vec<StatementRequest>>,
    pub listeners: Mutex<Vec<ErrorListener>>,
    pub responses: Mutex<VecDeque<Scripted>>,
    pub stream_items: Mutex<Vec<Result<JsonValue, DriverError>>>,
    pub connect_error: Mutex<Option<DriverError>>,
    pub destroy_error: Mutex<Option<DriverError>>,
    pub probe: Mutex<Option<Result<bool, DriverError>>>,
    pub hold_next: AtomicBool,
    next_query: AtomicUsize,
}

impl DriverState {
    pub fn fail_connect(&self, error: DriverError) {
        *self.connect_error.lock().unwrap() = Some(error);
    }

    pub fn fail_destroy(&self, error: DriverError) {
        *self.destroy_error.lock().unwrap() = Some(error);
    }

    pub fn set_probe(&self, probe: Result<bool, DriverError>) {
        *self.probe.lock().unwrap() = Some(probe);
    }

    /// Queues the rows the next buffered statement returns.
    pub fn respond(&self, rows: Vec<JsonValue>) {
        self.responses.lock().unwrap().push_back(Ok(Some(rows)));
    }

    /// Queues a failure for the next buffered statement.
    pub fn respond_error(&self, error: DriverError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn stream(&self, items: Vec<Result<JsonValue, DriverError>>) {
        *self.stream_items.lock().unwrap() = items;
    }

    /// Keeps the next statement running until it is cancelled.
    pub fn hold_next_statement(&self) {
        self.hold_next.store(true, Ordering::SeqCst);
    }

    /// Raises a session-level error to every registered listener.
    pub fn emit_error(&self, error: &DriverError) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener(error);
        }
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.sql_text.clone())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

pub struct MockDriver {
    pub state: Arc<DriverState>,
}

impl Driver for MockDriver {
    fn create_connection(&self, settings: &ConnectionSettings) -> Arc<dyn Session> {
        *self.state.settings.lock().unwrap() = Some(settings.clone());
        Arc::new(MockSession {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockSession {
    state: Arc<DriverState>,
}

struct MockStatement {
    info: StatementInfo,
    state: Arc<DriverState>,
    cancelled: Arc<AtomicBool>,
    release: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl RunningStatement for MockStatement {
    fn info(&self) -> StatementInfo {
        self.info.clone()
    }

    async fn cancel(&self) -> Result<(), DriverError> {
        self.state.cancels.fetch_add(1, Ordering::SeqCst);
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(release) = self.release.lock().unwrap().take() {
            let _ = release.send(());
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MockSession {
    async fn connect(&self) -> Result<(), DriverError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        match self.state.connect_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn execute(&self, request: StatementRequest) -> Execution {
        let n = self.state.next_query.fetch_add(1, Ordering::SeqCst);
        let info = StatementInfo::new(format!("01b2-{n:04}"), request.sql_text.clone());
        self.state.executed.lock().unwrap().push(request);

        let response = self
            .state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Some(Vec::new())));
        let cancelled = Arc::new(AtomicBool::new(false));
        let (release, gate) = if self.state.hold_next.swap(false, Ordering::SeqCst) {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        let statement = Arc::new(MockStatement {
            info,
            state: Arc::clone(&self.state),
            cancelled: Arc::clone(&cancelled),
            release: Mutex::new(release),
        });
        let completion = async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if cancelled.load(Ordering::SeqCst) {
                return Err(DriverError::new("SQL execution canceled").with_code("000604"));
            }
            response.map(|rows| StatementOutput { rows })
        }
        .boxed();

        Execution {
            statement,
            completion,
        }
    }

    fn stream_rows(&self, request: StatementRequest) -> RowStream {
        self.state.streamed.lock().unwrap().push(request);
        let items: Vec<_> = self.state.stream_items.lock().unwrap().drain(..).collect();
        futures::stream::iter(items).boxed()
    }

    async fn destroy(&self) -> Result<(), DriverError> {
        self.state.destroys.fetch_add(1, Ordering::SeqCst);
        match self.state.destroy_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn is_valid(&self) -> Result<bool, DriverError> {
        self.state.probe.lock().unwrap().clone().unwrap_or(Ok(true))
    }

    fn on_error(&self, listener: ErrorListener) {
        self.state.listeners.lock().unwrap().push(listener);
    }

    fn remove_all_listeners(&self) {
        self.state.listeners.lock().unwrap().clear();
    }

    fn listener_count(&self) -> usize {
        self.state.listener_count()
    }
}

/// Collects warnings instead of logging them.
#[derive(Default)]
pub struct RecordingLogger {
    warnings: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

pub fn settings() -> ConnectionSettings {
    ConnectionSettings {
        host: Some("xy12345.eu-central-1".into()),
        user: Some("loader".into()),
        password: Some("secret".into()),
        database: Some("ANALYTICS".into()),
        warehouse: Some("LOAD_WH".into()),
        ..Default::default()
    }
}

pub struct Harness {
    pub client: SnowflakeClient,
    pub state: Arc<DriverState>,
    pub logger: Arc<RecordingLogger>,
}

pub fn harness() -> Harness {
    harness_with(SnowflakeConfig::new(settings()))
}

pub fn harness_with(config: SnowflakeConfig) -> Harness {
    let state = Arc::new(DriverState::default());
    let logger = Arc::new(RecordingLogger::default());
    let config = config.with_logger(logger.clone());
    let driver = Arc::new(MockDriver {
        state: Arc::clone(&state),
    });
    Harness {
        client: SnowflakeClient::new(config, driver),
        state,
        logger,
    }
}
