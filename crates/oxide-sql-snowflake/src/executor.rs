//! Statement execution.

use futures::StreamExt;
use oxide_sql_engine::{ClientError, CompiledQuery, QueryEnvelope, RawResponse, Result, RowSink};
use tracing::debug;

use crate::connection::Connection;
use crate::driver::{Execution, StatementRequest};

/// Runs `query` on `connection` and attaches the backend response.
///
/// Empty SQL resolves to an envelope without a response. While the
/// statement runs its handle is attached to the connection, so it can be
/// cancelled; the handle is detached before the outcome is inspected.
///
/// # Errors
///
/// Returns [`ClientError::StatementInProgress`] if the connection is busy
/// and [`ClientError::Execution`] with the backend's error if the statement
/// fails.
pub async fn execute(connection: &Connection, query: CompiledQuery) -> Result<QueryEnvelope> {
    if query.is_empty() {
        debug!(connection = connection.id(), method = %query.method, "Nothing to execute");
        return Ok(QueryEnvelope {
            query,
            response: None,
        });
    }

    let guard = connection.reserve_statement()?;
    let Execution {
        statement,
        completion,
    } = connection.session().execute(StatementRequest::buffered(&query));
    let info = statement.info();
    guard.attach(statement);
    if let Some(context) = &query.context {
        context.notify_statement(&info);
    }
    debug!(
        connection = connection.id(),
        query_id = %info.query_id,
        sql = %query.sql,
        bindings = query.bindings.len(),
        "Executing statement"
    );

    let outcome = completion.await;
    drop(guard);

    match outcome {
        Ok(output) => Ok(QueryEnvelope {
            query,
            response: Some(RawResponse {
                rows: output.rows,
                statement: Some(info),
            }),
        }),
        Err(error) => {
            debug!(query_id = %info.query_id, error = %error, "Statement failed");
            Err(ClientError::Execution(error))
        }
    }
}

/// Runs `query` on `connection` and forwards every row to `sink`.
///
/// A cursor error is sent to `sink` once and returned once. If the receiving
/// side of `sink` goes away the stream ends quietly.
///
/// # Errors
///
/// Returns [`ClientError::EmptyQuery`] without contacting the backend when
/// there is no SQL, [`ClientError::StatementInProgress`] if the connection
/// is busy, and [`ClientError::Stream`] if the cursor fails.
pub async fn execute_streaming(
    connection: &Connection,
    query: CompiledQuery,
    sink: RowSink,
) -> Result<()> {
    if query.is_empty() {
        return Err(ClientError::EmptyQuery);
    }

    let _guard = connection.reserve_statement()?;
    let request = StatementRequest::streaming(&query);
    debug!(connection = connection.id(), sql = %request.sql_text, "Streaming statement");
    let mut rows = connection.session().stream_rows(request);

    let mut forwarded = 0_usize;
    while let Some(item) = rows.next().await {
        match item {
            Ok(row) => {
                if sink.send(Ok(row)).await.is_err() {
                    debug!(rows = forwarded, "Row receiver dropped, ending stream");
                    return Ok(());
                }
                forwarded += 1;
            }
            Err(error) => {
                if sink.send(Err(error.clone())).await.is_err() {
                    debug!("Row receiver dropped before the stream error");
                }
                return Err(ClientError::Stream(error));
            }
        }
    }
    debug!(rows = forwarded, "Stream finished");
    Ok(())
}
