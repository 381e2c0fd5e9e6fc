mod common;

use common::harness;
use oxide_sql_engine::{Client, Transaction, TransactionScope};

const SAVEPOINT_WARNING: &str = "Snowflake does not support savepoints.";

#[tokio::test]
async fn test_top_level_transaction_runs_statements() {
    let h = harness();
    let conn = h.client.acquire_raw_connection().await.unwrap();

    let trx = h.client.transaction(&conn, false);
    assert!(!trx.is_nested());
    trx.begin().await.unwrap();
    trx.commit().await.unwrap();

    let trx = h.client.transaction(&conn, false);
    trx.begin().await.unwrap();
    trx.rollback().await.unwrap();

    assert_eq!(
        h.state.executed_sql(),
        vec!["BEGIN;", "COMMIT;", "BEGIN;", "ROLLBACK;"]
    );
    assert!(h.logger.warnings().is_empty());
}

#[tokio::test]
async fn test_savepoint_operations_only_warn() {
    let h = harness();
    let conn = h.client.acquire_raw_connection().await.unwrap();
    let trx = h.client.transaction(&conn, false);

    trx.savepoint().await.unwrap();
    assert_eq!(h.logger.warnings(), vec![SAVEPOINT_WARNING]);
    trx.release().await.unwrap();
    assert_eq!(h.logger.warnings().len(), 2);
    trx.rollback_to().await.unwrap();
    assert_eq!(h.logger.warnings().len(), 3);

    assert!(h.state.executed_sql().is_empty());
}

#[tokio::test]
async fn test_nested_transaction_sends_nothing() {
    let h = harness();
    let conn = h.client.acquire_raw_connection().await.unwrap();

    let outer = h.client.transaction(&conn, false);
    outer.begin().await.unwrap();

    let inner = h.client.transaction(&conn, true);
    assert!(inner.is_nested());
    assert_ne!(inner.id(), outer.id());
    inner.begin().await.unwrap();
    inner.commit().await.unwrap();

    let failed = h.client.transaction(&conn, true);
    failed.begin().await.unwrap();
    failed.rollback().await.unwrap();

    outer.commit().await.unwrap();

    assert_eq!(h.state.executed_sql(), vec!["BEGIN;", "COMMIT;"]);
    assert_eq!(h.logger.warnings(), vec![SAVEPOINT_WARNING; 4]);
}

#[tokio::test]
async fn test_generic_transaction_uses_savepoints() {
    let h = harness();
    let conn = h.client.acquire_raw_connection().await.unwrap();

    let nested = Transaction::new(&h.client, &conn, true);
    nested.begin().await.unwrap();
    nested.rollback().await.unwrap();

    let id = nested.id();
    assert_eq!(
        h.state.executed_sql(),
        vec![
            format!("SAVEPOINT {id};"),
            format!("ROLLBACK TO SAVEPOINT {id};"),
        ]
    );
}
