//! Ordering engine for collections with an explicit `sort_order`.
//!
//! Three operations rewrite the sequence:
//!
//! - [`reorder_by_full_sequence`] assigns `1..=n` to the listed ids in order
//!   and leaves every other row alone.
//! - [`move_by_index`] moves one row within the full collection and renumbers
//!   all rows `1..=N`.
//! - [`reset_order`] renumbers all rows `1..=N` by id.
//!
//! Each runs in one transaction holding a transaction-scoped advisory lock
//! keyed on the table name, so renumbering on one collection never interleaves
//! while other collections proceed. An invalid index aborts before any write.

use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::repository::Resource;

/// Resources whose table has an integer `sort_order` column.
pub trait Orderable: Resource {}

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("Invalid index")]
    InvalidIndex { index: usize, len: usize },

    #[error("Duplicate id {0} in ordered ids")]
    DuplicateId(i64),

    #[error("Too many ids to order: {0}")]
    TooMany(usize),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Removes the element at `from` and reinserts it at `to`.
pub fn move_element<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), OrderingError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(OrderingError::InvalidIndex { index, len });
        }
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

/// `(id, position)` pairs with 1-based positions in list order.
pub fn positions(ids: &[i64]) -> Result<(Vec<i64>, Vec<i32>), OrderingError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(OrderingError::DuplicateId(*id));
        }
    }
    let orders = (1..=last_position(ids.len())?).collect();
    Ok((ids.to_vec(), orders))
}

/// Highest position for a sequence of `len` rows.
fn last_position(len: usize) -> Result<i32, OrderingError> {
    i32::try_from(len).map_err(|_| OrderingError::TooMany(len))
}

async fn lock_collection(tx: &mut Transaction<'_, Postgres>, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(table)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn apply_positions(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    ids: Vec<i64>,
    orders: Vec<i32>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(&format!(
        "UPDATE {table} AS t SET sort_order = v.position \
         FROM UNNEST($1::BIGINT[], $2::INT[]) AS v(id, position) \
         WHERE t.id = v.id"
    ))
    .bind(ids)
    .bind(orders)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Current ids of the whole collection in display order.
async fn current_sequence(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT id FROM {table} ORDER BY sort_order ASC, id ASC FOR UPDATE"
    ))
    .fetch_all(&mut **tx)
    .await
}

#[instrument(skip(db, ids), fields(db.table = T::TABLE, ids.count = ids.len()))]
pub async fn reorder_by_full_sequence<T: Orderable>(db: &PgPool, ids: &[i64]) -> Result<u64, OrderingError> {
    let (ids, orders) = positions(ids)?;

    let mut tx = db.begin().await?;
    lock_collection(&mut tx, T::TABLE).await?;
    let updated = apply_positions(&mut tx, T::TABLE, ids, orders).await?;
    tx.commit().await?;

    info!(updated, "Applied full-sequence reorder");
    Ok(updated)
}

#[instrument(skip(db), fields(db.table = T::TABLE))]
pub async fn move_by_index<T: Orderable>(db: &PgPool, from: usize, to: usize) -> Result<(), OrderingError> {
    let mut tx = db.begin().await?;
    lock_collection(&mut tx, T::TABLE).await?;

    let mut sequence = current_sequence(&mut tx, T::TABLE).await?;
    // Dropping the transaction on error rolls it back untouched.
    move_element(&mut sequence, from, to)?;

    let (ids, orders) = positions(&sequence)?;
    apply_positions(&mut tx, T::TABLE, ids, orders).await?;
    tx.commit().await?;

    debug!(from, to, len = sequence.len(), "Moved record");
    Ok(())
}

#[instrument(skip(db), fields(db.table = T::TABLE))]
pub async fn reset_order<T: Orderable>(db: &PgPool) -> Result<u64, OrderingError> {
    let mut tx = db.begin().await?;
    lock_collection(&mut tx, T::TABLE).await?;

    let result = sqlx::query(&format!(
        "UPDATE {table} AS t SET sort_order = r.position \
         FROM (SELECT id, ROW_NUMBER() OVER (ORDER BY id ASC)::INT AS position FROM {table}) AS r \
         WHERE t.id = r.id",
        table = T::TABLE
    ))
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(renumbered = result.rows_affected(), "Reset order by id");
    Ok(result.rows_affected())
}

/// Next free position at the end of the collection.
pub async fn next_sort_order<T: Orderable>(db: &PgPool) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(&format!(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {}",
        T::TABLE
    ))
    .fetch_one(db)
    .await
}
