//! Batch ledger repository: receipts, FEFO listing, and committing planned
//! deductions.

use chrono::{DateTime, Utc};
use stk_core::entities::{Batch, Item};
use stk_core::enums::{EntityType, JournalOp, StockTracking};
use stk_core::identity::Actor;
use stk_core::ids::PREFIX_BATCH;
use stk_core::requests::NewBatch;
use stk_core::responses::ReceiveOutcome;
use stk_core::stock::{BatchAllocation, Deduction, StockLevel};

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_date, fmt_ts, generate_id, get_bool, get_opt_string, now, parse_datetime,
    parse_optional_date, parse_optional_datetime, to_stored_precision,
};
use crate::repos::item::{load_item, write_item_quantity};
use crate::service::StockService;

/// Lot number given to the batch that absorbs an unbatched item's counter.
pub const OPENING_BALANCE_LOT: &str = "opening-balance";

const BATCH_COLUMNS: &str = "id, item_id, lot_number, quantity, initial_quantity, expiration_date, \
                             received_at, manufactured_at, is_open, created_at, updated_at";

/// Expiration ascending with undated batches last, then receipt, then creation.
const FEFO_ORDER: &str =
    "ORDER BY expiration_date IS NULL, expiration_date, received_at, created_at, id";

fn row_to_batch(row: &libsql::Row) -> Result<Batch, DatabaseError> {
    Ok(Batch {
        id: row.get::<String>(0)?,
        item_id: row.get::<String>(1)?,
        lot_number: get_opt_string(row, 2)?,
        quantity: row.get::<i64>(3)?,
        initial_quantity: row.get::<i64>(4)?,
        expiration_date: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        received_at: parse_datetime(&row.get::<String>(6)?)?,
        manufactured_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        is_open: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

async fn collect_batches(mut rows: libsql::Rows) -> Result<Vec<Batch>, DatabaseError> {
    let mut batches = Vec::new();
    while let Some(row) = rows.next().await? {
        batches.push(row_to_batch(&row)?);
    }
    Ok(batches)
}

/// Open batches of an item in FEFO order.
pub(crate) async fn fetch_open_batches(
    conn: &libsql::Connection,
    item_id: &str,
) -> Result<Vec<Batch>, DatabaseError> {
    let sql =
        format!("SELECT {BATCH_COLUMNS} FROM batches WHERE item_id = ?1 AND is_open = 1 {FEFO_ORDER}");
    collect_batches(conn.query(&sql, [item_id]).await?).await
}

pub(crate) async fn fetch_batch(
    conn: &libsql::Connection,
    batch_id: &str,
) -> Result<Batch, DatabaseError> {
    let sql = format!("SELECT {BATCH_COLUMNS} FROM batches WHERE id = ?1");
    let mut rows = conn.query(&sql, [batch_id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Batch, batch_id))?;
    row_to_batch(&row)
}

/// Load an item and its current stock level inside a transaction.
pub(crate) async fn load_stock(
    conn: &libsql::Connection,
    event_id: &str,
    item_id: &str,
) -> Result<(Item, StockLevel), DatabaseError> {
    let item = load_item(conn, event_id, item_id).await?;
    let batches = if item.is_batched() {
        fetch_open_batches(conn, item_id).await?
    } else {
        Vec::new()
    };
    let level = StockLevel::from_item(&item, batches);
    Ok((item, level))
}

struct BatchRow<'a> {
    item_id: &'a str,
    lot_number: Option<&'a str>,
    quantity: i64,
    expiration_date: Option<chrono::NaiveDate>,
    received_at: DateTime<Utc>,
    manufactured_at: Option<DateTime<Utc>>,
}

async fn insert_batch(
    conn: &libsql::Connection,
    row: BatchRow<'_>,
    at: DateTime<Utc>,
) -> Result<Batch, DatabaseError> {
    let id = generate_id(conn, PREFIX_BATCH).await?;
    conn.execute(
        "INSERT INTO batches (id, item_id, lot_number, quantity, initial_quantity, expiration_date,
                              received_at, manufactured_at, is_open, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        libsql::params![
            id.as_str(),
            row.item_id,
            row.lot_number,
            row.quantity,
            row.expiration_date.as_ref().map(fmt_date),
            fmt_ts(&row.received_at),
            row.manufactured_at.as_ref().map(fmt_ts),
            fmt_ts(&at)
        ],
    )
    .await?;

    Ok(Batch {
        id,
        item_id: row.item_id.to_string(),
        lot_number: row.lot_number.map(String::from),
        quantity: row.quantity,
        initial_quantity: row.quantity,
        expiration_date: row.expiration_date,
        received_at: row.received_at,
        manufactured_at: row.manufactured_at,
        is_open: true,
        created_at: at,
        updated_at: at,
    })
}

/// Apply planned batch takes, each guarded on the quantity it was planned
/// against.
async fn apply_allocations(
    conn: &libsql::Connection,
    batches: &[Batch],
    allocations: &[BatchAllocation],
    at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    for allocation in allocations {
        let planned = batches
            .iter()
            .find(|b| b.id == allocation.batch_id)
            .ok_or_else(|| {
                DatabaseError::Query(format!(
                    "allocation references unplanned batch {}",
                    allocation.batch_id
                ))
            })?;

        let mut batch = planned.clone();
        batch.deduct(allocation.consumed)?;

        let affected = conn
            .execute(
                "UPDATE batches SET quantity = ?1, is_open = ?2, updated_at = ?3
                 WHERE id = ?4 AND quantity = ?5 AND is_open = 1",
                libsql::params![
                    batch.quantity,
                    i64::from(batch.is_open),
                    fmt_ts(&at),
                    batch.id.as_str(),
                    planned.quantity
                ],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::Conflict(format!(
                "batch {} changed since it was read",
                batch.id
            )));
        }
    }
    Ok(())
}

/// Commit a planned deduction and return the item as stored afterwards.
pub(crate) async fn commit_deduction(
    conn: &libsql::Connection,
    item: &Item,
    batches: &[Batch],
    deduction: &Deduction,
    at: DateTime<Utc>,
) -> Result<Item, DatabaseError> {
    match deduction {
        Deduction::Counter { after, .. } => {
            write_item_quantity(conn, item, *after, StockTracking::Unbatched, at).await
        }
        Deduction::Batches(allocations) => {
            let taken: i64 = allocations.iter().map(|a| a.consumed).sum();
            // A total drifted below its open batches cannot cover the take.
            let remaining = item
                .quantity
                .checked_sub(taken)
                .filter(|left| *left >= 0)
                .ok_or_else(|| DatabaseError::InsufficientStock {
                    item_id: item.id.clone(),
                    requested: taken,
                    available: item.quantity,
                })?;
            apply_allocations(conn, batches, allocations, at).await?;
            write_item_quantity(conn, item, remaining, StockTracking::Batched, at).await
        }
    }
}

impl StockService {
    /// Receive stock into a new open batch and raise the item total.
    ///
    /// The first receipt into an unbatched item holding a counter balance
    /// moves that balance into an opening-balance batch before the new one.
    pub async fn receive(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: NewBatch,
    ) -> Result<ReceiveOutcome, DatabaseError> {
        Self::authorize(actor)?;
        let received_at = new.received_at.map_or_else(now, to_stored_precision);
        new.validate(received_at)?;
        let new = NewBatch {
            received_at: Some(received_at),
            manufactured_at: new.manufactured_at.map(to_stored_precision),
            ..new
        };
        self.retrying("receive", || self.receive_once(actor, event_id, item_id, &new))
            .await
    }

    async fn receive_once(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: &NewBatch,
    ) -> Result<ReceiveOutcome, DatabaseError> {
        let scope = self.begin_write().await?;
        let result = self
            .insert_receipt(scope.tx(), actor, event_id, item_id, new)
            .await;
        scope.finish(result).await
    }

    async fn insert_receipt(
        &self,
        conn: &libsql::Connection,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: &NewBatch,
    ) -> Result<ReceiveOutcome, DatabaseError> {
        let item = load_item(conn, event_id, item_id).await?;
        let at = now();
        let received_at = new.received_at.unwrap_or(at);

        let opening_batch = if !item.is_batched() && item.quantity > 0 {
            let batch = insert_batch(
                conn,
                BatchRow {
                    item_id,
                    lot_number: Some(OPENING_BALANCE_LOT),
                    quantity: item.quantity,
                    expiration_date: None,
                    received_at: item.created_at,
                    manufactured_at: None,
                },
                at,
            )
            .await?;
            tracing::info!(item_id, batch_id = %batch.id, quantity = batch.quantity, "opening balance moved into batch");
            Some(batch)
        } else {
            None
        };

        let batch = insert_batch(
            conn,
            BatchRow {
                item_id,
                lot_number: new.lot_number.as_deref(),
                quantity: new.quantity,
                expiration_date: new.expiration_date,
                received_at,
                manufactured_at: new.manufactured_at,
            },
            at,
        )
        .await?;

        let total = item.quantity.checked_add(new.quantity).ok_or_else(|| {
            DatabaseError::InvalidArgument(format!(
                "receiving {} would overflow the total of item {item_id}",
                new.quantity
            ))
        })?;
        let updated = write_item_quantity(conn, &item, total, StockTracking::Batched, at).await?;

        let outcome = ReceiveOutcome {
            batch,
            opening_batch,
            item_quantity: updated.quantity,
        };
        self.record(actor, event_id, item_id, JournalOp::Received, &outcome)?;
        tracing::info!(
            item_id,
            batch_id = %outcome.batch.id,
            received = new.quantity,
            total,
            "stock received"
        );
        Ok(outcome)
    }

    /// Open batches in FEFO order, the order every deduction walks.
    pub async fn list_open_batches(
        &self,
        event_id: &str,
        item_id: &str,
    ) -> Result<Vec<Batch>, DatabaseError> {
        self.list_batches(event_id, item_id, false).await
    }

    /// All batches of an item in FEFO order, optionally including closed ones.
    pub async fn list_batches(
        &self,
        event_id: &str,
        item_id: &str,
        include_closed: bool,
    ) -> Result<Vec<Batch>, DatabaseError> {
        let read = self.begin_read().await;
        let conn = read.conn();
        load_item(conn, event_id, item_id).await?;
        if !include_closed {
            return fetch_open_batches(conn, item_id).await;
        }
        let sql = format!("SELECT {BATCH_COLUMNS} FROM batches WHERE item_id = ?1 {FEFO_ORDER}");
        collect_batches(conn.query(&sql, [item_id]).await?).await
    }

    pub async fn get_batch(&self, batch_id: &str) -> Result<Batch, DatabaseError> {
        let read = self.begin_read().await;
        fetch_batch(read.conn(), batch_id).await
    }
}
