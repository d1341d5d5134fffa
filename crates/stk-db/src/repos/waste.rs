//! Waste: write stock off with a reason, either from one named batch or in
//! FEFO order, and log the frozen cost impact.

use stk_core::entities::{Batch, Item, WasteLog};
use stk_core::enums::{JournalOp, WasteReason};
use stk_core::identity::Actor;
use stk_core::ids::PREFIX_WASTE;
use stk_core::requests::NewWaste;
use stk_core::responses::WasteOutcome;
use stk_core::stock::{BatchAllocation, Deduction, StockLevel};

use crate::error::DatabaseError;
use crate::helpers::{fmt_ts, generate_id, get_opt_string, now, parse_datetime, parse_enum};
use crate::repos::batch::{commit_deduction, fetch_batch, load_stock};
use crate::repos::item::load_item;
use crate::service::StockService;

const WASTE_COLUMNS: &str =
    "id, item_id, batch_id, quantity, reason, notes, cost_impact, actor_id, created_at";

fn row_to_waste(row: &libsql::Row) -> Result<WasteLog, DatabaseError> {
    Ok(WasteLog {
        id: row.get::<String>(0)?,
        item_id: row.get::<String>(1)?,
        batch_id: get_opt_string(row, 2)?,
        quantity: row.get::<i64>(3)?,
        reason: parse_enum(&row.get::<String>(4)?)?,
        notes: get_opt_string(row, 5)?,
        cost_impact: row.get::<Option<i64>>(6)?,
        actor_id: row.get::<String>(7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

/// `quantity * unit_price`, or `None` when the item has no price.
fn cost_impact(item: &Item, quantity: i64) -> Result<Option<i64>, DatabaseError> {
    item.unit_price
        .map(|price| {
            quantity.checked_mul(price).ok_or_else(|| {
                DatabaseError::InvalidArgument(format!(
                    "cost of wasting {quantity} x {price} overflows"
                ))
            })
        })
        .transpose()
}

/// Plan a waste from one explicitly named batch.
fn plan_targeted(item: &Item, batch: &Batch, quantity: i64) -> Result<Deduction, DatabaseError> {
    if batch.item_id != item.id {
        return Err(DatabaseError::InvalidArgument(format!(
            "batch {} belongs to item {}, not {}",
            batch.id, batch.item_id, item.id
        )));
    }
    if !batch.is_open {
        return Err(DatabaseError::InvalidArgument(format!(
            "batch {} is closed",
            batch.id
        )));
    }
    if quantity > batch.quantity {
        return Err(DatabaseError::InvalidArgument(format!(
            "batch {} holds {}, cannot waste {quantity}",
            batch.id, batch.quantity
        )));
    }
    let remaining = batch.quantity - quantity;
    Ok(Deduction::Batches(vec![BatchAllocation {
        batch_id: batch.id.clone(),
        consumed: quantity,
        remaining_quantity: remaining,
        is_open: remaining > 0,
    }]))
}

impl StockService {
    pub async fn record_waste(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: NewWaste,
    ) -> Result<WasteOutcome, DatabaseError> {
        Self::authorize(actor)?;
        new.validate()?;
        self.retrying("record_waste", || {
            self.record_waste_once(actor, event_id, item_id, &new)
        })
        .await
    }

    async fn record_waste_once(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: &NewWaste,
    ) -> Result<WasteOutcome, DatabaseError> {
        let scope = self.begin_write().await?;
        let result = self
            .apply_waste(scope.tx(), actor, event_id, item_id, new)
            .await;
        scope.finish(result).await
    }

    async fn apply_waste(
        &self,
        conn: &libsql::Connection,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: &NewWaste,
    ) -> Result<WasteOutcome, DatabaseError> {
        let (item, deduction, batches) = match new.batch_id.as_deref() {
            Some(batch_id) => {
                let item = load_item(conn, event_id, item_id).await?;
                let batch = fetch_batch(conn, batch_id).await?;
                let deduction = plan_targeted(&item, &batch, new.quantity)?;
                (item, deduction, vec![batch])
            }
            None => {
                let (item, level) = load_stock(conn, event_id, item_id).await?;
                let deduction = level.plan_waste(new.quantity)?;
                let batches = match level {
                    StockLevel::Batched { batches, .. } => batches,
                    StockLevel::Unbatched { .. } => Vec::new(),
                };
                (item, deduction, batches)
            }
        };
        tracing::debug!(item_id, quantity = new.quantity, plan = ?deduction, "waste planned");

        let cost = cost_impact(&item, new.quantity)?;
        let at = now();
        let updated = commit_deduction(conn, &item, &batches, &deduction, at).await?;

        let id = generate_id(conn, PREFIX_WASTE).await?;
        conn.execute(
            "INSERT INTO waste_logs (id, item_id, batch_id, quantity, reason, notes, cost_impact, actor_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            libsql::params![
                id.as_str(),
                item_id,
                new.batch_id.as_deref(),
                new.quantity,
                new.reason.as_str(),
                new.notes.as_deref(),
                cost,
                actor.user_id.as_str(),
                fmt_ts(&at)
            ],
        )
        .await?;

        let outcome = WasteOutcome {
            waste: WasteLog {
                id,
                item_id: item_id.to_string(),
                batch_id: new.batch_id.clone(),
                quantity: new.quantity,
                reason: new.reason,
                notes: new.notes.clone(),
                cost_impact: cost,
                actor_id: actor.user_id.clone(),
                created_at: at,
            },
            allocations: deduction.into_allocations(),
            item_quantity: updated.quantity,
        };
        self.record(actor, event_id, item_id, JournalOp::Wasted, &outcome)?;
        tracing::info!(
            item_id,
            wasted = new.quantity,
            reason = %new.reason,
            total = outcome.item_quantity,
            "stock wasted"
        );
        Ok(outcome)
    }

    /// Waste history of an item, newest first, optionally filtered by reason.
    pub async fn list_waste_logs(
        &self,
        event_id: &str,
        item_id: &str,
        reason: Option<WasteReason>,
        limit: u32,
    ) -> Result<Vec<WasteLog>, DatabaseError> {
        let read = self.begin_read().await;
        let conn = read.conn();
        load_item(conn, event_id, item_id).await?;
        let sql = format!(
            "SELECT {WASTE_COLUMNS} FROM waste_logs
             WHERE item_id = ?1 AND (?2 IS NULL OR reason = ?2)
             ORDER BY created_at DESC, id LIMIT ?3"
        );
        let mut rows = conn
            .query(
                &sql,
                libsql::params![item_id, reason.map(WasteReason::as_str), i64::from(limit)],
            )
            .await?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(row_to_waste(&row)?);
        }
        Ok(logs)
    }
}
