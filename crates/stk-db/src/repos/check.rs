//! Drift check between an item's total and its open batches.

use stk_core::responses::LedgerCheck;

use crate::error::DatabaseError;
use crate::repos::item::load_item;
use crate::service::StockService;

impl StockService {
    /// Compare the item total with the sum of its open batches.
    ///
    /// Unbatched items have no ledger and are always consistent.
    pub async fn check_ledger(
        &self,
        event_id: &str,
        item_id: &str,
    ) -> Result<LedgerCheck, DatabaseError> {
        let read = self.begin_read().await;
        let conn = read.conn();
        let item = load_item(conn, event_id, item_id).await?;

        let mut rows = conn
            .query(
                "SELECT COALESCE(SUM(quantity), 0), COUNT(*) FROM batches
                 WHERE item_id = ?1 AND is_open = 1",
                [item_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let open_sum = row.get::<i64>(0)?;
        let open_batches = u32::try_from(row.get::<i64>(1)?).unwrap_or(u32::MAX);

        let batched = item.is_batched();
        let open_batch_sum = if batched { open_sum } else { item.quantity };
        let consistent = item.quantity == open_batch_sum;
        if !consistent {
            tracing::warn!(
                item_id,
                item_quantity = item.quantity,
                open_batch_sum,
                "item total drifted from its batches"
            );
        }

        Ok(LedgerCheck {
            item_id: item.id,
            batched,
            item_quantity: item.quantity,
            open_batch_sum,
            open_batches,
            consistent,
        })
    }
}
