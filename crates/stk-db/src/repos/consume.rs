//! Consumption: plan a FEFO deduction, then commit it in one transaction.

use stk_core::enums::JournalOp;
use stk_core::errors::require_positive;
use stk_core::identity::Actor;
use stk_core::responses::ConsumeOutcome;

use crate::error::DatabaseError;
use crate::helpers::now;
use crate::repos::batch::{commit_deduction, load_stock};
use crate::service::StockService;

impl StockService {
    /// Take `quantity` units out of stock.
    ///
    /// Batched items are drawn down in FEFO order across as many batches as
    /// needed; unbatched items decrement their counter. Nothing is written
    /// unless the whole request can be met.
    pub async fn consume(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> Result<ConsumeOutcome, DatabaseError> {
        Self::authorize(actor)?;
        require_positive("quantity", quantity)?;
        self.retrying("consume", || {
            self.consume_once(actor, event_id, item_id, quantity)
        })
        .await
    }

    async fn consume_once(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> Result<ConsumeOutcome, DatabaseError> {
        let scope = self.begin_write().await?;
        let result = self
            .apply_consumption(scope.tx(), actor, event_id, item_id, quantity)
            .await;
        scope.finish(result).await
    }

    async fn apply_consumption(
        &self,
        conn: &libsql::Connection,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> Result<ConsumeOutcome, DatabaseError> {
        let (item, level) = load_stock(conn, event_id, item_id).await?;
        let deduction = level.plan_consumption(quantity)?;
        tracing::debug!(item_id, quantity, plan = ?deduction, "consumption planned");

        let updated = commit_deduction(conn, &item, level.batches(), &deduction, now()).await?;

        let outcome = ConsumeOutcome {
            item_id: item_id.to_string(),
            requested: quantity,
            allocations: deduction.into_allocations(),
            item_quantity: updated.quantity,
        };
        self.record(actor, event_id, item_id, JournalOp::Consumed, &outcome)?;
        tracing::info!(
            item_id,
            consumed = quantity,
            batches = outcome.allocations.len(),
            total = outcome.item_quantity,
            "stock consumed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{editor, seed_event, seed_item, test_service, viewer};
    use pretty_assertions::assert_eq;
    use stk_core::enums::StockTracking;
    use stk_core::requests::NewBatch;
    use stk_core::stock::BatchAllocation;

    #[tokio::test]
    async fn consume_spans_batches_in_fefo_order() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 0).await;

        let a = svc
            .receive(
                &editor(),
                &event_id,
                &item.id,
                NewBatch::new(3).expires("2025-06-01".parse().unwrap()),
            )
            .await
            .unwrap()
            .batch;
        let b = svc
            .receive(
                &editor(),
                &event_id,
                &item.id,
                NewBatch::new(5).expires("2025-07-01".parse().unwrap()),
            )
            .await
            .unwrap()
            .batch;

        let outcome = svc.consume(&editor(), &event_id, &item.id, 4).await.unwrap();
        assert_eq!(
            outcome.allocations,
            vec![
                BatchAllocation {
                    batch_id: a.id.clone(),
                    consumed: 3,
                    remaining_quantity: 0,
                    is_open: false,
                },
                BatchAllocation {
                    batch_id: b.id.clone(),
                    consumed: 1,
                    remaining_quantity: 4,
                    is_open: true,
                },
            ]
        );
        assert_eq!(outcome.item_quantity, 4);

        let closed = svc.get_batch(&a.id).await.unwrap();
        assert_eq!(closed.quantity, 0);
        assert!(!closed.is_open);
        assert_eq!(closed.initial_quantity, 3);
    }

    #[tokio::test]
    async fn unbatched_item_decrements_counter() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 10).await;

        let outcome = svc.consume(&editor(), &event_id, &item.id, 4).await.unwrap();
        assert!(outcome.allocations.is_empty());
        assert_eq!(outcome.item_quantity, 6);

        let stored = svc.get_item(&item.id).await.unwrap();
        assert_eq!(stored.quantity, 6);
        assert_eq!(stored.tracking, StockTracking::Unbatched);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn over_consumption_changes_nothing() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 0).await;
        svc.receive(&editor(), &event_id, &item.id, NewBatch::new(2))
            .await
            .unwrap();
        let before = svc.list_open_batches(&event_id, &item.id).await.unwrap();

        let err = svc
            .consume(&editor(), &event_id, &item.id, 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(
            svc.list_open_batches(&event_id, &item.id).await.unwrap(),
            before
        );
        assert_eq!(svc.get_item(&item.id).await.unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn fully_consumed_item_reports_insufficient_stock() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 0).await;
        svc.receive(&editor(), &event_id, &item.id, NewBatch::new(2))
            .await
            .unwrap();
        svc.consume(&editor(), &event_id, &item.id, 2).await.unwrap();

        let err = svc
            .consume(&editor(), &event_id, &item.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InsufficientStock { .. }));
        assert!(
            svc.list_open_batches(&event_id, &item.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn drifted_batched_item_without_open_batches() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 0).await;
        svc.receive(&editor(), &event_id, &item.id, NewBatch::new(2))
            .await
            .unwrap();
        svc.consume(&editor(), &event_id, &item.id, 2).await.unwrap();

        // Simulate a drifted total left behind by an out-of-band edit.
        svc.db()
            .conn()
            .execute("UPDATE items SET quantity = 5 WHERE id = ?1", [item.id.as_str()])
            .await
            .unwrap();

        let err = svc
            .consume(&editor(), &event_id, &item.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoOpenBatches { .. }));
    }

    #[tokio::test]
    async fn consume_rejects_invalid_requests() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let other_event = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 5).await;

        for qty in [0, -1] {
            let err = svc
                .consume(&editor(), &event_id, &item.id, qty)
                .await
                .unwrap_err();
            assert!(matches!(err, DatabaseError::InvalidArgument(_)));
        }

        let wrong_event = svc
            .consume(&editor(), &other_event, &item.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(wrong_event, DatabaseError::InvalidArgument(_)));

        let forbidden = svc
            .consume(&viewer(), &event_id, &item.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(forbidden, DatabaseError::Forbidden { .. }));

        assert_eq!(svc.get_item(&item.id).await.unwrap().quantity, 5);
    }
}
