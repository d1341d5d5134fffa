//! Shared test utilities for stk-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::time::Duration;

    use stk_core::entities::Item;
    use stk_core::enums::Role;
    use stk_core::identity::Actor;
    use stk_core::requests::NewItem;

    use crate::StockDb;
    use crate::journal::writer::JournalWriter;
    use crate::retry::RetryConfig;
    use crate::service::StockService;

    /// Create an in-memory `StockService` with the journal disabled.
    pub async fn test_service() -> StockService {
        let db = StockDb::open_local(":memory:").await.unwrap();
        StockService::from_db(db, JournalWriter::disabled()).with_retry(fast_retry())
    }

    /// Create an in-memory `StockService` journaling to `journal_dir`.
    pub async fn test_service_with_journal(journal_dir: std::path::PathBuf) -> StockService {
        let db = StockDb::open_local(":memory:").await.unwrap();
        let journal = JournalWriter::new(journal_dir).unwrap();
        StockService::from_db(db, journal).with_retry(fast_retry())
    }

    pub fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    pub fn editor() -> Actor {
        Actor::new("user_editor", Role::Editor)
    }

    pub fn viewer() -> Actor {
        Actor::new("user_viewer", Role::Viewer)
    }

    /// Create an event and return its ID.
    pub async fn seed_event(svc: &StockService) -> String {
        svc.create_event("Spring Gala").await.unwrap().id
    }

    /// Create an unbatched item with an opening counter and price.
    pub async fn seed_item(svc: &StockService, event_id: &str, quantity: i64) -> Item {
        svc.create_item(
            &editor(),
            event_id,
            NewItem::new("Sparkling water", "bottle")
                .with_quantity(quantity)
                .with_unit_price(250),
        )
        .await
        .unwrap()
    }
}
