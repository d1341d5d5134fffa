//! Item repository: creation, lookup, metadata updates, and the guarded
//! quantity write every ledger operation funnels through.

use chrono::{DateTime, Utc};
use stk_core::entities::Item;
use stk_core::enums::{EntityType, JournalOp, StockTracking};
use stk_core::identity::Actor;
use stk_core::ids::PREFIX_ITEM;
use stk_core::requests::NewItem;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_ts, generate_id, get_opt_string, now, parse_datetime, parse_enum,
    parse_optional_datetime,
};
use crate::service::StockService;
use crate::updates::item::ItemUpdate;

const ITEM_COLUMNS: &str = "id, event_id, name, unit, quantity, unit_price, tracking, \
                            last_audited_at, version, created_at, updated_at";

fn row_to_item(row: &libsql::Row) -> Result<Item, DatabaseError> {
    Ok(Item {
        id: row.get::<String>(0)?,
        event_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        unit: row.get::<String>(3)?,
        quantity: row.get::<i64>(4)?,
        unit_price: row.get::<Option<i64>>(5)?,
        tracking: parse_enum(&row.get::<String>(6)?)?,
        last_audited_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        version: row.get::<i64>(8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

async fn fetch_item(conn: &libsql::Connection, item_id: &str) -> Result<Item, DatabaseError> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
    let mut rows = conn.query(&sql, [item_id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Item, item_id))?;
    row_to_item(&row)
}

/// Load an item and check it belongs to `event_id`.
pub(crate) async fn load_item(
    conn: &libsql::Connection,
    event_id: &str,
    item_id: &str,
) -> Result<Item, DatabaseError> {
    let item = fetch_item(conn, item_id).await?;
    if item.event_id != event_id {
        return Err(DatabaseError::InvalidArgument(format!(
            "item {item_id} does not belong to event {event_id}"
        )));
    }
    Ok(item)
}

/// Write a new total for `item`, guarded on the version it was read at.
///
/// Returns the item as stored after the write.
pub(crate) async fn write_item_quantity(
    conn: &libsql::Connection,
    item: &Item,
    quantity: i64,
    tracking: StockTracking,
    at: DateTime<Utc>,
) -> Result<Item, DatabaseError> {
    let affected = conn
        .execute(
            "UPDATE items SET quantity = ?1, tracking = ?2, version = version + 1, updated_at = ?3
             WHERE id = ?4 AND version = ?5",
            libsql::params![
                quantity,
                tracking.as_str(),
                fmt_ts(&at),
                item.id.as_str(),
                item.version
            ],
        )
        .await?;
    if affected == 0 {
        return Err(DatabaseError::Conflict(format!(
            "item {} changed since version {}",
            item.id, item.version
        )));
    }
    Ok(Item {
        quantity,
        tracking,
        version: item.version + 1,
        updated_at: at,
        ..item.clone()
    })
}

impl StockService {
    pub async fn create_item(
        &self,
        actor: &Actor,
        event_id: &str,
        new: NewItem,
    ) -> Result<Item, DatabaseError> {
        Self::authorize(actor)?;
        new.validate()?;
        self.retrying("create_item", || self.create_item_once(actor, event_id, &new))
            .await
    }

    async fn create_item_once(
        &self,
        actor: &Actor,
        event_id: &str,
        new: &NewItem,
    ) -> Result<Item, DatabaseError> {
        let scope = self.begin_write().await?;
        let result = self.insert_item(scope.tx(), actor, event_id, new).await;
        scope.finish(result).await
    }

    async fn insert_item(
        &self,
        conn: &libsql::Connection,
        actor: &Actor,
        event_id: &str,
        new: &NewItem,
    ) -> Result<Item, DatabaseError> {
        let mut rows = conn
            .query("SELECT 1 FROM events WHERE id = ?1", [event_id])
            .await?;
        if rows.next().await?.is_none() {
            return Err(DatabaseError::not_found(EntityType::Event, event_id));
        }

        let now = now();
        let id = generate_id(conn, PREFIX_ITEM).await?;
        conn.execute(
            "INSERT INTO items (id, event_id, name, unit, quantity, unit_price, tracking, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9)",
            libsql::params![
                id.as_str(),
                event_id,
                new.name.as_str(),
                new.unit.as_str(),
                new.quantity,
                new.unit_price,
                StockTracking::Unbatched.as_str(),
                fmt_ts(&now),
                fmt_ts(&now)
            ],
        )
        .await?;

        let item = Item {
            id,
            event_id: event_id.to_string(),
            name: new.name.clone(),
            unit: new.unit.clone(),
            quantity: new.quantity,
            unit_price: new.unit_price,
            tracking: StockTracking::Unbatched,
            last_audited_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.record(actor, event_id, &item.id, JournalOp::ItemCreated, &item)?;
        tracing::info!(item_id = %item.id, event_id, quantity = item.quantity, "item created");
        Ok(item)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Item, DatabaseError> {
        let read = self.begin_read().await;
        fetch_item(read.conn(), item_id).await
    }

    pub async fn list_items(&self, event_id: &str, limit: u32) -> Result<Vec<Item>, DatabaseError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE event_id = ?1 ORDER BY name, id LIMIT ?2"
        );
        let read = self.begin_read().await;
        let mut rows = read
            .conn()
            .query(&sql, libsql::params![event_id, i64::from(limit)])
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    /// Change an item's descriptive fields. Quantity is never touched.
    pub async fn update_item(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        update: ItemUpdate,
    ) -> Result<Item, DatabaseError> {
        Self::authorize(actor)?;
        if update.name.as_deref().is_some_and(|s| s.trim().is_empty())
            || update.unit.as_deref().is_some_and(|s| s.trim().is_empty())
        {
            return Err(DatabaseError::InvalidArgument(
                "name and unit must not be empty".into(),
            ));
        }
        if let Some(Some(price)) = update.unit_price
            && price < 0
        {
            return Err(DatabaseError::InvalidArgument(format!(
                "unit_price must not be negative: {price}"
            )));
        }
        if update.is_empty() {
            let read = self.begin_read().await;
            return load_item(read.conn(), event_id, item_id).await;
        }
        self.retrying("update_item", || {
            self.update_item_once(actor, event_id, item_id, &update)
        })
        .await
    }

    async fn update_item_once(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        update: &ItemUpdate,
    ) -> Result<Item, DatabaseError> {
        let scope = self.begin_write().await?;
        let result = self
            .apply_item_update(scope.tx(), actor, event_id, item_id, update)
            .await;
        scope.finish(result).await
    }

    async fn apply_item_update(
        &self,
        conn: &libsql::Connection,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        update: &ItemUpdate,
    ) -> Result<Item, DatabaseError> {
        load_item(conn, event_id, item_id).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.as_str().into());
            idx += 1;
        }
        if let Some(ref unit) = update.unit {
            sets.push(format!("unit = ?{idx}"));
            params.push(unit.as_str().into());
            idx += 1;
        }
        if let Some(price) = update.unit_price {
            sets.push(format!("unit_price = ?{idx}"));
            params.push(price.map_or(libsql::Value::Null, libsql::Value::Integer));
            idx += 1;
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(fmt_ts(&now()).into());
        idx += 1;
        params.push(item_id.into());

        let sql = format!("UPDATE items SET {} WHERE id = ?{idx}", sets.join(", "));
        conn.execute(&sql, libsql::params_from_iter(params)).await?;

        let item = fetch_item(conn, item_id).await?;
        self.record(actor, event_id, item_id, JournalOp::ItemUpdated, update)?;
        tracing::info!(item_id, "item updated");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{editor, seed_event, seed_item, test_service, viewer};
    use crate::updates::item::ItemUpdateBuilder;

    #[tokio::test]
    async fn create_item_roundtrip() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 12).await;

        assert!(item.id.starts_with("itm-"));
        assert_eq!(item.quantity, 12);
        assert_eq!(item.tracking, StockTracking::Unbatched);
        assert_eq!(item.version, 0);

        let fetched = svc.get_item(&item.id).await.unwrap();
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn create_item_requires_existing_event() {
        let svc = test_service().await;
        let err = svc
            .create_item(&editor(), "evt-missing", NewItem::new("Ice", "bag"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound {
                entity: EntityType::Event,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn create_item_rejects_viewer_and_negative_quantity() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;

        let forbidden = svc
            .create_item(&viewer(), &event_id, NewItem::new("Ice", "bag"))
            .await;
        assert!(matches!(forbidden, Err(DatabaseError::Forbidden { .. })));

        let negative = svc
            .create_item(
                &editor(),
                &event_id,
                NewItem::new("Ice", "bag").with_quantity(-2),
            )
            .await;
        assert!(matches!(negative, Err(DatabaseError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn load_item_checks_event() {
        let svc = test_service().await;
        let event_a = seed_event(&svc).await;
        let event_b = seed_event(&svc).await;
        let item = seed_item(&svc, &event_a, 1).await;

        assert!(load_item(svc.db().conn(), &event_a, &item.id).await.is_ok());
        let err = load_item(svc.db().conn(), &event_b, &item.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn update_item_changes_metadata_only() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 9).await;

        let update = ItemUpdateBuilder::new()
            .name("Still water")
            .unit_price(Some(199))
            .build();
        let updated = svc
            .update_item(&editor(), &event_id, &item.id, update)
            .await
            .unwrap();

        assert_eq!(updated.name, "Still water");
        assert_eq!(updated.unit_price, Some(199));
        assert_eq!(updated.unit, item.unit);
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.version, item.version);

        let cleared = svc
            .update_item(
                &editor(),
                &event_id,
                &item.id,
                ItemUpdateBuilder::new().unit_price(None).build(),
            )
            .await
            .unwrap();
        assert_eq!(cleared.unit_price, None);
    }

    #[tokio::test]
    async fn guarded_quantity_write_detects_stale_version() {
        let svc = test_service().await;
        let event_id = seed_event(&svc).await;
        let item = seed_item(&svc, &event_id, 5).await;

        let written = write_item_quantity(
            svc.db().conn(),
            &item,
            4,
            StockTracking::Unbatched,
            now(),
        )
        .await
        .unwrap();
        assert_eq!(written.version, 1);

        let stale = write_item_quantity(
            svc.db().conn(),
            &item,
            3,
            StockTracking::Unbatched,
            now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(stale, DatabaseError::Conflict(_)));
        assert_eq!(svc.get_item(&item.id).await.unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn list_items_scoped_to_event() {
        let svc = test_service().await;
        let event_a = seed_event(&svc).await;
        let event_b = seed_event(&svc).await;
        seed_item(&svc, &event_a, 1).await;
        seed_item(&svc, &event_a, 2).await;
        seed_item(&svc, &event_b, 3).await;

        assert_eq!(svc.list_items(&event_a, 50).await.unwrap().len(), 2);
        assert_eq!(svc.list_items(&event_b, 50).await.unwrap().len(), 1);
        assert_eq!(svc.list_items(&event_a, 1).await.unwrap().len(), 1);
    }
}
