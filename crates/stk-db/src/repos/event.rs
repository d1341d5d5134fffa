//! Event repository.
//!
//! Events only scope items; they carry no stock of their own.

use stk_core::entities::Event;
use stk_core::enums::EntityType;
use stk_core::ids::PREFIX_EVENT;

use crate::error::DatabaseError;
use crate::helpers::{fmt_ts, generate_id, now, parse_datetime};
use crate::service::StockService;

fn row_to_event(row: &libsql::Row) -> Result<Event, DatabaseError> {
    Ok(Event {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        created_at: parse_datetime(&row.get::<String>(2)?)?,
    })
}

async fn insert_event(conn: &libsql::Connection, name: &str) -> Result<Event, DatabaseError> {
    let now = now();
    let id = generate_id(conn, PREFIX_EVENT).await?;
    conn.execute(
        "INSERT INTO events (id, name, created_at) VALUES (?1, ?2, ?3)",
        libsql::params![id.as_str(), name, fmt_ts(&now)],
    )
    .await?;
    Ok(Event {
        id,
        name: name.to_string(),
        created_at: now,
    })
}

impl StockService {
    pub async fn create_event(&self, name: &str) -> Result<Event, DatabaseError> {
        if name.trim().is_empty() {
            return Err(DatabaseError::InvalidArgument(
                "event name must not be empty".into(),
            ));
        }
        let event = self
            .retrying("create_event", || async move {
                let scope = self.begin_write().await?;
                let result = insert_event(scope.tx(), name).await;
                scope.finish(result).await
            })
            .await?;
        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, DatabaseError> {
        let read = self.begin_read().await;
        let mut rows = read
            .conn()
            .query("SELECT id, name, created_at FROM events WHERE id = ?1", [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Event, id))?;
        row_to_event(&row)
    }

    pub async fn list_events(&self, limit: u32) -> Result<Vec<Event>, DatabaseError> {
        let read = self.begin_read().await;
        let mut rows = read
            .conn()
            .query(
                "SELECT id, name, created_at FROM events ORDER BY created_at DESC, id LIMIT ?1",
                [i64::from(limit)],
            )
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(row_to_event(&row)?);
        }
        Ok(events)
    }
}
