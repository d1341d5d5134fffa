//! Audit reconciliation: record a physical count against the expected one.
//!
//! Audits never touch quantities or batches; the only side effect is the
//! item's `last_audited_at`.

use stk_core::entities::AuditLog;
use stk_core::enums::JournalOp;
use stk_core::identity::Actor;
use stk_core::ids::PREFIX_AUDIT;
use stk_core::requests::NewAudit;

use crate::error::DatabaseError;
use crate::helpers::{fmt_ts, generate_id, get_opt_string, now, parse_datetime};
use crate::repos::item::load_item;
use crate::service::StockService;

const AUDIT_COLUMNS: &str = "id, item_id, actual_quantity, expected_quantity, discrepancy, notes, \
                             session_context_id, actor_id, created_at";

fn row_to_audit(row: &libsql::Row) -> Result<AuditLog, DatabaseError> {
    Ok(AuditLog {
        id: row.get::<String>(0)?,
        item_id: row.get::<String>(1)?,
        actual_quantity: row.get::<i64>(2)?,
        expected_quantity: row.get::<i64>(3)?,
        discrepancy: row.get::<i64>(4)?,
        notes: get_opt_string(row, 5)?,
        session_context_id: get_opt_string(row, 6)?,
        actor_id: row.get::<String>(7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl StockService {
    pub async fn record_audit(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: NewAudit,
    ) -> Result<AuditLog, DatabaseError> {
        Self::authorize(actor)?;
        new.validate()?;
        self.retrying("record_audit", || {
            self.record_audit_once(actor, event_id, item_id, &new)
        })
        .await
    }

    async fn record_audit_once(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: &NewAudit,
    ) -> Result<AuditLog, DatabaseError> {
        let scope = self.begin_write().await?;
        let result = self
            .insert_audit(scope.tx(), actor, event_id, item_id, new)
            .await;
        scope.finish(result).await
    }

    async fn insert_audit(
        &self,
        conn: &libsql::Connection,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        new: &NewAudit,
    ) -> Result<AuditLog, DatabaseError> {
        load_item(conn, event_id, item_id).await?;

        let at = now();
        let id = generate_id(conn, PREFIX_AUDIT).await?;
        let log = AuditLog {
            id,
            item_id: item_id.to_string(),
            actual_quantity: new.actual_quantity,
            expected_quantity: new.expected_quantity,
            discrepancy: new.discrepancy(),
            notes: new.notes.clone(),
            session_context_id: new.session_context_id.clone(),
            actor_id: actor.user_id.clone(),
            created_at: at,
        };

        conn.execute(
            "INSERT INTO audit_logs (id, item_id, actual_quantity, expected_quantity, discrepancy,
                                     notes, session_context_id, actor_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            libsql::params![
                log.id.as_str(),
                item_id,
                log.actual_quantity,
                log.expected_quantity,
                log.discrepancy,
                log.notes.as_deref(),
                log.session_context_id.as_deref(),
                log.actor_id.as_str(),
                fmt_ts(&at)
            ],
        )
        .await?;

        conn.execute(
            "UPDATE items SET last_audited_at = ?1 WHERE id = ?2",
            libsql::params![fmt_ts(&at), item_id],
        )
        .await?;

        self.record(actor, event_id, item_id, JournalOp::Audited, &log)?;
        tracing::info!(
            item_id,
            actual = log.actual_quantity,
            expected = log.expected_quantity,
            discrepancy = log.discrepancy,
            "audit recorded"
        );
        Ok(log)
    }

    /// Audit history of an item, newest first.
    pub async fn list_audit_logs(
        &self,
        event_id: &str,
        item_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLog>, DatabaseError> {
        let read = self.begin_read().await;
        let conn = read.conn();
        load_item(conn, event_id, item_id).await?;
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE item_id = ?1
             ORDER BY created_at DESC, id LIMIT ?2"
        );
        let mut rows = conn
            .query(&sql, libsql::params![item_id, i64::from(limit)])
            .await?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(row_to_audit(&row)?);
        }
        Ok(logs)
    }
}
