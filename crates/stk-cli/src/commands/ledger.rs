//! Stock mutations: receive, consume, waste, audit.

use stk_core::enums::WasteReason;
use stk_core::requests::{NewAudit, NewBatch, NewWaste};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{AuditArgs, ConsumeArgs, ReceiveArgs, WasteArgs};
use crate::commands::shared::parse::{parse_date, parse_enum, parse_timestamp};
use crate::context::AppContext;
use crate::output::output;

/// Handle `stk receive`.
pub async fn receive(args: &ReceiveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let new = NewBatch {
        quantity: args.quantity,
        lot_number: args.lot.clone(),
        expiration_date: args
            .expires
            .as_deref()
            .map(|raw| parse_date(raw, "expires"))
            .transpose()?,
        received_at: args
            .received_at
            .as_deref()
            .map(|raw| parse_timestamp(raw, "received_at"))
            .transpose()?,
        manufactured_at: args
            .manufactured_at
            .as_deref()
            .map(|raw| parse_timestamp(raw, "manufactured_at"))
            .transpose()?,
    };
    let outcome = ctx
        .service
        .receive(&ctx.actor, &args.target.event, &args.target.item, new)
        .await?;
    output(&outcome, flags.format)
}

/// Handle `stk consume`.
pub async fn consume(args: &ConsumeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let outcome = ctx
        .service
        .consume(&ctx.actor, &args.target.event, &args.target.item, args.quantity)
        .await?;
    output(&outcome, flags.format)
}

/// Handle `stk waste`.
pub async fn waste(args: &WasteArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let reason: WasteReason = parse_enum(&args.reason, "reason")?;
    let new = NewWaste {
        quantity: args.quantity,
        reason,
        batch_id: args.batch.clone(),
        notes: args.notes.clone(),
    };
    let outcome = ctx
        .service
        .record_waste(&ctx.actor, &args.target.event, &args.target.item, new)
        .await?;
    output(&outcome, flags.format)
}

/// Handle `stk audit`.
pub async fn audit(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let new = NewAudit {
        actual_quantity: args.actual,
        expected_quantity: args.expected,
        notes: args.notes.clone(),
        session_context_id: args.session_context.clone(),
    };
    let log = ctx
        .service
        .record_audit(&ctx.actor, &args.target.event, &args.target.item, new)
        .await?;
    output(&log, flags.format)
}
