//! Serde roundtrip and JsonSchema validation tests for entity and outcome types.

use chrono::{NaiveDate, Utc};
use schemars::schema_for;
use stk_core::entities::*;
use stk_core::enums::*;
use stk_core::identity::Actor;
use stk_core::journal::JournalEntry;
use stk_core::responses::*;
use stk_core::stock::BatchAllocation;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_batch() -> Batch {
    let now = Utc::now();
    Batch {
        id: "bat-a3f8b2c1".into(),
        item_id: "itm-0b1c2d3e".into(),
        lot_number: Some("LOT-2025-17".into()),
        quantity: 4,
        initial_quantity: 12,
        expiration_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        received_at: now,
        manufactured_at: None,
        is_open: true,
        created_at: now,
        updated_at: now,
    }
}

fn sample_waste() -> WasteLog {
    WasteLog {
        id: "wst-11223344".into(),
        item_id: "itm-0b1c2d3e".into(),
        batch_id: Some("bat-a3f8b2c1".into()),
        quantity: 2,
        reason: WasteReason::Spoilage,
        notes: Some("left out overnight".into()),
        cost_impact: Some(598),
        actor_id: "user_42".into(),
        created_at: Utc::now(),
    }
}

roundtrip_and_validate!(
    event_roundtrip,
    Event,
    Event {
        id: "evt-9f8e7d6c".into(),
        name: "Summer gala".into(),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    item_roundtrip,
    Item,
    Item {
        id: "itm-0b1c2d3e".into(),
        event_id: "evt-9f8e7d6c".into(),
        name: "Lemonade".into(),
        unit: "bottle".into(),
        quantity: 12,
        unit_price: Some(299),
        tracking: StockTracking::Batched,
        last_audited_at: Some(Utc::now()),
        version: 3,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(batch_roundtrip, Batch, sample_batch());

roundtrip_and_validate!(waste_roundtrip, WasteLog, sample_waste());

roundtrip_and_validate!(
    audit_log_roundtrip,
    AuditLog,
    AuditLog {
        id: "aud-55667788".into(),
        item_id: "itm-0b1c2d3e".into(),
        actual_quantity: 9,
        expected_quantity: 12,
        discrepancy: -3,
        notes: None,
        session_context_id: Some("ctx-1".into()),
        actor_id: "user_42".into(),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    actor_roundtrip,
    Actor,
    Actor::new("user_42", Role::Editor)
);

roundtrip_and_validate!(
    receive_outcome_roundtrip,
    ReceiveOutcome,
    ReceiveOutcome {
        batch: sample_batch(),
        opening_batch: None,
        item_quantity: 12,
    }
);

roundtrip_and_validate!(
    consume_outcome_roundtrip,
    ConsumeOutcome,
    ConsumeOutcome {
        item_id: "itm-0b1c2d3e".into(),
        requested: 4,
        allocations: vec![
            BatchAllocation {
                batch_id: "bat-a".into(),
                consumed: 3,
                remaining_quantity: 0,
                is_open: false,
            },
            BatchAllocation {
                batch_id: "bat-b".into(),
                consumed: 1,
                remaining_quantity: 4,
                is_open: true,
            },
        ],
        item_quantity: 4,
    }
);

roundtrip_and_validate!(
    waste_outcome_roundtrip,
    WasteOutcome,
    WasteOutcome {
        waste: sample_waste(),
        allocations: vec![],
        item_quantity: 2,
    }
);

roundtrip_and_validate!(
    ledger_check_roundtrip,
    LedgerCheck,
    LedgerCheck {
        item_id: "itm-0b1c2d3e".into(),
        batched: true,
        item_quantity: 8,
        open_batch_sum: 8,
        open_batches: 2,
        consistent: true,
    }
);

roundtrip_and_validate!(
    journal_entry_roundtrip,
    JournalEntry,
    JournalEntry {
        v: 1,
        ts: "2026-02-08T12:00:00Z".into(),
        event_id: "evt-9f8e7d6c".into(),
        actor: "user_42".into(),
        op: JournalOp::Wasted,
        item_id: "itm-0b1c2d3e".into(),
        data: serde_json::json!({"quantity": 2}),
    }
);

#[test]
fn expiration_date_serializes_as_calendar_date() {
    let json = serde_json::to_value(sample_batch()).unwrap();
    assert_eq!(json["expiration_date"], "2025-06-01");
}

#[test]
fn enum_values_are_snake_case() {
    assert_eq!(
        serde_json::to_value(WasteReason::Overproduction).unwrap(),
        "overproduction"
    );
    assert_eq!(serde_json::to_value(StockTracking::Unbatched).unwrap(), "unbatched");
    assert_eq!(serde_json::to_value(JournalOp::ItemCreated).unwrap(), "item_created");
}
