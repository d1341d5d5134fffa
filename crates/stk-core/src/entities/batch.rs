use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::BatchState;
use crate::errors::CoreError;

/// A received lot of an item with its own remaining quantity.
///
/// Invariant: `0 <= quantity <= initial_quantity`, and `is_open` is true iff
/// `quantity > 0`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Batch {
    pub id: String,
    pub item_id: String,
    pub lot_number: Option<String>,
    pub quantity: i64,
    pub initial_quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    pub received_at: DateTime<Utc>,
    pub manufactured_at: Option<DateTime<Utc>>,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    #[must_use]
    pub const fn state(&self) -> BatchState {
        if self.is_open {
            BatchState::Open
        } else {
            BatchState::Closed
        }
    }

    /// Remove `take` units from this batch.
    ///
    /// Closes the batch when it reaches zero. Closed batches reject every
    /// deduction.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the batch is closed,
    /// `CoreError::InvalidQuantity` if `take` is not positive or exceeds the
    /// remaining quantity.
    pub fn deduct(&mut self, take: i64) -> Result<BatchState, CoreError> {
        if !self.is_open {
            return Err(CoreError::InvalidTransition {
                batch_id: self.id.clone(),
                from: BatchState::Closed.to_string(),
                to: BatchState::Closed.to_string(),
            });
        }
        if take <= 0 || take > self.quantity {
            return Err(CoreError::InvalidQuantity {
                field: "take",
                value: take,
            });
        }

        let next = BatchState::for_quantity(self.quantity - take);
        if next != self.state() && !self.state().can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                batch_id: self.id.clone(),
                from: self.state().to_string(),
                to: next.to_string(),
            });
        }

        self.quantity -= take;
        self.is_open = next == BatchState::Open;
        Ok(next)
    }

    /// FEFO comparison: earliest expiration first with undated batches last,
    /// then earliest receipt, then earliest creation.
    #[must_use]
    pub fn fefo_cmp(&self, other: &Self) -> Ordering {
        let by_expiration = match (self.expiration_date, other.expiration_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_expiration
            .then_with(|| self.received_at.cmp(&other.received_at))
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::batch;
    use super::*;

    #[test]
    fn deduct_partial_keeps_open() {
        let mut b = batch("bat-a", 5, None, 0);
        assert_eq!(b.deduct(2).unwrap(), BatchState::Open);
        assert_eq!(b.quantity, 3);
        assert!(b.is_open);
        assert_eq!(b.initial_quantity, 5);
    }

    #[test]
    fn deduct_to_zero_closes() {
        let mut b = batch("bat-a", 5, None, 0);
        assert_eq!(b.deduct(5).unwrap(), BatchState::Closed);
        assert_eq!(b.quantity, 0);
        assert!(!b.is_open);
    }

    #[test]
    fn closed_batch_rejects_deduction() {
        let mut b = batch("bat-a", 1, None, 0);
        b.deduct(1).unwrap();
        let err = b.deduct(1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(b.quantity, 0);
    }

    #[test]
    fn over_deduction_rejected() {
        let mut b = batch("bat-a", 2, None, 0);
        assert!(matches!(
            b.deduct(3),
            Err(CoreError::InvalidQuantity { value: 3, .. })
        ));
        assert!(matches!(b.deduct(0), Err(CoreError::InvalidQuantity { .. })));
        assert_eq!(b.quantity, 2);
    }

    #[test]
    fn fefo_orders_dated_before_undated() {
        let mut batches = vec![
            batch("bat-jan", 1, Some("2025-01-01"), 0),
            batch("bat-none", 1, None, 1),
            batch("bat-dec", 1, Some("2024-12-01"), 2),
        ];
        batches.sort_by(Batch::fefo_cmp);
        let ids: Vec<_> = batches.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["bat-dec", "bat-jan", "bat-none"]);
    }

    #[test]
    fn fefo_falls_back_to_receipt_time() {
        let mut batches = vec![
            batch("bat-late", 1, None, 60),
            batch("bat-early", 1, None, 0),
        ];
        batches.sort_by(Batch::fefo_cmp);
        assert_eq!(batches[0].id, "bat-early");
    }
}
