//! Stock levels and FEFO deduction planning.
//!
//! A deduction is always planned in full before anything is written. The
//! plan is a pure function of the item's current stock, so a failed plan
//! has no side effects and a successful one can be committed verbatim.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Batch, Item};
use crate::errors::{CoreError, require_positive};

/// One batch's share of a planned deduction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BatchAllocation {
    pub batch_id: String,
    /// Units taken from this batch.
    pub consumed: i64,
    /// Units left in the batch after the take.
    pub remaining_quantity: i64,
    pub is_open: bool,
}

/// A side-effect-free allocation of a requested quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deduction {
    /// Plain counter decrement on an unbatched item.
    Counter { before: i64, after: i64 },
    /// Ordered takes across open batches.
    Batches(Vec<BatchAllocation>),
}

impl Deduction {
    /// Batch allocations, empty for counter deductions.
    #[must_use]
    pub fn allocations(&self) -> &[BatchAllocation] {
        match self {
            Self::Counter { .. } => &[],
            Self::Batches(allocations) => allocations,
        }
    }

    #[must_use]
    pub fn into_allocations(self) -> Vec<BatchAllocation> {
        match self {
            Self::Counter { .. } => Vec::new(),
            Self::Batches(allocations) => allocations,
        }
    }
}

/// An item's stock, tagged by how it is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockLevel {
    /// Quantity is a plain counter; no ledger.
    Unbatched { item_id: String, quantity: i64 },
    /// Quantity is backed by open batches, kept in FEFO order.
    Batched {
        item_id: String,
        quantity: i64,
        batches: Vec<Batch>,
    },
}

impl StockLevel {
    /// Build from an item and its open batches. Closed batches are dropped
    /// and the rest sorted FEFO.
    #[must_use]
    pub fn from_item(item: &Item, open_batches: Vec<Batch>) -> Self {
        if item.is_batched() {
            let mut batches: Vec<Batch> =
                open_batches.into_iter().filter(|b| b.is_open).collect();
            batches.sort_by(Batch::fefo_cmp);
            Self::Batched {
                item_id: item.id.clone(),
                quantity: item.quantity,
                batches,
            }
        } else {
            Self::Unbatched {
                item_id: item.id.clone(),
                quantity: item.quantity,
            }
        }
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        match self {
            Self::Unbatched { item_id, .. } | Self::Batched { item_id, .. } => item_id,
        }
    }

    /// The denormalized item total.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        match self {
            Self::Unbatched { quantity, .. } | Self::Batched { quantity, .. } => *quantity,
        }
    }

    /// Open batches in FEFO order; empty for unbatched stock.
    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        match self {
            Self::Unbatched { .. } => &[],
            Self::Batched { batches, .. } => batches,
        }
    }

    /// Sum of open batch quantities, or the counter for unbatched stock.
    #[must_use]
    pub fn open_batch_sum(&self) -> i64 {
        match self {
            Self::Unbatched { quantity, .. } => *quantity,
            Self::Batched { batches, .. } => batches.iter().map(|b| b.quantity).sum(),
        }
    }

    /// Plan a consumption.
    ///
    /// The item total is checked first; a batched item with no open batches
    /// is rejected before any allocation is attempted.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for non-positive requests, `InsufficientStock` when
    /// the total or the open batches cannot cover the request, and
    /// `NoOpenBatches` for a batched item with nothing open.
    pub fn plan_consumption(&self, requested: i64) -> Result<Deduction, CoreError> {
        require_positive("quantity", requested)?;
        self.ensure_available(requested, self.quantity())?;
        match self {
            Self::Unbatched { quantity, .. } => Ok(Deduction::Counter {
                before: *quantity,
                after: quantity - requested,
            }),
            Self::Batched { item_id, batches, .. } => {
                if batches.is_empty() {
                    return Err(CoreError::NoOpenBatches {
                        item_id: item_id.clone(),
                    });
                }
                plan_fefo(item_id, batches, requested).map(Deduction::Batches)
            }
        }
    }

    /// Plan a waste across open batches.
    ///
    /// Batched items are validated against the open batch sum rather than
    /// the item total.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for non-positive requests and `InsufficientStock`
    /// when the available stock cannot cover the request.
    pub fn plan_waste(&self, requested: i64) -> Result<Deduction, CoreError> {
        require_positive("quantity", requested)?;
        self.ensure_available(requested, self.open_batch_sum())?;
        match self {
            Self::Unbatched { quantity, .. } => Ok(Deduction::Counter {
                before: *quantity,
                after: quantity - requested,
            }),
            Self::Batched { item_id, batches, .. } => {
                plan_fefo(item_id, batches, requested).map(Deduction::Batches)
            }
        }
    }

    fn ensure_available(&self, requested: i64, available: i64) -> Result<(), CoreError> {
        if requested > available {
            return Err(CoreError::InsufficientStock {
                item_id: self.item_id().to_string(),
                requested,
                available,
            });
        }
        Ok(())
    }
}

/// Walk `batches` in order, taking `min(batch.quantity, remaining)` from each
/// until the request is covered.
///
/// `batches` must already be FEFO-sorted and open.
///
/// # Errors
///
/// Returns `CoreError::InsufficientStock` if the batches run out first. No
/// partial plan is ever returned.
pub fn plan_fefo(
    item_id: &str,
    batches: &[Batch],
    requested: i64,
) -> Result<Vec<BatchAllocation>, CoreError> {
    let mut remaining = requested;
    let mut allocations = Vec::new();

    for batch in batches.iter().filter(|b| b.is_open && b.quantity > 0) {
        if remaining == 0 {
            break;
        }
        let take = batch.quantity.min(remaining);
        remaining -= take;
        let left = batch.quantity - take;
        allocations.push(BatchAllocation {
            batch_id: batch.id.clone(),
            consumed: take,
            remaining_quantity: left,
            is_open: left > 0,
        });
    }

    if remaining > 0 {
        return Err(CoreError::InsufficientStock {
            item_id: item_id.to_string(),
            requested,
            available: requested - remaining,
        });
    }
    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::batch::fixtures::batch;
    use crate::enums::StockTracking;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn item(quantity: i64, tracking: StockTracking) -> Item {
        let now = Utc::now();
        Item {
            id: "itm-test".into(),
            event_id: "evt-test".into(),
            name: "Sparkling water".into(),
            unit: "bottle".into(),
            quantity,
            unit_price: None,
            tracking,
            last_audited_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn alloc(id: &str, consumed: i64, remaining: i64) -> BatchAllocation {
        BatchAllocation {
            batch_id: id.into(),
            consumed,
            remaining_quantity: remaining,
            is_open: remaining > 0,
        }
    }

    #[test]
    fn consumption_spans_batches_in_expiration_order() {
        let level = StockLevel::from_item(
            &item(8, StockTracking::Batched),
            vec![
                batch("bat-b", 5, Some("2025-07-01"), 0),
                batch("bat-a", 3, Some("2025-06-01"), 10),
            ],
        );

        let plan = level.plan_consumption(4).unwrap();
        assert_eq!(
            plan,
            Deduction::Batches(vec![alloc("bat-a", 3, 0), alloc("bat-b", 1, 4)])
        );
    }

    #[test]
    fn undated_batches_are_consumed_last() {
        let level = StockLevel::from_item(
            &item(3, StockTracking::Batched),
            vec![
                batch("bat-jan", 1, Some("2025-01-01"), 0),
                batch("bat-none", 1, None, 1),
                batch("bat-dec", 1, Some("2024-12-01"), 2),
            ],
        );

        let first = level.plan_consumption(1).unwrap();
        assert_eq!(first.allocations()[0].batch_id, "bat-dec");

        let all = level.plan_consumption(3).unwrap();
        let order: Vec<_> = all.allocations().iter().map(|a| a.batch_id.as_str()).collect();
        assert_eq!(order, ["bat-dec", "bat-jan", "bat-none"]);
    }

    #[test]
    fn consumption_over_total_is_rejected_before_planning() {
        let level = StockLevel::from_item(
            &item(4, StockTracking::Batched),
            vec![batch("bat-a", 4, None, 0)],
        );
        assert_eq!(
            level.plan_consumption(5),
            Err(CoreError::InsufficientStock {
                item_id: "itm-test".into(),
                requested: 5,
                available: 4,
            })
        );
    }

    #[test]
    fn batched_item_without_open_batches() {
        let level = StockLevel::from_item(&item(2, StockTracking::Batched), vec![]);
        assert_eq!(
            level.plan_consumption(1),
            Err(CoreError::NoOpenBatches {
                item_id: "itm-test".into()
            })
        );
    }

    #[test]
    fn drifted_total_still_never_over_allocates() {
        // Item total claims 10 but batches only hold 6.
        let level = StockLevel::from_item(
            &item(10, StockTracking::Batched),
            vec![batch("bat-a", 6, None, 0)],
        );
        assert!(matches!(
            level.plan_consumption(8),
            Err(CoreError::InsufficientStock { available: 6, .. })
        ));
    }

    #[test]
    fn waste_validates_against_open_batch_sum() {
        let level = StockLevel::from_item(
            &item(10, StockTracking::Batched),
            vec![batch("bat-a", 6, None, 0)],
        );
        assert!(matches!(
            level.plan_waste(7),
            Err(CoreError::InsufficientStock { available: 6, requested: 7, .. })
        ));
        assert_eq!(
            level.plan_waste(6).unwrap(),
            Deduction::Batches(vec![alloc("bat-a", 6, 0)])
        );
    }

    #[test]
    fn unbatched_item_uses_counter() {
        let level = StockLevel::from_item(&item(4, StockTracking::Unbatched), vec![]);
        assert_eq!(
            level.plan_consumption(3).unwrap(),
            Deduction::Counter { before: 4, after: 1 }
        );
        assert_eq!(
            level.plan_waste(4).unwrap(),
            Deduction::Counter { before: 4, after: 0 }
        );
        assert!(matches!(
            level.plan_waste(10),
            Err(CoreError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn non_positive_requests_rejected() {
        let level = StockLevel::from_item(&item(4, StockTracking::Unbatched), vec![]);
        assert!(matches!(
            level.plan_consumption(0),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            level.plan_waste(-2),
            Err(CoreError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn closed_batches_are_skipped() {
        let mut closed = batch("bat-closed", 2, Some("2024-01-01"), 0);
        closed.deduct(2).unwrap();
        let level = StockLevel::from_item(
            &item(5, StockTracking::Batched),
            vec![closed, batch("bat-open", 5, Some("2025-01-01"), 1)],
        );
        let plan = level.plan_consumption(1).unwrap();
        assert_eq!(plan.allocations(), &[alloc("bat-open", 1, 4)]);
    }
}
