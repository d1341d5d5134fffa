//! Input payloads for ledger operations.
//!
//! Each request validates the checks that need no stored state. Checks
//! against stored rows (item existence, batch ownership, availability)
//! happen inside the write transaction.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::WasteReason;
use crate::errors::{CoreError, require_non_negative, require_positive};

fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// A new inventory item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub unit: String,
    /// Opening counter quantity.
    #[serde(default)]
    pub quantity: i64,
    /// Minor currency units per `unit`.
    #[serde(default)]
    pub unit_price: Option<i64>,
}

impl NewItem {
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            quantity: 0,
            unit_price: None,
        }
    }

    #[must_use]
    pub const fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub const fn with_unit_price(mut self, unit_price: i64) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    /// # Errors
    ///
    /// Returns `CoreError` for a blank name or unit, a negative quantity, or
    /// a negative price.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_blank("name", &self.name)?;
        require_non_blank("unit", &self.unit)?;
        require_non_negative("quantity", self.quantity)?;
        if let Some(price) = self.unit_price {
            require_non_negative("unit_price", price)?;
        }
        Ok(())
    }
}

/// A receipt of stock into a new batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewBatch {
    pub quantity: i64,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Defaults to the time of the receipt.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manufactured_at: Option<DateTime<Utc>>,
}

impl NewBatch {
    #[must_use]
    pub fn new(quantity: i64) -> Self {
        Self {
            quantity,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn lot(mut self, lot_number: impl Into<String>) -> Self {
        self.lot_number = Some(lot_number.into());
        self
    }

    #[must_use]
    pub const fn expires(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    #[must_use]
    pub const fn received(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = Some(at);
        self
    }

    #[must_use]
    pub const fn manufactured(mut self, at: DateTime<Utc>) -> Self {
        self.manufactured_at = Some(at);
        self
    }

    /// Validate against the effective receipt time.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidQuantity` for a non-positive quantity and
    /// `CoreError::Validation` when the batch was manufactured after it was
    /// received or expires outside years 0 to 9999.
    pub fn validate(&self, received_at: DateTime<Utc>) -> Result<(), CoreError> {
        require_positive("quantity", self.quantity)?;
        // Stored dates must sort as text in the same order as the dates.
        if let Some(date) = self.expiration_date
            && !(0..=9999).contains(&date.year())
        {
            return Err(CoreError::Validation(format!(
                "expiration_date {date} is outside years 0000-9999"
            )));
        }
        if let Some(made) = self.manufactured_at
            && made > received_at
        {
            return Err(CoreError::Validation(format!(
                "manufactured_at {made} is after received_at {received_at}"
            )));
        }
        Ok(())
    }
}

/// Stock written off as waste.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewWaste {
    pub quantity: i64,
    pub reason: WasteReason,
    /// Waste from this batch only instead of walking FEFO order.
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewWaste {
    #[must_use]
    pub const fn new(quantity: i64, reason: WasteReason) -> Self {
        Self {
            quantity,
            reason,
            batch_id: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn from_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidQuantity` for a non-positive quantity.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_positive("quantity", self.quantity)?;
        Ok(())
    }
}

/// A physical count to reconcile against the expected quantity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAudit {
    pub actual_quantity: i64,
    pub expected_quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque reference to the conversation or session that produced the count.
    #[serde(default)]
    pub session_context_id: Option<String>,
}

impl NewAudit {
    #[must_use]
    pub const fn new(actual_quantity: i64, expected_quantity: i64) -> Self {
        Self {
            actual_quantity,
            expected_quantity,
            notes: None,
            session_context_id: None,
        }
    }

    #[must_use]
    pub const fn discrepancy(&self) -> i64 {
        self.actual_quantity - self.expected_quantity
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidQuantity` if either count is negative.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_negative("actual_quantity", self.actual_quantity)?;
        require_non_negative("expected_quantity", self.expected_quantity)?;
        Ok(())
    }
}
