//! Item update builder.
//!
//! Quantity is deliberately absent: stock only changes through the ledger.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Option<i64>>,
}

impl ItemUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.unit.is_none() && self.unit_price.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ItemUpdateBuilder(ItemUpdate);

impl ItemUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ItemUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, val: impl Into<String>) -> Self {
        self.0.unit = Some(val.into());
        self
    }

    /// Set or clear (`None`) the unit price.
    #[must_use]
    pub const fn unit_price(mut self, val: Option<i64>) -> Self {
        self.0.unit_price = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> ItemUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_changed_fields_only() {
        let update = ItemUpdateBuilder::new().unit_price(None).build();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"unit_price": null})
        );
        assert!(ItemUpdateBuilder::new().build().is_empty());
    }
}
