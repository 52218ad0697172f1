//! Line item model for ordering-service.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Round a monetary amount to 2 decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One priced entry on an order.
///
/// `unit_price_incl_tax`, `total_excl_tax` and `total_incl_tax` are derived
/// from quantity, unit price and tax percentage. They are never written
/// independently of their source fields; every mutation goes through
/// [`LineItemAmounts::compute`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    pub line_item_id: Uuid,
    pub order_id: Uuid,
    pub organization_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price_excl_tax: Decimal,
    pub unit_price_incl_tax: Decimal,
    pub tax_percentage: Decimal,
    pub total_excl_tax: Decimal,
    pub total_incl_tax: Decimal,
    pub delivery_notes: Option<String>,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

impl LineItem {
    /// Tax amount carried by this item.
    pub fn tax_amount(&self) -> Decimal {
        self.total_incl_tax - self.total_excl_tax
    }

    /// Recompute the derived fields from quantity, unit price and tax
    /// percentage. Must run after any of those change.
    pub fn recompute(&mut self) {
        let amounts = LineItemAmounts::compute(
            self.quantity,
            self.unit_price_excl_tax,
            self.tax_percentage,
        );
        self.unit_price_incl_tax = amounts.unit_price_incl_tax;
        self.total_excl_tax = amounts.total_excl_tax;
        self.total_incl_tax = amounts.total_incl_tax;
    }
}

/// Derived monetary fields of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItemAmounts {
    pub unit_price_incl_tax: Decimal,
    pub total_excl_tax: Decimal,
    pub total_incl_tax: Decimal,
}

impl LineItemAmounts {
    /// Derive the tax-inclusive unit price and both line totals:
    ///
    /// - `unit_price_incl = unit_price_excl * (1 + tax/100)`
    /// - `total_excl = unit_price_excl * quantity`
    /// - `total_incl = unit_price_incl * quantity`
    ///
    /// Monetary results round to 2 decimal places. Total for well-formed
    /// decimal inputs; a negative or non-numeric tax rate is a caller
    /// validation concern.
    pub fn compute(
        quantity: Decimal,
        unit_price_excl_tax: Decimal,
        tax_percentage: Decimal,
    ) -> Self {
        let multiplier = Decimal::ONE + tax_percentage / Decimal::ONE_HUNDRED;
        let unit_price_incl_tax = round_money(unit_price_excl_tax * multiplier);
        let total_excl_tax = round_money(unit_price_excl_tax * quantity);
        let total_incl_tax = round_money(unit_price_incl_tax * quantity);
        Self {
            unit_price_incl_tax,
            total_excl_tax,
            total_incl_tax,
        }
    }
}

/// Input for creating a line item. Derived fields are computed on insert.
#[derive(Debug, Clone)]
pub struct CreateLineItem {
    pub organization_id: Uuid,
    pub order_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price_excl_tax: Decimal,
    pub tax_percentage: Decimal,
    pub delivery_notes: Option<String>,
    pub sort_order: i32,
}

/// Input for updating a line item. Derived fields are recomputed whenever
/// quantity, unit price, or tax percentage change.
#[derive(Debug, Clone, Default)]
pub struct UpdateLineItem {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub unit_price_excl_tax: Option<Decimal>,
    pub tax_percentage: Option<Decimal>,
    pub delivery_notes: Option<String>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn compute_derives_inclusive_price_and_totals() {
        // 2 x 100.00 at 21%
        let amounts = LineItemAmounts::compute(dec!(2), dec!(100.00), dec!(21));
        assert_eq!(amounts.unit_price_incl_tax, dec!(121.00));
        assert_eq!(amounts.total_excl_tax, dec!(200.00));
        assert_eq!(amounts.total_incl_tax, dec!(242.00));
        assert_eq!(amounts.total_incl_tax - amounts.total_excl_tax, dec!(42.00));
    }

    #[test]
    fn compute_rounds_money_to_two_places() {
        // 19.99 at 21% -> 24.1879 -> 24.19
        let amounts = LineItemAmounts::compute(dec!(1), dec!(19.99), dec!(21));
        assert_eq!(amounts.unit_price_incl_tax, dec!(24.19));
        assert_eq!(amounts.total_incl_tax, dec!(24.19));
    }

    #[test]
    fn compute_handles_fractional_quantity() {
        // Quantities carry 3 fractional digits
        let amounts = LineItemAmounts::compute(dec!(1.500), dec!(10.00), dec!(9));
        assert_eq!(amounts.unit_price_incl_tax, dec!(10.90));
        assert_eq!(amounts.total_excl_tax, dec!(15.00));
        assert_eq!(amounts.total_incl_tax, dec!(16.35));
    }

    #[test]
    fn compute_zero_tax_keeps_prices_equal() {
        let amounts = LineItemAmounts::compute(dec!(3), dec!(12.50), dec!(0));
        assert_eq!(amounts.unit_price_incl_tax, dec!(12.50));
        assert_eq!(amounts.total_excl_tax, amounts.total_incl_tax);
    }
}
