//! Order model for ordering-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::line_item::LineItem;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "confirmed" => OrderStatus::Confirmed,
            "in_progress" => OrderStatus::InProgress,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Draft,
        }
    }
}

/// An order for a customer, carrying line items and aggregate totals.
///
/// `order_number` is a sequence number (`ORD-YEAR-NNNN`), immutable once
/// assigned and unique per organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: Uuid,
    pub organization_id: Uuid,
    pub customer_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub description: Option<String>,
    pub status: String,
    pub subtotal_excl_tax: Decimal,
    pub tax_total: Decimal,
    pub total_incl_tax: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

/// Aggregate totals over an order's line items.
///
/// Always recomputed from the full current item set, never maintained
/// incrementally, so out-of-band item edits cannot leave the stored totals
/// stale once the next recompute runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal_excl_tax: Decimal,
    pub tax_total: Decimal,
    pub total_incl_tax: Decimal,
}

impl OrderTotals {
    pub fn zero() -> Self {
        Self {
            subtotal_excl_tax: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            total_incl_tax: Decimal::ZERO,
        }
    }

    /// Sum the per-item totals across all current items. Idempotent: the
    /// same item set always yields identical totals.
    pub fn from_items(items: &[LineItem]) -> Self {
        Self {
            subtotal_excl_tax: items.iter().map(|i| i.total_excl_tax).sum(),
            tax_total: items.iter().map(|i| i.tax_amount()).sum(),
            total_incl_tax: items.iter().map(|i| i.total_incl_tax).sum(),
        }
    }
}

/// Filter parameters for listing orders.
#[derive(Debug, Clone, Default)]
pub struct ListOrdersFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_size: i32,
    pub page_token: Option<Uuid>,
}

/// Input for creating an order. When `order_number` is `None` the next
/// number in the organization's yearly sequence is allocated.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub organization_id: Uuid,
    pub customer_id: Uuid,
    pub order_number: Option<String>,
    pub order_date: NaiveDate,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

/// Input for updating an order. Field-by-field allow list; the order number
/// and totals are deliberately absent (immutable and derived respectively).
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub order_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItemAmounts;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal, tax: Decimal) -> LineItem {
        let amounts = LineItemAmounts::compute(quantity, unit_price, tax);
        LineItem {
            line_item_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            description: "item".to_string(),
            quantity,
            unit: "stuk".to_string(),
            unit_price_excl_tax: unit_price,
            unit_price_incl_tax: amounts.unit_price_incl_tax,
            tax_percentage: tax,
            total_excl_tax: amounts.total_excl_tax,
            total_incl_tax: amounts.total_incl_tax,
            delivery_notes: None,
            sort_order: 0,
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn totals_sum_item_fields() {
        let items = vec![
            item(dec!(2), dec!(100.00), dec!(21)),
            item(dec!(1), dec!(50.00), dec!(9)),
        ];
        let totals = OrderTotals::from_items(&items);
        assert_eq!(totals.subtotal_excl_tax, dec!(250.00));
        assert_eq!(totals.tax_total, dec!(46.50));
        assert_eq!(totals.total_incl_tax, dec!(296.50));
    }

    #[test]
    fn totals_recompute_reflects_single_item_change() {
        let mut items = vec![
            item(dec!(2), dec!(100.00), dec!(21)),
            item(dec!(1), dec!(50.00), dec!(9)),
        ];
        let before = OrderTotals::from_items(&items);

        items[1].quantity = dec!(2);
        items[1].recompute();
        let after = OrderTotals::from_items(&items);

        assert_eq!(
            after.subtotal_excl_tax - before.subtotal_excl_tax,
            dec!(50.00)
        );
        assert_eq!(after.total_incl_tax - before.total_incl_tax, dec!(54.50));
    }

    #[test]
    fn totals_of_empty_item_set_are_zero() {
        assert_eq!(OrderTotals::from_items(&[]), OrderTotals::zero());
    }

    #[test]
    fn totals_recompute_is_idempotent() {
        let items = vec![item(dec!(3), dec!(19.99), dec!(21))];
        assert_eq!(
            OrderTotals::from_items(&items),
            OrderTotals::from_items(&items)
        );
    }

    #[test]
    fn subtotal_plus_tax_equals_total() {
        let items = vec![
            item(dec!(2.500), dec!(13.37), dec!(21)),
            item(dec!(4), dec!(0.99), dec!(9)),
            item(dec!(1), dec!(120.00), dec!(0)),
        ];
        let totals = OrderTotals::from_items(&items);
        assert_eq!(
            totals.subtotal_excl_tax + totals.tax_total,
            totals.total_incl_tax
        );
    }
}
