//! Order amounts computed once at checkout and frozen into the record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::CommerceResult;
use crate::model::{DiscountType, Offer, OrderItem};
use crate::pricing::round_money;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub subtotal_amount: Decimal,
    pub discount_amount: Decimal,
    pub discount_type: DiscountType,
    pub total_amount: Decimal,
}

pub fn subtotal(items: &[OrderItem]) -> Decimal {
    round_money(items.iter().map(|item| item.subtotal).sum())
}

/// Discount an offer grants on `subtotal`, never more than the subtotal itself.
pub fn compute_discount(offer: &Offer, subtotal: Decimal) -> Decimal {
    let raw = match offer.discount_type {
        DiscountType::Percentage => {
            let amount = round_money(subtotal * offer.discount_value / Decimal::ONE_HUNDRED);
            match offer.max_discount_amount {
                Some(cap) => amount.min(cap),
                None => amount,
            }
        }
        DiscountType::Fixed => offer.discount_value,
        DiscountType::None => Decimal::ZERO,
    };
    round_money(raw.max(Decimal::ZERO).min(subtotal))
}

pub fn final_amount(subtotal: Decimal, discount: Decimal) -> Decimal {
    round_money(subtotal - discount).max(Decimal::ZERO)
}

pub fn has_discount(discount_amount: Decimal, offer_code: Option<&str>) -> bool {
    discount_amount > Decimal::ZERO && offer_code.is_some()
}

/// Totals for `items`, applying `offer` when one was redeemed.
///
/// The offer must already be applicable at `now`; its minimum order amount is
/// checked against the computed subtotal here.
pub fn compute_totals(
    items: &[OrderItem],
    offer: Option<&Offer>,
    now: DateTime<Utc>,
) -> CommerceResult<OrderTotals> {
    let subtotal_amount = subtotal(items);
    let (discount_amount, discount_type) = match offer {
        Some(offer) => {
            offer.check_applicable(subtotal_amount, now)?;
            (compute_discount(offer, subtotal_amount), offer.discount_type)
        }
        None => (Decimal::ZERO, DiscountType::None),
    };

    Ok(OrderTotals {
        subtotal_amount,
        discount_amount,
        discount_type,
        total_amount: final_amount(subtotal_amount, discount_amount),
    })
}
