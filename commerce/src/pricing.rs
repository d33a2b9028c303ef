//! Tier selection and line pricing for checkout.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{CommerceError, CommerceResult};
use crate::model::{PackSize, PricingTier, Product};

/// Rounds a money amount to 2 decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn money_to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

pub(crate) fn money_from_f64(value: f64) -> CommerceResult<Decimal> {
    Decimal::from_f64(value)
        .map(round_money)
        .ok_or_else(|| CommerceError::Storage(format!("{} is not a valid amount", value)))
}

/// Finds the tier whose range contains `quantity` base units.
///
/// Tiers are assumed ordered and non-overlapping (see `Product::validate`),
/// so the first containing tier wins.
pub fn resolve_tier(product: &Product, quantity: u32) -> CommerceResult<&PricingTier> {
    let minimum = product.pricing_tiers.iter().map(|t| t.min_quantity).min();
    match minimum {
        Some(minimum) if quantity < minimum => Err(CommerceError::QuantityBelowMinimum {
            product: product.code.clone(),
            quantity,
            minimum,
        }),
        _ => product
            .pricing_tiers
            .iter()
            .find(|tier| tier.contains(quantity))
            .ok_or_else(|| CommerceError::NoPricingTier {
                product: product.code.clone(),
                quantity,
            }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub tier_range: String,
    pub unit_price: Decimal,
    pub total_units: u32,
    pub subtotal: Decimal,
}

/// Prices `quantity` purchase units of `product`, optionally bought in `pack_size` packs.
pub fn price_line(
    product: &Product,
    quantity: u32,
    pack_size: Option<&PackSize>,
) -> CommerceResult<PricedLine> {
    let invalid_quantity = || CommerceError::InvalidQuantity {
        product: product.code.clone(),
        quantity: u64::from(quantity) * u64::from(pack_size.map_or(1, |p| p.multiplier)),
    };
    if quantity == 0 {
        return Err(invalid_quantity());
    }

    let multiplier = pack_size.map_or(1, |p| p.multiplier);
    let total_units = quantity.checked_mul(multiplier).ok_or_else(invalid_quantity)?;
    let tier = resolve_tier(product, total_units)?;

    Ok(PricedLine {
        tier_range: tier.range.clone(),
        unit_price: tier.price,
        total_units,
        subtotal: round_money(tier.price * Decimal::from(total_units)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductType;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tiered_product() -> Product {
        let tier = |range: &str, min: u32, max: Option<u32>, price: &str| PricingTier {
            range: range.to_string(),
            min_quantity: min,
            max_quantity: max,
            price: dec(price),
            margin: dec("2"),
        };
        Product {
            id: 9,
            code: "OIL-1L".to_string(),
            product_type: ProductType::HighMargin,
            name: "Sunflower Oil 1L".to_string(),
            image: Some("/img/oil.png".to_string()),
            mrp: dec("180"),
            pricing_tiers: vec![
                tier("5-20", 5, Some(20), "150.50"),
                tier("21-50", 21, Some(50), "140.25"),
                tier("51+", 51, None, "130"),
            ],
            pack_sizes: vec![PackSize {
                id: "case".to_string(),
                name: "Case of 12".to_string(),
                multiplier: 12,
            }],
            description: None,
            category: "oil".to_string(),
            brand: "Sun".to_string(),
            stock: 1000,
            has_offer: false,
            offer_text: None,
            discount_percent: Decimal::ZERO,
            discounted_price: None,
            offer_active: false,
            offer_start_date: None,
            offer_end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec("1.005")), dec("1.01"));
        assert_eq!(round_money(dec("2.344")), dec("2.34"));
        assert_eq!(round_money(dec("2.345")), dec("2.35"));
    }

    #[test]
    fn test_boundaries_resolve_to_containing_tier() {
        let product = tiered_product();
        assert_eq!(resolve_tier(&product, 5).unwrap().range, "5-20");
        assert_eq!(resolve_tier(&product, 20).unwrap().range, "5-20");
        assert_eq!(resolve_tier(&product, 21).unwrap().range, "21-50");
        assert_eq!(resolve_tier(&product, 50).unwrap().range, "21-50");
        assert_eq!(resolve_tier(&product, 51).unwrap().range, "51+");
        assert_eq!(resolve_tier(&product, 10_000).unwrap().range, "51+");
    }

    #[test]
    fn test_every_quantity_in_range_matches_its_tier() {
        let product = tiered_product();
        for quantity in 5..=120 {
            let tier = resolve_tier(&product, quantity).unwrap();
            assert!(tier.contains(quantity), "quantity {quantity} resolved to {}", tier.range);
            let expected_price = match quantity {
                5..=20 => dec("150.50"),
                21..=50 => dec("140.25"),
                _ => dec("130"),
            };
            assert_eq!(tier.price, expected_price);
        }
    }

    #[test]
    fn test_below_minimum_rejected() {
        let product = tiered_product();
        assert!(matches!(
            resolve_tier(&product, 4),
            Err(CommerceError::QuantityBelowMinimum { minimum: 5, .. })
        ));
    }

    #[test]
    fn test_gap_between_tiers_is_reported() {
        let mut product = tiered_product();
        product.pricing_tiers[1].min_quantity = 25;
        assert!(matches!(
            resolve_tier(&product, 22),
            Err(CommerceError::NoPricingTier { quantity: 22, .. })
        ));
    }

    #[test]
    fn test_no_tiers_is_reported() {
        let mut product = tiered_product();
        product.pricing_tiers.clear();
        assert!(matches!(resolve_tier(&product, 1), Err(CommerceError::NoPricingTier { .. })));
    }

    #[test]
    fn test_price_line_uses_pack_multiplier() {
        let product = tiered_product();
        let line = price_line(&product, 2, product.pack_size("case")).unwrap();
        assert_eq!(line.total_units, 24);
        assert_eq!(line.tier_range, "21-50");
        assert_eq!(line.unit_price, dec("140.25"));
        assert_eq!(line.subtotal, dec("3366.00"));
    }

    #[test]
    fn test_price_line_rejects_zero_quantity() {
        let product = tiered_product();
        assert!(matches!(
            price_line(&product, 0, None),
            Err(CommerceError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_money_f64_conversion_rounds() {
        assert_eq!(money_from_f64(90.1).unwrap(), dec("90.10"));
        assert_eq!(money_to_f64(dec("12.34")), 12.34);
    }
}
