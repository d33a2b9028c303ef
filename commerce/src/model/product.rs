use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{CommerceError, CommerceResult};
use crate::model::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProductType {
    HighMargin,
    RegionalBrands,
}

/// Bulk price for purchases whose base-unit quantity falls in `[min_quantity, max_quantity]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    /// Display form of the range, e.g. `"1-20"` or `"101+"`.
    pub range: String,
    pub min_quantity: u32,
    /// `None` means the tier has no upper bound.
    #[serde(default)]
    pub max_quantity: Option<u32>,
    pub price: Decimal,
    pub margin: Decimal,
}

impl PricingTier {
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_quantity && self.max_quantity.is_none_or(|max| quantity <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSize {
    pub id: String,
    pub name: String,
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: ModelId,
    /// Catalog code, unique across the catalog.
    pub code: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub mrp: Decimal,
    #[serde(default)]
    pub pricing_tiers: Vec<PricingTier>,
    #[serde(default)]
    pub pack_sizes: Vec<PackSize>,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub brand: String,
    pub stock: i64,
    #[serde(default)]
    pub has_offer: bool,
    #[serde(default)]
    pub offer_text: Option<String>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub offer_active: bool,
    #[serde(default)]
    pub offer_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offer_end_date: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks catalog integrity before the record is written.
    pub fn validate(&self) -> CommerceResult<()> {
        let invalid = |reason: String| CommerceError::InvalidProduct {
            code: self.code.clone(),
            reason,
        };

        if self.code.trim().is_empty() {
            return Err(invalid("catalog code must not be empty".to_string()));
        }
        if self.stock < 0 {
            return Err(invalid(format!("stock must not be negative, got {}", self.stock)));
        }
        if self.mrp.is_sign_negative() {
            return Err(invalid("mrp must not be negative".to_string()));
        }

        let mut previous: Option<&PricingTier> = None;
        for tier in &self.pricing_tiers {
            if tier.price.is_sign_negative() {
                return Err(invalid(format!("tier {} has a negative price", tier.range)));
            }
            if let Some(max) = tier.max_quantity {
                if max < tier.min_quantity {
                    return Err(invalid(format!(
                        "tier {} ends ({}) before it starts ({})",
                        tier.range, max, tier.min_quantity
                    )));
                }
            }
            if let Some(prev) = previous {
                // An unbounded tier must be the last one.
                let prev_max = prev.max_quantity.ok_or_else(|| {
                    invalid(format!("unbounded tier {} is followed by {}", prev.range, tier.range))
                })?;
                if tier.min_quantity <= prev_max {
                    return Err(invalid(format!(
                        "tier {} overlaps or precedes tier {}",
                        tier.range, prev.range
                    )));
                }
            }
            previous = Some(tier);
        }

        if let Some(pack) = self.pack_sizes.iter().find(|p| p.multiplier == 0) {
            return Err(invalid(format!("pack size {} has a zero multiplier", pack.id)));
        }
        if self.discount_percent.is_sign_negative() || self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(invalid(format!(
                "discount percent must be within 0..=100, got {}",
                self.discount_percent
            )));
        }
        if let (Some(start), Some(end)) = (self.offer_start_date, self.offer_end_date) {
            if end < start {
                return Err(invalid("offer window ends before it starts".to_string()));
            }
        }
        Ok(())
    }

    pub fn pack_size(&self, pack_size_id: &str) -> Option<&PackSize> {
        self.pack_sizes.iter().find(|p| p.id == pack_size_id)
    }

    /// Whether the admin-managed product offer should be honoured at `now`.
    ///
    /// Requires both `has_offer` and `offer_active`; a missing window bound is open.
    pub fn offer_in_effect(&self, now: DateTime<Utc>) -> bool {
        self.has_offer
            && self.offer_active
            && self.offer_start_date.is_none_or(|start| start <= now)
            && self.offer_end_date.is_none_or(|end| now <= end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.category.as_ref().is_none_or(|c| c == &product.category)
            && self.brand.as_ref().is_none_or(|b| b == &product.brand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tier(range: &str, min: u32, max: Option<u32>, price: i64) -> PricingTier {
        PricingTier {
            range: range.to_string(),
            min_quantity: min,
            max_quantity: max,
            price: Decimal::new(price, 0),
            margin: Decimal::new(5, 0),
        }
    }

    fn product() -> Product {
        Product {
            id: 1,
            code: "RICE-5KG".to_string(),
            product_type: ProductType::RegionalBrands,
            name: "Rice 5kg".to_string(),
            image: None,
            mrp: Decimal::new(500, 0),
            pricing_tiers: vec![tier("1-20", 1, Some(20), 450), tier("21+", 21, None, 420)],
            pack_sizes: vec![],
            description: None,
            category: "grains".to_string(),
            brand: "Farm".to_string(),
            stock: 10,
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
    fn test_valid_product_passes() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let mut p = product();
        p.stock = -1;
        assert!(matches!(p.validate(), Err(CommerceError::InvalidProduct { .. })));
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let mut p = product();
        p.pricing_tiers = vec![tier("1-20", 1, Some(20), 450), tier("20-40", 20, Some(40), 430)];
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_unbounded_tier_must_be_last() {
        let mut p = product();
        p.pricing_tiers = vec![tier("1+", 1, None, 450), tier("21-40", 21, Some(40), 430)];
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_discount_percent_out_of_range_rejected() {
        let mut p = product();
        p.discount_percent = Decimal::new(101, 0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_offer_window_respected() {
        let now = Utc::now();
        let mut p = product();
        p.has_offer = true;
        p.offer_active = true;
        p.offer_start_date = Some(now - Duration::days(1));
        p.offer_end_date = Some(now + Duration::days(1));
        assert!(p.offer_in_effect(now));
        assert!(!p.offer_in_effect(now + Duration::days(2)));

        p.offer_active = false;
        assert!(!p.offer_in_effect(now));
    }

    #[test]
    fn test_product_wire_shape() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["type"], "regional-brands");
        assert_eq!(json["pricingTiers"][1]["maxQuantity"], serde_json::Value::Null);
        assert_eq!(json["mrp"], 500.0);
    }
}
