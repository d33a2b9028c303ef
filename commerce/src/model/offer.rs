use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CommerceError, CommerceResult};
use crate::model::{DiscountType, ModelId};

/// Marketing discount redeemable on an order through its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub id: ModelId,
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent of the subtotal for `percentage` offers, an amount for `fixed` ones.
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub max_discount_amount: Option<Decimal>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Offer codes are stored trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Offer {
    pub fn validate(&self) -> CommerceResult<()> {
        let invalid = |reason: &str| CommerceError::InvalidOffer {
            code: self.code.clone(),
            reason: reason.to_string(),
        };
        if normalize_code(&self.code).is_empty() {
            return Err(invalid("code must not be empty"));
        }
        match self.discount_type {
            DiscountType::None => return Err(invalid("discount type must be percentage or fixed")),
            DiscountType::Percentage if self.discount_value > Decimal::ONE_HUNDRED => {
                return Err(invalid("percentage must not exceed 100"));
            }
            _ => {}
        }
        if self.discount_value.is_sign_negative() {
            return Err(invalid("discount value must not be negative"));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end < start {
                return Err(invalid("validity window ends before it starts"));
            }
        }
        Ok(())
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now <= end)
    }

    /// Rejects the offer for an order of `subtotal` placed at `now`.
    pub fn check_applicable(&self, subtotal: Decimal, now: DateTime<Utc>) -> CommerceResult<()> {
        let not_applicable = |reason: String| CommerceError::OfferNotApplicable {
            code: self.code.clone(),
            reason,
        };
        if !self.is_live(now) {
            return Err(not_applicable("offer is not active".to_string()));
        }
        if let Some(minimum) = self.min_order_amount {
            if subtotal < minimum {
                return Err(not_applicable(format!("minimum order amount is {}", minimum)));
            }
        }
        Ok(())
    }
}
