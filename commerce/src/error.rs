use http::StatusCode;
use thiserror::Error;

use crate::model::{ModelId, OrderStatus, PaymentStatus};

pub type CommerceResult<T> = Result<T, CommerceError>;

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("Invalid product {code}: {reason}")]
    InvalidProduct { code: String, reason: String },

    #[error("Invalid offer {code}: {reason}")]
    InvalidOffer { code: String, reason: String },

    #[error("Invalid quantity {quantity} for product {product}")]
    InvalidQuantity { product: String, quantity: u64 },

    #[error("Quantity {quantity} of product {product} is below the minimum of {minimum}")]
    QuantityBelowMinimum {
        product: String,
        quantity: u32,
        minimum: u32,
    },

    #[error("No pricing tier of product {product} covers quantity {quantity}")]
    NoPricingTier { product: String, quantity: u32 },

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Pack size {pack_size} is not offered for product {product}")]
    UnknownPackSize { product: String, pack_size: String },

    #[error("Insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: i64,
    },

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Delivery orders require a shipping address")]
    MissingShippingAddress,

    #[error("Offer code {0} not found")]
    OfferNotFound(String),

    #[error("Offer {code} cannot be applied: {reason}")]
    OfferNotApplicable { code: String, reason: String },

    #[error("Order {0} not found")]
    OrderNotFound(ModelId),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cannot change payment status from {from} to {to}")]
    InvalidPaymentTransition { from: PaymentStatus, to: PaymentStatus },

    #[error("Order {0} was changed by another request")]
    ConcurrentUpdate(ModelId),

    #[error("Duplicate order identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Could not assign unique order identifiers after {attempts} attempts")]
    IdentifierAttemptsExhausted { attempts: u32 },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Administrator role required")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CommerceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CommerceError::InvalidProduct { .. }
            | CommerceError::InvalidOffer { .. }
            | CommerceError::InvalidQuantity { .. }
            | CommerceError::QuantityBelowMinimum { .. }
            | CommerceError::NoPricingTier { .. }
            | CommerceError::UnknownPackSize { .. }
            | CommerceError::EmptyOrder
            | CommerceError::MissingShippingAddress
            | CommerceError::OfferNotApplicable { .. } => StatusCode::BAD_REQUEST,
            CommerceError::ProductNotFound(_)
            | CommerceError::OfferNotFound(_)
            | CommerceError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            CommerceError::InsufficientStock { .. }
            | CommerceError::InvalidStatusTransition { .. }
            | CommerceError::InvalidPaymentTransition { .. }
            | CommerceError::ConcurrentUpdate(_)
            | CommerceError::DuplicateIdentifier(_) => StatusCode::CONFLICT,
            CommerceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            CommerceError::Forbidden => StatusCode::FORBIDDEN,
            CommerceError::IdentifierAttemptsExhausted { .. }
            | CommerceError::Storage(_)
            | CommerceError::Database(_)
            | CommerceError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CommerceError::EmptyOrder.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CommerceError::OrderNotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(CommerceError::ConcurrentUpdate(7).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            CommerceError::IdentifierAttemptsExhausted { attempts: 3 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CommerceError::InvalidStatusTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled
            }
            .to_string(),
            "Cannot change order status from delivered to cancelled"
        );
    }
}
