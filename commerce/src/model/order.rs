use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::{ModelId, PackSize};
use crate::totals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Placed,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The next step of the fulfilment chain, if any.
    pub fn successor(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Placed),
            OrderStatus::Placed => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == OrderStatus::Cancelled || self.successor() == Some(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Delivery,
    Pickup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Failed, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Online,
    Upi,
    Cash,
    Phonepe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
    #[default]
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickupLocation {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Current catalog name and image of an ordered product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ModelId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Line item frozen at checkout; catalog edits never reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "productRef")]
    pub product_id: ModelId,
    /// Free-text catalog code of the product at order time.
    #[serde(rename = "productId", default)]
    pub product_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub pack_size: Option<PackSize>,
    pub price_per_unit: Decimal,
    pub total_units: u32,
    #[serde(default)]
    pub tier_range: Option<String>,
    pub subtotal: Decimal,
    /// Attached only when serving orders, never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
}

/// An order as built at checkout, before identifiers and a database id exist.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub user: ModelId,
    pub items: Vec<OrderItem>,
    pub offer: Option<ModelId>,
    pub offer_code: Option<String>,
    pub discount_amount: Decimal,
    pub discount_type: DiscountType,
    pub subtotal_amount: Decimal,
    pub total_amount: Decimal,
    pub delivery_type: DeliveryType,
    pub shipping_address: Option<ShippingAddress>,
    pub pickup_location: Option<PickupLocation>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentifiers {
    pub invoice_number: String,
    pub order_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: ModelId,
    #[serde(rename = "invoiceId")]
    pub invoice_number: Option<String>,
    #[serde(rename = "orderId")]
    pub order_code: Option<String>,
    pub user: ModelId,
    pub items: Vec<OrderItem>,
    pub offer: Option<ModelId>,
    pub offer_code: Option<String>,
    pub discount_amount: Decimal,
    pub discount_type: DiscountType,
    pub subtotal_amount: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub shipping_address: Option<ShippingAddress>,
    pub pickup_location: Option<PickupLocation>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub gateway_transaction_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The record a storage layer persists for `draft` on first save.
    pub fn from_draft(id: ModelId, draft: &OrderDraft, identifiers: &OrderIdentifiers) -> Self {
        Self {
            id,
            invoice_number: Some(identifiers.invoice_number.clone()),
            order_code: Some(identifiers.order_code.clone()),
            user: draft.user,
            items: draft.items.clone(),
            offer: draft.offer,
            offer_code: draft.offer_code.clone(),
            discount_amount: draft.discount_amount,
            discount_type: draft.discount_type,
            subtotal_amount: draft.subtotal_amount,
            total_amount: draft.total_amount,
            status: OrderStatus::Pending,
            delivery_type: draft.delivery_type,
            shipping_address: draft.shipping_address.clone(),
            pickup_location: draft.pickup_location.clone(),
            payment_status: PaymentStatus::Pending,
            payment_method: draft.payment_method,
            gateway_transaction_id: None,
            gateway_payment_id: None,
            notes: draft.notes.clone(),
            tracking_number: None,
            estimated_delivery: None,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        }
    }

    pub fn has_discount(&self) -> bool {
        totals::has_discount(self.discount_amount, self.offer_code.as_deref())
    }

    pub fn calculate_final_amount(&self) -> Decimal {
        totals::final_amount(self.subtotal_amount, self.discount_amount)
    }
}

/// Payment outcome reported for a placed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub gateway_transaction_id: Option<String>,
    #[serde(default)]
    pub gateway_payment_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Serialized order as returned by the API, with derived fields attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[serde(flatten)]
    pub order: Order,
    pub has_discount: bool,
}

impl From<Order> for OrderPayload {
    fn from(order: Order) -> Self {
        let has_discount = order.has_discount();
        Self { order, has_discount }
    }
}
