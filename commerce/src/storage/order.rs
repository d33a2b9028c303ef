use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CommerceResult;
use crate::model::{
    ModelId, Order, OrderDraft, OrderIdentifiers, OrderStatus, PaymentStatus, PaymentUpdate, TrackingUpdate,
};

#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// First persistence of an order.
    ///
    /// Fails with `CommerceError::DuplicateIdentifier` when either identifier
    /// is already taken.
    async fn insert_order(
        &self,
        draft: &OrderDraft,
        identifiers: &OrderIdentifiers,
    ) -> CommerceResult<Order>;

    async fn get_order(&self, order_id: ModelId) -> CommerceResult<Option<Order>>;

    /// Orders placed by `user`, newest first.
    async fn orders_for_user(&self, user: ModelId) -> CommerceResult<Vec<Order>>;

    /// Moves the order from `from` to `to`. Returns `false` when the order
    /// is missing or its status is no longer `from`.
    async fn transition_status(
        &self,
        order_id: ModelId,
        from: OrderStatus,
        to: OrderStatus,
        at: DateTime<Utc>,
    ) -> CommerceResult<bool>;

    /// Writes the payment status and any gateway ids, only while the payment
    /// status is still `from`.
    async fn transition_payment(
        &self,
        order_id: ModelId,
        from: PaymentStatus,
        update: &PaymentUpdate,
        at: DateTime<Utc>,
    ) -> CommerceResult<bool>;

    /// Writes the tracking fields that are set. Returns `false` when the order is missing.
    async fn update_tracking(
        &self,
        order_id: ModelId,
        update: &TrackingUpdate,
        at: DateTime<Utc>,
    ) -> CommerceResult<bool>;
}

#[async_trait]
pub trait SequenceStorage: Send + Sync {
    /// Increments the named sequence and returns the new value, starting at 1.
    async fn next_value(&self, name: &str) -> CommerceResult<i64>;
}
