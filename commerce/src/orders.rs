//! Order history reads and post-checkout updates of placed orders.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{CommerceError, CommerceResult};
use crate::model::{ModelId, Order, OrderStatus, ProductRef, Session};
use crate::storage::{CatalogStorage, OrderStorage};

pub use crate::model::{PaymentUpdate, TrackingUpdate};

/// Reads and post-checkout updates of placed orders.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStorage>,
    catalog: Arc<dyn CatalogStorage>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderStorage>, catalog: Arc<dyn CatalogStorage>) -> Self {
        Self { orders, catalog }
    }

    /// The session owner's orders, newest first, with current product name and image attached.
    pub async fn my_orders(&self, session: &Session) -> CommerceResult<Vec<Order>> {
        let mut orders = self.orders.orders_for_user(session.user_id).await?;

        let mut ids: Vec<ModelId> = orders
            .iter()
            .flat_map(|order| order.items.iter().map(|item| item.product_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let products: HashMap<ModelId, ProductRef> = self
            .catalog
            .get_products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, ProductRef { id: p.id, name: p.name, image: p.image }))
            .collect();

        for item in orders.iter_mut().flat_map(|order| order.items.iter_mut()) {
            item.product = products.get(&item.product_id).cloned();
        }
        Ok(orders)
    }

    /// Orders of other users are reported as missing unless the session is an admin.
    pub async fn get_order(&self, session: &Session, order_id: ModelId) -> CommerceResult<Order> {
        let order = self.load(order_id).await?;
        if order.user != session.user_id && !session.is_admin() {
            return Err(CommerceError::OrderNotFound(order_id));
        }
        Ok(order)
    }

    /// Each update writes only its own columns, and only while the value it
    /// validated against is still stored.
    pub async fn update_status(&self, order_id: ModelId, next: OrderStatus) -> CommerceResult<Order> {
        let order = self.load(order_id).await?;
        if !order.status.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition {
                from: order.status,
                to: next,
            });
        }
        if !self.orders.transition_status(order_id, order.status, next, Utc::now()).await? {
            return Err(self.lost_update(order_id).await);
        }
        info!(order_id, from = %order.status, to = %next, "Order status changed");
        self.load(order_id).await
    }

    pub async fn record_payment(&self, order_id: ModelId, update: &PaymentUpdate) -> CommerceResult<Order> {
        let order = self.load(order_id).await?;
        if !order.payment_status.can_transition_to(update.payment_status) {
            return Err(CommerceError::InvalidPaymentTransition {
                from: order.payment_status,
                to: update.payment_status,
            });
        }
        if !self
            .orders
            .transition_payment(order_id, order.payment_status, update, Utc::now())
            .await?
        {
            return Err(self.lost_update(order_id).await);
        }
        info!(order_id, payment_status = %update.payment_status, "Payment recorded");
        self.load(order_id).await
    }

    pub async fn set_tracking(&self, order_id: ModelId, update: &TrackingUpdate) -> CommerceResult<Order> {
        if !self.orders.update_tracking(order_id, update, Utc::now()).await? {
            return Err(CommerceError::OrderNotFound(order_id));
        }
        self.load(order_id).await
    }

    async fn load(&self, order_id: ModelId) -> CommerceResult<Order> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound(order_id))
    }

    /// Why a conditional write matched no row.
    async fn lost_update(&self, order_id: ModelId) -> CommerceError {
        match self.orders.get_order(order_id).await {
            Ok(Some(_)) => {
                warn!(order_id, "Order changed between read and write");
                CommerceError::ConcurrentUpdate(order_id)
            }
            Ok(None) => CommerceError::OrderNotFound(order_id),
            Err(err) => err,
        }
    }
}
