//! Order placement: pricing a cart, reserving stock and persisting the order.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use common::config::CheckoutConfig;
use metrics::{counter, histogram};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{CommerceError, CommerceResult};
use crate::identifiers::IdentifierAllocator;
use crate::model::offer::normalize_code;
use crate::model::{
    DeliveryType, ModelId, Offer, Order, OrderDraft, OrderItem, PaymentMethod, PickupLocation,
    ShippingAddress,
};
use crate::pricing::price_line;
use crate::storage::{CatalogStorage, OfferStorage, OrderStorage};
use crate::totals::compute_totals;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_code: String,
    pub quantity: u32,
    #[serde(default)]
    pub pack_size_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    #[serde(default)]
    pub offer_code: Option<String>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub pickup_location: Option<PickupLocation>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    fn validate(&self) -> CommerceResult<()> {
        if self.items.is_empty() {
            return Err(CommerceError::EmptyOrder);
        }
        if let Some(line) = self.items.iter().find(|line| line.quantity == 0) {
            return Err(CommerceError::InvalidQuantity {
                product: line.product_code.clone(),
                quantity: 0,
            });
        }
        if self.delivery_type == DeliveryType::Delivery && self.shipping_address.is_none() {
            return Err(CommerceError::MissingShippingAddress);
        }
        Ok(())
    }
}

/// Turns a cart into a persisted order.
#[derive(Clone)]
pub struct Checkout {
    catalog: Arc<dyn CatalogStorage>,
    offers: Arc<dyn OfferStorage>,
    orders: Arc<dyn OrderStorage>,
    identifiers: IdentifierAllocator,
    max_identifier_attempts: u32,
}

impl Checkout {
    pub fn new(
        catalog: Arc<dyn CatalogStorage>,
        offers: Arc<dyn OfferStorage>,
        orders: Arc<dyn OrderStorage>,
        identifiers: IdentifierAllocator,
        config: &CheckoutConfig,
    ) -> Self {
        Self {
            catalog,
            offers,
            orders,
            identifiers,
            max_identifier_attempts: config.max_identifier_attempts.max(1),
        }
    }

    pub async fn place_order(&self, user: ModelId, request: &CheckoutRequest) -> CommerceResult<Order> {
        let started = Instant::now();
        request.validate()?;

        let now = Utc::now();
        let items = self.price_items(request).await?;

        let mut reserved = Vec::with_capacity(items.len());
        let result = self.reserve_and_persist(user, request, items, now, &mut reserved).await;

        match result {
            Ok(order) => {
                counter!("storefront_orders_placed_total").increment(1);
                histogram!("storefront_checkout_seconds").record(started.elapsed().as_secs_f64());
                info!(
                    order_id = order.id,
                    user,
                    total = %order.total_amount,
                    "Placed order {}",
                    order.order_code.as_deref().unwrap_or_default()
                );
                Ok(order)
            }
            Err(err) => {
                warn!(user, "Checkout failed: {}", err);
                self.release(&reserved).await;
                Err(err)
            }
        }
    }

    async fn price_items(&self, request: &CheckoutRequest) -> CommerceResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = self
                .catalog
                .get_product(&line.product_code)
                .await?
                .ok_or_else(|| CommerceError::ProductNotFound(line.product_code.clone()))?;

            let pack_size = match &line.pack_size_id {
                Some(id) => Some(product.pack_size(id).ok_or_else(|| CommerceError::UnknownPackSize {
                    product: product.code.clone(),
                    pack_size: id.clone(),
                })?),
                None => None,
            };
            let priced = price_line(&product, line.quantity, pack_size)?;
            debug!(
                product = %product.code,
                units = priced.total_units,
                tier = %priced.tier_range,
                "Priced line"
            );

            items.push(OrderItem {
                product_id: product.id,
                product_code: Some(product.code.clone()),
                name: product.name.clone(),
                image: product.image.clone(),
                quantity: line.quantity,
                pack_size: pack_size.cloned(),
                price_per_unit: priced.unit_price,
                total_units: priced.total_units,
                tier_range: Some(priced.tier_range),
                subtotal: priced.subtotal,
                product: None,
            });
        }
        Ok(items)
    }

    async fn reserve_and_persist(
        &self,
        user: ModelId,
        request: &CheckoutRequest,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
        reserved: &mut Vec<(ModelId, u32)>,
    ) -> CommerceResult<Order> {
        for item in &items {
            if !self.catalog.reserve_stock(item.product_id, item.total_units).await? {
                let available = self
                    .catalog
                    .get_products_by_ids(&[item.product_id])
                    .await?
                    .first()
                    .map_or(0, |p| p.stock);
                return Err(CommerceError::InsufficientStock {
                    product: item.product_code.clone().unwrap_or_else(|| item.name.clone()),
                    requested: item.total_units,
                    available,
                });
            }
            reserved.push((item.product_id, item.total_units));
        }

        let offer = match &request.offer_code {
            Some(code) if !code.trim().is_empty() => Some(self.resolve_offer(code).await?),
            _ => None,
        };
        let totals = compute_totals(&items, offer.as_ref(), now)?;

        let draft = OrderDraft {
            user,
            items,
            offer: offer.as_ref().map(|o| o.id),
            offer_code: offer.as_ref().map(|o| normalize_code(&o.code)),
            discount_amount: totals.discount_amount,
            discount_type: totals.discount_type,
            subtotal_amount: totals.subtotal_amount,
            total_amount: totals.total_amount,
            delivery_type: request.delivery_type,
            shipping_address: request.shipping_address.clone(),
            pickup_location: request.pickup_location.clone(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            created_at: now,
        };
        self.persist(&draft).await
    }

    async fn resolve_offer(&self, code: &str) -> CommerceResult<Offer> {
        self.offers
            .get_offer_by_code(code)
            .await?
            .ok_or_else(|| CommerceError::OfferNotFound(normalize_code(code)))
    }

    /// Inserts `draft`, drawing fresh identifiers after each uniqueness conflict.
    async fn persist(&self, draft: &OrderDraft) -> CommerceResult<Order> {
        for attempt in 1..=self.max_identifier_attempts {
            let identifiers = self.identifiers.allocate(draft.created_at).await?;
            match self.orders.insert_order(draft, &identifiers).await {
                Err(CommerceError::DuplicateIdentifier(reason)) => {
                    counter!("storefront_identifier_conflicts_total").increment(1);
                    warn!(
                        attempt,
                        invoice_number = %identifiers.invoice_number,
                        order_code = %identifiers.order_code,
                        "Identifier conflict, retrying: {}", reason
                    );
                }
                result => return result,
            }
        }
        Err(CommerceError::IdentifierAttemptsExhausted {
            attempts: self.max_identifier_attempts,
        })
    }

    async fn release(&self, reserved: &[(ModelId, u32)]) {
        for &(product_id, units) in reserved {
            if let Err(err) = self.catalog.release_stock(product_id, units).await {
                warn!(product_id, units, "Failed to release reserved stock: {}", err);
            }
        }
    }
}
