#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commerce::{
    CommerceResult,
    checkout::{Checkout, CheckoutLine, CheckoutRequest},
    identifiers::IdentifierAllocator,
    model::*,
    storage::{CatalogStorage, OfferStorage, OrderStorage, ProdStorage, SequenceStorage},
};
use common::config::CheckoutConfig;
use common::test_helpers::{generate_unique_code, generate_unique_id, get_test_database_url};
use mockall::mock;
use rust_decimal::Decimal;
use sea_orm::ConnectOptions;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

async fn connect(url: String) -> Arc<ProdStorage> {
    let mut options = ConnectOptions::new(url);
    // In-memory SQLite lives and dies with its single connection.
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let storage = ProdStorage::with_options(options)
        .await
        .expect("Failed to connect to test database");
    storage.ensure_schema().await.expect("Failed to create schema");
    Arc::new(storage)
}

/// Storage on `TEST_DATABASE_URL`, falling back to in-memory SQLite.
pub async fn test_storage() -> Arc<ProdStorage> {
    connect(get_test_database_url()).await
}

/// A private in-memory database, for tests that depend on sequence values.
pub async fn fresh_storage() -> Arc<ProdStorage> {
    connect(common::test_helpers::get_test_in_memory_database_url()).await
}

pub fn tier(range: &str, min: u32, max: Option<u32>, price: &str) -> PricingTier {
    PricingTier {
        range: range.to_string(),
        min_quantity: min,
        max_quantity: max,
        price: dec(price),
        margin: dec("3"),
    }
}

/// A product with tiers 1-20 @ 100, 21-50 @ 90, 51+ @ 80 and a case-of-12 pack.
pub fn sample_product(stock: i64) -> Product {
    Product {
        id: 0,
        code: generate_unique_code("sku"),
        product_type: ProductType::HighMargin,
        name: "Basmati Rice 1kg".to_string(),
        image: Some("/images/rice.png".to_string()),
        mrp: dec("120"),
        pricing_tiers: vec![
            tier("1-20", 1, Some(20), "100"),
            tier("21-50", 21, Some(50), "90"),
            tier("51+", 51, None, "80"),
        ],
        pack_sizes: vec![PackSize {
            id: "case".to_string(),
            name: "Case of 12".to_string(),
            multiplier: 12,
        }],
        description: Some("Long grain".to_string()),
        category: "grains".to_string(),
        brand: "Harvest".to_string(),
        stock,
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

pub fn sample_offer(discount_type: DiscountType, value: &str) -> Offer {
    Offer {
        id: 0,
        code: generate_unique_code("promo"),
        discount_type,
        discount_value: dec(value),
        min_order_amount: None,
        max_discount_amount: None,
        active: true,
        starts_at: None,
        ends_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        name: Some("Asha Rao".to_string()),
        address: Some("12 Market Road".to_string()),
        city: Some("Pune".to_string()),
        state: Some("MH".to_string()),
        pincode: Some("411001".to_string()),
        postal_code: None,
        country: Some("India".to_string()),
        phone: Some("9800000000".to_string()),
    }
}

pub fn delivery_request(lines: Vec<(&str, u32, Option<&str>)>) -> CheckoutRequest {
    CheckoutRequest {
        items: lines
            .into_iter()
            .map(|(code, quantity, pack)| CheckoutLine {
                product_code: code.to_string(),
                quantity,
                pack_size_id: pack.map(str::to_string),
            })
            .collect(),
        shipping_address: Some(shipping_address()),
        payment_method: Some(PaymentMethod::Cod),
        ..Default::default()
    }
}

pub fn checkout_config(max_identifier_attempts: u32) -> CheckoutConfig {
    CheckoutConfig {
        max_identifier_attempts,
        invoice_sequence: generate_unique_id("invoice"),
    }
}

pub fn checkout_for(storage: &Arc<ProdStorage>, config: &CheckoutConfig) -> Checkout {
    let sequences: Arc<dyn SequenceStorage> = storage.clone();
    Checkout::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        IdentifierAllocator::new(sequences, config.invoice_sequence.clone()),
        config,
    )
}

pub fn draft_for(user: ModelId, product: &Product, quantity: u32) -> OrderDraft {
    let subtotal = product.pricing_tiers[0].price * Decimal::from(quantity);
    OrderDraft {
        user,
        items: vec![OrderItem {
            product_id: product.id,
            product_code: Some(product.code.clone()),
            name: product.name.clone(),
            image: product.image.clone(),
            quantity,
            pack_size: None,
            price_per_unit: product.pricing_tiers[0].price,
            total_units: quantity,
            tier_range: Some(product.pricing_tiers[0].range.clone()),
            subtotal,
            product: None,
        }],
        offer: None,
        offer_code: None,
        discount_amount: Decimal::ZERO,
        discount_type: DiscountType::None,
        subtotal_amount: subtotal,
        total_amount: subtotal,
        delivery_type: DeliveryType::Delivery,
        shipping_address: Some(shipping_address()),
        pickup_location: None,
        payment_method: Some(PaymentMethod::Upi),
        notes: None,
        created_at: Utc::now(),
    }
}

mock! {
    pub Catalog {}

    #[async_trait]
    impl CatalogStorage for Catalog {
        async fn save_product(&self, product: &Product) -> CommerceResult<ModelId>;
        async fn get_product(&self, code: &str) -> CommerceResult<Option<Product>>;
        async fn list_products(&self, filter: &ProductFilter) -> CommerceResult<Vec<Product>>;
        async fn get_products_by_ids(&self, ids: &[ModelId]) -> CommerceResult<Vec<Product>>;
        async fn reserve_stock(&self, product_id: ModelId, units: u32) -> CommerceResult<bool>;
        async fn release_stock(&self, product_id: ModelId, units: u32) -> CommerceResult<()>;
    }
}

mock! {
    pub Offers {}

    #[async_trait]
    impl OfferStorage for Offers {
        async fn save_offer(&self, offer: &Offer) -> CommerceResult<ModelId>;
        async fn get_offer_by_code(&self, code: &str) -> CommerceResult<Option<Offer>>;
    }
}

mock! {
    pub Orders {}

    #[async_trait]
    impl OrderStorage for Orders {
        async fn insert_order(
            &self,
            draft: &OrderDraft,
            identifiers: &OrderIdentifiers,
        ) -> CommerceResult<Order>;
        async fn get_order(&self, order_id: ModelId) -> CommerceResult<Option<Order>>;
        async fn orders_for_user(&self, user: ModelId) -> CommerceResult<Vec<Order>>;
        async fn transition_status(
            &self,
            order_id: ModelId,
            from: OrderStatus,
            to: OrderStatus,
            at: DateTime<Utc>,
        ) -> CommerceResult<bool>;
        async fn transition_payment(
            &self,
            order_id: ModelId,
            from: PaymentStatus,
            update: &PaymentUpdate,
            at: DateTime<Utc>,
        ) -> CommerceResult<bool>;
        async fn update_tracking(
            &self,
            order_id: ModelId,
            update: &TrackingUpdate,
            at: DateTime<Utc>,
        ) -> CommerceResult<bool>;
    }
}

mock! {
    pub Sequences {}

    #[async_trait]
    impl SequenceStorage for Sequences {
        async fn next_value(&self, name: &str) -> CommerceResult<i64>;
    }
}

/// Catalog mock that knows a single product with plenty of stock.
pub fn catalog_with(product: Product) -> MockCatalog {
    let mut catalog = MockCatalog::new();
    let code = product.code.clone();
    catalog
        .expect_get_product()
        .withf(move |requested| requested == code)
        .returning(move |_| Ok(Some(product.clone())));
    catalog.expect_reserve_stock().returning(|_, _| Ok(true));
    catalog
}
