#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use rust_decimal::Decimal;
use storefront::history::{
    ClientSession, HistoryError, MyOrdersResponse, OrderSummary, OrdersApi,
    api::{AddressSummary, OrderLineSummary, ProductSummary},
};
use tokio::sync::Notify;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

pub fn session() -> ClientSession {
    ClientSession {
        user: "customer-1".to_string(),
        token: "token-1".to_string(),
    }
}

pub fn response(orders: Vec<OrderSummary>) -> MyOrdersResponse {
    MyOrdersResponse {
        success: true,
        count: orders.len(),
        orders,
        message: None,
    }
}

/// Delivered order, no discount: subtotal equals total.
pub fn delivered_order() -> OrderSummary {
    OrderSummary {
        id: Some("101".to_string()),
        order_id: Some("ORD-20240115-A1B2C3".to_string()),
        invoice_id: Some("INV000001".to_string()),
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
        status: "delivered".to_string(),
        items: vec![OrderLineSummary {
            name: "Basmati Rice 1kg".to_string(),
            image: Some("/images/rice.png".to_string()),
            quantity: 10,
            price_per_unit: dec("100"),
            subtotal: dec("1000"),
            product: Some(ProductSummary {
                name: Some("Basmati Rice 1kg".to_string()),
                image: Some("/images/rice.png".to_string()),
            }),
        }],
        subtotal_amount: Some(dec("1000")),
        total_amount: dec("1000"),
        shipping_address: Some(AddressSummary {
            name: Some("Asha Rao".to_string()),
            address: Some("12 MG Road".to_string()),
            city: Some("Pune".to_string()),
        }),
    }
}

/// Pending order with a 10% discount.
pub fn discounted_order() -> OrderSummary {
    OrderSummary {
        id: Some("102".to_string()),
        order_id: Some("ORD-20240116-Z9Y8X7".to_string()),
        invoice_id: Some("INV000002".to_string()),
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 16, 9, 0, 0).unwrap()),
        status: "pending".to_string(),
        items: vec![OrderLineSummary {
            name: "Green Tea 250g".to_string(),
            image: None,
            quantity: 30,
            price_per_unit: dec("90"),
            subtotal: dec("2700"),
            product: None,
        }],
        subtotal_amount: Some(dec("2700")),
        total_amount: dec("2430"),
        shipping_address: None,
    }
}

mock! {
    pub Orders {}

    #[async_trait]
    impl OrdersApi for Orders {
        async fn my_orders(&self, token: &str) -> Result<MyOrdersResponse, HistoryError>;
    }
}

/// Holds every fetch until `release` is notified.
#[derive(Default)]
pub struct GatedOrders {
    pub calls: AtomicUsize,
    pub release: Notify,
}

impl GatedOrders {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrdersApi for GatedOrders {
    async fn my_orders(&self, _token: &str) -> Result<MyOrdersResponse, HistoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(response(vec![]))
    }
}
