use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::config::ClientConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use url::Url;

use super::HistoryError;

const MY_ORDERS_PATH: &str = "orders/my-orders";

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(i64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
        IdRepr::Text(text) => text,
        IdRepr::Number(number) => number.to_string(),
    }))
}

/// Body of `GET /orders/my-orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyOrdersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub orders: Vec<OrderSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

/// An order as the history view reads it. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items: Vec<OrderLineSummary>,
    #[serde(default)]
    pub subtotal_amount: Option<Decimal>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_address: Option<AddressSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price_per_unit: Decimal,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub product: Option<ProductSummary>,
}

/// Current catalog details attached by the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddressSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn my_orders(&self, token: &str) -> Result<MyOrdersResponse, HistoryError>;
}

/// Fetches the signed-in customer's orders from the storefront backend.
pub struct HttpOrdersApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrdersApi {
    pub fn new(config: &ClientConfig) -> Result<Self, HistoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn orders_url(&self) -> Result<Url, HistoryError> {
        Ok(self.base_url.join(MY_ORDERS_PATH)?)
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn my_orders(&self, token: &str) -> Result<MyOrdersResponse, HistoryError> {
        let url = self.orders_url()?;
        tracing::debug!(%url, "Fetching order history");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "Order history request failed");
            return Err(HistoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MyOrdersResponse = response.json().await?;
        if !body.success {
            return Err(HistoryError::Rejected(body.message.unwrap_or_default()));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ClientConfig {
        ClientConfig {
            api_base_url: Url::parse(base).unwrap(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_orders_url_joins_base() {
        let api = HttpOrdersApi::new(&config("http://shop.test/api/")).unwrap();
        assert_eq!(api.orders_url().unwrap().as_str(), "http://shop.test/api/orders/my-orders");
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let body = r#"{
            "success": true,
            "count": 2,
            "orders": [
                {"id": 17, "status": "delivered", "totalAmount": 250.5},
                {"_id": "65f1c0ffee", "items": [{"name": "Tea", "quantity": 2, "product": null}]}
            ]
        }"#;
        let response: MyOrdersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.orders[0].id.as_deref(), Some("17"));
        assert_eq!(response.orders[0].total_amount, Decimal::new(2505, 1));
        assert!(response.orders[0].subtotal_amount.is_none());
        assert_eq!(response.orders[1].id.as_deref(), Some("65f1c0ffee"));
        assert_eq!(response.orders[1].status, "");
        assert!(response.orders[1].items[0].product.is_none());
    }
}
