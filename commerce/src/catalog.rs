//! Catalog reads and admin writes of products and offers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{CommerceError, CommerceResult};
use crate::model::offer::normalize_code;
use crate::model::{ModelId, Offer, Product, ProductFilter};
use crate::storage::{CatalogStorage, OfferStorage};

/// Product as served to shoppers, with the offer window already evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(flatten)]
    pub product: Product,
    pub offer_in_effect: bool,
}

impl ProductPayload {
    pub fn at(product: Product, now: DateTime<Utc>) -> Self {
        let offer_in_effect = product.offer_in_effect(now);
        Self { product, offer_in_effect }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStorage>,
    offers: Arc<dyn OfferStorage>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogStorage>, offers: Arc<dyn OfferStorage>) -> Self {
        Self { catalog, offers }
    }

    pub async fn save_product(&self, product: &Product) -> CommerceResult<ModelId> {
        product.validate()?;
        let id = self.catalog.save_product(product).await?;
        info!(product_id = id, code = %product.code, "Product saved");
        Ok(id)
    }

    pub async fn get_product(&self, code: &str) -> CommerceResult<ProductPayload> {
        let product = self
            .catalog
            .get_product(code)
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(code.to_string()))?;
        Ok(ProductPayload::at(product, Utc::now()))
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> CommerceResult<Vec<ProductPayload>> {
        let now = Utc::now();
        Ok(self
            .catalog
            .list_products(filter)
            .await?
            .into_iter()
            .filter(|product| filter.matches(product))
            .map(|product| ProductPayload::at(product, now))
            .collect())
    }

    pub async fn save_offer(&self, offer: &Offer) -> CommerceResult<ModelId> {
        offer.validate()?;
        let mut offer = offer.clone();
        offer.code = normalize_code(&offer.code);
        let id = self.offers.save_offer(&offer).await?;
        info!(offer_id = id, code = %offer.code, "Offer saved");
        Ok(id)
    }
}
