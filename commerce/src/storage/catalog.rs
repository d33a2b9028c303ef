use async_trait::async_trait;

use crate::error::CommerceResult;
use crate::model::{ModelId, Offer, Product, ProductFilter};

#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// Inserts or replaces the product with the same catalog code.
    async fn save_product(&self, product: &Product) -> CommerceResult<ModelId>;

    async fn get_product(&self, code: &str) -> CommerceResult<Option<Product>>;

    async fn list_products(&self, filter: &ProductFilter) -> CommerceResult<Vec<Product>>;

    /// Products that still exist among `ids`, in no particular order.
    async fn get_products_by_ids(&self, ids: &[ModelId]) -> CommerceResult<Vec<Product>>;

    /// Atomically takes `units` from stock; `false` when not enough is left.
    async fn reserve_stock(&self, product_id: ModelId, units: u32) -> CommerceResult<bool>;

    async fn release_stock(&self, product_id: ModelId, units: u32) -> CommerceResult<()>;
}

#[async_trait]
pub trait OfferStorage: Send + Sync {
    async fn save_offer(&self, offer: &Offer) -> CommerceResult<ModelId>;

    /// Looks an offer up by its normalized code.
    async fn get_offer_by_code(&self, code: &str) -> CommerceResult<Option<Offer>>;
}
