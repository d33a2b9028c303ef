mod test_utils;

use commerce::{
    CommerceError,
    model::*,
    storage::{CatalogStorage, OfferStorage, OrderStorage, SequenceStorage, SessionStorage},
};
use common::test_helpers::generate_unique_id;
use test_utils::*;

#[tokio::test]
async fn test_ensure_schema_is_idempotent() {
    let storage = test_storage().await;
    storage.ensure_schema().await.unwrap();
}

#[tokio::test]
async fn test_product_round_trip_and_upsert_by_code() {
    let storage = test_storage().await;
    let mut product = sample_product(40);
    product.has_offer = true;
    product.offer_text = Some("5% off this week".to_string());
    product.discount_percent = dec("5");
    product.discounted_price = Some(dec("114"));

    let id = storage.save_product(&product).await.unwrap();
    let loaded = storage.get_product(&product.code).await.unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.pricing_tiers, product.pricing_tiers);
    assert_eq!(loaded.pack_sizes, product.pack_sizes);
    assert_eq!(loaded.product_type, ProductType::HighMargin);
    assert_eq!(loaded.discounted_price, Some(dec("114")));

    product.stock = 12;
    let same_id = storage.save_product(&product).await.unwrap();
    assert_eq!(same_id, id);
    assert_eq!(storage.get_product(&product.code).await.unwrap().unwrap().stock, 12);
}

#[tokio::test]
async fn test_invalid_product_is_rejected_at_write() {
    let storage = test_storage().await;
    let mut product = sample_product(-1);
    assert!(matches!(
        storage.save_product(&product).await,
        Err(CommerceError::InvalidProduct { .. })
    ));

    product.stock = 1;
    product.pricing_tiers = vec![tier("1-10", 1, Some(10), "5"), tier("5-20", 5, Some(20), "4")];
    assert!(storage.save_product(&product).await.is_err());
    assert!(storage.get_product(&product.code).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_products_filters_by_category_and_brand() {
    let storage = test_storage().await;
    let category = generate_unique_id("cat");
    let mut a = sample_product(1);
    a.category = category.clone();
    a.brand = "North".to_string();
    let mut b = sample_product(1);
    b.category = category.clone();
    b.brand = "South".to_string();
    storage.save_product(&a).await.unwrap();
    storage.save_product(&b).await.unwrap();

    let in_category = ProductFilter {
        category: Some(category.clone()),
        brand: None,
    };
    assert_eq!(storage.list_products(&in_category).await.unwrap().len(), 2);

    let south = ProductFilter {
        category: Some(category),
        brand: Some("South".to_string()),
    };
    let products = storage.list_products(&south).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].code, b.code);
}

#[tokio::test]
async fn test_stock_reservation_is_conditional() {
    let storage = test_storage().await;
    let product = sample_product(10);
    let id = storage.save_product(&product).await.unwrap();

    assert!(storage.reserve_stock(id, 7).await.unwrap());
    assert!(!storage.reserve_stock(id, 4).await.unwrap());
    assert!(storage.reserve_stock(id, 3).await.unwrap());
    assert_eq!(storage.get_product(&product.code).await.unwrap().unwrap().stock, 0);

    storage.release_stock(id, 5).await.unwrap();
    assert_eq!(storage.get_product(&product.code).await.unwrap().unwrap().stock, 5);
}

#[tokio::test]
async fn test_products_by_ids_skips_missing() {
    let storage = test_storage().await;
    let id = storage.save_product(&sample_product(1)).await.unwrap();
    let products = storage.get_products_by_ids(&[id, 999_999_999]).await.unwrap();
    assert_eq!(products.len(), 1);
    assert!(storage.get_products_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sequences_are_independent_and_increasing() {
    let storage = test_storage().await;
    let invoices = generate_unique_id("invoice");
    let other = generate_unique_id("other");

    assert_eq!(storage.next_value(&invoices).await.unwrap(), 1);
    assert_eq!(storage.next_value(&invoices).await.unwrap(), 2);
    assert_eq!(storage.next_value(&other).await.unwrap(), 1);
    assert_eq!(storage.next_value(&invoices).await.unwrap(), 3);
}

#[tokio::test]
async fn test_duplicate_order_code_is_reported() {
    let storage = test_storage().await;
    let mut product = sample_product(5);
    product.id = storage.save_product(&product).await.unwrap();
    let order_code = format!("ORD-20240101-{}", &generate_unique_code_suffix());

    let first = OrderIdentifiers {
        invoice_number: format!("INV{}", generate_unique_digits()),
        order_code: order_code.clone(),
    };
    storage.insert_order(&draft_for(1, &product, 1), &first).await.unwrap();

    let second = OrderIdentifiers {
        invoice_number: format!("INV{}", generate_unique_digits()),
        order_code,
    };
    assert!(matches!(
        storage.insert_order(&draft_for(1, &product, 1), &second).await,
        Err(CommerceError::DuplicateIdentifier(_))
    ));
}

#[tokio::test]
async fn test_offer_codes_are_normalized() {
    let storage = test_storage().await;
    let mut offer = sample_offer(DiscountType::Fixed, "25");
    let code = offer.code.clone();
    offer.code = format!(" {} ", code.to_lowercase());

    storage.save_offer(&offer).await.unwrap();
    let loaded = storage.get_offer_by_code(&code.to_lowercase()).await.unwrap().unwrap();
    assert_eq!(loaded.code, code);
    assert_eq!(loaded.discount_type, DiscountType::Fixed);
    assert_eq!(loaded.discount_value, dec("25"));
}

#[tokio::test]
async fn test_sessions_resolve_by_token() {
    let storage = test_storage().await;
    let token = generate_unique_id("token");
    storage
        .save_session(&Session {
            token: token.clone(),
            user_id: 42,
            role: Role::Customer,
        })
        .await
        .unwrap();
    storage
        .save_session(&Session {
            token: token.clone(),
            user_id: 42,
            role: Role::Admin,
        })
        .await
        .unwrap();

    let session = storage.resolve_session(&token).await.unwrap().unwrap();
    assert_eq!(session.user_id, 42);
    assert!(session.is_admin());
    assert!(storage.resolve_session("unknown").await.unwrap().is_none());
}

fn generate_unique_code_suffix() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    id[..6].to_string()
}

fn generate_unique_digits() -> String {
    format!("{:09}", uuid::Uuid::new_v4().as_u128() % 1_000_000_000)
}
