use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use std::str::FromStr;

use crate::error::{CommerceError, CommerceResult};
use crate::model::{
    Offer, Order, OrderDraft, OrderIdentifiers, OrderStatus, PaymentStatus, Product, Role, Session,
};
use crate::pricing::{money_from_f64, money_to_f64};

fn parse_column<T: FromStr>(column: &str, value: &str) -> CommerceResult<T> {
    T::from_str(value)
        .map_err(|_| CommerceError::Storage(format!("unexpected {} value: {}", column, value)))
}

fn optional_money(value: Option<f64>) -> CommerceResult<Option<rust_decimal::Decimal>> {
    value.map(money_from_f64).transpose()
}

// Catalog
pub mod product {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub code: String,
        pub product_type: String,
        pub name: String,
        pub image: Option<String>,
        pub mrp: f64,
        pub pricing_tiers: Json,
        pub pack_sizes: Json,
        pub description: Option<String>,
        #[sea_orm(indexed)]
        pub category: String,
        pub brand: String,
        pub stock: i64,
        pub has_offer: bool,
        pub offer_text: Option<String>,
        pub discount_percent: f64,
        pub discounted_price: Option<f64>,
        pub offer_active: bool,
        pub offer_start_date: Option<NaiveDateTime>,
        pub offer_end_date: Option<NaiveDateTime>,
        pub created_at: NaiveDateTime,
        pub updated_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for Product {
        type Error = CommerceError;

        fn try_from(model: Model) -> CommerceResult<Self> {
            Ok(Product {
                id: model.id,
                product_type: parse_column("product_type", &model.product_type)?,
                code: model.code,
                name: model.name,
                image: model.image,
                mrp: money_from_f64(model.mrp)?,
                pricing_tiers: serde_json::from_value(model.pricing_tiers)?,
                pack_sizes: serde_json::from_value(model.pack_sizes)?,
                description: model.description,
                category: model.category,
                brand: model.brand,
                stock: model.stock,
                has_offer: model.has_offer,
                offer_text: model.offer_text,
                discount_percent: money_from_f64(model.discount_percent)?,
                discounted_price: optional_money(model.discounted_price)?,
                offer_active: model.offer_active,
                offer_start_date: model.offer_start_date.map(|d| d.and_utc()),
                offer_end_date: model.offer_end_date.map(|d| d.and_utc()),
                created_at: model.created_at.and_utc(),
                updated_at: model.updated_at.and_utc(),
            })
        }
    }

    /// Active model carrying every catalog column of `product`; the id is left to the caller.
    pub fn active_model(product: &Product) -> CommerceResult<ActiveModel> {
        use sea_orm::{NotSet, Set};

        Ok(ActiveModel {
            id: NotSet,
            code: Set(product.code.trim().to_string()),
            product_type: Set(product.product_type.to_string()),
            name: Set(product.name.clone()),
            image: Set(product.image.clone()),
            mrp: Set(money_to_f64(product.mrp)),
            pricing_tiers: Set(serde_json::to_value(&product.pricing_tiers)?),
            pack_sizes: Set(serde_json::to_value(&product.pack_sizes)?),
            description: Set(product.description.clone()),
            category: Set(product.category.clone()),
            brand: Set(product.brand.clone()),
            stock: Set(product.stock),
            has_offer: Set(product.has_offer),
            offer_text: Set(product.offer_text.clone()),
            discount_percent: Set(money_to_f64(product.discount_percent)),
            discounted_price: Set(product.discounted_price.map(money_to_f64)),
            offer_active: Set(product.offer_active),
            offer_start_date: Set(product.offer_start_date.map(|d| d.naive_utc())),
            offer_end_date: Set(product.offer_end_date.map(|d| d.naive_utc())),
            created_at: Set(product.created_at.naive_utc()),
            updated_at: Set(product.updated_at.naive_utc()),
        })
    }
}

// Orders
pub mod order {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub invoice_number: Option<String>,
        #[sea_orm(unique)]
        pub order_code: Option<String>,
        #[sea_orm(indexed)]
        pub user_id: i64,
        pub items: Json,
        pub offer_id: Option<i64>,
        pub offer_code: Option<String>,
        pub discount_amount: f64,
        pub discount_type: String,
        pub subtotal_amount: f64,
        pub total_amount: f64,
        pub status: String,
        pub delivery_type: String,
        pub shipping_address: Option<Json>,
        pub pickup_location: Option<Json>,
        pub payment_status: String,
        pub payment_method: Option<String>,
        pub gateway_transaction_id: Option<String>,
        pub gateway_payment_id: Option<String>,
        pub notes: Option<String>,
        pub tracking_number: Option<String>,
        pub estimated_delivery: Option<NaiveDateTime>,
        pub created_at: NaiveDateTime,
        pub updated_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for Order {
        type Error = CommerceError;

        fn try_from(model: Model) -> CommerceResult<Self> {
            Ok(Order {
                id: model.id,
                invoice_number: model.invoice_number,
                order_code: model.order_code,
                user: model.user_id,
                items: serde_json::from_value(model.items)?,
                offer: model.offer_id,
                offer_code: model.offer_code,
                discount_amount: money_from_f64(model.discount_amount)?,
                discount_type: parse_column("discount_type", &model.discount_type)?,
                subtotal_amount: money_from_f64(model.subtotal_amount)?,
                total_amount: money_from_f64(model.total_amount)?,
                status: parse_column("status", &model.status)?,
                delivery_type: parse_column("delivery_type", &model.delivery_type)?,
                shipping_address: model.shipping_address.map(serde_json::from_value).transpose()?,
                pickup_location: model.pickup_location.map(serde_json::from_value).transpose()?,
                payment_status: parse_column("payment_status", &model.payment_status)?,
                payment_method: model
                    .payment_method
                    .as_deref()
                    .map(|m| parse_column("payment_method", m))
                    .transpose()?,
                gateway_transaction_id: model.gateway_transaction_id,
                gateway_payment_id: model.gateway_payment_id,
                notes: model.notes,
                tracking_number: model.tracking_number,
                estimated_delivery: model.estimated_delivery.map(|d| d.and_utc()),
                created_at: model.created_at.and_utc(),
                updated_at: model.updated_at.and_utc(),
            })
        }
    }

    /// Row for a first save: identifiers assigned, lifecycle fields at their initial values.
    pub fn new_active_model(
        draft: &OrderDraft,
        identifiers: &OrderIdentifiers,
    ) -> CommerceResult<ActiveModel> {
        use sea_orm::{NotSet, Set};

        let shipping_address = draft.shipping_address.as_ref().map(serde_json::to_value).transpose()?;
        let pickup_location = draft.pickup_location.as_ref().map(serde_json::to_value).transpose()?;
        let created_at = draft.created_at.naive_utc();

        Ok(ActiveModel {
            id: NotSet,
            invoice_number: Set(Some(identifiers.invoice_number.clone())),
            order_code: Set(Some(identifiers.order_code.clone())),
            user_id: Set(draft.user),
            items: Set(serde_json::to_value(&draft.items)?),
            offer_id: Set(draft.offer),
            offer_code: Set(draft.offer_code.clone()),
            discount_amount: Set(money_to_f64(draft.discount_amount)),
            discount_type: Set(draft.discount_type.to_string()),
            subtotal_amount: Set(money_to_f64(draft.subtotal_amount)),
            total_amount: Set(money_to_f64(draft.total_amount)),
            status: Set(OrderStatus::Pending.to_string()),
            delivery_type: Set(draft.delivery_type.to_string()),
            shipping_address: Set(shipping_address),
            pickup_location: Set(pickup_location),
            payment_status: Set(PaymentStatus::Pending.to_string()),
            payment_method: Set(draft.payment_method.map(|m| m.to_string())),
            gateway_transaction_id: Set(None),
            gateway_payment_id: Set(None),
            notes: Set(draft.notes.clone()),
            tracking_number: Set(None),
            estimated_delivery: Set(None),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        })
    }
}

// Offers
pub mod offer {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "offers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub code: String,
        pub discount_type: String,
        pub discount_value: f64,
        pub min_order_amount: Option<f64>,
        pub max_discount_amount: Option<f64>,
        pub active: bool,
        pub starts_at: Option<NaiveDateTime>,
        pub ends_at: Option<NaiveDateTime>,
        pub created_at: NaiveDateTime,
        pub updated_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for Offer {
        type Error = CommerceError;

        fn try_from(model: Model) -> CommerceResult<Self> {
            Ok(Offer {
                id: model.id,
                code: model.code,
                discount_type: parse_column("discount_type", &model.discount_type)?,
                discount_value: money_from_f64(model.discount_value)?,
                min_order_amount: optional_money(model.min_order_amount)?,
                max_discount_amount: optional_money(model.max_discount_amount)?,
                active: model.active,
                starts_at: model.starts_at.map(|d| d.and_utc()),
                ends_at: model.ends_at.map(|d| d.and_utc()),
                created_at: model.created_at.and_utc(),
                updated_at: model.updated_at.and_utc(),
            })
        }
    }
}

// Named counters used for invoice numbering
pub mod sequence {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "sequences")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub name: String,
        pub value: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod session {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub token: String,
        pub user_id: i64,
        pub role: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for Session {
        type Error = CommerceError;

        fn try_from(model: Model) -> CommerceResult<Self> {
            Ok(Session {
                role: parse_column::<Role>("role", &model.role)?,
                token: model.token,
                user_id: model.user_id,
            })
        }
    }
}
