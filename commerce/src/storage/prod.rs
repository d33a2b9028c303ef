use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Schema, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info};

use crate::error::{CommerceError, CommerceResult};
use crate::model::offer::normalize_code;
use crate::model::sea_orm_storage_model as entities;
use crate::model::{
    GenericError, ModelId, Offer, Order, OrderDraft, OrderIdentifiers, OrderStatus, PaymentStatus,
    PaymentUpdate, Product, ProductFilter, Session, TrackingUpdate,
};
use crate::pricing::money_to_f64;
use crate::storage::{CatalogStorage, OfferStorage, OrderStorage, SequenceStorage, SessionStorage};

/// SeaORM-backed storage for every storefront record.
#[derive(Clone)]
pub struct ProdStorage {
    pub db: DatabaseConnection,
}

impl ProdStorage {
    pub async fn new(database_url: &str) -> Result<Self, GenericError> {
        Self::with_options(ConnectOptions::new(database_url)).await
    }

    pub async fn with_options(options: ConnectOptions) -> Result<Self, GenericError> {
        let db = Database::connect(options).await?;
        Ok(Self { db })
    }

    /// Creates missing tables and indexes from the entity definitions.
    pub async fn ensure_schema(&self) -> Result<(), GenericError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let tables = [
            schema.create_table_from_entity(entities::product::Entity),
            schema.create_table_from_entity(entities::order::Entity),
            schema.create_table_from_entity(entities::offer::Entity),
            schema.create_table_from_entity(entities::sequence::Entity),
            schema.create_table_from_entity(entities::session::Entity),
        ];
        for mut table in tables {
            table.if_not_exists();
            self.db.execute(backend.build(&table)).await?;
        }

        let indexes = schema
            .create_index_from_entity(entities::product::Entity)
            .into_iter()
            .chain(schema.create_index_from_entity(entities::order::Entity));
        for mut index in indexes {
            index.if_not_exists();
            self.db.execute(backend.build(&index)).await?;
        }

        info!("Storage schema is up to date");
        Ok(())
    }
}

fn into_domain<M, T>(models: Vec<M>) -> CommerceResult<Vec<T>>
where
    T: TryFrom<M, Error = CommerceError>,
{
    models.into_iter().map(T::try_from).collect()
}

fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Some(message),
        _ => None,
    }
}

#[async_trait]
impl CatalogStorage for ProdStorage {
    async fn save_product(&self, product: &Product) -> CommerceResult<ModelId> {
        product.validate()?;

        let code = product.code.trim();
        let existing = entities::product::Entity::find()
            .filter(entities::product::Column::Code.eq(code))
            .one(&self.db)
            .await?;

        let mut model = entities::product::active_model(product)?;
        model.updated_at = Set(Utc::now().naive_utc());
        let id = match existing {
            Some(row) => {
                model.id = Set(row.id);
                model.created_at = Set(row.created_at);
                model.update(&self.db).await?.id
            }
            None => model.insert(&self.db).await?.id,
        };
        debug!(product_id = id, code, "Saved product");
        Ok(id)
    }

    async fn get_product(&self, code: &str) -> CommerceResult<Option<Product>> {
        entities::product::Entity::find()
            .filter(entities::product::Column::Code.eq(code.trim()))
            .one(&self.db)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn list_products(&self, filter: &ProductFilter) -> CommerceResult<Vec<Product>> {
        let mut query = entities::product::Entity::find();
        if let Some(category) = &filter.category {
            query = query.filter(entities::product::Column::Category.eq(category.as_str()));
        }
        if let Some(brand) = &filter.brand {
            query = query.filter(entities::product::Column::Brand.eq(brand.as_str()));
        }
        let models = query
            .order_by_asc(entities::product::Column::Name)
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn get_products_by_ids(&self, ids: &[ModelId]) -> CommerceResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = entities::product::Entity::find()
            .filter(entities::product::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn reserve_stock(&self, product_id: ModelId, units: u32) -> CommerceResult<bool> {
        let units = i64::from(units);
        let result = entities::product::Entity::update_many()
            .col_expr(
                entities::product::Column::Stock,
                Expr::col(entities::product::Column::Stock).sub(units),
            )
            .filter(entities::product::Column::Id.eq(product_id))
            .filter(entities::product::Column::Stock.gte(units))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn release_stock(&self, product_id: ModelId, units: u32) -> CommerceResult<()> {
        entities::product::Entity::update_many()
            .col_expr(
                entities::product::Column::Stock,
                Expr::col(entities::product::Column::Stock).add(i64::from(units)),
            )
            .filter(entities::product::Column::Id.eq(product_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OfferStorage for ProdStorage {
    async fn save_offer(&self, offer: &Offer) -> CommerceResult<ModelId> {
        offer.validate()?;

        let code = normalize_code(&offer.code);
        let now = Utc::now().naive_utc();
        let existing = entities::offer::Entity::find()
            .filter(entities::offer::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await?;

        let mut model = entities::offer::ActiveModel {
            code: Set(code),
            discount_type: Set(offer.discount_type.to_string()),
            discount_value: Set(money_to_f64(offer.discount_value)),
            min_order_amount: Set(offer.min_order_amount.map(money_to_f64)),
            max_discount_amount: Set(offer.max_discount_amount.map(money_to_f64)),
            active: Set(offer.active),
            starts_at: Set(offer.starts_at.map(|d| d.naive_utc())),
            ends_at: Set(offer.ends_at.map(|d| d.naive_utc())),
            created_at: Set(offer.created_at.naive_utc()),
            updated_at: Set(now),
            ..Default::default()
        };
        let id = match existing {
            Some(row) => {
                model.id = Set(row.id);
                model.created_at = Set(row.created_at);
                model.update(&self.db).await?.id
            }
            None => model.insert(&self.db).await?.id,
        };
        Ok(id)
    }

    async fn get_offer_by_code(&self, code: &str) -> CommerceResult<Option<Offer>> {
        entities::offer::Entity::find()
            .filter(entities::offer::Column::Code.eq(normalize_code(code)))
            .one(&self.db)
            .await?
            .map(Offer::try_from)
            .transpose()
    }
}

#[async_trait]
impl SequenceStorage for ProdStorage {
    async fn next_value(&self, name: &str) -> CommerceResult<i64> {
        use entities::sequence::{ActiveModel, Column, Entity};

        let txn = self.db.begin().await?;
        Entity::insert(ActiveModel {
            name: Set(name.to_string()),
            value: Set(0),
        })
        .on_conflict(OnConflict::column(Column::Name).do_nothing().to_owned())
        .exec_without_returning(&txn)
        .await?;

        // The update takes the row lock, so concurrent callers are serialized here.
        Entity::update_many()
            .col_expr(Column::Value, Expr::col(Column::Value).add(1))
            .filter(Column::Name.eq(name))
            .exec(&txn)
            .await?;
        let row = Entity::find_by_id(name.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| CommerceError::Storage(format!("sequence {} vanished", name)))?;
        txn.commit().await?;
        Ok(row.value)
    }
}

#[async_trait]
impl OrderStorage for ProdStorage {
    async fn insert_order(
        &self,
        draft: &OrderDraft,
        identifiers: &OrderIdentifiers,
    ) -> CommerceResult<Order> {
        let model = entities::order::new_active_model(draft, identifiers)?;
        match model.insert(&self.db).await {
            Ok(saved) => Order::try_from(saved),
            Err(err) => match unique_violation(&err) {
                Some(message) => {
                    debug!(
                        invoice_number = %identifiers.invoice_number,
                        order_code = %identifiers.order_code,
                        "Order identifier already taken: {}", message
                    );
                    Err(CommerceError::DuplicateIdentifier(message))
                }
                None => Err(err.into()),
            },
        }
    }

    async fn get_order(&self, order_id: ModelId) -> CommerceResult<Option<Order>> {
        entities::order::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn orders_for_user(&self, user: ModelId) -> CommerceResult<Vec<Order>> {
        let models = entities::order::Entity::find()
            .filter(entities::order::Column::UserId.eq(user))
            .order_by_desc(entities::order::Column::CreatedAt)
            .order_by_desc(entities::order::Column::Id)
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn transition_status(
        &self,
        order_id: ModelId,
        from: OrderStatus,
        to: OrderStatus,
        at: DateTime<Utc>,
    ) -> CommerceResult<bool> {
        use entities::order::{Column, Entity};

        let result = Entity::update_many()
            .col_expr(Column::Status, Expr::value(to.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(at.naive_utc()))
            .filter(Column::Id.eq(order_id))
            .filter(Column::Status.eq(from.to_string()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn transition_payment(
        &self,
        order_id: ModelId,
        from: PaymentStatus,
        update: &PaymentUpdate,
        at: DateTime<Utc>,
    ) -> CommerceResult<bool> {
        use entities::order::{Column, Entity};

        let mut query = Entity::update_many()
            .col_expr(Column::PaymentStatus, Expr::value(update.payment_status.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(at.naive_utc()));
        if let Some(transaction_id) = &update.gateway_transaction_id {
            query = query.col_expr(Column::GatewayTransactionId, Expr::value(transaction_id.clone()));
        }
        if let Some(payment_id) = &update.gateway_payment_id {
            query = query.col_expr(Column::GatewayPaymentId, Expr::value(payment_id.clone()));
        }
        let result = query
            .filter(Column::Id.eq(order_id))
            .filter(Column::PaymentStatus.eq(from.to_string()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn update_tracking(
        &self,
        order_id: ModelId,
        update: &TrackingUpdate,
        at: DateTime<Utc>,
    ) -> CommerceResult<bool> {
        use entities::order::{Column, Entity};

        let mut query = Entity::update_many().col_expr(Column::UpdatedAt, Expr::value(at.naive_utc()));
        if let Some(tracking_number) = &update.tracking_number {
            query = query.col_expr(Column::TrackingNumber, Expr::value(tracking_number.clone()));
        }
        if let Some(estimated_delivery) = update.estimated_delivery {
            query = query.col_expr(Column::EstimatedDelivery, Expr::value(estimated_delivery.naive_utc()));
        }
        let result = query.filter(Column::Id.eq(order_id)).exec(&self.db).await?;
        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl SessionStorage for ProdStorage {
    async fn resolve_session(&self, token: &str) -> CommerceResult<Option<Session>> {
        entities::session::Entity::find_by_id(token.to_string())
            .one(&self.db)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn save_session(&self, session: &Session) -> CommerceResult<()> {
        use entities::session::{ActiveModel, Column, Entity};

        Entity::insert(ActiveModel {
            token: Set(session.token.clone()),
            user_id: Set(session.user_id),
            role: Set(session.role.to_string()),
        })
        .on_conflict(
            OnConflict::column(Column::Token)
                .update_columns([Column::UserId, Column::Role])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;
        Ok(())
    }
}
