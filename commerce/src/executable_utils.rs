use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use clap::Parser;
use common::config::{BackendConfig, CheckoutConfig, Config};
use http::header;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Deserialize;
use serde_json::json;
use std::{error::Error, net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    catalog::CatalogService,
    checkout::{Checkout, CheckoutRequest},
    error::{CommerceError, CommerceResult},
    identifiers::IdentifierAllocator,
    model::{ModelId, Offer, OrderPayload, OrderStatus, Product, ProductFilter, Session},
    orders::{OrderService, PaymentUpdate, TrackingUpdate},
    storage::{CatalogStorage, OfferStorage, OrderStorage, SequenceStorage, SessionStorage},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "target/debug/config/total_config.yaml")]
    pub config: String,
}

/// Loads `.env` and the merged YAML config; `DATABASE_URL` wins over the configured URL.
pub fn load_config() -> Result<Config, Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::load(&args.config)?;
    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        config.common.database_url = database_url;
    }
    Ok(config)
}

/// `RUST_LOG` takes precedence over `level` when set.
pub fn initialize_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn initialize_executable() -> Result<Config, Box<dyn Error + Send + Sync>> {
    let config = load_config()?;
    initialize_tracing(&config.backend.log_level);
    tracing::info!(
        project = %config.common.project_name,
        "Loaded configuration"
    );
    Ok(config)
}

pub fn install_metrics_exporter(config: &BackendConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(address) = &config.metrics_address {
        let address: SocketAddr = address.parse()?;
        PrometheusBuilder::new().with_http_listener(address).install()?;
        tracing::info!("Serving metrics at {}", address);
    }
    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub checkout: Checkout,
    pub orders: OrderService,
    pub catalog: CatalogService,
    pub sessions: Arc<dyn SessionStorage>,
}

impl AppState {
    pub fn new<S>(storage: Arc<S>, config: &CheckoutConfig) -> Self
    where
        S: CatalogStorage + OfferStorage + OrderStorage + SequenceStorage + SessionStorage + 'static,
    {
        let catalog: Arc<dyn CatalogStorage> = storage.clone();
        let offers: Arc<dyn OfferStorage> = storage.clone();
        let orders: Arc<dyn OrderStorage> = storage.clone();
        let sequences: Arc<dyn SequenceStorage> = storage.clone();
        let identifiers = IdentifierAllocator::new(sequences, config.invoice_sequence.clone());

        Self {
            checkout: Checkout::new(catalog.clone(), offers.clone(), orders.clone(), identifiers, config),
            orders: OrderService::new(orders, catalog.clone()),
            catalog: CatalogService::new(catalog, offers),
            sessions: storage,
        }
    }
}

impl IntoResponse for CommerceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, Json(json!({ "success": false, "message": self.to_string() }))).into_response()
    }
}

type ApiResult = CommerceResult<(StatusCode, Json<serde_json::Value>)>;

/// Resolves the bearer token of the request to a session.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> CommerceResult<Session> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(CommerceError::Unauthenticated)?;

    state
        .sessions
        .resolve_session(token)
        .await?
        .ok_or(CommerceError::Unauthenticated)
}

async fn authenticate_admin(state: &AppState, headers: &HeaderMap) -> CommerceResult<Session> {
    let session = authenticate(state, headers).await?;
    if !session.is_admin() {
        return Err(CommerceError::Forbidden);
    }
    Ok(session)
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult {
    let products = state.catalog.list_products(&filter).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "count": products.len(), "products": products })),
    ))
}

pub async fn get_product(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult {
    let product = state.catalog.get_product(&code).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true, "product": product }))))
}

pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(product): Json<Product>,
) -> ApiResult {
    authenticate_admin(&state, &headers).await?;
    let id = state.catalog.save_product(&product).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

pub async fn create_offer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(offer): Json<Offer>,
) -> ApiResult {
    authenticate_admin(&state, &headers).await?;
    let id = state.catalog.save_offer(&offer).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

pub async fn place_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult {
    let session = authenticate(&state, &headers).await?;
    let order = state.checkout.place_order(session.user_id, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": OrderPayload::from(order) })),
    ))
}

pub async fn my_orders(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    let session = authenticate(&state, &headers).await?;
    let orders: Vec<OrderPayload> = state
        .orders
        .my_orders(&session)
        .await?
        .into_iter()
        .map(OrderPayload::from)
        .collect();
    tracing::debug!(user = session.user_id, count = orders.len(), "Serving order history");
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "count": orders.len(), "orders": orders })),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<ModelId>,
) -> ApiResult {
    let session = authenticate(&state, &headers).await?;
    let order = state.orders.get_order(&session, order_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "order": OrderPayload::from(order) })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<ModelId>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult {
    authenticate_admin(&state, &headers).await?;
    let order = state.orders.update_status(order_id, update.status).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "order": OrderPayload::from(order) })),
    ))
}

pub async fn update_order_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<ModelId>,
    Json(update): Json<PaymentUpdate>,
) -> ApiResult {
    authenticate_admin(&state, &headers).await?;
    let order = state.orders.record_payment(order_id, &update).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "order": OrderPayload::from(order) })),
    ))
}

pub async fn update_order_tracking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<ModelId>,
    Json(update): Json<TrackingUpdate>,
) -> ApiResult {
    authenticate_admin(&state, &headers).await?;
    let order = state.orders.set_tracking(order_id, &update).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "order": OrderPayload::from(order) })),
    ))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{code}", get(get_product))
        .route("/api/offers", post(create_offer))
        .route("/api/orders", post(place_order))
        .route("/api/orders/my-orders", get(my_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", patch(update_order_status))
        .route("/api/orders/{id}/payment", patch(update_order_payment))
        .route("/api/orders/{id}/tracking", patch(update_order_tracking))
        .with_state(state)
}

fn cors_layer(config: &BackendConfig) -> Result<CorsLayer, Box<dyn Error + Send + Sync>> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Ok(match &config.allowed_origin {
        Some(origin) => layer.allow_origin(origin.parse::<header::HeaderValue>()?),
        None => layer.allow_origin(Any),
    })
}

pub async fn run_backend(
    config: BackendConfig,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    tracing::info!("Starting backend service at {}", config.server_address);
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
