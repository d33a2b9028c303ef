use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::RwLock;

use super::api::{OrderSummary, OrdersApi};

/// The signed-in customer, as the client knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub user: String,
    pub token: String,
}

impl ClientSession {
    fn is_complete(&self) -> bool {
        !self.user.trim().is_empty() && !self.token.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    LoginRequired,
    Loading,
    Empty,
    Loaded(Vec<OrderSummary>),
    /// User-facing message; the view offers a retry.
    Failed(String),
}

/// Clears the in-flight flag when the fetch finishes or is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Order history page state, driven by activation and retry.
pub struct OrderHistoryView {
    api: Arc<dyn OrdersApi>,
    session: Option<ClientSession>,
    state: RwLock<ViewState>,
    loading: AtomicBool,
}

impl OrderHistoryView {
    pub fn new(api: Arc<dyn OrdersApi>, session: Option<ClientSession>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(ViewState::Loading),
            loading: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn activate(&self) -> ViewState {
        self.fetch().await
    }

    /// Re-issues the fetch after a failure.
    pub async fn retry(&self) -> ViewState {
        self.fetch().await
    }

    async fn fetch(&self) -> ViewState {
        let Some(session) = self.session.as_ref().filter(|session| session.is_complete()) else {
            return self.set_state(ViewState::LoginRequired).await;
        };

        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Order history fetch already in flight");
            return self.state().await;
        }
        let _loading = LoadingGuard(&self.loading);

        self.set_state(ViewState::Loading).await;
        let next = match self.api.my_orders(&session.token).await {
            Ok(response) if response.orders.is_empty() => ViewState::Empty,
            Ok(response) => {
                tracing::debug!(user = %session.user, count = response.orders.len(), "Loaded order history");
                ViewState::Loaded(response.orders)
            }
            Err(err) => {
                tracing::warn!(user = %session.user, error = %err, "Failed to load order history");
                ViewState::Failed(err.display_message())
            }
        };
        self.set_state(next).await
    }

    async fn set_state(&self, next: ViewState) -> ViewState {
        let mut state = self.state.write().await;
        *state = next;
        state.clone()
    }
}
