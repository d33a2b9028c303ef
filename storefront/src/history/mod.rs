use thiserror::Error;

pub mod api;
pub mod render;
pub mod view;

pub use api::{HttpOrdersApi, MyOrdersResponse, OrderSummary, OrdersApi};
pub use render::{BadgeTone, OrderCard, PriceFormatter, render_state};
pub use view::{ClientSession, OrderHistoryView, ViewState};

/// Shown when a failed fetch carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to load orders. Please try again.";
pub const UNREACHABLE_MESSAGE: &str = "Could not reach the server. Please try again.";
pub const TIMEOUT_MESSAGE: &str = "The server took too long to respond. Please try again.";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid orders url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),
}

impl HistoryError {
    /// Message the view shows for this failure.
    pub fn display_message(&self) -> String {
        let message = match self {
            HistoryError::Api { message, .. } | HistoryError::Rejected(message) => message.trim().to_string(),
            HistoryError::Http(err) if err.is_timeout() => TIMEOUT_MESSAGE.to_string(),
            HistoryError::Http(err) if err.is_connect() => UNREACHABLE_MESSAGE.to_string(),
            _ => String::new(),
        };
        if message.is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}
