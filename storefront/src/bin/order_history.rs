use std::error::Error;
use std::sync::Arc;

use commerce::executable_utils::{initialize_tracing, load_config};
use storefront::history::{
    ClientSession, HttpOrdersApi, OrderHistoryView, PriceFormatter, ViewState, render_state,
};

const TOKEN_VAR: &str = "STOREFRONT_TOKEN";
const USER_VAR: &str = "STOREFRONT_USER";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = load_config()?;
    initialize_tracing(&config.client.log_level);

    // Both must be set for the history to be fetched.
    let session = match (std::env::var(USER_VAR), std::env::var(TOKEN_VAR)) {
        (Ok(user), Ok(token)) => Some(ClientSession { user, token }),
        _ => None,
    };

    let api = Arc::new(HttpOrdersApi::new(&config.client)?);
    let view = OrderHistoryView::new(api, session);
    let prices = PriceFormatter::new(config.client.currency_symbol.clone());

    let state = view.activate().await;
    println!("{}", render_state(&state, &prices));
    if let ViewState::Failed(message) = state {
        tracing::error!(%message, "Order history unavailable");
        std::process::exit(1);
    }
    Ok(())
}
