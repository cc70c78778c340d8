//! Storefront demo.
//!
//! Loads the first feed page, then fills a cart from the product catalogue
//! and prints the totals.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin storefront
//! RUST_LOG=debug STOREFRONT_PAGE_SIZE=5 cargo run --bin storefront
//! ```

use std::time::Duration;
use storefront_cart::{Cart, CartProduct};
use storefront_client::{ClientConfig, FeedAction, FeedEnvironment, FeedReducer, FeedState, StorefrontApi};
use storefront_remote::ReqwestTransport;
use storefront_runtime::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    info!(api = %config.api_base_url, page_size = config.page_size, "=== Storefront ===");

    let transport = ReqwestTransport::with_timeout(config.request_timeout)?;
    let api = StorefrontApi::new(transport, config.clone());

    // Feed
    let feed = Store::new(
        FeedState::new(),
        FeedReducer::new(),
        FeedEnvironment::from_config(api.clone(), &config),
    );
    feed.send(FeedAction::LoadFirstPage)
        .await?
        .wait_with_timeout(config.request_timeout + Duration::from_secs(1))
        .await?;

    if let Some(error) = feed.state(|s| s.error.clone()).await {
        anyhow::bail!("feed failed: {error}");
    }
    let (shown, total) = feed.state(|s| (s.posts.len(), s.total)).await;
    info!(shown, total = ?total, "Feed loaded");
    for post in feed.state(|s| s.posts.iter().take(3).cloned().collect::<Vec<_>>()).await {
        info!(id = post.id, likes = post.reactions.likes, "  {}", post.title);
    }

    // Cart
    let products = api.products_page(0, 3).await?;
    let cart = Cart::new();
    for product in &products.products {
        cart.add_item(CartProduct::from(product)).await?;
        cart.add_item(CartProduct::from(product)).await?;
    }

    let snapshot = cart.snapshot().await;
    for item in snapshot.items() {
        info!(quantity = item.quantity, line_total = format!("{:.2}", item.line_total()), "  {}", item.title);
    }
    info!(
        items = snapshot.total_items(),
        total = format!("{:.2}", snapshot.total_price()),
        "Cart totals"
    );

    feed.shutdown(Duration::from_secs(5)).await?;
    cart.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
