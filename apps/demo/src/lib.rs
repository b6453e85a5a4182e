//! # Cart Demo
//!
//! Plays the product panel walkthrough against a configured [`CartStore`].
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Demo Run Sequence                              │
//! │                                                                         │
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,cart_store=debug,cart_demo=debug                    │
//! │                                                                         │
//! │  2. Load StoreConfig (cart.toml, then CART_* env vars)                  │
//! │                                                                         │
//! │  3. Open the store and hydrate it (sync or async backend)               │
//! │                                                                         │
//! │  4. Render the panel before mount (placeholder) and after mount         │
//! │                                                                         │
//! │  5. Press the scripted buttons, flush pending writes                    │
//! │                                                                         │
//! │  6. Render the final panel and the floating cart button                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With a file backend the cart carries over between runs.

pub mod error;
pub mod panel;

use std::path::PathBuf;

use cart_store::{CartStore, SsrGate, StoreConfig};
use tracing::{debug, info};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use error::{DemoError, DemoResult};
use panel::{apply, catalog, floating_button, render_panel, script, Action, Product};

/// Loads configuration and plays the demo, printing the rendered panels.
pub async fn run(config_path: Option<PathBuf>) -> DemoResult<()> {
    info!("Starting cart demo");

    let config = StoreConfig::load(config_path)?;
    for line in run_with_config(config).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Plays the demo against a store built from `config`.
pub async fn run_with_config(config: StoreConfig) -> DemoResult<Vec<String>> {
    let store = CartStore::open(config.into_options()?).await;
    play(&store, &catalog(), &script()).await
}

/// Renders, presses every action, and renders again.
pub async fn play(
    store: &CartStore,
    products: &[Product],
    actions: &[Action],
) -> DemoResult<Vec<String>> {
    let subscription = store.subscribe(|next, prev| {
        debug!(
            items_before = prev.cart_items.len(),
            items_after = next.cart_items.len(),
            is_cart_open = next.is_cart_open,
            "Cart changed"
        );
    });

    let mut gate = SsrGate::new();
    let mut lines = vec!["== first render ==".to_string()];
    lines.extend(render_panel(store, &gate, products));

    gate.mount();
    lines.push("== after mount ==".to_string());
    lines.extend(render_panel(store, &gate, products));

    for action in actions {
        apply(store, products, *action)?;
    }
    store.flush().await?;
    store.unsubscribe(subscription);

    if let Some(e) = store.take_write_error() {
        return Err(e.into());
    }

    let totals = store.totals();
    info!(
        items = totals.item_count,
        quantity = totals.total_quantity,
        subtotal = totals.subtotal,
        "Demo script finished"
    );

    lines.push("== after script ==".to_string());
    lines.extend(render_panel(store, &gate, products));
    lines.push(
        floating_button(store, &gate).unwrap_or_else(|| "(cart button hidden)".to_string()),
    );
    Ok(lines)
}

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,cart_store=debug,cart_demo=debug";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cart_store=trace` - Show trace for the store only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    subscriber(filter).init();
}

fn subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(filter).finish()
}
