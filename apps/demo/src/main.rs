//! # Cart Demo Entry Point
//!
//! ```text
//! cart-demo [CONFIG_PATH]
//!
//!   CONFIG_PATH   cart.toml to load (platform config dir by default)
//!   RUST_LOG      log filter (default: info,cart_store=debug,cart_demo=debug)
//!   CART_*        store overrides, see cart_store::config
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cart_demo::init_tracing();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    match cart_demo::run(config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Cart demo failed");
            ExitCode::FAILURE
        }
    }
}
