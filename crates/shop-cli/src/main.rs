//! # Quick-Cart Shop
//!
//! Interactive inventory, cart and checkout simulator.
//!
//! ## Usage
//!
//! ```bash
//! # Optional settings
//! export SHOP_CATALOG=config/products.toml
//! export SHOP_OPENING_BALANCE=6000
//! export SHOP_CURRENCY=EGP
//! export RUST_LOG=shop_core=debug
//!
//! # Run the shop
//! shop
//! ```

use chrono::Utc;
use shop_cli::{load_catalog, menu, AppConfig, ShopState};
use std::io::{self, Write};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // `.env` must be loaded before logging reads RUST_LOG and LOG_FORMAT
    let config = AppConfig::from_env()?;
    init_logging();

    print_banner();

    let catalog = load_catalog(&config, Utc::now())?;

    info!("Products loaded: {}", catalog.len());
    info!("Shipping policy: {:?}", config.shipping);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();

    let name = match config.customer_name.clone() {
        Some(name) => name,
        None => menu::prompt(&mut input, &mut out, "Enter your name: ")?
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Guest".to_string()),
    };

    let mut state = ShopState::new(config, catalog, name);
    writeln!(
        out,
        "Welcome, {}! Your balance is {}.",
        state.customer.name,
        state.config.price(state.customer.balance())
    )?;

    menu::run(&mut state, input, out, Utc::now)?;
    Ok(())
}

/// Logs go to stderr so they never interleave with the menu.
/// `LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}

fn print_banner() {
    println!(
        r#"
  🛒 Quick-Cart 🛒
  ━━━━━━━━━━━━━━━━━━━━━━━
  Inventory & checkout simulator
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
