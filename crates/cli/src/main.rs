//! Cartwheel CLI - browse the catalog, manage the cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Create the local store
//! cartwheel init
//!
//! # Browse and fill the cart
//! cartwheel catalog list --limit 20
//! cartwheel cart add 12
//!
//! # Sign in, price the cart and check out
//! cartwheel account login -e ana@example.com -p secret
//! cartwheel order quote --delivery-date 2024-06-01
//! cartwheel order place --address "1 Main St" --city Pune --postal-code 411001
//! ```
//!
//! # Commands
//!
//! - `init` - Create missing tables and report store contents
//! - `catalog` - List, search and show products
//! - `account` - Register, login, logout, profile
//! - `cart` - Add, increment, decrement, show, clear
//! - `order` - Quote, place, list, cancel
//!
//! Configuration comes from `CARTWHEEL_*` environment variables (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartwheel_shop::config::ShopConfig;
use cartwheel_shop::error::AppError;
use cartwheel_shop::lifetime::ScreenScope;
use cartwheel_shop::state::AppState;

mod commands;

use commands::account::AccountAction;
use commands::cart::CartAction;
use commands::catalog::CatalogAction;
use commands::orders::OrderAction;

#[derive(Parser)]
#[command(name = "cartwheel")]
#[command(author, version, about = "Cartwheel shop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local store and report its contents
    Init,
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage your account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Quote, place and manage orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel_shop=info,cartwheel_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = ShopConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        e.report();
        commands::alert(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ShopConfig) -> Result<(), AppError> {
    let scope = ScreenScope::new();
    let on_interrupt = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            on_interrupt.cancel();
        }
    });

    let state = scope.run(AppState::open(config)).await??;

    match cli.command {
        Commands::Init => commands::init::run(&state, &scope).await,
        Commands::Catalog { action } => commands::catalog::run(&state, &scope, action).await,
        Commands::Account { action } => commands::account::run(&state, &scope, action).await,
        Commands::Cart { action } => commands::cart::run(&state, &scope, action).await,
        Commands::Order { action } => commands::orders::run(&state, &scope, action).await,
    }
}
