//! Bazaar CLI - browse the catalog, shop and manage the store from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products under $50, cheapest first
//! bazaar products --price 0-50 --sort price-low
//!
//! # Show one product
//! bazaar product 3
//!
//! # Interactive session with a cart and wishlist
//! bazaar shop
//!
//! # Admin panel
//! bazaar admin -e admin@example.com products
//! ```
//!
//! # Commands
//!
//! - `products` - List products with filtering and sorting
//! - `product` - Show a product
//! - `categories` - List categories
//! - `shop` - Interactive shopping session
//! - `admin` - Manage products and users (admin account only)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use bazaar_core::{PriceBracket, SortKey};
use bazaar_storefront::AppState;
use bazaar_storefront::config::StorefrontConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products in this category (`all` for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// Price bracket (`all`, `0-50`, `50-100`, `100-200`, `200+`)
        #[arg(short, long, default_value = "all")]
        price: PriceBracket,

        /// Sort order (`featured`, `price-low`, `price-high`, `newest`)
        #[arg(short, long, default_value = "featured")]
        sort: SortKey,
    },
    /// Show a product
    Product {
        /// Product id
        id: String,
    },
    /// List categories
    Categories,
    /// Start an interactive shopping session
    Shop,
    /// Manage products and users
    Admin {
        /// Admin account email
        #[arg(short, long)]
        email: String,

        /// Admin account password (default: `BAZAAR_ADMIN_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List products grouped by category
    Products,
    /// Add a product
    AddProduct {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Replace a product's fields
    UpdateProduct {
        /// Product document id
        id: String,

        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product
    DeleteProduct {
        /// Product document id
        id: String,
    },
    /// List users
    Users,
    /// Create or update a user
    SaveUser {
        /// User email (document key)
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short = 'n', long, default_value = "")]
        display_name: String,

        /// Image file to store as the user's photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Delete a user
    DeleteUser {
        /// User email
        email: String,
    },
}

#[derive(clap::Args)]
struct ProductArgs {
    #[arg(short, long)]
    title: String,

    /// Price, e.g. `19.99`
    #[arg(short, long)]
    price: String,

    /// Image URL
    #[arg(short, long, default_value = "")]
    image: String,

    #[arg(short, long, default_value = "")]
    description: String,

    /// Category (default: `Uncategorized`)
    #[arg(short, long, default_value = "")]
    category: String,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            commands::print_error(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = AppState::new(config);

    if let Err(e) = run(cli, &state).await {
        e.report();
        commands::print_error(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, state: &AppState) -> bazaar_storefront::error::Result<()> {
    match cli.command {
        Commands::Products {
            category,
            price,
            sort,
        } => commands::browse::products(state, category.as_deref(), price, sort).await,
        Commands::Product { id } => commands::browse::product(state, &id).await,
        Commands::Categories => commands::browse::categories(state).await,
        Commands::Shop => commands::shop::run(state).await,
        Commands::Admin {
            email,
            password,
            action,
        } => {
            let password = password
                .or_else(|| std::env::var("BAZAAR_ADMIN_PASSWORD").ok())
                .ok_or_else(|| {
                    bazaar_storefront::AppError::BadRequest(
                        "--password or BAZAAR_ADMIN_PASSWORD is required".to_string(),
                    )
                })?;
            let session = commands::admin::sign_in(state, &email, password).await?;

            match action {
                AdminAction::Products => commands::admin::list_products(state, &session).await,
                AdminAction::AddProduct { product } => {
                    commands::admin::add_product(state, &session, product.into()).await
                }
                AdminAction::UpdateProduct { id, product } => {
                    commands::admin::update_product(state, &session, &id, product.into()).await
                }
                AdminAction::DeleteProduct { id } => {
                    commands::admin::delete_product(state, &session, &id).await
                }
                AdminAction::Users => commands::admin::list_users(state, &session).await,
                AdminAction::SaveUser {
                    email,
                    display_name,
                    photo,
                } => {
                    commands::admin::save_user(state, &session, email, display_name, photo.as_deref())
                        .await
                }
                AdminAction::DeleteUser { email } => {
                    commands::admin::delete_user(state, &session, &email).await
                }
            }
        }
    }
}

impl From<ProductArgs> for bazaar_core::forms::ProductDraft {
    fn from(args: ProductArgs) -> Self {
        Self {
            title: args.title,
            price: args.price,
            image: args.image,
            description: args.description,
            category: args.category,
        }
    }
}
