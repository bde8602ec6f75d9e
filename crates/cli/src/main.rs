//! Record Shop CLI - storefront and POS counter from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (token is kept in the storage file)
//! shop-cli login -e ana@example.com -p hunter22
//!
//! # Browse and fill the cart
//! shop-cli catalog --category jazz --page 2
//! shop-cli cart add P1
//! shop-cli cart set P1 3
//!
//! # Place the order
//! shop-cli checkout --delivery envio --accept-terms
//!
//! # Ring up a counter sale (admin only)
//! shop-cli pos sell --item P1:2 --item P7 --payment efectivo
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `whoami` - session management
//! - `catalog` - list one page of products
//! - `cart` - show or change the cart
//! - `checkout` - submit the cart as an order
//! - `orders` - list your orders
//! - `pos sell` - reserve stock and record a counter sale

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use record_shop_core::{CategoryId, DeliveryType, PaymentMethod, ProductId};
use record_shop_storefront::config::ClientConfig;
use record_shop_storefront::error::ClientError;
use record_shop_storefront::state::ShopState;

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Record shop storefront and POS tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create a customer account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the logged-in user
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List one page of the catalog
    Catalog {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Category filter (remembered for next time)
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Forget the remembered category filter
        #[arg(long, conflicts_with = "category")]
        all_categories: bool,

        /// Search product names
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout {
        /// Delivery type (`retiro` or `envio`)
        #[arg(short, long, default_value = "retiro")]
        delivery: DeliveryType,

        /// Accept the terms and conditions
        #[arg(long)]
        accept_terms: bool,
    },
    /// List your orders
    Orders,
    /// Point-of-sale counter (admin only)
    Pos {
        #[command(subcommand)]
        action: PosAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and subtotal
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        id: ProductId,
    },
    /// Set the quantity of a product already in the cart (0 removes it)
    Set {
        /// Product id
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum PosAction {
    /// Reserve items from a catalog page and record the sale
    Sell {
        /// Item to sell as `ID` or `ID:QUANTITY` (repeatable)
        #[arg(short, long = "item", required = true, value_parser = commands::pos::parse_item)]
        items: Vec<(ProductId, u32)>,

        /// Payment method (`efectivo`, `tarjeta`, `transferencia`)
        #[arg(long)]
        payment: PaymentMethod,

        /// Catalog page holding the items
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Category filter for the catalog page
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Search filter for the catalog page
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber with `EnvFilter` and the Sentry layer.
fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "record_shop_storefront=info,shop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match ShopState::open(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        e.report();
        tracing::error!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, state: &ShopState) -> Result<(), ClientError> {
    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(state, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            commands::auth::register(state, name, email, password, &confirm_password).await?;
        }
        Commands::Logout => commands::auth::logout(state)?,
        Commands::Whoami => commands::auth::whoami(state),
        Commands::Catalog {
            page,
            category,
            all_categories,
            search,
        } => {
            commands::catalog::list(state, page, category, all_categories, search).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state).await,
            CartAction::Add { id } => commands::cart::add(state, &id).await?,
            CartAction::Set { id, quantity } => commands::cart::set(state, &id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(state, &id).await?,
            CartAction::Clear => commands::cart::clear(state).await?,
        },
        Commands::Checkout {
            delivery,
            accept_terms,
        } => commands::orders::checkout(state, delivery, accept_terms).await?,
        Commands::Orders => commands::orders::list(state).await?,
        Commands::Pos { action } => match action {
            PosAction::Sell {
                items,
                payment,
                page,
                category,
                search,
            } => {
                commands::pos::sell(state, &items, payment, page, category, search).await?;
            }
        },
    }
    Ok(())
}
