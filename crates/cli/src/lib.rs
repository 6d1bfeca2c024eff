pub mod bootstrap;
pub mod commands;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rocketshoes_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use rocketshoes_core::ProductId;

use crate::commands::cart::CartAction;
use crate::commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "rocketshoes",
    about = "RocketShoes cart front end",
    long_about = "Inspect and change the locally persisted shopping cart. Every change is checked against the catalog's stock before it is saved.",
    after_help = "Examples:\n  rocketshoes show\n  rocketshoes add 3\n  rocketshoes update 3 2 --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a rocketshoes.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the sqlite URL holding the cart")]
    storage_url: Option<String>,
    #[arg(long, global = true, help = "Override the catalog API base URL")]
    catalog_url: Option<String>,
    #[arg(long, global = true, help = "Emit machine-readable JSON output")]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Print the cart with line subtotals and the grand total")]
    Show,
    #[command(about = "Add one unit of a product, inserting it when absent")]
    Add { product_id: u64 },
    #[command(about = "Remove a product from the cart")]
    Remove { product_id: u64 },
    #[command(about = "Set the quantity of a product already in the cart")]
    Update {
        product_id: u64,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    #[command(about = "Raise the quantity of a cart entry by one")]
    Increment { product_id: u64 },
    #[command(about = "Lower the quantity of a cart entry by one")]
    Decrement { product_id: u64 },
    #[command(about = "Apply pending storage migrations")]
    Migrate,
}

impl Command {
    fn cart_action(&self) -> Option<CartAction> {
        match *self {
            Self::Show => Some(CartAction::Show),
            Self::Add { product_id } => Some(CartAction::Add(ProductId(product_id))),
            Self::Remove { product_id } => Some(CartAction::Remove(ProductId(product_id))),
            Self::Update { product_id, amount } => {
                Some(CartAction::Update { product_id: ProductId(product_id), amount })
            }
            Self::Increment { product_id } => Some(CartAction::Increment(ProductId(product_id))),
            Self::Decrement { product_id } => Some(CartAction::Decrement(ProductId(product_id))),
            Self::Migrate => None,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let result = execute(cli);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub fn execute(cli: Cli) -> CommandResult {
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        overrides: ConfigOverrides {
            storage_url: cli.storage_url,
            catalog_base_url: cli.catalog_url,
            ..ConfigOverrides::default()
        },
    };

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "runtime",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match cli.command.cart_action() {
        Some(action) => runtime.block_on(commands::cart::run(&config, action, cli.json)),
        None => runtime.block_on(commands::migrate::run(&config)),
    }
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
