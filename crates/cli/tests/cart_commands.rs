use std::fs;
use std::sync::Arc;

use clap::Parser;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

use rocketshoes_catalog::InMemoryCatalog;
use rocketshoes_cli::commands::cart::{apply, CartAction};
use rocketshoes_cli::{execute, Cli};
use rocketshoes_core::{CartManager, Product, ProductId, RecordingNotifier, DEFAULT_CART_KEY};
use rocketshoes_db::InMemoryKeyValueStore;

fn sneaker(id: u64, cents: i64) -> Product {
    Product {
        id: ProductId(id),
        title: format!("Tênis {id}"),
        price: Decimal::new(cents, 2),
        image: format!("https://rocketseat.test/tenis{id}.jpg"),
    }
}

async fn session(store: Arc<InMemoryKeyValueStore>) -> (CartManager, Arc<RecordingNotifier>) {
    let catalog = Arc::new(InMemoryCatalog::new([(sneaker(1, 17990), 5), (sneaker(2, 13990), 1)]));
    let notices = Arc::new(RecordingNotifier::default());
    let manager = CartManager::hydrate(DEFAULT_CART_KEY, catalog, store, notices.clone()).await;
    (manager, notices)
}

fn parse(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

#[tokio::test]
async fn add_reports_committed_cart() {
    let (manager, notices) = session(Arc::new(InMemoryKeyValueStore::default())).await;

    let result = apply(&manager, &notices, CartAction::Add(ProductId(1)), true).await;

    assert_eq!(result.exit_code, 0);
    let payload = parse(&result.output);
    assert_eq!(payload["command"], "add");
    assert_eq!(payload["status"], "committed");
    assert_eq!(payload["outcome"]["outcome"], "committed");
    assert_eq!(payload["cart"]["lines"][0]["amount"], 1);
    assert_eq!(payload["cart"]["item_count"], 1);
}

#[tokio::test]
async fn out_of_stock_add_is_rejected_with_notice() {
    let (manager, notices) = session(Arc::new(InMemoryKeyValueStore::default())).await;
    apply(&manager, &notices, CartAction::Add(ProductId(2)), true).await;

    let result = apply(&manager, &notices, CartAction::Add(ProductId(2)), true).await;

    assert_eq!(result.exit_code, 1);
    let payload = parse(&result.output);
    assert_eq!(payload["status"], "rejected");
    assert_eq!(payload["notices"][0], "Requested quantity is out of stock");
    assert_eq!(payload["cart"]["lines"][0]["amount"], 1);
}

#[tokio::test]
async fn decrement_at_one_is_skipped() {
    let (manager, notices) = session(Arc::new(InMemoryKeyValueStore::default())).await;
    apply(&manager, &notices, CartAction::Add(ProductId(1)), true).await;

    let result = apply(&manager, &notices, CartAction::Decrement(ProductId(1)), true).await;

    assert_eq!(result.exit_code, 0);
    let payload = parse(&result.output);
    assert_eq!(payload["status"], "skipped");
    assert_eq!(payload["outcome"]["reason"], "non_positive_amount");
    assert_eq!(payload["cart"]["lines"][0]["can_decrement"], false);
}

#[tokio::test]
async fn failing_store_reports_remove_failure_and_keeps_cart() {
    let store = Arc::new(InMemoryKeyValueStore::default());
    let (manager, notices) = session(store.clone()).await;
    apply(&manager, &notices, CartAction::Add(ProductId(1)), true).await;
    store.set_fail_writes(true);

    let result = apply(&manager, &notices, CartAction::Remove(ProductId(1)), true).await;

    assert_eq!(result.exit_code, 1);
    let payload = parse(&result.output);
    assert_eq!(payload["notices"][0], "Could not remove the product from the cart");
    assert_eq!(payload["cart"]["lines"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn text_output_lists_lines_and_total() {
    let (manager, notices) = session(Arc::new(InMemoryKeyValueStore::default())).await;
    apply(&manager, &notices, CartAction::Add(ProductId(1)), false).await;

    let result = apply(
        &manager,
        &notices,
        CartAction::Update { product_id: ProductId(1), amount: 3 },
        false,
    )
    .await;

    assert!(result.output.starts_with("update: committed"));
    assert!(result.output.contains("Tênis 1"));
    assert!(result.output.contains("TOTAL 539.70 (3 items)"));
}

#[tokio::test]
async fn corrupt_stored_cart_is_reported_once() {
    let store = Arc::new(InMemoryKeyValueStore::with_value(DEFAULT_CART_KEY, "not json"));
    let (manager, notices) = session(store).await;

    let first = parse(&apply(&manager, &notices, CartAction::Show, true).await.output);
    let second = parse(&apply(&manager, &notices, CartAction::Show, true).await.output);

    assert_eq!(first["notices"][0], "Your saved cart could not be restored and was reset");
    assert_eq!(second["notices"].as_array().map(Vec::len), Some(0));
    assert_eq!(first["cart"]["lines"].as_array().map(Vec::len), Some(0));
}

#[test]
fn show_and_migrate_run_against_configured_storage() {
    let dir = TempDir::new().expect("tempdir");
    let config_path = dir.path().join("rocketshoes.toml");
    let database = dir.path().join("cart.db");
    fs::write(
        &config_path,
        format!(
            "[storage]\nurl = \"sqlite://{}?mode=rwc\"\n\n[logging]\nlevel = \"warn\"\n",
            database.display()
        ),
    )
    .expect("write config");
    let config_arg = config_path.display().to_string();

    let migrate = execute(Cli::parse_from(["rocketshoes", "--config", &config_arg, "migrate"]));
    assert_eq!(migrate.exit_code, 0, "{}", migrate.output);
    assert_eq!(parse(&migrate.output)["status"], "ok");

    let show =
        execute(Cli::parse_from(["rocketshoes", "--config", &config_arg, "--json", "show"]));
    assert_eq!(show.exit_code, 0, "{}", show.output);
    let payload = parse(&show.output);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["cart"]["item_count"], 0);
}

#[test]
fn missing_config_file_fails_validation() {
    let dir = TempDir::new().expect("tempdir");
    let config_arg = dir.path().join("absent.toml").display().to_string();

    let result = execute(Cli::parse_from(["rocketshoes", "--config", &config_arg, "show"]));

    assert_eq!(result.exit_code, 2);
    assert_eq!(parse(&result.output)["error_class"], "config_validation");
}
