use rocketshoes_core::config::AppConfig;
use rocketshoes_core::{
    CartManager, CartSummary, MutationOutcome, Notice, ProductId, RecordingNotifier,
    UpdateProductAmount,
};
use serde::Serialize;

use crate::bootstrap::bootstrap;
use crate::commands::{serialize_payload, CommandResult};
use crate::render;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartAction {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update { product_id: ProductId, amount: i64 },
    Increment(ProductId),
    Decrement(ProductId),
}

impl CartAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Update { .. } => "update",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
        }
    }
}

#[derive(Debug, Serialize)]
struct CartReport {
    command: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<MutationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    notices: Vec<&'static str>,
    cart: CartSummary,
}

pub async fn run(config: &AppConfig, action: CartAction, json: bool) -> CommandResult {
    let session = match bootstrap(config).await {
        Ok(session) => session,
        Err(error) => {
            return CommandResult::failure(
                action.name(),
                error.error_class(),
                error.to_string(),
                error.exit_code(),
            );
        }
    };

    let result = apply(&session.manager, &session.notices, action, json).await;
    session.db_pool.close().await;
    result
}

/// Runs one action against `manager` and renders the resulting cart
/// together with every notice raised since the last call.
pub async fn apply(
    manager: &CartManager,
    notices: &RecordingNotifier,
    action: CartAction,
    json: bool,
) -> CommandResult {
    let result = match action {
        CartAction::Show => None,
        CartAction::Add(product_id) => Some(manager.add_product(product_id).await),
        CartAction::Remove(product_id) => Some(manager.remove_product(product_id).await),
        CartAction::Update { product_id, amount } => Some(
            manager.update_product_amount(UpdateProductAmount { product_id, amount }).await,
        ),
        CartAction::Increment(product_id) => Some(manager.increment_product(product_id).await),
        CartAction::Decrement(product_id) => Some(manager.decrement_product(product_id).await),
    };

    let (status, outcome, error, exit_code) = match result {
        None => ("ok", None, None, 0),
        Some(Ok(outcome)) if outcome.is_committed() => ("committed", Some(outcome), None, 0),
        Some(Ok(outcome)) => ("skipped", Some(outcome), None, 0),
        Some(Err(error)) => ("rejected", None, Some(error.to_string()), 1),
    };

    let report = CartReport {
        command: action.name(),
        status,
        outcome,
        error,
        notices: notices.take().iter().map(Notice::user_message).collect(),
        cart: manager.summary(),
    };

    let output = if json {
        serialize_payload(&report)
    } else {
        let mut lines = vec![format!("{}: {}", report.command, report.status)];
        lines.extend(render::render_notices(&report.notices));
        lines.push(render::render_cart(&report.cart));
        lines.join("\n")
    };

    CommandResult { exit_code, output }
}
