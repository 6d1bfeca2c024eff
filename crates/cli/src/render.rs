//! Plain-text rendering of a cart summary.

use rocketshoes_core::CartSummary;

const TITLE_WIDTH: usize = 40;

pub fn render_notices(notices: &[&str]) -> Vec<String> {
    notices.iter().map(|notice| format!("! {notice}")).collect()
}

pub fn render_cart(summary: &CartSummary) -> String {
    if summary.lines.is_empty() {
        return "cart is empty".to_string();
    }

    let mut lines = vec![format!(
        "{:<6} {:<width$} {:>10} {:>5} {:>12}",
        "ID",
        "PRODUCT",
        "PRICE",
        "QTY",
        "SUBTOTAL",
        width = TITLE_WIDTH
    )];
    for line in &summary.lines {
        lines.push(format!(
            "{:<6} {:<width$} {:>10} {:>5} {:>12}",
            line.product_id.to_string(),
            truncate(&line.title, TITLE_WIDTH),
            format!("{:.2}", line.unit_price),
            line.amount,
            format!("{:.2}", line.subtotal),
            width = TITLE_WIDTH
        ));
    }
    lines.push(format!("TOTAL {:.2} ({} items)", summary.total, summary.item_count));
    lines.join("\n")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}
