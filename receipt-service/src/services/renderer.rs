//! Receipt HTML layout.

use askama::Template;
use receipt_form::totals::format_amount;
use receipt_form::{PaymentStatus, ReceiptRecord};
use rust_decimal::Decimal;
use service_core::error::AppError;

pub struct LineView {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Template)]
#[template(path = "receipt.html")]
pub struct ReceiptTemplate<'a> {
    pub record: &'a ReceiptRecord,
    pub symbol: &'a str,
    pub issue_date: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub lines: Vec<LineView>,
    pub subtotal: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub discount: String,
    pub grand_total: String,
    pub show_tax: bool,
    pub show_discount: bool,
    pub qr_code: &'a str,
    pub logo: Option<&'a str>,
    pub signature: Option<&'a str>,
}

fn status_class(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "status-paid",
        PaymentStatus::Pending => "status-pending",
        PaymentStatus::Unpaid => "status-unpaid",
    }
}

/// Quantities drop trailing zeros (`2`, `1.5`); money always has two decimals.
fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Render the receipt page. Totals are taken from the record as given.
pub fn render_receipt_html(
    record: &ReceiptRecord,
    qr_code: &str,
    logo: Option<&str>,
) -> Result<String, AppError> {
    let lines = record
        .items
        .iter()
        .map(|item| LineView {
            name: item.name.clone(),
            quantity: format_quantity(item.quantity),
            unit_price: format_amount(item.unit_price),
            line_total: item.line_total().map(format_amount).unwrap_or_default(),
        })
        .collect();

    let template = ReceiptTemplate {
        record,
        symbol: &record.currency.symbol,
        issue_date: record.issue_date.format("%B %-d, %Y").to_string(),
        status_label: record.payment_status.label(),
        status_class: status_class(record.payment_status),
        lines,
        subtotal: format_amount(record.subtotal),
        tax_rate: format_quantity(record.tax_rate),
        tax_amount: format_amount(record.tax_amount),
        discount: format_amount(record.discount),
        grand_total: format_amount(record.grand_total),
        show_tax: !record.tax_rate.is_zero(),
        show_discount: !record.discount.is_zero(),
        qr_code,
        logo,
        signature: record.signature.as_deref(),
    };

    template.render().map_err(|e| {
        AppError::RenderError(anyhow::anyhow!("Failed to render receipt template: {}", e))
    })
}
