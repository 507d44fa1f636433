//! Receipt data model shared by the form and the document service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::totals::{compute_totals, Totals, TotalsError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Unpaid => "unpaid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Currency {
    #[validate(length(min = 1, message = "currency code is required"))]
    pub code: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            code: "USD".to_string(),
            symbol: "$".to_string(),
            name: "US Dollar".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, Validate)]
pub struct BusinessProfile {
    #[validate(length(min = 1, message = "business name is required"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Name of a previously uploaded logo in server storage. An empty name
    /// means no logo and is read as `None`.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub logo_filename: Option<String>,
}

impl BusinessProfile {
    /// Collapse `Some("")` logo names to `None`.
    pub fn normalized(mut self) -> Self {
        self.logo_filename = self.logo_filename.filter(|name| !name.trim().is_empty());
        self
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|name| !name.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, Validate)]
pub struct ClientProfile {
    #[validate(length(min = 1, message = "client name is required"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct LineItem {
    #[validate(length(min = 1, message = "item description is required"))]
    pub name: String,
    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
}

impl LineItem {
    /// `None` when the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ReceiptRecord {
    #[validate(length(min = 1, message = "receipt id is required"))]
    pub receipt_id: String,
    pub issue_date: NaiveDate,
    #[validate(nested)]
    pub currency: Currency,
    #[validate(custom(function = "non_negative"))]
    #[serde(default)]
    pub tax_rate: Decimal,
    #[validate(custom(function = "non_negative"))]
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: String,
    #[validate(nested)]
    pub business: BusinessProfile,
    #[validate(nested)]
    pub client: ClientProfile,
    #[validate(length(min = 1, message = "at least one line item is required"), nested)]
    pub items: Vec<LineItem>,
    /// Signature image as a `data:image/...` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub grand_total: Decimal,
}

impl ReceiptRecord {
    /// Totals derived from the record's own items and rates.
    pub fn computed_totals(&self) -> Result<Totals, TotalsError> {
        compute_totals(&self.items, self.tax_rate, self.discount)
    }

    /// Overwrite the carried totals with freshly computed ones.
    ///
    /// Returns `true` when the carried values disagreed with the items.
    pub fn reconcile_totals(&mut self) -> Result<bool, TotalsError> {
        let totals = self.computed_totals()?;
        let mismatch = totals.subtotal != self.subtotal
            || totals.tax_amount != self.tax_amount
            || totals.grand_total != self.grand_total;
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.grand_total = totals.grand_total;
        Ok(mismatch)
    }
}

/// Entry of the locally kept receipt history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptSummary {
    pub receipt_id: String,
    pub issue_date: NaiveDate,
    pub client_name: String,
    pub grand_total: Decimal,
    pub currency_symbol: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&ReceiptRecord> for ReceiptSummary {
    fn from(record: &ReceiptRecord) -> Self {
        Self {
            receipt_id: record.receipt_id.clone(),
            issue_date: record.issue_date,
            client_name: record.client.name.clone(),
            grand_total: record.grand_total,
            currency_symbol: record.currency.symbol.clone(),
            payment_status: record.payment_status,
            created_at: Utc::now(),
        }
    }
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("must_not_be_negative"))
    } else {
        Ok(())
    }
}
