//! Editable receipt form with live totals.
//!
//! Numeric inputs are kept as the raw text the user typed and parsed leniently
//! (see [`parse_amount`]). Every mutation recalculates the totals before it
//! returns, so [`ReceiptForm::totals`] always reflects the current rows.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::id::generate_receipt_id;
use crate::models::{
    BusinessProfile, ClientProfile, Currency, LineItem, PaymentStatus, ReceiptRecord,
    ReceiptSummary,
};
use crate::totals::{parse_amount, totals_from_lines, Totals, TotalsError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRow {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
}

impl ItemRow {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit_price: price.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.quantity.trim().is_empty()
            && self.unit_price.trim().is_empty()
    }

    pub fn quantity(&self) -> Decimal {
        parse_amount(&self.quantity)
    }

    pub fn unit_price(&self) -> Decimal {
        parse_amount(&self.unit_price)
    }

    /// `None` when the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.quantity().checked_mul(self.unit_price())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Name,
    Quantity,
    UnitPrice,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("at least one line item is required")]
    NoItems,

    #[error("item {row}: description is required")]
    ItemName { row: usize },

    #[error("item {row}: quantity must be at least 1")]
    Quantity { row: usize },

    #[error("item {row}: unit price must not be negative")]
    UnitPrice { row: usize },

    #[error("tax rate must not be negative")]
    TaxRate,

    #[error("discount must not be negative")]
    Discount,

    #[error("amounts are too large to total")]
    AmountTooLarge,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldError>),

    #[error("item row {0} does not exist")]
    RowOutOfRange(usize),

    #[error(transparent)]
    Totals(#[from] TotalsError),
}

#[derive(Debug, Clone)]
pub struct ReceiptForm {
    receipt_id: String,
    pub issue_date: NaiveDate,
    pub currency: Currency,
    pub payment_status: PaymentStatus,
    pub notes: String,
    pub business: BusinessProfile,
    pub client: ClientProfile,
    pub signature: Option<String>,
    tax_rate: String,
    discount: String,
    rows: Vec<ItemRow>,
    totals: Result<Totals, TotalsError>,
}

impl Default for ReceiptForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptForm {
    pub fn new() -> Self {
        let mut form = Self {
            receipt_id: generate_receipt_id(),
            issue_date: Local::now().date_naive(),
            currency: Currency::default(),
            payment_status: PaymentStatus::default(),
            notes: String::new(),
            business: BusinessProfile::default(),
            client: ClientProfile::default(),
            signature: None,
            tax_rate: String::new(),
            discount: String::new(),
            rows: vec![ItemRow::default()],
            totals: Ok(Totals::default()),
        };
        form.recalculate();
        form
    }

    pub fn receipt_id(&self) -> &str {
        &self.receipt_id
    }

    pub fn rows(&self) -> &[ItemRow] {
        &self.rows
    }

    /// Current totals, or the overflow that the last edit produced.
    pub fn totals(&self) -> Result<Totals, TotalsError> {
        self.totals
    }

    pub fn line_total(&self, index: usize) -> Result<Decimal, FormError> {
        let row = self.rows.get(index).ok_or(FormError::RowOutOfRange(index))?;
        Ok(row.line_total().ok_or(TotalsError::Overflow)?)
    }

    /// Append an empty row and return its index.
    pub fn add_row(&mut self) -> usize {
        self.push_row(ItemRow::default())
    }

    pub fn push_row(&mut self, row: ItemRow) -> usize {
        self.rows.push(row);
        self.recalculate();
        self.rows.len() - 1
    }

    /// Remove a row. Removing the last remaining row leaves one fresh empty row.
    pub fn remove_row(&mut self, index: usize) -> Result<ItemRow, FormError> {
        if index >= self.rows.len() {
            return Err(FormError::RowOutOfRange(index));
        }
        let removed = self.rows.remove(index);
        if self.rows.is_empty() {
            self.rows.push(ItemRow::default());
        }
        self.recalculate();
        Ok(removed)
    }

    pub fn update_row(
        &mut self,
        index: usize,
        field: RowField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(FormError::RowOutOfRange(index))?;
        let value = value.into();
        match field {
            RowField::Name => row.name = value,
            RowField::Quantity => row.quantity = value,
            RowField::UnitPrice => row.unit_price = value,
        }
        self.recalculate();
        Ok(())
    }

    pub fn set_tax_rate(&mut self, raw: impl Into<String>) {
        self.tax_rate = raw.into();
        self.recalculate();
    }

    pub fn set_discount(&mut self, raw: impl Into<String>) {
        self.discount = raw.into();
        self.recalculate();
    }

    pub fn tax_rate(&self) -> Decimal {
        parse_amount(&self.tax_rate)
    }

    pub fn discount(&self) -> Decimal {
        parse_amount(&self.discount)
    }

    pub fn business_profile(&self) -> &BusinessProfile {
        &self.business
    }

    pub fn apply_business_profile(&mut self, profile: BusinessProfile) {
        self.business = profile.normalized();
    }

    fn recalculate(&mut self) {
        self.totals = totals_from_lines(
            self.rows.iter().map(ItemRow::line_total),
            self.tax_rate(),
            self.discount(),
        );
    }

    /// Check everything required before a record may be submitted.
    pub fn validate(&self) -> Result<(), FormError> {
        let mut errors = Vec::new();

        if self.receipt_id.trim().is_empty() {
            errors.push(FieldError::Required("receipt id"));
        }
        if self.currency.code.trim().is_empty() {
            errors.push(FieldError::Required("currency"));
        }
        if self.business.name.trim().is_empty() {
            errors.push(FieldError::Required("business name"));
        }
        if self.client.name.trim().is_empty() {
            errors.push(FieldError::Required("client name"));
        }
        if self.tax_rate() < Decimal::ZERO {
            errors.push(FieldError::TaxRate);
        }
        if self.discount() < Decimal::ZERO {
            errors.push(FieldError::Discount);
        }
        if self.totals.is_err() {
            errors.push(FieldError::AmountTooLarge);
        }

        let mut filled = 0;
        for (index, row) in self.rows.iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            filled += 1;
            let row_number = index + 1;
            if row.name.trim().is_empty() {
                errors.push(FieldError::ItemName { row: row_number });
            }
            if row.quantity() < Decimal::ONE {
                errors.push(FieldError::Quantity { row: row_number });
            }
            if row.unit_price() < Decimal::ZERO {
                errors.push(FieldError::UnitPrice { row: row_number });
            }
        }
        if filled == 0 {
            errors.push(FieldError::NoItems);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(errors))
        }
    }

    /// Build the transfer record. Blank rows are skipped.
    pub fn to_record(&self) -> Result<ReceiptRecord, FormError> {
        self.validate()?;
        let totals = self.totals?;

        let items = self
            .rows
            .iter()
            .filter(|row| !row.is_blank())
            .map(|row| LineItem {
                name: row.name.trim().to_string(),
                quantity: row.quantity(),
                unit_price: row.unit_price(),
            })
            .collect();

        Ok(ReceiptRecord {
            receipt_id: self.receipt_id.clone(),
            issue_date: self.issue_date,
            currency: self.currency.clone(),
            tax_rate: self.tax_rate(),
            discount: self.discount(),
            payment_status: self.payment_status,
            notes: self.notes.clone(),
            business: self.business.clone(),
            client: self.client.clone(),
            items,
            signature: self.signature.clone(),
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            grand_total: totals.grand_total,
        })
    }

    /// Mark the current receipt as generated: returns its history summary and
    /// assigns a new identifier so the next receipt never reuses it.
    pub fn complete_submission(&mut self, record: &ReceiptRecord) -> ReceiptSummary {
        let summary = ReceiptSummary::from(record);
        let previous = std::mem::replace(&mut self.receipt_id, generate_receipt_id());
        while self.receipt_id == previous {
            self.receipt_id = generate_receipt_id();
        }
        tracing::debug!(previous = %previous, next = %self.receipt_id, "Receipt id rotated");
        summary
    }
}
