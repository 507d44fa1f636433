//! Client-side receipt form: typed item rows, live totals, identifier
//! generation, settings mapping and local preferences.

pub mod form;
pub mod id;
pub mod models;
pub mod settings;
pub mod store;
pub mod totals;

pub use form::{FieldError, FormError, ItemRow, ReceiptForm, RowField};
pub use id::generate_receipt_id;
pub use models::{
    BusinessProfile, ClientProfile, Currency, LineItem, PaymentStatus, ReceiptRecord,
    ReceiptSummary,
};
pub use settings::BusinessSettings;
pub use store::{JsonFileStore, LocalStore, MemoryStore, Preferences, StoreError};
pub use totals::{compute_totals, parse_amount, Totals, TotalsError};
