pub mod converter;
pub mod currency;
pub mod metrics;
pub mod qr;
pub mod renderer;
pub mod retention;
pub mod storage;

pub use converter::{CommandExecutor, DocumentConverter, WkhtmltopdfConverter};
pub use currency::load_currencies;
pub use metrics::{get_metrics, init_metrics};
pub use retention::RetentionScheduler;
pub use storage::{LocalStorage, Storage};
