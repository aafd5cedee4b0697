pub mod env;
pub mod tracing_init;

pub use env::{parse_csv_list, AppConfig, DEFAULT_STATUS_ORDER};
pub use tracing_init::init_tracing;
