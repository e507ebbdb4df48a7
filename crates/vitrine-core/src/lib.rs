pub mod app_config;
pub mod config;
pub mod money;
pub mod record;
pub mod rows;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use money::{format_brl, is_plausible_price, Installment, Interest, Money};
pub use record::{PriceRecord, Status};
pub use rows::{OutputRow, ProductRow};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
