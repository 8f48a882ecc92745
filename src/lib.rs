pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpSheetSource, LocalCsvSource, LocalStorage};
pub use config::CompatConfig;
pub use core::{loader::SheetLoader, session::LookupSession};
pub use domain::services::resolve;
pub use utils::error::{CompatError, Result};
