pub mod loader;
pub mod parser;
pub mod session;

pub use crate::domain::model::{Dataset, LookupMiss, Outcome};
pub use crate::domain::ports::{ConfigProvider, Storage, TableSource};
pub use crate::utils::error::Result;
