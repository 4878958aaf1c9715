pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use crate::core::{engine::LedgerEngine, pipeline::LedgerPipeline, session::Session};
pub use utils::error::{LedgerError, Result};
