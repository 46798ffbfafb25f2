pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::config::{cli::LocalStorage, toml_config::GeneratorConfig};
pub use crate::core::{engine::ManifestEngine, registry::Registry, scanner::DeclarationScanner};
pub use crate::utils::error::{Result, UtgenError};
