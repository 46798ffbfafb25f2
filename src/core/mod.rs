pub mod aggregate;
pub mod build_fragment;
pub mod engine;
pub mod group;
pub mod registry;
pub mod scanner;

pub use crate::domain::model::{GeneratedArtifact, Package, RegistryDocument, TestGroup};
pub use crate::domain::ports::{GroupDiscovery, Storage};
pub use crate::utils::error::Result;
