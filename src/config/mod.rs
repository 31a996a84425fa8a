pub mod builder;
pub mod model;
pub mod raw;

pub use builder::{build_model, BuildError};
pub use model::ClusterModel;
pub use raw::{ClusterDoc, Member, StoreClusterDoc};

use std::path::Path;
use thiserror::Error;

/// Errors for document file I/O (separate from validation errors)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Load the cluster configuration document from disk.
/// This is the I/O boundary - parsing and validation are pure.
pub fn load_cluster_file(path: &Path) -> Result<ClusterDoc, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Load the store-cluster document selecting the KV endpoints.
pub fn load_store_cluster_file(path: &Path) -> Result<StoreClusterDoc, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}
