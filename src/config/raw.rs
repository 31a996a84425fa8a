//! Raw document envelopes
//!
//! The two input documents are YAML. The store-cluster document is small and
//! fully typed; the cluster configuration document keeps its section entries
//! as raw mappings because nearly every field is a range expression or
//! free-form plugin config that the builder expands and validates itself.

use serde::Deserialize;
use serde_yaml::Mapping;

/// Store-cluster document: selects the KV endpoints, not part of the model.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreClusterDoc {
    /// Cluster name, used as the default key prefix
    pub cluster: String,
    /// Store members to connect to
    pub members: Vec<Member>,
}

/// One member of the store cluster
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub host: String,
    pub port: u16,
}

impl Member {
    /// `host:port` form consumed by the store client.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cluster configuration document: the compiler input.
///
/// Every section is optional; section entries are validated and expanded by
/// the model builder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterDoc {
    #[serde(default)]
    pub endpoints: Vec<Mapping>,
    #[serde(default)]
    pub groups: Vec<Mapping>,
    #[serde(default)]
    pub aggregators: Vec<Mapping>,
    #[serde(default)]
    pub producers: Vec<Mapping>,
    #[serde(default)]
    pub updaters: Vec<Mapping>,
    #[serde(default)]
    pub stores: Vec<Mapping>,
    #[serde(default)]
    pub samplers: Vec<Mapping>,
    #[serde(default)]
    pub plugins: Vec<Mapping>,
}
