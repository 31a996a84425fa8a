//! etcd-backed key/value sink
//!
//! A thin blocking adapter over the async `etcd-client` crate. The compiler
//! core is synchronous, so the adapter owns a private tokio runtime and
//! blocks on each operation. Connection is established against every member
//! of the store cluster; etcd routes requests internally.

use etcd_client::{Client, DeleteOptions};
use tokio::runtime::Runtime;

use super::{KvSink, SinkError};

/// A sink writing to a live etcd cluster.
pub struct EtcdSink {
    runtime: Runtime,
    client: Client,
}

impl EtcdSink {
    /// Connect to the cluster at the given `host:port` member addresses.
    pub fn connect(members: &[String]) -> Result<Self, SinkError> {
        let runtime = Runtime::new()?;
        let client = runtime
            .block_on(Client::connect(members, None))
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(Self { runtime, client })
    }
}

impl KvSink for EtcdSink {
    fn put(&mut self, path: &str, value: &str) -> Result<(), SinkError> {
        self.runtime
            .block_on(self.client.put(path, value, None))
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(())
    }

    fn delete_prefix(&mut self, prefix: &str) -> Result<(), SinkError> {
        let options = DeleteOptions::new().with_prefix();
        self.runtime
            .block_on(self.client.delete(prefix, Some(options)))
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(())
    }
}
