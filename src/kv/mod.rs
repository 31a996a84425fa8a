//! Key/value sink abstraction for the compiled config tree
//!
//! The compiler writes its flattened output through the [`KvSink`] trait so
//! the backing store can be substituted: etcd in production, an in-memory
//! map under test and in dry runs. Both operations are synchronous and
//! propagate transport failures to the caller; there is no retry layer.

pub mod etcd;
pub mod memory;

pub use etcd::EtcdSink;
pub use memory::MemorySink;

use thiserror::Error;

/// Errors raised by a key/value sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Store transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A hierarchical key/value store accepting the compiled tree.
///
/// Writes are an unordered-but-sequential stream of independent operations;
/// the sink offers no transactional grouping and no compare-and-swap.
pub trait KvSink {
    /// Write a single leaf.
    fn put(&mut self, path: &str, value: &str) -> Result<(), SinkError>;

    /// Delete every key under a prefix.
    fn delete_prefix(&mut self, prefix: &str) -> Result<(), SinkError>;
}
