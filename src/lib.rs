//! # monforge
//!
//! A cluster configuration compiler for monitoring hierarchies. A single
//! declarative YAML document describes endpoints, aggregator groups,
//! producers, polling policies and storage policies using range-compressed
//! name lists; monforge expands and validates it into a typed model, then
//! emits two artifacts:
//!
//! - a flattened `(path, value)` tree published to a distributed key/value
//!   store, replaced wholesale with a trailing `last_updated` sentinel, and
//! - per-node directive scripts that statically balance the monitored
//!   producers across each group's aggregators.
//!
//! Compilation is a single synchronous pass: the model is built once,
//! validation failures abort before any output, and transport errors
//! propagate to the caller without retry.

pub mod cli;
pub mod config;
pub mod expand;
pub mod flatten;
pub mod interval;
pub mod kv;
pub mod script;
