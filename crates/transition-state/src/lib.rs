//! Transition-State: evidence bundle sinks
//!
//! This crate is the hand-off point between the detection engine and
//! whatever persists its output (graph loaders, report builders, audit
//! archives).
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: write-once delivery and faithful serialization.
//!
//! ## Key Components
//!
//! - `BundleSink`: async trait every sink implements
//! - `MemoryBundleSink`: in-memory fake for tests
//! - `JsonlBundleSink`: line-delimited JSON file writer

mod error;
pub mod fakes;
pub mod jsonl;
pub mod sink;

pub use error::{SinkError, SinkResult};
pub use fakes::MemoryBundleSink;
pub use jsonl::{read_bundles_jsonl, JsonlBundleSink};
pub use sink::BundleSink;
