//! Provider protocol and configuration model for wharf
//!
//! This crate holds everything the AWS integration and the CLI share:
//! the flat [`Options`] bag resolved from command-line flags, the JSONL
//! [`Event`] envelope Docker Compose consumes on stdout, and the small
//! fallback/normalization helpers used when resolving option values.

pub mod event;
pub mod fallback;
pub mod options;

// Re-exports
pub use event::{Event, EventKind, EventSink, JsonlSink, MemorySink};
pub use fallback::{split_trim, with_fallback};
pub use options::Options;
