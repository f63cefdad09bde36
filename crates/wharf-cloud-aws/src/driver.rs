//! Resource driver trait definition

use crate::error::Result;
use async_trait::async_trait;
use wharf_core::{EventSink, Options};

/// Up/down lifecycle for one managed AWS resource kind.
///
/// Implementations report progress and connection facts through the
/// event sink as they go; the returned `Result` only decides the
/// process exit outcome.
#[async_trait]
pub trait ResourceDriver: Send + Sync {
    /// Service selector keyword this driver answers to (e.g. "rds").
    fn name(&self) -> &str;

    /// Ensure the resource exists and export its connection facts as
    /// `setenv` events.
    async fn up(&self, options: &Options, events: &dyn EventSink) -> Result<()>;

    /// Tear the resource down. Deleting an already-absent resource is
    /// treated as success.
    async fn down(&self, options: &Options, events: &dyn EventSink) -> Result<()>;
}
