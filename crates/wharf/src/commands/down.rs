use wharf_core::{EventSink, Options};

/// Takes provider-managed AWS resources offline for a Compose service.
/// Teardown is idempotent: an already-absent resource is a success.
pub async fn handle(options: &Options, events: &dyn EventSink) -> anyhow::Result<()> {
    tracing::debug!(service = %options.service, "down requested");
    wharf_cloud_aws::dispatch::down(options, events).await?;
    Ok(())
}
