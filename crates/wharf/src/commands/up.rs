use wharf_core::{EventSink, Options};

/// Brings provider-managed AWS resources online for a Compose service
/// and emits the environment variables Compose should inject.
pub async fn handle(options: &Options, events: &dyn EventSink) -> anyhow::Result<()> {
    tracing::debug!(service = %options.service, "up requested");
    wharf_cloud_aws::dispatch::up(options, events).await?;
    Ok(())
}
