//! AWS configuration loading
//!
//! Credentials and the rest of the SDK configuration come from the
//! ambient chain (environment, shared profile, instance role); the
//! drivers only pin the target region.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use wharf_core::with_fallback;

/// Region used when the caller supplies none.
pub const DEFAULT_REGION: &str = "ap-southeast-1";

/// Loads an SDK config scoped to the given region.
pub async fn load_aws_config(region: &str) -> SdkConfig {
    let region = with_fallback(region, DEFAULT_REGION).to_string();
    tracing::debug!("loading AWS config for region {region}");

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region))
        .load()
        .await
}
