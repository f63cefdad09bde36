//! Operation routing
//!
//! Maps a requested operation (`up`/`down`) and service selector to the
//! matching driver. An unrecognized service is reported through the
//! event stream but is not a process-level failure.

use crate::driver::ResourceDriver;
use crate::error::{AwsError, Result};
use crate::rds::RdsDriver;
use crate::s3::S3Driver;
use wharf_core::{EventSink, Options, with_fallback};

fn driver_for(service: &str) -> Option<Box<dyn ResourceDriver>> {
    match service {
        "rds" => Some(Box::new(RdsDriver::new())),
        "s3" => Some(Box::new(S3Driver::new())),
        _ => None,
    }
}

/// Routes an `up` request to the matching driver.
///
/// Missing `service`/`region` are reported as error events but, by
/// default, do not stop the dispatch — the lenient behavior is
/// intentional and kept for compatibility with existing Compose files;
/// `strict` upgrades both checks to hard errors.
pub async fn up(options: &Options, events: &dyn EventSink) -> Result<()> {
    if options.service.is_empty() {
        events.error("service type must be specified");
        if options.strict {
            return Err(AwsError::MissingOption("service"));
        }
    }
    if options.region.is_empty() {
        events.error("region must be specified");
        if options.strict {
            return Err(AwsError::MissingOption("region"));
        }
    }

    let service = options.service.to_lowercase();

    match driver_for(&service) {
        Some(driver) => {
            tracing::debug!(driver = driver.name(), "dispatching up");
            driver.up(options, events).await
        }
        None => {
            events.error(&format!(
                "unsupported service: {service} (expected: rds or s3)"
            ));
            Ok(())
        }
    }
}

/// Routes a `down` request to the matching driver.
///
/// Presence of `service`/`region` is not re-validated on teardown; an
/// empty selector defaults to `rds`.
pub async fn down(options: &Options, events: &dyn EventSink) -> Result<()> {
    let service = with_fallback(&options.service, "rds").to_lowercase();

    match driver_for(&service) {
        Some(driver) => {
            tracing::debug!(driver = driver.name(), "dispatching down");
            driver.down(options, events).await
        }
        None => {
            events.error(&format!(
                "unsupported service: {service} (expected: rds or s3)"
            ));
            Ok(())
        }
    }
}
