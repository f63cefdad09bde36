//! Steady-state polling
//!
//! RDS transitions (create to available, delete to gone) take minutes;
//! the drivers poll a probe until it reports ready, bounded by a hard
//! ceiling. Cancellation is cooperative: dropping the returned future
//! cancels the in-flight probe call or sleep.

use crate::error::{AwsError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Polling cadence and ceiling for a steady-state wait.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Polls `probe` until it returns `Ok(true)`.
///
/// Probe errors propagate immediately; exceeding the ceiling yields
/// [`AwsError::Timeout`] carrying `description`.
pub async fn wait_until<F, Fut>(description: &str, config: &WaitConfig, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + config.timeout;

    loop {
        if probe().await? {
            return Ok(());
        }

        if Instant::now() + config.poll_interval > deadline {
            return Err(AwsError::Timeout(description.to_string()));
        }
        sleep(config.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> WaitConfig {
        WaitConfig {
            poll_interval: Duration::from_millis(1),
            timeout: Duration::from_millis(250),
        }
    }

    #[tokio::test]
    async fn returns_once_probe_reports_ready() {
        let calls = AtomicU32::new(0);
        let result = wait_until("test resource", &fast_config(), || {
            let calls = &calls;
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) >= 2) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn times_out_when_never_ready() {
        let result = wait_until("stuck resource", &fast_config(), || async { Ok(false) }).await;

        match result {
            Err(AwsError::Timeout(what)) => assert_eq!(what, "stuck resource"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_errors_propagate() {
        let result = wait_until("broken resource", &fast_config(), || async {
            Err(AwsError::Api("describe failed".to_string()))
        })
        .await;

        match result {
            Err(AwsError::Api(message)) => assert_eq!(message, "describe failed"),
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
