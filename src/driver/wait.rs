//! Bounded polling waits.

use std::time::Duration;

use tokio::time::Instant;

use super::Driver;
use crate::error::DriverError;

/// Waits until at least one element matches `selector`.
pub async fn wait_for_element<D: Driver + ?Sized>(
    driver: &D,
    selector: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), DriverError> {
    let deadline = Instant::now() + timeout;
    loop {
        if !driver.find_all(selector).await?.is_empty() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(DriverError::Timeout {
                what: format!("an element matching `{}`", selector),
                waited: timeout,
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Waits until the current url differs from `previous`. Returns the new url.
pub async fn wait_for_url_change<D: Driver + ?Sized>(
    driver: &D,
    previous: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String, DriverError> {
    let deadline = Instant::now() + timeout;
    loop {
        let url = driver.current_url().await?;
        if url != previous {
            return Ok(url);
        }
        if Instant::now() >= deadline {
            return Err(DriverError::Timeout {
                what: format!("url to change from {}", previous),
                waited: timeout,
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}
