use std::time::Duration;

use crate::driver::{script_u64, Driver};
use crate::error::DriverError;

pub const VIEWPORT_HEIGHT_SCRIPT: &str = "window.innerHeight";
pub const SCROLL_HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
pub const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

pub fn scroll_to_script(y: u64) -> String {
    format!("window.scrollTo(0, {})", y)
}

/// Scrolls through a page a quarter viewport at a time so that lazily
/// mounted cards end up in the DOM.
pub struct PageRevealer {
    pause: Duration,
    max_steps: usize,
}

impl PageRevealer {
    pub fn new(pause: Duration, max_steps: usize) -> Self {
        Self { pause, max_steps }
    }

    /// Walks the page from the top to the bottom, extending the walk whenever
    /// the page grows. Returns the number of scroll steps taken.
    pub async fn reveal<D: Driver + ?Sized>(&self, driver: &D) -> Result<usize, DriverError> {
        let viewport = script_u64(driver, VIEWPORT_HEIGHT_SCRIPT).await?;
        let mut total = script_u64(driver, SCROLL_HEIGHT_SCRIPT).await?;
        let step = (viewport / 4).max(1);

        let mut y = 0;
        let mut steps = 0;
        while y < total {
            if steps == self.max_steps {
                log::warn!(
                    "Stopped revealing after {} steps at {}px of {}px",
                    steps,
                    y,
                    total
                );
                break;
            }
            driver.execute_script(&scroll_to_script(y)).await?;
            tokio::time::sleep(self.pause).await;
            steps += 1;

            let height = script_u64(driver, SCROLL_HEIGHT_SCRIPT).await?;
            if height > total {
                log::debug!("Page grew from {}px to {}px", total, height);
                total = height;
            }
            y += step;
        }

        driver.execute_script(SCROLL_TO_BOTTOM_SCRIPT).await?;
        tokio::time::sleep(self.pause).await;
        log::debug!("Revealed {}px in {} steps", total, steps);
        Ok(steps)
    }
}
