mod config;
mod error;
mod feed;
mod record;
mod stats;

pub mod driver;
pub mod engine;
pub mod util;

// (Re) Exports
pub use config::{Config, Selectors};
pub use driver::{ChromeSession, Driver};
pub use engine::{Engine, Termination, WalkReport};
pub use error::{ConfigError, CrawlError, DriverError, FeedError};
pub use feed::FeedSerializer;
pub use record::{CatalogSegment, ProductVariantRecord, NO_ID_FOUND, SIZES_NOT_AVAILABLE};
pub use stats::RunStats;

/// Outcome of a crawl whose feed was written.
#[derive(Debug)]
pub struct CrawlSummary {
    pub records_written: usize,
    pub termination: Termination,
    pub stats: RunStats,
}

/// Crawls `start_url` in a fresh browser session and writes the feed to
/// `config.output_path`.
///
/// The session is closed before the feed is written. A failed walk still
/// writes whatever was collected; check `termination` in the summary.
pub async fn crawl(config: &Config, start_url: &str, quota: usize) -> Result<CrawlSummary, CrawlError> {
    config.sanity_check()?;
    let session = ChromeSession::launch(config).await?;
    let report = Engine::new(&session, config).run(start_url, quota).await;
    if let Err(e) = session.close().await {
        log::warn!("Failed to close browser: {}", e);
    }
    write_report(config, report)
}

/// Same as [`crawl`] but on a caller-provided driver, which stays open.
pub async fn crawl_with_driver<D: Driver + ?Sized>(
    driver: &D,
    config: &Config,
    start_url: &str,
    quota: usize,
) -> Result<CrawlSummary, CrawlError> {
    config.sanity_check()?;
    let report = Engine::new(driver, config).run(start_url, quota).await;
    write_report(config, report)
}

fn write_report(config: &Config, report: WalkReport) -> Result<CrawlSummary, CrawlError> {
    FeedSerializer::from_config(config).write_to(&config.output_path, &report.records)?;
    Ok(CrawlSummary {
        records_written: report.records.len(),
        termination: report.termination,
        stats: report.stats,
    })
}
