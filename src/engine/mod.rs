use std::fmt;

use crate::Config;
use crate::driver::wait::{wait_for_element, wait_for_url_change};
use crate::driver::Driver;
use crate::error::{CrawlError, DriverError};
use crate::record::ProductVariantRecord;
use crate::stats::RunStats;

mod extractor;
mod revealer;

pub use extractor::{CardExtractor, ExtractError};
pub use revealer::{
    scroll_to_script, PageRevealer, SCROLL_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT,
    VIEWPORT_HEIGHT_SCRIPT,
};

/// States of the listing walk.
#[derive(Debug)]
pub enum WalkState {
    /// Opening the start url, or clicking through to the next page.
    Loading { first_page: bool },
    Extracting,
    Paginating,
    Done(Termination),
}

/// Why a walk ended.
#[derive(Debug)]
pub enum Termination {
    QuotaReached,
    /// The listing ran out of pages.
    Exhausted,
    Failed(CrawlError),
}

impl Termination {
    pub fn is_failure(&self) -> bool {
        matches!(self, Termination::Failed(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::QuotaReached => write!(f, "quota reached"),
            Termination::Exhausted => write!(f, "listing exhausted"),
            Termination::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Everything collected by a walk, failed or not.
#[derive(Debug)]
pub struct WalkReport {
    pub records: Vec<ProductVariantRecord>,
    pub termination: Termination,
    pub stats: RunStats,
}

/// Walks a paginated listing and collects product variants until the quota
/// is met or the listing ends.
///
/// The walk is strictly sequential: a page is loaded, revealed and fully
/// extracted before the next one is requested.
pub struct Engine<'a, D: Driver + ?Sized> {
    driver: &'a D,
    config: &'a Config,
    revealer: PageRevealer,
    extractor: CardExtractor<'a>,
    collected: Vec<ProductVariantRecord>,
    stats: RunStats,
}

impl<'a, D: Driver + ?Sized> Engine<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        Self {
            driver,
            config,
            revealer: PageRevealer::new(config.scroll_pause, config.max_reveal_steps),
            extractor: CardExtractor::new(&config.selectors, &config.segment),
            collected: vec![],
            stats: RunStats::new(),
        }
    }

    /// Runs the walk from `start_url`. Never loses records: whatever was
    /// collected before a failure is returned in the report.
    ///
    /// `quota` is checked after each card, so the result can exceed it by up
    /// to one card's variants minus one.
    pub async fn run(mut self, start_url: &str, quota: usize) -> WalkReport {
        let mut state = WalkState::Loading { first_page: true };
        let termination = loop {
            state = match state {
                WalkState::Loading { first_page: true } => self.load_first(start_url).await,
                WalkState::Loading { first_page: false } => self.load_next().await,
                WalkState::Extracting => self.extract_page(quota).await,
                WalkState::Paginating => {
                    if self.collected.len() >= quota {
                        WalkState::Done(Termination::QuotaReached)
                    } else {
                        WalkState::Loading { first_page: false }
                    }
                }
                WalkState::Done(termination) => break termination,
            };
        };

        match &termination {
            Termination::Failed(_) => log::error!("Crawl {}", termination),
            t => log::info!("Crawl finished: {}", t),
        }
        log::info!(
            "{} records from {} cards on {} pages ({} scroll steps) in {}s, {} records/minute",
            self.collected.len(),
            self.stats.cards_extracted(),
            self.stats.pages_visited(),
            self.stats.scroll_steps(),
            self.stats.elapsed_time(),
            self.stats.records_per_minute(),
        );

        WalkReport {
            records: self.collected,
            termination,
            stats: self.stats,
        }
    }

    async fn load_first(&mut self, start_url: &str) -> WalkState {
        log::info!("Loading {}", start_url);
        let loaded = match self.driver.navigate(start_url).await {
            Ok(()) => self.wait_for_cards().await,
            Err(e) => Err(e),
        };
        match loaded {
            Ok(()) => {
                self.stats.incr_pages_visited();
                WalkState::Extracting
            }
            Err(source) => WalkState::Done(Termination::Failed(CrawlError::FatalLoad {
                url: start_url.to_owned(),
                source,
            })),
        }
    }

    /// Clicks through to the next page. Every way of not getting there
    /// (no control, url unchanged, no cards) ends the walk normally.
    async fn load_next(&mut self) -> WalkState {
        let sel = &self.config.selectors;
        let previous = match self.driver.current_url().await {
            Ok(url) => url,
            Err(e) => return failed(e),
        };

        let next = match self.driver.find(&sel.next_page).await {
            Ok(el) => el,
            Err(e) if e.is_not_found() => {
                log::info!("No next page control on {}", previous);
                return WalkState::Done(Termination::Exhausted);
            }
            Err(e) => return failed(e),
        };
        if let Err(e) = self.driver.click(&next).await {
            return failed(e);
        }

        let url = match wait_for_url_change(
            self.driver,
            &previous,
            self.config.load_timeout,
            self.config.poll_interval,
        )
        .await
        {
            Ok(url) => url,
            Err(e) if e.is_timeout() => {
                log::warn!("Url stayed at {} after clicking next", previous);
                return WalkState::Done(Termination::Exhausted);
            }
            Err(e) => return failed(e),
        };

        match self.wait_for_cards().await {
            Ok(()) => {
                self.stats.incr_pages_visited();
                log::info!("Loaded page {}: {}", self.stats.pages_visited(), url);
                WalkState::Extracting
            }
            Err(e) if e.is_timeout() => {
                log::warn!("No cards appeared on {}", url);
                WalkState::Done(Termination::Exhausted)
            }
            Err(e) => failed(e),
        }
    }

    async fn extract_page(&mut self, quota: usize) -> WalkState {
        if self.collected.len() >= quota {
            return WalkState::Done(Termination::QuotaReached);
        }

        match self.revealer.reveal(self.driver).await {
            Ok(steps) => self.stats.add_scroll_steps(steps),
            Err(e) => return failed(e),
        }
        let page_url = match self.driver.current_url().await {
            Ok(url) => url,
            Err(e) => return failed(e),
        };
        let cards = match self.driver.find_all(&self.config.selectors.card).await {
            Ok(cards) => cards,
            Err(e) => return failed(e),
        };
        log::debug!("{} cards on {}", cards.len(), page_url);

        for (idx, card) in cards.iter().enumerate() {
            let records = match self.extractor.extract(self.driver, card, &page_url).await {
                Ok(records) => records,
                Err(ExtractError { field, source }) if source.is_not_found() => {
                    return WalkState::Done(Termination::Failed(CrawlError::Structural {
                        field,
                        card_index: idx,
                        page_url,
                        source,
                    }));
                }
                Err(ExtractError { source, .. }) => return failed(source),
            };
            log::debug!("Card #{} yielded {} variants", idx, records.len());
            self.stats.add_card(records.len());
            self.collected.extend(records);

            if self.collected.len() >= quota {
                break;
            }
        }
        WalkState::Paginating
    }

    async fn wait_for_cards(&self) -> Result<(), DriverError> {
        wait_for_element(
            self.driver,
            &self.config.selectors.card,
            self.config.load_timeout,
            self.config.poll_interval,
        )
        .await
    }
}

fn failed(e: DriverError) -> WalkState {
    WalkState::Done(Termination::Failed(CrawlError::Driver(e)))
}
