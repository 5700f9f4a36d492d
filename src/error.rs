use std::time::Duration;

use thiserror::Error;

/// Errors raised by a [`Driver`](crate::driver::Driver) implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no element matches `{locator}`")]
    NotFound { locator: String },

    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    /// The browser could not be configured or started.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// Protocol or connection error reported by the browser, e.g. a node
    /// that was detached from the document.
    #[error("browser error: {0}")]
    Browser(String),

    #[error("unexpected value: {0}")]
    UnexpectedValue(String),
}

impl DriverError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriverError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to encode feed: {0}")]
    Xml(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config.{field} {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The first listing page never presented a product card.
    #[error("failed to load listing {url}: {source}")]
    FatalLoad {
        url: String,
        #[source]
        source: DriverError,
    },

    /// A required card field was missing, which means the page layout changed.
    #[error("card #{card_index} on {page_url} is missing {field}: {source}")]
    Structural {
        field: &'static str,
        card_index: usize,
        page_url: String,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
