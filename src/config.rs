use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::record::CatalogSegment;

pub struct Config {
    /// Chrome or Chromium binary to launch. When unset, the usual install
    /// locations and `PATH` are searched.
    pub chrome_executable: Option<PathBuf>,
    /// If set to true, the browser is started without a window.
    pub headless: bool,
    /// Extra command line arguments passed to the browser.
    pub browser_args: Vec<String>,
    /// Timeout for the first page to show a card, and for every pagination
    /// wait (url change, cards present) after clicking "next".
    pub load_timeout: Duration,
    /// How often bounded waits re-check their condition.
    pub poll_interval: Duration,
    /// Pause between scroll steps so lazy content can mount.
    pub scroll_pause: Duration,
    /// Upper bound on scroll steps per page. Pages that keep growing forever
    /// stop being walked once this many steps were taken.
    pub max_reveal_steps: usize,
    /// Timeout of a single DevTools protocol request.
    pub command_timeout: Duration,
    /// Feed file, overwritten on every run.
    pub output_path: PathBuf,
    /// Channel `<title>` of the feed.
    pub feed_title: String,
    /// Channel `<description>` of the feed.
    pub feed_description: String,
    /// Three letter currency code appended to rendered prices.
    pub currency: String,
    /// Where cards and their fields are found on a listing page.
    pub selectors: Selectors,
    /// Constant attributes stamped on every record of this listing.
    pub segment: CatalogSegment,
}

impl Config {
    pub fn sanity_check(&self) -> Result<(), ConfigError> {
        if self.command_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "command_timeout",
                reason: "cannot be zero",
            });
        }
        if self.load_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "load_timeout",
                reason: "cannot be zero",
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "poll_interval",
                reason: "cannot be zero",
            });
        }
        if self.max_reveal_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "max_reveal_steps",
                reason: "cannot be zero",
            });
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid {
                field: "currency",
                reason: "must be a three letter uppercase code",
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            headless: true,
            browser_args: vec![
                "--no-sandbox".to_owned(),
                "--disable-dev-shm-usage".to_owned(),
            ],
            load_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            scroll_pause: Duration::from_millis(200),
            max_reveal_steps: 2000,
            command_timeout: Duration::from_secs(30),
            output_path: PathBuf::from("products.xml"),
            feed_title: "Farfetch Women Dresses".to_owned(),
            feed_description: "A collection of women dresses from Farfetch.".to_owned(),
            currency: "USD".to_owned(),
            selectors: Selectors::default(),
            segment: CatalogSegment::default(),
        }
    }
}

/// CSS selectors locating the structural markers of a listing page.
///
/// Everything is keyed on `data-*` component markers rather than position so
/// that reordering of a card's children doesn't break extraction.
#[derive(Clone, Debug)]
pub struct Selectors {
    pub card: String,
    pub next_page: String,
    pub item_id_carrier: String,
    pub item_id_attribute: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub brand: String,
    pub final_price: String,
    pub price: String,
    pub hover_target: String,
    pub sizes: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            card: r#"li[data-testid="productCard"]"#.to_owned(),
            next_page: r#"a[data-testid="page-next"]"#.to_owned(),
            item_id_carrier: "div[itemid]".to_owned(),
            item_id_attribute: "itemid".to_owned(),
            description: r#"[data-component="ProductCardDescription"]"#.to_owned(),
            image: "img".to_owned(),
            link: "a".to_owned(),
            brand: r#"[data-component="ProductCardBrandName"]"#.to_owned(),
            final_price: r#"[data-component="PriceFinal"]"#.to_owned(),
            price: r#"[data-component="Price"]"#.to_owned(),
            hover_target: r#"div[data-component="ProductCardInfo"]"#.to_owned(),
            sizes: r#"p[data-component="ProductCardSizesAvailable"]"#.to_owned(),
        }
    }
}
