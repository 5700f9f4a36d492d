//! In-memory browser for driving the crawler against HTML fixtures.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use catwalk::engine::{SCROLL_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT, VIEWPORT_HEIGHT_SCRIPT};
use catwalk::util::join_url;
use catwalk::{Config, Driver, DriverError};

/// Elements carrying this attribute only exist once an ancestor was hovered.
pub const LAZY_ATTR: &str = "data-lazy";

pub struct FakePage {
    pub url: String,
    pub html: String,
    pub scroll_height: u64,
    /// `(n, height)`: after `n` scroll steps the page grows to `height`.
    pub grow_after: Option<(usize, u64)>,
}

impl FakePage {
    pub fn new(url: &str, html: String) -> Self {
        Self {
            url: url.to_owned(),
            html,
            scroll_height: 2000,
            grow_after: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakeElement {
    page: usize,
    index: usize,
}

#[derive(Default)]
struct FakeState {
    current: Option<usize>,
    url: String,
    hovered: Vec<usize>,
    scrolls: Vec<u64>,
    scrolled_to_bottom: usize,
    height: u64,
    hover_count: usize,
}

pub struct FakeBrowser {
    pages: Vec<FakePage>,
    pub inner_height: u64,
    /// When false, clicking a link leaves the browser where it is.
    pub links_navigate: bool,
    /// Pages whose element text can't be read, as if the browser crashed there.
    pub broken_pages: Vec<String>,
    state: Mutex<FakeState>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            inner_height: 800,
            links_navigate: true,
            broken_pages: vec![],
            state: Mutex::new(FakeState {
                url: "about:blank".to_owned(),
                ..FakeState::default()
            }),
        }
    }

    pub fn scrolls(&self) -> Vec<u64> {
        self.state.lock().unwrap().scrolls.clone()
    }

    pub fn scrolled_to_bottom(&self) -> usize {
        self.state.lock().unwrap().scrolled_to_bottom
    }

    pub fn hover_count(&self) -> usize {
        self.state.lock().unwrap().hover_count
    }

    /// Opens `url` directly, as if the test had navigated there.
    pub fn open(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        self.go_to(&mut state, url);
    }

    fn go_to(&self, state: &mut FakeState, url: &str) {
        state.current = self.pages.iter().position(|p| p.url == url);
        state.url = url.to_owned();
        state.hovered.clear();
        state.scrolls.clear();
        state.height = state
            .current
            .map(|idx| self.pages[idx].scroll_height)
            .unwrap_or(0);
    }

    fn with_element<R>(
        &self,
        element: &FakeElement,
        f: impl FnOnce(ElementRef<'_>) -> R,
    ) -> Result<R, DriverError> {
        let html = Html::parse_document(&self.pages[element.page].html);
        let el = all_elements(&html)
            .into_iter()
            .nth(element.index)
            .ok_or_else(|| DriverError::Browser(format!("stale element {:?}", element)))?;
        Ok(f(el))
    }

    /// Visible elements matching `selector`, optionally below `parent`.
    fn query(
        &self,
        parent: Option<&FakeElement>,
        selector: &str,
    ) -> Result<Vec<FakeElement>, DriverError> {
        let state = self.state.lock().unwrap();
        let page = match (parent, state.current) {
            (Some(p), _) => p.page,
            (None, Some(page)) => page,
            (None, None) => return Ok(vec![]),
        };
        let sel = Selector::parse(selector)
            .map_err(|_| DriverError::UnexpectedValue(format!("bad selector {}", selector)))?;

        let html = Html::parse_document(&self.pages[page].html);
        let all = all_elements(&html);
        let hovered: Vec<ElementRef> = state.hovered.iter().map(|idx| all[*idx]).collect();

        let candidates: Vec<ElementRef> = match parent {
            Some(p) => all[p.index].select(&sel).collect(),
            None => html.select(&sel).collect(),
        };
        let found = candidates
            .into_iter()
            .filter(|el| {
                el.value().attr(LAZY_ATTR).is_none()
                    || hovered.iter().any(|h| h.descendants().any(|n| n == **el))
            })
            .map(|el| FakeElement {
                page,
                index: all.iter().position(|x| *x == el).unwrap(),
            })
            .collect();
        Ok(found)
    }
}

fn all_elements(html: &Html) -> Vec<ElementRef<'_>> {
    let all = Selector::parse("*").unwrap();
    html.select(&all).collect()
}

#[async_trait]
impl Driver for FakeBrowser {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.open(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, DriverError> {
        self.query(None, selector)
    }

    async fn find(&self, selector: &str) -> Result<FakeElement, DriverError> {
        self.query(None, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound { locator: selector.to_owned() })
    }

    async fn find_in(&self, parent: &FakeElement, selector: &str) -> Result<FakeElement, DriverError> {
        self.query(Some(parent), selector)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound { locator: selector.to_owned() })
    }

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        let mut state = self.state.lock().unwrap();
        if script == VIEWPORT_HEIGHT_SCRIPT {
            return Ok(Value::from(self.inner_height));
        }
        if script == SCROLL_HEIGHT_SCRIPT {
            return Ok(Value::from(state.height));
        }
        if script == SCROLL_TO_BOTTOM_SCRIPT {
            state.scrolled_to_bottom += 1;
            return Ok(Value::Null);
        }
        let y = script
            .strip_prefix("window.scrollTo(0, ")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|y| y.parse::<u64>().ok())
            .ok_or_else(|| DriverError::UnexpectedValue(format!("unknown script {}", script)))?;
        state.scrolls.push(y);
        if let Some(page) = state.current {
            if let Some((after, height)) = self.pages[page].grow_after {
                if state.scrolls.len() >= after {
                    state.height = state.height.max(height);
                }
            }
        }
        Ok(Value::Null)
    }

    async fn hover(&self, element: &FakeElement) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.hovered.push(element.index);
        state.hover_count += 1;
        Ok(())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, DriverError> {
        let url = &self.pages[element.page].url;
        if self.broken_pages.contains(url) {
            return Err(DriverError::Browser(format!("target crashed on {}", url)));
        }
        self.with_element(element, |el| el.text().collect::<String>().trim().to_owned())
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>, DriverError> {
        self.with_element(element, |el| el.value().attr(name).map(|x| x.to_owned()))
    }

    async fn click(&self, element: &FakeElement) -> Result<(), DriverError> {
        let href = self.attribute(element, "href").await?;
        if !self.links_navigate {
            return Ok(());
        }
        if let Some(href) = href {
            let mut state = self.state.lock().unwrap();
            let url = join_url(&state.url, &href);
            self.go_to(&mut state, &url);
        }
        Ok(())
    }
}

pub struct CardFixture<'a> {
    pub item_id: Option<&'a str>,
    pub title: Option<&'a str>,
    pub image: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub final_price: Option<&'a str>,
    pub price: Option<&'a str>,
    pub sizes: Option<&'a str>,
    pub href: Option<&'a str>,
}

impl<'a> Default for CardFixture<'a> {
    fn default() -> Self {
        Self {
            item_id: Some("https://shop.example.com/shopping/women/12345-silk-dress.aspx"),
            title: Some("Silk midi dress"),
            image: Some("/images/dress.jpg"),
            brand: Some("Atelier"),
            final_price: None,
            price: Some("$1,234.50"),
            sizes: Some("XS, S, M"),
            href: Some("/shopping/women/12345-silk-dress.aspx"),
        }
    }
}

pub fn card_html(card: &CardFixture) -> String {
    let mut html = String::from(r#"<li data-testid="productCard">"#);
    // Without a link the card body is wrapped in a plain div.
    let wrapper = match card.href {
        Some(href) => {
            html.push_str(&format!(r#"<a href="{}">"#, href));
            "a"
        }
        None => {
            html.push_str("<div>");
            "div"
        }
    };
    if let Some(src) = card.image {
        html.push_str(&format!(r#"<img src="{}" alt="">"#, src));
    }
    if let Some(item_id) = card.item_id {
        html.push_str(&format!(r#"<div itemid="{}"></div>"#, item_id));
    }
    html.push_str(r#"<div data-component="ProductCardInfo">"#);
    if let Some(brand) = card.brand {
        html.push_str(&format!(r#"<p data-component="ProductCardBrandName">{}</p>"#, brand));
    }
    if let Some(title) = card.title {
        html.push_str(&format!(
            r#"<p data-component="ProductCardDescription">{}</p>"#,
            title
        ));
    }
    if let Some(price) = card.final_price {
        html.push_str(&format!(r#"<p data-component="PriceFinal">{}</p>"#, price));
    }
    if let Some(price) = card.price {
        html.push_str(&format!(r#"<p data-component="Price">{}</p>"#, price));
    }
    if let Some(sizes) = card.sizes {
        html.push_str(&format!(
            r#"<p data-component="ProductCardSizesAvailable" {}>{}</p>"#,
            LAZY_ATTR, sizes
        ));
    }
    html.push_str(&format!("</div></{}></li>", wrapper));
    html
}

/// A listing page with `cards` and, if given, a link to the next page.
pub fn listing_html(cards: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<a data-testid="page-next" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        "<html><body><ul>{}</ul><nav>{}</nav></body></html>",
        cards.concat(),
        next
    )
}

pub fn test_config(output: &std::path::Path) -> Config {
    let _ = env_logger::builder().is_test(true).try_init();
    Config {
        load_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(5),
        scroll_pause: Duration::from_millis(1),
        output_path: output.to_owned(),
        ..Config::default()
    }
}
