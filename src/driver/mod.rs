use async_trait::async_trait;
use serde_json::Value;

use crate::error::DriverError;

pub mod chrome;
pub mod wait;

pub use chrome::ChromeSession;

/// Browser automation interface used by the crawler.
///
/// Element lookups take CSS selectors. `find` and `find_in` return
/// [`DriverError::NotFound`] when nothing matches so callers can tell an
/// absent element apart from a broken session.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Handle to an element on the current page.
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// All elements matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    async fn find(&self, selector: &str) -> Result<Self::Element, DriverError>;

    /// First descendant of `parent` matching `selector`.
    async fn find_in(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Self::Element, DriverError>;

    /// Evaluates `script` as a JavaScript expression and returns its value.
    /// An `undefined` result is returned as `null`.
    async fn execute_script(&self, script: &str) -> Result<Value, DriverError>;

    /// Moves the pointer over `element`.
    async fn hover(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;
}

/// Finds an optional element, mapping "not found" to `None`.
pub async fn find_optional<D: Driver + ?Sized>(
    driver: &D,
    parent: &D::Element,
    selector: &str,
) -> Result<Option<D::Element>, DriverError> {
    match driver.find_in(parent, selector).await {
        Ok(el) => Ok(Some(el)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads a numeric script result such as `window.innerHeight`.
pub async fn script_u64<D: Driver + ?Sized>(driver: &D, script: &str) -> Result<u64, DriverError> {
    let value = driver.execute_script(script).await?;
    value
        .as_f64()
        .filter(|x| x.is_finite() && *x >= 0.0)
        .map(|x| x as u64)
        .ok_or_else(|| DriverError::UnexpectedValue(format!("`{}` returned {}", script, value)))
}
