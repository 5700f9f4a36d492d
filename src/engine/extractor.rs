use thiserror::Error;

use crate::config::Selectors;
use crate::driver::{find_optional, Driver};
use crate::error::DriverError;
use crate::record::{CatalogSegment, ProductVariantRecord, SIZES_NOT_AVAILABLE};
use crate::util;

/// A card field could not be read.
#[derive(Debug, Error)]
#[error("{field}: {source}")]
pub struct ExtractError {
    pub field: &'static str,
    #[source]
    pub source: DriverError,
}

trait FieldContext<T> {
    fn field(self, field: &'static str) -> Result<T, ExtractError>;
}

impl<T> FieldContext<T> for Result<T, DriverError> {
    fn field(self, field: &'static str) -> Result<T, ExtractError> {
        self.map_err(|source| ExtractError { field, source })
    }
}

/// Fields shared by every size variant of a card.
struct BaseProduct {
    group_id: String,
    title: String,
    image_link: String,
    link: String,
    brand: String,
    price: String,
}

/// Turns one product card into its size variants.
pub struct CardExtractor<'a> {
    selectors: &'a Selectors,
    segment: &'a CatalogSegment,
}

impl<'a> CardExtractor<'a> {
    pub fn new(selectors: &'a Selectors, segment: &'a CatalogSegment) -> Self {
        Self { selectors, segment }
    }

    /// Extracts one record per advertised size of `card`.
    ///
    /// Hovers the card before looking for the size list, which some listings
    /// only render on pointer-over. Relative links are resolved against
    /// `page_url`.
    pub async fn extract<D: Driver + ?Sized>(
        &self,
        driver: &D,
        card: &D::Element,
        page_url: &str,
    ) -> Result<Vec<ProductVariantRecord>, ExtractError> {
        let base = self.read_base(driver, card, page_url).await?;
        let sizes = self.read_sizes(driver, card).await?;

        let records = sizes
            .into_iter()
            .map(|size| ProductVariantRecord {
                group_id: base.group_id.clone(),
                mpn: base.group_id.clone(),
                gtin: None,
                title: base.title.clone(),
                description: base.title.clone(),
                image_link: base.image_link.clone(),
                link: base.link.clone(),
                brand: base.brand.clone(),
                price: base.price.clone(),
                variant_id: util::short_hash(&base.group_id, &size),
                size,
                gender: self.segment.gender.clone(),
                availability: self.segment.availability.clone(),
                product_type: self.segment.product_type.clone(),
                google_product_category: self.segment.google_product_category.clone(),
            })
            .collect();
        Ok(records)
    }

    async fn read_base<D: Driver + ?Sized>(
        &self,
        driver: &D,
        card: &D::Element,
        page_url: &str,
    ) -> Result<BaseProduct, ExtractError> {
        let sel = self.selectors;

        let item_id = match find_optional(driver, card, &sel.item_id_carrier).await.field("item id")? {
            Some(carrier) => driver
                .attribute(&carrier, &sel.item_id_attribute)
                .await
                .field("item id")?,
            None => None,
        };
        let group_id = util::parse_group_id(item_id.as_deref());

        let title = self.required_text(driver, card, &sel.description, "title").await?;

        let image = driver.find_in(card, &sel.image).await.field("image")?;
        let image_link = driver
            .attribute(&image, "src")
            .await
            .field("image")?
            .map(|src| util::join_url(page_url, &src))
            .unwrap_or_default();

        let link = driver.find_in(card, &sel.link).await.field("link")?;
        let link = driver
            .attribute(&link, "href")
            .await
            .field("link")?
            .map(|href| util::join_url(page_url, &href))
            .unwrap_or_default();

        let brand = self.required_text(driver, card, &sel.brand, "brand").await?;

        let price = match find_optional(driver, card, &sel.final_price).await.field("price")? {
            Some(el) => driver.text(&el).await.field("price")?,
            None => self.required_text(driver, card, &sel.price, "price").await?,
        };

        Ok(BaseProduct {
            group_id,
            title,
            image_link,
            link,
            brand,
            price: util::normalize_price(&price),
        })
    }

    async fn read_sizes<D: Driver + ?Sized>(
        &self,
        driver: &D,
        card: &D::Element,
    ) -> Result<Vec<String>, ExtractError> {
        let sel = self.selectors;
        match find_optional(driver, card, &sel.hover_target).await.field("hover target")? {
            Some(target) => driver.hover(&target).await.field("hover target")?,
            None => driver.hover(card).await.field("hover target")?,
        }

        match find_optional(driver, card, &sel.sizes).await.field("sizes")? {
            Some(el) => {
                let text = driver.text(&el).await.field("sizes")?;
                Ok(util::split_sizes(&text))
            }
            None => Ok(vec![SIZES_NOT_AVAILABLE.to_owned()]),
        }
    }

    async fn required_text<D: Driver + ?Sized>(
        &self,
        driver: &D,
        card: &D::Element,
        selector: &str,
        field: &'static str,
    ) -> Result<String, ExtractError> {
        let el = driver.find_in(card, selector).await.field(field)?;
        let text = driver.text(&el).await.field(field)?;
        Ok(text.trim().to_owned())
    }
}
