/// Group id used when a card carries no numeric item identifier.
pub const NO_ID_FOUND: &str = "No ID Found";

/// Size used when a card doesn't advertise any sizes.
pub const SIZES_NOT_AVAILABLE: &str = "Sizes not available";

/// Fixed attributes of the catalog segment being crawled. None of these are
/// read from the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSegment {
    pub gender: String,
    pub availability: String,
    pub product_type: String,
    pub google_product_category: String,
}

impl Default for CatalogSegment {
    fn default() -> Self {
        Self {
            gender: "Female".to_owned(),
            availability: "In Stock".to_owned(),
            product_type: "Women Home > Clothing > Dresses".to_owned(),
            google_product_category: "2271".to_owned(),
        }
    }
}

/// One size-specific row of the feed.
///
/// Records are built once by the card extractor and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductVariantRecord {
    pub group_id: String,
    pub mpn: String,
    pub gtin: Option<String>,
    pub title: String,
    pub description: String,
    pub image_link: String,
    pub link: String,
    pub brand: String,
    /// Plain decimal, no currency symbol or thousands separators.
    pub price: String,
    pub variant_id: String,
    pub size: String,
    pub gender: String,
    pub availability: String,
    pub product_type: String,
    pub google_product_category: String,
}

impl ProductVariantRecord {
    pub const PRICE_FIELD: &'static str = "price";

    /// Feed field names and values in emission order.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 15] {
        [
            ("item_group_id", Some(self.group_id.as_str())),
            ("mpn", Some(self.mpn.as_str())),
            ("gtin", self.gtin.as_deref()),
            ("title", Some(self.title.as_str())),
            ("description", Some(self.description.as_str())),
            ("image_link", Some(self.image_link.as_str())),
            ("link", Some(self.link.as_str())),
            ("brand", Some(self.brand.as_str())),
            (Self::PRICE_FIELD, Some(self.price.as_str())),
            ("id", Some(self.variant_id.as_str())),
            ("size", Some(self.size.as_str())),
            ("gender", Some(self.gender.as_str())),
            ("availability", Some(self.availability.as_str())),
            ("product_type", Some(self.product_type.as_str())),
            ("google_product_category", Some(self.google_product_category.as_str())),
        ]
    }
}
