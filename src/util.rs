use sha2::{Digest, Sha256};
use url::Url;

use crate::record::{NO_ID_FOUND, SIZES_NOT_AVAILABLE};

/// Length of a variant id in hex characters.
pub const SHORT_HASH_LEN: usize = 10;

const ITEM_PAGE_SUFFIX: &str = ".aspx";
const SIZE_DELIMITER: &str = ", ";

/// Join base url with another (possibly relative) url.
///
/// Returns `url` unchanged when either side cannot be parsed.
pub fn join_url(current_url: &str, url: &str) -> String {
    match Url::parse(current_url).and_then(|base| base.join(url)) {
        Ok(u) => u.to_string(),
        Err(_) => url.to_owned(),
    }
}

/// Deterministic variant id for `(group_id, size)`: the first
/// [`SHORT_HASH_LEN`] lowercase hex digits of a digest over
/// `"{group_id}_{size}"`.
pub fn short_hash(group_id: &str, size: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}", group_id, size).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(SHORT_HASH_LEN);
    id
}

/// Extracts the product group id from an item identifier such as
/// `https://example.com/shopping/women/12345-dress.aspx`.
///
/// The last path segment is stripped of its `.aspx` suffix and every digit
/// run in it is concatenated. Falls back to [`NO_ID_FOUND`].
pub fn parse_group_id(item_id: Option<&str>) -> String {
    let item_id = match item_id {
        Some(x) => x,
        None => return NO_ID_FOUND.to_owned(),
    };
    let token = item_id.rsplit('/').next().unwrap_or(item_id);
    let token = match token.find(ITEM_PAGE_SUFFIX) {
        Some(idx) => &token[..idx],
        None => token,
    };
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        NO_ID_FOUND.to_owned()
    } else {
        digits
    }
}

/// `"$1,234.50"` -> `"1234.50"`
pub fn normalize_price(text: &str) -> String {
    text.trim()
        .trim_matches('$')
        .trim()
        .replace(',', "")
}

/// Splits an advertised sizes list into tokens.
///
/// Tokens are trimmed and de-duplicated keeping the first occurrence. An empty
/// list yields the single [`SIZES_NOT_AVAILABLE`] token.
pub fn split_sizes(text: &str) -> Vec<String> {
    let mut sizes: Vec<String> = vec![];
    for token in text.split(SIZE_DELIMITER) {
        let token = token.trim();
        if token.is_empty() || sizes.iter().any(|s| s == token) {
            continue;
        }
        sizes.push(token.to_owned());
    }
    if sizes.is_empty() {
        sizes.push(SIZES_NOT_AVAILABLE.to_owned());
    }
    sizes
}
