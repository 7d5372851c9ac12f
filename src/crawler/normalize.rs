//! URL normalization and URL-shape helpers
//!
//! The normalized form is the only identity key the crawler uses: two links
//! are the same page exactly when their normalized forms are equal.

use regex::Regex;
use std::sync::LazyLock;

static CATEGORY_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/category/\d+/([^/]+)\.html").expect("category slug pattern is valid")
});

static CATEGORY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/category/(\d+)/").expect("category id pattern is valid"));

/// Path marker of category listing pages
pub const CATEGORY_MARKER: &str = "/category/";

/// Path marker of article pages
pub const ARTICLE_MARKER: &str = "/content/";

/// Canonicalize a URL for identity comparison
///
/// Percent-escapes are decoded, query string and fragment are dropped,
/// leading and trailing path slashes are stripped and the whole result is
/// lower-cased. Tracking parameters therefore never create new identities.
///
/// # Examples
///
/// ```
/// use kbcrawl::crawler::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://KB.example/Category/21/Intro.html/?utm_source=x"),
///     "https://kb.example/category/21/intro.html"
/// );
/// ```
pub fn normalize_url(url: &str) -> String {
    let decoded = decode_fully(url);
    let without_fragment = decoded.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();

    // Split by hand: `Url` would re-encode the decoded string
    let (origin, path) = match without_query.split_once("://") {
        Some((scheme, rest)) => {
            let (netloc, path) = match rest.find('/') {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            (format!("{}://{}", scheme, netloc), path)
        }
        None => (String::new(), without_query),
    };

    let path = path.trim_matches('/');
    let normalized = if path.is_empty() {
        origin
    } else if origin.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", origin, path)
    };

    normalized.to_lowercase()
}

// Decoding until nothing changes keeps doubly-encoded input idempotent.
fn decode_fully(url: &str) -> String {
    let mut current = url.to_string();
    loop {
        let decoded = urlencoding::decode_binary(current.as_bytes());
        let next = String::from_utf8_lossy(&decoded).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Whether the URL points at a category listing page
pub fn is_category_url(url: &str) -> bool {
    url.contains(CATEGORY_MARKER)
}

/// Whether the URL points at an article page
pub fn is_article_url(url: &str) -> bool {
    url.contains(ARTICLE_MARKER)
}

/// Numeric category identifier embedded in the URL path, if any
pub fn category_id(url: &str) -> Option<u32> {
    CATEGORY_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// Derive a category name from its URL
///
/// `/category/8/ddd-cowis-backoffice.html` yields `ddd-cowis-backoffice`; a
/// category URL without a slug falls back to `category_<id>`, anything else
/// to `unknown`.
pub fn category_name(url: &str) -> String {
    if is_category_url(url) {
        if let Some(slug) = CATEGORY_SLUG.captures(url).and_then(|caps| caps.get(1)) {
            return slug.as_str().to_string();
        }
    }
    match CATEGORY_ID.captures(url).and_then(|caps| caps.get(1)) {
        Some(id) => format!("category_{}", id.as_str()),
        None => "unknown".to_string(),
    }
}
