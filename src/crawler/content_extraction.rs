//! Content extraction functionality for the crawler module
//!
//! Knowledge-base pages do not share one layout, so the article body is found
//! with an ordered list of region strategies. The first region whose text is
//! long enough wins; images are collected from the first region that exists.

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

/// Extracted text must be longer than this many characters to count
pub const MIN_CONTENT_CHARS: usize = 100;

/// Subtrees that never contribute text or regions
const ALWAYS_EXCLUDED: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Page chrome that disqualifies an image
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Ancestors accepted as the container of the article heading
const CONTAINER_TAGS: &[&str] = &["div", "main", "article", "section"];

/// Image URL fragments that mark icons, logos and layout spacers
const DECORATION_KEYWORDS: &[&str] = &[
    "icon",
    "logo",
    "arrow",
    "spacer",
    "pixel.gif",
    "1x1",
    "blank.gif",
];

/// Images declaring a smaller width or height are treated as icons
const MIN_IMAGE_DIMENSION: u32 = 50;

/// A named way of locating the article region in a page
pub struct Strategy {
    /// Name used in logs
    pub name: &'static str,

    /// Find the region, if the page has one
    pub locate: fn(&Html) -> Option<ElementRef<'_>>,

    /// Subtrees inside the region that are left out of the text
    pub excluded: fn(&ElementRef<'_>) -> bool,
}

impl Strategy {
    /// Text of the located region, regardless of its length
    pub fn text(&self, document: &Html) -> Option<String> {
        (self.locate)(document).map(|region| collect_text(region, self.excluded))
    }
}

/// Region strategies in the order they are tried
pub const STRATEGIES: [Strategy; 4] = [
    Strategy {
        name: "heading_container",
        locate: heading_container,
        excluded: excluded_with_menus,
    },
    Strategy {
        name: "content_block",
        locate: content_block,
        excluded: excluded_always,
    },
    Strategy {
        name: "wrapper",
        locate: wrapper,
        excluded: excluded_with_chrome,
    },
    Strategy {
        name: "main_element",
        locate: main_element,
        excluded: excluded_always,
    },
];

/// Extract the article text from a page
///
/// Returns an empty string when no strategy yields more than
/// [`MIN_CONTENT_CHARS`] characters; such pages are not articles.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for strategy in &STRATEGIES {
        if let Some(text) = strategy.text(&document) {
            if text.chars().count() > MIN_CONTENT_CHARS {
                debug!("Article text found by {} strategy", strategy.name);
                return text;
            }
        }
    }

    String::new()
}

/// Extract the absolute URLs of the content images of an article page
///
/// Root-relative sources and sources with an `images` path segment resolve
/// against `site_root`, not the article URL: the site serves its images from
/// the root while article pages live several segments deep.
pub fn extract_images(html: &str, article_url: &str, site_root: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let region = STRATEGIES
        .iter()
        .find_map(|strategy| (strategy.locate)(&document))
        .unwrap_or_else(|| document.root_element());

    let mut images: Vec<String> = Vec::new();
    for img in region
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "img")
    {
        let attrs = img.value();
        let Some(src) = attrs
            .attr("src")
            .filter(|src| !src.is_empty())
            .or_else(|| attrs.attr("data-src"))
            .filter(|src| !src.is_empty())
        else {
            continue;
        };

        let lowered = src.to_lowercase();
        if DECORATION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
            continue;
        }
        if has_ancestor(&img, CHROME_TAGS) {
            continue;
        }
        if is_small(attrs.attr("width")) || is_small(attrs.attr("height")) {
            continue;
        }

        if let Some(url) = resolve_image_url(src, article_url, site_root) {
            if !images.contains(&url) {
                images.push(url);
            }
        }
    }

    images
}

/// Resolve an image source to an absolute URL
pub fn resolve_image_url(src: &str, article_url: &str, site_root: &Url) -> Option<String> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }

    let resolved = if src.starts_with('/') {
        site_root.join(src)
    } else if src.starts_with("images/") {
        site_root.join(&format!("/{}", src))
    } else if src.contains("/images/") {
        site_root.join(&format!("/{}", src.trim_start_matches('/')))
    } else {
        Url::parse(article_url).and_then(|base| base.join(src))
    };

    resolved.ok().map(String::from)
}

fn is_small(dimension: Option<&str>) -> bool {
    match dimension {
        Some(value) if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => value
            .parse::<u32>()
            .map(|size| size < MIN_IMAGE_DIMENSION)
            .unwrap_or(false),
        _ => false,
    }
}

fn has_ancestor(element: &ElementRef<'_>, tags: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| tags.contains(&ancestor.value().name()))
}

/// Elements outside script, style and page chrome subtrees, in document order
fn visible_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| !excluded_always(el) && !has_ancestor(el, ALWAYS_EXCLUDED))
}

fn heading_container(document: &Html) -> Option<ElementRef<'_>> {
    let heading = visible_elements(document).find(|el| el.value().name() == "h2")?;
    heading
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| CONTAINER_TAGS.contains(&ancestor.value().name()))
}

fn content_block(document: &Html) -> Option<ElementRef<'_>> {
    visible_elements(document).find(|el| {
        el.value().name() == "div"
            && [el.value().attr("class"), el.value().attr("id")]
                .into_iter()
                .flatten()
                .map(str::to_lowercase)
                .any(|value| value.contains("content") || value.contains("article"))
    })
}

fn wrapper(document: &Html) -> Option<ElementRef<'_>> {
    visible_elements(document)
        .find(|el| el.value().name() == "div" && el.value().attr("id") == Some("wrapper"))
}

fn main_element(document: &Html) -> Option<ElementRef<'_>> {
    visible_elements(document).find(|el| el.value().name() == "main")
}

fn excluded_always(element: &ElementRef<'_>) -> bool {
    ALWAYS_EXCLUDED.contains(&element.value().name())
}

// Menus nested next to the heading are lists or navs tagged nav/menu.
fn excluded_with_menus(element: &ElementRef<'_>) -> bool {
    if excluded_always(element) {
        return true;
    }
    let name = element.value().name();
    (name == "nav" || name == "ul")
        && element
            .value()
            .attr("class")
            .map(str::to_lowercase)
            .is_some_and(|class| class.contains("nav") || class.contains("menu"))
}

fn excluded_with_chrome(element: &ElementRef<'_>) -> bool {
    excluded_always(element) || CHROME_TAGS.contains(&element.value().name())
}

/// Trimmed, non-empty text nodes of `root` joined by newlines
fn collect_text(root: ElementRef<'_>, excluded: fn(&ElementRef<'_>) -> bool) -> String {
    let mut parts = Vec::new();
    push_text(root, excluded, &mut parts);
    parts.join("\n")
}

fn push_text<'a>(
    element: ElementRef<'a>,
    excluded: fn(&ElementRef<'_>) -> bool,
    parts: &mut Vec<&'a str>,
) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !excluded(&child_element) {
                push_text(child_element, excluded, parts);
            }
        }
    }
}
