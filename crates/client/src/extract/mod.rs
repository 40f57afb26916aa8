//! Title extraction from HTML documents.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Title reported for pages without a usable `<title>` element.
pub const NO_TITLE: &str = "No title found";

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));

/// Text of the first `<title>` element, trimmed.
///
/// Returns `None` when the document has no title element or the first one
/// is blank. Parsing is lenient and never fails.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(&TITLE).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();

    if text.is_empty() { None } else { Some(text.to_string()) }
}

/// Title of the page, or [`NO_TITLE`] when it has none.
pub fn title_or_sentinel(html: &str) -> String {
    extract_title(html).unwrap_or_else(|| NO_TITLE.to_string())
}
