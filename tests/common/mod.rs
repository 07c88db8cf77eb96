//! Shared test helpers.

use tipsim::Page;

/// Build a page from markup fragments, panicking on bad markup.
#[allow(dead_code)]
pub fn page(markup: &str) -> Page {
    Page::from_markup(markup).expect("Failed to parse test markup")
}

/// Hover an element and run out the standard 100ms show delay.
#[allow(dead_code)]
pub fn hover_and_wait(page: &mut Page, selector: &str) {
    page.hover(selector).expect("Failed to hover");
    page.advance_ms(100);
}
