//! Visible-text extraction from HTML pages.

use scraper::{ElementRef, Html};

/// Tags whose content is never visible text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    if SKIPPED_TAGS.contains(&el.value().name()) {
        return;
    }
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            collect_text(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Strip script/style/noscript and collapse whitespace.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    collect_text(doc.root_element(), &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
