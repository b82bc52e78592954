//! Plain-text extraction from fetched pages

use scraper::Html;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Text extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    /// Set when the text was cut to the character limit
    pub truncated: bool,
}

/// Extract visible text from an HTML document
///
/// Text nodes outside script-like elements are collected and all runs of
/// whitespace collapse to single spaces. Nothing in the document is
/// executed or followed.
pub fn extract_html(html: &str, max_chars: usize) -> Extracted {
    let document = Html::parse_document(html);

    let words: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let skipped = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |el| SKIPPED_ELEMENTS.contains(&el.name()))
            });
            (!skipped).then_some(&**text)
        })
        .flat_map(str::split_whitespace)
        .collect();

    bounded(words.join(" "), max_chars)
}

/// Normalize whitespace of a plain-text body
pub fn extract_plain(text: &str, max_chars: usize) -> Extracted {
    bounded(text.split_whitespace().collect::<Vec<_>>().join(" "), max_chars)
}

fn bounded(text: String, max_chars: usize) -> Extracted {
    let (cut, truncated) = truncate_chars(&text, max_chars);
    if truncated {
        Extracted {
            text: cut.to_string(),
            truncated,
        }
    } else {
        Extracted { text, truncated }
    }
}

/// Cut `text` to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
