use itertools::Itertools;
use scraper::{ElementRef, Selector};

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// Full text content of a fragment, like the DOM's `textContent`.
pub fn text_content(fragment: &ElementRef<'_>) -> String {
    fragment.text().collect()
}

/// Text of the first nested element matching `label_marker`.
pub fn label_text(fragment: &ElementRef<'_>, label_marker: &Selector) -> Option<String> {
    fragment
        .select(label_marker)
        .next()
        .map(|label| text_content(&label))
}

/// Reads the value of a label/value fragment by removing the label's text
/// from the fragment's text. Only the first occurrence of the label is
/// removed, so a value that repeats its own label verbatim keeps the repeat.
///
/// Returns `None` when nothing is left after the label.
pub fn extract_value(fragment: &ElementRef<'_>, label_marker: &Selector) -> Option<String> {
    let full = text_content(fragment);
    let without_label = match label_text(fragment, label_marker) {
        Some(label) if !label.is_empty() => full.replacen(&label, "", 1),
        _ => full,
    };

    let value = without_label
        .trim()
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let value = normalize_text(value);

    match value.is_empty() {
        true => None,
        false => Some(value),
    }
}
