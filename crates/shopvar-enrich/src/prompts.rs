//! Prompt text and response parsing for each enrichment mode.

use std::collections::HashSet;

/// First sentence of `text`, without its terminating period.
#[must_use]
pub fn first_sentence(text: &str) -> String {
    text.split_once('.')
        .map_or(text, |(first, _)| first)
        .trim()
        .to_string()
}

#[must_use]
pub fn tags_prompt(text: &str) -> String {
    format!(
        "Extract 5 relevant product tags from this text.\n\
         Return only tags as comma-separated list.\n\n\
         Text: {text}\n\n\
         Tags:"
    )
}

#[must_use]
pub fn rewrite_prompt(title: &str, description: &str) -> String {
    format!(
        "You are a Shopify copywriter. Rewrite this product description to be engaging and clear.\n\
         Then provide 5 comma-separated tags.\n\n\
         Product: {title}\n\
         Original: {description}\n\n\
         Respond with:\n\
         Line 1: Enhanced description\n\
         Line 2: tag1,tag2,tag3,tag4,tag5"
    )
}

/// Splits a model's tag answer into clean tags.
///
/// Accepts commas or newlines as separators, strips bullets, `#` and quotes,
/// and drops case-insensitive duplicates (first spelling kept).
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    let raw = strip_label(raw.trim(), &["Line 2:", "Tags:"]);
    let mut seen = HashSet::new();
    raw.split([',', '\n'])
        .map(|t| {
            t.trim()
                .trim_start_matches(['-', '*', '•', '#'])
                .trim_matches(['"', '\'', '`'])
                .trim()
        })
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Splits a rewrite answer into description (first line) and tags (rest).
#[must_use]
pub fn parse_rewrite(raw: &str) -> (String, Vec<String>) {
    let raw = raw.trim();
    match raw.split_once('\n') {
        Some((first, rest)) => (
            strip_label(first.trim(), &["Line 1:"]).trim().to_string(),
            parse_tags(rest),
        ),
        None => (strip_label(raw, &["Line 1:"]).trim().to_string(), Vec::new()),
    }
}

fn strip_label<'a>(text: &'a str, labels: &[&str]) -> &'a str {
    labels
        .iter()
        .find_map(|label| {
            text.get(..label.len())
                .filter(|head| head.eq_ignore_ascii_case(label))
                .map(|_| &text[label.len()..])
        })
        .unwrap_or(text)
}
