//! Shared text utilities for the content pipeline.
//!
//! Everything here treats content as HTML-ish rich text: markup is noise
//! to be stripped before measuring words, hooks, or excerpts.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Strip markup, replacing each tag with a space so adjacent words do not
/// fuse together.
pub fn strip_markup(content: &str) -> String {
    TAG_RE.replace_all(content, " ").into_owned()
}

/// Count words in markup-stripped content.
pub fn word_count(content: &str) -> usize {
    strip_markup(content).split_whitespace().count()
}

/// The opening paragraph of the content, markup stripped and trimmed.
///
/// The paragraph boundary is the first closing `</p>`; plain-text drafts
/// fall back to the first blank line, and single-block content is taken
/// whole. Tags are removed without padding so the hook length reflects
/// only visible characters.
pub fn first_paragraph(content: &str) -> String {
    let head = match content.find("</p>") {
        Some(end) => &content[..end],
        None => match content.find("\n\n") {
            Some(end) => &content[..end],
            None => content,
        },
    };
    TAG_RE.replace_all(head, "").trim().to_string()
}

/// Derive a URL-safe slug from a title.
///
/// ASCII letters and digits are lowercased; every other run of characters
/// collapses to a single hyphen, with no leading or trailing hyphen. A
/// title with no ASCII alphanumerics yields an empty slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // swallow leading separators
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// First `max_chars` characters of markup-stripped, whitespace-collapsed
/// content.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let stripped = strip_markup(content);
    let mut collapsed = String::with_capacity(stripped.len());
    for word in stripped.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(word);
    }
    collapsed.chars().take(max_chars).collect()
}
