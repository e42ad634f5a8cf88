//! Input file loading.
//!
//! Accepted shapes:
//! - plain text, pages separated by form feeds (`\f`)
//! - JSON `{"pages": ["...", "..."]}`
//! - JSON `{"text": "...", "page_breaks": [{"offset": 0, "page": 1}]}`

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use paperlens_common::document::{PageBreak, RawDocument};

const PAGE_SEPARATOR: char = '\u{c}';

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Pages {
        pages: Vec<String>,
    },
    Text {
        text: String,
        #[serde(default)]
        page_breaks: Vec<PageBreak>,
    },
}

pub fn load_document(path: &Path) -> Result<RawDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(&content).with_context(|| format!("Invalid JSON document {}", path.display()))
    } else {
        Ok(parse_text(&content))
    }
}

pub fn parse_text(content: &str) -> RawDocument {
    if content.contains(PAGE_SEPARATOR) {
        let pages: Vec<&str> = content.split(PAGE_SEPARATOR).collect();
        RawDocument::from_pages(&pages)
    } else {
        RawDocument::from_text(content)
    }
}

pub fn parse_json(content: &str) -> Result<RawDocument> {
    let input: JsonInput = serde_json::from_str(content)?;
    let doc = match input {
        JsonInput::Pages { pages } => RawDocument::from_pages(&pages),
        JsonInput::Text { text, page_breaks } if page_breaks.is_empty() => RawDocument::from_text(text),
        JsonInput::Text { text, page_breaks } => RawDocument::with_page_breaks(text, page_breaks)?,
    };
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_form_feeds_split_pages() {
        let doc = parse_text("one\u{c}two\u{c}three");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_plain_text_is_one_page() {
        assert_eq!(parse_text("just text").page_count(), 1);
    }

    #[test]
    fn test_json_pages() {
        let doc = parse_json(r#"{"pages": ["a", "b"]}"#).unwrap();
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_json_text_with_breaks() {
        let doc = parse_json(
            r#"{"text": "first second", "page_breaks": [{"offset": 0, "page": 1}, {"offset": 6, "page": 2}]}"#,
        )
        .unwrap();
        assert_eq!(doc.pages().page_at(7), 2);
    }

    #[test]
    fn test_invalid_breaks_are_rejected() {
        let err = parse_json(r#"{"text": "abc", "page_breaks": [{"offset": 2, "page": 1}, {"offset": 1, "page": 2}]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_unrecognised_json_shape_is_rejected() {
        assert!(parse_json(r#"{"body": "abc"}"#).is_err());
    }
}
