//! Raw document input: full text plus a char-offset → page-number map.
//!
//! Text extraction (PDF decoding, OCR, layout) happens upstream. This module
//! only fixes the contract the analysis pipeline consumes. Scanners work on
//! UTF-8 byte offsets internally; every offset that leaves the pipeline is a
//! character offset, converted through [`OffsetIndex`].

use serde::{Deserialize, Serialize};

use crate::error::{PaperlensError, Result};

/// Start of a page, as a character offset into the full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreak {
    pub offset: usize,
    pub page: u32,
}

/// Sorted page starts. Offsets before the first break belong to the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMap {
    breaks: Vec<PageBreak>,
}

impl PageMap {
    pub fn single_page() -> Self {
        Self { breaks: vec![PageBreak { offset: 0, page: 1 }] }
    }

    /// Build from explicit breaks. Offsets must be strictly increasing and
    /// pages positive.
    pub fn from_breaks(breaks: Vec<PageBreak>) -> Result<Self> {
        if breaks.is_empty() {
            return Ok(Self::single_page());
        }
        for pair in breaks.windows(2) {
            if pair[1].offset <= pair[0].offset {
                return Err(PaperlensError::InvalidInput(format!(
                    "page break offsets must be strictly increasing ({} then {})",
                    pair[0].offset, pair[1].offset
                )));
            }
        }
        if let Some(bad) = breaks.iter().find(|b| b.page == 0) {
            return Err(PaperlensError::InvalidInput(format!(
                "page numbers start at 1 (break at offset {} has page 0)",
                bad.offset
            )));
        }
        Ok(Self { breaks })
    }

    /// Page number for a character offset.
    pub fn page_at(&self, char_offset: usize) -> u32 {
        let idx = self.breaks.partition_point(|b| b.offset <= char_offset);
        match idx {
            0 => self.breaks.first().map(|b| b.page).unwrap_or(1),
            n => self.breaks[n - 1].page,
        }
    }

    pub fn page_count(&self) -> usize {
        self.breaks.len().max(1)
    }

    pub fn breaks(&self) -> &[PageBreak] {
        &self.breaks
    }
}

const CHECKPOINT_STRIDE: usize = 64;

/// Byte offset → char offset conversion with sparse checkpoints.
#[derive(Debug, Clone, Default)]
pub struct OffsetIndex {
    ascii: bool,
    /// Byte offset of every `CHECKPOINT_STRIDE`-th character.
    checkpoints: Vec<usize>,
}

impl OffsetIndex {
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self { ascii: true, checkpoints: Vec::new() };
        }
        let checkpoints = text
            .char_indices()
            .step_by(CHECKPOINT_STRIDE)
            .map(|(byte, _)| byte)
            .collect();
        Self { ascii: false, checkpoints }
    }

    /// Character offset of `byte` in `text`. `byte` is clamped to the text
    /// length and rounded down to a char boundary.
    pub fn char_offset(&self, text: &str, byte: usize) -> usize {
        let mut byte = byte.min(text.len());
        if self.ascii {
            return byte;
        }
        while !text.is_char_boundary(byte) {
            byte -= 1;
        }
        let idx = self.checkpoints.partition_point(|&b| b <= byte);
        if idx == 0 {
            return text[..byte].chars().count();
        }
        let base = self.checkpoints[idx - 1];
        (idx - 1) * CHECKPOINT_STRIDE + text[base..byte].chars().count()
    }
}

/// Full document text with its page map.
#[derive(Debug, Clone)]
pub struct RawDocument {
    text: String,
    pages: PageMap,
    index: OffsetIndex,
    char_count: usize,
}

impl RawDocument {
    /// Single-page document.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::assemble(text, PageMap::single_page())
    }

    /// Join per-page texts with `\n`; page numbers are 1-based.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let mut text = String::new();
        let mut breaks = Vec::with_capacity(pages.len());
        let mut offset = 0usize;
        for (i, page) in pages.iter().enumerate() {
            let page = page.as_ref();
            if i > 0 {
                text.push('\n');
                offset += 1;
            }
            breaks.push(PageBreak { offset, page: i as u32 + 1 });
            text.push_str(page);
            offset += page.chars().count();
        }
        let pages = if breaks.is_empty() {
            PageMap::single_page()
        } else {
            PageMap { breaks }
        };
        Self::assemble(text, pages)
    }

    /// Full text plus explicit page breaks, as supplied by an extractor that
    /// already tracks page offsets.
    pub fn with_page_breaks(text: impl Into<String>, breaks: Vec<PageBreak>) -> Result<Self> {
        let text = text.into();
        let pages = PageMap::from_breaks(breaks)?;
        let char_count = text.chars().count();
        if let Some(last) = pages.breaks().last() {
            if last.offset > char_count {
                return Err(PaperlensError::InvalidInput(format!(
                    "page break at offset {} lies beyond the end of the text ({} chars)",
                    last.offset, char_count
                )));
            }
        }
        Ok(Self::assemble(text, pages))
    }

    fn assemble(text: String, pages: PageMap) -> Self {
        let index = OffsetIndex::new(&text);
        let char_count = if text.is_ascii() { text.len() } else { text.chars().count() };
        Self { text, pages, index, char_count }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pages(&self) -> &PageMap {
        &self.pages
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    /// Convert a byte offset into `text()` to a char offset.
    pub fn char_offset(&self, byte: usize) -> usize {
        self.index.char_offset(&self.text, byte)
    }

    /// Page number for a byte offset into `text()`.
    pub fn page_at_byte(&self, byte: usize) -> u32 {
        self.pages.page_at(self.char_offset(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pages_tracks_page_starts() {
        let doc = RawDocument::from_pages(&["alpha", "beta", "gamma"]);
        assert_eq!(doc.text(), "alpha\nbeta\ngamma");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.pages().page_at(0), 1);
        assert_eq!(doc.pages().page_at(5), 1);
        assert_eq!(doc.pages().page_at(6), 2);
        assert_eq!(doc.pages().page_at(11), 3);
        assert_eq!(doc.pages().page_at(10_000), 3);
    }

    #[test]
    fn test_char_offsets_for_multibyte_text() {
        let text = "é".repeat(200) + "x";
        let doc = RawDocument::from_text(text.clone());
        let byte = text.find('x').unwrap();
        assert_eq!(byte, 400);
        assert_eq!(doc.char_offset(byte), 200);
        assert_eq!(doc.char_count(), 201);
    }

    #[test]
    fn test_char_offset_rounds_down_inside_char() {
        let doc = RawDocument::from_text("aéb");
        assert_eq!(doc.char_offset(2), 1);
        assert_eq!(doc.char_offset(3), 2);
    }

    #[test]
    fn test_rejects_unsorted_breaks() {
        let breaks = vec![
            PageBreak { offset: 10, page: 1 },
            PageBreak { offset: 5, page: 2 },
        ];
        assert!(matches!(
            RawDocument::with_page_breaks("x".repeat(20), breaks),
            Err(PaperlensError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_break_past_end() {
        let breaks = vec![
            PageBreak { offset: 0, page: 1 },
            PageBreak { offset: 50, page: 2 },
        ];
        assert!(RawDocument::with_page_breaks("short", breaks).is_err());
    }

    #[test]
    fn test_empty_page_keeps_its_number() {
        let doc = RawDocument::from_pages(&["", "content"]);
        assert_eq!(doc.text(), "\ncontent");
        assert_eq!(doc.pages().page_at(0), 1);
        assert_eq!(doc.pages().page_at(1), 2);
    }
}
