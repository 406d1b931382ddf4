//! Position index over the inline verse markers of a text, e.g.
//! `[[@Bible:Joh 3:16]]` or a bare `@Bible:요 3:16`.
//!
//! The text is scanned once. Book tokens are normalized to canonical codes so
//! that `@Bible:John 3:16` and `@Bible:요 3:16` land under the same key. Tokens
//! that don't resolve are kept under their raw spelling.

use std::collections::HashMap;

use regex::Regex;
use lazy_static::lazy_static;

use crate::book_aliases::AliasTable;
use crate::types::TagIndexEntry;

lazy_static! {
    /// One verse marker, with its optional `[[ ]]` brackets and an optional
    /// trailing cross-reference `[[3:16 >> Joh 3:16]]`.
    pub static ref RE_VERSE_MARKER: Regex = Regex::new(
        r"(?i)(?:\[\[\s*)?@Bible:([A-Za-z가-힣0-9]+)\s*(\d+):(\d+)(?:\s*\]\])?(?:\s*\[\[\d+:\d+\s*>>\s*[A-Za-z가-힣0-9]+\s*\d+:\d+\s*\]\])?"
    ).unwrap();
}

/// A verse marker found in the text, with its book already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub book: String,
    pub chapter: String,
    pub verse: String,
    pub start: usize,
    pub end: usize,
}

impl Marker {
    pub fn is_at(&self, book: &str, chapter: &str, verse: &str) -> bool {
        self.book == book && self.chapter == chapter && self.verse == verse
    }
}

/// The verse number after `verse`, or None for a token that isn't a number.
fn following_verse(verse: &str) -> Option<String> {
    let n = verse.parse::<u32>().ok()?;
    n.checked_add(1).map(|v| v.to_string())
}

/// Canonical code for a marker's book token, or the token itself.
pub fn normalize_marker_book(raw: &str, aliases: &AliasTable) -> String {
    let raw = raw.trim();
    match aliases.get(&raw.to_lowercase()) {
        Some(book) => book.code().to_string(),
        None => raw.to_string(),
    }
}

/// All verse markers in text order.
pub fn scan_markers(text: &str, aliases: &AliasTable) -> Vec<Marker> {
    RE_VERSE_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            Some(Marker {
                book: normalize_marker_book(&caps[1], aliases),
                chapter: caps[2].to_string(),
                verse: caps[3].to_string(),
                start: m.start(),
                end: m.end(),
            })
        })
        .collect()
}

/// Text window of a verse: from the end of its first marker to the start of
/// the first marker for the following verse of the same book and chapter that
/// lies after it, else to the end of the text. Markers of other books, other
/// chapters or later verses inside the window are part of the passage.
///
/// `markers` must be in text order.
pub fn verse_window(
    markers: &[Marker],
    text_len: usize,
    book: &str,
    chapter: &str,
    verse: &str,
) -> Option<(usize, usize)> {
    let first = markers.iter().find(|m| m.is_at(book, chapter, verse))?;
    let end = following_verse(verse)
        .and_then(|next| {
            markers
                .iter()
                .filter(|m| m.is_at(book, chapter, &next))
                .map(|m| m.start)
                .find(|&start| start >= first.end)
        })
        .unwrap_or(text_len);
    Some((first.end, end))
}

#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    text_len: usize,
    markers: Vec<Marker>,
    by_book: HashMap<String, Vec<TagIndexEntry>>,
    // (book, chapter, verse) -> marker indexes in text order
    positions: HashMap<(String, String, String), Vec<usize>>,
}

impl TagIndex {
    pub fn build(text: &str, aliases: &AliasTable) -> Self {
        let markers = scan_markers(text, aliases);

        let mut by_book: HashMap<String, Vec<TagIndexEntry>> = HashMap::new();
        let mut positions: HashMap<(String, String, String), Vec<usize>> = HashMap::new();

        for (idx, m) in markers.iter().enumerate() {
            by_book.entry(m.book.clone()).or_default().push(TagIndexEntry {
                start: m.start,
                end: m.end,
                chapter: m.chapter.clone(),
                verse: m.verse.clone(),
            });
            positions
                .entry((m.book.clone(), m.chapter.clone(), m.verse.clone()))
                .or_default()
                .push(idx);
        }

        TagIndex {
            text_len: text.len(),
            markers,
            by_book,
            positions,
        }
    }

    /// Entries of one book in scan order. Empty if the book has no markers.
    pub fn entries(&self, book: &str) -> &[TagIndexEntry] {
        self.by_book.get(book).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn books(&self) -> impl Iterator<Item = &String> {
        self.by_book.keys()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Same window as `verse_window()`, from the position map.
    pub fn window(&self, book: &str, chapter: &str, verse: &str) -> Option<(usize, usize)> {
        let key = (book.to_string(), chapter.to_string(), verse.to_string());
        let &idx = self.positions.get(&key)?.first()?;
        let start = self.markers[idx].end;

        let end = following_verse(verse)
            .and_then(|next| self.positions.get(&(book.to_string(), chapter.to_string(), next)))
            .and_then(|idxs| idxs.iter().map(|&i| self.markers[i].start).find(|&s| s >= start))
            .unwrap_or(self.text_len);
        Some((start, end))
    }
}
