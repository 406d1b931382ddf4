use regex::Regex;
use lazy_static::lazy_static;

use crate::book_aliases::AliasTable;
use crate::types::{BookCode, RefMode, Reference};

lazy_static! {
    static ref RE_BOOK_TOKEN: Regex = Regex::new(r"^[가-힣a-zA-Z0-9]+").unwrap();
}

/// Resolve the book part of user input: the leading run of Hangul, Latin
/// letters and digits (`1Cor` of `1Cor 13`), else the whole trimmed input.
/// Lookup is on the lower-cased key.
pub fn resolve_book(book_input: &str, aliases: &AliasTable) -> Option<BookCode> {
    let normalized = book_input.trim();
    let key = match RE_BOOK_TOKEN.find(normalized) {
        Some(m) => m.as_str(),
        None => normalized,
    };
    aliases.get(&key.to_lowercase())
}

/// Most verses a range expands to, the length of the longest chapter (Psalm 119).
pub const MAX_RANGE_VERSES: u32 = 176;

/// Expand a verse range like `26-27` into `["26", "27"]`.
///
/// Anything that isn't exactly two integers with start <= end, spanning at most
/// `MAX_RANGE_VERSES`, travels on as one opaque token, e.g. `abc-def` or `5-3`.
pub fn parse_verses(verse_input: &str) -> Vec<String> {
    let verse_input = verse_input.trim();
    if !verse_input.contains('-') {
        return vec![verse_input.to_string()];
    }

    let parts: Vec<&str> = verse_input.split('-').collect();
    if let [start, end] = parts.as_slice() {
        if let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>()) {
            if start <= end && end - start < MAX_RANGE_VERSES {
                return (start..=end).map(|v| v.to_string()).collect();
            }
        }
    }

    vec![verse_input.to_string()]
}

/// Parse (book, chapter, verse) as typed by the user. Returns None when the
/// book doesn't resolve, the only failure.
pub fn parse_reference(
    book_input: &str,
    chapter_input: &str,
    verse_input: &str,
    aliases: &AliasTable,
) -> Option<Reference> {
    let book = resolve_book(book_input, aliases)?;
    let chapter = chapter_input.trim().to_string();
    let verse_input = verse_input.trim();

    Some(Reference {
        book,
        mode: RefMode::derive(&chapter, verse_input),
        verses: parse_verses(verse_input),
        chapter,
    })
}
