//! Passage extraction from marked-up text.
//!
//! Every extraction here is a text window that opens after one marker and closes
//! before another. `extract_windows()` is the single primitive; the intro and
//! verse lookups differ only in the marker patterns they pass to it.

use regex::{Captures, Regex};
use lazy_static::lazy_static;

use crate::book_aliases::AliasTable;
use crate::tag_index::{normalize_marker_book, scan_markers, verse_window, Marker, TagIndex, RE_VERSE_MARKER};
use crate::types::{BookCode, PassageMap};

lazy_static! {
    // [[@Bible:Joh 3]]
    static ref RE_BARE_CHAPTER_MARKER: Regex = Regex::new(
        r"(?i)\[\[\s*@Bible:([A-Za-z가-힣0-9]+)\s+(\d+)\s*\]\]"
    ).unwrap();

    // @Bible:Joh 0:0, 0:00 or 0 0
    static ref RE_BOOK_INTRO_MARKER: Regex = Regex::new(
        r"(?i)(?:\[\[\s*)?@Bible:([A-Za-z가-힣0-9]+)\s*(?:0:00?|0\s+0)\b(?:\s*\]\])?"
    ).unwrap();

    // @Bible:Joh 3:0
    static ref RE_CHAPTER_INTRO_MARKER: Regex = Regex::new(
        r"(?i)(?:\[\[\s*)?@Bible:([A-Za-z가-힣0-9]+)\s*(\d+):0\b(?:\s*\]\])?"
    ).unwrap();

    // Start of any marker, bare chapter or verse.
    static ref RE_ANY_MARKER_START: Regex = Regex::new(
        r"(?i)(?:\[\[\s*)?@Bible:[A-Za-z가-힣0-9]+\s*\d+"
    ).unwrap();

    // The target side of a cross-reference pair, not an intro.
    static ref RE_CROSS_REF_TAIL: Regex = Regex::new(r"^\s*>>").unwrap();
}

/// Where a window opens and where it closes.
pub struct WindowRule<'r> {
    pub open: &'r Regex,
    pub close: &'r Regex,
    /// An opening match directly followed by this doesn't open a window.
    pub reject_suffix: Option<&'r Regex>,
}

/// Content between an opening marker and the next closing marker.
#[derive(Debug)]
pub struct TextWindow<'t> {
    pub open: Captures<'t>,
    pub start: usize,
    pub end: usize,
}

impl<'t> TextWindow<'t> {
    pub fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Non-overlapping windows in text order. A window starts at the end of an
/// opening match and ends at the start of the first closing match after it,
/// or at the end of the text. The next opening match is searched from there.
pub fn extract_windows<'t>(text: &'t str, rule: &WindowRule) -> Vec<TextWindow<'t>> {
    let mut windows = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(open) = rule.open.captures_at(text, pos) else {
            break;
        };
        let Some(open_match) = open.get(0) else {
            break;
        };
        let start = open_match.end();
        pos = start.max(open_match.start() + 1);

        if let Some(reject) = rule.reject_suffix {
            if reject.is_match(&text[start..]) {
                continue;
            }
        }

        let end = rule.close.find_at(text, start).map(|m| m.start()).unwrap_or(text.len());
        pos = pos.max(end);
        windows.push(TextWindow { open, start, end });
    }

    windows
}

/// Text between the last verse marker before `anchor` and `anchor`, or
/// everything before `anchor` when no marker precedes it.
pub fn window_before(text: &str, anchor: usize) -> &str {
    let start = RE_VERSE_MARKER
        .find_iter(&text[..anchor])
        .last()
        .map(|m| m.end())
        .unwrap_or(0);
    &text[start..anchor]
}

fn insert_first(results: &mut PassageMap, heading: String, content: &str) {
    let content = content.trim();
    if content.is_empty() {
        return;
    }
    results.entry(heading).or_insert_with(|| content.to_string());
}

/// Alternation of the code and the curated aliases that still resolve to
/// `book`, escaped for a regex. An alias shadowed by another book's code or
/// short form (`jud` is Judges) would match that book's markers.
fn book_names_pattern(book: BookCode, aliases: &AliasTable) -> String {
    let names: Vec<String> = aliases
        .all_names(book)
        .iter()
        .filter(|n| aliases.resolve(n) == Some(book))
        .map(|n| regex::escape(n))
        .collect();
    format!("(?:{})", names.join("|"))
}

fn marker_regex(names: &str, coordinates: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?i)(?:\[\[\s*)?@Bible:{}\s*{}\b(?:\s*\]\])?",
        names, coordinates
    ))
    .ok()
}

/// Book and chapter introductions for the requested book.
///
/// Chapter `0` asks for the book introduction, verse `0` for the chapter
/// introduction. For any other verse the book introduction and bare chapter
/// marker introductions of the requested chapter are still included, since
/// they introduce the passage.
pub fn fetch_intro(
    text: &str,
    book: BookCode,
    chapter: &str,
    verse_input: &str,
    aliases: &AliasTable,
) -> PassageMap {
    let mut results = PassageMap::new();
    let code = book.code();

    let is_book = |raw: &str| normalize_marker_book(raw, aliases) == code;

    if verse_input != "0" {
        let bare_chapter = WindowRule {
            open: &RE_BARE_CHAPTER_MARKER,
            close: &RE_ANY_MARKER_START,
            reject_suffix: None,
        };
        for w in extract_windows(text, &bare_chapter) {
            if is_book(&w.open[1]) && &w.open[2] == chapter {
                insert_first(&mut results, format!("#### [{} {} (장 서론)]", code, chapter), w.content(text));
            }
        }

        let book_intro = WindowRule {
            open: &RE_BOOK_INTRO_MARKER,
            close: &RE_ANY_MARKER_START,
            reject_suffix: Some(&RE_CROSS_REF_TAIL),
        };
        for w in extract_windows(text, &book_intro) {
            if is_book(&w.open[1]) {
                insert_first(&mut results, format!("#### [{} 0:0 (서론)]", code), w.content(text));
            }
        }
    }

    let chapter_intro = WindowRule {
        open: &RE_CHAPTER_INTRO_MARKER,
        close: &RE_ANY_MARKER_START,
        reject_suffix: Some(&RE_CROSS_REF_TAIL),
    };
    for w in extract_windows(text, &chapter_intro) {
        if is_book(&w.open[1]) && &w.open[2] == chapter {
            insert_first(&mut results, format!("#### [{} {}:0 (장 서론)]", code, chapter), w.content(text));
        }
    }

    let names = book_names_pattern(book, aliases);

    if chapter == "0" {
        // Everything before the book's first verse, clipped to after the
        // previous book's last marker.
        if let Some(first_verse) = marker_regex(&names, "1:1").and_then(|re| re.find(text)) {
            insert_first(
                &mut results,
                format!("#### [{} 0:0 (서론)]", code),
                window_before(text, first_verse.start()),
            );
        }
    } else if verse_input == "0" {
        let chap = regex::escape(chapter);
        let start_re = Regex::new(&format!(
            r"(?i)\[\[\s*@Bible:{names}\s*{chap}\s*\]\]|(?:\[\[\s*)?@Bible:{names}\s*{chap}:0\b(?:\s*\]\])?"
        ))
        .ok();
        let end_re = marker_regex(&names, &format!("{}:1", chap));

        let start_match = start_re.as_ref().and_then(|re| re.find(text));
        let end_match = end_re.as_ref().and_then(|re| re.find(text));
        let heading = format!("#### [{} {}:0 (장 서론)]", code, chapter);

        match (start_match, end_match) {
            (Some(s), Some(e)) if s.start() < e.start() => {
                insert_first(&mut results, heading, &text[s.end()..e.start()]);
            }
            (_, Some(e)) => {
                insert_first(&mut results, heading, window_before(text, e.start()));
            }
            _ => {}
        }
    }

    results
}

fn verse_heading(book: BookCode, chapter: &str, verse: &str) -> String {
    format!("#### [{} {}:{}]", book.code(), chapter, verse)
}

/// Verse passages looked up in a prebuilt index.
pub fn fetch_verse_text_indexed(
    text: &str,
    index: &TagIndex,
    book: BookCode,
    chapter: &str,
    verses: &[String],
) -> PassageMap {
    let mut results = PassageMap::new();
    for verse in verses {
        if let Some((start, end)) = index.window(book.code(), chapter, verse) {
            insert_first(&mut results, verse_heading(book, chapter, verse), &text[start..end]);
        }
    }
    results
}

/// Verse passages from a fresh scan of the markers, without an index.
pub fn fetch_verse_text_scan(
    text: &str,
    book: BookCode,
    chapter: &str,
    verses: &[String],
    aliases: &AliasTable,
) -> PassageMap {
    let mut markers: Vec<Marker> = scan_markers(text, aliases);
    markers.sort_by_key(|m| m.start);

    let mut results = PassageMap::new();
    for verse in verses {
        if let Some((start, end)) = verse_window(&markers, text.len(), book.code(), chapter, verse) {
            insert_first(&mut results, verse_heading(book, chapter, verse), &text[start..end]);
        }
    }
    results
}

/// Verse passages for `verses` of the chapter. Both paths give the same map.
pub fn fetch_verse_text(
    text: &str,
    book: BookCode,
    chapter: &str,
    verses: &[String],
    aliases: &AliasTable,
    use_index: bool,
) -> PassageMap {
    if use_index {
        let index = TagIndex::build(text, aliases);
        fetch_verse_text_indexed(text, &index, book, chapter, verses)
    } else {
        fetch_verse_text_scan(text, book, chapter, verses, aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_aliases::get_alias_table;

    fn joh() -> BookCode {
        BookCode::from_code("Joh").unwrap()
    }

    #[test]
    fn test_extract_windows_non_overlapping() {
        let open = Regex::new(r"<(\w)>").unwrap();
        let close = Regex::new(r"</>").unwrap();
        let rule = WindowRule { open: &open, close: &close, reject_suffix: None };
        let text = "<a>one</> <b>two <c>three</>";
        let windows = extract_windows(text, &rule);
        let contents: Vec<&str> = windows.iter().map(|w| w.content(text)).collect();
        assert_eq!(contents, vec!["one", "two <c>three"]);
        assert_eq!(&windows[1].open[1], "b");
    }

    #[test]
    fn test_extract_windows_until_end() {
        let open = Regex::new(r"\[").unwrap();
        let close = Regex::new(r"\]").unwrap();
        let rule = WindowRule { open: &open, close: &close, reject_suffix: None };
        let windows = extract_windows("x [tail", &rule);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].content("x [tail"), "tail");
    }

    #[test]
    fn test_window_before() {
        let text = "[[@Bible:Gen 50:26]]Joseph died. Exodus intro [[@Bible:Exo 1:1]]";
        let anchor = text.find("[[@Bible:Exo").unwrap();
        assert_eq!(window_before(text, anchor).trim(), "Joseph died. Exodus intro");
        assert_eq!(window_before("intro only", 5), "intro");
    }

    #[test]
    fn test_verse_text_scenario() {
        let text = "[[@Bible:Joh 3:16]]For God so loved...[[@Bible:Joh 3:17]]For God sent...";
        let verses = vec!["16".to_string()];
        let map = fetch_verse_text(text, joh(), "3", &verses, get_alias_table(), true);
        assert_eq!(map.get("#### [Joh 3:16]").map(|s| s.as_str()), Some("For God so loved..."));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_chapter_intro_marker() {
        let text = "[[@Bible:Joh 3:0]] Nicodemus comes by night. [[@Bible:Joh 3:1]] There was a man";
        let map = fetch_intro(text, joh(), "3", "0", get_alias_table());
        assert_eq!(
            map.get("#### [Joh 3:0 (장 서론)]").map(|s| s.as_str()),
            Some("Nicodemus comes by night.")
        );
    }

    #[test]
    fn test_chapter_intro_fallback_before_first_verse() {
        let text = "[[@Bible:Joh 2:25]] end of two. Chapter three preface. [[@Bible:요 3:1]] There was";
        let map = fetch_intro(text, joh(), "3", "0", get_alias_table());
        assert_eq!(
            map.get("#### [Joh 3:0 (장 서론)]").map(|s| s.as_str()),
            Some("end of two. Chapter three preface.")
        );
    }

    #[test]
    fn test_bare_chapter_marker_intro() {
        let text = "[[@Bible:John 3]] About chapter three [[@Bible:Joh 3:1]] verse";
        let map = fetch_intro(text, joh(), "3", "1", get_alias_table());
        assert_eq!(
            map.get("#### [Joh 3 (장 서론)]").map(|s| s.as_str()),
            Some("About chapter three")
        );
        let other_chapter = fetch_intro(text, joh(), "4", "1", get_alias_table());
        assert!(other_chapter.is_empty());
    }

    #[test]
    fn test_book_intro_clipped_to_previous_book() {
        let text = "[[@Bible:Luk 24:53]] blessing God. Gospel of John intro. [[@Bible:Joh 1:1]] In the beginning";
        let map = fetch_intro(text, joh(), "0", "0", get_alias_table());
        assert_eq!(
            map.get("#### [Joh 0:0 (서론)]").map(|s| s.as_str()),
            Some("blessing God. Gospel of John intro.")
        );
    }

    #[test]
    fn test_book_intro_marker_window() {
        let text = "[[@Bible:Joh 0:0]] The fourth gospel. [[@Bible:Joh 1:1]] In the beginning";
        let map = fetch_intro(text, joh(), "1", "1", get_alias_table());
        assert_eq!(map.get("#### [Joh 0:0 (서론)]").map(|s| s.as_str()), Some("The fourth gospel."));
    }

    #[test]
    fn test_book_names_pattern_leaves_out_shadowed_aliases() {
        let aliases = get_alias_table();
        let jude = BookCode::from_code("Jude").unwrap();
        let re = Regex::new(&format!("^{}$", book_names_pattern(jude, aliases))).unwrap();
        assert!(re.is_match("jude"));
        assert!(re.is_match("유다서"));
        assert!(!re.is_match("jud"));
    }

    #[test]
    fn test_book_intro_not_anchored_on_judges() {
        let text = "[[@Bible:Jud 1:1]] Now after the death of Joshua. Letter of Jude intro. [[@Bible:Jude 1:1]] Jude, the servant";
        let jude = BookCode::from_code("Jude").unwrap();
        let map = fetch_intro(text, jude, "0", "0", get_alias_table());
        assert_eq!(
            map.get("#### [Jude 0:0 (서론)]").map(|s| s.as_str()),
            Some("Now after the death of Joshua. Letter of Jude intro.")
        );
    }

    #[test]
    fn test_intro_skips_cross_reference_target() {
        let text = "@Bible:Joh 3:0 >> Joh 3:0]] not an intro @Bible:Joh 3:1 v";
        let map = fetch_intro(text, joh(), "3", "5", get_alias_table());
        assert!(map.is_empty());
    }
}
