use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Canonical book codes in canonical order. The 1-based position is the `book_id`
/// used by the commentary and Bible module databases.
pub const BOOK_CODES: [&str; 66] = [
    "Gen", "Exo", "Lev", "Num", "Deu", "Jos", "Jud", "Rut",
    "1Sa", "2Sa", "1Ki", "2Ki", "1Ch", "2Ch", "Ezr", "Neh", "Est",
    "Job", "Psa", "Pro", "Ecc", "Sng", "Isa", "Jer", "Lam", "Eze",
    "Dan", "Hos", "Joe", "Amo", "Oba", "Jon", "Mic", "Nah", "Hab",
    "Zep", "Hag", "Zec", "Mal",
    "Mat", "Mar", "Luk", "Joh", "Act", "Rom", "1Co", "2Co", "Gal",
    "Eph", "Phi", "Col", "1Th", "2Th", "1Ti", "2Ti", "Tit", "Phm",
    "Heb", "Jam", "1Pe", "2Pe", "1Jo", "2Jo", "3Jo", "Jude", "Rev",
];

/// One of the 66 canonical books, e.g. `Gen` or `1Co`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookCode(u8);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid book code: {0}")]
pub struct ParseBookCodeError(String);

impl BookCode {
    /// Look up a book by its 1-based position in canonical order.
    pub fn from_book_id(book_id: u8) -> Option<Self> {
        if (1..=BOOK_CODES.len() as u8).contains(&book_id) {
            Some(BookCode(book_id))
        } else {
            None
        }
    }

    /// Exact, case-sensitive match against the canonical code.
    pub fn from_code(code: &str) -> Option<Self> {
        BOOK_CODES
            .iter()
            .position(|c| *c == code)
            .map(|idx| BookCode(idx as u8 + 1))
    }

    pub fn book_id(&self) -> u8 {
        self.0
    }

    pub fn code(&self) -> &'static str {
        BOOK_CODES[self.0 as usize - 1]
    }

    pub fn all() -> impl Iterator<Item = BookCode> {
        (1..=BOOK_CODES.len() as u8).map(BookCode)
    }
}

impl fmt::Display for BookCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for BookCode {
    type Err = ParseBookCodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BookCode::from_code(s.trim()).ok_or_else(|| ParseBookCodeError(s.to_string()))
    }
}

/// Book id for a canonical code string, as used by the module databases.
pub fn book_id_for_code(code: &str) -> Option<u8> {
    BookCode::from_code(code).map(|b| b.book_id())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefMode {
    #[serde(rename = "book_intro")]
    BookIntro,
    #[serde(rename = "chapter_intro")]
    ChapterIntro,
    #[serde(rename = "verse")]
    Verse,
}

impl RefMode {
    /// chapter "0" is a book introduction regardless of the verse,
    /// verse "0" is a chapter introduction, anything else is a verse lookup.
    pub fn derive(chapter: &str, verse_input: &str) -> Self {
        if chapter == "0" {
            RefMode::BookIntro
        } else if verse_input == "0" {
            RefMode::ChapterIntro
        } else {
            RefMode::Verse
        }
    }
}

/// A resolved reference. Chapter and verses are kept as the strings the user gave,
/// since a malformed verse range travels on as one opaque token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: BookCode,
    pub chapter: String,
    pub verses: Vec<String>,
    pub mode: RefMode,
}

/// Position of one inline reference marker, e.g. `[[@Bible:Joh 3:16]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIndexEntry {
    pub start: usize,
    pub end: usize,
    pub chapter: String,
    pub verse: String,
}

/// Heading → passage text, in insertion order. The first insert for a heading wins.
pub type PassageMap = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Commentary,
    BibleText,
}

/// One decoded row from a commentary or Bible module file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentaryRecord {
    pub source_label: String,
    pub body: String,
    pub kind: RecordKind,
}

impl CommentaryRecord {
    pub fn new(source_label: &str, body: &str, kind: RecordKind) -> Self {
        CommentaryRecord {
            source_label: source_label.to_string(),
            body: body.trim().to_string(),
            kind,
        }
    }

    pub fn heading(&self) -> String {
        let icon = match self.kind {
            RecordKind::Commentary => "📚",
            RecordKind::BibleText => "📖",
        };
        format!("#### {} [{}]", icon, self.source_label)
    }

    /// The heading and body as one block. Aggregation deduplicates on this string.
    pub fn formatted(&self) -> String {
        format!("{}\n{}", self.heading(), self.body)
    }
}
