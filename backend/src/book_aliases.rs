//! Book name aliases
//!
//! Maps Korean full names, Korean abbreviations, English names and
//! abbreviations, and digit-prefixed forms (e.g. `1cor`) to canonical book codes.
//! The table is built once and read-only afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::types::{BookCode, BOOK_CODES};

/// Curated aliases per canonical code, in canonical book order.
pub const BOOK_ALIASES: [(&str, &[&str]); 66] = [
    ("Gen", &["창세기", "창세", "창", "gen", "genesis"]),
    ("Exo", &["출애굽기", "출애굽", "출", "exo", "exod", "exodus"]),
    ("Lev", &["레위기", "레위", "레", "lev", "leviticus"]),
    ("Num", &["민수기", "민수", "민", "num", "numbers"]),
    ("Deu", &["신명기", "신명", "신", "deu", "deut", "deuteronomy"]),
    ("Jos", &["여호수아", "여호", "수", "jos", "josh", "joshua"]),
    ("Jud", &["사사기", "사사", "삿", "judg", "judges"]),
    ("Rut", &["룻기", "룻", "rut", "rth", "ruth"]),
    ("1Sa", &["사무엘상", "삼상", "1sa", "1samuel"]),
    ("2Sa", &["사무엘하", "삼하", "2sa", "2samuel"]),
    ("1Ki", &["열왕기상", "왕상", "1ki", "1kings"]),
    ("2Ki", &["열왕기하", "왕하", "2ki", "2kings"]),
    ("1Ch", &["역대기상", "대상", "1ch", "1chronicles"]),
    ("2Ch", &["역대기하", "대하", "2ch", "2chronicles"]),
    ("Ezr", &["에스라", "스", "ezr", "ezra"]),
    ("Neh", &["느헤미야", "느헤", "느", "neh", "nehemiah"]),
    ("Est", &["에스더", "에", "에스", "est", "esth", "esther"]),
    ("Job", &["욥기", "욥", "job", "jb"]),
    ("Psa", &["시편", "시", "psa", "psalms"]),
    ("Pro", &["잠언", "잠", "pro", "prov", "proverbs"]),
    ("Ecc", &["전도서", "전도", "전", "ecc", "ecclesiastes"]),
    ("Sng", &["아가", "아", "sng", "song", "songofsongs"]),
    ("Isa", &["이사야", "이사", "사", "isa", "isaiah"]),
    ("Jer", &["예레미야", "예레", "렘", "jer", "jeremiah"]),
    ("Lam", &["예레미야애가", "애가", "애", "lam", "lamentations"]),
    ("Eze", &["에스겔", "겔", "eze", "ezek", "ezekiel"]),
    ("Dan", &["다니엘", "단", "dan", "daniel"]),
    ("Hos", &["호세아", "호세", "호", "hos", "hosea"]),
    ("Joe", &["요엘", "욜", "joe", "joel"]),
    ("Amo", &["아모스", "암", "amo", "am", "amos"]),
    ("Oba", &["오바댜", "오바", "옵", "oba", "obad", "obadiah"]),
    ("Jon", &["요나", "욘", "jon", "jonah"]),
    ("Mic", &["미가", "미", "mic", "micah"]),
    ("Nah", &["나훔", "나", "nah", "nahum"]),
    ("Hab", &["하박국", "하박", "합", "hab", "habakkuk"]),
    ("Zep", &["스바냐", "스바", "습", "zep", "zeph", "zephaniah"]),
    ("Hag", &["학개", "학", "hag", "haggai"]),
    ("Zec", &["스가랴", "슥", "zec", "zechariah"]),
    ("Mal", &["말라기", "말", "mal", "malachi"]),
    ("Mat", &["마태복음", "마태", "마", "mat", "matt", "matthew"]),
    ("Mar", &["마가복음", "마가", "막", "mar", "mrk", "mark"]),
    ("Luk", &["누가복음", "누가", "눅", "luk", "luke"]),
    ("Joh", &["요한복음", "요한", "요", "jo", "joh", "john"]),
    ("Act", &["사도행전", "사도", "행", "act", "acts"]),
    ("Rom", &["로마서", "로마", "롬", "ro", "rom", "romans"]),
    ("1Co", &["고린도전서", "고전", "1co", "1cor", "1corinthians"]),
    ("2Co", &["고린도후서", "고후", "2co", "2cor", "2corinthians"]),
    ("Gal", &["갈라디아서", "갈라", "갈", "gal", "galatians"]),
    ("Eph", &["에베소서", "에베", "엡", "eph", "ephesians"]),
    ("Phi", &["빌립보서", "빌립", "빌", "phi", "phil", "philippians"]),
    ("Col", &["골로새서", "골로", "골", "col", "colossians"]),
    ("1Th", &["데살로니가전서", "살전", "1th", "1thess", "1thessalonians"]),
    ("2Th", &["데살로니가후서", "살후", "2th", "2thess", "2thessalonians"]),
    ("1Ti", &["디모데전서", "딤전", "1tim", "1timothy"]),
    ("2Ti", &["디모데후서", "딤후", "2tim", "2timothy"]),
    ("Tit", &["디도서", "디도", "딛", "tit", "titus"]),
    ("Phm", &["빌레몬서", "빌레", "몬", "phm", "philemon"]),
    ("Heb", &["히브리서", "히브", "히", "heb", "hebrew", "hebrews"]),
    ("Jam", &["야고보서", "야고", "약", "jam", "jas", "james"]),
    ("1Pe", &["베드로전서", "벧전", "1pe", "1pet", "1peter"]),
    ("2Pe", &["베드로후서", "벧후", "2pe", "2pet", "2peter"]),
    ("1Jo", &["요한1서", "요일", "1jo", "1joh", "1john"]),
    ("2Jo", &["요한2서", "요이", "2jo", "2joh", "2john"]),
    ("3Jo", &["요한3서", "요삼", "3jo", "3joh", "3john"]),
    ("Jude", &["유다서", "유", "jud", "jude"]),
    ("Rev", &["요한계시록", "계시록", "계", "re", "rev", "revelation"]),
];

/// Short Korean abbreviations that are ambiguous as prefixes of longer names.
/// Applied last, shadowing any earlier binding for the same key.
pub const KOREAN_SHORT_FORMS: [(&str, &str); 67] = [
    ("요", "Joh"), ("요일", "1Jo"), ("요이", "2Jo"), ("요삼", "3Jo"),
    ("롬", "Rom"), ("고전", "1Co"), ("고후", "2Co"), ("갈", "Gal"),
    ("엡", "Eph"), ("빌", "Phi"), ("골", "Col"), ("살전", "1Th"),
    ("살후", "2Th"), ("딤전", "1Ti"), ("딤후", "2Ti"), ("딛", "Tit"),
    ("빌레", "Phm"), ("몬", "Phm"), ("히", "Heb"), ("약", "Jam"),
    ("벧전", "1Pe"), ("벧후", "2Pe"), ("유", "Jude"), ("계", "Rev"),
    ("창", "Gen"), ("출", "Exo"), ("레", "Lev"), ("민", "Num"),
    ("신", "Deu"), ("수", "Jos"), ("삿", "Jud"), ("룻", "Rut"),
    ("삼상", "1Sa"), ("삼하", "2Sa"), ("왕상", "1Ki"), ("왕하", "2Ki"),
    ("대상", "1Ch"), ("대하", "2Ch"), ("스", "Ezr"), ("느", "Neh"),
    ("에", "Est"), ("욥", "Job"), ("시", "Psa"), ("잠", "Pro"),
    ("전", "Ecc"), ("아", "Sng"), ("사", "Isa"), ("렘", "Jer"),
    ("애", "Lam"), ("겔", "Eze"), ("단", "Dan"), ("호", "Hos"),
    ("욜", "Joe"), ("암", "Amo"), ("옵", "Oba"), ("욘", "Jon"),
    ("미", "Mic"), ("나", "Nah"), ("합", "Hab"), ("습", "Zep"),
    ("학", "Hag"), ("슥", "Zec"), ("말", "Mal"), ("마", "Mat"),
    ("막", "Mar"), ("눅", "Luk"), ("행", "Act"),
];

#[derive(Debug, Clone)]
pub struct AliasTable {
    flat: HashMap<String, BookCode>,
    raw: IndexMap<BookCode, Vec<String>>,
}

static ALIAS_TABLE: OnceLock<AliasTable> = OnceLock::new();

/// The process-wide alias table, built on first access.
pub fn get_alias_table() -> &'static AliasTable {
    ALIAS_TABLE.get_or_init(build_alias_table)
}

/// Python-style capitalize: first character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Capitalize the first alphabetic character, keeping any leading digits: `1cor` → `1Cor`.
pub fn smart_capitalize(s: &str) -> String {
    match s.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((idx, _)) => format!("{}{}", &s[..idx], capitalize(&s[idx..])),
        None => s.to_string(),
    }
}

fn register_casings(flat: &mut HashMap<String, BookCode>, key: &str, book: BookCode) {
    flat.insert(key.to_lowercase(), book);
    flat.insert(key.to_uppercase(), book);
    flat.insert(capitalize(key), book);
    flat.insert(key.to_string(), book);
}

pub fn build_alias_table() -> AliasTable {
    let mut flat: HashMap<String, BookCode> = HashMap::new();
    let mut raw: IndexMap<BookCode, Vec<String>> = IndexMap::new();

    for (code, aliases) in BOOK_ALIASES.iter() {
        let Some(book) = BookCode::from_code(code) else {
            continue;
        };

        for alias in aliases.iter() {
            register_casings(&mut flat, alias, book);

            if alias.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                let titled = smart_capitalize(alias);
                if titled != alias.to_lowercase()
                    && titled != alias.to_uppercase()
                    && titled != capitalize(alias)
                {
                    flat.insert(titled, book);
                }
            }
        }

        raw.insert(book, aliases.iter().map(|a| a.to_string()).collect());
    }

    // Canonical codes always resolve to themselves, even where a curated alias
    // of another book has the same spelling. This rebinds Jude's "jud" alias to
    // Judges, so `jud` in any casing resolves to Jud, and Jude is only reached
    // through "jude", "유다서" or "유".
    for code in BOOK_CODES.iter() {
        if let Some(book) = BookCode::from_code(code) {
            register_casings(&mut flat, code, book);
        }
    }

    for (key, code) in KOREAN_SHORT_FORMS.iter() {
        if let Some(book) = BookCode::from_code(code) {
            register_casings(&mut flat, key, book);
        }
    }

    AliasTable { flat, raw }
}

impl AliasTable {
    /// Case-sensitive lookup on the raw key. All casings are pre-registered,
    /// so callers normally pass a lower-cased key.
    pub fn get(&self, key: &str) -> Option<BookCode> {
        self.flat.get(key).copied()
    }

    /// Trim and lower-case before the lookup.
    pub fn resolve(&self, name: &str) -> Option<BookCode> {
        let name = name.trim();
        self.get(&name.to_lowercase()).or_else(|| self.get(name))
    }

    /// Curated aliases of a book, without casing variants.
    pub fn aliases(&self, book: BookCode) -> &[String] {
        self.raw.get(&book).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The canonical code followed by its curated aliases.
    pub fn all_names(&self, book: BookCode) -> Vec<String> {
        let mut names = vec![book.code().to_string()];
        names.extend(self.aliases(book).iter().cloned());
        names
    }

    pub fn flat_map(&self) -> &HashMap<String, BookCode> {
        &self.flat
    }

    pub fn raw_map(&self) -> &IndexMap<BookCode, Vec<String>> {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}
