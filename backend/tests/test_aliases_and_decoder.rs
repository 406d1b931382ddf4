use versefinder_backend::book_aliases::{capitalize, get_alias_table, BOOK_ALIASES};
use versefinder_backend::reference::{parse_reference, parse_verses};
use versefinder_backend::rich_text::{decode_rich_html, decode_rtf};
use versefinder_backend::types::{BookCode, RefMode};

#[test]
fn test_every_alias_casing_resolves_to_its_book() {
    let t = get_alias_table();

    for (code, aliases) in BOOK_ALIASES.iter() {
        let book = BookCode::from_code(code).unwrap();
        assert_eq!(t.resolve(code), Some(book), "{}", code);

        for alias in aliases.iter() {
            // Korean short forms override a few curated aliases
            if t.get(alias) != Some(book) {
                continue;
            }
            assert_eq!(t.get(&alias.to_lowercase()), Some(book), "{}", alias);
            assert_eq!(t.get(&alias.to_uppercase()), Some(book), "{}", alias);
            assert_eq!(t.get(&capitalize(alias)), Some(book), "{}", alias);
        }
    }
}

#[test]
fn test_numbered_books() {
    let t = get_alias_table();
    assert_eq!(t.resolve("1Cor").map(|b| b.code()), Some("1Co"));
    assert_eq!(t.get("1Cor").map(|b| b.code()), Some("1Co"));
    assert_eq!(t.resolve("고전").map(|b| b.code()), Some("1Co"));
    assert_eq!(t.resolve("jud").map(|b| b.code()), Some("Jud"));
}

#[test]
fn test_reference_scenarios() {
    let t = get_alias_table();

    let r = parse_reference("창", "1", "1", t).unwrap();
    assert_eq!((r.book.code(), r.chapter.as_str(), r.verses.clone(), r.mode), ("Gen", "1", vec!["1".to_string()], RefMode::Verse));

    assert_eq!(parse_reference("Rom", "0", "7", t).unwrap().mode, RefMode::BookIntro);
    assert_eq!(parse_reference("Rom", "5", "0", t).unwrap().mode, RefMode::ChapterIntro);
    assert_eq!(parse_reference("Rom", "5", "3", t).unwrap().mode, RefMode::Verse);
    assert!(parse_reference("Xyz", "1", "1", t).is_none());

    assert_eq!(parse_verses("26-27"), vec!["26", "27"]);
    assert_eq!(parse_verses("abc-def"), vec!["abc-def"]);
}

#[test]
fn test_decode_is_stable_after_one_pass() {
    let inputs = [
        r"\pard\b Love\b0  is patient \u-16212?\u46993?",
        r"Grace {\*\generator Writer;} and peace",
        "plain text",
        "",
    ];
    for raw in inputs {
        let once = decode_rtf(raw);
        assert_eq!(decode_rtf(&once), once);
    }
    assert_eq!(decode_rtf(r"\pard\b Love\b0  is patient \u-16212?\u46993?"), "Love is patient 사랑");
}

#[test]
fn test_decode_rich_html_repairs_mojibake() {
    // "사랑" as UTF-8 bytes read back as Latin-1
    let garbled: String = "사랑".bytes().map(|b| b as char).collect();
    let raw = format!("Love: {}", garbled);
    assert_eq!(decode_rich_html(raw.as_bytes()), "Love: 사랑");

    // Latin-1 text that isn't mis-decoded stays as it is
    assert_eq!(decode_rich_html("café déjà vu".as_bytes()), "café déjà vu");
}
