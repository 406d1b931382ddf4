mod helpers;

use tempfile::tempdir;
use versefinder_backend::app_data::AppData;
use versefinder_backend::app_settings::AppSettings;
use versefinder_backend::db::bible_module::load_bible_verse;
use versefinder_backend::db::lexicon::{detect_index_column, index_samples, lookup_lexicon};

use helpers as h;

#[test]
fn test_mybible_bible_with_book_number() {
    let dir = tempdir().unwrap();
    let path = h::mybible_bible(dir.path());

    let record = load_bible_verse(&path, 43, 3, 16).unwrap();
    assert_eq!(record.formatted(), "#### 📖 [KJV.mybible]\nFor God so loved the world");
    assert!(load_bible_verse(&path, 43, 3, 18).is_none());
}

#[test]
fn test_theword_bible() {
    let dir = tempdir().unwrap();
    let path = h::theword_bible(dir.path());

    let record = load_bible_verse(&path, 43, 3, 16).unwrap();
    assert_eq!(record.body, "For God so loved the world, that he gave");
    assert!(load_bible_verse(&dir.path().join("missing.twm"), 43, 3, 16).is_none());
}

#[test]
fn test_bible_module_verses_keep_path_order() {
    let dir = tempdir().unwrap();
    let esv = h::theword_bible(dir.path());
    let kjv = h::mybible_bible(dir.path());
    let empty = h::no_schema(dir.path());

    let app = AppData::new(AppSettings::default());
    let verses = app.bible_module_verses(&[esv, empty, kjv], "요한복음", "3", "16");

    assert_eq!(verses, vec![
        "#### 📖 [esv.twm]\nFor God so loved the world, that he gave".to_string(),
        "#### 📖 [KJV.mybible]\nFor God so loved the world".to_string(),
    ]);
}

#[test]
fn test_dictionary_index_column() {
    let dir = tempdir().unwrap();
    let path = h::strong_dictionary(dir.path());

    assert_eq!(detect_index_column(&path).as_deref(), Some("subject"));

    let mut samples = index_samples(&path, "subject", 10);
    samples.sort();
    assert_eq!(samples, vec!["G26", "G3056", "H430"]);
    assert_eq!(index_samples(&path, "subject", 1).len(), 1);
    assert!(index_samples(&path, "no_such_column", 10).is_empty());
}

#[test]
fn test_lookup_lexicon() {
    let dir = tempdir().unwrap();
    let path = h::strong_dictionary(dir.path());

    let agape = lookup_lexicon(&path, "g26", "subject").unwrap();
    assert_eq!(agape.plain, "agape\nlove, charity");
    assert_eq!(agape.html, "agape<br>love, charity");

    // readable data2 is preferred
    assert_eq!(lookup_lexicon(&path, "H430", "subject").unwrap().plain, "Elohim");
    // data2 that is neither text nor zlib falls back to data
    assert_eq!(lookup_lexicon(&path, "G3056", "subject").unwrap().plain, "logos");

    assert!(lookup_lexicon(&path, "G9999", "subject").is_none());
    assert!(lookup_lexicon(&dir.path().join("missing.dct.twm"), "G26", "subject").is_none());
}

#[test]
fn test_lookup_lexicon_inflates_compressed_entries() {
    let dir = tempdir().unwrap();
    let path = h::compressed_dictionary(dir.path());

    let entry = lookup_lexicon(&path, "g3056", "subject").unwrap();
    assert_eq!(entry.plain, "logos\nword, saying");
    assert_eq!(entry.html, "logos<br>word, saying");
}

#[test]
fn test_app_lookup_term_in_configured_dictionaries() {
    let dir = tempdir().unwrap();
    h::strong_dictionary(dir.path());

    let app = AppData::new(AppSettings {
        dictionary_folder: Some(dir.path().to_path_buf()),
        ..AppSettings::default()
    });

    let dicts = app.dictionaries();
    assert_eq!(dicts.len(), 1);
    assert_eq!(dicts[0].display_name, "krstrong");

    let entry = app.lookup_term(&dicts[0].path, "G26").unwrap();
    assert!(entry.plain.starts_with("agape"));
    assert_eq!(app.dictionary_samples(&dicts[0].path, 2).len(), 2);
}
