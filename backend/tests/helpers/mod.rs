use std::path::{Path, PathBuf};

use std::io::Write;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{Binary, Integer, Text};
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Create `file_name` in `dir` as a SQLite database built from `sql`.
pub fn create_module(dir: &Path, file_name: &str, sql: &str) -> PathBuf {
    let path = dir.join(file_name);
    let mut conn = SqliteConnection::establish(&path.to_string_lossy())
        .unwrap_or_else(|e| panic!("Can't create {}: {}", path.display(), e));
    conn.batch_execute(sql)
        .unwrap_or_else(|e| panic!("Can't build {}: {}", path.display(), e));
    path
}

#[allow(dead_code)]
pub fn mybible_commentary(dir: &Path) -> PathBuf {
    create_module(dir, "MHC.cmt.mybible", r"
        CREATE TABLE commentary (book INTEGER, chapter INTEGER, fromverse INTEGER, toverse INTEGER, data TEXT);
        INSERT INTO commentary VALUES (43, 3, 16, 18, '\b God\b0  so loved the world');
        INSERT INTO commentary VALUES (43, 3, 1, 5, 'Nicodemus comes by night');
        INSERT INTO commentary VALUES (43, 3, 16, 16, '   ');
    ")
}

#[allow(dead_code)]
pub fn commentaries_sqlite3(dir: &Path) -> PathBuf {
    create_module(dir, "commentaries.sqlite3", "
        CREATE TABLE commentaries (
            book_number INTEGER, chapter_number_from INTEGER, chapter_number_to INTEGER,
            verse_number_from INTEGER, verse_number_to INTEGER, text TEXT
        );
        INSERT INTO commentaries VALUES (43, 3, 4, 1, 99, 'The new birth');
        INSERT INTO commentaries VALUES (1, 1, 1, 1, 1, 'In the beginning');
    ")
}

#[allow(dead_code)]
pub fn theword_commentary(dir: &Path) -> PathBuf {
    create_module(dir, "Gill.cmt.twm", "
        CREATE TABLE topics (id INTEGER PRIMARY KEY, subject TEXT);
        CREATE TABLE content (topic_id INTEGER, data TEXT);
        CREATE TABLE bible_refs (topic_id INTEGER, bi INTEGER, ci INTEGER, fvi INTEGER, tvi INTEGER);
        INSERT INTO topics VALUES (1, 'John 3:14-17');
        INSERT INTO content VALUES (1, 'As Moses lifted up the serpent');
        INSERT INTO bible_refs VALUES (1, 43, 3, 14, 17);
    ")
}

#[allow(dead_code)]
pub fn crossway_commentary(dir: &Path) -> PathBuf {
    create_module(dir, "ESVNotes.cdb", "
        CREATE TABLE Bible (book INTEGER, chapter INTEGER, verse INTEGER, btext TEXT);
        INSERT INTO Bible VALUES (43, 3, 16, 'The gospel in miniature');
    ")
}

fn esword_sql(verse_table: &str, chapter_table: &str, book_table: &str) -> String {
    format!("
        CREATE TABLE {verse_table} (Book INTEGER, ChapterBegin INTEGER, ChapterEnd INTEGER,
            VerseBegin INTEGER, VerseEnd INTEGER, Comments TEXT);
        CREATE TABLE {chapter_table} (Book INTEGER, Chapter INTEGER, Comments TEXT);
        CREATE TABLE {book_table} (Book INTEGER, Comments TEXT);
        INSERT INTO {verse_table} VALUES (43, 3, 3, 16, 17, 'Verse comment on love');
        INSERT INTO {chapter_table} VALUES (43, 3, 'Chapter three overview');
        INSERT INTO {book_table} VALUES (43, 'The Gospel of John');
    ")
}

#[allow(dead_code)]
pub fn esword_legacy(dir: &Path) -> PathBuf {
    create_module(dir, "Barnes.cmti", &esword_sql("VerseCommentary", "ChapterCommentary", "BookCommentary"))
}

#[allow(dead_code)]
pub fn esword_modern(dir: &Path) -> PathBuf {
    create_module(dir, "Barnes.cmtx", &esword_sql("Verses", "Chapters", "Books"))
}

/// Unknown layout with numbers stored as text, found by inference.
#[allow(dead_code)]
pub fn inferred_notes(dir: &Path) -> PathBuf {
    create_module(dir, "study.sqlite", "
        CREATE TABLE notes (id INTEGER PRIMARY KEY, book_id TEXT, ch TEXT, verse_start TEXT, verse_end TEXT, content TEXT);
        INSERT INTO notes (book_id, ch, verse_start, verse_end, content) VALUES ('43', '3', '16', '17', 'Study note');
    ")
}

#[allow(dead_code)]
pub fn no_schema(dir: &Path) -> PathBuf {
    create_module(dir, "empty.sqlite3", "
        CREATE TABLE settings (name TEXT, value TEXT);
        INSERT INTO settings VALUES ('version', '1');
    ")
}

/// MyBible Bible with the usual `book_number` column.
#[allow(dead_code)]
pub fn mybible_bible(dir: &Path) -> PathBuf {
    create_module(dir, "KJV.mybible", "
        CREATE TABLE verses (book_number INTEGER, chapter INTEGER, verse INTEGER, text TEXT);
        INSERT INTO verses VALUES (43, 3, 16, 'For God so loved the world');
        INSERT INTO verses VALUES (43, 3, 17, 'For God sent not his Son');
    ")
}

#[allow(dead_code)]
pub fn theword_bible(dir: &Path) -> PathBuf {
    create_module(dir, "esv.twm", "
        CREATE TABLE bible (bi INTEGER, ci INTEGER, vi INTEGER, data TEXT);
        INSERT INTO bible VALUES (43, 3, 16, 'For God so loved the world, that he gave');
    ")
}

#[allow(dead_code)]
pub fn strong_dictionary(dir: &Path) -> PathBuf {
    create_module(dir, "krstrong.dct.twm", "
        CREATE TABLE topics (id INTEGER PRIMARY KEY, subject TEXT);
        CREATE TABLE content (topic_id INTEGER, data TEXT, data2 BLOB);
        INSERT INTO topics VALUES (1, 'G26');
        INSERT INTO topics VALUES (2, 'H430');
        INSERT INTO topics VALUES (3, 'G3056');
        INSERT INTO content VALUES (1, '<p>agape</p><p>love, charity</p>', NULL);
        INSERT INTO content VALUES (2, 'old text', CAST('Elohim' AS BLOB));
        INSERT INTO content VALUES (3, 'logos', X'789CFFFE');
    ")
}

/// Dictionary keeping its entries zlib-compressed in `data2`.
#[allow(dead_code)]
pub fn compressed_dictionary(dir: &Path) -> PathBuf {
    let path = create_module(dir, "mickelson.dct.twm", "
        CREATE TABLE topics (id INTEGER PRIMARY KEY, subject TEXT);
        CREATE TABLE content (topic_id INTEGER, data TEXT, data2 BLOB);
        INSERT INTO topics VALUES (1, 'G3056');
    ");

    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all("<p>logos</p><p>word, saying</p>".as_bytes()).unwrap();
    let blob = enc.finish().unwrap();

    let mut conn = SqliteConnection::establish(&path.to_string_lossy()).unwrap();
    diesel::sql_query("INSERT INTO content VALUES (?, ?, ?)")
        .bind::<Integer, _>(1)
        .bind::<Text, _>("see data2")
        .bind::<Binary, _>(blob)
        .execute(&mut conn)
        .unwrap();
    path
}
