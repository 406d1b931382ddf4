use std::path::Path;

use diesel::prelude::*;

use crate::db::schema::{
    infer_range_schema, query_inferred, ColumnSpan, ModuleFormat, RangeSchema, SchemaDescriptor,
    COMMENTARY_PROFILE,
};
use crate::db::{file_label, file_stem_label, log_module_error, open_module, ModuleError, ModuleResult};
use crate::logger::debug;
use crate::rich_text::decode_rtf;
use crate::types::{CommentaryRecord, RecordKind};

/// The layout tried before inference for a file family, if it has one.
pub fn fixed_commentary_schema(format: ModuleFormat) -> Option<SchemaDescriptor> {
    match format {
        ModuleFormat::Commentaries => Some(SchemaDescriptor::Range(
            RangeSchema::new("commentaries", "text", "book_number")
                .chapter(ColumnSpan::range("chapter_number_from", "chapter_number_to"))
                .verse(ColumnSpan::range("verse_number_from", "verse_number_to")),
        )),
        ModuleFormat::MyBible => Some(SchemaDescriptor::Range(
            RangeSchema::new("commentary", "data", "book")
                .chapter(ColumnSpan::single("chapter"))
                .verse(ColumnSpan::range("fromverse", "toverse")),
        )),
        ModuleFormat::TheWord => Some(SchemaDescriptor::TopicJoin),
        ModuleFormat::Crossway => Some(SchemaDescriptor::Range(
            RangeSchema::new("Bible", "btext", "book")
                .chapter(ColumnSpan::single("chapter"))
                .verse(ColumnSpan::single("verse")),
        )),
        ModuleFormat::ESwordLegacy | ModuleFormat::ESwordModern | ModuleFormat::Generic => None,
    }
}

/// e-Sword table names: (verse ranges, chapters, books).
fn esword_tables(format: ModuleFormat) -> (&'static str, &'static str, &'static str) {
    match format {
        ModuleFormat::ESwordLegacy => ("VerseCommentary", "ChapterCommentary", "BookCommentary"),
        _ => ("Verses", "Chapters", "Books"),
    }
}

fn decode_records(bodies: Vec<Vec<u8>>, label: &str) -> Vec<CommentaryRecord> {
    bodies
        .iter()
        .map(decode_rtf)
        .filter(|text| !text.trim().is_empty())
        .map(|text| CommentaryRecord::new(label, &text, RecordKind::Commentary))
        .collect()
}

/// Verse comments first. Chapter comments when asked for verse 0 or nothing
/// matched the verse, book comments when asked for chapter 0. A failing table
/// doesn't stop the others.
fn load_esword(
    conn: &mut SqliteConnection,
    path: &Path,
    format: ModuleFormat,
    book_id: i32,
    chapter: i32,
    verse: i32,
) -> Vec<CommentaryRecord> {
    let (verse_table, chapter_table, book_table) = esword_tables(format);
    let stem = file_stem_label(path);
    let mut results = Vec::new();

    let verse_schema = SchemaDescriptor::Range(
        RangeSchema::new(verse_table, "Comments", "Book")
            .chapter(ColumnSpan::range("ChapterBegin", "ChapterEnd"))
            .verse(ColumnSpan::range("VerseBegin", "VerseEnd")),
    );
    match verse_schema.query(conn, book_id, chapter, verse) {
        Ok(bodies) => results.extend(decode_records(bodies, &stem)),
        Err(e) => log_module_error("e-Sword verse comments", path, &e),
    }

    if verse == 0 || results.is_empty() {
        let chapter_schema = SchemaDescriptor::Range(
            RangeSchema::new(chapter_table, "Comments", "Book").chapter(ColumnSpan::single("Chapter")),
        );
        match chapter_schema.query(conn, book_id, chapter, verse) {
            Ok(bodies) => results.extend(decode_records(bodies, &format!("{} - 장 서론", stem))),
            Err(e) => log_module_error("e-Sword chapter comments", path, &e),
        }
    }

    if chapter == 0 {
        let book_schema = SchemaDescriptor::Range(RangeSchema::new(book_table, "Comments", "Book"));
        match book_schema.query(conn, book_id, chapter, verse) {
            Ok(bodies) => results.extend(decode_records(bodies, &format!("{} - 책 서론", stem))),
            Err(e) => log_module_error("e-Sword book comments", path, &e),
        }
    }

    results
}

fn load_inferred(
    conn: &mut SqliteConnection,
    path: &Path,
    book_id: i32,
    chapter: i32,
    verse: i32,
) -> ModuleResult<Vec<CommentaryRecord>> {
    let schema = infer_range_schema(conn, &COMMENTARY_PROFILE)?;
    debug(&format!("{}: inferred {:?}", path.display(), schema));
    let bodies = query_inferred(conn, &schema, book_id, chapter, verse)?;
    Ok(decode_records(bodies, &format!("주석: {}", file_label(path))))
}

/// Commentary records of one module file for a verse. The connection lives
/// for this call only.
pub fn try_load_commentary(
    path: &Path,
    book_id: i32,
    chapter: i32,
    verse: i32,
) -> ModuleResult<Vec<CommentaryRecord>> {
    let format = ModuleFormat::from_path(path);
    let mut conn = open_module(path)?;

    if matches!(format, ModuleFormat::ESwordLegacy | ModuleFormat::ESwordModern) {
        return Ok(load_esword(&mut conn, path, format, book_id, chapter, verse));
    }

    if let Some(fixed) = fixed_commentary_schema(format) {
        match fixed.query(&mut conn, book_id, chapter, verse) {
            Ok(bodies) => return Ok(decode_records(bodies, &file_stem_label(path))),
            Err(e @ (ModuleError::Query(_) | ModuleError::SchemaMismatch(_))) => {
                debug(&format!("{}: fixed schema failed, inferring: {}", path.display(), e));
            }
            Err(e) => return Err(e),
        }
    }

    load_inferred(&mut conn, path, book_id, chapter, verse)
}

/// Like `try_load_commentary()`, with every failure logged and turned into an
/// empty list.
pub fn load_commentary(path: &Path, book_id: i32, chapter: i32, verse: i32) -> Vec<CommentaryRecord> {
    match try_load_commentary(path, book_id, chapter, verse) {
        Ok(records) => records,
        Err(e) => {
            log_module_error("load_commentary()", path, &e);
            Vec::new()
        }
    }
}
