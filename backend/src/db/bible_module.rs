use std::path::Path;

use crate::db::schema::{
    infer_range_schema, query_inferred, ColumnSpan, ModuleFormat, RangeSchema, SchemaDescriptor,
    BIBLE_PROFILE,
};
use crate::db::{file_label, log_module_error, open_module, ModuleError, ModuleResult};
use crate::logger::debug;
use crate::rich_text::decode_rtf;
use crate::types::{CommentaryRecord, RecordKind};

fn verse_table(table: &str, book: &str, chapter: &str, verse: &str, text: &str) -> SchemaDescriptor {
    SchemaDescriptor::Range(
        RangeSchema::new(table, text, book)
            .chapter(ColumnSpan::single(chapter))
            .verse(ColumnSpan::single(verse)),
    )
}

pub fn fixed_bible_schema(format: ModuleFormat) -> Option<SchemaDescriptor> {
    match format {
        ModuleFormat::MyBible => Some(verse_table("verses", "book", "chapter", "verse", "text")),
        ModuleFormat::TheWord => Some(verse_table("bible", "bi", "ci", "vi", "data")),
        ModuleFormat::Crossway => Some(verse_table("Bible", "book", "chapter", "verse", "btext")),
        _ => None,
    }
}

fn first_record(bodies: Vec<Vec<u8>>, label: &str) -> Option<CommentaryRecord> {
    bodies
        .iter()
        .map(decode_rtf)
        .find(|text| !text.trim().is_empty())
        .map(|text| CommentaryRecord::new(label, &text, RecordKind::BibleText))
}

/// Text of one verse from a Bible module file.
pub fn try_load_bible_verse(
    path: &Path,
    book_id: i32,
    chapter: i32,
    verse: i32,
) -> ModuleResult<Option<CommentaryRecord>> {
    let label = file_label(path);
    let mut conn = open_module(path)?;

    if let Some(fixed) = fixed_bible_schema(ModuleFormat::from_path(path)) {
        match fixed.query(&mut conn, book_id, chapter, verse) {
            Ok(bodies) => return Ok(first_record(bodies, &label)),
            Err(e @ (ModuleError::Query(_) | ModuleError::SchemaMismatch(_))) => {
                debug(&format!("{}: fixed Bible schema failed, inferring: {}", path.display(), e));
            }
            Err(e) => return Err(e),
        }
    }

    let schema = infer_range_schema(&mut conn, &BIBLE_PROFILE)?;
    let bodies = query_inferred(&mut conn, &schema, book_id, chapter, verse)?;
    Ok(first_record(bodies, &label))
}

pub fn load_bible_verse(path: &Path, book_id: i32, chapter: i32, verse: i32) -> Option<CommentaryRecord> {
    match try_load_bible_verse(path, book_id, chapter, verse) {
        Ok(record) => record,
        Err(e) => {
            log_module_error("load_bible_verse()", path, &e);
            None
        }
    }
}
