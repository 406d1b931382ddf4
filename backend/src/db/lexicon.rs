//! theWord dictionary modules (`*.dct.twm`): entries in `topics`, their text in
//! `content`, joined on `content.topic_id = topics.id`.

use std::io::Read;
use std::path::Path;

use diesel::prelude::*;
use flate2::read::ZlibDecoder;
use diesel::sql_types::{Binary, Integer, Nullable, Text};
use serde::{Deserialize, Serialize};

use crate::db::{list_columns, log_module_error, open_module, quote_ident, ModuleError, ModuleResult};
use crate::rich_text::decode_rich_html;

/// Index columns tried in order before falling back to the first column.
pub const INDEX_COLUMN_PRIORITY: [&str; 7] = ["subject", "topic", "key", "word", "entry", "term", "id"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub plain: String,
    /// `plain` with line breaks as `<br>`.
    pub html: String,
}

#[derive(QueryableByName, Debug)]
struct SampleRow {
    #[diesel(sql_type = Nullable<Text>)]
    value: Option<String>,
}

#[derive(QueryableByName, Debug)]
struct ContentRow {
    #[diesel(sql_type = Nullable<Binary>)]
    data: Option<Vec<u8>>,
    #[diesel(sql_type = Nullable<Binary>)]
    data2: Option<Vec<u8>>,
}

fn try_detect_index_column(path: &Path) -> ModuleResult<Option<String>> {
    let mut conn = open_module(path)?;
    let columns = list_columns(&mut conn, "topics")?;

    let found = INDEX_COLUMN_PRIORITY
        .iter()
        .find_map(|c| columns.iter().find(|col| col.as_str() == *c))
        .or_else(|| columns.first())
        .cloned();
    Ok(found)
}

/// The `topics` column holding the headword, e.g. `subject` for Strong's
/// dictionaries.
pub fn detect_index_column(path: &Path) -> Option<String> {
    try_detect_index_column(path).unwrap_or_else(|e| {
        log_module_error("detect_index_column()", path, &e);
        None
    })
}

/// `column` as spelled in `topics`, if the table has it.
fn checked_topics_column(conn: &mut SqliteConnection, column: &str) -> ModuleResult<String> {
    list_columns(conn, "topics")?
        .into_iter()
        .find(|c| c.eq_ignore_ascii_case(column))
        .ok_or_else(|| ModuleError::SchemaMismatch(format!("topics has no column {}", column)))
}

fn try_index_samples(path: &Path, column: &str, limit: i32) -> ModuleResult<Vec<String>> {
    let mut conn = open_module(path)?;
    let column = checked_topics_column(&mut conn, column)?;

    let sql = format!(
        "SELECT DISTINCT CAST({} AS TEXT) AS value FROM topics LIMIT ?",
        quote_ident(&column)
    );
    let rows = diesel::sql_query(sql)
        .bind::<Integer, _>(limit)
        .load::<SampleRow>(&mut conn)?;

    Ok(rows
        .into_iter()
        .filter_map(|r| r.value)
        .filter(|v| !v.trim().is_empty())
        .collect())
}

/// Up to `limit` distinct headwords, as examples of what can be looked up.
pub fn index_samples(path: &Path, column: &str, limit: i32) -> Vec<String> {
    try_index_samples(path, column, limit).unwrap_or_else(|e| {
        log_module_error("index_samples()", path, &e);
        Vec::new()
    })
}

fn query_content(conn: &mut SqliteConnection, column: &str, term: &str, has_data2: bool) -> ModuleResult<Option<ContentRow>> {
    let data2 = if has_data2 { "CAST(c.data2 AS BLOB)" } else { "NULL" };
    let sql = format!(
        "SELECT CAST(c.data AS BLOB) AS data, {} AS data2 FROM content c \
         JOIN topics t ON c.topic_id = t.id WHERE t.{} = ? LIMIT 1",
        data2,
        quote_ident(column)
    );
    let row = diesel::sql_query(sql)
        .bind::<Text, _>(term)
        .get_result::<ContentRow>(conn)
        .optional()?;
    Ok(row)
}

/// Inflated `bytes` if they are a zlib stream of non-empty UTF-8 text.
fn inflate_text(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes).read_to_end(&mut out).ok()?;
    if out.is_empty() || std::str::from_utf8(&out).is_err() {
        return None;
    }
    Some(out)
}

/// `data2` when it holds zlib-compressed or plain readable text, else `data`.
/// Mickelson's Strong and similar modules keep the entry compressed in `data2`.
fn entry_bytes(row: ContentRow) -> Option<Vec<u8>> {
    let readable_data2 = row.data2.filter(|b| !b.is_empty()).and_then(|b| {
        if let Some(inflated) = inflate_text(&b) {
            Some(inflated)
        } else if std::str::from_utf8(&b).is_ok() {
            Some(b)
        } else {
            None
        }
    });
    readable_data2.or(row.data).filter(|b| !b.is_empty())
}

fn try_lookup_lexicon(path: &Path, term: &str, column: &str) -> ModuleResult<Option<LexiconEntry>> {
    let mut conn = open_module(path)?;
    let column = checked_topics_column(&mut conn, column)?;
    let has_data2 = list_columns(&mut conn, "content")?
        .iter()
        .any(|c| c.eq_ignore_ascii_case("data2"));

    let term = term.trim();
    let mut row = query_content(&mut conn, &column, term, has_data2)?;
    // Strong's numbers are usually stored upper-case, G3056 and H430.
    if row.is_none() && term.to_uppercase() != term {
        row = query_content(&mut conn, &column, &term.to_uppercase(), has_data2)?;
    }

    let Some(bytes) = row.and_then(entry_bytes) else {
        return Ok(None);
    };

    let plain = decode_rich_html(&bytes);
    if plain.is_empty() {
        return Ok(None);
    }
    let html = plain.replace('\n', "<br>");
    Ok(Some(LexiconEntry { plain, html }))
}

/// Look up `term` in the dictionary's `column`. None when the term is absent,
/// its content decodes to nothing, or the file can't be read.
pub fn lookup_lexicon(path: &Path, term: &str, column: &str) -> Option<LexiconEntry> {
    try_lookup_lexicon(path, term, column).unwrap_or_else(|e| {
        log_module_error("lookup_lexicon()", path, &e);
        None
    })
}
