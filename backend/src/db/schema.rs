//! Schema descriptors for the module file families, and the inference used
//! when a file doesn't match a known layout.

use std::path::Path;

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::Sqlite;

use crate::db::{list_columns, list_tables, quote_ident, BodyRow, ModuleError, ModuleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// e-Sword `.cmti`
    ESwordLegacy,
    /// e-Sword `.cmtx`
    ESwordModern,
    /// `commentaries.sqlite3`
    Commentaries,
    /// MyBible `.mybible`
    MyBible,
    /// theWord `.twm`
    TheWord,
    /// Crossway `.cdb`
    Crossway,
    /// `.sqlite`, `.sqlite3` and anything else
    Generic,
}

impl ModuleFormat {
    pub fn from_path(path: &Path) -> Self {
        let lower = path.to_string_lossy().to_lowercase();
        if lower.ends_with(".cmti") {
            ModuleFormat::ESwordLegacy
        } else if lower.ends_with(".cmtx") {
            ModuleFormat::ESwordModern
        } else if lower.ends_with("commentaries.sqlite3") {
            ModuleFormat::Commentaries
        } else if lower.ends_with(".mybible") {
            ModuleFormat::MyBible
        } else if lower.ends_with(".twm") {
            ModuleFormat::TheWord
        } else if lower.ends_with(".cdb") {
            ModuleFormat::Crossway
        } else {
            ModuleFormat::Generic
        }
    }
}

/// A reference coordinate stored as a range `[from, to]`, or as one column
/// when `from == to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpan {
    pub from: String,
    pub to: String,
}

impl ColumnSpan {
    pub fn single(col: &str) -> Self {
        ColumnSpan { from: col.to_string(), to: col.to_string() }
    }

    pub fn range(from: &str, to: &str) -> Self {
        ColumnSpan { from: from.to_string(), to: to.to_string() }
    }

    pub fn is_single(&self) -> bool {
        self.from.eq_ignore_ascii_case(&self.to)
    }
}

/// One table holding the text, filtered by book and optionally chapter and verse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSchema {
    pub table: String,
    pub text: String,
    pub book: String,
    pub chapter: Option<ColumnSpan>,
    pub verse: Option<ColumnSpan>,
    /// Compare `CAST(col AS INTEGER)`, for files storing numbers as text.
    pub cast_integers: bool,
}

impl RangeSchema {
    pub fn new(table: &str, text: &str, book: &str) -> Self {
        RangeSchema {
            table: table.to_string(),
            text: text.to_string(),
            book: book.to_string(),
            chapter: None,
            verse: None,
            cast_integers: false,
        }
    }

    pub fn chapter(mut self, span: ColumnSpan) -> Self {
        self.chapter = Some(span);
        self
    }

    pub fn verse(mut self, span: ColumnSpan) -> Self {
        self.verse = Some(span);
        self
    }

    pub fn with_casts(mut self, cast_integers: bool) -> Self {
        self.cast_integers = cast_integers;
        self
    }

    fn column_expr(&self, col: &str) -> String {
        if self.cast_integers {
            format!("CAST({} AS INTEGER)", quote_ident(col))
        } else {
            quote_ident(col)
        }
    }

    fn condition(&self, span: &ColumnSpan) -> String {
        if span.is_single() {
            format!("{} = ?", self.column_expr(&span.from))
        } else {
            format!("? BETWEEN {} AND {}", self.column_expr(&span.from), self.column_expr(&span.to))
        }
    }

    /// Every column the query reads.
    pub fn columns(&self) -> Vec<&str> {
        let mut cols = vec![self.text.as_str(), self.book.as_str()];
        for span in [&self.chapter, &self.verse].into_iter().flatten() {
            cols.push(span.from.as_str());
            cols.push(span.to.as_str());
        }
        cols
    }

    /// SchemaMismatch unless the table exists with every column the query reads.
    pub fn check_columns(&self, conn: &mut SqliteConnection) -> ModuleResult<()> {
        let available = list_columns(conn, &self.table)?;
        if available.is_empty() {
            return Err(ModuleError::SchemaMismatch(format!("no table {}", self.table)));
        }
        let missing: Vec<&str> = self
            .columns()
            .into_iter()
            .filter(|c| !available.iter().any(|a| a.eq_ignore_ascii_case(c)))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModuleError::SchemaMismatch(format!("table {}: no columns {:?}", self.table, missing)))
        }
    }

    /// The SELECT statement. Binds, in order: book, chapter if present, verse if present.
    pub fn to_sql(&self) -> String {
        let mut conditions = vec![format!("{} = ?", self.column_expr(&self.book))];
        if let Some(span) = &self.chapter {
            conditions.push(self.condition(span));
        }
        if let Some(span) = &self.verse {
            conditions.push(self.condition(span));
        }
        format!(
            "SELECT CAST({} AS BLOB) AS body FROM {} WHERE {}",
            quote_ident(&self.text),
            quote_ident(&self.table),
            conditions.join(" AND ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDescriptor {
    Range(RangeSchema),
    /// theWord commentaries: verse ranges in `bible_refs`, text in `content`,
    /// joined on `topic_id`.
    TopicJoin,
}

const TOPIC_JOIN_SQL: &str = "SELECT CAST(c.data AS BLOB) AS body FROM bible_refs r \
     JOIN content c ON c.topic_id = r.topic_id \
     WHERE r.bi = ? AND r.ci = ? AND ? BETWEEN r.fvi AND r.tvi";

impl SchemaDescriptor {
    /// Text payloads of all matching rows, NULLs skipped.
    pub fn query(
        &self,
        conn: &mut SqliteConnection,
        book_id: i32,
        chapter: i32,
        verse: i32,
    ) -> ModuleResult<Vec<Vec<u8>>> {
        let rows: Vec<BodyRow> = match self {
            SchemaDescriptor::Range(schema) => {
                schema.check_columns(conn)?;
                let mut q = diesel::sql_query(schema.to_sql())
                    .into_boxed::<Sqlite>()
                    .bind::<Integer, _>(book_id);
                if schema.chapter.is_some() {
                    q = q.bind::<Integer, _>(chapter);
                }
                if schema.verse.is_some() {
                    q = q.bind::<Integer, _>(verse);
                }
                q.load::<BodyRow>(conn)?
            }
            SchemaDescriptor::TopicJoin => diesel::sql_query(TOPIC_JOIN_SQL)
                .bind::<Integer, _>(book_id)
                .bind::<Integer, _>(chapter)
                .bind::<Integer, _>(verse)
                .load::<BodyRow>(conn)?,
        };
        Ok(rows.into_iter().filter_map(|r| r.body).collect())
    }
}

/// Candidate names for table and column inference, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct InferenceProfile {
    pub tables: &'static [&'static str],
    /// Fallback: the first table whose name contains one of these.
    pub table_keywords: &'static [&'static str],
    pub book: &'static [&'static str],
    pub chapter_from: &'static [&'static str],
    pub chapter_to: &'static [&'static str],
    pub verse_from: &'static [&'static str],
    pub verse_to: &'static [&'static str],
    pub text: &'static [&'static str],
}

pub const COMMENTARY_PROFILE: InferenceProfile = InferenceProfile {
    tables: &["commentaries", "commentary", "texts", "words", "notes", "content", "bible", "verses", "scripture"],
    table_keywords: &["comment", "note", "text", "content", "bible", "verse"],
    book: &["book_number", "book", "book_id", "bk", "b", "bi"],
    chapter_from: &["chapter_number_from", "chapter_number", "chapter", "chapterbegin", "ch", "c", "ci"],
    chapter_to: &["chapter_number_to", "chapterend"],
    verse_from: &[
        "verse_number_from", "verse_start", "verse", "fromverse", "versebegin",
        "vs", "v", "verse_number", "verse_num", "fvi",
    ],
    verse_to: &[
        "verse_number_to", "verse_end", "to_verse", "toverse", "end_verse",
        "verse_to", "verseend", "tvi",
    ],
    text: &["commentary", "text", "data", "content", "body", "notes", "comments", "content_text", "btext"],
};

pub const BIBLE_PROFILE: InferenceProfile = InferenceProfile {
    tables: &["verses", "bible", "scripture", "texts"],
    table_keywords: &[],
    book: &["book", "book_id", "book_number", "bi", "b"],
    chapter_from: &["chapter", "ch", "ci", "c"],
    chapter_to: &[],
    verse_from: &["verse", "vs", "vi", "v"],
    verse_to: &[],
    text: &["text", "content", "btext", "data"],
};

/// First candidate present in `available`, compared case-insensitively.
/// Returns the name as the database spells it.
fn pick<'a>(candidates: &[&str], available: &'a [String]) -> Option<&'a String> {
    candidates.iter().find_map(|c| available.iter().find(|a| a.eq_ignore_ascii_case(c)))
}

/// Guess the table and column roles of an unknown file.
pub fn infer_range_schema(conn: &mut SqliteConnection, profile: &InferenceProfile) -> ModuleResult<RangeSchema> {
    let tables = list_tables(conn)?;

    let table = pick(profile.tables, &tables)
        .or_else(|| {
            tables.iter().find(|t| {
                let lower = t.to_lowercase();
                profile.table_keywords.iter().any(|k| lower.contains(k))
            })
        })
        .cloned()
        .ok_or_else(|| ModuleError::SchemaMismatch(format!("no candidate table among {:?}", tables)))?;

    let columns = list_columns(conn, &table)?;

    let (Some(book), Some(chapter_from), Some(verse_from), Some(text)) = (
        pick(profile.book, &columns),
        pick(profile.chapter_from, &columns),
        pick(profile.verse_from, &columns),
        pick(profile.text, &columns),
    ) else {
        return Err(ModuleError::SchemaMismatch(format!("table {}: columns {:?}", table, columns)));
    };

    let chapter_to = pick(profile.chapter_to, &columns).unwrap_or(chapter_from);
    let verse_to = pick(profile.verse_to, &columns).unwrap_or(verse_from);

    Ok(RangeSchema::new(&table, text, book)
        .chapter(ColumnSpan::range(chapter_from, chapter_to))
        .verse(ColumnSpan::range(verse_from, verse_to))
        .with_casts(true))
}

/// Query an inferred schema, comparing `CAST(col AS INTEGER)` first and the
/// raw columns if that query fails.
pub fn query_inferred(
    conn: &mut SqliteConnection,
    schema: &RangeSchema,
    book_id: i32,
    chapter: i32,
    verse: i32,
) -> ModuleResult<Vec<Vec<u8>>> {
    let with_casts = SchemaDescriptor::Range(schema.clone().with_casts(true));
    match with_casts.query(conn, book_id, chapter, verse) {
        Ok(rows) => Ok(rows),
        Err(ModuleError::Query(_)) => {
            SchemaDescriptor::Range(schema.clone().with_casts(false)).query(conn, book_id, chapter, verse)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::connection::SimpleConnection;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ModuleFormat::from_path(Path::new("a/MHC.cmti")), ModuleFormat::ESwordLegacy);
        assert_eq!(ModuleFormat::from_path(Path::new("a/MHC.CMTX")), ModuleFormat::ESwordModern);
        assert_eq!(ModuleFormat::from_path(Path::new("a/commentaries.sqlite3")), ModuleFormat::Commentaries);
        assert_eq!(ModuleFormat::from_path(Path::new("a/KJV-commentaries.SQLite3")), ModuleFormat::Commentaries);
        assert_eq!(ModuleFormat::from_path(Path::new("a/x.cmt.mybible")), ModuleFormat::MyBible);
        assert_eq!(ModuleFormat::from_path(Path::new("a/x.cmt.twm")), ModuleFormat::TheWord);
        assert_eq!(ModuleFormat::from_path(Path::new("a/x.cdb")), ModuleFormat::Crossway);
        assert_eq!(ModuleFormat::from_path(Path::new("a/x.sqlite")), ModuleFormat::Generic);
        assert_eq!(ModuleFormat::from_path(Path::new("a/x.db")), ModuleFormat::Generic);
    }

    #[test]
    fn test_range_schema_sql() {
        let schema = RangeSchema::new("commentaries", "text", "book_number")
            .chapter(ColumnSpan::range("chapter_number_from", "chapter_number_to"))
            .verse(ColumnSpan::single("verse"));
        assert_eq!(
            schema.to_sql(),
            "SELECT CAST([text] AS BLOB) AS body FROM [commentaries] WHERE [book_number] = ? \
             AND ? BETWEEN [chapter_number_from] AND [chapter_number_to] AND [verse] = ?"
        );
    }

    #[test]
    fn test_range_schema_sql_with_casts() {
        let schema = RangeSchema::new("BookCommentary", "Comments", "Book").with_casts(true);
        assert_eq!(
            schema.to_sql(),
            "SELECT CAST([Comments] AS BLOB) AS body FROM [BookCommentary] WHERE CAST([Book] AS INTEGER) = ?"
        );
    }

    fn verses_db() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.batch_execute("
            CREATE TABLE verses (book_number INTEGER, chapter INTEGER, verse INTEGER, text TEXT);
            INSERT INTO verses VALUES (43, 3, 16, 'For God so loved the world');
        ").unwrap();
        conn
    }

    fn verse_schema(book: &str) -> RangeSchema {
        RangeSchema::new("verses", "text", book)
            .chapter(ColumnSpan::single("chapter"))
            .verse(ColumnSpan::single("verse"))
    }

    #[test]
    fn test_missing_column_is_a_schema_mismatch() {
        let mut conn = verses_db();

        let wrong = SchemaDescriptor::Range(verse_schema("book"));
        assert!(matches!(wrong.query(&mut conn, 43, 3, 16), Err(ModuleError::SchemaMismatch(_))));

        let right = SchemaDescriptor::Range(verse_schema("BOOK_NUMBER"));
        assert_eq!(right.query(&mut conn, 43, 3, 16).unwrap(), vec![b"For God so loved the world".to_vec()]);
    }

    #[test]
    fn test_missing_table_is_a_schema_mismatch() {
        let mut conn = verses_db();
        let schema = RangeSchema::new("commentary", "data", "book");
        assert!(matches!(schema.check_columns(&mut conn), Err(ModuleError::SchemaMismatch(_))));
    }

    #[test]
    fn test_bracketed_unknown_column_fails_to_prepare() {
        let mut conn = verses_db();
        let res = diesel::sql_query(verse_schema("book").to_sql())
            .bind::<Integer, _>(43)
            .bind::<Integer, _>(3)
            .bind::<Integer, _>(16)
            .load::<BodyRow>(&mut conn);
        assert!(res.is_err());
    }

    #[test]
    fn test_pick_uses_candidate_priority() {
        let cols = vec!["id".to_string(), "Text".to_string(), "Book".to_string(), "book_number".to_string()];
        assert_eq!(pick(COMMENTARY_PROFILE.book, &cols).map(|s| s.as_str()), Some("book_number"));
        assert_eq!(pick(COMMENTARY_PROFILE.text, &cols).map(|s| s.as_str()), Some("Text"));
        assert_eq!(pick(COMMENTARY_PROFILE.verse_to, &cols), None);
    }
}
