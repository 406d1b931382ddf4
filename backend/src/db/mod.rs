pub mod schema;
pub mod commentary;
pub mod bible_module;
pub mod lexicon;

use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel::sql_types::{Binary, Nullable, Text};
use thiserror::Error;

use crate::logger::warn;

/// Why a module file gave no rows. Never surfaces past the public lookups,
/// which log it and return an empty result.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Module file not available: {0}")]
    Unavailable(PathBuf),
    #[error("Can't open module database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("Module query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("No usable table or columns: {0}")]
    SchemaMismatch(String),
}

pub type ModuleResult<T> = Result<T, ModuleError>;

// Structs for querying sqlite_master and PRAGMA table_info
#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName, Debug)]
struct ColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

/// One text payload, selected as `CAST(col AS BLOB) AS body` so that TEXT and
/// BLOB storage read the same way.
#[derive(QueryableByName, Debug)]
pub struct BodyRow {
    #[diesel(sql_type = Nullable<Binary>)]
    pub body: Option<Vec<u8>>,
}

/// `file:` URI for a read-only connection. `%`, `?` and `#` would otherwise be
/// read as URI syntax.
pub fn read_only_uri(path: &Path) -> String {
    let p = path.to_string_lossy()
        .replace('%', "%25")
        .replace('?', "%3f")
        .replace('#', "%23");
    format!("file:{}?mode=ro", p)
}

/// Open a module file read-only. The connection is closed when dropped, so
/// holding it in a local scopes it to the lookup call.
pub fn open_module(path: &Path) -> ModuleResult<SqliteConnection> {
    match path.try_exists() {
        Ok(true) => {}
        _ => return Err(ModuleError::Unavailable(path.to_path_buf())),
    }
    Ok(SqliteConnection::establish(&read_only_uri(path))?)
}

pub fn list_tables(conn: &mut SqliteConnection) -> ModuleResult<Vec<String>> {
    let tables = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%';")
        .load::<TableName>(conn)?;
    Ok(tables.into_iter().map(|t| t.name).collect())
}

pub fn list_columns(conn: &mut SqliteConnection, table: &str) -> ModuleResult<Vec<String>> {
    let pragma_query = format!("PRAGMA table_info('{}');", table.replace('\'', "''"));
    let columns = diesel::sql_query(pragma_query).load::<ColumnInfo>(conn)?;
    Ok(columns.into_iter().map(|c| c.name).collect())
}

/// Bracket-quoted SQL identifier. SQLite reads a double-quoted name that
/// matches no column as a string literal, a bracketed one never.
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// File name for display, e.g. `MHC.cmt.mybible`.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// File name without the last extension, e.g. `MHC.cmt`.
pub fn file_stem_label(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_label(path))
}

/// Log a lookup failure and continue with an empty result.
pub fn log_module_error(context: &str, path: &Path, err: &ModuleError) {
    warn(&format!("{}: {}: {}", context, path.display(), err));
}
