use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use walkdir::WalkDir;

use crate::logger::debug;

pub const COMMENTARY_EXTENSIONS: [&str; 9] = [
    ".cmt.mybible", ".cmt.twm", ".mybible", ".twm", ".sqlite3", ".sqlite", ".cdb", ".cmti", ".cmtx",
];

pub const BIBLE_MODULE_EXTENSIONS: [&str; 5] = [".mybible", ".twm", ".cdb", ".sqlite3", ".sqlite"];

pub const DICTIONARY_EXTENSION: &str = ".dct.twm";

/// A `*.dct.twm` file found by `scan_dictionary_files()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryFile {
    pub path: PathBuf,
    pub file_name: String,
    /// File name without `.dct.twm`, e.g. `krstrong`.
    pub display_name: String,
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Files under `folders` (recursively) whose lower-cased name is accepted by
/// `keep`. Absolute paths in walk order, without duplicates. Missing folders
/// are skipped.
fn walk_files<F>(folders: &[PathBuf], keep: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> bool,
{
    let mut found: IndexSet<PathBuf> = IndexSet::new();

    for folder in folders {
        if !folder.is_dir() {
            debug(&format!("Skipping missing folder: {}", folder.display()));
            continue;
        }

        let mut entries: Vec<PathBuf> = WalkDir::new(folder)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy().to_lowercase();
                !name.starts_with('.') && keep(&name)
            })
            .map(|e| absolute(e.path()))
            .collect();
        entries.sort();

        found.extend(entries);
    }

    found.into_iter().collect()
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext))
}

/// Commentary module files. Dictionaries share the `.twm` extension and are
/// left out.
pub fn scan_commentary_files(folders: &[PathBuf]) -> Vec<PathBuf> {
    walk_files(folders, |name| {
        has_extension(name, &COMMENTARY_EXTENSIONS) && !name.ends_with(DICTIONARY_EXTENSION)
    })
}

/// Bible text module files, i.e. the module extensions without `.cmt.` or
/// `.dct.` in the name.
pub fn scan_bible_module_files(folders: &[PathBuf]) -> Vec<PathBuf> {
    walk_files(folders, |name| {
        has_extension(name, &BIBLE_MODULE_EXTENSIONS) && !name.contains(".cmt.") && !name.contains(".dct.")
    })
}

/// Corpus documents by extension, given with or without the leading dot.
pub fn scan_corpus_files(folders: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let extensions: Vec<String> = extensions
        .iter()
        .map(|e| format!(".{}", e.trim_start_matches('.').to_lowercase()))
        .collect();
    walk_files(folders, |name| extensions.iter().any(|ext| name.ends_with(ext.as_str())))
}

/// Dictionaries directly in `folder`, sorted by display name.
pub fn scan_dictionary_files(folder: &Path) -> Vec<DictionaryFile> {
    let Ok(read_dir) = std::fs::read_dir(folder) else {
        debug(&format!("No dictionary folder: {}", folder.display()));
        return Vec::new();
    };

    let mut files: Vec<DictionaryFile> = read_dir
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let file_name = e.file_name().to_string_lossy().to_string();
            if !file_name.to_lowercase().ends_with(DICTIONARY_EXTENSION) {
                return None;
            }
            let display_name = file_name[..file_name.len() - DICTIONARY_EXTENSION.len()].to_string();
            Some(DictionaryFile {
                path: absolute(&e.path()),
                file_name,
                display_name,
            })
        })
        .collect();

    files.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_scan_module_files() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        touch(dir.path(), "MHC.cmt.mybible");
        touch(dir.path(), "KJV.mybible");
        touch(dir.path(), "strong.dct.twm");
        touch(dir.path(), "notes.txt");
        touch(&sub, "Gill.CMTX");
        touch(&sub, "esv.twm");

        let folders = vec![dir.path().to_path_buf(), dir.path().join("missing")];

        let commentaries: Vec<String> = scan_commentary_files(&folders)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(commentaries, vec!["KJV.mybible", "MHC.cmt.mybible", "Gill.CMTX", "esv.twm"]);

        let bibles: Vec<String> = scan_bible_module_files(&folders)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(bibles, vec!["KJV.mybible", "esv.twm"]);

        assert!(scan_commentary_files(&folders).iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_scan_dedups_overlapping_folders() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.txt");
        let folders = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
        let files = scan_corpus_files(&folders, &["txt".to_string()]);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_scan_dictionary_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "krstrong.dct.twm");
        touch(dir.path(), "easton.dct.twm");
        touch(dir.path(), "KJV.twm");

        let dicts = scan_dictionary_files(dir.path());
        let names: Vec<&str> = dicts.iter().map(|d| d.display_name.as_str()).collect();
        assert_eq!(names, vec!["easton", "krstrong"]);
        assert_eq!(dicts[1].file_name, "krstrong.dct.twm");

        assert!(scan_dictionary_files(&dir.path().join("none")).is_empty());
    }
}
