use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::app_settings::AppSettings;
use crate::book_aliases::{get_alias_table, AliasTable};
use crate::cache::ContentCache;
use crate::corpus::read_corpus_file;
use crate::db::bible_module::load_bible_verse;
use crate::db::commentary::load_commentary;
use crate::db::lexicon::{detect_index_column, index_samples, lookup_lexicon, LexiconEntry};
use crate::dir_list::{
    scan_bible_module_files, scan_commentary_files, scan_corpus_files, scan_dictionary_files, DictionaryFile,
};
use crate::extract::{fetch_intro, fetch_verse_text_indexed, fetch_verse_text_scan};
use crate::logger::{debug, info, warn};
use crate::reference::{parse_reference, resolve_book};
use crate::tag_index::TagIndex;
use crate::types::{BookCode, CommentaryRecord, PassageMap, RefMode};

/// Settings, the shared alias table, and the tag indexes of recently searched
/// texts.
#[derive(Debug)]
pub struct AppData {
    pub settings: AppSettings,
    aliases: &'static AliasTable,
    tag_cache: Mutex<ContentCache<Arc<TagIndex>>>,
}

impl AppData {
    pub fn new(settings: AppSettings) -> Self {
        let tag_cache = Mutex::new(ContentCache::new(settings.tag_index_cache_capacity));
        AppData {
            settings,
            aliases: get_alias_table(),
            tag_cache,
        }
    }

    /// With the settings from the application directory.
    pub fn load() -> Self {
        AppData::new(AppSettings::load())
    }

    pub fn aliases(&self) -> &'static AliasTable {
        self.aliases
    }

    pub fn resolve_book(&self, book_input: &str) -> Option<BookCode> {
        resolve_book(book_input, self.aliases)
    }

    /// The tag index of `text`, built on first use. The lock is not held while
    /// building, so two threads may build the same index once each.
    pub fn tag_index(&self, text: &str) -> Arc<TagIndex> {
        if let Some(index) = self.tag_cache.lock().get(text) {
            return index;
        }
        let built = Arc::new(TagIndex::build(text, self.aliases));
        self.tag_cache.lock().get_or_insert_with(text, || built)
    }

    pub fn clear_tag_cache(&self) {
        self.tag_cache.lock().clear();
    }

    pub fn tag_cache_len(&self) -> usize {
        self.tag_cache.lock().len()
    }

    /// Passages of `text` for the reference: introductions always, verse
    /// passages when the reference names verses. Empty when the book doesn't
    /// resolve.
    pub fn search_text(&self, text: &str, book: &str, chapter: &str, verse: &str) -> PassageMap {
        let Some(reference) = parse_reference(book, chapter, verse, self.aliases) else {
            debug(&format!("search_text(): unknown book: {}", book));
            return PassageMap::new();
        };

        let mut results = fetch_intro(text, reference.book, &reference.chapter, verse.trim(), self.aliases);

        if reference.mode == RefMode::Verse {
            let verses = if self.settings.use_tag_index {
                let index = self.tag_index(text);
                fetch_verse_text_indexed(text, &index, reference.book, &reference.chapter, &reference.verses)
            } else {
                fetch_verse_text_scan(text, reference.book, &reference.chapter, &reference.verses, self.aliases)
            };
            for (heading, body) in verses {
                results.entry(heading).or_insert(body);
            }
        }

        results
    }

    /// `search_text()` over corpus files, in parallel. Files without passages
    /// or that can't be read are left out, the rest keep the order of `paths`.
    pub fn search_corpus_files(
        &self,
        paths: &[PathBuf],
        book: &str,
        chapter: &str,
        verse: &str,
    ) -> Vec<(PathBuf, PassageMap)> {
        let results: Vec<(PathBuf, PassageMap)> = paths
            .par_iter()
            .filter_map(|path| {
                let text = match read_corpus_file(path) {
                    Ok(t) => t,
                    Err(e) => {
                        warn(&format!("search_corpus_files(): {:#}", e));
                        return None;
                    }
                };
                let passages = self.search_text(&text, book, chapter, verse);
                if passages.is_empty() {
                    None
                } else {
                    Some((path.clone(), passages))
                }
            })
            .collect();

        info(&format!("search_corpus_files(): {} of {} files matched", results.len(), paths.len()));
        results
    }

    /// `search_corpus_files()` over the configured corpus folders.
    pub fn search_corpus(&self, book: &str, chapter: &str, verse: &str) -> Vec<(PathBuf, PassageMap)> {
        let paths = scan_corpus_files(&self.settings.corpus_folders, &self.settings.corpus_extensions);
        self.search_corpus_files(&paths, book, chapter, verse)
    }

    /// Book id, chapter and verse as module files index them. None if the
    /// book doesn't resolve or chapter/verse aren't integers.
    fn module_location(&self, book: &str, chapter: &str, verse: &str) -> Option<(i32, i32, i32)> {
        let book_id = self.resolve_book(book)?.book_id() as i32;
        let chapter = chapter.trim().parse::<i32>().ok()?;
        let verse = verse.trim().parse::<i32>().ok()?;
        Some((book_id, chapter, verse))
    }

    /// Commentary entries from every file, formatted as `#### 📚 [label]\nbody`.
    /// Identical strings are kept once, at their first position.
    pub fn external_commentaries(&self, paths: &[PathBuf], book: &str, chapter: &str, verse: &str) -> Vec<String> {
        let Some((book_id, chap, vers)) = self.module_location(book, chapter, verse) else {
            debug(&format!("external_commentaries(): can't locate {} {}:{}", book, chapter, verse));
            return Vec::new();
        };

        let per_file: Vec<Vec<CommentaryRecord>> = paths
            .par_iter()
            .map(|path| load_commentary(path, book_id, chap, vers))
            .collect();

        dedup_formatted(per_file.into_iter().flatten())
    }

    /// `external_commentaries()` over the configured commentary folders.
    pub fn commentaries(&self, book: &str, chapter: &str, verse: &str) -> Vec<String> {
        let paths = scan_commentary_files(&self.settings.commentary_folders);
        self.external_commentaries(&paths, book, chapter, verse)
    }

    /// The verse from every Bible module that has it, formatted as
    /// `#### 📖 [file name]\ntext`.
    pub fn bible_module_verses(&self, paths: &[PathBuf], book: &str, chapter: &str, verse: &str) -> Vec<String> {
        let Some((book_id, chap, vers)) = self.module_location(book, chapter, verse) else {
            return Vec::new();
        };

        let per_file: Vec<Option<CommentaryRecord>> = paths
            .par_iter()
            .map(|path| load_bible_verse(path, book_id, chap, vers))
            .collect();

        dedup_formatted(per_file.into_iter().flatten())
    }

    /// `bible_module_verses()` over the configured Bible folders.
    pub fn bible_verses(&self, book: &str, chapter: &str, verse: &str) -> Vec<String> {
        let paths = scan_bible_module_files(&self.settings.bible_folders);
        self.bible_module_verses(&paths, book, chapter, verse)
    }

    pub fn dictionaries(&self) -> Vec<DictionaryFile> {
        match &self.settings.dictionary_folder {
            Some(folder) => scan_dictionary_files(folder),
            None => Vec::new(),
        }
    }

    /// Look `term` up in a dictionary file, using its detected index column.
    pub fn lookup_term(&self, path: &Path, term: &str) -> Option<LexiconEntry> {
        let column = detect_index_column(path)?;
        lookup_lexicon(path, term, &column)
    }

    /// A few headwords of the dictionary, to show what its index looks like.
    pub fn dictionary_samples(&self, path: &Path, limit: i32) -> Vec<String> {
        match detect_index_column(path) {
            Some(column) => index_samples(path, &column, limit),
            None => Vec::new(),
        }
    }
}

fn dedup_formatted<I>(records: I) -> Vec<String>
where
    I: Iterator<Item = CommentaryRecord>,
{
    let unique: IndexSet<String> = records.map(|r| r.formatted()).collect();
    unique.into_iter().collect()
}

/// `heading\nbody` blocks separated by a blank line.
pub fn format_passages(passages: &PassageMap) -> String {
    passages
        .iter()
        .map(|(heading, body)| format!("{}\n{}", heading, body))
        .collect::<Vec<String>>()
        .join("\n\n")
}
