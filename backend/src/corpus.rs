//! Reading tagged corpus documents as plain text.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::rich_text::{decode_rtf, html_to_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Txt,
    Rtf,
    Html,
}

impl CorpusFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "txt" => Some(CorpusFormat::Txt),
            "rtf" => Some(CorpusFormat::Rtf),
            "html" | "htm" => Some(CorpusFormat::Html),
            _ => None,
        }
    }
}

/// Text of a corpus document. Invalid UTF-8 is replaced, not rejected.
pub fn read_corpus_file(path: &Path) -> Result<String> {
    let Some(format) = CorpusFormat::from_path(path) else {
        bail!("Unsupported corpus file: {}", path.display());
    };

    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let text = match format {
        CorpusFormat::Txt => String::from_utf8_lossy(&bytes).to_string(),
        CorpusFormat::Rtf => decode_rtf(&bytes),
        CorpusFormat::Html => html_to_text(&String::from_utf8_lossy(&bytes)),
    };
    Ok(text)
}
