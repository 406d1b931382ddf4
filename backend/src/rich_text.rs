//! Plain text from the rich-text encodings found in commentary modules,
//! dictionaries and corpus files: RTF control words with `\uN?` escapes,
//! HTML fragments, and UTF-8 that went through a Latin-1 decode somewhere.

use regex::Regex;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Node};
use html_escape::decode_html_entities;

lazy_static! {
    static ref RE_UNICODE_ESCAPE: Regex = Regex::new(r"\\u(-?\d+)\??").unwrap();
    // Control groups, control words with an optional numeric argument, angle-bracket tags.
    static ref RE_RTF_MARKUP: Regex = Regex::new(r"\{\\.*?\}|\\([a-z]{1,10})(-?\d+)? ?|<.*?>").unwrap();
    static ref RE_RTF_CONTROL: Regex = Regex::new(r"\{\\.*?\}|\\([a-z]{1,10})(-?\d+)? ?").unwrap();
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_HTML_TAG: Regex = Regex::new(r"<[a-zA-Z/][^>]*>").unwrap();
    static ref RE_INLINE_SPACE: Regex = Regex::new(r"[ \t\r\f\v]+").unwrap();
    static ref RE_SPACE_AROUND_NEWLINE: Regex = Regex::new(r" *\n *").unwrap();
    static ref RE_MANY_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref RE_LATIN1_RUN: Regex = Regex::new(r"[\u{0080}-\u{00FF}]{2,}").unwrap();
    static ref RE_SCRIPT_QUESTION_MARK: Regex =
        Regex::new(r"([\u{0370}-\u{03FF}\u{0590}-\u{05FF}\u{AC00}-\u{D7A3}])\?").unwrap();
}

const BLOCK_TAGS: [&str; 8] = ["br", "p", "div", "li", "h1", "h2", "h3", "h4"];

/// Replace `\uN` escapes with the character they name.
///
/// RTF writes code points above 32767 as negative signed 16-bit numbers, so a
/// negative N is taken modulo 65536. Escapes that don't name a valid character
/// are left as they are.
pub fn decode_unicode_escapes(text: &str) -> String {
    RE_UNICODE_ESCAPE
        .replace_all(text, |caps: &regex::Captures| {
            let decoded = caps[1]
                .parse::<i64>()
                .ok()
                .map(|n| if n < 0 { n + 65536 } else { n })
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32);
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Decode RTF text into a single line of plain text.
///
/// Empty input gives an empty string. Bytes are read as UTF-8, invalid
/// sequences replaced.
pub fn decode_rtf<T: AsRef<[u8]>>(raw: T) -> String {
    let raw = raw.as_ref();
    if raw.is_empty() {
        return String::new();
    }
    let text = String::from_utf8_lossy(raw);

    let text = decode_unicode_escapes(&text);
    let text = RE_RTF_MARKUP.replace_all(&text, "");
    let text = text.replace(['{', '}'], "");

    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

pub fn looks_like_html(text: &str) -> bool {
    RE_HTML_TAG.is_match(text)
}

/// Text content of an HTML fragment. Block-level tags start a new line,
/// script and style content is dropped, entities are decoded by the parser.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    collect_text(fragment.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(el) => {
                let name = el.name();
                if name == "script" || name == "style" {
                    continue;
                }
                if BLOCK_TAGS.contains(&name) {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn is_repair_script(c: char) -> bool {
    matches!(c, '\u{0370}'..='\u{03FF}' | '\u{0590}'..='\u{05FF}' | '\u{AC00}'..='\u{D7A3}')
}

/// Number of Greek, Hebrew and Hangul syllable characters.
pub fn count_repair_script_chars(text: &str) -> usize {
    text.chars().filter(|c| is_repair_script(*c)).count()
}

/// Re-read runs of Latin-1 range characters as UTF-8 bytes, for text that was
/// decoded with the wrong charset. The result is only used if it has strictly
/// more Greek/Hebrew/Hangul characters than the input.
pub fn repair_latin1_mojibake(text: &str) -> String {
    if !RE_LATIN1_RUN.is_match(text) {
        return text.to_string();
    }

    let repaired = RE_LATIN1_RUN
        .replace_all(text, |caps: &regex::Captures| {
            let bytes: Vec<u8> = caps[0].chars().map(|c| c as u32 as u8).collect();
            match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(_) => caps[0].to_string(),
            }
        })
        .to_string();

    if count_repair_script_chars(&repaired) > count_repair_script_chars(text) {
        repaired
    } else {
        text.to_string()
    }
}

/// Decode dictionary and commentary content that may mix HTML, RTF and
/// mis-encoded UTF-8. Unlike `decode_rtf()` line breaks are kept.
pub fn decode_rich_html<T: AsRef<[u8]>>(raw: T) -> String {
    let raw = raw.as_ref();
    if raw.is_empty() {
        return String::new();
    }
    let content = String::from_utf8_lossy(raw);

    let text = if looks_like_html(&content) {
        html_to_text(&content)
    } else {
        decode_html_entities(&content).to_string()
    };

    let text = decode_unicode_escapes(&text);
    let text = RE_RTF_CONTROL.replace_all(&text, "");
    let text = text.replace(['{', '}'], "");
    let text = RE_INLINE_SPACE.replace_all(&text, " ");
    let text = RE_SPACE_AROUND_NEWLINE.replace_all(&text, "\n");

    let text = repair_latin1_mojibake(&text);
    let text = RE_SCRIPT_QUESTION_MARK.replace_all(&text, "$1");
    let text = RE_MANY_NEWLINES.replace_all(&text, "\n\n");

    text.trim().to_string()
}
