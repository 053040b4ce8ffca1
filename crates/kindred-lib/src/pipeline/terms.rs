use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{MAX_BODY_TERMS, MIN_CJK_TERM_CHARS, MIN_LATIN_TERM_CHARS, MIN_NAME_TOKEN_CHARS};

/// Common English function words that never become search terms.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "his",
    "was", "one", "our", "out", "has", "have", "with", "this", "that", "from", "they", "will",
    "would", "there", "their", "what", "about", "which", "when", "where", "who", "whom", "why",
    "how", "into", "your", "some", "could", "them", "than", "then", "also", "its", "were",
    "been", "being", "does", "did", "doing", "should", "very", "such", "here", "each", "other",
    "more", "most", "may", "might", "must", "shall", "these", "those", "only", "just", "over",
    "after", "before", "because", "while", "both", "same", "own", "too", "off", "again",
];

/// Spans whose text must never reach the tokenizer: inline code, image
/// embeds, wiki links and markdown links. Images come before links so the
/// leading `!` is consumed with them.
static STRIPPED_SPANS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"`[^`\n]*`",
        r"|!\[\[[^\]\n]*\]\]",
        r"|!\[[^\]\n]*\]\([^)\n]*\)",
        r"|\[\[[^\]\n]*\]\]",
        r"|\[[^\]\n]*\]\([^)\n]*\)",
    ))
    .expect("static pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Latin,
    Cjk,
    Other,
}

/// Kana and Kanji ranges treated as CJK term characters.
const fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{3400}'..='\u{4DBF}' // CJK Extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        | '\u{F900}'..='\u{FAFF}' // CJK Compatibility Ideographs
    )
}

const fn classify(ch: char) -> CharClass {
    if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
        CharClass::Latin
    } else if is_cjk(ch) {
        CharClass::Cjk
    } else {
        CharClass::Other
    }
}

/// Split already-lowercased text into maximal runs of a single class.
///
/// A switch between Latin and CJK ends the run, matching the behaviour of
/// an alternation of the two character classes.
fn class_runs(text: &str) -> Vec<(CharClass, String)> {
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut current_class = CharClass::Other;

    for ch in text.chars() {
        let class = classify(ch);
        if class != current_class && !current.is_empty() {
            runs.push((current_class, std::mem::take(&mut current)));
        }
        current_class = class;
        if class != CharClass::Other {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        runs.push((current_class, current));
    }
    runs
}

fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.contains(&term)
}

/// Extract up to [`MAX_BODY_TERMS`] unique lowercase search terms from note
/// text, in first-seen order.
///
/// Code spans, images and links are removed before tokenizing. A term is a
/// run of 3+ Latin letters/digits or 2+ CJK characters that is not a stop
/// word.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let stripped = STRIPPED_SPANS.replace_all(text, " ");
    let lowered = stripped.to_lowercase();

    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for (class, run) in class_runs(&lowered) {
        let min_chars = match class {
            CharClass::Latin => MIN_LATIN_TERM_CHARS,
            CharClass::Cjk => MIN_CJK_TERM_CHARS,
            CharClass::Other => continue,
        };
        if run.chars().count() < min_chars || is_stop_word(&run) {
            continue;
        }
        if seen.insert(run.clone()) {
            terms.push(run);
            if terms.len() == MAX_BODY_TERMS {
                break;
            }
        }
    }
    terms
}

/// Strip a trailing `.ext` from a file name or `/`-separated path. Dots in
/// folder names are left alone.
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |idx| idx + 1);
    match path[name_start..].rfind('.') {
        Some(idx) => &path[..name_start + idx],
        None => path,
    }
}

/// Tokenize a note's file name into unique lowercase tokens.
///
/// Splits on anything that is neither Latin/digit nor CJK and keeps tokens
/// of at least two characters. Mixed-script tokens such as `rust入門` stay
/// whole. No stop words, no cap.
pub fn tokenize_name(file_name: &str) -> Vec<String> {
    let lowered = strip_extension(file_name).to_lowercase();

    let mut seen = HashSet::new();
    lowered
        .split(|ch: char| classify(ch) == CharClass::Other)
        .filter(|token| token.chars().count() >= MIN_NAME_TOKEN_CHARS)
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Body and title vocabulary of a single note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteTerms {
    pub body: Vec<String>,
    pub title: Vec<String>,
}

impl NoteTerms {
    pub fn from_note(content: &str, file_name: &str) -> Self {
        Self {
            body: extract_keywords(content),
            title: tokenize_name(file_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.title.is_empty()
    }

    /// Terms handed to the search tool: body terms, then title tokens not
    /// already present in the body.
    pub fn search_terms(&self) -> Vec<String> {
        let mut terms = self.body.clone();
        for token in &self.title {
            if !terms.contains(token) {
                terms.push(token.clone());
            }
        }
        terms
    }

    /// Union of body and title terms.
    pub fn all(&self) -> HashSet<&str> {
        self.body
            .iter()
            .chain(&self.title)
            .map(String::as_str)
            .collect()
    }
}
