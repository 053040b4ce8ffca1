use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::MEDIA_EXCLUDE_GLOBS;
use crate::settings::Settings;

/// Characters escaped before a term enters the alternation pattern.
const REGEX_META: &[char] = &[
    '-', '/', '\\', '^', '$', '*', '+', '?', '.', '(', ')', '|', '[', ']', '{', '}',
];

/// Characters that mark an ignore pattern as a glob rather than a folder.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '!'];

/// Search-tool options derived from [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub ignore_patterns: Vec<String>,
    pub ignore_folders: Vec<String>,
}

impl From<&Settings> for SearchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            case_sensitive: settings.case_sensitive,
            whole_word: settings.whole_word,
            ignore_patterns: settings.ignore_patterns.clone(),
            ignore_folders: settings.ignore_folders.clone(),
        }
    }
}

/// A fully described search-tool invocation. Building one never runs
/// anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub pattern: String,
    pub root: PathBuf,
    pub args: Vec<OsString>,
}

/// Escape every regex metacharacter in `term`.
pub fn escape_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if REGEX_META.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Join escaped terms into a single alternation. `None` for no terms.
pub fn build_pattern(terms: &[String]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| escape_term(t))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Trim surrounding slashes and unify separators to `/`.
fn normalize_folder(raw: &str) -> String {
    raw.trim().replace('\\', "/").trim_matches('/').to_string()
}

/// Exclusion globs for one folder: `folder/**`, plus `**/folder/**` when the
/// folder is a bare name that should be excluded at any depth.
fn folder_globs(folder: &str) -> Vec<String> {
    let folder = normalize_folder(folder);
    if folder.is_empty() {
        return Vec::new();
    }
    let mut globs = vec![format!("{folder}/**")];
    if !folder.contains('/') {
        globs.push(format!("**/{folder}/**"));
    }
    globs
}

/// Compute the deduplicated exclusion globs for the configured ignore
/// folders and patterns, in insertion order.
pub fn exclusion_globs(options: &SearchOptions) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut globs = Vec::new();
    let mut push = |glob: String| {
        if seen.insert(glob.clone()) {
            globs.push(glob);
        }
    };

    for folder in &options.ignore_folders {
        folder_globs(folder).into_iter().for_each(&mut push);
    }
    for pattern in &options.ignore_patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        if pattern.contains(GLOB_META) {
            push(pattern.to_string());
        } else {
            folder_globs(pattern).into_iter().for_each(&mut push);
        }
    }
    globs
}

/// Build the search request for `terms` under `root`.
///
/// Returns `None` when there are no terms, meaning no search is performed.
/// Argument order: output mode flags, exclusions, case flag, optional
/// whole-word flag, pattern, root.
pub fn build_request(
    terms: &[String],
    root: &Path,
    options: &SearchOptions,
) -> Option<SearchRequest> {
    let pattern = build_pattern(terms)?;

    let mut args: Vec<OsString> = ["--json", "-n", "--no-heading", "--hidden", "--color=never"]
        .into_iter()
        .map(OsString::from)
        .collect();

    let media = MEDIA_EXCLUDE_GLOBS.iter().map(|g| (*g).to_string());
    for glob in media.chain(exclusion_globs(options)) {
        args.push("-g".into());
        args.push(format!("!{glob}").into());
    }

    args.push(if options.case_sensitive { "-s" } else { "-i" }.into());
    if options.whole_word {
        args.push("-w".into());
    }
    args.push(pattern.clone().into());
    args.push(root.as_os_str().to_owned());

    Some(SearchRequest {
        pattern,
        root: root.to_path_buf(),
        args,
    })
}
