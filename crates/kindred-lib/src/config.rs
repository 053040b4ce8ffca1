/// Maximum number of unique body terms extracted from a single note.
///
/// Bounds both the size of the search alternation and the cost of
/// re-scoring. Title tokens are appended separately and are not capped.
pub const MAX_BODY_TERMS: usize = 20;

/// Minimum length (in characters) of a Latin/digit body term.
pub const MIN_LATIN_TERM_CHARS: usize = 3;

/// Minimum length (in characters) of a CJK body term.
pub const MIN_CJK_TERM_CHARS: usize = 2;

/// Minimum length (in characters) of a filename token.
pub const MIN_NAME_TOKEN_CHARS: usize = 2;

/// Upper bound on the number of candidate paths re-read and re-scored.
pub const CANDIDATE_POOL_LIMIT: usize = 60;

/// Cap on the raw-hit contribution to a candidate's score.
///
/// Lets search frequency nudge the ranking without letting one term that
/// repeats many times in a single file outrank genuine topical overlap.
pub const RAW_HIT_BONUS_CAP: usize = 2;

/// File extension of notes that take part in ranking.
pub const NOTE_EXTENSION: &str = "md";

/// Directory (relative to the vault root) holding kindred state.
pub const STATE_DIR_NAME: &str = ".kindred";

/// Settings file name inside [`STATE_DIR_NAME`].
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Binary and media globs never handed to the search tool.
pub const MEDIA_EXCLUDE_GLOBS: &[&str] = &[
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.bmp", "*.svg", "*.webp", "*.pdf",
];
