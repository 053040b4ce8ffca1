use thiserror::Error;

/// Failures of a "find similar notes" invocation.
///
/// None of these are retried; the caller reports [`FindError::notice`] to
/// the user and logs the full error.
#[derive(Debug, Error)]
pub enum FindError {
    #[error("No active note")]
    NoActiveNote,

    #[error("No keywords could be extracted from {note}")]
    NoKeywords { note: String },

    #[error("Could not determine the vault root path")]
    RootPathUnresolved,

    #[error("Failed to start search tool {tool}: {source}")]
    SearchSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Search tool exited with status {code:?} and no output: {stderr}")]
    SearchProcess { code: Option<i32>, stderr: String },

    #[error("Search tool did not finish within {secs}s")]
    SearchTimeout { secs: u64 },

    #[error("No similar notes found")]
    NoCandidates,

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl FindError {
    /// Short, human-readable message for user-facing notices.
    pub fn notice(&self) -> String {
        match self {
            Self::NoActiveNote => "No active note.".to_string(),
            Self::NoKeywords { .. } => "No keywords found in this note.".to_string(),
            Self::RootPathUnresolved => "Could not resolve the vault path.".to_string(),
            Self::SearchSpawn { tool, .. } => {
                format!("Could not run the search tool `{tool}`. Check the tool path setting.")
            }
            Self::SearchProcess { .. } => "The search tool failed.".to_string(),
            Self::SearchTimeout { secs } => format!("Search timed out after {secs}s."),
            Self::NoCandidates => "No similar notes found.".to_string(),
            Self::Host(err) => format!("Note access failed: {err}"),
        }
    }
}
