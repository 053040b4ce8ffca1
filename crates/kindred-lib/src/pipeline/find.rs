use std::time::Duration;

use tracing::{debug, info};

use crate::error::FindError;
use crate::pipeline::link_block::{BLOCK_FORMATS, merge, render_block, strip_block};
use crate::pipeline::scorer::{Ranking, rank_candidates};
use crate::pipeline::terms::NoteTerms;
use crate::search::invoker::{SearchInvoker, relative_to_root};
use crate::search::query::SearchOptions;
use crate::settings::Settings;
use crate::vault::{NoteHost, NoteRef};

/// Ranked similar notes for the active note, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarNotes {
    pub note: NoteRef,
    pub ranking: Ranking,
    /// The rendered link block for `ranking`.
    pub block: String,
}

impl SimilarNotes {
    /// The note's content with the link block merged in.
    pub fn apply(&self, content: &str, settings: &Settings) -> String {
        merge(content, &self.block, settings.insert_position, &BLOCK_FORMATS)
    }
}

/// Outcome of a completed "find similar notes and insert links" run.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReport {
    pub note: NoteRef,
    pub inserted: usize,
    pub used_fallback: bool,
}

impl LinkReport {
    /// User-facing summary of the run.
    pub fn notice(&self) -> String {
        let plural = if self.inserted == 1 { "" } else { "s" };
        let mut msg = format!(
            "Inserted {} similar note link{plural} into {}.",
            self.inserted,
            self.note.path()
        );
        if self.used_fallback {
            msg.push_str(" (keyword-overlap threshold relaxed)");
        }
        msg
    }
}

/// Extract terms from the active note, search the vault and rank the hits.
///
/// Phases:
/// 1. Resolve the active note and vault root
/// 2. Extract body and title terms
/// 3. Run the search tool
/// 4. Re-read and score the pooled candidates
/// 5. Render the link block
pub async fn find_similar_notes<H: NoteHost>(
    host: &H,
    settings: &Settings,
) -> Result<SimilarNotes, FindError> {
    // Phase 1
    let note = host.active_note().ok_or(FindError::NoActiveNote)?;
    let root = host.root_path().ok_or(FindError::RootPathUnresolved)?;

    // Phase 2
    let content = host.read_note(&note)?;
    let source = NoteTerms::from_note(
        &strip_block(&content, &BLOCK_FORMATS),
        note.file_name(),
    );
    let search_terms = source.search_terms();
    debug!(
        note = note.path(),
        body_terms = ?source.body,
        title_terms = ?source.title,
        "Phase 2: terms extracted"
    );
    if search_terms.is_empty() {
        return Err(FindError::NoKeywords {
            note: note.path().to_string(),
        });
    }

    // Phase 3
    let invoker = SearchInvoker::new(
        settings.tool_path.clone(),
        Duration::from_secs(settings.search_timeout_secs),
    );
    let matches = invoker
        .run(&root, &search_terms, &SearchOptions::from(settings))
        .await?;
    debug!(raw_matches = matches.len(), "Phase 3: search complete");
    if matches.is_empty() {
        return Err(FindError::NoCandidates);
    }

    // Phase 4
    let hit_paths: Vec<String> = matches
        .iter()
        .map(|m| relative_to_root(&m.path, &root))
        .collect();
    let ranking = rank_candidates(
        host,
        hit_paths.iter().map(String::as_str),
        &note,
        &source,
        settings,
    );
    debug!(
        ranked = ranking.candidates.len(),
        used_fallback = ranking.used_fallback,
        "Phase 4: candidates ranked"
    );
    if ranking.candidates.is_empty() {
        return Err(FindError::NoCandidates);
    }

    // Phase 5
    let block = render_block(&ranking.candidates);
    Ok(SimilarNotes {
        note,
        ranking,
        block,
    })
}

/// Find similar notes for the active note and merge the link block into it.
pub async fn insert_similar_links<H: NoteHost>(
    host: &H,
    settings: &Settings,
) -> Result<LinkReport, FindError> {
    let similar = find_similar_notes(host, settings).await?;
    host.transform_note(&similar.note, &|current| similar.apply(current, settings))?;

    let report = LinkReport {
        inserted: similar.ranking.candidates.len(),
        used_fallback: similar.ranking.used_fallback,
        note: similar.note,
    };
    info!(
        note = report.note.path(),
        inserted = report.inserted,
        used_fallback = report.used_fallback,
        "Similar note links inserted"
    );
    Ok(report)
}
