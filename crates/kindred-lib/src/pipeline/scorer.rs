use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::{CANDIDATE_POOL_LIMIT, RAW_HIT_BONUS_CAP};
use crate::pipeline::link_block::{BLOCK_FORMATS, strip_block};
use crate::pipeline::terms::NoteTerms;
use crate::settings::Settings;
use crate::vault::{NoteHost, NoteRef};

/// A note proposed as similar to the source note.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub note: NoteRef,
    pub display_name: String,
    pub raw_hits: usize,
    pub overlap_body: usize,
    pub overlap_title: usize,
    pub total_overlap: usize,
    pub similarity: f64,
    pub score: f64,
}

/// Result of a ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub candidates: Vec<Candidate>,
    /// Whether the keyword-overlap threshold had to be relaxed.
    pub used_fallback: bool,
}

/// Count hits per path, leaving out the source note.
pub fn aggregate_hits<'a>(
    paths: impl IntoIterator<Item = &'a str>,
    source_path: &str,
) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for path in paths {
        if path == source_path {
            continue;
        }
        *counts.entry(path.to_string()).or_default() += 1;
    }
    counts
}

/// Pick the paths worth re-reading: highest hit counts first, those meeting
/// `min_score`, at most [`CANDIDATE_POOL_LIMIT`]. When nothing meets
/// `min_score` the unfiltered top paths are used instead.
pub fn select_pool(counts: &HashMap<String, usize>, min_score: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts.iter().map(|(p, c)| (p.clone(), *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let filtered: Vec<_> = ranked
        .iter()
        .filter(|(_, count)| *count >= min_score)
        .take(CANDIDATE_POOL_LIMIT)
        .cloned()
        .collect();
    if !filtered.is_empty() {
        return filtered;
    }
    ranked.truncate(CANDIDATE_POOL_LIMIT);
    ranked
}

/// Score one candidate against the source vocabulary.
///
/// Returns `None` when the two notes share no terms at all. Title tokens of
/// the candidate may match either the source's title or body terms.
#[allow(clippy::cast_precision_loss)]
pub fn score_candidate(
    note: NoteRef,
    source: &NoteTerms,
    candidate: &NoteTerms,
    raw_hits: usize,
    title_weight: u32,
) -> Option<Candidate> {
    let source_body: HashSet<&str> = source.body.iter().map(String::as_str).collect();
    let source_title: HashSet<&str> = source.title.iter().map(String::as_str).collect();

    let overlap_body = candidate
        .body
        .iter()
        .filter(|t| source_body.contains(t.as_str()))
        .count();
    let overlap_title = candidate
        .title
        .iter()
        .filter(|t| source_title.contains(t.as_str()) || source_body.contains(t.as_str()))
        .count();
    let total_overlap = overlap_body + overlap_title;
    if total_overlap == 0 {
        return None;
    }

    let source_all = source.all();
    let candidate_all = candidate.all();
    let shared = source_all.intersection(&candidate_all).count();
    let union = source_all.union(&candidate_all).count().max(1);
    let similarity = shared as f64 / union as f64;

    let weighted = overlap_body as f64 + f64::from(title_weight) * overlap_title as f64;
    let score = weighted * (1.0 + similarity) + raw_hits.min(RAW_HIT_BONUS_CAP) as f64;

    Some(Candidate {
        display_name: note.display_name().to_string(),
        note,
        raw_hits,
        overlap_body,
        overlap_title,
        total_overlap,
        similarity,
        score,
    })
}

/// Total order over candidates: score, similarity, title overlap and body
/// overlap descending, then display name and path ascending.
pub fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.similarity.total_cmp(&a.similarity))
        .then_with(|| b.overlap_title.cmp(&a.overlap_title))
        .then_with(|| b.overlap_body.cmp(&a.overlap_body))
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.note.path().cmp(b.note.path()))
}

/// Choose between the primary and fallback lists, sort, and truncate.
pub fn finalize(
    primary: Vec<Candidate>,
    fallback: Vec<Candidate>,
    max_links: usize,
) -> Ranking {
    let used_fallback = primary.is_empty() && !fallback.is_empty();
    let mut candidates = if used_fallback { fallback } else { primary };
    candidates.sort_by(compare_candidates);
    candidates.truncate(max_links);
    Ranking {
        candidates,
        used_fallback,
    }
}

/// Re-read and rank the notes behind `hit_paths`.
///
/// `hit_paths` are vault-relative paths, one per raw search match. Paths
/// that do not resolve to a readable content note are skipped.
pub fn rank_candidates<'a, H: NoteHost>(
    host: &H,
    hit_paths: impl IntoIterator<Item = &'a str>,
    source_note: &NoteRef,
    source: &NoteTerms,
    settings: &Settings,
) -> Ranking {
    let counts = aggregate_hits(hit_paths, source_note.path());
    let pool = select_pool(&counts, settings.min_score);
    debug!(
        distinct_paths = counts.len(),
        pool = pool.len(),
        min_score = settings.min_score,
        "Candidate pool selected"
    );

    let mut primary = Vec::new();
    let mut fallback = Vec::new();
    for (path, raw_hits) in pool {
        let Some(note) = host.resolve_note(&path) else {
            debug!(path = %path, "Candidate does not resolve to a note, skipping");
            continue;
        };
        if !note.is_content_note() || note == *source_note {
            continue;
        }
        let content = match host.read_note(&note) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to read candidate, skipping");
                continue;
            }
        };

        let body = strip_block(&content, &BLOCK_FORMATS);
        let terms = NoteTerms::from_note(&body, note.file_name());
        let Some(candidate) =
            score_candidate(note, source, &terms, raw_hits, settings.title_weight)
        else {
            continue;
        };
        if candidate.total_overlap >= settings.min_keyword_overlap {
            primary.push(candidate.clone());
        }
        fallback.push(candidate);
    }

    debug!(
        primary = primary.len(),
        fallback = fallback.len(),
        min_keyword_overlap = settings.min_keyword_overlap,
        "Candidates scored"
    );
    finalize(primary, fallback, settings.max_links)
}
