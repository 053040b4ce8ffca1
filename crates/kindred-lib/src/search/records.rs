use std::io::BufRead;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One hit reported by the search tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub path: String,
    pub line_number: u64,
}

/// A single line of the search tool's JSON output.
///
/// Only the fields consulted for `match` records are modelled; everything
/// else is ignored by serde.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    data: Option<RecordData>,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    path: Option<TextField>,
    /// Kept loose so an odd line number never drops the hit itself.
    #[serde(default)]
    line_number: Option<Value>,
    #[serde(default)]
    submatches: Vec<Submatch>,
}

/// Paths that are not valid UTF-8 arrive as `{"bytes": ...}` and have no
/// `text`; such records are skipped.
#[derive(Debug, Deserialize)]
struct TextField {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Submatch {
    #[serde(default)]
    line_number: Option<Value>,
}

impl Record {
    fn into_match(self) -> Option<SearchMatch> {
        if self.record_type != "match" {
            return None;
        }
        let data = self.data?;
        let path = data.path?.text?;
        let line_number = data
            .submatches
            .first()
            .and_then(|s| s.line_number.as_ref().and_then(Value::as_u64))
            .or_else(|| data.line_number.as_ref().and_then(Value::as_u64))
            .unwrap_or(0);
        Some(SearchMatch { path, line_number })
    }
}

/// Lazily parses newline-delimited search output into [`SearchMatch`]es.
///
/// Lines that fail to read or parse are skipped, as are records of any type
/// other than `match`. The stream is finite and cannot be restarted.
pub struct MatchStream<R> {
    lines: std::io::Lines<R>,
    line_index: usize,
    skipped: usize,
}

impl<R: BufRead> MatchStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_index: 0,
            skipped: 0,
        }
    }

    /// Number of non-empty lines that could not be parsed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for MatchStream<R> {
    type Item = SearchMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line_result = self.lines.next()?;
            let line_idx = self.line_index;
            self.line_index += 1;

            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    warn!(line = line_idx, error = %e, "Failed to read search output line, skipping");
                    self.skipped += 1;
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Record>(&line) {
                Ok(record) => {
                    if let Some(hit) = record.into_match() {
                        return Some(hit);
                    }
                }
                Err(e) => {
                    debug!(line = line_idx, error = %e, "Unparseable search output line, skipping");
                    self.skipped += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kindred_test_util::ripgrep::{begin_record, end_record, match_record, summary_record};

    use super::*;

    fn parse(output: &str) -> Vec<SearchMatch> {
        MatchStream::new(output.as_bytes()).collect()
    }

    fn hit(path: &str, line_number: u64) -> SearchMatch {
        SearchMatch {
            path: path.to_string(),
            line_number,
        }
    }

    #[test]
    fn keeps_only_match_records() {
        let output = [
            begin_record("/v/a.md"),
            match_record("/v/a.md", 3),
            match_record("/v/a.md", 9),
            end_record("/v/a.md"),
            summary_record(),
        ]
        .join("\n");

        assert_eq!(parse(&output), vec![hit("/v/a.md", 3), hit("/v/a.md", 9)]);
    }

    #[test]
    fn skips_malformed_lines() {
        let output = format!(
            "{}\nnot json at all\n{{\"type\":\"match\",\"data\":\n\n{}\n",
            match_record("a.md", 1),
            match_record("b.md", 2),
        );
        let mut stream = MatchStream::new(output.as_bytes());
        let hits: Vec<_> = stream.by_ref().collect();

        assert_eq!(hits, vec![hit("a.md", 1), hit("b.md", 2)]);
        assert_eq!(stream.skipped(), 2);
    }

    #[test]
    fn prefers_submatch_line_number() {
        let output = r#"{"type":"match","data":{"path":{"text":"a.md"},"line_number":7,"submatches":[{"line_number":12}]}}"#;
        assert_eq!(parse(output), vec![hit("a.md", 12)]);
    }

    #[test]
    fn falls_back_to_record_line_number_then_zero() {
        let output = concat!(
            r#"{"type":"match","data":{"path":{"text":"a.md"},"line_number":7,"submatches":[{"match":{"text":"x"}}]}}"#,
            "\n",
            r#"{"type":"match","data":{"path":{"text":"b.md"}}}"#,
        );
        assert_eq!(parse(output), vec![hit("a.md", 7), hit("b.md", 0)]);
    }

    #[test]
    fn non_numeric_line_number_defaults_to_zero() {
        let output = concat!(
            r#"{"type":"match","data":{"path":{"text":"a.md"},"line_number":"seven"}}"#,
            "\n",
            r#"{"type":"match","data":{"path":{"text":"b.md"},"line_number":-3,"submatches":[{"line_number":null}]}}"#,
            "\n",
            r#"{"type":"match","data":{"path":{"text":"c.md"},"line_number":4,"submatches":[{"line_number":"x"}]}}"#,
        );
        assert_eq!(parse(output), vec![hit("a.md", 0), hit("b.md", 0), hit("c.md", 4)]);
    }

    #[test]
    fn skips_records_without_text_path() {
        let output = concat!(
            r#"{"type":"match","data":{"path":{"bytes":"L3YvYS5tZA=="},"line_number":1}}"#,
            "\n",
            r#"{"type":"match","data":{"line_number":1}}"#,
            "\n",
            r#"{"type":"match"}"#,
        );
        assert!(parse(output).is_empty());
    }

    #[test]
    fn empty_output() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n").is_empty());
    }
}
