use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::query::{SearchOptions, SearchRequest, build_request};
use super::records::{MatchStream, SearchMatch};
use crate::error::FindError;

/// Exit status the search tool uses for "ran fine, matched nothing".
const NO_MATCH_EXIT_CODE: i32 = 1;

/// Runs the external search tool and collects its matches.
#[derive(Debug, Clone)]
pub struct SearchInvoker {
    tool_path: String,
    timeout: Duration,
}

impl SearchInvoker {
    pub fn new(tool_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tool_path: tool_path.into(),
            timeout,
        }
    }

    /// Search `root` for any of `terms`.
    ///
    /// No terms means no subprocess and no matches. A nonzero exit with
    /// partial output is logged and the output still parsed; a nonzero exit
    /// with no output at all is a [`FindError::SearchProcess`].
    pub async fn run(
        &self,
        root: &Path,
        terms: &[String],
        options: &SearchOptions,
    ) -> Result<Vec<SearchMatch>, FindError> {
        let Some(request) = build_request(terms, root, options) else {
            debug!("No search terms, skipping search tool");
            return Ok(Vec::new());
        };
        self.execute(&request).await
    }

    async fn execute(&self, request: &SearchRequest) -> Result<Vec<SearchMatch>, FindError> {
        debug!(
            tool = %self.tool_path,
            root = %request.root.display(),
            pattern = %request.pattern,
            arg_count = request.args.len(),
            "Running search tool"
        );

        let child = Command::new(&self.tool_path)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FindError::SearchSpawn {
                tool: self.tool_path.clone(),
                source,
            })?;

        // Dropping the pending future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| FindError::SearchTimeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| FindError::SearchSpawn {
                tool: self.tool_path.clone(),
                source,
            })?;

        let code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() && code != Some(NO_MATCH_EXIT_CODE) {
            if output.stdout.is_empty() {
                return Err(FindError::SearchProcess { code, stderr });
            }
            warn!(
                code = ?code,
                stderr = %stderr,
                stdout_bytes = output.stdout.len(),
                "Search tool exited abnormally, using partial output"
            );
        }

        let mut stream = MatchStream::new(output.stdout.as_slice());
        let matches: Vec<_> = stream.by_ref().collect();
        debug!(
            matches = matches.len(),
            skipped_lines = stream.skipped(),
            "Search output parsed"
        );
        Ok(matches)
    }
}

/// Map a path reported by the search tool back to a vault-relative,
/// `/`-separated path. Paths outside `root` are returned as reported.
pub fn relative_to_root(reported: &str, root: &Path) -> String {
    let path = Path::new(reported);
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy()
        .replace('\\', "/")
        .trim_start_matches("./")
        .to_string()
}
