use std::path::{Path, PathBuf};

/// Build a ripgrep `--json` `match` record for `path` at `line_number`.
pub fn match_record(path: &str, line_number: u64) -> String {
    serde_json::json!({
        "type": "match",
        "data": {
            "path": { "text": path },
            "lines": { "text": "matched line\n" },
            "line_number": line_number,
            "absolute_offset": 0,
            "submatches": [
                { "match": { "text": "matched" }, "start": 0, "end": 7 }
            ]
        }
    })
    .to_string()
}

/// Build a ripgrep `begin` record.
pub fn begin_record(path: &str) -> String {
    serde_json::json!({
        "type": "begin",
        "data": { "path": { "text": path } }
    })
    .to_string()
}

/// Build a ripgrep `end` record.
pub fn end_record(path: &str) -> String {
    serde_json::json!({
        "type": "end",
        "data": {
            "path": { "text": path },
            "binary_offset": null,
            "stats": { "matches": 1, "matched_lines": 1 }
        }
    })
    .to_string()
}

/// Build the trailing ripgrep `summary` record.
pub fn summary_record() -> String {
    serde_json::json!({
        "type": "summary",
        "data": {
            "elapsed_total": { "secs": 0, "nanos": 1000, "human": "0.000001s" },
            "stats": { "searches": 1, "searches_with_match": 1 }
        }
    })
    .to_string()
}

/// `count` match records for `path`, on consecutive lines starting at 1.
pub fn match_records(path: &str, count: u64) -> Vec<String> {
    (1..=count).map(|line| match_record(path, line)).collect()
}

/// Write an executable shell script standing in for the search tool.
///
/// The script ignores its arguments, prints `stdout_lines` and exits with
/// `exit_code`. Arguments are appended to `args.log` next to the script so
/// tests can inspect the invocation. Returns the script path.
#[cfg(unix)]
pub fn write_fake_tool(dir: &Path, stdout_lines: &[String], exit_code: i32) -> PathBuf {
    write_script(dir, stdout_lines, exit_code, None)
}

/// Like [`write_fake_tool`], but sleeps for `sleep_secs` before printing.
#[cfg(unix)]
pub fn write_slow_tool(dir: &Path, sleep_secs: u32) -> PathBuf {
    write_script(dir, &[], 0, Some(sleep_secs))
}

#[cfg(unix)]
fn write_script(
    dir: &Path,
    stdout_lines: &[String],
    exit_code: i32,
    sleep_secs: Option<u32>,
) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let output_path = dir.join("fake-rg.out");
    let mut output = stdout_lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    std::fs::write(&output_path, output).unwrap();

    let log_path = dir.join("args.log");
    let sleep = sleep_secs.map_or_else(String::new, |s| format!("sleep {s}\n"));
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{log}'\n{sleep}cat '{out}'\nexit {exit_code}\n",
        log = log_path.display(),
        out = output_path.display(),
    );

    let script_path = fake_tool_path(dir);
    std::fs::write(&script_path, script).unwrap();
    let mut perms = std::fs::metadata(&script_path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script_path, perms).unwrap();
    script_path
}

/// Where [`write_fake_tool`] puts the script inside `dir`, so settings can
/// point at it before it is written.
pub fn fake_tool_path(dir: &Path) -> PathBuf {
    dir.join("fake-rg")
}

/// Read the arguments recorded by a fake tool, one per line.
pub fn read_logged_args(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("args.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
