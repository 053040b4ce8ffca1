use std::path::Path;

use kindred_lib::output::BufferedConsole;
use kindred_lib::settings::{Settings, save_settings};
use kindred_test_util::ripgrep::fake_tool_path;
use tempfile::TempDir;

/// A throwaway vault whose settings point the search tool at a fake script
/// in a second temp directory. Write the script with
/// [`kindred_test_util::ripgrep::write_fake_tool`] on the returned tool dir.
///
/// Hold both [`TempDir`]s for the duration of the test.
pub fn vault_with_tool() -> (TempDir, TempDir) {
    let vault = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    let settings = Settings {
        tool_path: fake_tool_path(tools.path()).to_string_lossy().into_owned(),
        ..Settings::default()
    };
    save_settings(&settings_file(vault.path()), &settings).unwrap();
    (vault, tools)
}

fn settings_file(vault: &Path) -> std::path::PathBuf {
    vault.join(".kindred").join("settings.json")
}

/// Run the CLI as `kindred <args...> --vault <vault>`.
pub async fn run(
    args: &[&str],
    vault: &TempDir,
    console: &mut BufferedConsole,
) -> anyhow::Result<()> {
    let vault_arg = vault.path().to_string_lossy().into_owned();
    let mut full = vec!["kindred"];
    full.extend_from_slice(args);
    full.extend_from_slice(&["--vault", &vault_arg]);
    crate::try_run::<Vec<u8>, Vec<u8>>(&full, console).await
}
