use std::io::Write;
use std::path::Path;

use tracing::warn;

use kindred_lib::context::KindredContext;
use kindred_lib::error::FindError;
use kindred_lib::output::Console;
use kindred_lib::pipeline::find::{find_similar_notes, insert_similar_links};
use kindred_lib::settings::load_settings;
use kindred_lib::vault::NoteHost;

/// Run the `kindred find` command.
///
/// A pipeline failure is shown as a one-line notice and returned as an
/// error so the process exits nonzero.
pub async fn run_find<OUT, ERR>(
    note: &Path,
    context: &KindredContext,
    dry_run: bool,
    console: &mut dyn Console<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    let settings = load_settings(&context.settings_path())?;
    let vault = context.vault(Some(note));

    if dry_run {
        let similar = report_failure(find_similar_notes(&vault, &settings).await, console)?;
        let content = vault.read_note(&similar.note)?;
        write!(console.stdout(), "{}", similar.apply(&content, &settings))?;
        return Ok(());
    }

    let report = report_failure(insert_similar_links(&vault, &settings).await, console)?;
    console.notice(&report.notice())?;
    Ok(())
}

fn report_failure<T, OUT, ERR>(
    result: Result<T, FindError>,
    console: &mut dyn Console<OUT, ERR>,
) -> anyhow::Result<T>
where
    OUT: Write,
    ERR: Write,
{
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(error = %err, "Find similar notes failed");
            console.notice(&err.notice())?;
            Err(err.into())
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use kindred_lib::error::FindError;
    use kindred_lib::output::BufferedConsole;
    use kindred_test_util::ripgrep::{match_records, write_fake_tool};
    use kindred_test_util::vault::{read_note, write_note};

    use crate::test_util::{run, vault_with_tool};

    const SOURCE: &str = "Sourdough starter needs flour, water and patience.\n";

    fn seed(vault: &std::path::Path) {
        write_note(vault, "Sourdough.md", SOURCE);
        write_note(
            vault,
            "baking/Starter feeding.md",
            "Feed the starter flour and water daily.\n",
        );
    }

    #[tokio::test]
    async fn try_run_find_inserts_links() {
        let (vault, tools) = vault_with_tool();
        seed(vault.path());
        let root = std::fs::canonicalize(vault.path()).unwrap();
        write_fake_tool(
            tools.path(),
            &match_records(&root.join("baking/Starter feeding.md").to_string_lossy(), 3),
            0,
        );

        let mut console = BufferedConsole::new();
        run(&["find", "Sourdough.md"], &vault, &mut console)
            .await
            .unwrap();

        assert_eq!(
            console.notices(),
            ["Inserted 1 similar note link into Sourdough.md."]
        );
        assert_eq!(console.stdout_to_string(), "");
        let written = read_note(vault.path(), "Sourdough.md");
        assert!(written.starts_with(SOURCE));
        assert!(written.ends_with(
            "- [[baking/Starter feeding]]\n<!-- /kindred:similar-notes -->\n"
        ));
    }

    #[tokio::test]
    async fn try_run_find_dry_run_writes_nothing() {
        let (vault, tools) = vault_with_tool();
        seed(vault.path());
        let root = std::fs::canonicalize(vault.path()).unwrap();
        write_fake_tool(
            tools.path(),
            &match_records(&root.join("baking/Starter feeding.md").to_string_lossy(), 3),
            0,
        );

        let mut console = BufferedConsole::new();
        run(&["find", "Sourdough.md", "--dry-run"], &vault, &mut console)
            .await
            .unwrap();

        assert_eq!(
            console.stdout_to_string(),
            format!(
                "{}\n\n<!-- kindred:similar-notes -->\n## Similar notes\n\
                 - [[baking/Starter feeding]]\n<!-- /kindred:similar-notes -->\n",
                SOURCE.trim_end()
            )
        );
        assert!(console.notices().is_empty());
        assert_eq!(read_note(vault.path(), "Sourdough.md"), SOURCE);
    }

    #[tokio::test]
    async fn try_run_find_no_candidates_is_a_notice_and_error() {
        let (vault, tools) = vault_with_tool();
        seed(vault.path());
        write_fake_tool(tools.path(), &[], 1);

        let mut console = BufferedConsole::new();
        let err = run(&["find", "Sourdough.md"], &vault, &mut console)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FindError>(),
            Some(FindError::NoCandidates)
        ));
        assert_eq!(console.notices(), ["No similar notes found."]);
        assert_eq!(read_note(vault.path(), "Sourdough.md"), SOURCE);
    }

    #[tokio::test]
    async fn try_run_find_missing_note() {
        let (vault, _tools) = vault_with_tool();

        let mut console = BufferedConsole::new();
        let err = run(&["find", "missing.md"], &vault, &mut console)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FindError>(),
            Some(FindError::NoActiveNote)
        ));
        assert_eq!(console.notices(), ["No active note."]);
    }
}
