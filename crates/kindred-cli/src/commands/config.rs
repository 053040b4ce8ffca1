use std::io::Write;

use anyhow::Context as _;
use tracing::info;

use kindred_lib::context::KindredContext;
use kindred_lib::output::Console;
use kindred_lib::settings::{load_settings, save_settings};

/// Run the `kindred config show` command.
pub fn run_show<OUT, ERR>(
    context: &KindredContext,
    console: &mut dyn Console<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    let settings = load_settings(&context.settings_path())?;
    let json = serde_json::to_string_pretty(&settings)?;
    writeln!(console.stdout(), "{json}")?;
    Ok(())
}

/// Run the `kindred config set` command.
pub fn run_set<OUT, ERR>(
    key: &str,
    value: &str,
    context: &KindredContext,
    console: &mut dyn Console<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    let path = context.settings_path();
    let current = load_settings(&path)?;
    let updated = current
        .with_value(key, value)
        .with_context(|| format!("cannot set {key}"))?;
    save_settings(&path, &updated)?;

    info!(key, path = %path.display(), "Setting updated");
    console.notice(&format!("Saved {key} to {}.", path.display()))?;
    Ok(())
}
