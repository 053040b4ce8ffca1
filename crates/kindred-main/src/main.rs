use std::process::ExitCode;

use kindred_cli::logging::init_logging;
use kindred_lib::error::FindError;
use kindred_lib::output::StdConsole;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut console = StdConsole::new();

    match kindred_cli::try_run(&args, &mut console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(usage) = err.downcast_ref::<clap::Error>() {
                usage.exit();
            }
            // Pipeline failures were already shown as a notice.
            if err.downcast_ref::<FindError>().is_none() {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
