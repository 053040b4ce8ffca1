use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `KINDRED_LOG=kindred_lib=debug`.
pub const LOG_ENV: &str = "KINDRED_LOG";
/// `json` switches to one JSON object per event.
pub const LOG_FORMAT_ENV: &str = "KINDRED_LOG_FORMAT";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Events go to stderr; stdout is reserved
/// for command output. Calling this twice is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_format_detection() {
        assert!(json_requested(Some("json")));
        assert!(json_requested(Some(" JSON ")));
        assert!(!json_requested(Some("pretty")));
        assert!(!json_requested(None));
    }
}
