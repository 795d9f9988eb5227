use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Filter directives from `EXAM_LOG`, then `RUST_LOG`, then `info`.
fn filter_from(exam_log: Option<String>, rust_log: Option<String>) -> EnvFilter {
    exam_log
        .or(rust_log)
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// the terminal session.
pub fn init() {
    let filter = filter_from(
        std::env::var("EXAM_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_log_wins_over_rust_log() {
        let filter = filter_from(Some("debug".into()), Some("error".into()));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(filter_from(None, None).to_string(), DEFAULT_FILTER);
        let filter = filter_from(None, Some("warn".into()));
        assert_eq!(filter.to_string(), "warn");
        assert_eq!(filter_from(Some("  ".into()), None).to_string(), DEFAULT_FILTER);
    }
}
