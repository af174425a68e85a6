pub mod build_info;
pub mod paths;
pub mod persistence;

use std::{env, sync::Once};

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

const DEFAULT_LOG_DIRECTIVE: &str = "movement_planner=info";

/// Initializes the global tracing subscriber.
///
/// A valid `RUST_LOG` is used as is; otherwise the crate logs at `info`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = log_filter(env::var("RUST_LOG").ok().as_deref());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_overrides_the_default_level() {
        let filter = log_filter(Some("movement_planner=debug")).to_string();
        assert!(filter.contains("movement_planner=debug"), "{filter}");
        assert!(!filter.contains("info"), "{filter}");
    }

    #[test]
    fn unset_or_blank_rust_log_uses_info() {
        assert_eq!(log_filter(None).to_string(), DEFAULT_LOG_DIRECTIVE);
        assert_eq!(log_filter(Some("  ")).to_string(), DEFAULT_LOG_DIRECTIVE);
    }
}
