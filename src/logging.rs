use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "recipe_api=info,warn";

/// Installs the global subscriber. `log` records from this crate, warp and sqlx
/// are forwarded into it; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    if fmt().with_env_filter(filter).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
