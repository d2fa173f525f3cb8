//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set; otherwise `debug` with
/// `verbose` and `info` without. Calling this more than once is harmless;
/// later installations are ignored, which keeps it usable from tests.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logging(false);
        init_logging(true);
    }
}
