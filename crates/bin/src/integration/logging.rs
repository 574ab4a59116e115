//! Log output on stderr.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. The `kessan` target prefix covers
/// every crate of the workspace.
pub(crate) const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "kessan=info",
        1 => "kessan=debug",
        _ => "kessan=trace",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `-v`.
pub(crate) fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "kessan=info")]
    #[case(1, "kessan=debug")]
    #[case(4, "kessan=trace")]
    fn test_default_directive(#[case] verbosity: u8, #[case] expected: &str) {
        assert_eq!(default_directive(verbosity), expected);
        assert!(EnvFilter::try_new(expected).is_ok());
    }
}
