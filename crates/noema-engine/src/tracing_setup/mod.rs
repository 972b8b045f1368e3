//! Structured logging: span macros plus the global subscriber.

pub mod spans;

use tracing_subscriber::EnvFilter;

use noema_core::config::ObservabilityConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.log_level`. Returns false when a subscriber
/// was already installed, which leaves the existing one in place.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_reports_existing_subscriber() {
        let config = ObservabilityConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn span_macros_carry_their_names() {
        let span = crate::pass_span!("s1", 3usize);
        if let Some(meta) = span.metadata() {
            assert_eq!(meta.name(), spans::names::PASS);
        }
    }
}
