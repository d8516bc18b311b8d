//! Structured logging with tracing

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` overrides the configured level when set. Calling this more than
/// once is an error; it runs exactly once from `main`.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format_initializes() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
        };
        // First installation in this process must succeed.
        init_tracing(&config).unwrap();
    }
}
