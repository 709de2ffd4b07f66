use std::env;
use tracing::warn;

/// Runtime configuration for the clinic scheduling service.
///
/// Everything comes from the environment so deployments stay twelve-factor;
/// missing values are logged and fall back to development defaults rather
/// than aborting startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Fallback slot length applied when a doctor's schedule omits one.
    pub default_slot_granularity_minutes: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| {
            warn!("HOST not set, defaulting to 0.0.0.0");
            "0.0.0.0".to_string()
        });

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| {
                warn!("PORT not set or invalid, defaulting to 3000");
                3000
            });

        let default_slot_granularity_minutes = env::var("DEFAULT_SLOT_GRANULARITY_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&m| m > 0)
            .unwrap_or_else(|| {
                warn!("DEFAULT_SLOT_GRANULARITY_MINUTES not set or invalid, defaulting to 30");
                30
            });

        Self {
            host,
            port,
            default_slot_granularity_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults_when_env_is_empty() {
        // Clear any inherited values so the test is deterministic.
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("DEFAULT_SLOT_GRANULARITY_MINUTES");

        let config = AppConfig::from_env();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_slot_granularity_minutes, 30);
    }
}
