//! Configuration for the ticketing engine

use serde::{Deserialize, Serialize};

/// Ticketing engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service account the engine uses as its payment-engine caller
    /// identity; must be granted the ticket-issuer role at wiring time
    pub service_account: String,

    /// Actor mailbox capacity (bounded channel for backpressure)
    pub mailbox_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "ticket-core".to_string(),
            service_account: "ticket-core-service".to_string(),
            mailbox_capacity: 1024,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(account) = std::env::var("TICKET_SERVICE_ACCOUNT") {
            config.service_account = account;
        }

        if let Ok(capacity) = std::env::var("TICKET_MAILBOX_CAPACITY") {
            config.mailbox_capacity = capacity
                .parse()
                .map_err(|e| crate::Error::Config(format!("Bad TICKET_MAILBOX_CAPACITY: {}", e)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "ticket-core");
        assert_eq!(config.mailbox_capacity, 1024);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "service_name = \"ticket-core\"\nservice_account = \"svc\"\nmailbox_capacity = 64"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.service_account, "svc");
        assert_eq!(config.mailbox_capacity, 64);
    }
}
