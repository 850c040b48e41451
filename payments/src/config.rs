//! Configuration for the payment engine

use crate::fees::MAX_FEE_RATE_PPM;
use serde::{Deserialize, Serialize};

/// Payment engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Initial platform fee rate (parts-per-mille)
    pub fee_rate_ppm: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "payments".to_string(),
            fee_rate_ppm: 25, // 2.5%
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
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(rate) = std::env::var("PAYMENTS_FEE_RATE_PPM") {
            config.fee_rate_ppm = rate
                .parse()
                .map_err(|e| crate::Error::Config(format!("Bad PAYMENTS_FEE_RATE_PPM: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject rates above the fee ceiling
    pub fn validate(&self) -> crate::Result<()> {
        if self.fee_rate_ppm > MAX_FEE_RATE_PPM {
            return Err(crate::Error::FeeTooHigh {
                rate_ppm: self.fee_rate_ppm,
                ceiling: MAX_FEE_RATE_PPM,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "payments");
        assert_eq!(config.fee_rate_ppm, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rate_above_ceiling_rejected() {
        let config = Config {
            fee_rate_ppm: MAX_FEE_RATE_PPM + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service_name = \"payments\"\nfee_rate_ppm = 50").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.fee_rate_ppm, 50);
    }
}
