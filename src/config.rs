//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::report::rumble::{RumbleChannel, RumbleCommand, RUMBLE_FREQ_MAX_HZ, RUMBLE_FREQ_MIN_HZ};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub dump: DumpConfig,

    #[serde(default)]
    pub rumble: RumbleConfig,
}

/// Flash dump timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DumpConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_poll_budget")]
    pub poll_budget: u32,
}

/// Default rumble parameters used by the diagnostic run
#[derive(Debug, Deserialize, Clone)]
pub struct RumbleConfig {
    #[serde(default = "default_high_freq_hz")]
    pub high_freq_hz: f32,

    #[serde(default = "default_high_ampli")]
    pub high_ampli: f32,

    #[serde(default = "default_low_freq_hz")]
    pub low_freq_hz: f32,

    #[serde(default = "default_low_ampli")]
    pub low_ampli: f32,
}

// Default value functions
fn default_poll_interval_ms() -> u64 { 10 }
fn default_poll_budget() -> u32 { 100 }

fn default_high_freq_hz() -> f32 { 320.0 }
fn default_high_ampli() -> f32 { 0.0 }
fn default_low_freq_hz() -> f32 { 160.0 }
fn default_low_ampli() -> f32 { 0.0 }

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_budget: default_poll_budget(),
        }
    }
}

impl Default for RumbleConfig {
    fn default() -> Self {
        Self {
            high_freq_hz: default_high_freq_hz(),
            high_ampli: default_high_ampli(),
            low_freq_hz: default_low_freq_hz(),
            low_ampli: default_low_ampli(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dump: DumpConfig::default(),
            rumble: RumbleConfig::default(),
        }
    }
}

impl RumbleConfig {
    /// Builds the rumble command the diagnostic run sends (same parameters
    /// on both channels).
    #[must_use]
    pub fn command(&self) -> RumbleCommand {
        let channel = RumbleChannel {
            high_freq_hz: self.high_freq_hz,
            high_ampli: self.high_ampli,
            low_freq_hz: self.low_freq_hz,
            low_ampli: self.low_ampli,
        };
        RumbleCommand {
            left: channel,
            right: channel,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joycon_probe::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist. A present-but-invalid file is still an
    /// error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.dump.poll_interval_ms == 0 || self.dump.poll_interval_ms > 1000 {
            return Err(crate::error::JoyconProbeError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 1000"),
            ));
        }

        if self.dump.poll_budget == 0 || self.dump.poll_budget > 10000 {
            return Err(crate::error::JoyconProbeError::Config(
                toml::de::Error::custom("poll_budget must be between 1 and 10000"),
            ));
        }

        for freq in [self.rumble.high_freq_hz, self.rumble.low_freq_hz] {
            if !(RUMBLE_FREQ_MIN_HZ..=RUMBLE_FREQ_MAX_HZ).contains(&freq) {
                return Err(crate::error::JoyconProbeError::Config(
                    toml::de::Error::custom(format!(
                        "rumble frequency must be between {} and {} Hz",
                        RUMBLE_FREQ_MIN_HZ, RUMBLE_FREQ_MAX_HZ
                    )),
                ));
            }
        }

        for ampli in [self.rumble.high_ampli, self.rumble.low_ampli] {
            if !(0.0..=1.0).contains(&ampli) {
                return Err(crate::error::JoyconProbeError::Config(
                    toml::de::Error::custom("rumble amplitude must be between 0.0 and 1.0"),
                ));
            }
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
        assert_eq!(config.dump.poll_interval_ms, 10);
        assert_eq!(config.dump.poll_budget, 100);
        assert_eq!(config.rumble.high_freq_hz, 320.0);
        assert_eq!(config.rumble.low_ampli, 0.0);
    }

    #[test]
    fn test_default_rumble_command_is_neutral() {
        let config = Config::default();
        assert_eq!(
            config.rumble.command().encode().unwrap(),
            crate::report::protocol::DEFAULT_RUMBLE
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[dump]\npoll_interval_ms = 5\npoll_budget = 200\n\n\
             [rumble]\nhigh_freq_hz = 640.0\nhigh_ampli = 0.5"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dump.poll_interval_ms, 5);
        assert_eq!(config.dump.poll_budget, 200);
        assert_eq!(config.rumble.high_freq_hz, 640.0);
        assert_eq!(config.rumble.high_ampli, 0.5);
        // Unspecified fields fall back to defaults
        assert_eq!(config.rumble.low_freq_hz, 160.0);
    }

    #[test]
    fn test_load_missing_sections_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dump.poll_interval_ms, 10);
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let config = Config::load_or_default("/nonexistent/joycon-probe.toml").unwrap();
        assert_eq!(config.dump.poll_budget, 100);
    }

    #[test]
    fn test_invalid_poll_interval_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dump]\npoll_interval_ms = 0").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_invalid_rumble_frequency_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rumble]\nhigh_freq_hz = 2000.0").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_invalid_rumble_amplitude_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rumble]\nlow_ampli = 1.5").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
