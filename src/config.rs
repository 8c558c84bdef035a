//! Client identity and connection settings.
//!
//! The defaults describe an English 2.4.3 client on Windows, which is what servers of that
//! version expect. Every key is optional when loading from TOML.
//!
//! ```
//! use wow_client::config::ClientConfig;
//!
//! let config = ClientConfig::from_toml_str(r#"
//!     auth_host = "logon.example.org"
//!     locale = "deDE"
//! "#).unwrap();
//!
//! assert_eq!(config.auth_host, "logon.example.org");
//! assert_eq!(config.locale, "deDE");
//! assert_eq!(config.build, 8606);
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Length of the game name, platform, os and locale fields of the logon challenge.
pub const TAG_LENGTH: usize = 4;

/// Settings for both connections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Game name sent in the logon challenge.
    pub game_name: String,
    /// Major, minor and patch version.
    pub version: [u8; 3],
    /// Build number, sent to both the login and world server.
    pub build: u16,
    /// Processor architecture.
    pub platform: String,
    /// Operating system.
    pub os: String,
    /// Client locale.
    pub locale: String,
    /// Minutes from UTC.
    pub timezone_bias: u32,
    /// Client IP address as the server sees it in the logon challenge.
    pub ip: u32,
    /// Seed for `CMSG_AUTH_SESSION`. A random seed is used when absent.
    pub client_seed: Option<u32>,
    /// Host of the login server.
    pub auth_host: String,
    /// Port of the login server.
    pub auth_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            game_name: "WoW".to_string(),
            version: [2, 4, 3],
            build: 8606,
            platform: "x86".to_string(),
            os: "Cha".to_string(),
            locale: "enGB".to_string(),
            timezone_bias: 60,
            ip: 0xf6876919,
            client_seed: None,
            auth_host: "127.0.0.1".to_string(),
            auth_port: 3724,
        }
    }
}

impl ClientConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Invalid TOML, wrong value types, or a tag longer than [`TAG_LENGTH`] bytes.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// If the file can not be read, and the errors of [`ClientConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("game_name", &self.game_name),
            ("platform", &self.platform),
            ("os", &self.os),
            ("locale", &self.locale),
        ] {
            if value.len() > TAG_LENGTH || !value.is_ascii() {
                return Err(ConfigError::InvalidTag {
                    field,
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Reversed and NUL padded, the way the client sends its four character tags.
pub(crate) fn tag_bytes(tag: &str) -> [u8; TAG_LENGTH] {
    let mut bytes = [0_u8; TAG_LENGTH];
    for (b, c) in bytes.iter_mut().zip(tag.bytes().rev()) {
        *b = c;
    }

    bytes
}
