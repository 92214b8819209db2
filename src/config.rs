//! Server configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
/// 25 MiB, the largest blueprint upload accepted.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_ESTIMATE_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub estimate_max_tokens: u32,
    pub chat_max_tokens: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            estimate_max_tokens: DEFAULT_ESTIMATE_MAX_TOKENS,
            chat_max_tokens: DEFAULT_CHAT_MAX_TOKENS,
        }
    }
}

impl ServerConfig {
    /// Build from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup.
    ///
    /// - `PORT`: default 3000
    /// - `MAX_UPLOAD_BYTES`: default 26214400
    /// - `ESTIMATE_MAX_TOKENS`: default 2048
    /// - `CHAT_MAX_TOKENS`: default 1024
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when a value is present but unparseable or zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse(&lookup, "PORT", DEFAULT_PORT)?,
            max_upload_bytes: parse(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            estimate_max_tokens: parse(&lookup, "ESTIMATE_MAX_TOKENS", DEFAULT_ESTIMATE_MAX_TOKENS)?,
            chat_max_tokens: parse(&lookup, "CHAT_MAX_TOKENS", DEFAULT_CHAT_MAX_TOKENS)?,
        })
    }

    /// Upload limit in whole megabytes, for error messages.
    #[must_use]
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes.div_ceil(1024 * 1024)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
