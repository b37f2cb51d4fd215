//! Host settings shared with every command.

/// Environment variable naming the platform host.
pub const HOST_ENV: &str = "HEROKU_HOST";

/// Host used when [`HOST_ENV`] is unset or blank.
pub const DEFAULT_HOST: &str = "heroku.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Platform host, used to build app URLs and git remotes.
    pub host: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        Self { host }
    }
}
