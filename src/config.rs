//! Configuration for statement annotation.

/// Environment variable consulted by [`TagConfig::from_env`].
pub const ENABLED_ENV_VAR: &str = "SEA_ORM_QUERY_TAG_ENABLED";

/// Configuration options for SQL annotation.
///
/// # Example
///
/// ```rust
/// use sea_orm_query_tag::TagConfig;
///
/// let config = TagConfig::default().with_engine("mysql");
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone)]
pub struct TagConfig {
    /// Whether statements are annotated at all.
    /// Default: `true`
    pub enabled: bool,

    /// Engine identifier used to pick the comment placement.
    /// Default: `None` (derived from the connection's backend)
    pub engine: Option<String>,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: None,
        }
    }
}

impl TagConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable annotation.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Create a configuration with annotation switched off.
    ///
    /// Statements pass through the wrapper byte-for-byte unchanged.
    pub fn disabled() -> Self {
        Self::default().with_enabled(false)
    }

    /// Override the engine identifier instead of deriving it from the
    /// connection's backend.
    ///
    /// An identifier with no known comment placement disables annotation for
    /// every statement, which is useful for backends whose monitoring views
    /// choke on comments.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Build a configuration from the environment, checked once at startup.
    ///
    /// `SEA_ORM_QUERY_TAG_ENABLED=0|false|off|no` disables annotation; any
    /// other value, or an unset variable, leaves it enabled.
    pub fn from_env() -> Self {
        let enabled = std::env::var(ENABLED_ENV_VAR)
            .map(|value| {
                let value = value.trim().to_ascii_lowercase();
                !matches!(value.as_str(), "0" | "false" | "off" | "no")
            })
            .unwrap_or(true);
        Self::default().with_enabled(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_enabled() {
        let config = TagConfig::default();
        assert!(config.enabled);
        assert_eq!(config.engine, None);
    }

    #[test]
    fn test_builder() {
        let config = TagConfig::new().with_enabled(false).with_engine("sqlite3");
        assert!(!config.enabled);
        assert_eq!(config.engine, Some("sqlite3".to_string()));
    }

    #[test]
    fn test_disabled() {
        assert!(!TagConfig::disabled().enabled);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(ENABLED_ENV_VAR, "false");
        assert!(!TagConfig::from_env().enabled);

        std::env::set_var(ENABLED_ENV_VAR, "1");
        assert!(TagConfig::from_env().enabled);

        std::env::remove_var(ENABLED_ENV_VAR);
        assert!(TagConfig::from_env().enabled);
    }
}
