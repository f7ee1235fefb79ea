use crate::error::ConfigError;

/// Largest accepted `ONTOUML_FUTURE_TOLERANCE_MS`: one week.
pub const MAX_FUTURE_TOLERANCE_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Behaviour switches for element construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelConfig {
    /// Reject a `created` timestamp later than the clock's current time.
    pub reject_future_creation: bool,
    /// Slack allowed past "now" when `reject_future_creation` is on.
    /// Negative values count as zero.
    pub future_tolerance_ms: i64,
}

impl ModelConfig {
    /// Load configuration from environment variables.
    /// ONTOUML_REJECT_FUTURE_CREATION defaults to false,
    /// ONTOUML_FUTURE_TOLERANCE_MS defaults to 0.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reject_future_creation = match lookup("ONTOUML_REJECT_FUTURE_CREATION") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid(
                "ONTOUML_REJECT_FUTURE_CREATION",
                "must be true/false or 1/0",
            ))?,
            None => false,
        };

        let future_tolerance_ms = match lookup("ONTOUML_FUTURE_TOLERANCE_MS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ms| (0..=MAX_FUTURE_TOLERANCE_MS).contains(ms))
                .ok_or(ConfigError::Invalid(
                    "ONTOUML_FUTURE_TOLERANCE_MS",
                    "must be an integer between 0 and 604800000",
                ))?,
            None => 0,
        };

        Ok(ModelConfig {
            reject_future_creation,
            future_tolerance_ms,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
