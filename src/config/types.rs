use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Main configuration structure for Artsweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub ratings: RatingConfig,
}

/// Site connectivity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Minimum time between the start of consecutive requests (milliseconds)
    #[serde(rename = "request-interval-ms", default = "default_request_interval_ms")]
    pub request_interval_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: default_request_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_request_interval_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Session store location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the JSON session store
    #[serde(rename = "session-path")]
    pub session_path: String,
}

/// Per-tier content rating toggles
///
/// Each toggle accepts a TOML boolean, the strings `"true"`/`"false"`, or the
/// integers `1`/`0`. Missing tiers are disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RatingConfig {
    #[serde(rename = "rating-e", default, deserialize_with = "deserialize_toggle")]
    pub everyone: bool,

    #[serde(rename = "rating-t", default, deserialize_with = "deserialize_toggle")]
    pub teen: bool,

    #[serde(rename = "rating-m", default, deserialize_with = "deserialize_toggle")]
    pub mature: bool,

    #[serde(rename = "rating-a", default, deserialize_with = "deserialize_toggle")]
    pub adult: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToggle {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_toggle<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match RawToggle::deserialize(deserializer)? {
        RawToggle::Bool(b) => Ok(b),
        RawToggle::Int(0) => Ok(false),
        RawToggle::Int(1) => Ok(true),
        RawToggle::Int(n) => Err(de::Error::custom(format!(
            "rating toggle must be 0 or 1, got {}",
            n
        ))),
        RawToggle::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(de::Error::custom(format!(
                "rating toggle must be true or false, got '{}'",
                other
            ))),
        },
    }
}
