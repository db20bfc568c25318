use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub sink: SinkSettings,
    #[serde(default)]
    pub allocation: AllocationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Endpoints returning the five record batches as JSON arrays
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceSettings {
    pub acm_records_url: Option<String>,
    pub student_responses_url: Option<String>,
    pub topic_maps_url: Option<String>,
    pub supervisor_acms_url: Option<String>,
    pub supervisor_responses_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinkSettings {
    /// Endpoint receiving the final matches; submission is skipped when unset
    pub submission_url: Option<String>,
    /// Directory for the JSON result files; file output is skipped when unset
    pub output_dir: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllocationSettings {
    #[serde(default = "default_rebalance")]
    pub rebalance: bool,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            rebalance: default_rebalance(),
        }
    }
}

fn default_rebalance() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Plain environment variables that may carry signed endpoint URLs
const URL_OVERRIDES: &[(&str, &str)] = &[
    ("ACM_RECORDS_URL", "source.acm_records_url"),
    ("STUDENT_RESPONSES_URL", "source.student_responses_url"),
    ("TOPIC_MAPS_URL", "source.topic_maps_url"),
    ("SUPERVISOR_ACMS_URL", "source.supervisor_acms_url"),
    ("SUPERVISOR_RESPONSES_URL", "source.supervisor_responses_url"),
    ("SUBMISSION_URL", "sink.submission_url"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with ALLOC_)
    /// 4. Unprefixed endpoint URL variables (see `URL_OVERRIDES`)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., ALLOC__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ALLOC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ALLOC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the unprefixed URL variables on top of the loaded config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in URL_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
