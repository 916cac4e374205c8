pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub serial: SerialConfig,
    pub reset: ResetConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,

    #[serde(with = "humantime_serde")]
    pub timeout: std::time::Duration,

    /// How long DTR is held high to reset the device
    #[serde(with = "humantime_serde")]
    pub reset_hold: std::time::Duration,

    /// How long the device takes to come up after a reset
    #[serde(with = "humantime_serde")]
    pub boot_delay: std::time::Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: 115_200,
            timeout: std::time::Duration::from_secs(10),
            reset_hold: std::time::Duration::from_millis(100),
            boot_delay: std::time::Duration::from_millis(2500),
        }
    }
}

/// Settings for the standalone `reset` command.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResetConfig {
    pub baud_rate: u32,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self { baud_rate: 9600 }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(with = "humantime_serde")]
    pub latch_delay: std::time::Duration,

    #[serde(with = "humantime_serde")]
    pub commit_delay: std::time::Duration,

    pub schedule: Schedule,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let timing = crate::protocol::FrameTiming::default();
        Self {
            latch_delay: timing.latch_delay,
            commit_delay: timing.commit_delay,
            schedule: Schedule::default(),
        }
    }
}

impl DisplayConfig {
    pub fn timing(&self) -> crate::protocol::FrameTiming {
        crate::protocol::FrameTiming {
            latch_delay: self.latch_delay,
            commit_delay: self.commit_delay,
        }
    }
}

/// How the clock loop waits for the next second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub enum Schedule {
    /// Re-sample the clock immediately, spinning a core.
    BusyWait,

    /// Sleep until the next wall-clock second boundary.
    #[default]
    Sleep,
}

impl Config {
    pub async fn load(path: &camino::Utf8Path) -> Result<Self, ConfigError> {
        let config_str =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::ReadingFile {
                    path: path.to_path_buf(),
                    source,
                })?;

        Self::parse(&config_str)
    }

    /// The file is optional, without one every setting takes its default.
    pub async fn load_optional(path: Option<&camino::Utf8Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path).await,
            None => {
                tracing::debug!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn parse(config_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(config_str).map_err(ConfigError::ParsingConfig)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file from path '{}'", .path)]
    ReadingFile {
        path: camino::Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    ParsingConfig(#[from] toml::de::Error),
}
