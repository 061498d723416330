// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use std::time::Duration;

use serde::Deserialize;

use crate::constants::*;

/// Configuration for a session with the mount.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Mount IP address or host name
    pub host: String,
    /// Mount TCP port (default: 3490)
    pub port: u16,
    /// Attempts inside a single `connect()` call (default: 3)
    pub connect_attempts: u32,
    /// Total attempts for one logical command, reconnects included (default: 5)
    pub command_attempts: u32,
    /// Timeout for each TCP connect in milliseconds
    pub connect_timeout_ms: u64,
    /// Timeout for each write and each read in milliseconds
    pub io_timeout_ms: u64,
    /// Pause between failed connect attempts in milliseconds (default: 0)
    pub reconnect_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MOUNT_HOST.to_string(),
            port: DEFAULT_MOUNT_PORT,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            command_attempts: DEFAULT_COMMAND_ATTEMPTS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
            reconnect_delay_ms: 0,
        }
    }
}

impl SessionConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// `host:port` form of the endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

/// Builder for SessionConfig.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Clamped to at least one attempt.
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.config.connect_attempts = attempts.max(1);
        self
    }

    /// Clamped to at least one attempt.
    pub fn command_attempts(mut self, attempts: u32) -> Self {
        self.config.command_attempts = attempts.max(1);
        self
    }

    /// Clamped to at least [`MIN_TIMEOUT_MS`].
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms.max(MIN_TIMEOUT_MS);
        self
    }

    /// Clamped to at least [`MIN_TIMEOUT_MS`].
    pub fn io_timeout_ms(mut self, ms: u64) -> Self {
        self.config.io_timeout_ms = ms.max(MIN_TIMEOUT_MS);
        self
    }

    pub fn reconnect_delay_ms(mut self, ms: u64) -> Self {
        self.config.reconnect_delay_ms = ms;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

/// Where and how to poll the weather endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WEATHER_HOST.to_string(),
            port: DEFAULT_WEATHER_PORT,
            timeout_ms: DEFAULT_WEATHER_TIMEOUT_MS,
        }
    }
}

impl WeatherConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, WEATHER_PATH)
    }
}

/// Behaviour of the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Time between ticks
    pub interval: Duration,
    /// Write readings to the mount (false = poll-only)
    pub sync: bool,
    /// Read the values back after writing them
    pub verify: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            sync: true,
            verify: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML file
// ---------------------------------------------------------------------------

/// Optional TOML configuration file. Every field has a default, so an empty
/// file is valid.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub mount: MountToml,
    pub weather: WeatherToml,
    pub sync: SyncToml,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MountToml {
    pub host: String,
    pub port: u16,
    pub connect_attempts: u32,
    pub command_attempts: u32,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
}

impl Default for MountToml {
    fn default() -> Self {
        let d = SessionConfig::default();
        Self {
            host: d.host,
            port: d.port,
            connect_attempts: d.connect_attempts,
            command_attempts: d.command_attempts,
            connect_timeout_ms: d.connect_timeout_ms,
            io_timeout_ms: d.io_timeout_ms,
            reconnect_delay_ms: d.reconnect_delay_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherToml {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for WeatherToml {
    fn default() -> Self {
        let d = WeatherConfig::default();
        Self {
            host: d.host,
            port: d.port,
            timeout_ms: d.timeout_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncToml {
    pub interval_secs: u64,
    pub nosync: bool,
    pub verify: bool,
}

impl Default for SyncToml {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            nosync: false,
            verify: false,
        }
    }
}

impl FileConfig {
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub weather_host: Option<String>,
    pub mount_host: Option<String>,
    pub nosync: bool,
    pub interval_secs: Option<u64>,
    pub verify: bool,
}

/// Fully resolved configuration of the bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub weather: WeatherConfig,
    pub sync: SyncOptions,
}

impl AppConfig {
    /// Merge command-line overrides over the file (or built-in defaults).
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        let FileConfig { mount, weather, sync } = file;

        let session = SessionConfig::builder()
            .host(overrides.mount_host.unwrap_or(mount.host))
            .port(mount.port)
            .connect_attempts(mount.connect_attempts)
            .command_attempts(mount.command_attempts)
            .connect_timeout_ms(mount.connect_timeout_ms)
            .io_timeout_ms(mount.io_timeout_ms)
            .reconnect_delay_ms(mount.reconnect_delay_ms)
            .build();

        let weather = WeatherConfig {
            host: overrides.weather_host.unwrap_or(weather.host),
            port: weather.port,
            timeout_ms: weather.timeout_ms.max(MIN_TIMEOUT_MS),
        };

        let sync = SyncOptions {
            interval: Duration::from_secs(overrides.interval_secs.unwrap_or(sync.interval_secs)),
            sync: !(overrides.nosync || sync.nosync),
            verify: overrides.verify || sync.verify,
        };

        Self {
            session,
            weather,
            sync,
        }
    }
}
