// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

/// Default TCP port of the mount's command listener.
pub const DEFAULT_MOUNT_PORT: u16 = 3490;

/// Default mount address when none is configured.
pub const DEFAULT_MOUNT_HOST: &str = "1.1.1.1";

/// Port of the N.I.N.A. advanced API.
pub const DEFAULT_WEATHER_PORT: u16 = 1888;

/// Default N.I.N.A. host.
pub const DEFAULT_WEATHER_HOST: &str = "127.0.0.1";

/// Path (and query) of the weather equipment endpoint.
pub const WEATHER_PATH: &str = "/api/equipment?property=weather";

/// One read of at most this many bytes is one response.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Connect attempts inside a single `connect()` call.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;

/// Total attempts (reconnects included) for one logical command.
pub const DEFAULT_COMMAND_ATTEMPTS: u32 = 5;

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_WEATHER_TIMEOUT_MS: u64 = 10000;
/// Floor for every configured timeout; a zero timeout fails every operation.
pub const MIN_TIMEOUT_MS: u64 = 50;

/// Seconds between sync ticks.
pub const DEFAULT_INTERVAL_SECS: u64 = 1800;

/// Response the mount sends when a set-command was accepted.
pub const SET_ACCEPTED: &str = "1";

/// Command frame delimiters.
pub const COMMAND_PREFIX: char = ':';
pub const COMMAND_TERMINATOR: char = '#';
