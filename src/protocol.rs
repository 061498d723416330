// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use crate::constants::{COMMAND_PREFIX, COMMAND_TERMINATOR, SET_ACCEPTED};

/// Commands sent to the mount.
///
/// Every command is framed as `:<VERB><PARAMS>#`. The firmware is strict
/// about field widths, so the numeric parameters are formatted exactly as
/// the mount expects them:
///
/// ```text
/// :SRPRS1013.2#   set pressure, hPa, one fractional digit
/// :SRTMP+07.0#    set temperature, degrees C, signed and zero-padded
/// :GRPRS#         get pressure
/// :GRTMP#         get temperature
/// ```
///
/// Set-commands answer `1` (accepted) or `0` (rejected). Get-commands answer
/// a decimal number, usually terminated by `#`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `:SRPRS<p>#` — Set refraction pressure in hPa.
    SetPressure { hpa: f64 },
    /// `:SRTMP<sTT.T>#` — Set refraction temperature in degrees Celsius.
    SetTemperature { celsius: f64 },
    /// `:GRPRS#` — Query refraction pressure.
    GetPressure,
    /// `:GRTMP#` — Query refraction temperature.
    GetTemperature,
}

impl Command {
    /// Protocol verb of this command.
    fn verb(&self) -> &'static str {
        match self {
            Command::SetPressure { .. } => "SRPRS",
            Command::SetTemperature { .. } => "SRTMP",
            Command::GetPressure => "GRPRS",
            Command::GetTemperature => "GRTMP",
        }
    }

    /// Convert the command to its wire string representation.
    pub fn to_wire_string(&self) -> String {
        let params = match self {
            Command::SetPressure { hpa } => format!("{:.1}", hpa),
            Command::SetTemperature { celsius } => format!("{:+05.1}", celsius),
            Command::GetPressure | Command::GetTemperature => String::new(),
        };
        format!("{}{}{}{}", COMMAND_PREFIX, self.verb(), params, COMMAND_TERMINATOR)
    }
}

/// Wire form of a set-pressure command, e.g. `:SRPRS1013.2#`.
pub fn encode_set_pressure(hpa: f64) -> String {
    Command::SetPressure { hpa }.to_wire_string()
}

/// Wire form of a set-temperature command, e.g. `:SRTMP+07.0#`.
pub fn encode_set_temperature(celsius: f64) -> String {
    Command::SetTemperature { celsius }.to_wire_string()
}

/// Interpret a set-command response. Only a literal `1` counts as accepted.
pub fn is_accepted(response: &str) -> bool {
    response.trim() == SET_ACCEPTED
}

/// Parse a get-command response such as `1013.20#` or `+07.0#`.
///
/// Returns `None` for anything that is not a finite decimal number.
pub fn decode_value(response: &str) -> Option<f64> {
    let trimmed = response.trim();
    let value = trimmed
        .strip_suffix(COMMAND_TERMINATOR)
        .unwrap_or(trimmed)
        .trim();
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
