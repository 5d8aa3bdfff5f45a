use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ParseError;

/// Records that are loaded wholesale from a JSON payload.
///
/// The payload is parsed into a fresh value first and only then swapped in,
/// so a malformed payload leaves the current value untouched. Keys missing
/// from the payload take their defaults, unknown keys are ignored.
pub trait JsonStore: DeserializeOwned + Sized {
    fn load_from(&mut self, json: &str) -> Result<(), ParseError> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }
}

/// Immutable board identity as reported by `/info.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tagline: String,
    #[serde(deserialize_with = "lenient_string")]
    pub app_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub app_version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(deserialize_with = "lenient_string")]
    pub compile_time: String,
    #[serde(deserialize_with = "lenient_string")]
    pub idf_version: String,
    #[serde(rename = "elfSHA256", deserialize_with = "lenient_string")]
    pub elf_sha256: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hw_info: String,
}

impl JsonStore for DeviceInfo {}

/// Mutable telemetry as reported by `/status.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveStatus {
    #[serde(deserialize_with = "lenient_integer")]
    pub example_status_data: Option<i64>,
}

impl LiveStatus {
    /// Status value in lowercase hex, empty while unknown.
    pub fn example_status_hex(&self) -> String {
        match self.example_status_data {
            Some(v) if v < 0 => format!("-{:x}", v.unsigned_abs()),
            Some(v) => format!("{v:x}"),
            None => String::new(),
        }
    }
}

impl JsonStore for LiveStatus {}

/// Command id that restarts the board.
pub const RESET_COMMAND_ID: u8 = 254;

/// Commands understood by `/cmd.json`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceCommand {
    Command1,
    Command2,
    Command3,
    Reset,
}

impl DeviceCommand {
    /// Commands offered on the home page
    pub const USER: [Self; 3] = [Self::Command1, Self::Command2, Self::Command3];

    pub fn id(self) -> u8 {
        match self {
            Self::Command1 => 1,
            Self::Command2 => 2,
            Self::Command3 => 3,
            Self::Reset => RESET_COMMAND_ID,
        }
    }
}

/// Body of `POST /cmd.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandRequest {
    pub cmd: u8,
    pub data: u32,
}

impl CommandRequest {
    pub fn new(command: DeviceCommand, data: u32) -> Self {
        Self {
            cmd: command.id(),
            data,
        }
    }
}

/// Parse the hex data field of the command form. Surrounding whitespace and
/// a `0x` prefix are ignored; an empty field means zero.
pub fn parse_command_data(input: &str) -> Result<u32, std::num::ParseIntError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Ok(0);
    }
    u32::from_str_radix(digits, 16)
}

/// Accept any JSON scalar for a text field; `null` reads as empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Accept integers and integer strings; fractions, out-of-range numbers and
/// anything else read as unknown.
pub(crate) fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
