//! Human-editable `KEY = value` form of [`DeviceConfig`], used by the
//! offline tool to author downlink replies.

use std::fmt::{self, Write};

use super::DeviceConfig;

const FIELDS: [&str; 6] = [
    "DOWNLINK_HR",
    "SLEEP_MIN",
    "DEEP_SLEEP",
    "GPS_WAIT_SEC",
    "COMMAND",
    "RESERVED",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValueError {
    /// Line is not `KEY value` or `KEY = value`
    Syntax { line: usize },
    UnknownKey { line: usize, key: String },
    DuplicateKey { line: usize, key: &'static str },
    InvalidValue { line: usize, key: &'static str, value: String },
    MissingKey(&'static str),
}

impl fmt::Display for KeyValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { line } => write!(f, "line {line}: expected `KEY value`"),
            Self::UnknownKey { line, key } => write!(f, "line {line}: unknown key {key}"),
            Self::DuplicateKey { line, key } => write!(f, "line {line}: {key} set twice"),
            Self::InvalidValue { line, key, value } => {
                write!(f, "line {line}: {value:?} is not a valid {key}")
            }
            Self::MissingKey(key) => write!(f, "missing key {key}"),
        }
    }
}

impl std::error::Error for KeyValueError {}

impl DeviceConfig {
    /// Parse a config file. Keys are case-insensitive, values are decimal
    /// or `True`/`False`; blank lines and `#` comments are skipped. Every
    /// field must be given exactly once.
    pub fn from_key_values(text: &str) -> Result<Self, KeyValueError> {
        let mut values: [Option<u16>; FIELDS.len()] = [None; FIELDS.len()];

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().replace('=', " ");
            let mut tokens = content.split_whitespace();

            let (key, value) = match (tokens.next(), tokens.next(), tokens.next()) {
                (None, _, _) => continue,
                (Some(key), Some(value), None) => (key, value),
                _ => return Err(KeyValueError::Syntax { line }),
            };

            let field = FIELDS
                .iter()
                .position(|name| name.eq_ignore_ascii_case(key))
                .ok_or_else(|| KeyValueError::UnknownKey {
                    line,
                    key: key.to_owned(),
                })?;
            let name = FIELDS[field];

            if values[field].is_some() {
                return Err(KeyValueError::DuplicateKey { line, key: name });
            }

            let parsed = parse_value(name, value).ok_or_else(|| KeyValueError::InvalidValue {
                line,
                key: name,
                value: value.to_owned(),
            })?;
            values[field] = Some(parsed);
        }

        let mut fields = [0u16; FIELDS.len()];
        for (slot, (value, name)) in fields.iter_mut().zip(values.iter().zip(FIELDS)) {
            *slot = value.ok_or(KeyValueError::MissingKey(name))?;
        }

        // Single-byte fields were range checked by parse_value
        Ok(Self {
            downlink_hr: fields[0] as u8,
            sleep_min: fields[1],
            deep_sleep: fields[2] as u8,
            gps_wait_sec: fields[3] as u8,
            command: fields[4] as u8,
            reserved: fields[5],
        })
    }

    /// One `KEY = value` line per field
    pub fn to_key_values(&self) -> String {
        let values = [
            u16::from(self.downlink_hr),
            self.sleep_min,
            u16::from(self.deep_sleep),
            u16::from(self.gps_wait_sec),
            u16::from(self.command),
            self.reserved,
        ];

        let mut out = String::new();
        for (name, value) in FIELDS.iter().zip(values) {
            let _ = writeln!(out, "{name} = {value}");
        }
        out
    }
}

fn is_wide(name: &str) -> bool {
    matches!(name, "SLEEP_MIN" | "RESERVED")
}

fn parse_value(name: &str, value: &str) -> Option<u16> {
    let parsed = if value.eq_ignore_ascii_case("true") {
        1
    } else if value.eq_ignore_ascii_case("false") {
        0
    } else {
        value.parse::<u16>().ok()?
    };

    if !is_wide(name) && parsed > u16::from(u8::MAX) {
        return None;
    }

    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
# bench settings
DOWNLINK_HR = 8
SLEEP_MIN = 10
DEEP_SLEEP = True
GPS_WAIT_SEC = 30
COMMAND = 0
RESERVED = 0
";

    #[test]
    fn parses_spaced_equals_form() {
        let config = DeviceConfig::from_key_values(EXAMPLE).unwrap();

        assert_eq!(config.to_hex().as_str(), "08000a011e000000");
    }

    #[test]
    fn parses_bare_pairs_with_any_case() {
        let text = "downlink_hr 1\nsleep_min 1\ndeep_sleep 0\n\ngps_wait_sec 30\ncommand 1\nreserved 0";

        assert_eq!(
            DeviceConfig::from_key_values(text),
            Ok(DeviceConfig::FALLBACK)
        );
    }

    #[test]
    fn written_form_parses_back() {
        let config = DeviceConfig::from_hex("18003c0278071234").unwrap();

        assert_eq!(
            DeviceConfig::from_key_values(&config.to_key_values()),
            Ok(config)
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            DeviceConfig::from_key_values("DOWNLINK_HR"),
            Err(KeyValueError::Syntax { line: 1 })
        );
        assert!(matches!(
            DeviceConfig::from_key_values("SPEED 3"),
            Err(KeyValueError::UnknownKey { line: 1, .. })
        ));
        assert_eq!(
            DeviceConfig::from_key_values("COMMAND 1\nCOMMAND 2"),
            Err(KeyValueError::DuplicateKey {
                line: 2,
                key: "COMMAND"
            })
        );
        assert!(matches!(
            DeviceConfig::from_key_values("GPS_WAIT_SEC 300"),
            Err(KeyValueError::InvalidValue {
                key: "GPS_WAIT_SEC",
                ..
            })
        ));
        assert_eq!(
            DeviceConfig::from_key_values("COMMAND 1"),
            Err(KeyValueError::MissingKey("DOWNLINK_HR"))
        );
    }
}
