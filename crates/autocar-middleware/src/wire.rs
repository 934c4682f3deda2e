//! Joystick wire format.
//!
//! ```text
//! record := field ( '|' field )* '\n'
//! field  := KEY ':' VALUE
//! KEY    := "X" | "Y" | "SW"
//! VALUE  := base-10 integer   (SW is 0 or 1)
//! ```
//!
//! A record is validated in full before anything is applied: one bad field
//! rejects the whole record.

use std::str::FromStr;

use autocar_types::JoystickUpdate;
use thiserror::Error;

/// Longest run of bytes accepted without a newline.
pub const MAX_RECORD_LEN: usize = 1024;

const FIELD_SEPARATOR: char = '|';
const KEY_VALUE_SEPARATOR: char = ':';

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("malformed field '{0}' (expected KEY:VALUE)")]
    MalformedField(String),

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("invalid value '{value}' for key {key}")]
    InvalidValue { key: String, value: String },

    #[error("switch value {0} is not 0 or 1")]
    InvalidSwitch(i32),

    #[error("record is not valid UTF-8")]
    NotUtf8,

    #[error("no newline within {0} bytes")]
    Oversized(usize),
}

/// The closed set of keys a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKey {
    X,
    Y,
    Sw,
}

impl WireKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireKey::X => "X",
            WireKey::Y => "Y",
            WireKey::Sw => "SW",
        }
    }
}

impl FromStr for WireKey {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(WireKey::X),
            "Y" => Ok(WireKey::Y),
            "SW" => Ok(WireKey::Sw),
            other => Err(WireError::UnknownKey(other.to_string())),
        }
    }
}

/// Parse one record (without its newline) into a [`JoystickUpdate`].
///
/// Surrounding whitespace (including a trailing `\r`) is ignored.
///
/// # Errors
///
/// Any malformed field, unknown or repeated key, non-decimal value, or a
/// switch value other than 0/1 rejects the whole record.
pub fn parse_record(line: &str) -> Result<JoystickUpdate, WireError> {
    let mut update = JoystickUpdate::default();
    for field in line.trim().split(FIELD_SEPARATOR) {
        let (raw_key, raw_value) = field
            .split_once(KEY_VALUE_SEPARATOR)
            .filter(|(_, v)| !v.contains(KEY_VALUE_SEPARATOR))
            .ok_or_else(|| WireError::MalformedField(field.to_string()))?;

        let key: WireKey = raw_key.trim().parse()?;
        let value = parse_value(key, raw_value.trim())?;

        let duplicate = match key {
            WireKey::X => update.x.replace(value).is_some(),
            WireKey::Y => update.y.replace(value).is_some(),
            WireKey::Sw => {
                let pressed = match value {
                    0 => false,
                    1 => true,
                    other => return Err(WireError::InvalidSwitch(other)),
                };
                update.switch.replace(pressed).is_some()
            }
        };
        if duplicate {
            return Err(WireError::DuplicateKey(key.as_str().to_string()));
        }
    }
    Ok(update)
}

fn parse_value(key: WireKey, raw: &str) -> Result<i32, WireError> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WireError::InvalidValue {
            key: key.as_str().to_string(),
            value: raw.to_string(),
        });
    }
    raw.parse().map_err(|_| WireError::InvalidValue {
        key: key.as_str().to_string(),
        value: raw.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Framing
// ────────────────────────────────────────────────────────────────────────────

/// Reassembles newline-terminated records from arbitrary read chunks.
///
/// Bytes after the last newline are held until a later chunk completes
/// them.  Blank records are skipped.
#[derive(Debug, Default)]
pub struct RecordFramer {
    pending: Vec<u8>,
}

impl RecordFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; return every record it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<String, WireError>> {
        let mut records = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                let raw = std::mem::take(&mut self.pending);
                match String::from_utf8(raw) {
                    Ok(line) if line.trim().is_empty() => {}
                    Ok(line) => records.push(Ok(line)),
                    Err(_) => records.push(Err(WireError::NotUtf8)),
                }
            } else if self.pending.len() >= MAX_RECORD_LEN {
                // Resynchronise on the next newline.
                records.push(Err(WireError::Oversized(MAX_RECORD_LEN)));
                self.pending.clear();
                self.pending.push(byte);
            } else {
                self.pending.push(byte);
            }
        }
        records
    }

    /// Bytes waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let update = parse_record("X:612|Y:480|SW:0").unwrap();
        assert_eq!(update.x, Some(612));
        assert_eq!(update.y, Some(480));
        assert_eq!(update.switch, Some(false));
    }

    #[test]
    fn parses_partial_record() {
        let update = parse_record("SW:1").unwrap();
        assert_eq!(
            update,
            JoystickUpdate {
                switch: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn tolerates_whitespace_and_carriage_return() {
        let update = parse_record(" X: 100 | Y:200\r").unwrap();
        assert_eq!(update.x, Some(100));
        assert_eq!(update.y, Some(200));
    }

    #[test]
    fn rejects_non_numeric_value() {
        assert_eq!(
            parse_record("X:abc|Y:700"),
            Err(WireError::InvalidValue { key: "X".into(), value: "abc".into() })
        );
        assert!(parse_record("Y:+5").is_err());
        assert!(parse_record("Y:").is_err());
        assert!(parse_record("Y:99999999999").is_err());
    }

    #[test]
    fn rejects_unknown_key() {
        assert_eq!(parse_record("X:1|Z:2"), Err(WireError::UnknownKey("Z".into())));
        assert_eq!(parse_record("x:1"), Err(WireError::UnknownKey("x".into())));
    }

    #[test]
    fn rejects_bad_token_shape() {
        assert!(matches!(parse_record("X612"), Err(WireError::MalformedField(_))));
        assert!(matches!(parse_record("X:1:2"), Err(WireError::MalformedField(_))));
        assert!(matches!(parse_record("X:1||Y:2"), Err(WireError::MalformedField(_))));
    }

    #[test]
    fn rejects_duplicate_key() {
        assert_eq!(parse_record("X:1|X:2"), Err(WireError::DuplicateKey("X".into())));
    }

    #[test]
    fn rejects_switch_outside_zero_one() {
        assert_eq!(parse_record("X:512|SW:2"), Err(WireError::InvalidSwitch(2)));
    }

    #[test]
    fn framer_holds_partial_record_until_newline() {
        let mut framer = RecordFramer::new();
        assert!(framer.push(b"X:61").is_empty());
        assert_eq!(framer.pending_len(), 4);
        let records = framer.push(b"2|Y:480\nSW:");
        assert_eq!(records, vec![Ok("X:612|Y:480".to_string())]);
        assert_eq!(framer.pending_len(), 3);
    }

    #[test]
    fn framer_splits_coalesced_records_and_skips_blanks() {
        let mut framer = RecordFramer::new();
        let records = framer.push(b"X:1\n\n\r\nY:2\n");
        assert_eq!(records, vec![Ok("X:1".to_string()), Ok("Y:2".to_string())]);
    }

    #[test]
    fn framer_drops_oversized_run() {
        let mut framer = RecordFramer::new();
        let junk = vec![b'7'; MAX_RECORD_LEN + 10];
        let records = framer.push(&junk);
        assert_eq!(records, vec![Err(WireError::Oversized(MAX_RECORD_LEN))]);
        let records = framer.push(b"\nX:5\n");
        // The tail of the junk run is a malformed record of its own.
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], Ok("X:5".to_string()));
    }

    #[test]
    fn framer_flags_invalid_utf8() {
        let mut framer = RecordFramer::new();
        assert_eq!(framer.push(b"X:\xff\n"), vec![Err(WireError::NotUtf8)]);
    }
}
