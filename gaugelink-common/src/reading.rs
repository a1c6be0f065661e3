use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::keyexpr::StorePath;

/// A scalar value held by the store.
///
/// Temperatures arrive as numbers, headings and submissions as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    /// Numeric value (e.g. a temperature).
    Number(f64),

    /// Free text (e.g. a heading or a submitted message).
    Text(String),
}

impl Reading {
    /// Numeric interpretation of this reading.
    ///
    /// Text is accepted when it parses as a number once trimmed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Reading::Number(v) if v.is_finite() => Some(*v),
            Reading::Number(_) => None,
            Reading::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Text content, if this is a text reading.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reading::Text(s) => Some(s),
            Reading::Number(_) => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(v) => write!(f, "{}", v),
            Reading::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Reading {
    fn from(v: f64) -> Self {
        Reading::Number(v)
    }
}

impl From<i64> for Reading {
    fn from(v: i64) -> Self {
        Reading::Number(v as f64)
    }
}

impl From<String> for Reading {
    fn from(v: String) -> Self {
        Reading::Text(v)
    }
}

impl From<&str> for Reading {
    fn from(v: &str) -> Self {
        Reading::Text(v.to_string())
    }
}

/// The envelope stored at a path: a value and the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The stored value.
    pub value: Reading,

    /// Unix epoch milliseconds when the value was written.
    pub timestamp: i64,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(value: impl Into<Reading>) -> Self {
        Self {
            value: value.into(),
            timestamp: current_timestamp_millis(),
        }
    }

    /// Create a record with an explicit timestamp.
    pub fn at(value: impl Into<Reading>, timestamp: i64) -> Self {
        Self {
            value: value.into(),
            timestamp,
        }
    }
}

/// A single value-changed notification for a watched path.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Path the notification is about.
    pub path: StorePath,

    /// Current value, or `None` when nothing is stored at the path.
    pub value: Option<Reading>,

    /// Write time of the value, when known.
    pub timestamp: Option<i64>,
}

impl Snapshot {
    /// Snapshot carrying a stored record.
    pub fn from_record(path: StorePath, record: Record) -> Self {
        Self {
            path,
            value: Some(record.value),
            timestamp: Some(record.timestamp),
        }
    }

    /// Snapshot for a path with no value.
    pub fn empty(path: StorePath) -> Self {
        Self {
            path,
            value: None,
            timestamp: None,
        }
    }

    /// Whether the snapshot carries a value.
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }
}

/// Get current Unix epoch milliseconds.
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_untagged_json() {
        let number: Reading = serde_json::from_str("68").unwrap();
        assert_eq!(number, Reading::Number(68.0));

        let text: Reading = serde_json::from_str("\"North\"").unwrap();
        assert_eq!(text, Reading::Text("North".to_string()));

        assert_eq!(serde_json::to_string(&Reading::from("hello")).unwrap(), "\"hello\"");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Reading::Number(21.5).as_number(), Some(21.5));
        assert_eq!(Reading::from(" -4.25 ").as_number(), Some(-4.25));
        assert_eq!(Reading::from("North").as_number(), None);
        assert_eq!(Reading::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Reading::Number(30.0).to_string(), "30");
        assert_eq!(Reading::Number(21.5).to_string(), "21.5");
        assert_eq!(Reading::from("Kitchen").to_string(), "Kitchen");
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::at(21.5, 1_700_000_000_000);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["value"], 21.5);
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_snapshot_constructors() {
        let path = StorePath::new("Current Temperature").unwrap();
        let snapshot = Snapshot::from_record(path.clone(), Record::at(68.0, 5));
        assert!(snapshot.exists());
        assert_eq!(snapshot.timestamp, Some(5));

        let empty = Snapshot::empty(path);
        assert!(!empty.exists());
        assert_eq!(empty.timestamp, None);
    }
}
