//! Raw pulse recordings.
//!
//! Recordings are stored as JSON:
//!
//! ```json
//! { "gpio_in": 4, "pulse_us": [9000, 4500, 560, 560, 560] }
//! ```
//!
//! `pulse_us` alternates mark and space durations in microseconds, starting
//! with a mark. `gpio_in` is the input pin the signal was captured on and is
//! kept for information only: integers, whole floats (`4.0`) and numeric
//! strings (`"4"`) are accepted, anything else reads as unknown.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::PlayError;

/// A captured IR frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Input GPIO used during capture, if the recorder noted it
    #[serde(
        default,
        deserialize_with = "lenient_gpio",
        skip_serializing_if = "Option::is_none"
    )]
    pub gpio_in: Option<i32>,
    /// Alternating mark/space durations in microseconds
    pub pulse_us: Vec<u32>,
}

impl Recording {
    pub fn new(gpio_in: Option<i32>, pulse_us: Vec<u32>) -> Self {
        Self { gpio_in, pulse_us }
    }

    /// Parse a recording from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, PlayError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, PlayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of mark entries (even positions).
    pub fn mark_count(&self) -> usize {
        self.pulse_us.len().div_ceil(2)
    }

    /// Sum of all recorded durations, before carrier rounding.
    pub fn duration_us(&self) -> u64 {
        self.pulse_us.iter().map(|&d| u64::from(d)).sum()
    }

    /// Whether the last recorded entry is a mark.
    pub fn ends_on_mark(&self) -> bool {
        self.pulse_us.len() % 2 == 1
    }
}

fn lenient_gpio<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let gpio = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(gpio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording() {
        let rec = Recording::from_json(r#"{"gpio_in": 4, "pulse_us": [1000, 500, 1000]}"#).unwrap();
        assert_eq!(rec.gpio_in, Some(4));
        assert_eq!(rec.pulse_us, vec![1000, 500, 1000]);
        assert_eq!(rec.mark_count(), 2);
        assert_eq!(rec.duration_us(), 2500);
        assert!(rec.ends_on_mark());
    }

    #[test]
    fn test_gpio_in_is_optional() {
        let rec = Recording::from_json(r#"{"pulse_us": []}"#).unwrap();
        assert_eq!(rec.gpio_in, None);
        assert!(rec.pulse_us.is_empty());
        assert!(!rec.ends_on_mark());
    }

    #[test]
    fn test_json_text_survives_reload() {
        let rec = Recording::new(Some(4), vec![1000, 500, 1000]);
        let text = rec.to_json().unwrap();
        assert_eq!(Recording::from_json(&text).unwrap(), rec);
    }

    #[test]
    fn test_missing_pulses_rejected() {
        let err = Recording::from_json(r#"{"gpio_in": 4}"#).unwrap_err();
        match err {
            PlayError::InvalidRecording(msg) => assert!(msg.contains("pulse_us")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_integer_pulses_rejected() {
        for text in [
            r#"{"pulse_us": [1000, 500.5]}"#,
            r#"{"pulse_us": [1000, "500"]}"#,
            r#"{"pulse_us": [1000, -500]}"#,
            r#"{"pulse_us": [1000, null]}"#,
            r#"{"pulse_us": "1000,500"}"#,
        ] {
            assert!(
                matches!(
                    Recording::from_json(text),
                    Err(PlayError::InvalidRecording(_))
                ),
                "accepted {}",
                text
            );
        }
    }

    #[test]
    fn test_not_json_rejected() {
        assert!(matches!(
            Recording::from_json("pulse_us = [1, 2]"),
            Err(PlayError::InvalidRecording(_))
        ));
    }

    #[test]
    fn test_gpio_in_is_informational() {
        for (text, expected) in [
            (r#"{"gpio_in": 4.0, "pulse_us": [560]}"#, Some(4)),
            (r#"{"gpio_in": "18", "pulse_us": [560]}"#, Some(18)),
            (r#"{"gpio_in": -1, "pulse_us": [560]}"#, Some(-1)),
            (r#"{"gpio_in": null, "pulse_us": [560]}"#, None),
            (r#"{"gpio_in": "left", "pulse_us": [560]}"#, None),
            (r#"{"gpio_in": [4], "pulse_us": [560]}"#, None),
        ] {
            let rec = Recording::from_json(text).unwrap();
            assert_eq!(rec.gpio_in, expected, "{}", text);
            assert_eq!(rec.pulse_us, vec![560]);
        }
    }
}
