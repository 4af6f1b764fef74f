use serde_json::Value;
use tracing::trace;

use crate::models::{Record, UNKNOWN_MAKE};

// ── Field aliases ─────────────────────────────────────────────────────────────

const MAKE_KEYS: &[&str] = &["make", "Make", "MAKE"];
const YEAR_KEYS: &[&str] = &["modelYear", "model_year", "Model_Year", "Model Year"];
const CITY_KEYS: &[&str] = &["city", "City", "CITY"];
const STATE_KEYS: &[&str] = &["state", "State", "STATE"];
const LATITUDE_KEYS: &[&str] = &["latitude", "Latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "Longitude", "lon", "lng"];
const CAPACITY_KEYS: &[&str] = &[
    "batteryCapacityKwh",
    "battery_capacity_kwh",
    "Battery_Capacity",
    "batteryCapacity",
];

// ── NumberParser ──────────────────────────────────────────────────────────────

/// Lenient numeric parsing for values that may arrive as JSON numbers or as
/// text (every CSV cell is text).
pub struct NumberParser;

impl NumberParser {
    /// Parse a finite `f64`.
    ///
    /// * JSON number → its value.
    /// * JSON string → trimmed and parsed; empty strings yield `None`.
    /// * anything else, NaN and ±∞ → `None`.
    pub fn parse_f64(value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            _ => None,
        }?;
        parsed.is_finite().then_some(parsed)
    }

    /// Parse a calendar year.  Accepts integral floats such as `2021.0`;
    /// rejects fractions and values outside `i32`.
    pub fn parse_year(value: &Value) -> Option<i32> {
        if let Some(i) = value.as_i64() {
            return i32::try_from(i).ok();
        }
        let f = Self::parse_f64(value)?;
        if f.fract() != 0.0 || f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
            return None;
        }
        Some(f as i32)
    }
}

// ── FieldExtractor ────────────────────────────────────────────────────────────

/// Looks up a field under any of its accepted spellings.
pub struct FieldExtractor;

impl FieldExtractor {
    /// First non-null value stored under one of `keys`.
    pub fn find<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| data.get(*key))
            .find(|v| !v.is_null())
    }

    /// Trimmed text for the first of `keys` holding a string or number.
    pub fn find_text(data: &Value, keys: &[&str]) -> Option<String> {
        let value = Self::find(data, keys)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

// ── RecordConverter ───────────────────────────────────────────────────────────

/// Turns one raw JSON object into a validated [`Record`].
pub struct RecordConverter;

impl RecordConverter {
    /// Convert `data` into a [`Record`], coercing malformed fields instead of
    /// rejecting the whole row.
    ///
    /// Returns `None` only when `data` is not a JSON object.
    ///
    /// | field      | malformed / missing becomes |
    /// |------------|-----------------------------|
    /// | make       | `"Unknown"`                 |
    /// | model year | `None`                      |
    /// | city/state | empty string                |
    /// | lat/lon    | `None`                      |
    /// | capacity   | `None` (also for negatives) |
    pub fn from_value(data: &Value) -> Option<Record> {
        if !data.is_object() {
            trace!("skipping non-object value: {}", data);
            return None;
        }

        let make = FieldExtractor::find_text(data, MAKE_KEYS)
            .unwrap_or_else(|| UNKNOWN_MAKE.to_string());

        let model_year = FieldExtractor::find(data, YEAR_KEYS).and_then(NumberParser::parse_year);

        let city = FieldExtractor::find_text(data, CITY_KEYS).unwrap_or_default();
        let state = FieldExtractor::find_text(data, STATE_KEYS).unwrap_or_default();

        let latitude = FieldExtractor::find(data, LATITUDE_KEYS).and_then(NumberParser::parse_f64);
        let longitude =
            FieldExtractor::find(data, LONGITUDE_KEYS).and_then(NumberParser::parse_f64);

        let battery_capacity_kwh = FieldExtractor::find(data, CAPACITY_KEYS)
            .and_then(NumberParser::parse_f64)
            .filter(|kwh| *kwh >= 0.0);

        Some(Record {
            make,
            model_year,
            city,
            state,
            latitude,
            longitude,
            battery_capacity_kwh,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
