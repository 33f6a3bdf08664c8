//! Sensor frame parsing
//!
//! A frame is JSON: either an array of readings indexed by position, or an
//! object keyed by sensor index. `null` entries carry no pair, so the
//! sensor reads 0 once the frame is stored.

use sequential_light::SensorError;
use serde_json::Value;

/// Parse one frame into `(sensor, reading)` pairs
///
/// Negative readings are treated as "nothing detected". Readings above
/// `u16::MAX` saturate.
pub fn parse_frame(text: &str) -> Result<Vec<(usize, u16)>, SensorError> {
    let value: Value =
        serde_json::from_str(text).map_err(|_| SensorError::MalformedReading)?;

    let mut pairs = Vec::new();
    match value {
        Value::Array(items) => {
            for (sensor, item) in items.iter().enumerate() {
                if let Some(reading) = reading(item)? {
                    pairs.push((sensor, reading));
                }
            }
        }
        Value::Object(map) => {
            for (key, item) in &map {
                let sensor = key
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| SensorError::MalformedReading)?;
                if let Some(reading) = reading(item)? {
                    pairs.push((sensor, reading));
                }
            }
        }
        _ => return Err(SensorError::MalformedReading),
    }
    Ok(pairs)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn reading(value: &Value) -> Result<Option<u16>, SensorError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            let distance = number.as_f64().ok_or(SensorError::MalformedReading)?;
            // Float to int casts saturate
            Ok(Some(distance.max(0.0) as u16))
        }
        _ => Err(SensorError::MalformedReading),
    }
}
