use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Color, ScaleAxis, COLOR_KEY, DEFAULT_COLOR, SCALE_DIVISOR};

/// Errors produced while reading or editing a parameter set
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("invalid parameter JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parameter document must be a JSON object")]
    NotAnObject,

    #[error("parameter '{key}' has unsupported value {found}")]
    InvalidValue { key: String, found: String },

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error("parameter '{0}' not found")]
    NotFound(String),

    #[error("parameter '{0}' is not numeric")]
    NotNumeric(String),
}

/// A single parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Color(Color),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            ParamValue::Number(_) => None,
        }
    }
}

/// Named model parameters in document order.
///
/// Every key holds a number except [`COLOR_KEY`], which holds a color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object, keeping key order
    pub fn from_json(json: &str) -> Result<Self, ParameterError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParameterError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Build from a JSON object.
    ///
    /// Only a non-object document is an error. A `null`, empty or unreadable
    /// color counts as absent, and values that are not numbers are skipped.
    pub fn from_value(value: Value) -> Result<Self, ParameterError> {
        let Value::Object(map) = value else {
            return Err(ParameterError::NotAnObject);
        };

        let mut entries = Vec::with_capacity(map.len());
        for (key, raw) in map {
            let value = if key == COLOR_KEY {
                color_from_json(&raw).map(ParamValue::Color)
            } else {
                number_from_json(&key, &raw).map(ParamValue::Number)
            };
            match value {
                Ok(value) => entries.push((key, value)),
                Err(Some(e)) => tracing::warn!("Skipping parameter '{key}': {e}"),
                Err(None) => {}
            }
        }

        Ok(Self { entries })
    }

    /// Serialize back to a JSON object in the same key order
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.entries {
            let v = match value {
                ParamValue::Number(n) => serde_json::Number::from_f64(*n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                ParamValue::Color(c) => Value::String(c.to_hex()),
            };
            map.insert(key.clone(), v);
        }
        Value::Object(map)
    }

    /// Append the default color if the color key is absent.
    ///
    /// Returns `true` when the default was injected.
    pub fn ensure_color(&mut self) -> bool {
        if self.get(COLOR_KEY).is_some() {
            return false;
        }
        // DEFAULT_COLOR is a valid literal
        let default = Color::from_hex(DEFAULT_COLOR).unwrap_or(Color::rgb(0x00, 0xaa, 0xff));
        self.entries
            .push((COLOR_KEY.to_string(), ParamValue::Color(default)));
        true
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_number)
    }

    /// The color parameter, if present
    pub fn color(&self) -> Option<Color> {
        self.get(COLOR_KEY).and_then(ParamValue::as_color)
    }

    /// Overwrite an existing numeric parameter in place
    pub fn set_number(&mut self, key: &str, value: f64) -> Result<(), ParameterError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .ok_or_else(|| ParameterError::NotFound(key.to_string()))?;
        match &mut slot.1 {
            ParamValue::Number(v) => {
                *v = value;
                Ok(())
            }
            ParamValue::Color(_) => Err(ParameterError::NotNumeric(key.to_string())),
        }
    }

    /// Set the color parameter, appending it if missing
    pub fn set_color(&mut self, color: Color) {
        match self.entries.iter_mut().find(|(k, _)| k == COLOR_KEY) {
            Some(slot) => slot.1 = ParamValue::Color(color),
            None => self
                .entries
                .push((COLOR_KEY.to_string(), ParamValue::Color(color))),
        }
    }

    /// Scale factor for one axis (`value / 100`), if its key is present
    pub fn scale_factor(&self, axis: ScaleAxis) -> Option<f64> {
        self.number(axis.key()).map(|v| v / SCALE_DIVISOR)
    }

    /// Scale factors for X, Y, Z
    pub fn scale_factors(&self) -> [Option<f64>; 3] {
        ScaleAxis::ALL.map(|axis| self.scale_factor(axis))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `Err(None)` for an unset color (`null` or `""`)
fn color_from_json(raw: &Value) -> Result<Color, Option<ParameterError>> {
    match raw {
        Value::Null => Err(None),
        Value::String(s) if s.trim().is_empty() => Err(None),
        Value::String(s) => Color::from_hex(s.trim()).map_err(Some),
        other => Err(Some(ParameterError::InvalidValue {
            key: COLOR_KEY.to_string(),
            found: other.to_string(),
        })),
    }
}

/// Numbers and numeric strings are accepted, matching what a number input would show
fn number_from_json(key: &str, raw: &Value) -> Result<f64, Option<ParameterError>> {
    let invalid = || {
        Some(ParameterError::InvalidValue {
            key: key.to_string(),
            found: raw.to_string(),
        })
    };
    match raw {
        Value::Number(n) => n.as_f64().ok_or_else(invalid),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
