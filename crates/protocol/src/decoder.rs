use crate::format::{FieldSpec, LineFormat};
use telemetry_core::Sample;
use thiserror::Error;

/// Why a line was rejected.  Every variant means the same thing to the
/// caller: the line is malformed and is dropped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field {index}: missing label '{expected}'")]
    MissingLabel { index: usize, expected: String },

    #[error("field {index}: expected label '{expected}', found '{found}'")]
    WrongLabel {
        index:    usize,
        expected: String,
        found:    String,
    },

    #[error("field {index}: '{value}' is not a number")]
    NotNumeric { index: usize, value: String },
}

/// Decode one telemetry line according to `format`.
///
/// Surrounding whitespace (including the trailing `\r\n`) is ignored.  A unit
/// suffix is stripped when present; a value without it is still accepted.
pub fn decode(line: &str, format: &LineFormat) -> Result<Sample, DecodeError> {
    let parts: Vec<&str> = line.trim().split(format.delimiter.as_str()).collect();

    if parts.len() != format.fields.len() {
        return Err(DecodeError::FieldCount {
            expected: format.fields.len(),
            found:    parts.len(),
        });
    }

    let mut readings = Vec::with_capacity(parts.len());
    for (index, (raw, spec)) in parts.iter().zip(&format.fields).enumerate() {
        let value = field_value(index, raw.trim(), spec, &format.separator)?;
        readings.push((spec.channel, value));
    }

    Ok(Sample::from_readings(readings))
}

fn field_value(index: usize, field: &str, spec: &FieldSpec, separator: &str) -> Result<f64, DecodeError> {
    let payload = if spec.label.is_empty() {
        field
    } else {
        let (label, value) = field
            .split_once(separator)
            .ok_or_else(|| DecodeError::MissingLabel {
                index,
                expected: spec.label.clone(),
            })?;
        if label.trim() != spec.label {
            return Err(DecodeError::WrongLabel {
                index,
                expected: spec.label.clone(),
                found:    label.trim().to_string(),
            });
        }
        value.trim()
    };

    let number = if spec.unit.is_empty() {
        payload
    } else {
        payload.strip_suffix(spec.unit.as_str()).unwrap_or(payload).trim_end()
    };

    match number.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DecodeError::NotNumeric {
            index,
            value: payload.to_string(),
        }),
    }
}
