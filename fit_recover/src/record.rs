//! Decoded-record abstraction over the external FIT parsing library.
//!
//! The extractor only needs named-field lookups, so that is the whole
//! interface: [`RecordFields`] is implemented for the library's record type
//! here, and for synthetic fixtures in tests, which keeps extraction
//! testable without binary FIT files.

use chrono::{DateTime, Utc};
use fitparser::de::from_bytes;
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};

use crate::RecoverError;

/// A field value as the extractor consumes it: numeric channels widened to
/// `f64`, timestamps normalized to UTC.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(value),
            FieldValue::Timestamp(_) => None,
        }
    }

    pub fn as_timestamp(self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(timestamp) => Some(timestamp),
            FieldValue::Number(_) => None,
        }
    }
}

/// Named-field lookup over one decoded record message.
pub trait RecordFields {
    /// Look up a field by its profile name, if the device recorded it.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl RecordFields for FitDataRecord {
    fn field(&self, name: &str) -> Option<FieldValue> {
        let field = self.fields().iter().find(|f| f.name() == name)?;
        match field.value() {
            Value::Timestamp(ts) => Some(FieldValue::Timestamp(ts.with_timezone(&Utc))),
            value => fit_value_to_f64(value).map(FieldValue::Number),
        }
    }
}

/// Decode a FIT file into its record messages, in file order.
///
/// Decoder failures surface unmodified as [`RecoverError::FitParse`]; there
/// is no partial recovery for malformed input.
pub fn decode_records(input: &[u8]) -> Result<Vec<FitDataRecord>, RecoverError> {
    let messages = from_bytes(input).map_err(|e| RecoverError::FitParse(e.to_string()))?;
    Ok(messages
        .into_iter()
        .filter(|message| message.kind() == MesgNum::Record)
        .collect())
}

fn fit_value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) => Some(*v as f64),
        Value::UInt8z(v) => Some(*v as f64),
        Value::UInt16z(v) => Some(*v as f64),
        Value::UInt32z(v) => Some(*v as f64),
        Value::UInt64z(v) => Some(*v as f64),
        Value::Byte(v) => Some(*v as f64),
        Value::Array(values) => values.iter().find_map(fit_value_to_f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_widen_to_f64() {
        assert_eq!(fit_value_to_f64(&Value::UInt8(150)), Some(150.0));
        assert_eq!(fit_value_to_f64(&Value::SInt8(-4)), Some(-4.0));
        assert_eq!(fit_value_to_f64(&Value::UInt16(523)), Some(523.0));
        assert_eq!(fit_value_to_f64(&Value::SInt32(-480_000_000)), Some(-480_000_000.0));
        assert_eq!(fit_value_to_f64(&Value::Float64(812.4)), Some(812.4));
    }

    #[test]
    fn non_numeric_values_are_skipped() {
        assert_eq!(fit_value_to_f64(&Value::String("rider".into())), None);
        assert_eq!(fit_value_to_f64(&Value::Enum(3)), None);
    }

    #[test]
    fn arrays_yield_first_numeric_element() {
        let value = Value::Array(vec![Value::String("pad".into()), Value::UInt16(88)]);
        assert_eq!(fit_value_to_f64(&value), Some(88.0));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = decode_records(b"definitely not a FIT container").unwrap_err();
        assert!(matches!(err, RecoverError::FitParse(_)));
    }

    #[test]
    fn field_value_accessors_are_exclusive() {
        let number = FieldValue::Number(42.0);
        assert_eq!(number.as_number(), Some(42.0));
        assert_eq!(number.as_timestamp(), None);
    }
}
