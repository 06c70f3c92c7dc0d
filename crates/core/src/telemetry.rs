//! Telemetry records decoded from inbound datagrams.

use serde_json::{Map, Value};

use crate::error::Result;

/// Integer identifier of a remote sensing device (IED).
pub type DeviceId = i64;

/// One decoded measurement datagram: field name → scalar value.
///
/// Records are consumed once by the evaluator and never retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryRecord {
    fields: Map<String, Value>,
}

impl TelemetryRecord {
    /// Decode a UTF-8 JSON object payload.
    ///
    /// Anything other than a top-level object is rejected.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let fields: Map<String, Value> = serde_json::from_slice(payload)?;
        Ok(Self { fields })
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The device id stored under `field`.
    ///
    /// Returns `None` when the field is missing, non-numeric, or not an
    /// integral value representable as [`DeviceId`].
    pub fn device_id(&self, field: &str) -> Option<DeviceId> {
        let value = self.fields.get(field)?;
        if let Some(id) = value.as_i64() {
            return Some(id);
        }
        let f = value.as_f64()?;
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }

    /// Numeric value of `field`, or `None` if absent or not a number.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_object_payload() {
        let record = TelemetryRecord::decode(br#"{"deviceId": 11, "Ia": 305.2, "status": "ok"}"#)
            .unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.device_id("deviceId"), Some(11));
        assert_eq!(record.numeric("Ia"), Some(305.2));
        assert_eq!(record.numeric("status"), None);
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert!(TelemetryRecord::decode(b"[1, 2, 3]").is_err());
        assert!(TelemetryRecord::decode(b"42").is_err());
        assert!(TelemetryRecord::decode(b"not json").is_err());
        assert!(TelemetryRecord::decode(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn device_id_requires_integral_number() {
        let record = TelemetryRecord::from_pairs([
            ("a", json!(7)),
            ("b", json!(7.0)),
            ("c", json!(7.5)),
            ("d", json!("7")),
            ("e", json!(null)),
        ]);
        assert_eq!(record.device_id("a"), Some(7));
        assert_eq!(record.device_id("b"), Some(7));
        assert_eq!(record.device_id("c"), None);
        assert_eq!(record.device_id("d"), None);
        assert_eq!(record.device_id("e"), None);
        assert_eq!(record.device_id("missing"), None);
    }

    #[test]
    fn booleans_are_not_numeric() {
        let record = TelemetryRecord::from_pairs([("breaker", json!(true))]);
        assert_eq!(record.numeric("breaker"), None);
        assert!(record.get("breaker").is_some());
    }
}
