//! The data an alert job carries until it fires.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::offset::AlertKind;
use crate::error::{CoreError, Result};

/// Key/value payload handed to the execution substrate.
pub type PayloadMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Lead days; only set for advance alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl AlertPayload {
    pub fn to_map(&self) -> PayloadMap {
        let mut map = PayloadMap::new();
        map.insert("name".into(), Value::from(self.name.clone()));
        map.insert("type".into(), Value::from(self.kind.to_string()));
        if let Some(age) = self.age {
            map.insert("age".into(), Value::from(age));
        }
        if let Some(days) = self.days {
            map.insert("days".into(), Value::from(days));
        }
        map
    }

    /// Decode a payload read back from the substrate.
    ///
    /// `name` and `type` are required. `age` and `days` are read when they
    /// hold integers in range and ignored otherwise.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPayload`] if `name` or `type` is missing
    /// or `type` is not a known alert kind.
    pub fn from_map(map: &PayloadMap) -> Result<Self> {
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::InvalidPayload("missing 'name'".into()))?;
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::InvalidPayload("missing 'type'".into()))?
            .parse()?;
        let age = map
            .get("age")
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok());
        let days = map
            .get("days")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());

        Ok(Self {
            name: name.to_string(),
            kind,
            age,
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> PayloadMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn same_day_payload_omits_days() {
        let payload = AlertPayload {
            name: "Ada".into(),
            kind: AlertKind::SameDay,
            age: Some(34),
            days: None,
        };
        assert_eq!(
            Value::Object(payload.to_map()),
            json!({"name": "Ada", "type": "same_day", "age": 34})
        );
    }

    #[test]
    fn map_and_serde_forms_agree() {
        let payload = AlertPayload {
            name: "Grace".into(),
            kind: AlertKind::Advance(7),
            age: None,
            days: Some(7),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            Value::Object(payload.to_map())
        );
    }

    #[test]
    fn decodes_advance_payload() {
        let payload =
            AlertPayload::from_map(&map(json!({"name": "Ada", "type": "3_day_advance", "days": 3})))
                .unwrap();
        assert_eq!(payload.kind, AlertKind::Advance(3));
        assert_eq!(payload.days, Some(3));
        assert_eq!(payload.age, None);
    }

    #[test]
    fn missing_name_or_type_is_rejected() {
        assert!(AlertPayload::from_map(&map(json!({"type": "same_day"}))).is_err());
        assert!(AlertPayload::from_map(&map(json!({"name": "Ada"}))).is_err());
        assert!(AlertPayload::from_map(&map(json!({"name": "Ada", "type": "monthly"}))).is_err());
    }

    #[test]
    fn non_integer_age_is_ignored() {
        let payload =
            AlertPayload::from_map(&map(json!({"name": "Ada", "type": "same_day", "age": "old"})))
                .unwrap();
        assert_eq!(payload.age, None);
    }
}
