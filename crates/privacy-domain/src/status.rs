use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Simple status payload: one optional coordinate pair and a redaction flag,
/// plus whatever else the device sent, preserved verbatim in `overflow`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusData {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_redacted: Option<bool>,
    pub overflow: Map<String, Value>,
}

impl<'de> Deserialize<'de> for StatusData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut overflow = Map::deserialize(deserializer)?;

        let latitude = take_number(&mut overflow, "latitude");
        let longitude = take_number(&mut overflow, "longitude");
        let is_redacted = take_bool(&mut overflow, "isRedacted");

        Ok(Self {
            latitude,
            longitude,
            is_redacted,
            overflow,
        })
    }
}

impl Serialize for StatusData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Typed fields are written last so they win over any leftover
        // overflow entry of the same name.
        let mut map = self.overflow.clone();
        if let Some(latitude) = self.latitude {
            map.insert("latitude".to_owned(), number_value(latitude));
        }
        if let Some(longitude) = self.longitude {
            map.insert("longitude".to_owned(), number_value(longitude));
        }
        if let Some(flag) = self.is_redacted {
            map.insert("isRedacted".to_owned(), Value::Bool(flag));
        }
        map.serialize(serializer)
    }
}

/// Lifts `key` out of the map when it holds a number; an explicit null is
/// dropped. A value of any other type stays in the map untouched so it still
/// round-trips, while the typed field reads as absent.
fn take_number(map: &mut Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key) {
        Some(Value::Number(number)) => {
            let parsed = number.as_f64();
            map.remove(key);
            parsed
        }
        Some(Value::Null) => {
            map.remove(key);
            None
        }
        _ => None,
    }
}

fn take_bool(map: &mut Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key) {
        Some(Value::Bool(flag)) => {
            let flag = *flag;
            map.remove(key);
            Some(flag)
        }
        Some(Value::Null) => {
            map.remove(key);
            None
        }
        _ => None,
    }
}

fn number_value(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Fence-table payload: the device's privacy zones as string-encoded cell
/// indexes, coarsest-priority order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FenceData {
    #[serde(rename = "h3Indexes", default)]
    pub h3_indexes: Vec<String>,

    #[serde(flatten)]
    pub overflow: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lifts_known_fields_and_keeps_the_rest() {
        let data: StatusData = serde_json::from_value(json!({
            "latitude": 42.26172693660968,
            "longitude": -83.71029708818693,
            "odometer": 10571.8,
            "charging": true
        }))
        .unwrap();

        assert_eq!(data.latitude, Some(42.26172693660968));
        assert_eq!(data.longitude, Some(-83.71029708818693));
        assert!(data.is_redacted.is_none());
        assert_eq!(data.overflow.get("odometer"), Some(&json!(10571.8)));
        assert_eq!(data.overflow.get("charging"), Some(&json!(true)));
        assert!(!data.overflow.contains_key("latitude"));
    }

    #[test]
    fn unknown_fields_survive_a_mutate_cycle() {
        let input = json!({
            "latitude": 42.5,
            "longitude": -83.1,
            "tires": {"frontLeft": 32.5, "frontRight": 32.75},
            "errors": [null, "P0420"],
            "vin": "1VWSA7A32LC011823"
        });

        let mut data: StatusData = serde_json::from_value(input.clone()).unwrap();
        data.latitude = Some(42.0);
        data.longitude = Some(-83.0);
        data.is_redacted = Some(true);

        let output = serde_json::to_value(&data).unwrap();

        assert_eq!(output["tires"], input["tires"]);
        assert_eq!(output["errors"], input["errors"]);
        assert_eq!(output["vin"], input["vin"]);
        assert_eq!(output["latitude"], json!(42.0));
        assert_eq!(output["isRedacted"], json!(true));
    }

    #[test]
    fn non_numeric_coordinate_reads_as_absent_but_round_trips() {
        let data: StatusData = serde_json::from_value(json!({
            "latitude": "42.5",
            "longitude": -83.1
        }))
        .unwrap();

        assert!(data.latitude.is_none());
        assert_eq!(data.longitude, Some(-83.1));
        assert_eq!(data.overflow.get("latitude"), Some(&json!("42.5")));

        let output = serde_json::to_value(&data).unwrap();
        assert_eq!(output["latitude"], json!("42.5"));
    }

    #[test]
    fn typed_field_wins_over_a_leftover_overflow_entry() {
        let mut data: StatusData = serde_json::from_value(json!({
            "latitude": "garbage"
        }))
        .unwrap();
        data.latitude = Some(41.0);

        let output = serde_json::to_value(&data).unwrap();

        assert_eq!(output["latitude"], json!(41.0));
    }

    #[test]
    fn explicit_null_coordinate_is_dropped() {
        let data: StatusData = serde_json::from_value(json!({
            "latitude": null,
            "longitude": -83.1
        }))
        .unwrap();

        assert!(data.latitude.is_none());
        assert!(!data.overflow.contains_key("latitude"));

        let output = serde_json::to_value(&data).unwrap();
        assert!(output.get("latitude").is_none());
    }

    #[test]
    fn fence_data_keeps_index_order_and_extras() {
        let fence: FenceData = serde_json::from_value(json!({
            "h3Indexes": ["872ab259affffff", "872ab259effffff"],
            "updatedBy": "user-7"
        }))
        .unwrap();

        assert_eq!(
            fence.h3_indexes,
            vec!["872ab259affffff".to_owned(), "872ab259effffff".to_owned()]
        );

        let output = serde_json::to_value(&fence).unwrap();
        assert_eq!(output["updatedBy"], json!("user-7"));
    }
}
