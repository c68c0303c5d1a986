use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

/// `YYYY-MM-DD HH:MM:SS`, server local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const MISSING_DATA: &str = "Missing data";
pub const INVALID_DATA: &str = "Invalid data";

/// A latitude or longitude exactly as the client sent it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Coordinate {
    Number(serde_json::Number),
    Text(String),
}

/// One timestamped observation. Never edited once appended.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Raw `update_location` body. Fields stay untyped until [`LocationInput::validate`]
/// so that falsy values can be told apart from wrong types.
#[derive(Clone, Debug, Default)]
pub struct LocationInput {
    pub user_id: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub photo_url: Option<Value>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationRules {
    /// When false, `0` coordinates count as missing like any other falsy value.
    pub allow_zero_coordinates: bool,
}

/// A checked input, ready to become a [`LocationRecord`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidLocation {
    pub user_id: String,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub photo_url: Option<String>,
}

impl LocationInput {
    /// Pick the known fields out of a JSON object. Anything other than an
    /// object (array, scalar, null) carries no fields.
    pub fn from_body(body: Value) -> Self {
        let Value::Object(mut map) = body else {
            return Self::default();
        };
        Self {
            user_id: map.remove("user_id"),
            latitude: map.remove("latitude"),
            longitude: map.remove("longitude"),
            photo_url: map.remove("photo_url"),
        }
    }

    /// Presence first (all three required fields), then types.
    pub fn validate(self, rules: ValidationRules) -> Result<ValidLocation, ServiceError> {
        let coordinate_present = |v: &Option<Value>| match v {
            Some(v) if rules.allow_zero_coordinates => !v.is_null() && v.as_str() != Some(""),
            Some(v) => is_truthy(v),
            None => false,
        };
        let user_present = self.user_id.as_ref().is_some_and(is_truthy);
        if !user_present || !coordinate_present(&self.latitude) || !coordinate_present(&self.longitude) {
            return Err(ServiceError::validation(MISSING_DATA));
        }

        let user_id = match self.user_id {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(ServiceError::validation(INVALID_DATA)),
        };
        let photo_url = match self.photo_url {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(ServiceError::validation(INVALID_DATA)),
        };

        Ok(ValidLocation {
            user_id,
            latitude: to_coordinate(self.latitude)?,
            longitude: to_coordinate(self.longitude)?,
            photo_url,
        })
    }
}

impl ValidLocation {
    /// Stamp with the current local time.
    pub fn into_record(self) -> (String, LocationRecord) {
        let record = LocationRecord {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: now_timestamp(),
            photo_url: self.photo_url,
        };
        (self.user_id, record)
    }
}

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// JSON truthiness: null, false, zero, empty string/array/object are falsy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn to_coordinate(v: Option<Value>) -> Result<Coordinate, ServiceError> {
    match v {
        Some(Value::Number(n)) => Ok(Coordinate::Number(n)),
        Some(Value::String(s)) => Ok(Coordinate::Text(s)),
        _ => Err(ServiceError::validation(INVALID_DATA)),
    }
}
