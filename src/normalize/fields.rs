use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Read-only view over a raw issue's `fields` object.
///
/// Every accessor returns `None` when the field is missing, null or not of
/// the expected shape, so callers only ever pick a default.
pub struct FieldMap<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> FieldMap<'a> {
    pub fn new(fields: Option<&'a Value>) -> Self {
        Self {
            fields: fields.and_then(Value::as_object),
        }
    }

    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|f| f.get(name))
            .filter(|v| !v.is_null())
    }

    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.raw(name)?;
        match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(field = name, %err, "ignoring malformed field");
                None
            }
        }
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name)
    }

    /// The `name` of an object-valued field such as `status` or `priority`.
    pub fn name_of(&self, name: &str) -> Option<String> {
        self.get::<Named>(name).and_then(|n| n.name)
    }

    /// Numeric field, accepting either integer or float JSON numbers.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.raw(name).and_then(Value::as_f64)
    }

    pub fn seconds(&self, name: &str) -> Option<i64> {
        let value = self.raw(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.round() as i64))
    }
}

/// Deserialize a nested subfield to `None` when it has the wrong shape,
/// leaving its siblings intact.
///
/// Use with `#[serde(default, deserialize_with = "lenient")]`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Deserialize)]
struct Named {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserField {
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub account_id: Option<String>,
}
