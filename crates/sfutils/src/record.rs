//! Records and typed record mapping.

use crate::error::{SfError, SfResult};
use crate::picklist::Picklist;
use crate::value::Value;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// Default name of the identifier field on the wire.
pub const DEFAULT_ID_FIELD: &str = "Id";

/// Key holding record metadata (`type`, `url`) on the wire.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// A schema-flexible record: an object type, an optional identifier and named fields.
///
/// Fields returned by a query that hold nested objects are decoded into
/// [`Record::related`] (parent relationships) or [`Record::children`]
/// (child subqueries).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    object_type: Option<String>,
    id: Option<String>,
    fields: BTreeMap<String, Value>,
    related: BTreeMap<String, Record>,
    children: BTreeMap<String, Vec<Record>>,
}

impl Record {
    /// An empty record with no type, identifier or fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty record of the given object type.
    pub fn of_type(object_type: impl Into<String>) -> Self {
        Self {
            object_type: Some(object_type.into()),
            ..Self::default()
        }
    }

    /// Set the identifier (builder form).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a field (builder form).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    pub fn set_object_type(&mut self, object_type: impl Into<String>) -> &mut Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Whether no identifier and no fields have been assigned.
    pub fn is_bare(&self) -> bool {
        self.id.is_none() && self.fields.is_empty()
    }

    /// A parent record reached through a relationship field.
    pub fn related(&self, name: &str) -> Option<&Record> {
        self.related.get(name)
    }

    /// Child records returned by a subquery.
    pub fn children(&self, name: &str) -> &[Record] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overlay `values` onto this record; incoming values win.
    pub fn merge_fields<K, V>(&mut self, values: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in values {
            self.set(name, value);
        }
        self
    }

    /// Decode a typed field.
    pub fn try_get<T: FromValue>(&self, name: &str) -> SfResult<T> {
        T::from_value(self.fields.get(name).unwrap_or(&Value::Null))
            .map_err(|message| SfError::decode(format!("field '{name}': {message}")))
    }

    /// Encode for a write operation.
    ///
    /// `object_type` takes precedence over the record's own type.
    pub fn to_wire(&self, object_type: Option<&str>, id_field: &str) -> Json {
        let mut obj = Map::new();
        if let Some(ty) = object_type.or(self.object_type.as_deref()) {
            let mut attributes = Map::new();
            attributes.insert("type".to_string(), Json::String(ty.to_string()));
            obj.insert(ATTRIBUTES_KEY.to_string(), Json::Object(attributes));
        }
        if let Some(id) = &self.id {
            obj.insert(id_field.to_string(), Json::String(id.clone()));
        }
        for (name, value) in &self.fields {
            obj.insert(name.clone(), value.to_json());
        }
        Json::Object(obj)
    }

    /// Decode a record returned by the remote store.
    pub fn from_wire(json: Json, id_field: &str) -> SfResult<Self> {
        let Json::Object(obj) = json else {
            return Err(SfError::decode(format!(
                "expected a record object, got {}",
                json_kind(&json)
            )));
        };

        let mut record = Record::new();
        for (key, value) in obj {
            if key == ATTRIBUTES_KEY {
                record.object_type = value
                    .get("type")
                    .and_then(Json::as_str)
                    .map(str::to_string);
                continue;
            }
            if key == id_field {
                match value {
                    Json::String(id) => record.id = Some(id),
                    Json::Null => {}
                    other => record.id = Some(other.to_string()),
                }
                continue;
            }
            match value {
                Json::Object(mut nested) => {
                    if let Some(Json::Array(rows)) = nested.remove("records") {
                        let children = rows
                            .into_iter()
                            .map(|row| Record::from_wire(row, id_field))
                            .collect::<SfResult<Vec<_>>>()?;
                        record.children.insert(key, children);
                    } else {
                        let parent = Record::from_wire(Json::Object(nested), id_field)?;
                        record.related.insert(key, parent);
                    }
                }
                other => {
                    record.fields.insert(key, Value::from_json(other));
                }
            }
        }
        Ok(record)
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Conversion from a field [`Value`] into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("expected text, got {value:?}"))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(format!("expected a boolean, got {other:?}")),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(n) => Ok(*n),
            Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            Value::Text(s) => s.parse().map_err(|e| format!("invalid integer '{s}': {e}")),
            other => Err(format!("expected an integer, got {other:?}")),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => s.parse().map_err(|e| format!("invalid number '{s}': {e}")),
            other => other
                .as_f64()
                .ok_or_else(|| format!("expected a number, got {other:?}")),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::Text(s) => parse_datetime(s),
            other => Err(format!("expected a timestamp, got {other:?}")),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{s}': {e}")),
            other => Err(format!("expected a date, got {other:?}")),
        }
    }
}

impl FromValue for Picklist {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Picklist::new()),
            Value::Text(s) => Ok(Picklist::from_str_with(s, true)),
            Value::List(items) => items.iter().map(String::from_value).collect(),
            other => Err(format!("expected a picklist, got {other:?}")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Remote timestamps come back as `2000-01-01T12:00:00.000+0000`, which is
/// not quite RFC 3339.
fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|e| format!("invalid timestamp '{s}': {e}"))
}

/// Maps a [`Record`] into a Rust type.
///
/// # Example
///
/// ```ignore
/// struct Contact {
///     id: String,
///     email: Option<String>,
/// }
///
/// impl FromRecord for Contact {
///     fn from_record(record: &Record) -> SfResult<Self> {
///         Ok(Self {
///             id: record.id().unwrap_or_default().to_string(),
///             email: record.try_get("Email")?,
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> SfResult<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> SfResult<Self> {
        Ok(record.clone())
    }
}

/// Anything that names a record by identifier.
///
/// Used by `delete`/`undelete`, which accept raw ids or records.
pub trait RecordId {
    fn record_id(&self) -> Option<&str>;
}

impl RecordId for str {
    fn record_id(&self) -> Option<&str> {
        Some(self)
    }
}

impl RecordId for String {
    fn record_id(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl RecordId for Record {
    fn record_id(&self) -> Option<&str> {
        self.id()
    }
}

impl<T: RecordId + ?Sized> RecordId for &T {
    fn record_id(&self) -> Option<&str> {
        (**self).record_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_encoding_includes_type_id_and_fields() {
        let record = Record::new()
            .with_id("abc123")
            .with_field("Name", "Acme")
            .with_field("Employees", 12);
        assert_eq!(
            record.to_wire(Some("Account"), DEFAULT_ID_FIELD),
            json!({
                "attributes": { "type": "Account" },
                "Id": "abc123",
                "Name": "Acme",
                "Employees": 12,
            })
        );
    }

    #[test]
    fn wire_encoding_without_type_or_id() {
        let record = Record::new().with_field("Name", "x");
        assert_eq!(record.to_wire(None, DEFAULT_ID_FIELD), json!({ "Name": "x" }));
    }

    #[test]
    fn decodes_nested_relationships_and_subqueries() {
        let json = json!({
            "attributes": { "type": "Contact", "url": "/x" },
            "Id": "003",
            "LastName": "Smith",
            "Account": { "attributes": { "type": "Account" }, "Name": "Acme" },
            "Cases": { "totalSize": 1, "done": true, "records": [ { "Id": "500", "Subject": "Help" } ] },
        });
        let record = Record::from_wire(json, DEFAULT_ID_FIELD).unwrap();

        assert_eq!(record.object_type(), Some("Contact"));
        assert_eq!(record.id(), Some("003"));
        assert_eq!(record.get("LastName"), Some(&Value::from("Smith")));
        assert!(!record.contains("Account"));
        assert_eq!(
            record.related("Account").and_then(|a| a.get("Name")),
            Some(&Value::from("Acme"))
        );
        assert_eq!(record.children("Cases").len(), 1);
        assert_eq!(record.children("Cases")[0].id(), Some("500"));
        assert!(record.children("Opportunities").is_empty());
    }

    #[test]
    fn decoding_a_non_object_is_an_error() {
        let err = Record::from_wire(json!("nope"), DEFAULT_ID_FIELD).unwrap_err();
        assert!(matches!(err, SfError::Decode(_)));
    }

    #[test]
    fn typed_field_access() {
        let record = Record::new()
            .with_field("Name", "Acme")
            .with_field("Count", 3)
            .with_field("Active", true)
            .with_field("Colors", "Red;Blue")
            .with_field("Created", "2000-01-01T12:00:00.000+0000")
            .with_field("Missing", Value::Null);

        assert_eq!(record.try_get::<String>("Name").unwrap(), "Acme");
        assert_eq!(record.try_get::<i64>("Count").unwrap(), 3);
        assert!(record.try_get::<bool>("Active").unwrap());
        assert_eq!(
            record.try_get::<Picklist>("Colors").unwrap().values(),
            ["Red", "Blue"]
        );
        assert_eq!(
            record
                .try_get::<DateTime<FixedOffset>>("Created")
                .unwrap()
                .to_rfc3339(),
            "2000-01-01T12:00:00+00:00"
        );
        assert_eq!(record.try_get::<Option<String>>("Missing").unwrap(), None);
        assert_eq!(record.try_get::<Option<String>>("Absent").unwrap(), None);
        assert!(record.try_get::<i64>("Name").is_err());
    }

    #[test]
    fn merge_fields_overrides_existing_values() {
        let mut record = Record::new().with_id("1").with_field("a", "old").with_field("b", "keep");
        record.merge_fields([("a", "new"), ("c", "added")]);

        assert_eq!(record.get("a"), Some(&Value::from("new")));
        assert_eq!(record.get("b"), Some(&Value::from("keep")));
        assert_eq!(record.get("c"), Some(&Value::from("added")));
        assert_eq!(record.id(), Some("1"));
    }

    #[test]
    fn bare_records() {
        assert!(Record::new().is_bare());
        assert!(Record::of_type("Account").is_bare());
        assert!(!Record::new().with_id("1").is_bare());
        assert!(!Record::new().with_field("a", 1).is_bare());
    }
}
