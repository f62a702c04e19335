//! Firestore REST wire types.
//!
//! Documents come back with every field wrapped in a typed value
//! (`{"stringValue": "..."}`, `{"mapValue": {"fields": {...}}}`, ...). They are
//! flattened into plain JSON so the collection models can use ordinary serde
//! derives.

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<DocumentDto>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    /// Full resource path, `projects/.../documents/<collection>/<id>`.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, ValueDto>,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueDto {
    NullValue(IgnoredAny),
    BooleanValue(bool),
    /// int64 values are sent as JSON strings.
    IntegerValue(Value),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(Value),
    ArrayValue(ArrayValueDto),
    MapValue(MapValueDto),
}

#[derive(Debug, Default, Deserialize)]
pub struct ArrayValueDto {
    #[serde(default)]
    pub values: Vec<ValueDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapValueDto {
    #[serde(default)]
    pub fields: HashMap<String, ValueDto>,
}

impl ValueDto {
    pub fn into_json(self) -> Value {
        match self {
            ValueDto::NullValue(_) => Value::Null,
            ValueDto::BooleanValue(b) => Value::Bool(b),
            ValueDto::IntegerValue(raw) => match raw {
                Value::String(s) => s
                    .parse::<i64>()
                    .map(|n| Value::Number(n.into()))
                    .unwrap_or(Value::String(s)),
                other => other,
            },
            ValueDto::DoubleValue(d) => {
                Number::from_f64(d).map(Value::Number).unwrap_or(Value::Null)
            }
            ValueDto::TimestampValue(s)
            | ValueDto::StringValue(s)
            | ValueDto::BytesValue(s)
            | ValueDto::ReferenceValue(s) => Value::String(s),
            ValueDto::GeoPointValue(point) => point,
            ValueDto::ArrayValue(array) => {
                Value::Array(array.values.into_iter().map(ValueDto::into_json).collect())
            }
            ValueDto::MapValue(map) => Value::Object(fields_to_object(map.fields)),
        }
    }
}

fn fields_to_object(fields: HashMap<String, ValueDto>) -> Map<String, Value> {
    fields.into_iter().map(|(k, v)| (k, v.into_json())).collect()
}

impl DocumentDto {
    /// Last segment of the resource path.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Plain JSON object of the fields. The document id is exposed as `id`
    /// unless the document stores its own, and the server creation time fills
    /// `createdAt` when the field is absent.
    pub fn into_json(self) -> Value {
        let id = self.id().to_string();
        let mut object = fields_to_object(self.fields);

        object.entry("id").or_insert(Value::String(id));
        if let Some(created) = self.create_time {
            object.entry("createdAt").or_insert(Value::String(created));
        }

        Value::Object(object)
    }
}
