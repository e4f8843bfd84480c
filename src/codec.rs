//! Canonical JSON codec for schemas
//!
//! ```json
//! {
//!   "name": "hello",
//!   "schema": [
//!     {
//!       "name": "my hello attribute",
//!       "type": "string",
//!       "position": 1,
//!       "description": "awesome attribute",
//!       "sql": { "type": "nvarchar", "length": null, "scale": null, "precision": null }
//!     }
//!   ],
//!   "sinkAddInfo": ""
//! }
//! ```
//!
//! `encode` always writes `sinkAddInfo`, using `""` when the schema has none.
//! Decoding that output yields `Some("")`, not `None`: the wire format does
//! not distinguish the two and downstream consumers rely on the empty string.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::OutputFormat;
use crate::error::{Result, SchemaError};
use crate::field::{SchemaField, SqlHint};
use crate::schema::Schema;

/// Top-level key holding the schema name
pub const JSON_NAME: &str = "name";
/// Top-level key holding the field list
pub const JSON_SCHEMA: &str = "schema";
/// Top-level key holding the sink metadata
pub const JSON_SINK_ADD_INFO: &str = "sinkAddInfo";

#[derive(Deserialize)]
struct WireSchema {
    name: String,
    schema: Vec<WireField>,
    #[serde(default, rename = "sinkAddInfo")]
    sink_add_info: Option<String>,
}

#[derive(Deserialize)]
struct WireField {
    name: String,
    #[serde(rename = "type")]
    type_tag: String,
    position: u16,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sql: Option<WireSql>,
}

#[derive(Deserialize, Default)]
struct WireSql {
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    length: Option<i32>,
    #[serde(default)]
    scale: Option<i32>,
    #[serde(default)]
    precision: Option<i32>,
}

#[derive(Serialize)]
struct WireSchemaRef<'a> {
    name: &'a str,
    schema: Vec<WireFieldRef<'a>>,
    #[serde(rename = "sinkAddInfo")]
    sink_add_info: &'a str,
}

#[derive(Serialize)]
struct WireFieldRef<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    type_tag: &'a str,
    position: u16,
    description: &'a str,
    sql: WireSqlRef<'a>,
}

#[derive(Serialize)]
struct WireSqlRef<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    length: Option<i32>,
    scale: Option<i32>,
    precision: Option<i32>,
}

impl From<WireField> for SchemaField {
    fn from(wire: WireField) -> Self {
        let sql = wire.sql.unwrap_or_default();
        let hint = SqlHint::new(sql.type_name.unwrap_or_default());
        let hint = match sql.length {
            Some(length) => hint.with_length(length),
            None => hint,
        };
        let hint = match sql.scale {
            Some(scale) => hint.with_scale(scale),
            None => hint,
        };
        let hint = match sql.precision {
            Some(precision) => hint.with_precision(precision),
            None => hint,
        };

        SchemaField::new(
            wire.position,
            wire.name,
            wire.type_tag,
            wire.description.unwrap_or_default(),
            hint,
        )
    }
}

impl<'a> From<&'a SchemaField> for WireFieldRef<'a> {
    fn from(field: &'a SchemaField) -> Self {
        let sql = field.sql();
        Self {
            name: field.name(),
            type_tag: field.type_tag(),
            position: field.id(),
            description: field.description(),
            sql: WireSqlRef {
                type_name: sql.type_name(),
                length: sql.length(),
                scale: sql.scale(),
                precision: sql.precision(),
            },
        }
    }
}

impl<'a> From<&'a Schema> for WireSchemaRef<'a> {
    fn from(schema: &'a Schema) -> Self {
        Self {
            name: schema.name(),
            schema: schema.fields().into_iter().map(WireFieldRef::from).collect(),
            sink_add_info: schema.sink_add_info().unwrap_or(""),
        }
    }
}

/// Decode a schema from its JSON wire representation
///
/// Fields may appear in any order in the `schema` array. A missing or null
/// `sinkAddInfo` leaves the sink info unset. On failure nothing is returned
/// but the error.
pub fn decode(bytes: &[u8]) -> Result<Schema> {
    let schema = parse(bytes).map_err(|e| {
        warn!("Rejected schema payload ({} bytes): {}", bytes.len(), e);
        e
    })?;
    debug!("Decoded schema {} with {} fields", schema.name(), schema.len());
    Ok(schema)
}

/// Decode a schema from a JSON string
pub fn decode_str(json: &str) -> Result<Schema> {
    decode(json.as_bytes())
}

fn parse(bytes: &[u8]) -> Result<Schema> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| SchemaError::MalformedSchema(e.to_string()))?;

    if !value.is_object() {
        return Err(SchemaError::MalformedSchema(format!(
            "expected a JSON object with \"{}\" and \"{}\", got {}",
            JSON_NAME,
            JSON_SCHEMA,
            kind_of(&value)
        )));
    }

    let wire = WireSchema::deserialize(value)
        .map_err(|e| SchemaError::MalformedSchema(e.to_string()))?;

    let mut schema = Schema::new(wire.name, wire.schema.into_iter().map(SchemaField::from));
    schema.set_sink_add_info(wire.sink_add_info);
    Ok(schema)
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Encode a schema to its canonical (compact) JSON representation
pub fn encode(schema: &Schema) -> Result<Vec<u8>> {
    encode_with(schema, OutputFormat::Compact)
}

/// Encode a schema as indented JSON, for humans
pub fn encode_pretty(schema: &Schema) -> Result<Vec<u8>> {
    encode_with(schema, OutputFormat::Pretty)
}

/// Encode a schema using the given output format
pub fn encode_with(schema: &Schema, format: OutputFormat) -> Result<Vec<u8>> {
    let wire = WireSchemaRef::from(schema);
    let bytes = match format {
        OutputFormat::Compact => serde_json::to_vec(&wire),
        OutputFormat::Pretty => serde_json::to_vec_pretty(&wire),
    };
    bytes.map_err(|e| SchemaError::Serialization(e.to_string()))
}
