//! Schema types and structures

use std::collections::BTreeMap;
use std::fmt;

use crate::codec;
use crate::field::SchemaField;

/// A record schema: a named set of fields plus optional sink metadata
///
/// Fields are keyed by their id. Adding a field whose id is already present
/// replaces the previous one (last write wins); no error is ever raised for
/// a colliding id. Every sequence of fields handed out is ordered by
/// ascending id.
///
/// `Schema` has no interior mutability. Sharing one between threads that
/// mutate it requires external locking, e.g. `Mutex<Schema>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: BTreeMap<u16, SchemaField>,
    sink_add_info: Option<String>,
}

impl Schema {
    /// Create a schema from a name and an initial list of fields
    ///
    /// Fields are added in the order given, so a later field with the same
    /// id as an earlier one wins.
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = SchemaField>) -> Self {
        let mut schema = Self {
            name: name.into(),
            fields: BTreeMap::new(),
            sink_add_info: None,
        };
        for field in fields {
            schema.add_field(field);
        }
        schema
    }

    /// Insert a field, replacing any field already stored at the same id.
    /// Gaps between ids are allowed.
    pub fn add_field(&mut self, field: SchemaField) {
        self.fields.insert(field.id(), field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields, sorted by ascending id
    pub fn fields(&self) -> Vec<&SchemaField> {
        self.fields.values().collect()
    }

    /// Field ids in ascending order
    pub fn positions(&self) -> Vec<u16> {
        self.fields.keys().copied().collect()
    }

    /// Look up the field stored at `id` (1-based)
    pub fn field_by_position(&self, id: u16) -> Option<&SchemaField> {
        self.fields.get(&id)
    }

    /// Look up a field by name
    ///
    /// Names are not unique within a schema. When several fields share the
    /// name, the one with the lowest id is returned.
    pub fn field_by_name(&self, name: &str) -> Option<&SchemaField> {
        self.fields.values().find(|field| field.name() == name)
    }

    pub fn contains_position(&self, id: u16) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Extra, sink-specific information. `None` and `Some("")` are distinct
    /// here even though the wire format does not keep them apart.
    pub fn sink_add_info(&self) -> Option<&str> {
        self.sink_add_info.as_deref()
    }

    pub fn set_sink_add_info(&mut self, sink_add_info: Option<String>) {
        self.sink_add_info = sink_add_info;
    }
}

/// Renders the canonical JSON. If encoding fails, a readable summary is
/// written instead; that text is for logs only and does not decode.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match codec::encode(self) {
            Ok(bytes) => f.write_str(&String::from_utf8_lossy(&bytes)),
            Err(_) => {
                write!(f, "Schema{{name='{}', fields=[", self.name)?;
                for (i, field) in self.fields.values().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}:{}:{}", field.id(), field.name(), field.type_tag())?;
                }
                f.write_str("]}")
            }
        }
    }
}
