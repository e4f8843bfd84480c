//! Field descriptions

/// SQL mapping hint attached to a field
///
/// Advisory only: it tells a loader how the field's values should be stored
/// relationally. Every numeric attribute is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SqlHint {
    type_name: String,
    length: Option<i32>,
    scale: Option<i32>,
    precision: Option<i32>,
}

impl SqlHint {
    /// Create a hint with only a type name
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            length: None,
            scale: None,
            precision: None,
        }
    }

    /// Set the length (e.g. for `varchar(255)`)
    pub fn with_length(mut self, length: i32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the scale (digits after the decimal point)
    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the precision (total number of digits)
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn length(&self) -> Option<i32> {
        self.length
    }

    pub fn scale(&self) -> Option<i32> {
        self.scale
    }

    pub fn precision(&self) -> Option<i32> {
        self.precision
    }
}

/// A single field of a record schema
///
/// Fields are immutable once built. Neither the type tag nor the SQL hint is
/// validated; any string is carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaField {
    id: u16,
    name: String,
    type_tag: String,
    description: String,
    sql: SqlHint,
}

impl SchemaField {
    /// Create a new field
    pub fn new(
        id: u16,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        description: impl Into<String>,
        sql: SqlHint,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_tag: type_tag.into(),
            description: description.into(),
            sql,
        }
    }

    /// Position of the field in the serialized record (1-based)
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type tag (e.g. `string`, `i64`, `double`)
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sql(&self) -> &SqlHint {
        &self.sql
    }
}
