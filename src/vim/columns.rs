//! Entity table buffer classification.
//!
//! Entity table buffers carry no type tag; their role is encoded in the
//! buffer name. All name conventions live in [`COLUMN_PREFIXES`] and
//! [`PROPERTIES_BUFFER_NAME`].

use byteorder::{ByteOrder, LittleEndian};

use crate::bfast::NamedBuffer;
use crate::util::{read_pod_array, Error, Result};

/// Prefix of integer columns referencing rows of other tables.
pub const INDEX_COLUMN_PREFIX: &str = "index:";

/// Prefix of 64-bit float columns.
pub const NUMERIC_COLUMN_PREFIX: &str = "numeric:";

/// Prefix of columns holding string table indices.
pub const STRING_COLUMN_PREFIX: &str = "string:";

/// Exact name of the property list buffer.
pub const PROPERTIES_BUFFER_NAME: &str = "properties";

/// Prefix convention table.
pub const COLUMN_PREFIXES: [(&str, ColumnKind); 3] = [
    (INDEX_COLUMN_PREFIX, ColumnKind::Index),
    (NUMERIC_COLUMN_PREFIX, ColumnKind::Numeric),
    (STRING_COLUMN_PREFIX, ColumnKind::String),
];

/// Role of a buffer inside an entity table container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Index,
    Numeric,
    String,
    Properties,
    Unrecognized,
}

impl ColumnKind {
    /// Name prefix for column kinds, `None` for the others.
    pub fn prefix(self) -> Option<&'static str> {
        COLUMN_PREFIXES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(prefix, _)| *prefix)
    }
}

/// Classify an entity table buffer by name.
pub fn classify(name: &str) -> ColumnKind {
    if name == PROPERTIES_BUFFER_NAME {
        return ColumnKind::Properties;
    }
    COLUMN_PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map_or(ColumnKind::Unrecognized, |(_, kind)| *kind)
}

/// Column display name: the buffer name with its kind prefix removed.
pub fn display_name(name: &str) -> &str {
    match classify(name).prefix() {
        Some(prefix) => &name[prefix.len()..],
        None => name,
    }
}

/// A named column of typed values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypedColumn<T> {
    pub name: String,
    pub data: Vec<T>,
}

impl<T> TypedColumn<T> {
    pub fn new(name: impl Into<String>, data: Vec<T>) -> Self {
        Self { name: name.into(), data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Row references into another table.
pub type IndexColumn = TypedColumn<i32>;
/// Numeric values.
pub type NumericColumn = TypedColumn<f64>;
/// String table references.
pub type StringColumn = TypedColumn<i32>;

/// Size of one serialized [`Property`] record.
pub const PROPERTY_SIZE: usize = 12;

/// Free-form `name = value` attribute of one entity.
///
/// `name` and `value` are string table indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Property {
    pub entity_index: i32,
    pub name: i32,
    pub value: i32,
}

impl Property {
    pub const fn new(entity_index: i32, name: i32, value: i32) -> Self {
        Self { entity_index, name, value }
    }

    /// Serialized little-endian form.
    pub fn to_bytes(&self) -> [u8; PROPERTY_SIZE] {
        let mut out = [0u8; PROPERTY_SIZE];
        LittleEndian::write_i32_into(&[self.entity_index, self.name, self.value], &mut out);
        out
    }
}

/// Decode a properties buffer as consecutive 12-byte records.
pub fn decode_properties(bytes: &[u8]) -> Result<Vec<Property>> {
    if bytes.len() % PROPERTY_SIZE != 0 {
        return Err(Error::format(format!(
            "'{}' has {} bytes, not a multiple of {}",
            PROPERTIES_BUFFER_NAME,
            bytes.len(),
            PROPERTY_SIZE
        )));
    }
    let values: Vec<i32> = read_pod_array(PROPERTIES_BUFFER_NAME, bytes)?;
    Ok(values
        .chunks_exact(3)
        .map(|v| Property::new(v[0], v[1], v[2]))
        .collect())
}

/// An entity table buffer decoded according to its name.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedBuffer {
    Index(IndexColumn),
    Numeric(NumericColumn),
    String(StringColumn),
    Properties(Vec<Property>),
}

/// Classify and decode one entity table buffer.
///
/// Unrecognized names are an error: skipping them would silently drop
/// columns.
pub fn decode_buffer(buffer: &NamedBuffer) -> Result<DecodedBuffer> {
    let name = buffer.name();
    let display = display_name(name);
    match classify(name) {
        ColumnKind::Index => Ok(DecodedBuffer::Index(TypedColumn::new(
            display,
            read_pod_array(name, buffer.bytes())?,
        ))),
        ColumnKind::Numeric => Ok(DecodedBuffer::Numeric(TypedColumn::new(
            display,
            read_pod_array(name, buffer.bytes())?,
        ))),
        ColumnKind::String => Ok(DecodedBuffer::String(TypedColumn::new(
            display,
            read_pod_array(name, buffer.bytes())?,
        ))),
        ColumnKind::Properties => Ok(DecodedBuffer::Properties(decode_properties(buffer.bytes())?)),
        ColumnKind::Unrecognized => Err(Error::UnrecognizedBuffer(name.to_string())),
    }
}
