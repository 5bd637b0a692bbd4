//! Entity tables: typed columns plus free-form properties.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;

use super::columns::*;
use super::strings::StringTable;
use crate::bfast::{BFastReader, NamedBuffer};
use crate::util::{Error, Result};

/// Per-entity property map: entity index -> (property name -> value).
pub type PropertyMap = BTreeMap<i32, BTreeMap<String, String>>;

/// A column-oriented table of per-entity attributes.
///
/// Every column holds exactly [`EntityTable::num_rows`] values; string cells
/// stay string table indices until the table is rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityTable {
    pub name: String,
    pub index_columns: Vec<IndexColumn>,
    pub numeric_columns: Vec<NumericColumn>,
    pub string_columns: Vec<StringColumn>,
    pub properties: Vec<Property>,
    num_rows: usize,
}

impl EntityTable {
    /// Build a table from its buffers, classifying each by name.
    pub fn from_buffers(
        name: impl Into<String>,
        buffers: impl IntoIterator<Item = NamedBuffer>,
    ) -> Result<Self> {
        let mut table = Self { name: name.into(), ..Self::default() };
        for buffer in buffers {
            match decode_buffer(&buffer)? {
                DecodedBuffer::Index(col) => table.index_columns.push(col),
                DecodedBuffer::Numeric(col) => table.numeric_columns.push(col),
                DecodedBuffer::String(col) => table.string_columns.push(col),
                DecodedBuffer::Properties(props) => table.properties.extend(props),
            }
        }
        table.num_rows = table.validate_rows()?;
        debug!(
            "entity table '{}': {} rows, {} numeric, {} string, {} index columns, {} properties",
            table.name,
            table.num_rows,
            table.numeric_columns.len(),
            table.string_columns.len(),
            table.index_columns.len(),
            table.properties.len()
        );
        Ok(table)
    }

    /// Build a table from a nested container.
    pub fn from_container(name: impl Into<String>, reader: &BFastReader) -> Result<Self> {
        Self::from_buffers(name, reader.read_all_buffers()?)
    }

    /// Build a table from an entities-section buffer holding a nested container.
    pub fn from_buffer(buffer: &NamedBuffer) -> Result<Self> {
        Self::from_container(buffer.name(), &buffer.unpack()?)
    }

    /// Check that every column has the same length and return it.
    fn validate_rows(&self) -> Result<usize> {
        let mut expected: Option<usize> = None;
        let lengths = self
            .numeric_columns
            .iter()
            .map(|c| (&c.name, c.len()))
            .chain(self.string_columns.iter().map(|c| (&c.name, c.len())))
            .chain(self.index_columns.iter().map(|c| (&c.name, c.len())));
        for (column, len) in lengths {
            match expected {
                None => expected = Some(len),
                Some(rows) if rows != len => {
                    return Err(Error::RowCountMismatch {
                        column: column.clone(),
                        expected: rows,
                        actual: len,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(0))
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.numeric_columns.len() + self.string_columns.len() + self.index_columns.len()
    }

    /// Column names in output order: numeric, string, then index columns.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.numeric_columns
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.string_columns.iter().map(|c| c.name.as_str()))
            .chain(self.index_columns.iter().map(|c| c.name.as_str()))
    }

    /// Text values of row `n`, in the same order as [`Self::column_names`].
    pub fn row_values(&self, n: usize, strings: &StringTable) -> Result<Vec<String>> {
        let mut values = Vec::with_capacity(self.num_columns());
        for col in &self.numeric_columns {
            values.push(col.data[n].to_string());
        }
        for col in &self.string_columns {
            values.push(strings.resolve(col.data[n])?.to_string());
        }
        for col in &self.index_columns {
            values.push(col.data[n].to_string());
        }
        Ok(values)
    }

    /// Render the header row and all data rows as CSV.
    pub fn to_csv(&self, strings: &StringTable) -> Result<String> {
        let mut out = String::new();
        push_csv_row(&mut out, self.column_names());
        for n in 0..self.num_rows {
            let row = self.row_values(n, strings)?;
            push_csv_row(&mut out, row.iter().map(String::as_str));
        }
        Ok(out)
    }

    /// Group properties by entity, resolving names and values.
    ///
    /// A repeated name within one entity keeps the last value.
    pub fn property_map(&self, strings: &StringTable) -> Result<PropertyMap> {
        let mut map = PropertyMap::new();
        for p in &self.properties {
            let key = strings.resolve(p.name)?.to_string();
            let value = strings.resolve(p.value)?.to_string();
            map.entry(p.entity_index).or_default().insert(key, value);
        }
        Ok(map)
    }

    /// Pretty-printed JSON of [`Self::property_map`], or `None` without properties.
    pub fn properties_json(&self, strings: &StringTable) -> Result<Option<String>> {
        if self.properties.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string_pretty(&self.property_map(strings)?)?))
    }
}

/// Quote a CSV field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn push_csv_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(field));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::pod_bytes;

    fn strings() -> StringTable {
        StringTable::new(vec!["Wall".into(), "Level 1".into()])
    }

    fn props_bytes(props: &[Property]) -> Vec<u8> {
        props.iter().flat_map(|p| p.to_bytes()).collect()
    }

    fn wall_table() -> EntityTable {
        EntityTable::from_buffers(
            "Rvt.Element",
            vec![
                NamedBuffer::new("string:Name", pod_bytes(&[0i32]).to_vec()),
                NamedBuffer::new("numeric:Height", pod_bytes(&[3.5f64]).to_vec()),
                NamedBuffer::new("properties", props_bytes(&[Property::new(0, 1, 0)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_order() {
        let table = EntityTable::from_buffers(
            "t",
            vec![
                NamedBuffer::new("index:Level", pod_bytes(&[7i32]).to_vec()),
                NamedBuffer::new("string:Name", pod_bytes(&[1i32]).to_vec()),
                NamedBuffer::new("numeric:Area", pod_bytes(&[1.0f64]).to_vec()),
            ],
        )
        .unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["Area", "Name", "Level"]);
        assert_eq!(table.row_values(0, &strings()).unwrap(), ["1", "Level 1", "7"]);
    }

    #[test]
    fn test_csv_and_json() {
        let table = wall_table();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.to_csv(&strings()).unwrap(), "Height,Name\n3.5,Wall\n");

        let json = table.properties_json(&strings()).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({ "0": { "Level 1": "Wall" } }));
    }

    #[test]
    fn test_row_count_mismatch() {
        let err = EntityTable::from_buffers(
            "t",
            vec![
                NamedBuffer::new("numeric:A", pod_bytes(&[1.0f64, 2.0]).to_vec()),
                NamedBuffer::new("index:B", pod_bytes(&[1i32]).to_vec()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::RowCountMismatch { expected: 2, actual: 1, .. }));
        assert!(err.is_format());
    }

    #[test]
    fn test_negative_string_index() {
        let table = EntityTable::from_buffers(
            "t",
            vec![
                NamedBuffer::new("string:Name", pod_bytes(&[-1i32]).to_vec()),
                NamedBuffer::new("properties", props_bytes(&[Property::new(3, -1, -1)])),
            ],
        )
        .unwrap();
        assert_eq!(table.to_csv(&strings()).unwrap(), "Name\n\n");
        let map = table.property_map(&strings()).unwrap();
        assert_eq!(map[&3][""], "");
    }

    #[test]
    fn test_property_last_write_wins() {
        let props = [Property::new(0, 1, 0), Property::new(0, 1, 1)];
        let table = EntityTable::from_buffers("t", vec![NamedBuffer::new("properties", props_bytes(&props))])
            .unwrap();
        let map = table.property_map(&strings()).unwrap();
        assert_eq!(map[&0]["Level 1"], "Level 1");
    }

    #[test]
    fn test_property_grouping_order_independent() {
        let a = [
            Property::new(0, 0, 0),
            Property::new(1, 0, 1),
            Property::new(0, 1, 1),
            Property::new(2, 1, 0),
        ];
        // Same per-entity order, entities interleaved differently.
        let b = [a[3], a[1], a[0], a[2]];
        let ta = EntityTable::from_buffers("t", vec![NamedBuffer::new("properties", props_bytes(&a))]).unwrap();
        let tb = EntityTable::from_buffers("t", vec![NamedBuffer::new("properties", props_bytes(&b))]).unwrap();
        assert_eq!(
            ta.properties_json(&strings()).unwrap(),
            tb.properties_json(&strings()).unwrap()
        );
    }

    #[test]
    fn test_no_properties_no_json() {
        let table =
            EntityTable::from_buffers("t", vec![NamedBuffer::new("index:A", pod_bytes(&[1i32]).to_vec())]).unwrap();
        assert!(table.properties_json(&strings()).unwrap().is_none());
    }

    #[test]
    fn test_empty_table() {
        let table = EntityTable::from_buffers("t", Vec::new()).unwrap();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.to_csv(&strings()).unwrap(), "\n");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_string_index_out_of_range() {
        let table =
            EntityTable::from_buffers("t", vec![NamedBuffer::new("string:N", pod_bytes(&[9i32]).to_vec())]).unwrap();
        assert!(table.to_csv(&strings()).unwrap_err().is_format());
    }
}
