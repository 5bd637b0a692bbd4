//! VIM header text.
//!
//! The header is free-form UTF-8 made of `key=value` lines. It is written out
//! verbatim; the parsed entries are only used for logging.

use crate::util::{Error, Result};

/// Format version key.
pub const VERSION_KEY: &str = "vim";
/// Producing application key.
pub const GENERATOR_KEY: &str = "generator";
/// Creation timestamp key.
pub const CREATED_KEY: &str = "created";

/// Decoded header: the raw text plus its `key=value` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VimHeader {
    text: String,
    entries: Vec<(String, String)>,
}

impl VimHeader {
    /// Decode the header buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|source| Error::Utf8 {
            offset: source.valid_up_to(),
            source,
        })?;
        Ok(Self::parse(text))
    }

    /// Parse header text. Lines without `=` are ignored.
    pub fn parse(text: &str) -> Self {
        let mut header = Self { text: text.to_string(), entries: Vec::new() };
        for line in text.lines() {
            if let Some((key, value)) = line.split_once('=') {
                header.set(key.trim(), value.trim());
            }
        }
        header
    }

    fn set(&mut self, key: &str, value: &str) {
        // Update existing or add new
        for (k, v) in &mut self.entries {
            if k == key {
                *v = value.to_string();
                return;
            }
        }
        self.entries.push((key.to_string(), value.to_string()));
    }

    /// The header exactly as stored.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn version(&self) -> Option<&str> {
        self.get(VERSION_KEY)
    }

    pub fn generator(&self) -> Option<&str> {
        self.get(GENERATOR_KEY)
    }

    pub fn created(&self) -> Option<&str> {
        self.get(CREATED_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let header = VimHeader::from_bytes(b"vim=1.0.0\ngenerator = Revit Exporter\r\ncreated=2020-01-01\nnoise\n")
            .unwrap();
        assert_eq!(header.version(), Some("1.0.0"));
        assert_eq!(header.generator(), Some("Revit Exporter"));
        assert_eq!(header.created(), Some("2020-01-01"));
        assert_eq!(header.len(), 3);
        assert!(header.text().ends_with("noise\n"));
    }

    #[test]
    fn test_last_write_wins() {
        let header = VimHeader::parse("vim=1\nvim=2");
        assert_eq!(header.version(), Some("2"));
        assert_eq!(header.len(), 1);
    }

    #[test]
    fn test_value_with_equals() {
        let header = VimHeader::parse("schema=a=b");
        assert_eq!(header.get("schema"), Some("a=b"));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = VimHeader::from_bytes(b"vim=\xff").unwrap_err();
        assert!(matches!(err, Error::Utf8 { offset: 4, .. }));
    }

    #[test]
    fn test_empty() {
        let header = VimHeader::from_bytes(b"").unwrap();
        assert!(header.is_empty());
        assert_eq!(header.text(), "");
        assert_eq!(header.version(), None);
    }
}
