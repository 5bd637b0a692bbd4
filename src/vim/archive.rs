//! Top-level VIM container and its well-known sections.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use super::entity_table::EntityTable;
use super::header::VimHeader;
use super::nodes::SceneNode;
use super::strings::StringTable;
use crate::bfast::{BFastReader, NamedBuffer};
use crate::g3d::G3d;
use crate::util::{Error, Result};

/// Top-level sections of a VIM file, in export order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    Assets,
    Strings,
    Geometry,
    Nodes,
    Entities,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Self::Header,
        Self::Assets,
        Self::Strings,
        Self::Geometry,
        Self::Nodes,
        Self::Entities,
    ];

    /// Buffer name inside the VIM container.
    pub const fn buffer_name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Assets => "assets",
            Self::Strings => "strings",
            Self::Geometry => "geometry",
            Self::Nodes => "nodes",
            Self::Entities => "entities",
        }
    }

    /// Capitalized name, also used for output files.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Assets => "Assets",
            Self::Strings => "Strings",
            Self::Geometry => "Geometry",
            Self::Nodes => "Nodes",
            Self::Entities => "Entities",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// An opened VIM file.
///
/// Sections are looked up by their lowercase buffer name, falling back to the
/// capitalized form written by some producers.
#[derive(Clone)]
pub struct VimArchive {
    reader: BFastReader,
}

impl VimArchive {
    /// Open a VIM file with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a VIM file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        Ok(Self::from_reader(BFastReader::open_opts(path, use_mmap)?))
    }

    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self> {
        Ok(Self::from_reader(BFastReader::from_bytes(data)?))
    }

    pub fn from_reader(reader: BFastReader) -> Self {
        Self { reader }
    }

    #[inline]
    pub fn reader(&self) -> &BFastReader {
        &self.reader
    }

    /// Container buffer name actually used for a section.
    pub fn section_name(&self, section: Section) -> Result<&'static str> {
        [section.buffer_name(), section.title()]
            .into_iter()
            .find(|name| self.reader.contains(name))
            .ok_or_else(|| Error::NotFound(section.buffer_name().to_string()))
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.section_name(section).is_ok()
    }

    /// Raw bytes of a flat section.
    pub fn read_section(&self, section: Section) -> Result<NamedBuffer> {
        let name = self.section_name(section)?;
        trace!("section {} -> buffer '{}' {:?}", section, name, self.reader.range(name)?);
        self.reader.read_buffer(name)
    }

    /// A nested section as a container.
    pub fn open_section(&self, section: Section) -> Result<BFastReader> {
        let name = self.section_name(section)?;
        trace!("section {} -> container '{}' {:?}", section, name, self.reader.range(name)?);
        self.reader.read_bfast(name)
    }

    pub fn header(&self) -> Result<VimHeader> {
        VimHeader::from_bytes(self.read_section(Section::Header)?.bytes())
    }

    /// Embedded asset files, named `<name>.<ext>`.
    pub fn assets(&self) -> Result<Vec<NamedBuffer>> {
        self.open_section(Section::Assets)?.read_all_buffers()
    }

    pub fn strings(&self) -> Result<StringTable> {
        StringTable::from_bytes(self.read_section(Section::Strings)?.bytes())
    }

    pub fn geometry(&self) -> Result<G3d> {
        G3d::from_bfast(&self.open_section(Section::Geometry)?)
    }

    pub fn nodes(&self) -> Result<Vec<SceneNode>> {
        SceneNode::decode_all(self.read_section(Section::Nodes)?.bytes())
    }

    /// The container of entity tables; each buffer is itself a container.
    pub fn entities(&self) -> Result<BFastReader> {
        self.open_section(Section::Entities)
    }

    /// Decode one entity table by name.
    pub fn entity_table(&self, name: &str) -> Result<EntityTable> {
        EntityTable::from_container(name, &self.entities()?.read_bfast(name)?)
    }
}
