//! G3D attribute descriptors and typed attribute buffers.

use std::fmt;

use crate::bfast::NamedBuffer;
use crate::util::{pod_bytes, read_pod_array, DataType, Error, Result, VimPod};

/// First token of every attribute descriptor.
pub const G3D_PREFIX: &str = "g3d";

/// Vertex positions.
pub const POSITION: &str = "g3d:vertex:position:0:float32:3";
/// Corner to vertex indices.
pub const INDEX: &str = "g3d:corner:index:0:int32:1";
/// Corner count of each face.
pub const FACE_SIZE: &str = "g3d:face:facesize:0:int32:1";
/// Corner count shared by every face.
pub const ALL_FACE_SIZE: &str = "g3d:all:facesize:0:int32:1";
/// Group id of each face.
pub const FACE_GROUP: &str = "g3d:face:group:0:int32:1";

/// Mesh element an attribute is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Association {
    All,
    None,
    Vertex,
    Face,
    Corner,
    Edge,
    SubGeometry,
    Instance,
}

impl Association {
    pub const ALL: [Association; 8] = [
        Self::All,
        Self::None,
        Self::Vertex,
        Self::Face,
        Self::Corner,
        Self::Edge,
        Self::SubGeometry,
        Self::Instance,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::None => "none",
            Self::Vertex => "vertex",
            Self::Face => "face",
            Self::Corner => "corner",
            Self::Edge => "edge",
            Self::SubGeometry => "subgeometry",
            Self::Instance => "instance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed form of `g3d:<association>:<semantic>:<index>:<data_type>:<arity>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    pub association: Association,
    pub semantic: String,
    pub index: u32,
    pub data_type: DataType,
    pub arity: usize,
}

impl AttributeDescriptor {
    pub fn new(
        association: Association,
        semantic: impl Into<String>,
        index: u32,
        data_type: DataType,
        arity: usize,
    ) -> Self {
        Self { association, semantic: semantic.into(), index, data_type, arity }
    }

    /// Parse a buffer name.
    pub fn parse(name: &str) -> Result<Self> {
        let bad = |what: &str| Error::format(format!("invalid G3D descriptor '{}': {}", name, what));

        let tokens: Vec<&str> = name.split(':').collect();
        if tokens.len() != 6 {
            return Err(bad("expected 6 ':'-separated tokens"));
        }
        if tokens[0] != G3D_PREFIX {
            return Err(bad("missing 'g3d' prefix"));
        }
        let association = Association::from_name(tokens[1]).ok_or_else(|| bad("unknown association"))?;
        if tokens[2].is_empty() {
            return Err(bad("empty semantic"));
        }
        let index = tokens[3].parse().map_err(|_| bad("index is not a number"))?;
        let data_type = DataType::from_name(tokens[4]).ok_or_else(|| bad("unknown data type"))?;
        let arity = match tokens[5].parse::<usize>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(bad("arity must be a positive number")),
        };
        if data_type.num_bytes().checked_mul(arity).is_none() {
            return Err(bad("arity is too large"));
        }
        Ok(Self::new(association, tokens[2], index, data_type, arity))
    }

    /// Bytes per attribute item. Never zero or overflowing for a parsed
    /// descriptor.
    #[inline]
    pub fn item_size(&self) -> usize {
        self.data_type.num_bytes() * self.arity
    }
}

impl fmt::Display for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            G3D_PREFIX, self.association, self.semantic, self.index, self.data_type, self.arity
        )
    }
}

impl std::str::FromStr for AttributeDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One typed attribute buffer.
///
/// The buffer name is kept as read next to the parsed descriptor so a
/// rewrite reproduces it exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    descriptor: AttributeDescriptor,
    bytes: Vec<u8>,
}

impl Attribute {
    /// Build an attribute, checking the byte length against the item size.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let descriptor = AttributeDescriptor::parse(&name)?;
        if bytes.len() % descriptor.item_size() != 0 {
            return Err(Error::format(format!(
                "attribute '{}' has {} bytes, not a multiple of {}",
                name,
                bytes.len(),
                descriptor.item_size()
            )));
        }
        Ok(Self { name, descriptor, bytes })
    }

    pub fn from_buffer(buffer: NamedBuffer) -> Result<Self> {
        Self::new(buffer.name, buffer.bytes)
    }

    /// Build an attribute from typed values; `T` must match the descriptor.
    pub fn from_values<T: VimPod>(descriptor: &str, values: &[T]) -> Result<Self> {
        let attr = Self::new(descriptor, pod_bytes(values).to_vec())?;
        attr.check_type::<T>()?;
        Ok(attr)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn descriptor(&self) -> &AttributeDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of items (each `arity` values wide).
    #[inline]
    pub fn count(&self) -> usize {
        self.bytes.len() / self.descriptor.item_size()
    }

    fn check_type<T: VimPod>(&self) -> Result<()> {
        if T::DATA_TYPE != self.descriptor.data_type {
            return Err(Error::format(format!(
                "attribute '{}' holds {}, not {}",
                self.name, self.descriptor.data_type, T::DATA_TYPE
            )));
        }
        Ok(())
    }

    /// Decode all values (`count() * arity` of them).
    pub fn to_vec<T: VimPod>(&self) -> Result<Vec<T>> {
        self.check_type::<T>()?;
        read_pod_array(&self.name, &self.bytes)
    }
}
