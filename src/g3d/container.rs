//! G3D header and attribute set.

use std::path::Path;

use tracing::{debug, trace};

use super::attribute::*;
use crate::bfast::{BFastBuilder, BFastReader, NamedBuffer};
use crate::util::{Error, Result, Vec3};

/// Name of the buffer holding the [`G3dHeader`].
pub const META_BUFFER_NAME: &str = "meta";

/// First two bytes of every G3D header.
pub const G3D_MAGIC: [u8; 2] = [0x63, 0xD0];

/// Size of a serialized [`G3dHeader`].
pub const G3D_HEADER_SIZE: usize = 8;

/// Fixed 8-byte G3D header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G3dHeader {
    /// Two-character unit, e.g. `m\0` or `ft`.
    pub unit: [u8; 2],
    pub up_axis: u8,
    pub forward_vector: u8,
    pub handedness: u8,
    pub padding: u8,
}

impl Default for G3dHeader {
    fn default() -> Self {
        Self {
            unit: [b'm', 0],
            up_axis: 2,
            forward_vector: 0,
            handedness: 0,
            padding: 0,
        }
    }
}

impl G3dHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != G3D_HEADER_SIZE {
            return Err(Error::format(format!(
                "G3D header has {} bytes, expected {}",
                bytes.len(),
                G3D_HEADER_SIZE
            )));
        }
        if bytes[..2] != G3D_MAGIC {
            return Err(Error::format(format!(
                "bad G3D magic {:02x} {:02x}",
                bytes[0], bytes[1]
            )));
        }
        Ok(Self {
            unit: [bytes[2], bytes[3]],
            up_axis: bytes[4],
            forward_vector: bytes[5],
            handedness: bytes[6],
            padding: bytes[7],
        })
    }

    pub fn to_bytes(&self) -> [u8; G3D_HEADER_SIZE] {
        [
            G3D_MAGIC[0],
            G3D_MAGIC[1],
            self.unit[0],
            self.unit[1],
            self.up_axis,
            self.forward_vector,
            self.handedness,
            self.padding,
        ]
    }
}

/// A G3D geometry: header plus typed attributes in storage order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct G3d {
    pub header: G3dHeader,
    attributes: Vec<Attribute>,
}

impl G3d {
    pub fn new(header: G3dHeader) -> Self {
        Self { header, attributes: Vec::new() }
    }

    /// Build from container buffers. `meta` is optional; every other buffer
    /// must be an attribute.
    pub fn from_buffers(buffers: impl IntoIterator<Item = NamedBuffer>) -> Result<Self> {
        let mut g3d = Self::default();
        for buffer in buffers {
            if buffer.name == META_BUFFER_NAME {
                g3d.header = G3dHeader::from_bytes(&buffer.bytes)?;
            } else {
                trace!("g3d attribute '{}' ({} bytes)", buffer.name, buffer.len());
                g3d.push(Attribute::from_buffer(buffer)?)?;
            }
        }
        debug!("g3d: {} attributes", g3d.attributes.len());
        Ok(g3d)
    }

    pub fn from_bfast(reader: &BFastReader) -> Result<Self> {
        Self::from_buffers(reader.read_all_buffers()?)
    }

    pub fn from_bytes(bytes: impl Into<std::sync::Arc<[u8]>>) -> Result<Self> {
        Self::from_bfast(&BFastReader::from_bytes(bytes)?)
    }

    /// Read a `.g3d` file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bfast(&BFastReader::open(path)?)
    }

    /// Append an attribute. Two attributes with the same descriptor are an error.
    pub fn push(&mut self, attribute: Attribute) -> Result<&mut Self> {
        if self.attributes.iter().any(|a| a.descriptor() == attribute.descriptor()) {
            return Err(Error::format(format!(
                "duplicate G3D attribute '{}'",
                attribute.descriptor()
            )));
        }
        self.attributes.push(attribute);
        Ok(self)
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Find an attribute by descriptor text.
    pub fn find(&self, descriptor: &str) -> Option<&Attribute> {
        let wanted = AttributeDescriptor::parse(descriptor).ok()?;
        self.attributes.iter().find(|a| *a.descriptor() == wanted)
    }

    fn require(&self, descriptor: &str) -> Result<&Attribute> {
        self.find(descriptor)
            .ok_or_else(|| Error::format(format!("missing G3D attribute '{}'", descriptor)))
    }

    /// Vertex positions.
    pub fn positions(&self) -> Result<Vec<Vec3>> {
        let values = self.require(POSITION)?.to_vec::<f32>()?;
        Ok(values.chunks_exact(3).map(Vec3::from_slice).collect())
    }

    /// Corner to vertex indices.
    pub fn indices(&self) -> Result<Vec<i32>> {
        self.require(INDEX)?.to_vec()
    }

    /// Corner count of every face, when stored per face.
    pub fn face_sizes(&self) -> Result<Option<Vec<i32>>> {
        self.find(FACE_SIZE).map(Attribute::to_vec::<i32>).transpose()
    }

    /// Corner count shared by all faces: the stored value, else 3.
    pub fn uniform_face_size(&self) -> Result<i32> {
        match self.find(ALL_FACE_SIZE) {
            Some(attr) => Ok(attr.to_vec::<i32>()?.first().copied().unwrap_or(3)),
            None => Ok(3),
        }
    }

    /// Group id of every face.
    pub fn face_groups(&self) -> Result<Option<Vec<i32>>> {
        self.find(FACE_GROUP).map(Attribute::to_vec::<i32>).transpose()
    }

    /// Container holding `meta` followed by the attributes in order.
    pub fn to_bfast(&self) -> Result<BFastBuilder> {
        let mut builder = BFastBuilder::new();
        builder.add(META_BUFFER_NAME, self.header.to_bytes().to_vec())?;
        for attr in &self.attributes {
            builder.add(attr.name(), attr.bytes().to_vec())?;
        }
        Ok(builder)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bfast()?.to_bytes()
    }

    /// Write a `.g3d` file. Returns the number of bytes written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.to_bfast()?.write_file(path)
    }

    /// Triangle geometry with optional per-face groups.
    pub fn from_triangles(positions: &[Vec3], indices: &[i32], groups: Option<&[i32]>) -> Result<Self> {
        let flat: &[f32] = bytemuck::cast_slice(positions);
        let mut g3d = Self::default();
        g3d.push(Attribute::from_values(POSITION, flat)?)?;
        g3d.push(Attribute::from_values(INDEX, indices)?)?;
        if let Some(groups) = groups {
            g3d.push(Attribute::from_values(FACE_GROUP, groups)?)?;
        }
        Ok(g3d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> G3d {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        G3d::from_triangles(&positions, &[0, 1, 2, 0, 2, 3], Some(&[0, 1])).unwrap()
    }

    #[test]
    fn test_header_bytes() {
        let header = G3dHeader::default();
        assert_eq!(header.to_bytes(), [0x63, 0xD0, b'm', 0, 2, 0, 0, 0]);
        assert_eq!(G3dHeader::from_bytes(&header.to_bytes()).unwrap(), header);
        assert!(G3dHeader::from_bytes(&[0u8; 8]).unwrap_err().is_format());
        assert!(G3dHeader::from_bytes(&[0x63, 0xD0]).unwrap_err().is_format());
    }

    #[test]
    fn test_accessors() {
        let g3d = quad();
        assert_eq!(g3d.positions().unwrap()[2], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(g3d.indices().unwrap().len(), 6);
        assert_eq!(g3d.face_groups().unwrap(), Some(vec![0, 1]));
        assert_eq!(g3d.face_sizes().unwrap(), None);
        assert_eq!(g3d.uniform_face_size().unwrap(), 3);
    }

    #[test]
    fn test_missing_required() {
        let g3d = G3d::default();
        assert!(g3d.positions().unwrap_err().is_format());
        assert!(g3d.indices().unwrap_err().is_format());
    }

    #[test]
    fn test_duplicate_descriptor() {
        let mut g3d = quad();
        let dup = Attribute::from_values(INDEX, &[0i32]).unwrap();
        assert!(g3d.push(dup).unwrap_err().is_format());
    }

    #[test]
    fn test_rewrite_identical() {
        let mut g3d = quad();
        g3d.header.unit = *b"ft";
        g3d.push(Attribute::from_values("g3d:vertex:uv:0:float32:2", &[0.5f32; 8]).unwrap())
            .unwrap();

        let first = g3d.to_bytes().unwrap();
        let read = G3d::from_bytes(first.clone()).unwrap();
        assert_eq!(read, g3d);
        assert_eq!(read.to_bytes().unwrap(), first);
    }

    #[test]
    fn test_meta_first() {
        let reader = BFastReader::from_bytes(quad().to_bytes().unwrap()).unwrap();
        assert_eq!(reader.names().next(), Some(META_BUFFER_NAME));
    }

    #[test]
    fn test_meta_optional() {
        let buffers = vec![NamedBuffer::new(INDEX, crate::util::pod_bytes(&[0i32, 1, 2]).to_vec())];
        let g3d = G3d::from_buffers(buffers).unwrap();
        assert_eq!(g3d.header, G3dHeader::default());
        assert_eq!(g3d.attributes().len(), 1);
    }

    #[test]
    fn test_unknown_buffer_rejected() {
        let buffers = vec![NamedBuffer::new("positions", vec![0u8; 12])];
        assert!(G3d::from_buffers(buffers).unwrap_err().is_format());
    }

    #[test]
    fn test_overflowing_arity_rejected() {
        let name = format!("g3d:vertex:position:0:float64:{}", 1usize << 61);
        let buffers = vec![NamedBuffer::new(name.as_str(), vec![0u8; 8])];
        assert!(G3d::from_buffers(buffers).unwrap_err().is_format());
    }
}
