//! Scene node records.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::util::{Error, Mat4, Result};

/// Size of one serialized [`SceneNode`].
pub const SCENE_NODE_SIZE: usize = 76;

/// Placement of one geometry instance in the scene.
///
/// `transform` is a row-major 4x4 matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceneNode {
    pub parent: i32,
    pub geometry: i32,
    pub instance: i32,
    pub transform: [f32; 16],
}

impl SceneNode {
    /// Decode one record from exactly [`SCENE_NODE_SIZE`] bytes.
    fn read(bytes: &[u8]) -> Self {
        let mut transform = [0f32; 16];
        LittleEndian::read_f32_into(&bytes[12..SCENE_NODE_SIZE], &mut transform);
        Self {
            parent: LittleEndian::read_i32(&bytes[0..4]),
            geometry: LittleEndian::read_i32(&bytes[4..8]),
            instance: LittleEndian::read_i32(&bytes[8..12]),
            transform,
        }
    }

    /// Serialized little-endian form.
    pub fn to_bytes(&self) -> [u8; SCENE_NODE_SIZE] {
        let mut out = [0u8; SCENE_NODE_SIZE];
        LittleEndian::write_i32_into(&[self.parent, self.geometry, self.instance], &mut out[..12]);
        LittleEndian::write_f32_into(&self.transform, &mut out[12..]);
        out
    }

    /// Decode every record of the Nodes buffer.
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Self>> {
        if bytes.len() % SCENE_NODE_SIZE != 0 {
            return Err(Error::format(format!(
                "nodes buffer has {} bytes, not a multiple of {}",
                bytes.len(),
                SCENE_NODE_SIZE
            )));
        }
        Ok(bytes.chunks_exact(SCENE_NODE_SIZE).map(Self::read).collect())
    }

    /// Transform as a glam matrix (glam is column-major).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.transform).transpose()
    }

    /// True when the node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }
}

/// Pretty-printed JSON array of nodes.
pub fn nodes_json(nodes: &[SceneNode]) -> Result<String> {
    Ok(serde_json::to_string_pretty(nodes)?)
}
