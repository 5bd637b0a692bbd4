//! Triangle meshes reconstructed from G3D attributes.

use std::collections::HashMap;

use tracing::debug;

use super::container::G3d;
use crate::util::{compute_bounds, Error, Result, Vec3};

/// Indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Three vertex indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Get number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Add the reversed copy of every triangle right after it:
    /// (a, b, c) becomes (a, b, c), (c, b, a).
    pub fn double_sided(&self) -> Self {
        let mut indices = Vec::with_capacity(self.indices.len() * 2);
        for [a, b, c] in self.triangles() {
            indices.extend_from_slice(&[a, b, c, c, b, a]);
        }
        Self::new(self.positions.clone(), indices)
    }

    /// Compute bounding box (min, max).
    pub fn compute_bounds(&self) -> (Vec3, Vec3) {
        compute_bounds(&self.positions)
    }
}

/// Triangulated G3D geometry; every triangle keeps the group of its face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub groups: Vec<i32>,
}

impl TriangleMesh {
    /// Reconstruct faces from positions, corner indices, face sizes and
    /// groups. Polygons are fan-triangulated.
    pub fn from_g3d(g3d: &G3d) -> Result<Self> {
        let positions = g3d.positions()?;
        let corners = g3d.indices()?;
        let face_sizes = match g3d.face_sizes()? {
            Some(sizes) => sizes,
            None => {
                let size = g3d.uniform_face_size()?;
                if size < 3 {
                    return Err(Error::format(format!("face size {} is below 3", size)));
                }
                if corners.len() % size as usize != 0 {
                    return Err(Error::format(format!(
                        "{} corners do not split into faces of {}",
                        corners.len(),
                        size
                    )));
                }
                vec![size; corners.len() / size as usize]
            }
        };

        let groups = g3d.face_groups()?;
        if let Some(groups) = &groups {
            if groups.len() != face_sizes.len() {
                return Err(Error::format(format!(
                    "{} face groups for {} faces",
                    groups.len(),
                    face_sizes.len()
                )));
            }
        }

        let num_vertices = positions.len();
        let vertex = |i: i32| -> Result<u32> {
            if i < 0 || i as usize >= num_vertices {
                return Err(Error::format(format!(
                    "vertex index {} out of range (mesh has {} vertices)",
                    i, num_vertices
                )));
            }
            Ok(i as u32)
        };

        let mut mesh = Self { positions, ..Self::default() };
        let mut corner = 0usize;
        for (face, &size) in face_sizes.iter().enumerate() {
            if size < 3 {
                return Err(Error::format(format!("face {} has {} corners", face, size)));
            }
            let end = corner + size as usize;
            let polygon = corners.get(corner..end).ok_or_else(|| {
                Error::format(format!(
                    "face sizes need more than the {} stored corners",
                    corners.len()
                ))
            })?;
            let group = groups.as_ref().map_or(0, |g| g[face]);
            for i in 1..polygon.len() - 1 {
                mesh.triangles
                    .push([vertex(polygon[0])?, vertex(polygon[i])?, vertex(polygon[i + 1])?]);
                mesh.groups.push(group);
            }
            corner = end;
        }
        if corner != corners.len() {
            return Err(Error::format(format!(
                "face sizes cover {} of {} corners",
                corner,
                corners.len()
            )));
        }
        debug!(
            "mesh: {} vertices, {} faces, {} triangles",
            mesh.positions.len(),
            face_sizes.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }

    /// One double-sided sub-mesh per group, ordered by first appearance.
    ///
    /// Each sub-mesh holds only the vertices its triangles use, numbered in
    /// first-use order.
    pub fn split_by_group(&self) -> Vec<Mesh> {
        let mut slots: HashMap<i32, usize> = HashMap::new();
        let mut members: Vec<Vec<[u32; 3]>> = Vec::new();
        for (tri, &group) in self.triangles.iter().zip(&self.groups) {
            let slot = *slots.entry(group).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[slot].push(*tri);
        }

        members
            .iter()
            .map(|tris| {
                let mut remap: HashMap<u32, u32> = HashMap::new();
                let mut positions = Vec::new();
                let mut indices = Vec::with_capacity(tris.len() * 3);
                for &v in tris.iter().flatten() {
                    let local = *remap.entry(v).or_insert_with(|| {
                        positions.push(self.positions[v as usize]);
                        positions.len() as u32 - 1
                    });
                    indices.push(local);
                }
                Mesh::new(positions, indices).double_sided()
            })
            .collect()
    }
}
