//! Wavefront OBJ output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::mesh::Mesh;
use crate::util::Result;

/// Write `v x y z` lines followed by 1-based `f a b c` lines.
pub fn write_obj<W: Write>(mesh: &Mesh, mut writer: W) -> Result<()> {
    for p in &mesh.positions {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a mesh to an `.obj` file.
pub fn save_obj(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    write_obj(mesh, BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vec3;

    #[test]
    fn test_write_obj() {
        let mesh = Mesh::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, -2.0, 0.25)],
            vec![0, 1, 2, 2, 1, 0],
        );
        let mut out = Vec::new();
        write_obj(&mesh, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "v 0 0 0\nv 1.5 0 0\nv 0 -2 0.25\nf 1 2 3\nf 3 2 1\n"
        );
    }

    #[test]
    fn test_save_obj() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.obj");
        save_obj(&Mesh::default(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
