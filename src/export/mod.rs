//! VIM to text export.
//!
//! Sections are exported strictly in order:
//! Header -> Assets -> Strings -> Geometry -> Nodes -> Entities.
//!
//! ## Output layout
//!
//! ```text
//! <output>/
//!   Header.txt
//!   Assets/<name>.<ext>
//!   Strings.txt
//!   Geometry.g3d
//!   meshes/<n>.obj
//!   Nodes.json
//!   Entities/<table>.csv
//!   Entities/<table>.json   (tables with properties only)
//! ```
//!
//! A malformed entity table is skipped and listed in the [`ExportReport`];
//! every other error aborts the export, tagged with its section.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::bfast::BFastReader;
use crate::g3d::{save_obj, TriangleMesh};
use crate::util::fs::{asset_file_name, create_and_clear_dir, to_valid_file_name};
use crate::util::{Error, Result};
use crate::vim::{nodes_json, EntityTable, Section, StringTable, VimArchive};

/// Name of the per-group mesh directory.
pub const MESHES_DIR: &str = "meshes";

/// Export settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Memory-map the input instead of buffered reads.
    pub use_mmap: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { use_mmap: cfg!(feature = "mmap") }
    }
}

/// An entity table that could not be exported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedTable {
    pub name: String,
    pub error: String,
}

/// What an export run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub assets: usize,
    pub strings: usize,
    pub meshes: usize,
    pub nodes: usize,
    pub tables_written: usize,
    pub failed_tables: Vec<FailedTable>,
}

impl ExportReport {
    /// True when every entity table was exported.
    pub fn is_complete(&self) -> bool {
        self.failed_tables.is_empty()
    }
}

/// Export a VIM file with default options.
pub fn export(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ExportReport> {
    export_with(input, output, &ExportOptions::default())
}

/// Export a VIM file into `output`, which is cleared first.
pub fn export_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let input = input.as_ref();
    info!("Opening {} (mmap: {})", input.display(), options.use_mmap);
    let archive = VimArchive::open_opts(input, options.use_mmap)?;
    let streams = archive.reader().streams();
    debug!("{}: {} bytes, mapped: {}", input.display(), streams.size(), streams.is_mmap());
    export_archive(&archive, output.as_ref())
}

/// Export an already opened archive.
pub fn export_archive(archive: &VimArchive, output: &Path) -> Result<ExportReport> {
    create_and_clear_dir(output)?;
    let mut report = ExportReport::default();

    in_section(Section::Header, export_header(archive, output))?;
    report.assets = in_section(Section::Assets, export_assets(archive, output))?;
    let strings = in_section(Section::Strings, export_strings(archive, output))?;
    report.strings = strings.len();
    report.meshes = in_section(Section::Geometry, export_geometry(archive, output))?;
    report.nodes = in_section(Section::Nodes, export_nodes(archive, output))?;
    in_section(Section::Entities, export_entities(archive, &strings, output, &mut report))?;

    info!(
        "Exported {} assets, {} strings, {} meshes, {} nodes, {} entity tables",
        report.assets, report.strings, report.meshes, report.nodes, report.tables_written
    );
    if !report.is_complete() {
        warn!("{} entity tables failed", report.failed_tables.len());
    }
    Ok(report)
}

fn in_section<T>(section: Section, result: Result<T>) -> Result<T> {
    result.map_err(|e| Error::in_section(section.title(), e))
}

/// Write the header text verbatim.
pub fn export_header(archive: &VimArchive, output: &Path) -> Result<()> {
    let header = archive.header()?;
    info!(
        "Header: vim {}, generator {}, created {}",
        header.version().unwrap_or("?"),
        header.generator().unwrap_or("?"),
        header.created().unwrap_or("?")
    );
    fs::write(output.join("Header.txt"), header.text())?;
    Ok(())
}

/// Write each embedded asset under `Assets/`. Returns the asset count.
pub fn export_assets(archive: &VimArchive, output: &Path) -> Result<usize> {
    let dir = output.join(Section::Assets.title());
    create_and_clear_dir(&dir)?;

    let assets = archive.assets()?;
    let mut written = HashSet::new();
    for asset in &assets {
        let file_name = asset_file_name(asset.name());
        if !written.insert(file_name.clone()) {
            warn!("Asset '{}' overwrites {}", asset.name(), file_name);
        }
        debug!("Asset '{}' -> {} ({} bytes)", asset.name(), file_name, asset.len());
        fs::write(dir.join(&file_name), asset.bytes())?;
    }
    info!("Assets: {}", assets.len());
    Ok(assets.len())
}

/// Write one string per line and return the table for entity rendering.
pub fn export_strings(archive: &VimArchive, output: &Path) -> Result<StringTable> {
    let strings = archive.strings()?;
    let mut text = String::new();
    for s in strings.iter() {
        text.push_str(s);
        text.push('\n');
    }
    fs::write(output.join("Strings.txt"), text)?;
    info!("Strings: {}", strings.len());
    Ok(strings)
}

/// Write `Geometry.g3d` and one OBJ per face group. Returns the mesh count.
pub fn export_geometry(archive: &VimArchive, output: &Path) -> Result<usize> {
    let g3d = archive.geometry()?;
    let size = g3d.write(output.join("Geometry.g3d"))?;
    debug!("Geometry.g3d: {} bytes", size);

    let dir = output.join(MESHES_DIR);
    create_and_clear_dir(&dir)?;
    let meshes = TriangleMesh::from_g3d(&g3d)?.split_by_group();
    for (n, mesh) in meshes.iter().enumerate() {
        let (min, max) = mesh.compute_bounds();
        debug!(
            "Mesh {}: {} vertices, {} triangles, bounds {} .. {}",
            n,
            mesh.num_vertices(),
            mesh.num_triangles(),
            min,
            max
        );
        save_obj(mesh, dir.join(format!("{}.obj", n)))?;
    }
    info!("Geometry: {} attributes, {} meshes", g3d.attributes().len(), meshes.len());
    Ok(meshes.len())
}

/// Write `Nodes.json`. Returns the node count.
pub fn export_nodes(archive: &VimArchive, output: &Path) -> Result<usize> {
    let nodes = archive.nodes()?;
    for (n, node) in nodes.iter().enumerate() {
        trace!(
            "Node {}: parent {}, geometry {}, at {}",
            n,
            node.parent,
            node.geometry,
            node.matrix().w_axis.truncate()
        );
    }
    fs::write(output.join("Nodes.json"), nodes_json(&nodes)?)?;
    let roots = nodes.iter().filter(|n| n.is_root()).count();
    info!("Nodes: {} ({} roots)", nodes.len(), roots);
    Ok(nodes.len())
}

/// Write every entity table; malformed tables are recorded and skipped.
///
/// Tables whose names sanitize to the same file keep only the last one;
/// `tables_written` counts files, not tables.
pub fn export_entities(
    archive: &VimArchive,
    strings: &StringTable,
    output: &Path,
    report: &mut ExportReport,
) -> Result<()> {
    let dir = output.join(Section::Entities.title());
    create_and_clear_dir(&dir)?;

    let entities = archive.entities()?;
    let mut written = HashSet::new();
    for name in entities.names() {
        match render_table(&entities, name, strings) {
            Ok(rendered) => {
                let base = to_valid_file_name(name);
                let json_path = dir.join(format!("{}.json", base));
                if written.insert(base.clone()) {
                    report.tables_written += 1;
                } else {
                    warn!("Entity table '{}' overwrites {}.csv", name, base);
                    if json_path.exists() {
                        fs::remove_file(&json_path)?;
                    }
                }
                fs::write(dir.join(format!("{}.csv", base)), rendered.csv)?;
                if let Some(json) = rendered.json {
                    fs::write(&json_path, json)?;
                }
            }
            Err(e) if e.is_format() => {
                warn!("Skipping entity table '{}': {}", name, e);
                report.failed_tables.push(FailedTable { name: name.to_string(), error: e.to_string() });
            }
            Err(e) => return Err(Error::in_section(name, e)),
        }
    }
    info!("Entities: {} tables", report.tables_written);
    Ok(())
}

struct RenderedTable {
    csv: String,
    json: Option<String>,
}

/// Decode and render one table fully in memory.
fn render_table(entities: &BFastReader, name: &str, strings: &StringTable) -> Result<RenderedTable> {
    let table = EntityTable::from_container(name, &entities.read_bfast(name)?)?;
    Ok(RenderedTable {
        csv: table.to_csv(strings)?,
        json: table.properties_json(strings)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfast::BFastBuilder;

    fn empty_container() -> Vec<u8> {
        BFastBuilder::new().to_bytes().unwrap()
    }

    fn minimal_archive(entities: Vec<u8>) -> VimArchive {
        let g3d = crate::g3d::G3d::from_triangles(&[], &[], None).unwrap();
        let mut b = BFastBuilder::new();
        b.add("header", b"vim=1.0".to_vec()).unwrap();
        b.add("assets", empty_container()).unwrap();
        b.add("strings", Vec::<u8>::new()).unwrap();
        b.add("geometry", g3d.to_bytes().unwrap()).unwrap();
        b.add("nodes", Vec::<u8>::new()).unwrap();
        b.add("entities", entities).unwrap();
        VimArchive::from_bytes(b.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_default_options() {
        assert_eq!(ExportOptions::default().use_mmap, cfg!(feature = "mmap"));
    }

    #[test]
    fn test_minimal_export() {
        let dir = tempfile::tempdir().unwrap();
        let report = export_archive(&minimal_archive(empty_container()), dir.path()).unwrap();
        assert_eq!(report, ExportReport::default());
        assert_eq!(fs::read_to_string(dir.path().join("Header.txt")).unwrap(), "vim=1.0");
        assert_eq!(fs::read_to_string(dir.path().join("Strings.txt")).unwrap(), "");
        assert_eq!(fs::read_to_string(dir.path().join("Nodes.json")).unwrap(), "[]");
        assert!(dir.path().join("Geometry.g3d").is_file());
        assert!(dir.path().join("meshes").is_dir());
        assert!(dir.path().join("Entities").is_dir());
    }

    #[test]
    fn test_output_cleared() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale.txt"), "old").unwrap();
        export_archive(&minimal_archive(empty_container()), dir.path()).unwrap();
        assert!(!dir.path().join("stale.txt").exists());
    }

    #[test]
    fn test_bad_table_is_skipped() {
        let mut entities = BFastBuilder::new();
        entities.add("Broken", b"not a container".to_vec()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let report = export_archive(&minimal_archive(entities.to_bytes().unwrap()), dir.path()).unwrap();
        assert_eq!(report.tables_written, 0);
        assert_eq!(report.failed_tables.len(), 1);
        assert_eq!(report.failed_tables[0].name, "Broken");
        assert!(!report.is_complete());
    }

    #[test]
    fn test_colliding_table_names() {
        use crate::util::pod_bytes;
        use crate::vim::Property;

        let mut first = BFastBuilder::new();
        first.add("numeric:Height", pod_bytes(&[1.5f64]).to_vec()).unwrap();
        first.add("properties", Property::new(0, -1, -1).to_bytes().to_vec()).unwrap();
        let mut second = BFastBuilder::new();
        second.add("numeric:Height", pod_bytes(&[2.5f64]).to_vec()).unwrap();
        let mut entities = BFastBuilder::new();
        entities.add("A:B", first.to_bytes().unwrap()).unwrap();
        entities.add("A?B", second.to_bytes().unwrap()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let report = export_archive(&minimal_archive(entities.to_bytes().unwrap()), dir.path()).unwrap();
        assert_eq!(report.tables_written, 1);
        assert!(report.is_complete());

        let tables = dir.path().join("Entities");
        assert_eq!(fs::read_dir(&tables).unwrap().count(), 1);
        let csv = fs::read_to_string(tables.join("A_B.csv")).unwrap();
        assert!(csv.contains("2.5"));
        assert!(!csv.contains("1.5"));
        assert!(!tables.join("A_B.json").exists());
    }

    #[test]
    fn test_missing_section_is_fatal() {
        let mut b = BFastBuilder::new();
        b.add("header", b"vim=1.0".to_vec()).unwrap();
        let archive = VimArchive::from_bytes(b.to_bytes().unwrap()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = export_archive(&archive, dir.path()).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Assets: "));
        assert!(dir.path().join("Header.txt").is_file());
    }
}
