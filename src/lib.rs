//! # vim-text
//!
//! Reader for VIM (.vim) BIM containers and exporter to inspectable text,
//! CSV, JSON, G3D and OBJ files.
//!
//! ## Modules
//!
//! - [`util`] - Errors, typed buffer decoding, file name helpers
//! - [`bfast`] - Low-level BFast container reader and writer
//! - [`vim`] - VIM sections: header, string table, entity tables, scene nodes
//! - [`g3d`] - G3D geometry, triangle meshes, OBJ output
//! - [`export`] - Section-by-section export to an output directory
//!
//! ## Example
//!
//! ```ignore
//! use vim_text::export::export;
//!
//! let report = export("model.vim", "out")?;
//! for failed in &report.failed_tables {
//!     eprintln!("{}: {}", failed.name, failed.error);
//! }
//! ```

pub mod util;
pub mod bfast;
pub mod vim;
pub mod g3d;
pub mod export;

// Re-export commonly used types
pub use util::{DataType, Error, Result};
pub use bfast::{BFastBuilder, BFastReader, NamedBuffer};
pub use export::{export, export_with, ExportOptions, ExportReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{DataType, Error, Result, Vec3, Mat4};
    pub use crate::bfast::{BFastBuilder, BFastReader, NamedBuffer};
    pub use crate::vim::{EntityTable, SceneNode, Section, StringTable, VimArchive, VimHeader};
    pub use crate::g3d::{G3d, Mesh, TriangleMesh};
    pub use crate::export::{export, export_with, ExportOptions, ExportReport};
}
