//! VIM document model.
//!
//! A VIM file is a BFast container with six well-known sections:
//!
//! ```text
//! header    key=value text
//! assets    container of embedded files
//! strings   \0-terminated string table
//! geometry  G3D attribute container
//! nodes     76-byte scene node records
//! entities  container of entity table containers
//! ```

mod archive;
mod columns;
mod entity_table;
mod header;
mod nodes;
mod strings;

pub use archive::*;
pub use columns::*;
pub use entity_table::*;
pub use header::*;
pub use nodes::*;
pub use strings::*;
