//! Low-level BFast binary container implementation.
//!
//! BFast is the container used by VIM files and by G3D geometry: a flat list
//! of named byte arrays, any of which may itself hold another BFast.
//!
//! ## File Structure
//!
//! ```text
//! +----------------------+
//! | Magic: 0xBFA5        |  8 bytes (u64 LE)
//! +----------------------+
//! | Data start           |  8 bytes (u64 LE)
//! +----------------------+
//! | Data end             |  8 bytes (u64 LE)
//! +----------------------+
//! | Array count N        |  8 bytes (u64 LE)
//! +----------------------+
//! | N x (begin, end)     |  16 bytes each
//! +----------------------+
//! | ... padding ...      |  up to data start (64-byte aligned)
//! +----------------------+
//! | Names (array 0)      |  \0-terminated UTF-8, one per array 1..N
//! +----------------------+
//! | Arrays 1..N          |  each aligned to 64 bytes
//! +----------------------+
//! ```

mod format;
mod reader;
mod writer;

pub use format::*;
pub use reader::*;
pub use writer::*;
