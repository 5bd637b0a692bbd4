//! BFast format constants and structures.

/// Magic number at the start of every BFast container.
pub const BFAST_MAGIC: u64 = 0xBFA5;

/// The magic as read by a reader of the other endianness.
pub const BFAST_SWAPPED_MAGIC: u64 = 0xA5BF_0000_0000_0000;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 32;

/// Offset of the data start position in the header.
pub const DATA_START_OFFSET: usize = 8;

/// Offset of the data end position in the header.
pub const DATA_END_OFFSET: usize = 16;

/// Offset of the array count in the header.
pub const NUM_ARRAYS_OFFSET: usize = 24;

/// Size of one `(begin, end)` entry in the range table.
pub const RANGE_SIZE: usize = 16;

/// Every buffer (and the data section) begins on this boundary.
pub const ALIGNMENT: u64 = 64;

/// Byte range of one array, relative to the container start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub begin: u64,
    pub end: u64,
}

impl Range {
    #[inline]
    pub const fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    /// Number of bytes in the range.
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.begin
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end == self.begin
    }
}

/// Decoded fixed header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: u64,
    pub data_start: u64,
    pub data_end: u64,
    pub num_arrays: u64,
}

impl Header {
    /// Position just past the range table.
    #[inline]
    pub fn range_table_end(&self) -> u64 {
        HEADER_SIZE as u64 + self.num_arrays.saturating_mul(RANGE_SIZE as u64)
    }
}

/// Round `n` up to the next multiple of [`ALIGNMENT`].
#[inline]
pub const fn align(n: u64) -> u64 {
    n.div_ceil(ALIGNMENT) * ALIGNMENT
}
