//! BFast container writer.
//!
//! Used for G3D output, which is itself a BFast container.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::*;
use crate::util::{Error, Result};

/// Output stream that tracks its write position.
pub struct OStream<W: Write> {
    writer: W,
    pos: u64,
}

impl<W: Write> OStream<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0 }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write a u64 value (little-endian).
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.writer.write_u64::<LittleEndian>(value)?;
        self.pos += 8;
        Ok(())
    }

    /// Write zero bytes up to `target`.
    pub fn pad_to(&mut self, target: u64) -> Result<()> {
        if target < self.pos {
            return Err(Error::format(format!(
                "cannot pad backwards from {} to {}",
                self.pos, target
            )));
        }
        const ZEROS: [u8; ALIGNMENT as usize] = [0; ALIGNMENT as usize];
        while self.pos < target {
            let n = ((target - self.pos) as usize).min(ZEROS.len());
            self.write_bytes(&ZEROS[..n])?;
        }
        Ok(())
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Collects named buffers and lays them out as a BFast container.
#[derive(Clone, Debug, Default)]
pub struct BFastBuilder {
    buffers: Vec<(String, Vec<u8>)>,
    names: HashSet<String>,
}

/// Computed positions of every array in a container about to be written.
struct Layout {
    header: Header,
    ranges: Vec<Range>,
}

impl BFastBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a buffer. Names must be unique and must not contain `\0`.
    pub fn add(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<&mut Self> {
        let name = name.into();
        if name.contains('\0') {
            return Err(Error::Argument(format!("buffer name {:?} contains NUL", name)));
        }
        if !self.names.insert(name.clone()) {
            return Err(Error::Argument(format!("duplicate buffer name '{}'", name)));
        }
        self.buffers.push((name, bytes.into()));
        Ok(self)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    fn names_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, _) in &self.buffers {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        out
    }

    fn layout(&self, names_len: u64) -> Layout {
        let num_arrays = self.buffers.len() as u64 + 1;
        let data_start = align(HEADER_SIZE as u64 + num_arrays * RANGE_SIZE as u64);

        let mut ranges = Vec::with_capacity(num_arrays as usize);
        ranges.push(Range::new(data_start, data_start + names_len));
        let mut cursor = data_start + names_len;
        for (_, bytes) in &self.buffers {
            let begin = align(cursor);
            let end = begin + bytes.len() as u64;
            ranges.push(Range::new(begin, end));
            cursor = end;
        }

        Layout {
            header: Header { magic: BFAST_MAGIC, data_start, data_end: cursor, num_arrays },
            ranges,
        }
    }

    /// Total size of the serialized container.
    pub fn size(&self) -> u64 {
        self.layout(self.names_bytes().len() as u64).header.data_end
    }

    /// Serialize the container to a writer. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64> {
        let names = self.names_bytes();
        let layout = self.layout(names.len() as u64);
        let mut out = OStream::new(writer);

        out.write_u64(layout.header.magic)?;
        out.write_u64(layout.header.data_start)?;
        out.write_u64(layout.header.data_end)?;
        out.write_u64(layout.header.num_arrays)?;
        for r in &layout.ranges {
            out.write_u64(r.begin)?;
            out.write_u64(r.end)?;
        }

        out.pad_to(layout.ranges[0].begin)?;
        out.write_bytes(&names)?;
        for ((_, bytes), r) in self.buffers.iter().zip(&layout.ranges[1..]) {
            out.pad_to(r.begin)?;
            out.write_bytes(bytes)?;
        }

        let written = out.pos();
        out.finish()?;
        Ok(written)
    }

    /// Serialize the container into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size() as usize);
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Serialize the container to a file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<u64> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        self.write_to(BufWriter::with_capacity(1024 * 1024, file))
    }
}
