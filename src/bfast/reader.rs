//! BFast container reader implementation.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use parking_lot::RwLock;
use tracing::trace;

use super::format::*;
use crate::util::{Error, Result};

/// Input streams for reading BFast data.
/// Supports memory-mapped, buffered file and in-memory sources.
pub struct IStreams {
    inner: StreamsInner,
    size: u64,
}

enum StreamsInner {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Buffered file access (fallback)
    File(RwLock<File>),
    /// Bytes already resident in memory
    Memory(Arc<[u8]>),
}

impl IStreams {
    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();

        let inner = if use_mmap && size > 0 {
            // Safety: the file is opened read-only and is not modified while mapped.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            StreamsInner::Mmap(mmap)
        } else {
            StreamsInner::File(RwLock::new(file))
        };

        Ok(Self { inner, size })
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Self {
        let data: Arc<[u8]> = data.into();
        let size = data.len() as u64;
        Self { inner: StreamsInner::Memory(data), size }
    }

    /// Get the total source size.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// True when the source is memory mapped.
    #[inline]
    pub fn is_mmap(&self) -> bool {
        matches!(self.inner, StreamsInner::Mmap(_))
    }

    fn check_range(&self, pos: u64, len: usize) -> Result<()> {
        match pos.checked_add(len as u64) {
            Some(end) if end <= self.size => Ok(()),
            Some(end) => Err(Error::UnexpectedEof(end)),
            None => Err(Error::UnexpectedEof(u64::MAX)),
        }
    }

    /// Read bytes at a specific position.
    pub fn read_bytes(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_into(pos, &mut buf)?;
        Ok(buf)
    }

    /// Read bytes into an existing buffer.
    pub fn read_into(&self, pos: u64, buf: &mut [u8]) -> Result<()> {
        self.check_range(pos, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }

        match &self.inner {
            StreamsInner::Mmap(mmap) => {
                buf.copy_from_slice(&mmap[pos as usize..(pos as usize + buf.len())]);
                Ok(())
            }
            StreamsInner::Memory(data) => {
                buf.copy_from_slice(&data[pos as usize..(pos as usize + buf.len())]);
                Ok(())
            }
            StreamsInner::File(file) => {
                let mut f = file.write();
                f.seek(SeekFrom::Start(pos))?;
                f.read_exact(buf)?;
                Ok(())
            }
        }
    }
}

/// Name and range of one buffer in a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferEntry {
    pub name: String,
    pub range: Range,
}

/// A named byte buffer read from a container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamedBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBuffer {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parse this buffer's bytes as a nested container.
    pub fn unpack(&self) -> Result<BFastReader> {
        BFastReader::from_bytes(self.bytes.clone())
    }
}

/// Reader over one BFast container.
///
/// Only the header, range table and names are read up front; buffer bytes
/// are fetched from the shared source on demand. A nested container is a
/// reader over a sub-range of the same source.
#[derive(Clone)]
pub struct BFastReader {
    streams: Arc<IStreams>,
    base: u64,
    len: u64,
    header: Header,
    buffers: Vec<BufferEntry>,
    index: HashMap<String, usize>,
}

impl BFastReader {
    /// Open a BFast file with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a BFast file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let streams = Arc::new(IStreams::open_opts(path, use_mmap)?);
        let len = streams.size();
        Self::new(streams, 0, len)
    }

    /// Parse a container held in memory.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let streams = Arc::new(IStreams::from_bytes(data));
        let len = streams.size();
        Self::new(streams, 0, len)
    }

    /// Parse the container occupying `len` bytes at `base` in `streams`.
    pub fn new(streams: Arc<IStreams>, base: u64, len: u64) -> Result<Self> {
        if len < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(base + len));
        }

        let raw = streams.read_bytes(base, HEADER_SIZE)?;
        let header = Header {
            magic: LittleEndian::read_u64(&raw[0..8]),
            data_start: LittleEndian::read_u64(&raw[DATA_START_OFFSET..]),
            data_end: LittleEndian::read_u64(&raw[DATA_END_OFFSET..]),
            num_arrays: LittleEndian::read_u64(&raw[NUM_ARRAYS_OFFSET..]),
        };
        validate_header(&header, len)?;

        let table = streams.read_bytes(base + HEADER_SIZE as u64, header.num_arrays as usize * RANGE_SIZE)?;
        let ranges: Vec<Range> = table
            .chunks_exact(RANGE_SIZE)
            .map(|c| Range::new(LittleEndian::read_u64(&c[0..8]), LittleEndian::read_u64(&c[8..16])))
            .collect();

        for (i, r) in ranges.iter().enumerate() {
            if r.begin > r.end || r.begin < header.data_start || r.end > header.data_end {
                return Err(Error::format(format!(
                    "array {} range {}..{} outside data section {}..{}",
                    i, r.begin, r.end, header.data_start, header.data_end
                )));
            }
        }

        let names_range = ranges[0];
        let names_bytes = streams.read_bytes(base + names_range.begin, names_range.len() as usize)?;
        let names = read_null_terminated_strings(&names_bytes)?;
        if names.len() != ranges.len() - 1 {
            return Err(Error::format(format!(
                "container has {} buffers but {} names",
                ranges.len() - 1,
                names.len()
            )));
        }

        let mut buffers = Vec::with_capacity(names.len());
        let mut index = HashMap::with_capacity(names.len());
        for (name, range) in names.into_iter().zip(ranges.into_iter().skip(1)) {
            trace!("bfast @{}: '{}' {}..{}", base, name, range.begin, range.end);
            if index.insert(name.clone(), buffers.len()).is_some() {
                return Err(Error::format(format!("duplicate buffer name '{}'", name)));
            }
            buffers.push(BufferEntry { name, range });
        }

        Ok(Self { streams, base, len, header, buffers, index })
    }

    /// Shared byte source.
    #[inline]
    pub fn streams(&self) -> &Arc<IStreams> {
        &self.streams
    }

    /// Decoded container header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Position of this container in the underlying source.
    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Size of the byte range this container was parsed from.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Number of named buffers (excluding the names array).
    #[inline]
    pub fn num_buffers(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Buffer entries in container order.
    #[inline]
    pub fn entries(&self) -> &[BufferEntry] {
        &self.buffers
    }

    /// Buffer names in container order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.buffers.iter().map(|b| b.name.as_str())
    }

    /// Check if a buffer with this name exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Range of a buffer, relative to the container start.
    pub fn range(&self, name: &str) -> Result<Range> {
        self.index
            .get(name)
            .map(|&i| self.buffers[i].range)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn read_range(&self, range: Range) -> Result<Vec<u8>> {
        self.streams.read_bytes(self.base + range.begin, range.len() as usize)
    }

    /// Read one buffer by exact name.
    pub fn read_buffer(&self, name: &str) -> Result<NamedBuffer> {
        let range = self.range(name)?;
        Ok(NamedBuffer::new(name, self.read_range(range)?))
    }

    /// Read all buffers in container order.
    pub fn read_all_buffers(&self) -> Result<Vec<NamedBuffer>> {
        self.buffers
            .iter()
            .map(|b| Ok(NamedBuffer::new(b.name.clone(), self.read_range(b.range)?)))
            .collect()
    }

    /// Open a named buffer as a nested container without copying it.
    pub fn read_bfast(&self, name: &str) -> Result<BFastReader> {
        let range = self.range(name)?;
        BFastReader::new(self.streams.clone(), self.base + range.begin, range.len())
    }
}

fn validate_header(header: &Header, len: u64) -> Result<()> {
    if header.magic == BFAST_SWAPPED_MAGIC {
        return Err(Error::format("big-endian BFast containers are not supported"));
    }
    if header.magic != BFAST_MAGIC {
        return Err(Error::InvalidMagic(header.magic));
    }
    if header.num_arrays == 0 {
        return Err(Error::format("container has no names array"));
    }
    if header.range_table_end() > header.data_start {
        return Err(Error::format(format!(
            "range table for {} arrays overlaps data start {}",
            header.num_arrays, header.data_start
        )));
    }
    if header.data_start > header.data_end {
        return Err(Error::format(format!(
            "data start {} is past data end {}",
            header.data_start, header.data_end
        )));
    }
    if header.data_end > len {
        return Err(Error::UnexpectedEof(header.data_end));
    }
    Ok(())
}

/// Split a block of `\0`-terminated UTF-8 strings.
///
/// A trailing segment without a terminator is kept; the final terminator does
/// not produce an extra empty string. Errors carry the byte offset of the
/// segment that failed to decode.
pub fn read_null_terminated_strings(bytes: &[u8]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let end = bytes[start..]
            .iter()
            .position(|&b| b == 0)
            .map_or(bytes.len(), |p| start + p);
        let s = std::str::from_utf8(&bytes[start..end])
            .map_err(|source| Error::Utf8 { offset: start, source })?;
        out.push(s.to_string());
        start = end + 1;
    }
    Ok(out)
}
