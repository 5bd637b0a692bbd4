//! Plain Old Data types and checked reinterpretation of raw buffers.
//!
//! Every typed view of a buffer (entity columns, G3D attributes) goes through
//! [`read_pod_array`], which checks that the byte length is a whole number of
//! elements and decodes little-endian values explicitly. Nothing is cast in
//! place, so buffer alignment never matters.

use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use std::fmt;

use super::{Error, Result};

/// Element type of a typed buffer.
///
/// The names are the ones used in G3D attribute descriptors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DataType {
    Uint8 = 0,
    Int8 = 1,
    Uint16 = 2,
    Int16 = 3,
    Uint32 = 4,
    /// Signed 32-bit integer (indices, groups, string references)
    #[default]
    Int32 = 5,
    Uint64 = 6,
    Int64 = 7,
    /// 32-bit floating point (positions)
    Float32 = 8,
    /// 64-bit floating point (numeric entity columns)
    Float64 = 9,
}

impl DataType {
    /// All data types, in tag order.
    pub const ALL: [DataType; 10] = [
        Self::Uint8,
        Self::Int8,
        Self::Uint16,
        Self::Int16,
        Self::Uint32,
        Self::Int32,
        Self::Uint64,
        Self::Int64,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the descriptor name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse a data type from its descriptor name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for element types that can be decoded from little-endian buffers.
pub trait VimPod: Pod + Zeroable + Copy + Default {
    /// The corresponding DataType enum value.
    const DATA_TYPE: DataType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Decode `dst.len()` values from `src`, which holds exactly that many.
    fn read_le_into(src: &[u8], dst: &mut [Self]);
}

macro_rules! impl_vim_pod {
    ($t:ty, $dt:expr, $read:ident) => {
        impl VimPod for $t {
            const DATA_TYPE: DataType = $dt;

            #[inline]
            fn read_le_into(src: &[u8], dst: &mut [Self]) {
                LittleEndian::$read(src, dst);
            }
        }
    };
}

impl_vim_pod!(u16, DataType::Uint16, read_u16_into);
impl_vim_pod!(i16, DataType::Int16, read_i16_into);
impl_vim_pod!(u32, DataType::Uint32, read_u32_into);
impl_vim_pod!(i32, DataType::Int32, read_i32_into);
impl_vim_pod!(u64, DataType::Uint64, read_u64_into);
impl_vim_pod!(i64, DataType::Int64, read_i64_into);
impl_vim_pod!(f32, DataType::Float32, read_f32_into);
impl_vim_pod!(f64, DataType::Float64, read_f64_into);

impl VimPod for u8 {
    const DATA_TYPE: DataType = DataType::Uint8;

    #[inline]
    fn read_le_into(src: &[u8], dst: &mut [Self]) {
        dst.copy_from_slice(src);
    }
}

impl VimPod for i8 {
    const DATA_TYPE: DataType = DataType::Int8;

    #[inline]
    fn read_le_into(src: &[u8], dst: &mut [Self]) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = *s as i8;
        }
    }
}

/// Decode a buffer as a sequence of `T`.
///
/// `what` names the buffer in the error when the length is not a whole
/// number of elements.
pub fn read_pod_array<T: VimPod>(what: &str, bytes: &[u8]) -> Result<Vec<T>> {
    if bytes.len() % T::SIZE != 0 {
        return Err(Error::format(format!(
            "'{}' has {} bytes, not a multiple of {} ({})",
            what,
            bytes.len(),
            T::SIZE,
            T::DATA_TYPE
        )));
    }
    let mut out = vec![T::default(); bytes.len() / T::SIZE];
    T::read_le_into(bytes, &mut out);
    Ok(out)
}

/// View a typed slice as raw bytes for writing.
#[inline]
pub fn pod_bytes<T: VimPod>(values: &[T]) -> &[u8] {
    bytemuck::cast_slice(values)
}
