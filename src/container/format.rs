use crate::error::{BlorbError, Result};
use std::fmt;
use std::io::{Read, Write};

/// Length of every IFF identifier
pub const ID_LEN: usize = 4;

/// Wrapper header: "FORM" + total size + "IFRS"
pub const CONTAINER_HEADER_SIZE: usize = 12;

/// Generic chunk header: type tag + big-endian length
pub const CHUNK_HEADER_SIZE: usize = 8;

/// One resource index record: usage + resource number + offset
pub const INDEX_RECORD_SIZE: usize = 12;

/// Leading entry count of the resource index data
pub const INDEX_COUNT_SIZE: usize = 4;

/// Absolute file position of the index chunk's data.
///
/// The index chunk is always the first chunk, so a position inside its
/// data maps to a file offset by adding this constant.
pub const INDEX_DATA_OFFSET: usize = CONTAINER_HEADER_SIZE + CHUNK_HEADER_SIZE;

/// File offset of the wrapper's total-size field
pub const SIZE_FIELD_OFFSET: u64 = 4;

/// Hard cap on chunks per container, index and frontispiece included
pub const MAX_CHUNKS: usize = 1024;

/// 4-byte IFF identifier, space padded
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId([u8; ID_LEN]);

impl ChunkId {
    pub const FORM: ChunkId = ChunkId(*b"FORM");
    pub const IFRS: ChunkId = ChunkId(*b"IFRS");
    pub const RIDX: ChunkId = ChunkId(*b"RIdx");
    pub const FSPC: ChunkId = ChunkId(*b"Fspc");
    pub const IFMD: ChunkId = ChunkId(*b"IFmd");

    /// Build an identifier from raw bytes
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from text: truncated to 4 bytes, space padded
    pub fn padded(s: &str) -> Self {
        let mut id = [b' '; ID_LEN];
        for (slot, byte) in id.iter_mut().zip(s.bytes()) {
            *slot = byte;
        }
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Identifier text without trailing padding
    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.0).trim_end().to_string()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut id = [0u8; ID_LEN];
        reader.read_exact(&mut id)?;
        Ok(Self(id))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// Write a big-endian u32
pub fn write_u32<W: Write>(mut writer: W, value: u32) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Read a big-endian u32
pub fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Load a big-endian u32 from `buf` at `pos`
pub fn get_u32(buf: &[u8], pos: usize) -> Result<u32> {
    let bytes: [u8; 4] = buf
        .get(pos..pos + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| BlorbError::InvalidFormat(format!("truncated integer at {}", pos)))?;
    Ok(u32::from_be_bytes(bytes))
}

/// Convert a stream position into a 32-bit container offset
pub fn to_offset(position: u64) -> Result<u32> {
    u32::try_from(position).map_err(|_| BlorbError::ContainerTooLarge(position))
}
