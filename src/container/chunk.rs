use crate::container::format::{read_u32, to_offset, write_u32, ChunkId, CHUNK_HEADER_SIZE};
use crate::error::Result;
use crate::registry::Usage;
use std::io::{Read, Write};

/// How a chunk appears in the resource index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkUsage {
    /// Listed in the index under this usage
    Indexed(Usage),
    /// Present in the container but absent from the index
    Unindexed,
}

impl ChunkUsage {
    /// Tag as rendered in listings; unindexed chunks show "0"
    pub fn tag(&self) -> ChunkId {
        match self {
            ChunkUsage::Indexed(usage) => usage.tag(),
            ChunkUsage::Unindexed => ChunkId::padded("0"),
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, ChunkUsage::Indexed(_))
    }
}

/// One chunk of a Blorb container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub usage: ChunkUsage,
    pub kind: ChunkId,
    pub resource: u32,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(usage: ChunkUsage, kind: ChunkId, resource: u32, data: Vec<u8>) -> Self {
        Self {
            usage,
            kind,
            resource,
            data,
        }
    }

    /// Frontispiece chunk pointing at the cover picture
    pub fn frontispiece(resource: u32, cover_picture: u32) -> Self {
        Self::new(
            ChunkUsage::Unindexed,
            ChunkId::FSPC,
            resource,
            cover_picture.to_be_bytes().to_vec(),
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Data that is already a complete IFF form is written without a header
    pub fn is_embedded_form(&self) -> bool {
        self.kind == ChunkId::FORM
    }

    /// Write the chunk, returning the number of bytes written
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut bytes_written = 0;

        if !self.is_embedded_form() {
            self.kind.write_to(&mut writer)?;
            write_u32(&mut writer, to_offset(self.len() as u64)?)?;
            bytes_written += CHUNK_HEADER_SIZE;
        }

        writer.write_all(&self.data)?;
        bytes_written += self.len();

        // IFF chunks start on even offsets
        if self.len() % 2 == 1 {
            writer.write_all(&[0u8])?;
            bytes_written += 1;
        }

        Ok(bytes_written)
    }
}

/// Type tag and length preceding a chunk's data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub kind: ChunkId,
    pub length: u32,
}

impl ChunkHeader {
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let kind = ChunkId::read_from(&mut reader)?;
        let length = read_u32(&mut reader)?;
        Ok(Self { kind, length })
    }

    /// Bytes taken by the header, data and padding
    pub fn span(&self) -> u64 {
        CHUNK_HEADER_SIZE as u64 + u64::from(self.length) + u64::from(self.length % 2)
    }
}
