use crate::container::chunk::{Chunk, ChunkUsage};
use crate::container::format::{
    get_u32, read_u32, write_u32, ChunkId, INDEX_COUNT_SIZE, INDEX_DATA_OFFSET,
    INDEX_RECORD_SIZE, MAX_CHUNKS,
};
use crate::error::{BlorbError, Result};
use std::io::{Read, Write};
use tracing::debug;

/// Resource index record (RIdx entry)
///
/// Structure (12 bytes fixed):
/// - Usage: 4-byte identifier ("Pict", "Snd ", "Exec")
/// - Resource number: uint32 BE
/// - Offset of the chunk from the start of the file: uint32 BE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub usage: ChunkId,
    pub resource: u32,
    pub offset: u32,
}

impl IndexEntry {
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        self.usage.write_to(&mut writer)?;
        write_u32(&mut writer, self.resource)?;
        write_u32(&mut writer, self.offset)?;
        Ok(INDEX_RECORD_SIZE)
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let usage = ChunkId::read_from(&mut reader)?;
        let resource = read_u32(&mut reader)?;
        let offset = read_u32(&mut reader)?;
        Ok(Self {
            usage,
            resource,
            offset,
        })
    }
}

/// Location of one unresolved offset field inside the index chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSlot {
    /// Position of the offset field within the index chunk's data
    pub data_position: usize,
}

impl PatchSlot {
    /// Absolute file position of the offset field
    pub fn file_position(&self) -> u64 {
        (self.data_position + INDEX_DATA_OFFSET) as u64
    }
}

/// Offset fields to patch, one per indexed chunk, in write order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchTable {
    slots: Vec<PatchSlot>,
}

impl PatchTable {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&PatchSlot> {
        self.slots.get(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatchSlot> {
        self.slots.iter()
    }
}

/// Builds the RIdx chunk and its patch table
pub struct IndexBuilder;

impl IndexBuilder {
    /// Build the index for `chunks`, which must already be in write order.
    ///
    /// Offset fields are left zeroed; the container writer fills them in
    /// through the returned patch table.
    pub fn build(chunks: &[Chunk]) -> Result<(Chunk, PatchTable)> {
        if chunks.len() + 1 > MAX_CHUNKS {
            return Err(BlorbError::ChunkCapacityExceeded { limit: MAX_CHUNKS });
        }

        let n = chunks.iter().filter(|c| c.usage.is_indexed()).count();
        let mut data = Vec::with_capacity(INDEX_COUNT_SIZE + INDEX_RECORD_SIZE * n);
        write_u32(&mut data, n as u32)?;

        let mut slots = Vec::with_capacity(n);
        for chunk in chunks.iter().filter(|c| c.usage.is_indexed()) {
            let entry = IndexEntry {
                usage: chunk.usage.tag(),
                resource: chunk.resource,
                offset: 0,
            };
            let pos = data.len();
            entry.write_to(&mut data)?;
            // Offset is the record's last field
            slots.push(PatchSlot {
                data_position: pos + 8,
            });
        }

        debug!(entries = n, bytes = data.len(), "Resource index allocated");

        let index = Chunk::new(ChunkUsage::Unindexed, ChunkId::RIDX, 0, data);
        Ok((index, PatchTable { slots }))
    }
}

/// Decode the data of a RIdx chunk
pub fn decode_index(data: &[u8]) -> Result<Vec<IndexEntry>> {
    let n = get_u32(data, 0)? as usize;
    let expected = n
        .checked_mul(INDEX_RECORD_SIZE)
        .and_then(|records| records.checked_add(INDEX_COUNT_SIZE))
        .ok_or_else(|| BlorbError::InvalidIndex(format!("entry count {} overflows", n)))?;

    if data.len() != expected {
        return Err(BlorbError::InvalidIndex(format!(
            "{} entries need {} bytes, chunk has {}",
            n,
            expected,
            data.len()
        )));
    }

    data[INDEX_COUNT_SIZE..]
        .chunks_exact(INDEX_RECORD_SIZE)
        .map(IndexEntry::read_from)
        .collect()
}
