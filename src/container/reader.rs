use crate::container::chunk::ChunkHeader;
use crate::container::format::{read_u32, ChunkId, CHUNK_HEADER_SIZE, CONTAINER_HEADER_SIZE};
use crate::container::index::{decode_index, IndexEntry};
use crate::error::{BlorbError, Result};
use crate::registry::Usage;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// A chunk located while scanning a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    pub kind: ChunkId,
    /// Offset of the chunk's type tag
    pub offset: u64,
    /// Length of the data following the 8-byte header
    pub length: u32,
}

/// Blorb container reader with index lookup
pub struct ContainerReader<R: Read + Seek> {
    reader: R,
    total_size: u32,
    chunks: Vec<ChunkInfo>,
    index: Vec<IndexEntry>,
}

impl ContainerReader<BufReader<File>> {
    /// Open a container file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ContainerReader<R> {
    /// Parse the wrapper, scan every chunk and validate the resource index
    pub fn new(mut reader: R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_len < CONTAINER_HEADER_SIZE as u64 {
            return Err(BlorbError::InvalidFormat(format!(
                "file is {} bytes, shorter than the container header",
                file_len
            )));
        }

        if ChunkId::read_from(&mut reader)? != ChunkId::FORM {
            return Err(BlorbError::InvalidFormat(
                "missing FORM wrapper".to_string(),
            ));
        }
        let total_size = read_u32(&mut reader)?;
        if ChunkId::read_from(&mut reader)? != ChunkId::IFRS {
            return Err(BlorbError::InvalidFormat(
                "not a resource container (expected IFRS)".to_string(),
            ));
        }
        if u64::from(total_size) + 8 != file_len {
            return Err(BlorbError::InvalidFormat(format!(
                "wrapper size {} does not match file length {}",
                total_size, file_len
            )));
        }

        let chunks = Self::scan_chunks(&mut reader, file_len)?;

        let first = chunks
            .first()
            .filter(|c| c.kind == ChunkId::RIDX)
            .copied()
            .ok_or_else(|| {
                BlorbError::InvalidFormat("first chunk is not a resource index".to_string())
            })?;

        let mut container = Self {
            reader,
            total_size,
            chunks,
            index: Vec::new(),
        };

        let index_data = container.read_chunk(&first)?;
        container.index = decode_index(&index_data)?;
        container.validate_index()?;

        Ok(container)
    }

    fn scan_chunks(reader: &mut R, file_len: u64) -> Result<Vec<ChunkInfo>> {
        let mut chunks = Vec::new();
        let mut offset = CONTAINER_HEADER_SIZE as u64;

        while offset < file_len {
            if offset + CHUNK_HEADER_SIZE as u64 > file_len {
                return Err(BlorbError::InvalidFormat(format!(
                    "truncated chunk header at {}",
                    offset
                )));
            }
            reader.seek(SeekFrom::Start(offset))?;
            let header = ChunkHeader::read_from(&mut *reader)?;

            let end = offset + header.span();
            if end > file_len {
                return Err(BlorbError::InvalidFormat(format!(
                    "chunk {} at {} runs past end of file",
                    header.kind, offset
                )));
            }

            chunks.push(ChunkInfo {
                kind: header.kind,
                offset,
                length: header.length,
            });
            offset = end;
        }

        Ok(chunks)
    }

    fn validate_index(&self) -> Result<()> {
        for entry in &self.index {
            if Usage::from_index_tag(entry.usage).is_none() {
                return Err(BlorbError::InvalidIndex(format!(
                    "unknown usage '{}' for resource {}",
                    entry.usage, entry.resource
                )));
            }
            if !self
                .chunks
                .iter()
                .any(|c| c.offset == u64::from(entry.offset))
            {
                return Err(BlorbError::InvalidIndex(format!(
                    "{} #{} points at {}, which is not a chunk",
                    entry.usage, entry.resource, entry.offset
                )));
            }
        }
        Ok(())
    }

    /// Wrapper size field (file length - 8)
    pub fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Every chunk in file order, index chunk first
    pub fn chunks(&self) -> &[ChunkInfo] {
        &self.chunks
    }

    /// Decoded resource index, in file order
    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    /// Look up a resource in the index
    pub fn find(&self, usage: Usage, resource: u32) -> Option<&IndexEntry> {
        self.index
            .iter()
            .find(|e| e.usage == usage.tag() && e.resource == resource)
    }

    /// Chunk located at an index entry's offset
    pub fn chunk_for(&self, entry: &IndexEntry) -> Option<&ChunkInfo> {
        self.chunks
            .iter()
            .find(|c| c.offset == u64::from(entry.offset))
    }

    /// Read a chunk's data; embedded forms are returned whole, header included
    pub fn read_chunk(&mut self, info: &ChunkInfo) -> Result<Vec<u8>> {
        let (start, len) = if info.kind == ChunkId::FORM {
            (info.offset, CHUNK_HEADER_SIZE + info.length as usize)
        } else {
            (info.offset + CHUNK_HEADER_SIZE as u64, info.length as usize)
        };

        self.reader.seek(SeekFrom::Start(start))?;
        let mut data = vec![0u8; len];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Read the data of an indexed resource
    pub fn read_resource(&mut self, usage: Usage, resource: u32) -> Result<Vec<u8>> {
        let info = self
            .find(usage, resource)
            .and_then(|entry| self.chunk_for(entry))
            .copied()
            .ok_or_else(|| {
                BlorbError::InvalidIndex(format!("no {} resource #{}", usage, resource))
            })?;
        self.read_chunk(&info)
    }

    /// Picture resource number named by the frontispiece chunk, if any
    pub fn frontispiece(&mut self) -> Result<Option<u32>> {
        let info = match self.chunks.iter().find(|c| c.kind == ChunkId::FSPC) {
            Some(info) => *info,
            None => return Ok(None),
        };
        let data = self.read_chunk(&info)?;
        if data.len() != 4 {
            return Err(BlorbError::InvalidFormat(format!(
                "frontispiece chunk has {} bytes, expected 4",
                data.len()
            )));
        }
        Ok(Some(u32::from_be_bytes([data[0], data[1], data[2], data[3]])))
    }
}
