use crate::container::chunk::Chunk;
use crate::container::format::{
    to_offset, write_u32, ChunkId, CONTAINER_HEADER_SIZE, SIZE_FIELD_OFFSET,
};
use crate::container::index::PatchTable;
use crate::error::{BlorbError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

/// Where each chunk landed in a written container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerLayout {
    /// File offset of every chunk, index chunk first
    pub offsets: Vec<u64>,
    /// Value stored in the wrapper's size field (file length - 8)
    pub total_size: u32,
}

/// Serializes chunks into a Blorb container
pub struct ContainerWriter<W: Write + Seek> {
    writer: W,
}

impl ContainerWriter<BufWriter<File>> {
    /// Create (or truncate) a container file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Seek> ContainerWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the whole container: header, index chunk, then `chunks` in order.
    ///
    /// The offset of every indexed chunk is patched into the already written
    /// index through `patches`, and the wrapper size is patched last.
    pub fn write(
        &mut self,
        index: &Chunk,
        chunks: &[Chunk],
        patches: &PatchTable,
    ) -> Result<ContainerLayout> {
        let start = self.writer.stream_position()?;

        // Size is unknown until every chunk is out
        ChunkId::FORM.write_to(&mut self.writer)?;
        write_u32(&mut self.writer, 0)?;
        ChunkId::IFRS.write_to(&mut self.writer)?;

        let mut offsets = Vec::with_capacity(chunks.len() + 1);
        offsets.push(start + CONTAINER_HEADER_SIZE as u64);
        index.write_to(&mut self.writer)?;

        let mut slots = patches.iter();
        for chunk in chunks {
            let position = self.writer.stream_position()?;

            if chunk.usage.is_indexed() {
                let slot = slots.next().ok_or_else(|| {
                    BlorbError::InvalidIndex(format!(
                        "no index slot for {} chunk #{}",
                        chunk.kind, chunk.resource
                    ))
                })?;
                self.writer
                    .seek(SeekFrom::Start(start + slot.file_position()))?;
                write_u32(&mut self.writer, to_offset(position - start)?)?;
                self.writer.seek(SeekFrom::Start(position))?;
            }

            chunk.write_to(&mut self.writer)?;
            offsets.push(position);

            debug!(
                kind = %chunk.kind,
                usage = %chunk.usage.tag(),
                resource = chunk.resource,
                offset = position - start,
                length = chunk.len(),
                "Chunk written"
            );
        }

        if slots.next().is_some() {
            return Err(BlorbError::InvalidIndex(
                "index has more entries than indexed chunks".to_string(),
            ));
        }

        let end = self.writer.stream_position()?;
        let total_size = to_offset(end - start - 8)?;
        self.writer
            .seek(SeekFrom::Start(start + SIZE_FIELD_OFFSET))?;
        write_u32(&mut self.writer, total_size)?;
        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        info!(chunks = chunks.len() + 1, total_size, "Container written");

        Ok(ContainerLayout {
            offsets,
            total_size,
        })
    }

    /// Flush and return the underlying stream
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
