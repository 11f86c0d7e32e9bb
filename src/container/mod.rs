mod chunk;
mod format;
mod index;
mod reader;
mod writer;

pub use chunk::{Chunk, ChunkHeader, ChunkUsage};
pub use format::{
    get_u32, read_u32, to_offset, write_u32, ChunkId, CHUNK_HEADER_SIZE,
    CONTAINER_HEADER_SIZE, ID_LEN, INDEX_COUNT_SIZE, INDEX_DATA_OFFSET, INDEX_RECORD_SIZE,
    MAX_CHUNKS, SIZE_FIELD_OFFSET,
};
pub use index::{decode_index, IndexBuilder, IndexEntry, PatchSlot, PatchTable};
pub use reader::{ChunkInfo, ContainerReader};
pub use writer::{ContainerLayout, ContainerWriter};
