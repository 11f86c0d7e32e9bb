//! Build report: the chunk listing shown in verbose mode
//!
//! Renders as text (one line per chunk) or JSON:
//!
//! ```json
//! {
//!   "container": "story.zblorb",
//!   "total_size": 1234,
//!   "chunks": [
//!     { "number": 1, "usage": "0", "kind": "RIdx", "resource": 0, "length": 28, "offset": 12, "crc32": "1c291ca3" }
//!   ]
//! }
//! ```

use crate::container::{Chunk, ContainerLayout};
use crate::error::{BlorbError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One chunk of the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// 1-based position in write order (the index chunk is 1)
    pub number: usize,
    pub usage: String,
    pub kind: String,
    pub resource: u32,
    pub length: usize,
    /// File offset, once the container has been written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// CRC-32 of the chunk data (hex)
    pub crc32: String,
}

impl ChunkRecord {
    fn new(number: usize, chunk: &Chunk, offset: Option<u64>) -> Self {
        Self {
            number,
            usage: chunk.usage.tag().trimmed(),
            kind: chunk.kind.trimmed(),
            resource: chunk.resource,
            length: chunk.len(),
            offset,
            crc32: format!("{:08x}", crc32fast::hash(&chunk.data)),
        }
    }
}

/// Summary of one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declarations: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u32>,
    pub chunks: Vec<ChunkRecord>,
    /// Resource files skipped in index-only mode
    #[serde(default)]
    pub dropped: Vec<PathBuf>,
}

impl BuildReport {
    /// List `index` followed by `chunks`, with offsets from `layout` if written
    pub fn new(index: &Chunk, chunks: &[Chunk], layout: Option<&ContainerLayout>) -> Self {
        let offset = |n: usize| layout.and_then(|l| l.offsets.get(n).copied());

        let records = std::iter::once(index)
            .chain(chunks)
            .enumerate()
            .map(|(n, chunk)| ChunkRecord::new(n + 1, chunk, offset(n)))
            .collect();

        Self {
            total_size: layout.map(|l| l.total_size),
            chunks: records,
            ..Default::default()
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(BlorbError::from)
    }

    /// Parse from JSON
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(BlorbError::from)
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.chunks {
            write!(
                f,
                "\t\tChunk {:04}\tid#{:04}: Use '{}'\tType '{}'\tLength: '{}'",
                record.number, record.resource, record.usage, record.kind, record.length
            )?;
            if let Some(offset) = record.offset {
                write!(f, "\tOffset: '{}'", offset)?;
            }
            writeln!(f)?;
        }
        for path in &self.dropped {
            writeln!(f, "\t\tSkipped: '{}'", path.display())?;
        }
        if let Some(size) = self.total_size {
            writeln!(f, "\t\tTotal size: {}", size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ChunkId, ChunkUsage, IndexBuilder};
    use crate::registry::Usage;

    fn sample() -> (Chunk, Vec<Chunk>) {
        let chunks = vec![Chunk::new(
            ChunkUsage::Indexed(Usage::Picture),
            ChunkId::padded("PNG"),
            3,
            b"Hello, World!".to_vec(),
        )];
        let (index, _) = IndexBuilder::build(&chunks).unwrap();
        (index, chunks)
    }

    #[test]
    fn test_report_without_layout() {
        let (index, chunks) = sample();
        let report = BuildReport::new(&index, &chunks, None);

        assert_eq!(report.chunks.len(), 2);
        assert_eq!(report.chunks[0].kind, "RIdx");
        assert_eq!(report.chunks[0].usage, "0");
        assert_eq!(report.chunks[1].usage, "Pict");
        assert_eq!(report.chunks[1].kind, "PNG");
        assert_eq!(report.chunks[1].offset, None);
        assert_eq!(report.chunks[1].crc32, "ec4ac3d0");
        assert_eq!(report.total_size, None);

        let text = report.to_string();
        assert!(text.contains("id#0003: Use 'Pict'\tType 'PNG'\tLength: '13'"));
        assert!(!text.contains("Offset"));
    }

    #[test]
    fn test_report_with_layout() {
        let (index, chunks) = sample();
        let layout = ContainerLayout {
            offsets: vec![12, 36],
            total_size: 50,
        };
        let report = BuildReport::new(&index, &chunks, Some(&layout));

        assert_eq!(report.chunks[0].offset, Some(12));
        assert_eq!(report.chunks[1].offset, Some(36));
        assert_eq!(report.total_size, Some(50));
        assert!(report.to_string().contains("Total size: 50"));
    }

    #[test]
    fn test_json_roundtrip() {
        let (index, chunks) = sample();
        let mut report = BuildReport::new(&index, &chunks, None);
        report.container = Some(PathBuf::from("story.zblorb"));

        let json = report.to_json().unwrap();
        let parsed = BuildReport::from_json(&json).unwrap();
        assert_eq!(parsed, report);

        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["chunks"][1]["resource"], 3);
        assert!(value["chunks"][1].get("offset").is_none());
    }
}
