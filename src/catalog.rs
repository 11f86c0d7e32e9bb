//! Resource catalog: turns control-list entries into chunks
//!
//! A control list (`.res` file) holds one resource per line:
//!
//! ```text
//! ! comment
//! pict  myPic    cover.png
//! snd   mySound  theme.ogg
//! exec  story.z8
//! cover front.png
//! meta  story.iFiction
//! ```
//!
//! The first field is the usage, the optional second field a symbolic name
//! for the declarations file, and the rest of the line the file path,
//! relative to the control list's directory unless absolute.

use crate::container::{Chunk, ChunkId, ChunkUsage, MAX_CHUNKS};
use crate::error::{BlorbError, Result};
use crate::registry::{infer_type, StoryKind, Usage};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Characters that open a comment line
pub const COMMENT_MARKERS: &str = ";.!#%&/:\\$->";

/// Symbols allowed in identifiers besides letters and digits
const IDENTIFIER_SYMBOLS: &str = "_-";

fn is_field_delimiter(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Whether `token` can be used as a symbolic resource name
pub fn is_identifier(token: &[u8]) -> bool {
    let is_symbol = |b: &u8| IDENTIFIER_SYMBOLS.as_bytes().contains(b);
    match token.split_first() {
        Some((first, rest)) if first.is_ascii_alphabetic() || is_symbol(first) => rest
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || is_symbol(b)),
        _ => false,
    }
}

/// Strip delimiters (and line endings) from both ends of `text`
fn trim_field(text: &[u8]) -> &[u8] {
    let keep = |b: &u8| !(is_field_delimiter(*b) || *b == b'\n' || *b == b'\r');
    match text.iter().position(keep) {
        Some(start) => {
            let end = text.iter().rposition(keep).map_or(start, |e| e + 1);
            &text[start..end]
        }
        None => &[],
    }
}

/// Split off the first field of `text`, returning it and the trimmed rest
fn split_field(text: &[u8]) -> (&[u8], &[u8]) {
    match text.iter().position(|b| is_field_delimiter(*b)) {
        Some(end) => (&text[..end], trim_field(&text[end..])),
        None => (text, &[]),
    }
}

/// File paths keep their raw bytes; names need not be UTF-8
#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Line reader over a control list that skips comments and blank lines
pub struct ControlList<B: BufRead> {
    reader: B,
    line_number: usize,
    buffer: Vec<u8>,
}

impl<B: BufRead> ControlList<B> {
    pub fn new(reader: B) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Next entry as (1-based line number, trimmed bytes)
    pub fn next_entry(&mut self) -> Result<Option<(usize, Vec<u8>)>> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let text = trim_field(&self.buffer);
            match text.first() {
                None => continue,
                Some(b) if COMMENT_MARKERS.as_bytes().contains(b) => continue,
                Some(_) => return Ok(Some((self.line_number, text.to_vec()))),
            }
        }
    }
}

/// Per-usage resource number counters for one build
///
/// Pictures and sounds start at 3; executables and metadata at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCounters {
    executable: u32,
    picture: u32,
    sound: u32,
    metadata: u32,
}

impl Default for ResourceCounters {
    fn default() -> Self {
        Self {
            executable: 0,
            picture: 3,
            sound: 3,
            metadata: 0,
        }
    }
}

impl ResourceCounters {
    fn counter(&mut self, usage: Usage) -> &mut u32 {
        match usage {
            Usage::Executable => &mut self.executable,
            // Covers are stored as pictures
            Usage::Picture | Usage::Frontispiece => &mut self.picture,
            Usage::Sound => &mut self.sound,
            Usage::Metadata => &mut self.metadata,
        }
    }

    /// Read-then-increment the counter for `usage`
    pub fn next(&mut self, usage: Usage) -> u32 {
        let counter = self.counter(usage);
        let value = *counter;
        *counter += 1;
        value
    }

    /// Resource number for the frontispiece chunk (pre-increments metadata)
    fn next_frontispiece(&mut self) -> u32 {
        self.metadata += 1;
        self.metadata
    }
}

/// A resource to be named in the declarations file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub symbol: Option<String>,
    pub usage: Usage,
    pub resource: u32,
    pub path: PathBuf,
}

/// The cover picture declared by a frontispiece entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cover {
    /// Position of the cover among the catalog's chunks
    pub position: usize,
    /// Resource number of the cover picture
    pub resource: u32,
}

/// Outcome of one control-list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEntry {
    /// A chunk was appended at this position
    Stored { position: usize },
    /// Index-only mode: the file was unreadable and the entry skipped
    Dropped { path: PathBuf },
}

/// Everything the catalog collected, ready for indexing
#[derive(Debug, Clone, Default)]
pub struct CatalogContents {
    /// Chunks in write order, frontispiece last
    pub chunks: Vec<Chunk>,
    pub declarations: Vec<Declaration>,
    pub cover: Option<Cover>,
    pub has_metadata: bool,
    pub story: Option<StoryKind>,
    pub dropped: Vec<PathBuf>,
}

/// Builds chunks from control-list entries
pub struct ResourceCatalog {
    base_dir: PathBuf,
    index_only: bool,
    counters: ResourceCounters,
    contents: CatalogContents,
}

impl ResourceCatalog {
    /// Catalog resolving relative paths against `base_dir`
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            index_only: false,
            counters: ResourceCounters::default(),
            contents: CatalogContents::default(),
        }
    }

    /// Catalog for the control list at `path`
    pub fn for_control_file<P: AsRef<Path>>(path: P) -> Self {
        let base_dir = path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(base_dir)
    }

    /// In index-only mode unreadable resource files are skipped with a warning
    pub fn index_only(mut self, enabled: bool) -> Self {
        self.index_only = enabled;
        self
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.contents.chunks
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.contents.declarations
    }

    /// Consume the next entry of `list`; `None` at end of input
    pub fn parse_entry<B: BufRead>(
        &mut self,
        list: &mut ControlList<B>,
    ) -> Result<Option<ParsedEntry>> {
        match list.next_entry()? {
            Some((line, text)) => self.add_entry(line, &text).map(Some),
            None => Ok(None),
        }
    }

    /// Read a whole control list
    pub fn read_control_list<B: BufRead>(&mut self, reader: B) -> Result<()> {
        let mut list = ControlList::new(reader);
        while self.parse_entry(&mut list)?.is_some() {}
        Ok(())
    }

    /// Add one non-comment entry found on `line`
    pub fn add_entry<T: AsRef<[u8]>>(&mut self, line: usize, text: T) -> Result<ParsedEntry> {
        let (usage_token, rest) = split_field(text.as_ref());
        let declared = std::str::from_utf8(usage_token)
            .ok()
            .and_then(Usage::resolve)
            .ok_or_else(|| BlorbError::UnrecognizedUsage {
                line,
                token: lossy(usage_token),
            })?;

        let mut usage = declared;
        let mut chunk_usage = ChunkUsage::Indexed(declared);
        let mut is_cover = false;
        match declared {
            Usage::Metadata => {
                if self.contents.has_metadata {
                    return Err(BlorbError::DuplicateMetadata { line });
                }
                self.contents.has_metadata = true;
                chunk_usage = ChunkUsage::Unindexed;
            }
            Usage::Frontispiece => {
                if self.contents.cover.is_some() {
                    return Err(BlorbError::DuplicateCover { line });
                }
                usage = Usage::Picture;
                chunk_usage = ChunkUsage::Indexed(Usage::Picture);
                is_cover = true;
            }
            _ => {}
        }

        // Assigned before the file is opened: dropped entries leave gaps
        let resource = self.counters.next(usage);

        let (symbol, path_text) = match split_field(rest) {
            (token, remainder) if is_identifier(token) => (Some(lossy(token)), remainder),
            _ => (None, rest),
        };
        if path_text.is_empty() {
            return Err(BlorbError::MalformedFilePath {
                line,
                token: symbol.unwrap_or_else(|| lossy(usage_token)),
            });
        }
        let path = self.base_dir.join(path_from_bytes(path_text));

        let inferred = infer_type(&path, line)?;
        let kind = if declared == Usage::Metadata {
            ChunkId::IFMD
        } else {
            inferred.kind
        };
        if usage.permitted_types().is_some() && !usage.accepts(kind) {
            return Err(BlorbError::DisallowedTypeForUsage {
                line,
                usage: usage.to_string(),
                kind: kind.trimmed(),
                path,
            });
        }
        if usage == Usage::Executable {
            self.contents.story = inferred.story;
        }

        if is_cover {
            self.contents.cover = Some(Cover {
                position: self.contents.chunks.len(),
                resource,
            });
        } else if matches!(usage, Usage::Picture | Usage::Sound) {
            self.contents.declarations.push(Declaration {
                symbol: symbol.clone(),
                usage,
                resource,
                path: path.clone(),
            });
        }

        // Room must remain for the index chunk
        if self.contents.chunks.len() + 2 > MAX_CHUNKS {
            return Err(BlorbError::ChunkCapacityExceeded { limit: MAX_CHUNKS });
        }

        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(source) if self.index_only => {
                warn!(line, path = %path.display(), error = %source, "Can't open file, entry skipped");
                self.contents.dropped.push(path.clone());
                return Ok(ParsedEntry::Dropped { path });
            }
            Err(source) => {
                return Err(BlorbError::UnreadableResourceFile { line, path, source });
            }
        };

        debug!(
            line,
            usage = %chunk_usage.tag(),
            kind = %kind,
            resource,
            length = data.len(),
            symbol = symbol.as_deref().unwrap_or(""),
            "Resource loaded"
        );

        let position = self.contents.chunks.len();
        self.contents
            .chunks
            .push(Chunk::new(chunk_usage, kind, resource, data));
        Ok(ParsedEntry::Stored { position })
    }

    /// Finish parsing, appending the frontispiece chunk if a cover was declared
    pub fn finish(mut self) -> Result<CatalogContents> {
        if let Some(cover) = self.contents.cover {
            if self.contents.chunks.len() + 2 > MAX_CHUNKS {
                return Err(BlorbError::ChunkCapacityExceeded { limit: MAX_CHUNKS });
            }
            let resource = self.counters.next_frontispiece();
            self.contents
                .chunks
                .push(Chunk::frontispiece(resource, cover.resource));
        }
        Ok(self.contents)
    }
}
