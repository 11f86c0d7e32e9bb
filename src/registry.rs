//! Usage categories, their permitted chunk types, and extension-based type inference

use crate::container::ChunkId;
use crate::error::{BlorbError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const EXECUTABLE_TYPES: [ChunkId; 12] = [
    ChunkId::from_bytes(*b"ZCOD"), // Z-machine
    ChunkId::from_bytes(*b"GLUL"), // Glulx
    ChunkId::from_bytes(*b"TAD2"),
    ChunkId::from_bytes(*b"TAD3"),
    ChunkId::from_bytes(*b"HUGO"),
    ChunkId::from_bytes(*b"ALAN"),
    ChunkId::from_bytes(*b"ADRI"),
    ChunkId::from_bytes(*b"LEVE"),
    ChunkId::from_bytes(*b"AGT "),
    ChunkId::from_bytes(*b"MAGS"),
    ChunkId::from_bytes(*b"ADVS"),
    ChunkId::from_bytes(*b"EXEC"), // native executable
];

const PICTURE_TYPES: [ChunkId; 2] = [
    ChunkId::from_bytes(*b"PNG "),
    ChunkId::from_bytes(*b"JPEG"),
];

const SOUND_TYPES: [ChunkId; 3] = [
    ChunkId::from_bytes(*b"OGGV"),
    ChunkId::from_bytes(*b"AIFF"),
    ChunkId::from_bytes(*b"MOD "),
];

/// Resource usage category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Usage {
    Executable,
    Picture,
    Sound,
    Metadata,
    Frontispiece,
}

impl Usage {
    pub const ALL: [Usage; 5] = [
        Usage::Executable,
        Usage::Picture,
        Usage::Sound,
        Usage::Metadata,
        Usage::Frontispiece,
    ];

    /// Accepted spellings, each surrounded by spaces
    fn aliases(self) -> &'static str {
        match self {
            Usage::Executable => " EXEC EXE CODE ",
            Usage::Picture => " PICT PIC PICTURE ",
            Usage::Sound => " SND MSC MUSIC SOUND ",
            Usage::Metadata => " META MTA BIBLIO BIBLIOGRAPHIC BIB IFMD ",
            Usage::Frontispiece => " POSTER POST COV COVER FRONT FSPC ",
        }
    }

    /// Resolve a control-list usage token, case-insensitively
    ///
    /// The token is wrapped in spaces before searching the alias table so
    /// that "PI" never matches "PIC".
    pub fn resolve(token: &str) -> Option<Usage> {
        if token.is_empty() {
            return None;
        }
        let candidate = format!(" {} ", token.to_uppercase());
        Usage::ALL
            .into_iter()
            .find(|usage| usage.aliases().contains(&candidate))
    }

    /// Tag stored in the resource index
    pub fn tag(self) -> ChunkId {
        match self {
            Usage::Executable => ChunkId::from_bytes(*b"Exec"),
            Usage::Picture => ChunkId::from_bytes(*b"Pict"),
            Usage::Sound => ChunkId::from_bytes(*b"Snd "),
            Usage::Metadata => ChunkId::IFMD,
            Usage::Frontispiece => ChunkId::FSPC,
        }
    }

    /// Inverse of [`Usage::tag`] for the three indexable categories
    pub fn from_index_tag(tag: ChunkId) -> Option<Usage> {
        [Usage::Executable, Usage::Picture, Usage::Sound]
            .into_iter()
            .find(|usage| usage.tag() == tag)
    }

    /// Closed set of chunk types, for categories that have one
    pub fn permitted_types(self) -> Option<&'static [ChunkId]> {
        match self {
            Usage::Executable => Some(&EXECUTABLE_TYPES),
            Usage::Picture => Some(&PICTURE_TYPES),
            Usage::Sound => Some(&SOUND_TYPES),
            Usage::Metadata | Usage::Frontispiece => None,
        }
    }

    /// Whether `kind` may be stored under this usage
    pub fn accepts(self, kind: ChunkId) -> bool {
        self.permitted_types()
            .map(|types| types.contains(&kind))
            .unwrap_or(false)
    }

    /// Prefix used to build declaration names from file names
    pub fn declaration_prefix(self) -> &'static str {
        match self {
            Usage::Executable => "exe",
            Usage::Picture => "pic",
            Usage::Sound => "snd",
            Usage::Metadata => "meta",
            Usage::Frontispiece => "cover",
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag().trimmed())
    }
}

/// Virtual machine of the story file, when one is packaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryKind {
    ZCode,
    Glulx,
}

/// Result of extension-based type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredType {
    pub kind: ChunkId,
    pub story: Option<StoryKind>,
}

impl InferredType {
    const fn plain(kind: [u8; 4]) -> Self {
        Self {
            kind: ChunkId::from_bytes(kind),
            story: None,
        }
    }

    const fn story(kind: [u8; 4], story: StoryKind) -> Self {
        Self {
            kind: ChunkId::from_bytes(kind),
            story: Some(story),
        }
    }
}

/// Infer the chunk type of a resource file from its extension
pub fn infer_type(path: &Path, line: usize) -> Result<InferredType> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let inferred = match extension.as_str() {
        "png" => InferredType::plain(*b"PNG "),
        "jpg" => InferredType::plain(*b"JPEG"),
        "ogg" => InferredType::plain(*b"OGGV"),
        "mod" => InferredType::plain(*b"MOD "),
        "aif" => InferredType::plain(*b"AIFF"),
        "z5" | "z8" => InferredType::story(*b"ZCOD", StoryKind::ZCode),
        "ulx" => InferredType::story(*b"GLUL", StoryKind::Glulx),
        "ifiction" => InferredType::plain(*b"IFmd"),
        _ => {
            return Err(BlorbError::UnrecognizedExtension {
                line,
                extension: extension.clone(),
                path: path.to_path_buf(),
            })
        }
    };

    Ok(inferred)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(Usage::resolve("pict"), Some(Usage::Picture));
        assert_eq!(Usage::resolve("PIC"), Some(Usage::Picture));
        assert_eq!(Usage::resolve("Picture"), Some(Usage::Picture));
        assert_eq!(Usage::resolve("music"), Some(Usage::Sound));
        assert_eq!(Usage::resolve("code"), Some(Usage::Executable));
        assert_eq!(Usage::resolve("biblio"), Some(Usage::Metadata));
        assert_eq!(Usage::resolve("Cover"), Some(Usage::Frontispiece));
    }

    #[test]
    fn test_resolve_rejects_partial_words() {
        assert_eq!(Usage::resolve("PI"), None);
        assert_eq!(Usage::resolve("ICT"), None);
        assert_eq!(Usage::resolve("SOUNDS"), None);
        assert_eq!(Usage::resolve(""), None);
        assert_eq!(Usage::resolve("video"), None);
    }

    #[test]
    fn test_permitted_types() {
        assert!(Usage::Picture.accepts(ChunkId::padded("PNG")));
        assert!(Usage::Picture.accepts(ChunkId::padded("JPEG")));
        assert!(!Usage::Picture.accepts(ChunkId::padded("OGGV")));
        assert!(Usage::Sound.accepts(ChunkId::padded("MOD")));
        assert!(Usage::Executable.accepts(ChunkId::padded("AGT")));
        assert!(!Usage::Executable.accepts(ChunkId::padded("PNG")));
        assert!(!Usage::Metadata.accepts(ChunkId::IFMD));
    }

    #[test]
    fn test_index_tags() {
        assert_eq!(Usage::Sound.tag().as_bytes(), b"Snd ");
        assert_eq!(Usage::from_index_tag(ChunkId::padded("Pict")), Some(Usage::Picture));
        assert_eq!(Usage::from_index_tag(ChunkId::IFMD), None);
    }

    #[test]
    fn test_infer_type() {
        let png = infer_type(Path::new("art/Cover.PNG"), 1).unwrap();
        assert_eq!(png.kind, ChunkId::padded("PNG"));
        assert_eq!(png.story, None);

        let story = infer_type(Path::new("story.z8"), 1).unwrap();
        assert_eq!(story.kind, ChunkId::padded("ZCOD"));
        assert_eq!(story.story, Some(StoryKind::ZCode));

        let glulx = infer_type(Path::new("story.ulx"), 1).unwrap();
        assert_eq!(glulx.story, Some(StoryKind::Glulx));

        assert_eq!(
            infer_type(Path::new("meta.iFiction"), 1).unwrap().kind,
            ChunkId::IFMD
        );
    }

    #[test]
    fn test_infer_type_unknown_extension() {
        let err = infer_type(Path::new("movie.xyz"), 4).unwrap_err();
        match err {
            BlorbError::UnrecognizedExtension { line, extension, path } => {
                assert_eq!(line, 4);
                assert_eq!(extension, "xyz");
                assert_eq!(path, Path::new("movie.xyz"));
            }
            other => panic!("Expected UnrecognizedExtension, got: {:?}", other),
        }

        assert!(infer_type(Path::new("README"), 1).is_err());
    }
}
