//! blorb-rs: Blorb resource compiler
//!
//! Packages the resources of an interactive-fiction story (pictures, sounds,
//! the story file, bibliographic metadata and a cover picture) into a Blorb
//! container (`FORM`/`IFRS`), and writes an Inform include file naming every
//! picture and sound resource.
//!
//! # Example
//!
//! ```no_run
//! use blorb_rs::{BlorbBuild, BuildOptions, OutputPaths};
//!
//! // Reads story.res, writes story.zblorb and story.bli
//! let paths = OutputPaths::new("story", None);
//! let report = BlorbBuild::new(paths, BuildOptions::default()).run()?;
//! println!("{}", report);
//! # Ok::<(), blorb_rs::BlorbError>(())
//! ```

pub mod build;
pub mod catalog;
pub mod config;
pub mod container;
pub mod declarations;
pub mod error;
pub mod registry;
pub mod report;

/// Name shown in banners and declarations headers
pub const APP_NAME: &str = "bresc";

/// Release string
pub const VERSION: &str = "v0.32 Serial 20091218";

pub use build::BlorbBuild;
pub use catalog::{CatalogContents, ControlList, Declaration, ResourceCatalog, ResourceCounters};
pub use config::{BuildOptions, OutputPaths, Personality};
pub use container::{
    Chunk, ChunkId, ChunkUsage, ContainerReader, ContainerWriter, IndexBuilder, IndexEntry,
    PatchTable, MAX_CHUNKS,
};
pub use declarations::DeclarationsWriter;
pub use error::{BlorbError, Result};
pub use registry::{infer_type, StoryKind, Usage};
pub use report::BuildReport;
