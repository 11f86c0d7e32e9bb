//! Build configuration: options, program personalities and output naming
//!
//! Options come from three layers, later ones winning:
//! 1. an optional TOML file (`BuildOptions::load`)
//! 2. command-line flags
//! 3. the personality implied by the invoked program name
//!
//! ```toml
//! index_only = false
//! skip_declarations = false
//! short_extension = true
//! verbose = false
//! ```

use crate::error::{BlorbError, Result};
use crate::registry::StoryKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension of control lists
pub const CONTROL_EXT: &str = "res";

/// Extension of Inform declaration files
pub const DECLARATIONS_EXT: &str = "bli";

/// Generic container extension
pub const BLORB_EXT: &str = "blb";

/// Container extension for Z-machine stories
pub const ZBLORB_EXT: &str = "zblorb";

/// Container extension for Glulx stories
pub const GBLORB_EXT: &str = "gblorb";

/// Flags controlling one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Only write the declarations file; unreadable resources become warnings
    pub index_only: bool,
    /// Do not write the declarations file
    pub skip_declarations: bool,
    /// Always name containers `.blb`
    pub short_extension: bool,
    /// Produce the chunk report
    pub verbose: bool,
}

impl BuildOptions {
    /// Parse options from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BlorbError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Turn on every flag set in `other`
    pub fn merge(&mut self, other: &BuildOptions) {
        self.index_only |= other.index_only;
        self.skip_declarations |= other.skip_declarations;
        self.short_extension |= other.short_extension;
        self.verbose |= other.verbose;
    }

    pub fn writes_container(&self) -> bool {
        !self.index_only
    }

    pub fn writes_declarations(&self) -> bool {
        !self.skip_declarations
    }
}

/// Behaviour selected by the name the program was invoked as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Container and declarations
    Bresc,
    /// Declarations only
    Bres,
    /// Container only, `.blb` extension (the classic `blc` packager)
    Blc,
}

impl Personality {
    /// Pick the personality from `argv[0]`
    pub fn from_program_name(program: &str) -> Result<Self> {
        let stem = Path::new(program)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match stem.as_str() {
            "bresc" => Ok(Personality::Bresc),
            "bres" => Ok(Personality::Bres),
            "blc" => Ok(Personality::Blc),
            _ => Err(BlorbError::UnsupportedPersonality(stem)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Personality::Bresc => "bresc",
            Personality::Bres => "bres",
            Personality::Blc => "blc",
        }
    }

    /// Force the flags this personality implies
    pub fn apply(&self, options: &mut BuildOptions) {
        match self {
            Personality::Bresc => {}
            Personality::Bres => {
                options.index_only = true;
                options.skip_declarations = false;
            }
            Personality::Blc => {
                options.index_only = false;
                options.skip_declarations = true;
                options.short_extension = true;
            }
        }
    }
}

/// Pick the container extension
///
/// Z-machine stories get `.zblorb`; Glulx stories get `.gblorb` only when
/// bibliographic metadata is packaged, otherwise the generic `.blb`.
pub fn container_extension(
    short_extension: bool,
    has_metadata: bool,
    story: Option<StoryKind>,
) -> &'static str {
    let glulx = story == Some(StoryKind::Glulx);
    if short_extension {
        BLORB_EXT
    } else if has_metadata && glulx {
        GBLORB_EXT
    } else if !glulx {
        ZBLORB_EXT
    } else {
        BLORB_EXT
    }
}

/// File names involved in one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// The control list (input with a `.res` extension)
    pub control: PathBuf,
    /// The declarations file (input with a `.bli` extension)
    pub declarations: PathBuf,
    /// Container path given explicitly, if any
    pub container: Option<PathBuf>,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(input: P, output: Option<PathBuf>) -> Self {
        let control = input.as_ref().with_extension(CONTROL_EXT);
        let declarations = control.with_extension(DECLARATIONS_EXT);
        Self {
            control,
            declarations,
            container: output,
        }
    }

    /// Container path, derived from the control list unless given explicitly
    pub fn container_path(
        &self,
        options: &BuildOptions,
        has_metadata: bool,
        story: Option<StoryKind>,
    ) -> PathBuf {
        match &self.container {
            Some(path) => path.clone(),
            None => self.control.with_extension(container_extension(
                options.short_extension,
                has_metadata,
                story,
            )),
        }
    }

    /// Directory relative resource paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.control
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}
