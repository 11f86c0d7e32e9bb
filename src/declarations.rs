//! Inform include file (`.bli`) naming every picture and sound resource
//!
//! ```text
//! ! Resources include file for Inform
//! ! Generated by bresc (bresc) v0.32 Serial 20091218 on 18/12/2009 10:00:00
//!
//! message "Including resources file by bresc, on 18/12/2009 10:00:00";
//!
//! Constant myPic 3;	! Pict: 'cover.png'
//! Constant sndTheme 3;	! Snd: 'theme.ogg'
//! ```

use crate::catalog::Declaration;
use crate::error::Result;
use crate::{APP_NAME, VERSION};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Timestamp format used in the file header
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Current local time, formatted for the header
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Constant name for a declaration: its symbol, or one built from the file name
pub fn constant_name(declaration: &Declaration) -> String {
    if let Some(symbol) = declaration.symbol.as_deref().filter(|s| !s.is_empty()) {
        return symbol.to_string();
    }

    // Everything up to the first dot: "theme.v2.ogg" gives "theme"
    let file_name = declaration
        .path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    let mut chars = stem.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    format!("{}{}", declaration.usage.declaration_prefix(), capitalized)
}

/// Writes declarations in Inform syntax
pub struct DeclarationsWriter<W: Write> {
    writer: W,
}

impl DeclarationsWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> DeclarationsWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Header comments and the compile-time message
    pub fn write_header(&mut self, program: &str, timestamp: &str) -> Result<()> {
        write!(
            self.writer,
            "! Resources include file for Inform\n\
             ! Generated by {} ({}) {} on {}\n\n",
            program, APP_NAME, VERSION, timestamp
        )?;
        write!(
            self.writer,
            "message \"Including resources file by {}, on {}\";\n\n",
            APP_NAME, timestamp
        )?;
        Ok(())
    }

    pub fn write_declaration(&mut self, declaration: &Declaration) -> Result<()> {
        let file_name = declaration
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        writeln!(
            self.writer,
            "Constant {} {};\t! {}: '{}'",
            constant_name(declaration),
            declaration.resource,
            declaration.usage,
            file_name
        )?;
        Ok(())
    }

    /// Header followed by every declaration
    pub fn write_all(
        &mut self,
        program: &str,
        timestamp: &str,
        declarations: &[Declaration],
    ) -> Result<()> {
        self.write_header(program, timestamp)?;
        for declaration in declarations {
            self.write_declaration(declaration)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
