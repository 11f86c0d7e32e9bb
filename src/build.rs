//! One complete build: control list → catalog → index → container and declarations

use crate::catalog::ResourceCatalog;
use crate::config::{BuildOptions, OutputPaths};
use crate::container::{ContainerWriter, IndexBuilder};
use crate::declarations::{timestamp_now, DeclarationsWriter};
use crate::error::{BlorbError, Result};
use crate::report::BuildReport;
use crate::APP_NAME;
use std::fs::File;
use std::io::BufReader;
use tracing::info;

/// Drives a build from a control list to its output files
///
/// Outputs written before a failure are left on disk.
#[derive(Debug, Clone)]
pub struct BlorbBuild {
    paths: OutputPaths,
    options: BuildOptions,
    program: String,
    timestamp: Option<String>,
}

impl BlorbBuild {
    pub fn new(paths: OutputPaths, options: BuildOptions) -> Self {
        Self {
            paths,
            options,
            program: APP_NAME.to_string(),
            timestamp: None,
        }
    }

    /// Program name recorded in the declarations header
    pub fn program(mut self, name: &str) -> Self {
        self.program = name.to_string();
        self
    }

    /// Fixed declarations timestamp instead of the current local time
    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn run(&self) -> Result<BuildReport> {
        let control = &self.paths.control;
        let file = File::open(control).map_err(|source| BlorbError::UnreadableControlFile {
            path: control.clone(),
            source,
        })?;

        let mut catalog =
            ResourceCatalog::new(self.paths.base_dir()).index_only(self.options.index_only);
        catalog.read_control_list(BufReader::new(file))?;
        let contents = catalog.finish()?;

        info!(
            control = %control.display(),
            chunks = contents.chunks.len(),
            declarations = contents.declarations.len(),
            dropped = contents.dropped.len(),
            "Control list read"
        );

        let (index, patches) = IndexBuilder::build(&contents.chunks)?;
        info!(entries = patches.len(), "Resource index built");

        let mut container = None;
        let mut layout = None;
        if self.options.writes_container() {
            let path =
                self.paths
                    .container_path(&self.options, contents.has_metadata, contents.story);
            let mut writer = ContainerWriter::create(&path)?;
            layout = Some(writer.write(&index, &contents.chunks, &patches)?);
            writer.into_inner()?;
            info!(path = %path.display(), "Container saved");
            container = Some(path);
        }

        let mut declarations = None;
        if self.options.writes_declarations() {
            let path = self.paths.declarations.clone();
            let timestamp = self.timestamp.clone().unwrap_or_else(timestamp_now);
            DeclarationsWriter::create(&path)?.write_all(
                &self.program,
                &timestamp,
                &contents.declarations,
            )?;
            info!(path = %path.display(), count = contents.declarations.len(), "Declarations saved");
            declarations = Some(path);
        }

        let mut report = BuildReport::new(&index, &contents.chunks, layout.as_ref());
        report.container = container;
        report.declarations = declarations;
        report.dropped = contents.dropped;
        Ok(report)
    }
}
