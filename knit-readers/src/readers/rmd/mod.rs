//! R Markdown reader
//!
//! R Markdown (`.Rmd`) sources are knitted to Markdown by an external engine,
//! then handed to the [`MarkdownReader`]. The reader never parses R Markdown
//! itself.
//!
//! # Read cycle
//!
//!     idle → directory changed → rendered → delegated → cleaned up → idle
//!
//!     1. Resolve the source path (missing files fail here, before anything
//!        else happens).
//!     2. Derive the [`RenderJob`]: `posts/example.Rmd` renders to
//!        `example.md` in the content root, with figures under
//!        `figure/example/`.
//!     3. Enter a [`WorkdirScope`] on the content root. knitr resolves
//!        relative output paths against the working directory and has no
//!        other way to keep figure links relative.
//!     4. Render, then read the intermediate file with the Markdown reader.
//!     5. Drop the scope: the intermediate file is deleted and the previous
//!        directory restored, on success and on every error path.
//!
//! Errors from the engine and from the Markdown reader are returned as-is.
//! There are no retries and no timeout; a hung engine hangs the read.

pub mod job;

use crate::error::ReadError;
use crate::reader::{ReadOutput, Reader};
use crate::readers::markdown::MarkdownReader;
use crate::renderer::{default_renderer, Renderer};
use crate::workdir::WorkdirScope;
use knit_config::Settings;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub use job::RenderJob;

/// Reader for R Markdown files
pub struct RmdReader {
    markdown: MarkdownReader,
    renderer: Arc<dyn Renderer>,
    content_root: PathBuf,
    enabled: bool,
}

impl RmdReader {
    pub const EXTENSIONS: &'static [&'static str] = &["Rmd", "rmd"];

    /// Build a reader rendering into `content_root` with `renderer`.
    ///
    /// Availability is checked once, here.
    pub fn new(content_root: impl Into<PathBuf>, renderer: Arc<dyn Renderer>) -> Self {
        let markdown = MarkdownReader;
        let enabled = markdown.enabled() && renderer.is_available();
        Self {
            markdown,
            renderer,
            content_root: content_root.into(),
            enabled,
        }
    }

    /// Reader for a site: content root from `settings.path`, engine from
    /// `settings.knitr`.
    pub fn from_settings(settings: &Settings) -> std::io::Result<Self> {
        Ok(Self::new(
            settings.content_root()?,
            default_renderer(settings),
        ))
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Resolve `source` and derive its render job.
    ///
    /// Both the source and a relative content root resolve against the
    /// current directory, so every path in the job stays valid after the
    /// switch into the content root.
    pub fn job_for(&self, source: &Path) -> Result<RenderJob, ReadError> {
        let content_root = std::path::absolute(&self.content_root)
            .map_err(|e| ReadError::io(&self.content_root, e))?;
        let source = source
            .canonicalize()
            .map_err(|e| ReadError::io(source, e))?;
        Ok(RenderJob::new(source, content_root))
    }
}

impl fmt::Debug for RmdReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RmdReader")
            .field("renderer", &self.renderer.name())
            .field("content_root", &self.content_root)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Reader for RmdReader {
    fn name(&self) -> &str {
        "rmd"
    }

    fn description(&self) -> &str {
        "R Markdown rendered with knitr"
    }

    fn file_extensions(&self) -> &[&str] {
        Self::EXTENSIONS
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn read(&self, path: &Path) -> Result<ReadOutput, ReadError> {
        if !self.enabled {
            return Err(ReadError::Disabled {
                name: self.name().to_string(),
            });
        }

        let job = self.job_for(path)?;
        debug!(
            source = %job.source.display(),
            destination = %job.destination.display(),
            figures = %job.figure_path,
            "derived render job"
        );

        let mut scope =
            WorkdirScope::enter(&job.working_dir).map_err(|e| ReadError::io(&job.working_dir, e))?;
        scope.track(job.output_path());

        self.renderer.render(&job)?;
        info!(source = %job.source.display(), renderer = self.renderer.name(), "knitted");
        self.markdown.read(&job.output_path())
    }
}
