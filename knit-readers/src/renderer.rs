//! Rendering engines for R Markdown.
//!
//! A [`Renderer`] runs knitr for one [`RenderJob`] and leaves the rendered
//! Markdown at [`RenderJob::output_path`]. The engine is optional: readers ask
//! [`Renderer::is_available`] up front and disable themselves instead of
//! failing at read time.
//!
//! [`RscriptRenderer`] shells out to `Rscript`. The knitr program is fixed and
//! the job fields travel as positional arguments, so paths containing quotes
//! or backslashes reach knitr unchanged.

use crate::error::RenderError;
use crate::readers::rmd::job::RenderJob;
use knit_config::Settings;
use std::sync::Arc;

/// Capability interface over a rendering engine.
pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the engine is installed and loadable.
    fn is_available(&self) -> bool;

    /// Render `job.source` to `job.destination`, resolved against the current
    /// working directory (the caller switches to `job.working_dir` first).
    fn render(&self, job: &RenderJob) -> Result<(), RenderError>;
}

/// Stand-in used when no engine could be found.
#[derive(Debug, Clone)]
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Renderer for UnavailableRenderer {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn render(&self, _job: &RenderJob) -> Result<(), RenderError> {
        Err(RenderError::Unavailable(self.reason.clone()))
    }
}

/// Pick the engine configured for this site.
#[cfg(feature = "rscript")]
pub fn default_renderer(settings: &Settings) -> Arc<dyn Renderer> {
    match rscript::resolve_rscript_binary(settings.knitr.rscript.as_deref()) {
        Some(program) => Arc::new(rscript::RscriptRenderer::new(program)),
        None => Arc::new(UnavailableRenderer::new(
            "Rscript not found. Set KNIT_RSCRIPT_BIN or knitr.rscript to override the detection.",
        )),
    }
}

#[cfg(not(feature = "rscript"))]
pub fn default_renderer(_settings: &Settings) -> Arc<dyn Renderer> {
    Arc::new(UnavailableRenderer::new(
        "built without the `rscript` feature",
    ))
}

#[cfg(feature = "rscript")]
pub mod rscript {
    use super::Renderer;
    use crate::error::RenderError;
    use crate::readers::rmd::job::RenderJob;
    use once_cell::sync::OnceCell;
    use std::env;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Stdio};
    use tracing::debug;
    use which::which;

    /// Arguments: base.dir, base.url, fig.path, input, output, encoding.
    const KNIT_PROGRAM: &str = "a <- commandArgs(trailingOnly = TRUE); \
        suppressPackageStartupMessages(library(knitr)); \
        opts_knit$set(base.dir = a[1], base.url = a[2]); \
        opts_chunk$set(fig.path = a[3]); \
        invisible(knit(a[4], a[5], encoding = a[6], quiet = TRUE))";

    const PROBE_PROGRAM: &str =
        "quit(status = if (requireNamespace('knitr', quietly = TRUE)) 0L else 1L)";

    /// Runs knitr through an `Rscript` binary.
    #[derive(Debug)]
    pub struct RscriptRenderer {
        program: PathBuf,
        available: OnceCell<bool>,
    }

    impl RscriptRenderer {
        pub fn new(program: impl Into<PathBuf>) -> Self {
            Self {
                program: program.into(),
                available: OnceCell::new(),
            }
        }

        pub fn program(&self) -> &Path {
            &self.program
        }

        fn probe(&self) -> bool {
            let status = Command::new(&self.program)
                .arg("-e")
                .arg(PROBE_PROGRAM)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(status) => {
                    debug!(program = %self.program.display(), %status, "probed knitr");
                    status.success()
                }
                Err(err) => {
                    debug!(program = %self.program.display(), error = %err, "Rscript probe failed");
                    false
                }
            }
        }
    }

    impl Renderer for RscriptRenderer {
        fn name(&self) -> &str {
            "rscript"
        }

        fn is_available(&self) -> bool {
            *self.available.get_or_init(|| self.probe())
        }

        fn render(&self, job: &RenderJob) -> Result<(), RenderError> {
            let output = Command::new(&self.program)
                .arg("-e")
                .arg(KNIT_PROGRAM)
                .arg(&job.base_dir)
                .arg(&job.base_url)
                .arg(&job.figure_path)
                .arg(&job.source)
                .arg(&job.destination)
                .arg(&job.encoding)
                .current_dir(&job.working_dir)
                .stdin(Stdio::null())
                .output()
                .map_err(|source| RenderError::Launch {
                    program: self.program.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(RenderError::Failed {
                    program: self.program.display().to_string(),
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            let rendered = job.output_path();
            if !rendered.exists() {
                return Err(RenderError::MissingOutput { path: rendered });
            }
            Ok(())
        }
    }

    /// Locate `Rscript`: explicit setting, `KNIT_RSCRIPT_BIN`, `PATH`, then
    /// the usual install locations.
    pub fn resolve_rscript_binary(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            if !path.as_os_str().is_empty() {
                return Some(path.to_path_buf());
            }
        }

        if let Some(path) = env::var_os("KNIT_RSCRIPT_BIN") {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        if let Ok(path) = which("Rscript") {
            return Some(path);
        }

        #[cfg(target_os = "macos")]
        {
            let candidates = [
                "/Library/Frameworks/R.framework/Resources/bin/Rscript",
                "/opt/homebrew/bin/Rscript",
                "/usr/local/bin/Rscript",
            ];
            for candidate in candidates {
                let path = PathBuf::from(candidate);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            let candidates = ["/usr/bin/Rscript", "/usr/local/bin/Rscript", "/opt/R/bin/Rscript"];
            for candidate in candidates {
                let path = PathBuf::from(candidate);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

}
