//! Render jobs: everything one knitr invocation needs, derived from the source
//! path and the content root.

use std::path::{Path, PathBuf};

/// Link base handed to knitr. The site generator rewrites it to the
/// document's final URL.
pub const BASE_URL: &str = "{filename}";

/// Root directory (relative to the content root) for generated figures.
pub const FIGURE_ROOT: &str = "figure";

pub const ENCODING: &str = "UTF-8";

/// A single render of one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Absolute path of the R Markdown source.
    pub source: PathBuf,
    /// Bare file name of the rendered Markdown, relative to `working_dir`.
    pub destination: PathBuf,
    /// Directory the engine runs in; the content root.
    pub working_dir: PathBuf,
    /// knitr `base.dir`: only decides where figure files land.
    pub base_dir: PathBuf,
    /// knitr `base.url`.
    pub base_url: String,
    /// knitr `fig.path`, e.g. `figure/example/`.
    pub figure_path: String,
    pub encoding: String,
}

impl RenderJob {
    pub fn new(source: impl Into<PathBuf>, content_root: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let content_root = content_root.into();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            destination: PathBuf::from(format!("{stem}.md")),
            figure_path: format!("{FIGURE_ROOT}/{stem}/"),
            working_dir: content_root.clone(),
            base_dir: content_root,
            base_url: BASE_URL.to_string(),
            encoding: ENCODING.to_string(),
            source,
        }
    }

    /// Where the intermediate Markdown ends up.
    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.destination)
    }

    /// The equivalent knitr program, for diagnostics.
    ///
    /// Values are quoted as R string literals. The renderer itself never
    /// evaluates this text; it passes the fields as arguments.
    pub fn knit_script(&self) -> String {
        format!(
            "require(knitr)\n\n\
             opts_knit$set(base.dir = {}, base.url = {})\n\
             opts_chunk$set(fig.path = {})\n\
             knit({}, {}, encoding = {})\n",
            r_string(&path_str(&self.base_dir)),
            r_string(&self.base_url),
            r_string(&self.figure_path),
            r_string(&path_str(&self.source)),
            r_string(&path_str(&self.destination)),
            r_string(&self.encoding),
        )
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn r_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
