//! Site settings for the knit toolchain.
//!
//! `defaults/site.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Each build [`Profile`] adds its own embedded
//! overlay, and applications layer user-specific files on top via [`Loader`]
//! before deserializing into [`Settings`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

const DEFAULT_TOML: &str = include_str!("../defaults/site.default.toml");
const DEV_TOML: &str = include_str!("../defaults/profile.dev.toml");
const PRODUCTION_TOML: &str = include_str!("../defaults/profile.production.toml");

/// Build profile selecting which overlay sits on top of the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Local preview: relative URLs, feeds disabled.
    #[default]
    Dev,
    /// Publishing build: absolute URLs and feeds.
    Production,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Dev => "dev",
            Profile::Production => "production",
        }
    }

    fn overlay(&self) -> &'static str {
        match self {
            Profile::Dev => DEV_TOML,
            Profile::Production => PRODUCTION_TOML,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "local" | "development" => Ok(Profile::Dev),
            "production" | "prod" | "publish" => Ok(Profile::Production),
            other => Err(format!("Unknown profile '{other}' (expected dev or production)")),
        }
    }
}

/// Top-level settings consumed by readers and plugins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub author: String,
    pub sitename: String,
    pub sitesubtitle: String,
    pub siteurl: String,
    pub site_summary: String,
    pub markup: Vec<String>,
    pub plugin_paths: Vec<String>,
    pub plugins: Vec<String>,
    pub theme: String,
    /// Content root, relative paths resolve against the process directory.
    pub path: PathBuf,
    pub static_paths: Vec<String>,
    pub article_paths: Vec<String>,
    pub ignore_files: Vec<String>,
    pub timezone: String,
    pub default_lang: String,
    pub relative_urls: bool,
    pub delete_output_directory: bool,
    pub default_pagination: usize,
    pub related_posts_max: usize,
    pub feeds: FeedConfig,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub social: Vec<Link>,
    #[serde(default)]
    pub theme_options: BTreeMap<String, String>,
    #[serde(default)]
    pub knitr: KnitrConfig,
}

/// Atom/RSS feed locations. Paths containing `%s` are per category or tag.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    pub enabled: bool,
    /// Empty means "same as `siteurl`".
    pub domain: String,
    pub all_atom: String,
    pub category_atom: String,
    pub tag_atom: String,
    pub translation_atom: Option<String>,
    pub author_atom: Option<String>,
    pub author_rss: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

/// Knobs for the R Markdown reader.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KnitrConfig {
    /// Explicit `Rscript` binary; when unset the reader searches the environment.
    pub rscript: Option<PathBuf>,
}

impl Settings {
    /// Absolute content root. A relative `path` is
    /// joined onto the current working directory at call time.
    pub fn content_root(&self) -> std::io::Result<PathBuf> {
        if self.path.is_absolute() {
            Ok(self.path.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.path))
        }
    }

    /// Whether `name` appears in the active plugin list.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p == name)
    }

    /// True if any `ignore_files` entry matches a contiguous run of the
    /// path's components (`content/draft` ignores `content/draft/a.md`).
    pub fn is_ignored(&self, path: impl AsRef<Path>) -> bool {
        let parts = normal_components(path.as_ref());
        self.ignore_files.iter().any(|entry| {
            let needle = normal_components(Path::new(entry));
            !needle.is_empty()
                && parts
                    .windows(needle.len())
                    .any(|window| window == needle.as_slice())
        })
    }
}

fn normal_components(path: &Path) -> Vec<&std::ffi::OsStr> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Start a loader seeded with the defaults plus a profile overlay.
    pub fn for_profile(profile: Profile) -> Self {
        let mut loader = Self::new();
        loader.builder = loader
            .builder
            .add_source(File::from_str(profile.overlay(), FileFormat::Toml));
        loader
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting settings.
    pub fn build(self) -> Result<Settings, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<Settings, ConfigError> {
    Loader::new().build()
}
