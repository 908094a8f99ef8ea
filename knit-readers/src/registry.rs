//! Reader registry for extension-based dispatch
//!
//! This module maps file extensions to readers. Registering a reader installs
//! it for every extension it declares; the last registration for an extension
//! wins. Disabled readers are never installed.

use crate::error::ReadError;
use crate::plugin::{KnitrPlugin, Plugin};
use crate::reader::{ReadOutput, Reader};
use crate::readers::MarkdownReader;
use knit_config::Settings;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Registry of document readers keyed by file extension
///
/// # Examples
///
/// ```ignore
/// let mut registry = ReaderRegistry::new();
/// registry.register(MarkdownReader);
///
/// let output = registry.read(Path::new("content/posts/hello.md"))?;
/// ```
#[derive(Default)]
pub struct ReaderRegistry {
    readers: HashMap<String, Arc<dyn Reader>>,
}

impl ReaderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ReaderRegistry {
            readers: HashMap::new(),
        }
    }

    /// Register a reader for each of its extensions
    ///
    /// Returns `false` (and registers nothing) if the reader is disabled.
    pub fn register<R: Reader + 'static>(&mut self, reader: R) -> bool {
        self.register_shared(Arc::new(reader))
    }

    /// Register an already shared reader
    pub fn register_shared(&mut self, reader: Arc<dyn Reader>) -> bool {
        if !reader.enabled() {
            debug!(reader = reader.name(), "skipping disabled reader");
            return false;
        }
        for extension in reader.file_extensions() {
            self.readers
                .insert((*extension).to_string(), Arc::clone(&reader));
        }
        true
    }

    /// Get the reader registered for an extension (without the dot)
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Reader>> {
        self.readers.get(extension)
    }

    /// Check if an extension has a reader
    pub fn has(&self, extension: &str) -> bool {
        self.readers.contains_key(extension)
    }

    /// List all registered extensions (sorted)
    pub fn list_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<_> = self.readers.keys().cloned().collect();
        extensions.sort();
        extensions
    }

    /// Reader claiming `path`, matched exactly on its extension
    pub fn reader_for_path(&self, path: &Path) -> Option<&Arc<dyn Reader>> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;
        self.get(extension)
    }

    /// Read `path` with the reader registered for its extension
    pub fn read(&self, path: &Path) -> Result<ReadOutput, ReadError> {
        let reader = self
            .reader_for_path(path)
            .ok_or_else(|| ReadError::NoReader {
                path: path.to_path_buf(),
            })?;
        reader.read(path)
    }

    /// Create a registry with the built-in readers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MarkdownReader);
        registry
    }

    /// Built-in readers, then the init hook of every plugin active in `settings`
    pub fn with_plugins(settings: &Settings, plugins: &[&dyn Plugin]) -> Self {
        let mut registry = Self::with_defaults();
        for plugin in plugins {
            if settings.has_plugin(plugin.name()) {
                plugin.readers_init(&mut registry, settings);
            } else {
                debug!(plugin = plugin.name(), "plugin not listed in settings");
            }
        }
        registry
    }

    /// Built-in readers plus the plugins shipped with this crate
    pub fn with_builtin_plugins(settings: &Settings) -> Self {
        let knitr = KnitrPlugin::new();
        Self::with_plugins(settings, &[&knitr])
    }
}
