//! Plugin hooks
//!
//! A [`Plugin`] is given the registry once the built-in readers are in place,
//! and may add or replace readers. Plugins run only when their name appears in
//! the site's `plugins` list.

use crate::reader::Reader;
use crate::readers::RmdReader;
use crate::registry::ReaderRegistry;
use crate::renderer::{default_renderer, Renderer};
use knit_config::Settings;
use std::sync::Arc;
use tracing::{info, warn};

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Called once while the reader registry is being set up.
    fn readers_init(&self, registry: &mut ReaderRegistry, settings: &Settings);
}

/// Registers [`RmdReader`] for `.Rmd`/`.rmd` when a knitr engine is available.
#[derive(Default)]
pub struct KnitrPlugin {
    renderer: Option<Arc<dyn Renderer>>,
}

impl KnitrPlugin {
    /// Plugin that detects the engine from the site settings.
    pub fn new() -> Self {
        Self { renderer: None }
    }

    /// Plugin using a specific engine.
    pub fn with_renderer(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }
}

impl Plugin for KnitrPlugin {
    fn name(&self) -> &str {
        "knitr"
    }

    fn readers_init(&self, registry: &mut ReaderRegistry, settings: &Settings) {
        let content_root = match settings.content_root() {
            Ok(root) => root,
            Err(err) => {
                warn!(error = %err, "cannot resolve content root; R Markdown reader disabled");
                return;
            }
        };
        let renderer = self
            .renderer
            .clone()
            .unwrap_or_else(|| default_renderer(settings));
        let reader = RmdReader::new(content_root, renderer);

        if !reader.enabled() {
            warn!(
                renderer = reader.renderer().name(),
                "knitr is not available; .Rmd files will not be read"
            );
            return;
        }

        info!(extensions = ?RmdReader::EXTENSIONS, "registered R Markdown reader");
        registry.register(reader);
    }
}
