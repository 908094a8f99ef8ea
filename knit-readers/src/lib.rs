//! Document readers for a static site
//!
//!     This crate turns source files into the `(content, metadata)` pairs a static-site
//!     generator publishes. Content is HTML; metadata is a map of lowercased keys to typed
//!     values (text, lists, dates).
//!
//!     TLDR: For reader authors:
//!         - A reader claims file extensions and implements `read(path)`, see [./reader.rs]
//!         - Readers never render Markdown themselves; the Markdown reader is the one
//!           place comrak is driven. Other formats convert to Markdown and delegate.
//!         - Readers for optional external tools report `enabled() == false` when the tool
//!           is missing. The registry refuses disabled readers, so nothing fails at read time.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # ReadError, RenderError
//!     ├── reader.rs               # Reader trait, ReadOutput
//!     ├── metadata.rs             # Header parsing and typed metadata values
//!     ├── registry.rs             # ReaderRegistry: extension → reader
//!     ├── plugin.rs               # Plugin hook, KnitrPlugin
//!     ├── renderer.rs             # Renderer capability, Rscript engine
//!     ├── workdir.rs              # WorkdirScope: locked, self-restoring chdir
//!     ├── readers
//!     │   ├── markdown.rs         # Markdown reader (the native reader)
//!     │   └── rmd                 # R Markdown → knitr → Markdown reader
//!     └── lib.rs
//!
//! R Markdown
//!
//!     knitr is an R package, so R Markdown support depends on an R installation. The
//!     engine is abstracted behind [`renderer::Renderer`]; the shipped implementation runs
//!     `Rscript`. Tests inject stub engines.
//!
//!     knitr writes relative to the process working directory, which is why
//!     [`readers::RmdReader`] switches directories for the length of one read. The switch
//!     is serialized process-wide and always undone, see [./workdir.rs].
//!
//!     This is a pure lib: it never prints and only reads the environment to locate
//!     `Rscript`.

pub mod error;
pub mod metadata;
pub mod plugin;
pub mod reader;
pub mod readers;
pub mod registry;
pub mod renderer;
pub mod workdir;

pub use error::{ReadError, RenderError};
pub use metadata::{Metadata, MetadataValue};
pub use plugin::{KnitrPlugin, Plugin};
pub use reader::{ReadOutput, Reader};
pub use readers::{MarkdownReader, RenderJob, RmdReader};
pub use registry::ReaderRegistry;
pub use renderer::{Renderer, UnavailableRenderer};
pub use workdir::WorkdirScope;
