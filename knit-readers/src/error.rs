//! Error types for reader operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a document
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source (or an intermediate file) could not be resolved or read
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// No registered reader claims the file's extension
    #[error("No reader registered for '{}'", .path.display())]
    NoReader { path: PathBuf },
    /// The reader exists but its capability check failed
    #[error("Reader '{name}' is disabled")]
    Disabled { name: String },
    /// A metadata value could not be interpreted
    #[error("Invalid metadata '{key}': {message}")]
    Metadata { key: String, message: String },
    /// The rendering engine failed; the engine's error is kept as-is
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ReadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReadError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by a [`crate::renderer::Renderer`]
#[derive(Debug, Error)]
pub enum RenderError {
    /// The engine is not installed or cannot be loaded
    #[error("Rendering engine not available: {0}")]
    Unavailable(String),
    /// The engine process could not be started
    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The engine ran and reported failure
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    /// The engine reported success but wrote nothing at the destination
    #[error("Renderer did not produce '{}'", .path.display())]
    MissingOutput { path: PathBuf },
    /// Error raised by an in-process engine
    #[error("Engine error: {0}")]
    Engine(String),
}
