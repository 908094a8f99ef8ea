//! Reader implementations
//!
//! This module contains the readers that turn source files into
//! `(content, metadata)` pairs.

pub mod markdown;
pub mod rmd;

pub use markdown::MarkdownReader;
pub use rmd::{RenderJob, RmdReader};
