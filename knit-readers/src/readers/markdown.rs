//! Markdown reader
//!
//! Converts Markdown sources to HTML plus metadata.
//! Pipeline: source → metadata header split → typed metadata → comrak HTML
//!
//! # Library Choice
//!
//! We use the `comrak` crate for rendering, with the GitHub-flavoured
//! extensions turned on (tables, strikethrough, autolinks, footnotes).
//! Raw HTML is passed through: knitr emits HTML widgets and `<img>` tags
//! for some chunk outputs.

use crate::error::ReadError;
use crate::metadata::{process_fields, split_header};
use crate::reader::{ReadOutput, Reader};
use comrak::{markdown_to_html, ComrakOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Intrasite link placeholders (`{filename}`, `{static}`, ...) after comrak has
/// percent-encoded the braces inside link destinations.
static ENCODED_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%7[Bb](?P<what>[A-Za-z_]+)%7[Dd]").unwrap());

/// Reader implementation for Markdown
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownReader;

impl MarkdownReader {
    pub const EXTENSIONS: &'static [&'static str] = &["md", "markdown", "mkd", "mdown"];

    /// Parse Markdown text that has already been loaded.
    pub fn read_str(&self, source: &str) -> Result<ReadOutput, ReadError> {
        let (fields, body) = split_header(source);
        let metadata = process_fields(fields, render_html)?;
        let content = render_html(body);
        Ok(ReadOutput::new(content, metadata))
    }
}

impl Reader for MarkdownReader {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with a metadata header"
    }

    fn file_extensions(&self) -> &[&str] {
        Self::EXTENSIONS
    }

    fn read(&self, path: &Path) -> Result<ReadOutput, ReadError> {
        let source = fs::read_to_string(path).map_err(|e| ReadError::io(path, e))?;
        self.read_str(&source)
    }
}

/// Render a Markdown fragment to HTML
pub fn render_html(source: &str) -> String {
    let html = markdown_to_html(source, &default_comrak_options());
    restore_placeholders(&html)
}

fn restore_placeholders(html: &str) -> String {
    ENCODED_PLACEHOLDER_RE
        .replace_all(html, "{$what}")
        .into_owned()
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.footnotes = true;
    options.extension.superscript = true;
    options.render.unsafe_ = true;
    options
}
