//! Document metadata
//!
//! Markdown sources open with a header of `Key: value` lines, optionally fenced
//! by `---` (the YAML-style header knitr copies through from R Markdown). The
//! header ends at the first blank line, a closing `---`/`...`, or the first
//! line that is not a metadata line. Lines indented four or more spaces continue
//! the previous value.
//!
//! Keys are lowercased. A few keys get typed values:
//!
//! | Key                          | Value                                  |
//! |------------------------------|----------------------------------------|
//! | `tags`, `keywords`, `authors`| comma separated list                   |
//! | `date`, `modified`           | date/time, see [`parse_date`]          |
//! | `summary`                    | Markdown rendered to HTML              |
//! | anything else                | text                                   |

use crate::error::ReadError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata mapping produced by readers, keyed by lowercased name.
pub type Metadata = BTreeMap<String, MetadataValue>;

static BEGIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3}(\s.*)?$").unwrap());
static END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-{3}|\.{3})(\s.*)?$").unwrap());
static META_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ ]{0,3}(?P<key>[A-Za-z0-9_-]+):\s*(?P<value>.*)$").unwrap());
static META_MORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ ]{4,}(?P<value>.*)$").unwrap());

const LIST_KEYS: &[&str] = &["tags", "keywords", "authors"];
const DATE_KEYS: &[&str] = &["date", "modified"];
const HTML_KEYS: &[&str] = &["summary"];

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    /// Markup already rendered to HTML (e.g. `summary`)
    Html(String),
    List(Vec<String>),
    Date(NaiveDateTime),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) | MetadataValue::Html(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetadataValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            MetadataValue::Date(date) => Some(*date),
            _ => None,
        }
    }
}

/// Split a source into its raw header fields and the remaining body.
pub fn split_header(source: &str) -> (Vec<(String, String)>, &str) {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut offset = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let text = line.trim_end_matches(['\n', '\r']);

        if index == 0 && BEGIN_RE.is_match(text) {
            offset += line.len();
            continue;
        }
        if text.trim().is_empty() || END_RE.is_match(text) {
            offset += line.len();
            break;
        }

        if let Some(caps) = META_RE.captures(text) {
            fields.push((caps["key"].to_lowercase(), caps["value"].trim().to_string()));
        } else if let (Some(caps), Some(last)) = (META_MORE_RE.captures(text), fields.last_mut()) {
            if !last.1.is_empty() {
                last.1.push('\n');
            }
            last.1.push_str(caps["value"].trim());
        } else {
            break;
        }
        offset += line.len();
    }

    (fields, &source[offset..])
}

/// Turn raw header fields into typed metadata.
///
/// `render_html` is used for keys whose value is Markdown (see [`HTML_KEYS`]).
pub fn process_fields<F>(fields: Vec<(String, String)>, render_html: F) -> Result<Metadata, ReadError>
where
    F: Fn(&str) -> String,
{
    let mut metadata = Metadata::new();

    for (key, raw) in fields {
        if LIST_KEYS.contains(&key.as_str()) {
            let items = split_list(&raw);
            match metadata.get_mut(&key) {
                Some(MetadataValue::List(existing)) => existing.extend(items),
                _ => {
                    metadata.insert(key, MetadataValue::List(items));
                }
            }
        } else if DATE_KEYS.contains(&key.as_str()) {
            let date = parse_date(strip_quotes(&raw)).map_err(|message| ReadError::Metadata {
                key: key.clone(),
                message,
            })?;
            metadata.insert(key, MetadataValue::Date(date));
        } else if HTML_KEYS.contains(&key.as_str()) {
            let html = render_html(strip_quotes(&raw));
            metadata.insert(key, MetadataValue::Html(html));
        } else {
            metadata.insert(key, MetadataValue::Text(strip_quotes(&raw).to_string()));
        }
    }

    Ok(metadata)
}

/// Parse a metadata date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS` (also with a
/// `T` separator) and RFC 3339. Offsets are dropped after conversion to the
/// local time they denote.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.naive_local());
    }
    for pattern in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    Err(format!("'{value}' is not a recognized date"))
}

fn split_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(raw);

    raw.split([',', '\n'])
        .map(|item| strip_quotes(item.trim()).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
