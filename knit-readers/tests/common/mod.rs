//! Shared helpers: a scriptable rendering engine and a scratch site layout.

#![allow(dead_code)]

use knit_config::{Loader, Settings};
use knit_readers::{RenderError, RenderJob, Renderer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

/// Knitted output of `fixtures/example.Rmd`.
pub const KNITTED: &str = include_str!("../fixtures/knitted.md");
pub const EXAMPLE_RMD: &str = include_str!("../fixtures/example.Rmd");

static SERIAL: Mutex<()> = Mutex::new(());

/// Tests that look at the process working directory hold this for their
/// whole body, so the "before" and "after" reads are not interleaved with
/// another test's read.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn cwd() -> PathBuf {
    env::current_dir().unwrap()
}

/// What the stub engine does when asked to render.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Write the body to the destination (relative to the working directory).
    Write(String),
    /// Write the body, then report an engine error.
    WriteThenFail(String, String),
    /// Report an engine error without writing.
    Fail(String),
    /// Succeed without writing anything.
    Nothing,
}

pub struct StubRenderer {
    behavior: Behavior,
    available: bool,
    calls: AtomicUsize,
    seen_dirs: Mutex<Vec<PathBuf>>,
}

impl StubRenderer {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            available: true,
            calls: AtomicUsize::new(0),
            seen_dirs: Mutex::new(Vec::new()),
        }
    }

    pub fn writing(body: &str) -> Self {
        Self::new(Behavior::Write(body.to_string()))
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Behavior::Nothing)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Working directories observed during each render call.
    pub fn seen_dirs(&self) -> Vec<PathBuf> {
        self.seen_dirs.lock().unwrap().clone()
    }
}

impl Renderer for StubRenderer {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn render(&self, job: &RenderJob) -> Result<(), RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_dirs.lock().unwrap().push(cwd());

        let write = |body: &str| {
            fs::write(&job.destination, body).map_err(|e| RenderError::Engine(e.to_string()))
        };

        match &self.behavior {
            Behavior::Write(body) => write(body),
            Behavior::WriteThenFail(body, message) => {
                write(body)?;
                Err(RenderError::Engine(message.clone()))
            }
            Behavior::Fail(message) => Err(RenderError::Engine(message.clone())),
            Behavior::Nothing => Ok(()),
        }
    }
}

/// Scratch site: `<tmp>/content/posts`.
pub struct Site {
    pub dir: TempDir,
    pub content: PathBuf,
    pub posts: PathBuf,
}

impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().canonicalize().unwrap().join("content");
        let posts = content.join("posts");
        fs::create_dir_all(&posts).unwrap();
        Self {
            dir,
            content,
            posts,
        }
    }

    pub fn write_post(&self, name: &str, text: &str) -> PathBuf {
        let path = self.posts.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    /// Site settings pointing `path` at this content root.
    pub fn settings(&self) -> Settings {
        Loader::new()
            .set_override("path", self.content.to_string_lossy().into_owned())
            .unwrap()
            .build()
            .unwrap()
    }

    /// Files left directly under the content root.
    pub fn stray_files(&self) -> Vec<PathBuf> {
        fs::read_dir(&self.content)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_file())
            .collect()
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
