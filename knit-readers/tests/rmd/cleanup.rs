use crate::common::{cwd, serial, Behavior, Site, StubRenderer, EXAMPLE_RMD, KNITTED};
use knit_readers::{MarkdownReader, ReadError, Reader, RenderError, RmdReader, WorkdirScope};
use std::env;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::thread;

fn reader_with(site: &Site, renderer: &Arc<StubRenderer>) -> RmdReader {
    RmdReader::new(site.content.clone(), renderer.clone())
}

#[test]
fn read_delegates_to_markdown_reader() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("example.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::writing(KNITTED));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    let output = reader.read(&source).unwrap();

    assert_eq!(output, MarkdownReader.read_str(KNITTED).unwrap());
    assert_eq!(cwd(), before);
    assert!(!site.content.join("example.md").exists());
    assert!(site.stray_files().is_empty());
    assert_eq!(renderer.calls(), 1);
    assert_eq!(renderer.seen_dirs(), vec![site.content.clone()]);
}

#[test]
fn render_failure_propagates_and_cleans_up() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("example.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::new(Behavior::WriteThenFail(
        "partial".to_string(),
        "Error in eval(expr): object 'x' not found".to_string(),
    )));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    let result = reader.read(&source);

    match result {
        Err(ReadError::Render(RenderError::Engine(message))) => {
            assert!(message.contains("object 'x' not found"))
        }
        other => panic!("Expected engine error, got {other:?}"),
    }
    assert_eq!(cwd(), before);
    assert!(!site.content.join("example.md").exists());
}

#[test]
fn render_failure_without_output() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("broken.rmd", "```{r}\nstop('no')\n```\n");
    let renderer = Arc::new(StubRenderer::new(Behavior::Fail("no".to_string())));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    assert!(matches!(
        reader.read(&source),
        Err(ReadError::Render(RenderError::Engine(_)))
    ));
    assert_eq!(cwd(), before);
    assert!(site.stray_files().is_empty());
}

#[test]
fn delegate_failure_propagates_and_cleans_up() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("dated.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::writing("Title: T\nDate: someday\n\nBody\n"));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    match reader.read(&source) {
        Err(ReadError::Metadata { key, .. }) => assert_eq!(key, "date"),
        other => panic!("Expected metadata error, got {other:?}"),
    }
    assert_eq!(cwd(), before);
    assert!(!site.content.join("dated.md").exists());
}

#[test]
fn silent_engine_surfaces_missing_intermediate() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("quiet.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::new(Behavior::Nothing));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    match reader.read(&source) {
        Err(ReadError::Io { path, source }) => {
            assert_eq!(path, site.content.join("quiet.md"));
            assert_eq!(source.kind(), ErrorKind::NotFound);
        }
        other => panic!("Expected Io error, got {other:?}"),
    }
    assert_eq!(cwd(), before);
}

#[test]
fn missing_source_fails_before_rendering() {
    let _serial = serial();
    let site = Site::new();
    let renderer = Arc::new(StubRenderer::writing(KNITTED));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    let missing = site.posts.join("ghost.Rmd");
    match reader.read(&missing) {
        Err(ReadError::Io { path, source }) => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), ErrorKind::NotFound);
        }
        other => panic!("Expected Io error, got {other:?}"),
    }
    assert_eq!(renderer.calls(), 0);
    assert_eq!(cwd(), before);
}

#[test]
fn missing_content_root_fails_before_rendering() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("example.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::writing(KNITTED));
    let reader = RmdReader::new(site.content.join("does-not-exist"), renderer.clone());
    let before = cwd();

    assert!(matches!(reader.read(&source), Err(ReadError::Io { .. })));
    assert_eq!(renderer.calls(), 0);
    assert_eq!(cwd(), before);
}

#[test]
fn relative_content_root_resolves_before_switching() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("example.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::writing(KNITTED));
    let site_root = site.content.parent().unwrap().to_path_buf();
    let before = cwd();

    env::set_current_dir(&site_root).unwrap();
    let reader = RmdReader::new("content", renderer.clone());
    let job = reader.job_for(&source);
    let result = reader.read(&source);
    let after = cwd();
    env::set_current_dir(&before).unwrap();

    assert_eq!(job.unwrap().working_dir, site.content);
    assert!(result.is_ok(), "read failed: {result:?}");
    assert_eq!(after, site_root);
    assert_eq!(renderer.seen_dirs(), vec![site.content.clone()]);
    assert!(site.stray_files().is_empty());
}

#[test]
fn disabled_reader_refuses_to_read() {
    let _serial = serial();
    let site = Site::new();
    let source = site.write_post("example.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::unavailable());
    let reader = reader_with(&site, &renderer);

    assert!(!reader.enabled());
    assert!(matches!(
        reader.read(&source),
        Err(ReadError::Disabled { .. })
    ));
    assert_eq!(renderer.calls(), 0);
}

#[test]
fn relative_source_resolves_against_caller_directory() {
    let _serial = serial();
    let site = Site::new();
    site.write_post("example.Rmd", EXAMPLE_RMD);
    let renderer = Arc::new(StubRenderer::writing(KNITTED));
    let reader = reader_with(&site, &renderer);
    let before = cwd();

    // Start from the posts directory and name the source relative to it.
    let job = {
        let _scope = WorkdirScope::enter(&site.posts).unwrap();
        reader.job_for(Path::new("example.Rmd"))
    };

    let job = job.unwrap();
    assert_eq!(job.source, site.posts.join("example.Rmd"));
    assert_eq!(cwd(), before);
}

#[test]
fn concurrent_reads_are_serialized() {
    let _serial = serial();
    let site = Site::new();
    let sources: Vec<_> = (0..4)
        .map(|i| site.write_post(&format!("post-{i}.Rmd"), EXAMPLE_RMD))
        .collect();
    let renderer = Arc::new(StubRenderer::writing(KNITTED));
    let reader = Arc::new(reader_with(&site, &renderer));
    let before = cwd();

    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let reader = Arc::clone(&reader);
            thread::spawn(move || reader.read(&source))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
    assert_eq!(renderer.calls(), 4);
    assert!(renderer.seen_dirs().iter().all(|dir| *dir == site.content));
    assert_eq!(cwd(), before);
    assert!(site.stray_files().is_empty());
}

#[test]
fn workdir_scope_restores_and_removes_artifacts() {
    let _serial = serial();
    let site = Site::new();
    let before = cwd();
    let artifact = site.content.join("scratch.md");

    {
        let mut scope = WorkdirScope::enter(&site.content).unwrap();
        assert_eq!(scope.previous(), before.as_path());
        assert_eq!(cwd(), site.content);
        std::fs::write("scratch.md", "x").unwrap();
        scope.track(&artifact);
        // Tracking a file that never appears is fine.
        scope.track(site.content.join("never.md"));
    }

    assert_eq!(cwd(), before);
    assert!(!artifact.exists());
}
