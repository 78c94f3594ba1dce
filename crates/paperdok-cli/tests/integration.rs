//! Integration tests for the paperdok CLI commands

use std::fs;
use std::io::Read;

use paperdok_cli::{render_command, resolve_config};
use paperdok_core::{GenerationError, OutputFormat};
use tempfile::TempDir;
use zip::ZipArchive;

const PAPER: &str = r#"{
    "title": "Command Line Papers",
    "authors": [{"name": "Ken Thompson", "affiliation": "Bell Labs"}],
    "abstract": "Rendering from a file.",
    "keywords": ["cli"],
    "sections": [{
        "title": "Introduction",
        "content": "Hello.",
        "contentBlocks": [{"type": "table", "caption": "Empty"}]
    }],
    "references": ["K. Thompson, Reflections on Trusting Trust."]
}"#;

fn write_paper(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("paper.json");
    fs::write(&path, PAPER).unwrap();
    path
}

#[test]
fn render_defaults_to_docx_beside_input() {
    let dir = TempDir::new().unwrap();
    let input = write_paper(&dir);

    let written = render_command(&input, None, None, None).unwrap();
    assert_eq!(written, dir.path().join("paper.docx"));

    let mut archive = ZipArchive::new(fs::File::open(&written).unwrap()).unwrap();
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    assert!(document.contains("Command Line Papers"));
    assert!(document.contains("TABLE 1.1: EMPTY"));
}

#[test]
fn render_infers_format_from_output_extension() {
    let dir = TempDir::new().unwrap();
    let input = write_paper(&dir);
    let output = dir.path().join("out.html");

    render_command(&input, Some(&output), None, None).unwrap();
    let html = fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Command Line Papers"));
}

#[test]
fn explicit_format_wins() {
    let dir = TempDir::new().unwrap();
    let input = write_paper(&dir);
    let output = dir.path().join("out.bin");

    render_command(&input, Some(&output), Some(OutputFormat::Html), None).unwrap();
    assert!(fs::read_to_string(&output).unwrap().contains("<article"));
}

#[test]
fn invalid_request_carries_generation_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(&input, r#"{"authors": []}"#).unwrap();

    let err = render_command(&input, None, None, None).unwrap_err();
    let generation = err.downcast_ref::<GenerationError>().unwrap();
    assert!(generation.suggestion().contains("title"));
    assert!(!dir.path().join("bad.docx").exists());
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let err = render_command(&dir.path().join("nope.json"), None, None, None).unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn config_beside_input_is_used() {
    let dir = TempDir::new().unwrap();
    let input = write_paper(&dir);
    fs::write(
        dir.path().join("paperdok.toml"),
        "[service]\nenabled = false\n\n[pdf]\nfont_paths = [\"fonts/a.ttf\"]\n",
    )
    .unwrap();

    let config = resolve_config(None, Some(&input)).unwrap();
    assert_eq!(config.pdf.font_paths, vec![dir.path().join("fonts/a.ttf")]);
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_paper(&dir);
    let missing = dir.path().join("other.toml");
    assert!(render_command(&input, None, None, Some(&missing)).is_err());
}
