//! Integration tests for the gleaner CLI commands.
//!
//! Nothing here reaches the network: every command either fails validation first or works on local
//! files.

use std::path::Path;

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object};
use predicates::prelude::*;
use tempfile::tempdir;

// Helper function to create a clean command instance
fn gleaner() -> Command { Command::cargo_bin("gleaner").unwrap() }

// Writes a PDF with `pages` empty A4 pages
fn write_pdf(path: &Path, pages: usize) {
  let mut doc = Document::with_version("1.5");
  let pages_id = doc.new_object_id();
  let kids: Vec<Object> = (0..pages)
    .map(|_| {
      Object::Reference(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
          Object::Integer(0),
          Object::Integer(0),
          Object::Integer(595),
          Object::Integer(842),
        ],
      }))
    })
    .collect();
  doc.objects.insert(
    pages_id,
    Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => kids,
      "Count" => pages as i64,
    }),
  );
  let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
  doc.trailer.set("Root", catalog_id);
  doc.save(path).unwrap();
}

#[test]
fn test_help_lists_commands() {
  gleaner()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("search"))
    .stdout(predicate::str::contains("run"))
    .stdout(predicate::str::contains("merge"));
}

#[test]
fn test_init_writes_default_settings() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("nested").join("config.toml");

  gleaner()
    .arg("init")
    .arg("--path")
    .arg(&path)
    .arg("--accept-defaults")
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote default settings"));

  let written = std::fs::read_to_string(&path).unwrap();
  assert!(written.contains("min_citations = 10"));
  assert!(written.contains("https://api.crossref.org/works"));

  // A second init overwrites once confirmed
  gleaner().arg("init").arg("--path").arg(&path).arg("--accept-defaults").assert().success();
}

#[test]
fn test_run_rejects_empty_keyword_group() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  gleaner().arg("init").arg("--path").arg(&config).arg("--accept-defaults").assert().success();

  gleaner()
    .args(["run", "-k", "laugh humor", "-k", "   ", "--out"])
    .arg(dir.path())
    .arg("--config")
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("keyword group 2 is empty"));

  assert!(!dir.path().join("identifiers.txt").exists());
}

#[test]
fn test_search_requires_keywords() {
  gleaner().arg("search").assert().failure().stderr(predicate::str::contains("--keywords"));
}

#[test]
fn test_search_rejects_zero_citation_threshold() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  gleaner().arg("init").arg("--path").arg(&config).arg("--accept-defaults").assert().success();

  gleaner()
    .args(["search", "-k", "laugh", "--min-citations", "0", "--config"])
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("min_citations"));
}

#[test]
fn test_merge_local_files() {
  let dir = tempdir().unwrap();
  let first = dir.path().join("first.pdf");
  let second = dir.path().join("second.pdf");
  let broken = dir.path().join("broken.pdf");
  let output = dir.path().join("merged.pdf");
  write_pdf(&first, 2);
  write_pdf(&second, 3);
  std::fs::write(&broken, b"definitely not a pdf").unwrap();

  gleaner()
    .arg("merge")
    .arg(&first)
    .arg(&broken)
    .arg(&second)
    .arg("-o")
    .arg(&output)
    .arg("--accept-defaults")
    .assert()
    .success()
    .stdout(predicate::str::contains("Merged 2 of 3 files"))
    .stdout(predicate::str::contains("broken.pdf"));

  assert_eq!(Document::load(&output).unwrap().get_pages().len(), 5);
}

#[test]
fn test_merge_fails_when_nothing_is_mergeable() {
  let dir = tempdir().unwrap();
  let broken = dir.path().join("broken.pdf");
  std::fs::write(&broken, b"definitely not a pdf").unwrap();

  gleaner()
    .arg("merge")
    .arg(&broken)
    .arg("-o")
    .arg(dir.path().join("merged.pdf"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("None of the 1 input files could be merged"));
}
