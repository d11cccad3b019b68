use gleaner::progress::NullSink;

use super::*;

/// Five works, each found by the single combination `paper`, ranked in identifier order.
fn five_papers() -> StubIndex {
  StubIndex::default().with("paper", vec![
    item("paper one", "10.1/1", 50),
    item("paper two", "10.1/2", 40),
    item("paper three", "10.1/3", 30),
    item("paper four", "10.1/4", 20),
    item("paper five", "10.1/5", 10),
  ])
}

#[traced_test]
#[tokio::test]
async fn test_merge_keeps_successful_fetches_in_order() -> TestResult<()> {
  let source = StubSource::unavailable(&["10.1/2", "10.1/4"]);
  let sink = RecordingSink::new();

  let outcome = stub_gleaner(&["paper"], five_papers(), &source).run(&sink).await?;

  let merged = outcome.merged.as_ref().expect("three papers were retrieved");
  assert_eq!(page_labels(merged), ["10.1/1", "10.1/3", "10.1/5"]);
  assert_eq!(outcome.manifest(), "10.1/1\n10.1/2\n10.1/3\n10.1/4\n10.1/5\n");
  assert_eq!(outcome.failures.len(), 2);
  assert_eq!(sink.errors(), [
    "Failed to download 10.1/2: API error: no open-access PDF for 10.1/2",
    "Failed to download 10.1/4: API error: no open-access PDF for 10.1/4",
  ]);
  assert_eq!(source.calls(), 5);
  Ok(())
}

#[tokio::test]
async fn test_duplicates_are_fetched_once() -> TestResult<()> {
  let index = StubIndex::default()
    .with("a x", vec![item("a x", "10.1/shared", 30), item("a x", "10.1/a", 20)])
    .with("b x", vec![item("b x", "10.1/shared", 30), item("b x", "10.1/b", 20)]);
  let source = StubSource::default();

  let outcome = stub_gleaner(&["a b", "x"], index, &source).run(&NullSink).await?;

  assert_eq!(source.calls(), 3);
  assert_eq!(outcome.attempted, ["10.1/shared", "10.1/a", "10.1/b"]);
  assert_eq!(page_labels(outcome.merged.as_ref().unwrap()), outcome.attempted);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_no_results_is_a_warning_not_an_error() -> TestResult<()> {
  let index = StubIndex::default().with("paper", vec![item("unrelated", "10.1/none", 500)]);
  let source = StubSource::default();
  let sink = RecordingSink::new();

  let outcome = stub_gleaner(&["paper"], index, &source).run(&sink).await?;

  assert!(outcome.merged.is_none());
  assert!(outcome.attempted.is_empty());
  assert_eq!(outcome.manifest(), "");
  assert_eq!(sink.warnings(), ["No results found"]);
  assert_eq!(source.calls(), 0);
  Ok(())
}

#[tokio::test]
async fn test_all_fetches_failing_gives_absent_output() -> TestResult<()> {
  let source = StubSource::unavailable(&["10.1/1", "10.1/2", "10.1/3", "10.1/4", "10.1/5"]);

  let outcome = stub_gleaner(&["paper"], five_papers(), &source).run(&NullSink).await?;

  assert!(outcome.merged.is_none());
  assert_eq!(outcome.attempted.len(), 5);
  assert_eq!(outcome.retrieved_count(), 0);
  Ok(())
}

#[tokio::test]
async fn test_export_persists_outputs() -> TestResult<()> {
  let source = StubSource::unavailable(&["10.1/3"]);
  let outcome = stub_gleaner(&["paper"], five_papers(), &source).run(&NullSink).await?;
  let dir = tempdir()?;

  let written = outcome.export(dir.path())?;

  let merged = dir.path().join("merged.pdf");
  let manifest = dir.path().join("identifiers.txt");
  assert_eq!(written, [merged.clone(), manifest.clone()]);
  assert_eq!(page_labels(&merged), ["10.1/1", "10.1/2", "10.1/4", "10.1/5"]);
  assert_eq!(std::fs::read_to_string(manifest)?.lines().count(), 5);
  Ok(())
}

#[tokio::test]
async fn test_runs_use_separate_workspaces() -> TestResult<()> {
  let source = StubSource::default();
  let gleaner = stub_gleaner(&["paper"], five_papers(), &source);

  let first = gleaner.run(&NullSink).await?;
  let second = gleaner.run(&NullSink).await?;

  assert_ne!(first.workspace().path(), second.workspace().path());
  assert_eq!(page_labels(first.merged.as_ref().unwrap()).len(), 5);
  assert_eq!(page_labels(second.merged.as_ref().unwrap()).len(), 5);
  Ok(())
}
