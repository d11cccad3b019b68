use gleaner::progress::NullSink;

use super::*;

fn laughter_index() -> StubIndex {
  let results = vec![
    item("Social Functions of Laughter in Evolution", "10.1016/laughter", 12),
    item("Psychology of Humor", "10.1016/humor", 50),
    item("Laughter, Humor and Social Evolution", "10.1016/barely-cited", 3),
  ];
  ["laugh social", "laugh evolution", "humor social", "humor evolution"]
    .into_iter()
    .fold(StubIndex::default(), |index, query| index.with(query, results.clone()))
}

#[traced_test]
#[tokio::test]
async fn test_titles_must_contain_every_word_of_a_combination() -> TestResult<()> {
  let source = StubSource::default();
  let gleaner = stub_gleaner(&["laugh humor", "social evolution"], laughter_index(), &source);

  let candidates = gleaner.search(&NullSink).await?;

  assert_eq!(candidates.identifiers(), ["10.1016/laughter"]);
  let candidate = candidates.iter().next().unwrap();
  assert_eq!(candidate.citation_count, 12);
  assert_eq!(candidate.output_name, "10.1016_laughter.pdf");
  Ok(())
}

#[tokio::test]
async fn test_first_combination_decides_position() -> TestResult<()> {
  let index = StubIndex::default()
    .with("a x", vec![item("a x first", "10.1/A", 40), item("a x second", "10.1/X", 20)])
    .with("b x", vec![item("b x first", "10.1/X", 99), item("b x second", "10.1/B", 15)]);
  let source = StubSource::default();

  let candidates = stub_gleaner(&["a b", "x"], index, &source).search(&NullSink).await?;

  assert_eq!(candidates.identifiers(), ["10.1/A", "10.1/X", "10.1/B"]);
  assert_eq!(candidates.iter().nth(1).unwrap().citation_count, 20);
  Ok(())
}

#[tokio::test]
async fn test_repeated_search_is_identical() -> TestResult<()> {
  let source = StubSource::default();
  let index = StubIndex::default()
    .with("a x", vec![item("a x", "3", 10), item("a x", "1", 30), item("a x", "2", 30)])
    .with("b x", vec![item("b x", "2", 50), item("b x", "4", 10)]);

  let first = stub_gleaner(&["a b", "x"], index.clone(), &source).search(&NullSink).await?;
  let second = stub_gleaner(&["a b", "x"], index, &source).search(&NullSink).await?;

  assert_eq!(first, second);
  assert_eq!(first.identifiers(), ["1", "2", "3", "4"]);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_failed_combination_is_reported_and_skipped() -> TestResult<()> {
  let index = StubIndex::default().with("b x", vec![item("b x", "10.1/B", 10)]);
  let source = StubSource::default();
  let sink = RecordingSink::new();

  let candidates = stub_gleaner(&["a b", "x"], index, &source).search(&sink).await?;

  assert_eq!(candidates.identifiers(), ["10.1/B"]);
  assert_eq!(sink.errors(), ["Error with query \"a x\": API error: 503 for a x"]);
  assert_eq!(sink.fractions(), vec![0.5, 1.0]);
  Ok(())
}

#[test]
fn test_empty_group_is_rejected_before_any_request() {
  let settings = settings(&["laugh", "  "]);
  match Gleaner::from_settings(&settings) {
    Err(GleanerError::Configuration(msg)) => assert_eq!(msg, "keyword group 2 is empty"),
    Err(e) => panic!("unexpected error: {e}"),
    Ok(_) => panic!("an empty keyword group must not produce a runnable gleaner"),
  }
}

#[test]
fn test_too_many_groups_is_rejected() {
  let settings = settings(&["a", "b", "c", "d", "e", "f"]);
  assert!(matches!(settings.validate(), Err(GleanerError::Configuration(_))));
}

#[ignore = "Hits the live Crossref API."]
#[traced_test]
#[tokio::test]
async fn test_live_search() -> TestResult<()> {
  let settings = Settings::default().with_keyword_groups(["laughter", "evolution"]);
  let candidates = Gleaner::from_settings(&settings)?.search(&NullSink).await?;
  assert!(candidates.iter().all(|c| c.citation_count >= 10));
  Ok(())
}
