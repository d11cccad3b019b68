use std::{
  collections::HashMap,
  error::Error,
  path::Path,
  sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use gleaner::{
  config::Settings,
  error::{GleanerError, Result},
  fetch::IdentifierKind,
  prelude::*,
  progress::RecordingSink,
  query::KeywordGroup,
  search::IndexItem,
  Gleaner,
};
use lopdf::{dictionary, Document, Object};
use tempfile::tempdir;
use tracing_test::traced_test;

mod workflows;

pub type TestResult<T> = std::result::Result<T, Box<dyn Error>>;

/// Index answering each query from a fixed table. Unknown queries fail like an unreachable API.
#[derive(Default, Clone)]
pub struct StubIndex {
  responses: HashMap<String, Vec<IndexItem>>,
}

impl StubIndex {
  pub fn with(mut self, query: &str, items: Vec<IndexItem>) -> Self {
    self.responses.insert(query.to_string(), items);
    self
  }
}

#[async_trait]
impl MetadataIndex for StubIndex {
  async fn query(&self, query: &str, rows: usize) -> Result<Vec<IndexItem>> {
    match self.responses.get(query) {
      Some(items) => Ok(items.iter().take(rows).cloned().collect()),
      None => Err(GleanerError::ApiError(format!("503 for {query}"))),
    }
  }
}

/// Source that writes a one-page PDF for every identifier except those listed as unavailable.
/// The page carries the identifier so merged output can be traced back to its inputs.
#[derive(Default)]
pub struct StubSource {
  unavailable: Vec<String>,
  calls:       AtomicUsize,
}

impl StubSource {
  pub fn unavailable(ids: &[&str]) -> Self {
    Self { unavailable: ids.iter().map(|id| id.to_string()).collect(), ..Self::default() }
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl ArtifactSource for StubSource {
  async fn retrieve(
    &self,
    identifier: &str,
    _kind: IdentifierKind,
    destination: &Path,
  ) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.unavailable.iter().any(|id| id == identifier) {
      return Err(GleanerError::ApiError(format!("no open-access PDF for {identifier}")));
    }
    write_labelled_pdf(destination, identifier)?;
    Ok(())
  }
}

pub fn item(title: &str, identifier: &str, citations: u64) -> IndexItem {
  IndexItem {
    title:          Some(title.to_string()),
    identifier:     identifier.to_string(),
    citation_count: citations,
  }
}

pub fn settings(groups: &[&str]) -> Settings {
  Settings::default().with_keyword_groups(groups.iter().copied()).with_throttle_ms(0)
}

pub fn stub_gleaner<'a>(
  groups: &[&str],
  index: StubIndex,
  source: &'a StubSource,
) -> Gleaner<StubIndex, &'a StubSource> {
  let settings = settings(groups);
  let groups: Vec<KeywordGroup> = settings.validate().unwrap();
  Gleaner::new(groups, index, source, &settings)
}

/// Writes a single-page PDF whose page records `label`.
pub fn write_labelled_pdf(path: &Path, label: &str) -> Result<()> {
  let mut doc = Document::with_version("1.5");
  let pages_id = doc.new_object_id();
  let page_id = doc.add_object(dictionary! {
    "Type" => "Page",
    "Parent" => pages_id,
    "MediaBox" => vec![
      Object::Integer(0),
      Object::Integer(0),
      Object::Integer(595),
      Object::Integer(842),
    ],
    "GleanerLabel" => Object::string_literal(label),
  });
  doc.objects.insert(
    pages_id,
    Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => vec![Object::Reference(page_id)],
      "Count" => 1_i64,
    }),
  );
  let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
  doc.trailer.set("Root", catalog_id);
  doc.save(path)?;
  Ok(())
}

/// Labels of every page of the PDF at `path`, in page order.
pub fn page_labels(path: &Path) -> Vec<String> {
  let doc = Document::load(path).unwrap();
  doc
    .get_pages()
    .into_values()
    .map(|id| {
      let page = doc.get_dictionary(id).unwrap();
      let label = page.get(b"GleanerLabel").unwrap().as_str().unwrap();
      String::from_utf8_lossy(label).into_owned()
    })
    .collect()
}
