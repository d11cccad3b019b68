//! Metadata search for a single keyword combination.
//!
//! The remote index sits behind the [`MetadataIndex`] trait; [`CrossrefIndex`] is the production
//! implementation. [`MetadataSearchClient`] owns the policy on top of it:
//!
//! 1. Join the combination's words into one free-text query
//! 2. Request a single page of at most `rows` items (no pagination)
//! 3. Keep items whose title contains every word (case-insensitive) and whose citation count meets
//!    the threshold
//! 4. Rank by citation count, descending, keeping the index's order for ties
//!
//! # Examples
//!
//! ```no_run
//! use gleaner::{
//!   config::Settings,
//!   query::Combination,
//!   search::{CrossrefIndex, MetadataSearchClient},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MetadataSearchClient::new(CrossrefIndex::from_settings(&Settings::default())?);
//! let hits = client.search(&Combination::new(["laugh", "evolution"]), 10).await?;
//! for hit in hits {
//!   println!("{} ({} citations)", hit.identifier, hit.citation_count);
//! }
//! # Ok(())
//! # }
//! ```

use super::*;

mod crossref;

pub use crossref::CrossrefIndex;

/// One item as returned by the index, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexItem {
  /// First title entry, if the index supplied one.
  pub title:          Option<String>,
  /// Stable identifier (a DOI).
  pub identifier:     String,
  /// How often the work is cited; missing counts are reported as zero.
  pub citation_count: u64,
}

/// An accepted, ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
  /// Stable identifier (a DOI).
  pub identifier:     String,
  /// How often the work is cited.
  pub citation_count: u64,
}

/// A remote bibliographic index.
///
/// Implementations return at most `rows` items for one free-text query, in the index's own
/// relevance order.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
  /// Runs one query against the index.
  async fn query(&self, query: &str, rows: usize) -> Result<Vec<IndexItem>>;
}

#[async_trait]
impl<T: MetadataIndex + ?Sized> MetadataIndex for Box<T> {
  async fn query(&self, query: &str, rows: usize) -> Result<Vec<IndexItem>> {
    (**self).query(query, rows).await
  }
}

/// Filtering and ranking on top of a [`MetadataIndex`].
#[derive(Debug)]
pub struct MetadataSearchClient<I> {
  /// The index being queried.
  index: I,
  /// Result rows requested per query.
  rows:  usize,
}

impl<I: MetadataIndex> MetadataSearchClient<I> {
  /// Wraps an index, requesting [`config::DEFAULT_ROWS`] rows per query.
  pub fn new(index: I) -> Self { Self { index, rows: config::DEFAULT_ROWS } }

  /// Overrides the number of rows requested per query.
  pub fn with_rows(mut self, rows: usize) -> Self {
    self.rows = rows;
    self
  }

  /// The wrapped index.
  pub fn index(&self) -> &I { &self.index }

  /// Searches one combination.
  ///
  /// A failed request comes back as a [`SearchError`] naming the query; the caller decides how to
  /// report it. Nothing here panics or retries.
  pub async fn search(
    &self,
    combination: &Combination,
    min_citations: u32,
  ) -> std::result::Result<Vec<SearchHit>, SearchError> {
    let query = combination.query();
    debug!("Querying index for \"{query}\" ({} rows)", self.rows);

    let items = self
      .index
      .query(&query, self.rows)
      .await
      .map_err(|reason| SearchError { query: query.clone(), reason })?;

    let hits = rank(filter(combination, items, min_citations));
    debug!("\"{query}\": {} hits after filtering", hits.len());
    Ok(hits)
  }
}

/// Keeps items with a non-empty title containing every combination word and enough citations.
fn filter(combination: &Combination, items: Vec<IndexItem>, min_citations: u32) -> Vec<SearchHit> {
  items
    .into_iter()
    .filter(|item| match item.title.as_deref() {
      Some(title) if !title.trim().is_empty() => combination.is_contained_in(title),
      _ => false,
    })
    .filter(|item| item.citation_count >= u64::from(min_citations))
    .map(|item| SearchHit { identifier: item.identifier, citation_count: item.citation_count })
    .collect()
}

/// Orders by citation count, highest first. The sort is stable, so ties keep index order.
fn rank(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
  hits.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
  hits
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FixedIndex(Vec<IndexItem>);

  #[async_trait]
  impl MetadataIndex for FixedIndex {
    async fn query(&self, _query: &str, rows: usize) -> Result<Vec<IndexItem>> {
      Ok(self.0.iter().take(rows).cloned().collect())
    }
  }

  struct FailingIndex;

  #[async_trait]
  impl MetadataIndex for FailingIndex {
    async fn query(&self, _query: &str, _rows: usize) -> Result<Vec<IndexItem>> {
      Err(GleanerError::ApiError("503 Service Unavailable".into()))
    }
  }

  fn item(title: Option<&str>, id: &str, citations: u64) -> IndexItem {
    IndexItem { title: title.map(String::from), identifier: id.into(), citation_count: citations }
  }

  #[traced_test]
  #[tokio::test]
  async fn test_filters_on_title_words_and_citations() {
    let index = FixedIndex(vec![
      item(Some("Social Functions of Laughter in Evolution"), "10.1/a", 12),
      item(Some("Psychology of Humor"), "10.1/b", 50),
      item(Some("Laughter and social bonding"), "10.1/c", 9),
      item(None, "10.1/d", 100),
      item(Some("  "), "10.1/e", 100),
    ]);
    let client = MetadataSearchClient::new(index);

    let hits = client.search(&Combination::new(["laugh", "social"]), 10).await.unwrap();
    assert_eq!(hits, vec![SearchHit { identifier: "10.1/a".into(), citation_count: 12 }]);

    let hits = client.search(&Combination::new(["humor", "social"]), 10).await.unwrap();
    assert!(hits.is_empty());
  }

  #[tokio::test]
  async fn test_ranks_descending_with_stable_ties() {
    let index = FixedIndex(vec![
      item(Some("laugh one"), "first", 10),
      item(Some("laugh two"), "second", 30),
      item(Some("laugh three"), "third", 10),
      item(Some("laugh four"), "fourth", 30),
    ]);
    let client = MetadataSearchClient::new(index);

    let ids: Vec<String> = client
      .search(&Combination::new(["LAUGH"]), 1)
      .await
      .unwrap()
      .into_iter()
      .map(|h| h.identifier)
      .collect();
    assert_eq!(ids, ["second", "fourth", "first", "third"]);
  }

  #[tokio::test]
  async fn test_rows_are_forwarded() {
    let index = FixedIndex((0..10).map(|i| item(Some("laugh"), &i.to_string(), 10)).collect());
    let client = MetadataSearchClient::new(index).with_rows(3);
    let hits = client.search(&Combination::new(["laugh"]), 1).await.unwrap();
    assert_eq!(hits.len(), 3);
  }

  #[tokio::test]
  async fn test_failure_is_tagged_with_query() {
    let client = MetadataSearchClient::new(FailingIndex);
    let err = client.search(&Combination::new(["laugh", "social"]), 10).await.unwrap_err();
    assert_eq!(err.query, "laugh social");
    assert!(err.to_string().contains("503"));
  }
}
