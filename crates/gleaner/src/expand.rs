//! Fan-out over keyword combinations and deduplication of what they find.
//!
//! [`CombinationExpander::expand`] searches every combination in cross-product order and folds the
//! ranked hits into a [`CandidateSet`]. The first combination to find an identifier decides where
//! it sits; later sightings are dropped. No re-sorting happens across combinations, so the same
//! groups against the same index always give the same set in the same order.

use super::*;

/// A deduplicated work eligible for artifact retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  /// Stable identifier, unique within a run.
  pub identifier:     String,
  /// Kind of identifier, passed on to the retrieval mechanism.
  pub kind:           IdentifierKind,
  /// Citation count reported when the candidate was first found.
  pub citation_count: u64,
  /// File name the artifact is retrieved to, relative to the run's papers directory.
  pub output_name:    String,
}

impl Candidate {
  /// Creates a DOI candidate with its artifact file name derived from the identifier.
  pub fn new(identifier: impl Into<String>, citation_count: u64) -> Self {
    let identifier = identifier.into();
    let output_name = workspace::artifact_file_name(&identifier);
    Self { identifier, kind: IdentifierKind::Doi, citation_count, output_name }
  }
}

/// Insertion-ordered candidates, at most one per identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
  /// Candidates in insertion order.
  candidates: Vec<Candidate>,
  /// Identifiers already present.
  seen:       HashSet<String>,
}

impl CandidateSet {
  /// Creates an empty set.
  pub fn new() -> Self { Self::default() }

  /// Appends `candidate` unless its identifier is already present. Returns whether it was added.
  pub fn insert(&mut self, candidate: Candidate) -> bool {
    if !self.seen.insert(candidate.identifier.clone()) {
      return false;
    }
    self.candidates.push(candidate);
    true
  }

  /// Whether a candidate with `identifier` is present.
  pub fn contains(&self, identifier: &str) -> bool { self.seen.contains(identifier) }

  /// Number of candidates.
  pub fn len(&self) -> usize { self.candidates.len() }

  /// Whether the set is empty.
  pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

  /// Candidates in insertion order.
  pub fn iter(&self) -> std::slice::Iter<'_, Candidate> { self.candidates.iter() }

  /// Identifiers in insertion order.
  pub fn identifiers(&self) -> Vec<String> {
    self.candidates.iter().map(|c| c.identifier.clone()).collect()
  }
}

impl<'a> IntoIterator for &'a CandidateSet {
  type IntoIter = std::slice::Iter<'a, Candidate>;
  type Item = &'a Candidate;

  fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl FromIterator<Candidate> for CandidateSet {
  fn from_iter<T: IntoIterator<Item = Candidate>>(iter: T) -> Self {
    let mut set = Self::new();
    for candidate in iter {
      set.insert(candidate);
    }
    set
  }
}

/// Drives a [`MetadataSearchClient`] over every combination of a set of keyword groups.
#[derive(Debug)]
pub struct CombinationExpander<I> {
  /// Search client used for every combination.
  client:   MetadataSearchClient<I>,
  /// Delay after every combination.
  throttle: Throttle,
}

impl<I: MetadataIndex> CombinationExpander<I> {
  /// Creates an expander with the default throttle.
  pub fn new(client: MetadataSearchClient<I>) -> Self {
    Self { client, throttle: Throttle::default() }
  }

  /// Replaces the delay applied after every combination.
  pub fn with_throttle(mut self, throttle: Throttle) -> Self {
    self.throttle = throttle;
    self
  }

  /// Searches every combination of `groups` and collects the deduplicated candidates.
  ///
  /// Fails with [`GleanerError::Configuration`] before any request if `groups` is empty or any group
  /// has no words. A combination whose search fails is reported through `sink` and contributes
  /// nothing; the remaining combinations still run.
  pub async fn expand(
    &self,
    groups: &[KeywordGroup],
    min_citations: u32,
    sink: &dyn ProgressSink,
  ) -> Result<CandidateSet> {
    if groups.is_empty() {
      return Err(GleanerError::Configuration("at least one keyword group is required".into()));
    }
    if let Some(idx) = groups.iter().position(KeywordGroup::is_empty) {
      return Err(GleanerError::Configuration(format!("keyword group {} is empty", idx + 1)));
    }

    let combinations = query::combinations(groups);
    let total = combinations.len();
    info!("Searching {total} keyword combinations");

    let mut candidates = CandidateSet::new();
    for (idx, combination) in combinations.iter().enumerate() {
      sink.on_status(&format!("Searching combination: {combination}"));

      match self.client.search(combination, min_citations).await {
        Ok(hits) => {
          let before = candidates.len();
          for hit in hits {
            candidates.insert(Candidate::new(hit.identifier, hit.citation_count));
          }
          debug!("{combination}: {} new candidates", candidates.len() - before);
        },
        Err(e) => {
          warn!("{e}");
          sink.on_error(&e.to_string());
        },
      }

      sink.on_progress(progress::fraction(idx + 1, total));
      self.throttle.pause().await;
    }

    sink.on_status("Search completed!");
    info!("Search found {} unique candidates", candidates.len());
    Ok(candidates)
  }
}
