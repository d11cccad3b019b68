//! Keyword-combination paper search and aggregation library.
//!
//! `gleaner` discovers scholarly works that match every word of a keyword combination, keeps one
//! entry per DOI, retrieves a PDF for each of them and concatenates whatever was retrieved into a
//! single document. It provides:
//!
//! - Cross-product expansion of keyword groups
//! - Filtered, citation-ranked metadata search against Crossref
//! - Best-effort PDF retrieval (Unpaywall or a URL-template mirror)
//! - Order-preserving PDF concatenation
//! - Progress reporting through a presentation-agnostic sink
//!
//! # Getting Started
//!
//! ```no_run
//! use gleaner::{config::Settings, progress::TracingSink, Gleaner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let settings = Settings::default()
//!     .with_keyword_groups(["laugh humor", "social evolution"])
//!     .with_min_citations(10);
//!
//!   let outcome = Gleaner::from_settings(&settings)?.run(&TracingSink).await?;
//!   if let Some(merged) = &outcome.merged {
//!     println!("Merged papers at {}", merged.display());
//!   }
//!   print!("{}", outcome.manifest());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`query`]: Keyword groups and their combinations
//! - [`search`]: Metadata index access, filtering and ranking
//! - [`expand`]: Combination fan-out and candidate deduplication
//! - [`fetch`]: Per-item artifact retrieval
//! - [`pdf`]: PDF concatenation
//! - [`pipeline`]: Fetch-and-merge orchestration and run outputs
//! - [`progress`]: The progress sink contract
//! - [`config`]: Settings and validation
//!
//! # Failure Handling
//!
//! Only an invalid configuration stops a run. A failed search contributes no candidates, a failed
//! retrieval drops that candidate, and an unreadable PDF is left out of the merge. Each of these is
//! reported to the [`progress::ProgressSink`] and the run carries on.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::HashSet,
  fmt::Display,
  path::{Path, PathBuf},
  time::Duration,
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod config;
pub mod error;
pub mod expand;
pub mod fetch;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod search;
pub mod throttle;
pub mod workspace;

use crate::{
  config::{ArtifactSourceConfig, Settings},
  error::*,
  expand::{CandidateSet, CombinationExpander},
  fetch::{ArtifactFetcher, ArtifactSource, IdentifierKind, MirrorSource, UnpaywallSource},
  pipeline::{AggregationPipeline, RunOutcome},
  progress::ProgressSink,
  query::{Combination, KeywordGroup},
  search::{CrossrefIndex, MetadataIndex, MetadataSearchClient},
  throttle::Throttle,
  workspace::RunWorkspace,
};

/// User agent sent with every outgoing request.
pub const USER_AGENT: &str = concat!("gleaner/", env!("CARGO_PKG_VERSION"));

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use gleaner::prelude::*;
///
/// fn report(sink: &dyn ProgressSink) -> Result<(), GleanerError> {
///   sink.on_status("ready");
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    error::GleanerError, fetch::ArtifactSource, progress::ProgressSink, search::MetadataIndex,
  };
}

/// A fully wired search-and-aggregate run.
///
/// Holds the validated keyword groups together with the concrete index and retrieval mechanism.
/// Both collaborators are generic so headless callers and tests can swap in their own.
pub struct Gleaner<I, S> {
  /// Validated keyword groups, in declaration order.
  groups:        Vec<KeywordGroup>,
  /// Citation threshold applied to every combination.
  min_citations: u32,
  /// Combination fan-out over the metadata index.
  expander:      CombinationExpander<I>,
  /// Retrieval mechanism handed to the pipeline's fetcher.
  source:        S,
  /// Delay applied after every fetch.
  throttle:      Throttle,
  /// File name of the merged PDF inside the run workspace.
  output_name:   String,
  /// File name used when the manifest is exported.
  manifest_name: String,
}

impl Gleaner<CrossrefIndex, Box<dyn ArtifactSource>> {
  /// Builds a run against Crossref and the configured retrieval mechanism.
  ///
  /// Fails with [`GleanerError::Configuration`] before any network access when the settings are
  /// invalid.
  pub fn from_settings(settings: &Settings) -> Result<Self> {
    let groups = settings.validate()?;
    let index = CrossrefIndex::from_settings(settings)?;
    let source: Box<dyn ArtifactSource> = match &settings.artifact_source {
      ArtifactSourceConfig::Unpaywall { api_url } =>
        Box::new(UnpaywallSource::new(api_url, &settings.contact_email, settings.timeout())?),
      ArtifactSourceConfig::Mirror { endpoint_template } =>
        Box::new(MirrorSource::new(endpoint_template, settings.timeout())?),
    };
    Ok(Self::new(groups, index, source, settings))
  }
}

impl<I: MetadataIndex, S: ArtifactSource> Gleaner<I, S> {
  /// Wires an already validated set of groups to the given index and retrieval mechanism.
  pub fn new(groups: Vec<KeywordGroup>, index: I, source: S, settings: &Settings) -> Self {
    let client = MetadataSearchClient::new(index).with_rows(settings.rows);
    Self {
      groups,
      min_citations: settings.min_citations,
      expander: CombinationExpander::new(client).with_throttle(settings.throttle()),
      source,
      throttle: settings.throttle(),
      output_name: settings.output_name.clone(),
      manifest_name: settings.manifest_name.clone(),
    }
  }

  /// Runs the search phase only.
  pub async fn search(&self, sink: &dyn ProgressSink) -> Result<CandidateSet> {
    self.expander.expand(&self.groups, self.min_citations, sink).await
  }

  /// Runs the search phase followed by fetch-and-merge in a freshly allocated workspace.
  pub async fn run(&self, sink: &dyn ProgressSink) -> Result<RunOutcome> {
    let candidates = self.search(sink).await?;
    if candidates.is_empty() {
      sink.on_warning("No results found");
      warn!("Search produced no candidates");
    }

    let workspace = RunWorkspace::allocate()?;
    let pipeline = AggregationPipeline::new(ArtifactFetcher::new(&self.source), workspace)
      .with_throttle(self.throttle)
      .with_output_name(&self.output_name)
      .with_manifest_name(&self.manifest_name);
    Ok(pipeline.run(&candidates, sink).await)
  }
}
