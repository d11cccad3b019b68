//! Fetch-and-merge over a deduplicated candidate set.
//!
//! An [`AggregationPipeline`] owns one [`RunWorkspace`] for its whole run and moves through
//! [`Stage::Idle`], [`Stage::Fetching`], [`Stage::Merging`] and [`Stage::Done`] exactly once.
//! Failed fetches and unreadable files are collected along the way; none of them moves the run into
//! a failure state. When nothing could be retrieved the run still reaches `Done`, just without a
//! merged document.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use gleaner::{
//!   expand::{Candidate, CandidateSet},
//!   fetch::{ArtifactFetcher, MirrorSource},
//!   pipeline::AggregationPipeline,
//!   progress::TracingSink,
//!   workspace::RunWorkspace,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let template = "https://mirror.example/{identifier}.pdf";
//! let source = MirrorSource::new(template, Duration::from_secs(60))?;
//! let candidates: CandidateSet =
//!   vec![Candidate::new("10.1145/1327452.1327492", 42)].into_iter().collect();
//!
//! let outcome = AggregationPipeline::new(ArtifactFetcher::new(source), RunWorkspace::allocate()?)
//!   .run(&candidates, &TracingSink)
//!   .await;
//! outcome.export("./papers")?;
//! # Ok(())
//! # }
//! ```

use super::*;

/// Default file name of the merged document.
pub const DEFAULT_OUTPUT_NAME: &str = "merged.pdf";

/// Default file name of the exported manifest.
pub const DEFAULT_MANIFEST_NAME: &str = "identifiers.txt";

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  /// Created, not yet started.
  Idle,
  /// Retrieving artifacts one candidate at a time.
  Fetching,
  /// Concatenating what was retrieved.
  Merging,
  /// Finished, with or without a merged document.
  Done,
}

impl Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Stage::Idle => write!(f, "idle"),
      Stage::Fetching => write!(f, "fetching"),
      Stage::Merging => write!(f, "merging"),
      Stage::Done => write!(f, "done"),
    }
  }
}

/// Drives an [`ArtifactFetcher`] across a candidate set and merges the results.
#[derive(Debug)]
pub struct AggregationPipeline<S> {
  /// Per-item retrieval.
  fetcher:       ArtifactFetcher<S>,
  /// Working storage owned for the duration of the run.
  workspace:     RunWorkspace,
  /// Delay after every fetch.
  throttle:      Throttle,
  /// File name of the merged document inside the workspace output directory.
  output_name:   String,
  /// File name used when the manifest is exported.
  manifest_name: String,
  /// Current stage.
  stage:         Stage,
}

impl<S: ArtifactSource> AggregationPipeline<S> {
  /// Creates an idle pipeline that will work inside `workspace`.
  pub fn new(fetcher: ArtifactFetcher<S>, workspace: RunWorkspace) -> Self {
    Self {
      fetcher,
      workspace,
      throttle: Throttle::default(),
      output_name: DEFAULT_OUTPUT_NAME.to_string(),
      manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
      stage: Stage::Idle,
    }
  }

  /// Replaces the delay applied after every fetch.
  pub fn with_throttle(mut self, throttle: Throttle) -> Self {
    self.throttle = throttle;
    self
  }

  /// Sets the merged document's file name.
  pub fn with_output_name(mut self, output_name: &str) -> Self {
    self.output_name = output_name.to_string();
    self
  }

  /// Sets the manifest's file name for [`RunOutcome::export`].
  pub fn with_manifest_name(mut self, manifest_name: &str) -> Self {
    self.manifest_name = manifest_name.to_string();
    self
  }

  /// Current stage. Always [`Stage::Idle`] before [`run`](Self::run); the finished stage is on
  /// [`RunOutcome::stage`].
  pub fn stage(&self) -> Stage { self.stage }

  /// The workspace this pipeline writes into.
  pub fn workspace(&self) -> &RunWorkspace { &self.workspace }

  /// Moves to `stage` and logs the transition.
  fn advance(&mut self, stage: Stage) {
    debug!("Pipeline stage: {} -> {stage}", self.stage);
    self.stage = stage;
  }

  /// Fetches every candidate in order, then merges the retrieved artifacts in that same order.
  ///
  /// Never fails: per-item problems are reported through `sink` and collected in the returned
  /// [`RunOutcome`]. The manifest lists every candidate attempted, whatever its fetch outcome.
  pub async fn run(mut self, candidates: &CandidateSet, sink: &dyn ProgressSink) -> RunOutcome {
    self.advance(Stage::Fetching);
    let total = candidates.len();
    let mut attempted = Vec::with_capacity(total);
    let mut retrieved = Vec::new();
    let mut failures = Vec::new();

    for (idx, candidate) in candidates.iter().enumerate() {
      sink.on_status(&format!("Downloading {} ({}/{total})", candidate.identifier, idx + 1));
      attempted.push(candidate.identifier.clone());

      let destination = self.workspace.artifact_path(&candidate.output_name);
      let result = self.fetcher.fetch(&candidate.identifier, candidate.kind, &destination).await;
      match result.outcome {
        Ok(path) => retrieved.push(path),
        Err(failure) => {
          sink.on_error(&failure.to_string());
          failures.push(failure);
        },
      }

      sink.on_progress(progress::fraction(idx + 1, total));
      self.throttle.pause().await;
    }
    info!("Retrieved {} of {total} artifacts", retrieved.len());

    self.advance(Stage::Merging);
    let (merged, skipped) = self.merge(&retrieved, total, sink);

    self.advance(Stage::Done);
    sink.on_status("Download and merge completed!");

    RunOutcome {
      stage: self.stage,
      merged,
      attempted,
      failures,
      skipped,
      output_name: self.output_name,
      manifest_name: self.manifest_name,
      workspace: self.workspace,
    }
  }

  /// Concatenates `retrieved` into the workspace output directory.
  ///
  /// An empty candidate set merges nothing without a warning; reporting the empty search result is
  /// left to whoever produced the set.
  fn merge(
    &self,
    retrieved: &[PathBuf],
    attempted: usize,
    sink: &dyn ProgressSink,
  ) -> (Option<PathBuf>, Vec<MergeSkipped>) {
    if retrieved.is_empty() {
      if attempted > 0 {
        sink.on_warning("No papers were downloaded, nothing to merge");
      }
      return (None, Vec::new());
    }

    sink.on_status(&format!("Merging {} papers", retrieved.len()));
    let output = self.workspace.output_dir().join(&self.output_name);
    match pdf::merge_documents(retrieved, &output) {
      Ok(report) => {
        for skipped in &report.skipped {
          sink.on_error(&skipped.to_string());
        }
        if report.output.is_none() {
          sink.on_warning("None of the downloaded papers could be merged");
        }
        (report.output, report.skipped)
      },
      Err(e) => {
        warn!("Failed to write {}: {e}", output.display());
        sink.on_error(&format!("Failed to write merged document: {e}"));
        (None, Vec::new())
      },
    }
  }
}

/// Everything a finished run produced.
///
/// The merged document lives inside the run's workspace, which is owned here and removed when the
/// outcome is dropped. Use [`RunOutcome::export`] to keep the results.
#[derive(Debug)]
pub struct RunOutcome {
  /// Stage the pipeline finished in; always [`Stage::Done`] once `run` returns.
  pub stage:     Stage,
  /// The merged document, absent when nothing could be retrieved or merged.
  pub merged:    Option<PathBuf>,
  /// Every identifier attempted, in candidate order.
  pub attempted: Vec<String>,
  /// Candidates whose retrieval failed.
  pub failures:  Vec<FetchFailed>,
  /// Retrieved files left out of the merge.
  pub skipped:   Vec<MergeSkipped>,
  /// File name the merged document is exported under.
  output_name:   String,
  /// File name the manifest is exported under.
  manifest_name: String,
  /// Working storage holding the merged document.
  workspace:     RunWorkspace,
}

impl RunOutcome {
  /// The manifest: one attempted identifier per line.
  pub fn manifest(&self) -> String {
    self.attempted.iter().map(|id| format!("{id}\n")).collect()
  }

  /// Number of candidates whose artifact was retrieved.
  pub fn retrieved_count(&self) -> usize { self.attempted.len() - self.failures.len() }

  /// The run's working storage.
  pub fn workspace(&self) -> &RunWorkspace { &self.workspace }

  /// Writes the manifest to `path`.
  pub fn write_manifest(&self, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path.as_ref(), self.manifest())?;
    debug!("Wrote manifest to {}", path.as_ref().display());
    Ok(())
  }

  /// Copies the merged document (if any) and writes the manifest into `dir`.
  ///
  /// Returns the files written, merged document first.
  pub fn export(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Some(merged) = &self.merged {
      let target = dir.join(&self.output_name);
      std::fs::copy(merged, &target)?;
      written.push(target);
    }

    let manifest = dir.join(&self.manifest_name);
    self.write_manifest(&manifest)?;
    written.push(manifest);

    info!("Exported run outputs to {}", dir.display());
    Ok(written)
  }
}
