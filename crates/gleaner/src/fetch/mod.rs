//! Best-effort artifact retrieval, one identifier at a time.
//!
//! An [`ArtifactSource`] is the raw retrieval mechanism: given an identifier it writes a file or
//! fails. [`ArtifactFetcher`] wraps a source so that nothing it does can escape a single call. Any
//! error becomes a [`FetchFailed`] value, and a source that claims success but leaves no file (or an
//! empty one) is treated as a failure too.
//!
//! Two sources ship with the crate:
//!
//! - [`UnpaywallSource`]: looks up an open-access PDF location for a DOI
//! - [`MirrorSource`]: downloads from a URL template

use super::*;

mod mirror;
mod unpaywall;

pub use mirror::MirrorSource;
pub use unpaywall::UnpaywallSource;

/// Leading bytes of every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Kind of identifier handed to a retrieval mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
  /// Digital Object Identifier, e.g. `10.1145/1327452.1327492`.
  #[default]
  Doi,
}

impl Display for IdentifierKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      IdentifierKind::Doi => write!(f, "doi"),
    }
  }
}

/// A mechanism that writes the artifact for an identifier to a destination path.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
  /// Retrieves the artifact for `identifier` into `destination`.
  async fn retrieve(&self, identifier: &str, kind: IdentifierKind, destination: &Path)
    -> Result<()>;
}

#[async_trait]
impl<T: ArtifactSource + ?Sized> ArtifactSource for Box<T> {
  async fn retrieve(
    &self,
    identifier: &str,
    kind: IdentifierKind,
    destination: &Path,
  ) -> Result<()> {
    (**self).retrieve(identifier, kind, destination).await
  }
}

#[async_trait]
impl<'a, T: ArtifactSource + ?Sized> ArtifactSource for &'a T {
  async fn retrieve(
    &self,
    identifier: &str,
    kind: IdentifierKind,
    destination: &Path,
  ) -> Result<()> {
    (**self).retrieve(identifier, kind, destination).await
  }
}

/// Outcome of fetching one candidate.
#[derive(Debug)]
pub struct FetchResult {
  /// Identifier of the candidate.
  pub identifier: String,
  /// Where the artifact now lives, or why there is none.
  pub outcome:    std::result::Result<PathBuf, FetchFailed>,
}

impl FetchResult {
  /// Whether a non-empty artifact exists at the destination.
  pub fn succeeded(&self) -> bool { self.outcome.is_ok() }

  /// Path of the retrieved artifact, if any.
  pub fn local_file_path(&self) -> Option<&Path> {
    self.outcome.as_ref().ok().map(PathBuf::as_path)
  }
}

/// Runs an [`ArtifactSource`] with failures confined to the single call.
#[derive(Debug)]
pub struct ArtifactFetcher<S> {
  /// The wrapped retrieval mechanism.
  source: S,
}

impl<S: ArtifactSource> ArtifactFetcher<S> {
  /// Wraps a retrieval mechanism.
  pub fn new(source: S) -> Self { Self { source } }

  /// Fetches the artifact for `identifier` into `destination`.
  ///
  /// Succeeds only when the source returned `Ok` and `destination` is a non-empty file afterwards.
  /// A failed result says nothing about whether a file exists; callers must not use it.
  pub async fn fetch(
    &self,
    identifier: &str,
    kind: IdentifierKind,
    destination: &Path,
  ) -> FetchResult {
    debug!("Retrieving {kind} {identifier} into {}", destination.display());

    let outcome = match self.source.retrieve(identifier, kind, destination).await {
      Ok(()) => verify_artifact(destination),
      Err(reason) => Err(reason),
    }
    .map(|()| destination.to_path_buf())
    .map_err(|reason| {
      warn!("Failed to download {identifier}: {reason}");
      FetchFailed { identifier: identifier.to_string(), reason }
    });

    FetchResult { identifier: identifier.to_string(), outcome }
  }
}

/// The success criterion: a non-empty regular file at `path`.
fn verify_artifact(path: &Path) -> Result<()> {
  match std::fs::metadata(path) {
    Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
    _ => Err(GleanerError::MissingArtifact(path.to_path_buf())),
  }
}

/// Downloads a PDF from `url` and writes it to `destination`.
///
/// Rejects non-success statuses and bodies that do not start with the PDF header, which is what a
/// landing page or captcha looks like.
pub(crate) async fn download_pdf(
  client: &reqwest::Client,
  url: &str,
  destination: &Path,
) -> Result<()> {
  debug!("Downloading PDF from {url}");
  let response = client.get(url).send().await?;

  let status = response.status();
  if !status.is_success() {
    trace!("pdf response: {response:?}");
    return Err(GleanerError::ApiError(format!("Failed to download PDF: {status}")));
  }

  let bytes = response.bytes().await?;
  if !bytes.starts_with(PDF_MAGIC) {
    return Err(GleanerError::InvalidArtifact(format!("{url} did not return a PDF")));
  }

  debug!("Writing PDF to path: {}", destination.display());
  tokio::fs::write(destination, &bytes).await?;
  Ok(())
}

/// Builds the shared HTTP client used by the retrieval mechanisms.
fn http_client(timeout: Duration) -> Result<reqwest::Client> {
  Ok(reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?)
}
