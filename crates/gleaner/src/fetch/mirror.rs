//! Direct download from a URL template.

use super::*;

/// Downloads `endpoint_template` with `{identifier}` replaced by the identifier.
///
/// ```no_run
/// use std::{path::Path, time::Duration};
///
/// use gleaner::{fetch::{IdentifierKind, MirrorSource}, prelude::*};
///
/// # async fn example() -> Result<(), GleanerError> {
/// let template = "https://mirror.example.org/{identifier}.pdf";
/// let mirror = MirrorSource::new(template, Duration::from_secs(30))?;
/// mirror.retrieve("10.1/X", IdentifierKind::Doi, Path::new("paper.pdf")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MirrorSource {
  /// HTTP client for the downloads.
  client:            reqwest::Client,
  /// URL template containing `{identifier}`.
  endpoint_template: String,
}

impl MirrorSource {
  /// Creates a source for `endpoint_template`, which must contain `{identifier}`.
  pub fn new(endpoint_template: &str, timeout: Duration) -> Result<Self> {
    if !endpoint_template.contains("{identifier}") {
      return Err(GleanerError::Configuration(format!(
        "mirror template {endpoint_template} has no {{identifier}} placeholder"
      )));
    }
    Ok(Self { client: http_client(timeout)?, endpoint_template: endpoint_template.to_string() })
  }

  /// Download URL for one identifier.
  fn url_for(&self, identifier: &str) -> String {
    self.endpoint_template.replace("{identifier}", identifier)
  }
}

#[async_trait]
impl ArtifactSource for MirrorSource {
  async fn retrieve(
    &self,
    identifier: &str,
    _kind: IdentifierKind,
    destination: &Path,
  ) -> Result<()> {
    download_pdf(&self.client, &self.url_for(identifier), destination).await
  }
}
