//! Open-access PDF lookup through the Unpaywall API.

use super::*;

/// Resolves a DOI to an open-access PDF with Unpaywall and downloads it.
#[derive(Debug, Clone)]
pub struct UnpaywallSource {
  /// HTTP client shared by the lookup and the download.
  client:  reqwest::Client,
  /// Unpaywall v2 base URL.
  api_url: String,
  /// Unpaywall requires an `email` parameter on every request.
  email:   String,
}

/// The parts of an Unpaywall record needed to find a PDF.
#[derive(Debug, Deserialize)]
struct UnpaywallRecord {
  /// Unpaywall's preferred location.
  best_oa_location: Option<OaLocation>,
  /// Every known location.
  #[serde(default)]
  oa_locations:     Vec<OaLocation>,
}

/// One open-access copy.
#[derive(Debug, Deserialize)]
struct OaLocation {
  /// Direct PDF link, when the host exposes one.
  url_for_pdf: Option<String>,
}

impl UnpaywallSource {
  /// Creates a source for `api_url`, identifying the caller with `email`.
  pub fn new(api_url: &str, email: &str, timeout: Duration) -> Result<Self> {
    Ok(Self {
      client:  http_client(timeout)?,
      api_url: api_url.trim_end_matches('/').to_string(),
      email:   email.to_string(),
    })
  }

  /// Lookup URL for one DOI.
  fn lookup_url(&self, doi: &str) -> Result<Url> {
    let base = format!("{}/{}", self.api_url, doi);
    Url::parse_with_params(&base, &[("email", self.email.as_str())])
      .map_err(|e| GleanerError::Configuration(format!("invalid Unpaywall URL {base}: {e}")))
  }

  /// Asks Unpaywall where an open-access PDF for `doi` lives.
  async fn resolve_pdf_url(&self, doi: &str) -> Result<String> {
    let url = self.lookup_url(doi)?;
    debug!("Fetching from unpaywall via: {url}");

    let response = self.client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(GleanerError::ApiError(format!("unpaywall responded with {status}")));
    }

    let data = response.bytes().await?;
    trace!("unpaywall response: {}", String::from_utf8_lossy(&data));
    pdf_url_from_record(&data)
  }
}

#[async_trait]
impl ArtifactSource for UnpaywallSource {
  async fn retrieve(
    &self,
    identifier: &str,
    kind: IdentifierKind,
    destination: &Path,
  ) -> Result<()> {
    match kind {
      IdentifierKind::Doi => {
        let pdf_url = self.resolve_pdf_url(identifier).await?;
        download_pdf(&self.client, &pdf_url, destination).await
      },
    }
  }
}

/// Picks the best PDF link from an Unpaywall record.
fn pdf_url_from_record(data: &[u8]) -> Result<String> {
  let record: UnpaywallRecord = serde_json::from_slice(data)?;
  record
    .best_oa_location
    .into_iter()
    .chain(record.oa_locations)
    .find_map(|location| location.url_for_pdf.filter(|url| !url.is_empty()))
    .ok_or_else(|| GleanerError::ApiError("no open-access PDF".into()))
}
