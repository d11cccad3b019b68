//! Crossref works API.

use serde::Deserialize;

use super::*;

/// Fields requested from Crossref; everything else is left out of the response.
const SELECT_FIELDS: &str = "title,DOI,is-referenced-by-count";

/// [`MetadataIndex`] backed by the Crossref REST API.
#[derive(Debug, Clone)]
pub struct CrossrefIndex {
  /// Shared HTTP client with user agent and timeout applied.
  client:        reqwest::Client,
  /// Works endpoint, normally `https://api.crossref.org/works`.
  base_url:      String,
  /// Sent as `mailto` so requests land in Crossref's polite pool.
  contact_email: String,
}

/// Top level of a works query response.
#[derive(Debug, Deserialize)]
struct WorksResponse {
  /// Response payload.
  message: WorksMessage,
}

/// Payload of a works query response.
#[derive(Debug, Deserialize)]
struct WorksMessage {
  /// Matching works, in relevance order.
  #[serde(default)]
  items: Vec<Work>,
}

/// One work as selected by [`SELECT_FIELDS`].
#[derive(Debug, Deserialize)]
struct Work {
  /// Crossref omits the DOI only for malformed records.
  #[serde(rename = "DOI")]
  doi:       Option<String>,
  /// Crossref titles are lists; the first entry is the main title.
  #[serde(default)]
  title:     Vec<String>,
  /// Citation count.
  #[serde(rename = "is-referenced-by-count", default)]
  citations: u64,
}

impl CrossrefIndex {
  /// Creates a client for `base_url`, identifying the caller with `contact_email`.
  pub fn new(base_url: &str, contact_email: &str, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.to_string(), contact_email: contact_email.to_string() })
  }

  /// Creates a client from the index URL, contact address and timeout in `settings`.
  pub fn from_settings(settings: &Settings) -> Result<Self> {
    Self::new(&settings.index_url, &settings.contact_email, settings.timeout())
  }

  /// Full request URL for one query.
  fn request_url(&self, query: &str, rows: usize) -> Result<Url> {
    Url::parse_with_params(&self.base_url, &[
      ("query", query.to_string()),
      ("rows", rows.to_string()),
      ("select", SELECT_FIELDS.to_string()),
      ("mailto", self.contact_email.clone()),
    ])
    .map_err(|e| GleanerError::Configuration(format!("invalid index URL {}: {e}", self.base_url)))
  }
}

#[async_trait]
impl MetadataIndex for CrossrefIndex {
  async fn query(&self, query: &str, rows: usize) -> Result<Vec<IndexItem>> {
    let url = self.request_url(query, rows)?;
    debug!("Fetching from crossref via: {url}");

    let response = self.client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(GleanerError::ApiError(format!("crossref responded with {status}")));
    }

    let data = response.bytes().await?;
    trace!("crossref response: {}", String::from_utf8_lossy(&data));
    parse_works(&data)
  }
}

/// Decodes a works response into index items, dropping records without a DOI.
fn parse_works(data: &[u8]) -> Result<Vec<IndexItem>> {
  let response: WorksResponse = serde_json::from_slice(data)?;
  Ok(
    response
      .message
      .items
      .into_iter()
      .filter_map(|work| {
        let Some(identifier) = work.doi.filter(|doi| !doi.is_empty()) else {
          debug!("Skipping crossref record without a DOI");
          return None;
        };
        Some(IndexItem {
          title: work.title.into_iter().next(),
          identifier,
          citation_count: work.citations,
        })
      })
      .collect(),
  )
}
