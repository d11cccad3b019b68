//! Run settings.
//!
//! [`Settings`] gathers every option a run recognizes. All fields have defaults, so a settings file
//! only needs the keys it changes:
//!
//! ```toml
//! min_citations = 25
//! keyword_groups = ["laugh humor", "social evolution"]
//! throttle_ms = 1500
//!
//! [artifact_source]
//! type = "mirror"
//! endpoint_template = "https://mirror.example.org/{identifier}.pdf"
//! ```
//!
//! Settings are passed explicitly to whatever needs them; nothing here is global.

use super::*;

/// Most keyword groups a run accepts.
pub const MAX_KEYWORD_GROUPS: usize = 5;

/// Result rows requested from the index for each combination.
pub const DEFAULT_ROWS: usize = 150;

/// Options recognized by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Minimum citation count for a search hit to be kept. Must be at least 1.
  pub min_citations:   u32,
  /// Between one and five groups, each a whitespace-separated token list.
  pub keyword_groups:  Vec<String>,
  /// Result rows requested per combination. No further pages are requested.
  pub rows:            usize,
  /// Pause after every search and every fetch, in milliseconds.
  pub throttle_ms:     u64,
  /// Contact address sent to the remote services, as their usage policies ask.
  pub contact_email:   String,
  /// Crossref works endpoint.
  pub index_url:       String,
  /// Timeout for a single HTTP request, in seconds.
  pub timeout_secs:    u64,
  /// File name of the merged PDF.
  pub output_name:     String,
  /// File name of the identifier manifest.
  pub manifest_name:   String,
  /// How artifacts are retrieved.
  pub artifact_source: ArtifactSourceConfig,
}

/// Retrieval mechanism selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactSourceConfig {
  /// Resolve open-access PDF locations through the Unpaywall API.
  Unpaywall {
    /// Unpaywall v2 base URL.
    api_url: String,
  },
  /// Download straight from a URL template; `{identifier}` is replaced by the identifier.
  Mirror {
    /// Template such as `https://mirror.example.org/{identifier}.pdf`.
    endpoint_template: String,
  },
}

impl Default for ArtifactSourceConfig {
  fn default() -> Self { Self::Unpaywall { api_url: "https://api.unpaywall.org/v2".into() } }
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      min_citations:   10,
      keyword_groups:  Vec::new(),
      rows:            DEFAULT_ROWS,
      throttle_ms:     throttle::DEFAULT_DELAY.as_millis() as u64,
      contact_email:   "gleaner@example.com".into(),
      index_url:       "https://api.crossref.org/works".into(),
      timeout_secs:    60,
      output_name:     pipeline::DEFAULT_OUTPUT_NAME.into(),
      manifest_name:   pipeline::DEFAULT_MANIFEST_NAME.into(),
      artifact_source: ArtifactSourceConfig::default(),
    }
  }
}

impl Settings {
  /// Default location of the settings file, `<config dir>/gleaner/config.toml`.
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("gleaner").join("config.toml")
  }

  /// Parses settings from TOML.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> { Ok(toml::from_str(toml_str)?) }

  /// Reads settings from a TOML file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Renders these settings as TOML.
  pub fn to_toml_string(&self) -> Result<String> { Ok(toml::to_string_pretty(self)?) }

  /// Replaces the keyword groups.
  pub fn with_keyword_groups<S: Into<String>>(
    mut self,
    groups: impl IntoIterator<Item = S>,
  ) -> Self {
    self.keyword_groups = groups.into_iter().map(Into::into).collect();
    self
  }

  /// Sets the citation threshold.
  pub fn with_min_citations(mut self, min_citations: u32) -> Self {
    self.min_citations = min_citations;
    self
  }

  /// Sets the inter-operation delay.
  pub fn with_throttle_ms(mut self, throttle_ms: u64) -> Self {
    self.throttle_ms = throttle_ms;
    self
  }

  /// Sets the retrieval mechanism.
  pub fn with_artifact_source(mut self, artifact_source: ArtifactSourceConfig) -> Self {
    self.artifact_source = artifact_source;
    self
  }

  /// The configured inter-operation delay.
  pub fn throttle(&self) -> Throttle { Throttle::new(Duration::from_millis(self.throttle_ms)) }

  /// The configured HTTP timeout.
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// Checks everything a run needs before it touches the network.
  ///
  /// Returns the parsed keyword groups, or [`GleanerError::Configuration`] when a group is empty,
  /// when there are no groups or more than [`MAX_KEYWORD_GROUPS`], when the citation threshold is
  /// zero, or when no result rows would be requested.
  pub fn validate(&self) -> Result<Vec<KeywordGroup>> {
    if self.min_citations == 0 {
      return Err(GleanerError::Configuration("min_citations must be at least 1".into()));
    }
    if self.rows == 0 {
      return Err(GleanerError::Configuration("rows must be at least 1".into()));
    }
    if self.keyword_groups.is_empty() {
      return Err(GleanerError::Configuration("at least one keyword group is required".into()));
    }
    if self.keyword_groups.len() > MAX_KEYWORD_GROUPS {
      return Err(GleanerError::Configuration(format!(
        "at most {MAX_KEYWORD_GROUPS} keyword groups are supported, got {}",
        self.keyword_groups.len()
      )));
    }

    self
      .keyword_groups
      .iter()
      .enumerate()
      .map(|(idx, raw)| {
        KeywordGroup::parse(raw).map_err(|_| {
          GleanerError::Configuration(format!("keyword group {} is empty", idx + 1))
        })
      })
      .collect()
  }
}
