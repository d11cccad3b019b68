//! Keyword groups and the combinations drawn from them.
//!
//! A [`Combination`] picks one word from every [`KeywordGroup`]. [`combinations`] enumerates the full
//! cross-product in group-declaration order, with the last group varying fastest:
//!
//! ```
//! use gleaner::query::{combinations, KeywordGroup};
//!
//! let groups = vec![
//!   KeywordGroup::parse("laugh humor").unwrap(),
//!   KeywordGroup::parse("social evolution").unwrap(),
//! ];
//! let queries: Vec<String> = combinations(&groups).iter().map(|c| c.query()).collect();
//! assert_eq!(queries, ["laugh social", "laugh evolution", "humor social", "humor evolution"]);
//! ```

use super::*;

/// Ordered, non-empty list of alternative words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeywordGroup(Vec<String>);

impl KeywordGroup {
  /// Splits a whitespace-separated token list into a group.
  ///
  /// Returns [`GleanerError::Configuration`] if the input holds no tokens.
  pub fn parse(input: &str) -> Result<Self> {
    Self::new(input.split_whitespace().map(String::from).collect())
  }

  /// Builds a group from already separated words, dropping blank entries.
  pub fn new(words: Vec<String>) -> Result<Self> {
    let words: Vec<String> =
      words.into_iter().map(|w| w.trim().to_string()).filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
      return Err(GleanerError::Configuration("keyword groups must not be empty".into()));
    }
    Ok(Self(words))
  }

  /// The words of this group, in order.
  pub fn words(&self) -> &[String] { &self.0 }

  /// Number of words in this group.
  pub fn len(&self) -> usize { self.0.len() }

  /// Always `false`; a group is never constructed empty.
  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl TryFrom<String> for KeywordGroup {
  type Error = GleanerError;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<KeywordGroup> for String {
  fn from(group: KeywordGroup) -> Self { group.0.join(" ") }
}

impl Display for KeywordGroup {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0.join(" "))
  }
}

/// One word from each keyword group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination(Vec<String>);

impl Combination {
  /// Builds a combination from its words.
  pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
    Self(words.into_iter().map(Into::into).collect())
  }

  /// The words, one per group.
  pub fn words(&self) -> &[String] { &self.0 }

  /// Free-text query: the words joined by single spaces, order preserved.
  pub fn query(&self) -> String { self.0.join(" ") }

  /// Whether every word occurs in `title`, ignoring case.
  pub fn is_contained_in(&self, title: &str) -> bool {
    let title = title.to_lowercase();
    self.0.iter().all(|word| title.contains(&word.to_lowercase()))
  }
}

impl Display for Combination {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0.join(" + "))
  }
}

/// Full cross-product of `groups`, first group varying slowest.
///
/// Returns an empty list when `groups` is empty.
pub fn combinations(groups: &[KeywordGroup]) -> Vec<Combination> {
  if groups.is_empty() {
    return Vec::new();
  }

  groups
    .iter()
    .fold(vec![Vec::new()], |partials: Vec<Vec<String>>, group| {
      partials
        .iter()
        .flat_map(|partial| {
          group.words().iter().map(move |word| {
            let mut next = partial.clone();
            next.push(word.clone());
            next
          })
        })
        .collect()
    })
    .into_iter()
    .map(Combination)
    .collect()
}
