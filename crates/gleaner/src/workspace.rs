//! Per-run working storage.
//!
//! Every run gets its own temporary directory with a `papers/` folder for retrieved artifacts and an
//! `output/` folder for the merged document. Nothing is shared between runs, and the directory is
//! removed when the [`RunWorkspace`] is dropped.

use tempfile::TempDir;

use super::*;

lazy_static! {
  /// Characters that are not kept verbatim in artifact file names.
  static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9.-]").unwrap();
}

/// An isolated working directory owned by one run.
#[derive(Debug)]
pub struct RunWorkspace {
  /// Root of the temporary directory; removed on drop.
  root:       TempDir,
  /// Where artifacts are retrieved to.
  papers_dir: PathBuf,
  /// Where the merged document is written.
  output_dir: PathBuf,
}

impl RunWorkspace {
  /// Allocates a fresh temporary workspace.
  pub fn allocate() -> Result<Self> {
    Self::from_temp_dir(tempfile::Builder::new().prefix("gleaner-").tempdir()?)
  }

  /// Allocates a fresh workspace underneath `parent`.
  pub fn allocate_in(parent: impl AsRef<Path>) -> Result<Self> {
    std::fs::create_dir_all(parent.as_ref())?;
    Self::from_temp_dir(tempfile::Builder::new().prefix("gleaner-").tempdir_in(parent)?)
  }

  /// Lays out the sub-directories inside an existing temporary directory.
  fn from_temp_dir(root: TempDir) -> Result<Self> {
    let papers_dir = root.path().join("papers");
    let output_dir = root.path().join("output");
    std::fs::create_dir_all(&papers_dir)?;
    std::fs::create_dir_all(&output_dir)?;
    debug!("Allocated run workspace at {}", root.path().display());
    Ok(Self { root, papers_dir, output_dir })
  }

  /// Root of the workspace.
  pub fn path(&self) -> &Path { self.root.path() }

  /// Directory holding retrieved artifacts.
  pub fn papers_dir(&self) -> &Path { &self.papers_dir }

  /// Directory holding the merged document.
  pub fn output_dir(&self) -> &Path { &self.output_dir }

  /// Destination for an artifact with the given file name.
  pub fn artifact_path(&self, file_name: &str) -> PathBuf { self.papers_dir.join(file_name) }
}

/// File name for an identifier's artifact.
///
/// The mapping is one-to-one. A `/` becomes `_`, and every other byte outside `[A-Za-z0-9.-]`
/// (including `_` and `~` themselves) is written as `~` followed by two upper-case hex digits. Path
/// separators therefore never escape the papers directory, and distinct identifiers never share a
/// file.
///
/// ```
/// use gleaner::workspace::artifact_file_name;
///
/// assert_eq!(artifact_file_name("10.1145/1327452.1327492"), "10.1145_1327452.1327492.pdf");
/// assert_eq!(artifact_file_name("10.1002/a(b)"), "10.1002_a~28b~29.pdf");
/// ```
pub fn artifact_file_name(identifier: &str) -> String {
  let stem = UNSAFE_FILENAME_CHARS.replace_all(identifier, |caps: &regex::Captures| {
    match &caps[0] {
      "/" => "_".to_string(),
      other => escape_bytes(other),
    }
  });
  // A bare "." or ".." would still resolve outside the file itself.
  let stem =
    if stem.chars().all(|c| c == '.') { escape_bytes(&stem) } else { stem.into_owned() };
  format!("{stem}.pdf")
}

/// `~XX` for every byte of `text`.
fn escape_bytes(text: &str) -> String { text.bytes().map(|b| format!("~{b:02X}")).collect() }
