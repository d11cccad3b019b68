use super::*;

pub mod init;
pub mod merge;
pub mod run;
pub mod search;

pub use init::init;
pub use merge::merge;
pub use run::run;
pub use search::search;

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write a default settings file
  Init(init::InitArgs),

  /// Search every keyword combination and list the deduplicated DOIs
  Search(search::SearchArgs),

  /// Search, download what is available and merge it into one PDF
  Run(run::RunArgs),

  /// Merge local PDF files into one
  Merge(merge::MergeArgs),
}

/// Query options shared by [`Commands::Search`] and [`Commands::Run`].
#[derive(Args, Clone)]
pub struct QueryArgs {
  /// Keyword group as whitespace-separated words; repeat for every group (at most five)
  /// Example: -k "laugh humor" -k "social evolution"
  #[arg(short, long = "keywords", value_name = "GROUP", required = true)]
  pub keywords: Vec<String>,

  /// Minimum citation count a paper must have
  #[arg(long)]
  pub min_citations: Option<u32>,

  /// Settings file to start from instead of the default location
  #[arg(long)]
  pub config: Option<PathBuf>,
}

impl QueryArgs {
  /// Settings from the chosen (or default) settings file with the command line applied on top.
  ///
  /// A missing default settings file is not an error; built-in defaults are used instead.
  pub fn settings(&self) -> Result<Settings> {
    let settings = match &self.config {
      Some(path) => Settings::from_file(path)?,
      None => {
        let path = Settings::default_path();
        if path.exists() {
          debug!("Loading settings from {}", path.display());
          Settings::from_file(path)?
        } else {
          Settings::default()
        }
      },
    };

    let settings = settings.with_keyword_groups(self.keywords.iter().cloned());
    Ok(match self.min_citations {
      Some(min_citations) => settings.with_min_citations(min_citations),
      None => settings,
    })
  }
}
