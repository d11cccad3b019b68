//! Module for the search-only [`Commands::Search`].

use super::*;

/// Arguments that can be used for the [`Commands::Search`]
#[derive(Args, Clone)]
pub struct SearchArgs {
  /// The keyword groups and thresholds
  #[command(flatten)]
  pub query: QueryArgs,
}

/// Function for the [`Commands::Search`] in the CLI.
pub async fn search<I: UserInteraction>(interaction: &I, search_args: SearchArgs) -> Result<()> {
  let settings = search_args.query.settings()?;
  let gleaner = Gleaner::from_settings(&settings)?;

  let candidates = gleaner.search(&ConsoleSink::new()).await?;
  interaction.reply(ResponseContent::Candidates(&candidates))
}
