//! Module for the full search, download and merge [`Commands::Run`].

use super::*;

/// Arguments that can be used for the [`Commands::Run`]
#[derive(Args, Clone)]
pub struct RunArgs {
  /// The keyword groups and thresholds
  #[command(flatten)]
  pub query: QueryArgs,

  /// Directory the merged PDF and the identifier list are written to
  #[arg(long, default_value = ".")]
  pub out: PathBuf,

  /// Pause after every remote request, in milliseconds
  #[arg(long)]
  pub throttle_ms: Option<u64>,
}

/// Function for the [`Commands::Run`] in the CLI.
pub async fn run<I: UserInteraction>(interaction: &I, run_args: RunArgs) -> Result<()> {
  let RunArgs { query, out, throttle_ms } = run_args;
  let settings = query.settings()?;
  let settings = match throttle_ms {
    Some(throttle_ms) => settings.with_throttle_ms(throttle_ms),
    None => settings,
  };
  let gleaner = Gleaner::from_settings(&settings)?;

  let outcome = gleaner.run(&ConsoleSink::new()).await?;
  interaction.reply(ResponseContent::Outcome(&outcome))?;

  let written = outcome.export(&out)?;
  interaction.reply(ResponseContent::Written(&written))
}
