//! Module for merging PDFs already on disk with [`Commands::Merge`].

use gleaner::pdf::merge_documents;

use super::*;

/// Arguments that can be used for the [`Commands::Merge`]
#[derive(Args, Clone)]
pub struct MergeArgs {
  /// PDF files to merge, in order
  #[arg(required = true)]
  pub inputs: Vec<PathBuf>,

  /// Where to write the merged PDF
  #[arg(short, long)]
  pub output: PathBuf,
}

/// Function for the [`Commands::Merge`] in the CLI.
pub async fn merge<I: UserInteraction>(interaction: &I, merge_args: MergeArgs) -> Result<()> {
  let MergeArgs { inputs, output } = merge_args;

  if output.exists()
    && !interaction.confirm(&format!("{} already exists, overwrite it?", output.display()))?
  {
    return interaction.reply(ResponseContent::Info("Nothing written"));
  }

  let report = merge_documents(&inputs, &output)?;
  for skipped in &report.skipped {
    interaction.reply(ResponseContent::Warning(&skipped.to_string()))?;
  }

  match report.output {
    Some(output) => interaction.reply(ResponseContent::Success(&format!(
      "Merged {} of {} files into {}",
      report.merged.len(),
      inputs.len(),
      output.display()
    ))),
    None => Err(GleanerdError::NothingMerged(inputs.len())),
  }
}
