//! Module for writing a default [`Settings`] file.

use super::*;

/// Arguments that can be used for the [`Commands::Init`]
#[derive(Args, Clone)]
pub struct InitArgs {
  /// Where to write the settings file; defaults to the platform config directory
  #[arg(long)]
  pub path: Option<PathBuf>,
}

/// Function for the [`Commands::Init`] in the CLI.
pub async fn init<I: UserInteraction>(interaction: &I, init_args: InitArgs) -> Result<()> {
  let path = init_args.path.unwrap_or_else(Settings::default_path);

  if path.exists()
    && !interaction
      .confirm(&format!("Settings already exist at {}, overwrite them?", path.display()))?
  {
    interaction.reply(ResponseContent::Info(
      "Keeping the existing settings. Choose another location with --path",
    ))?;
    return Ok(());
  }

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, Settings::default().to_toml_string()?)?;

  interaction
    .reply(ResponseContent::Success(&format!("Wrote default settings to {}", path.display())))
}
