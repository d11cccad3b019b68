//! Everything the CLI prints or asks.

use dialoguer::Confirm;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for in-progress messages
pub static WORKING_PREFIX: &str = "» ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last list item
pub static LAST_ITEM_PREFIX: &str = "└─";

/// Something a command wants shown to the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Deduplicated search results.
  Candidates(&'a CandidateSet),
  /// Summary of a full run.
  Outcome(&'a RunOutcome),
  /// Files written to disk.
  Written(&'a [PathBuf]),
  /// A completed step.
  Success(&'a str),
  /// Neutral information.
  Info(&'a str),
  /// Something went only partly right.
  Warning(&'a str),
}

/// How commands talk to the user.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Shows `content`.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Interaction on the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
  /// Answer every question with yes.
  accept_defaults: bool,
}

impl Terminal {
  /// Creates a terminal interaction; `accept_defaults` skips every prompt.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults } }
}

impl UserInteraction for Terminal {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      debug!("Accepting default for prompt: {message}");
      return Ok(true);
    }
    Ok(
      Confirm::new()
        .with_prompt(format!("{} {message}", style(PROMPT_PREFIX).cyan()))
        .default(false)
        .interact()?,
    )
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Candidates(candidates) => {
        if candidates.is_empty() {
          println!("{} No results found", style(WARNING_PREFIX).yellow());
          return Ok(());
        }
        println!("{} Found {} unique papers:", style(SUCCESS_PREFIX).green(), candidates.len());
        let last = candidates.len() - 1;
        for (idx, candidate) in candidates.iter().enumerate() {
          let prefix = if idx == last { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
          println!(
            "   {} {} {}",
            style(prefix).dim(),
            style(&candidate.identifier).yellow(),
            style(format!("({} citations)", candidate.citation_count)).dim()
          );
        }
      },
      ResponseContent::Outcome(outcome) => {
        println!(
          "{} Downloaded {} of {} papers",
          style(INFO_PREFIX).cyan(),
          outcome.retrieved_count(),
          outcome.attempted.len()
        );
        if !outcome.skipped.is_empty() {
          println!(
            "{} {} downloaded files could not be merged",
            style(WARNING_PREFIX).yellow(),
            outcome.skipped.len()
          );
        }
        match &outcome.merged {
          Some(_) => println!("{} Merged PDF is ready", style(SUCCESS_PREFIX).green()),
          None => println!("{} No merged PDF was produced", style(WARNING_PREFIX).yellow()),
        }
      },
      ResponseContent::Written(paths) => {
        for path in paths {
          println!("{} Wrote {}", style(SUCCESS_PREFIX).green(), style(path.display()).yellow());
        }
      },
      ResponseContent::Success(message) => {
        println!("{} {}", style(SUCCESS_PREFIX).green(), message)
      },
      ResponseContent::Info(message) => println!("{} {}", style(INFO_PREFIX).cyan(), message),
      ResponseContent::Warning(message) => {
        println!("{} {}", style(WARNING_PREFIX).yellow(), style(message).yellow())
      },
    }
    Ok(())
  }
}

/// [`ProgressSink`] printing to the terminal.
///
/// Each progress report gets its own percentage line, so a status line never carries the fraction
/// of a step that finished earlier.
#[derive(Debug, Default)]
pub struct ConsoleSink {
  /// Bit pattern of the last reported fraction.
  fraction: AtomicU32,
}

impl ConsoleSink {
  /// Creates a sink at 0%.
  pub fn new() -> Self { Self::default() }

  /// Last reported fraction.
  pub fn fraction(&self) -> f32 { f32::from_bits(self.fraction.load(Ordering::Relaxed)) }

  /// Percentage column of progress lines.
  fn percent(&self) -> String { format!("{:>3.0}%", self.fraction() * 100.0) }

  /// Text of a status line.
  fn status_line(message: &str) -> String { format!("{WORKING_PREFIX} {message}") }
}

impl ProgressSink for ConsoleSink {
  fn on_progress(&self, fraction: f32) {
    self.fraction.store(fraction.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    println!("{} {}", style(self.percent()).dim(), style("complete").dim());
  }

  fn on_status(&self, message: &str) { println!("{}", style(Self::status_line(message)).cyan()) }

  fn on_error(&self, message: &str) {
    println!("{} {}", style(ERROR_PREFIX).red(), style(message).red());
  }

  fn on_warning(&self, message: &str) {
    println!("{} {}", style(WARNING_PREFIX).yellow(), style(message).yellow());
  }
}
