//! Progress reporting contract between the pipeline and whatever presents it.
//!
//! The pipeline calls a [`ProgressSink`] synchronously, at most once per throttled step, and never
//! waits on it for anything. Sinks only observe; they cannot change the run.

use std::sync::Mutex;

use super::*;

/// Receiver of progress events.
///
/// Implementations must not panic back into the caller. `on_error` and `on_warning` fall back to
/// `on_status` for sinks that only render plain status lines.
pub trait ProgressSink: Send + Sync {
  /// Completed fraction of the current phase, in `[0, 1]`.
  fn on_progress(&self, fraction: f32);

  /// Human-readable status line.
  fn on_status(&self, message: &str);

  /// A recoverable error for one item.
  fn on_error(&self, message: &str) { self.on_status(message) }

  /// A terminal-but-not-fatal outcome such as an empty result set.
  fn on_warning(&self, message: &str) { self.on_status(message) }
}

impl<T: ProgressSink + ?Sized> ProgressSink for &T {
  fn on_progress(&self, fraction: f32) { (**self).on_progress(fraction) }

  fn on_status(&self, message: &str) { (**self).on_status(message) }

  fn on_error(&self, message: &str) { (**self).on_error(message) }

  fn on_warning(&self, message: &str) { (**self).on_warning(message) }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
  fn on_progress(&self, _fraction: f32) {}

  fn on_status(&self, _message: &str) {}
}

/// Forwards events to `tracing`, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
  fn on_progress(&self, fraction: f32) { debug!("progress: {:.0}%", fraction * 100.0) }

  fn on_status(&self, message: &str) { info!("{message}") }

  fn on_error(&self, message: &str) { tracing::error!("{message}") }

  fn on_warning(&self, message: &str) { warn!("{message}") }
}

/// A single observed event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
  /// See [`ProgressSink::on_progress`].
  Progress(f32),
  /// See [`ProgressSink::on_status`].
  Status(String),
  /// See [`ProgressSink::on_error`].
  Error(String),
  /// See [`ProgressSink::on_warning`].
  Warning(String),
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
  /// Events received so far.
  events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
  /// Creates an empty recorder.
  pub fn new() -> Self { Self::default() }

  /// Snapshot of all events received so far.
  pub fn events(&self) -> Vec<ProgressEvent> { self.lock().clone() }

  /// All progress fractions, in order.
  pub fn fractions(&self) -> Vec<f32> {
    self
      .lock()
      .iter()
      .filter_map(|e| match e {
        ProgressEvent::Progress(f) => Some(*f),
        _ => None,
      })
      .collect()
  }

  /// All error messages, in order.
  pub fn errors(&self) -> Vec<String> {
    self
      .lock()
      .iter()
      .filter_map(|e| match e {
        ProgressEvent::Error(m) => Some(m.clone()),
        _ => None,
      })
      .collect()
  }

  /// All warning messages, in order.
  pub fn warnings(&self) -> Vec<String> {
    self
      .lock()
      .iter()
      .filter_map(|e| match e {
        ProgressEvent::Warning(m) => Some(m.clone()),
        _ => None,
      })
      .collect()
  }

  /// Appends an event.
  fn push(&self, event: ProgressEvent) { self.lock().push(event) }

  /// Locks the event list. Events are plain data, so a poisoned lock is still usable.
  fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ProgressEvent>> {
    self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl ProgressSink for RecordingSink {
  fn on_progress(&self, fraction: f32) { self.push(ProgressEvent::Progress(fraction)) }

  fn on_status(&self, message: &str) { self.push(ProgressEvent::Status(message.to_string())) }

  fn on_error(&self, message: &str) { self.push(ProgressEvent::Error(message.to_string())) }

  fn on_warning(&self, message: &str) { self.push(ProgressEvent::Warning(message.to_string())) }
}

/// Completed fraction of `total` after `done` steps; an empty phase counts as complete.
pub(crate) fn fraction(done: usize, total: usize) -> f32 {
  if total == 0 {
    1.0
  } else {
    done as f32 / total as f32
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_recording_sink_keeps_order() {
    let sink = RecordingSink::new();
    sink.on_status("Searching combination: a + b");
    sink.on_progress(0.5);
    sink.on_error("boom");
    sink.on_warning("nothing");
    sink.on_progress(1.0);

    assert_eq!(sink.fractions(), vec![0.5, 1.0]);
    assert_eq!(sink.errors(), vec!["boom".to_string()]);
    assert_eq!(sink.warnings(), vec!["nothing".to_string()]);
    assert_eq!(sink.events()[0], ProgressEvent::Status("Searching combination: a + b".into()));
  }

  #[test]
  fn test_default_error_routes_to_status() {
    struct StatusOnly(Mutex<Vec<String>>);
    impl ProgressSink for StatusOnly {
      fn on_progress(&self, _fraction: f32) {}

      fn on_status(&self, message: &str) { self.0.lock().unwrap().push(message.to_string()) }
    }

    let sink = StatusOnly(Mutex::new(Vec::new()));
    sink.on_error("failed");
    sink.on_warning("empty");
    assert_eq!(*sink.0.lock().unwrap(), vec!["failed".to_string(), "empty".to_string()]);
  }

  #[test]
  fn test_fraction() {
    assert_eq!(fraction(0, 0), 1.0);
    assert_eq!(fraction(1, 4), 0.25);
    assert_eq!(fraction(4, 4), 1.0);
  }
}
