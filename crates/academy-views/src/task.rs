//! Cancellable background work: submission state and the simulated upload.

use std::time::Duration;

use academy_core::curriculum::ContentRef;
use tokio::{
  sync::{oneshot, watch},
  task::JoinHandle,
  time::{self, Instant},
};
use tracing::debug;
use uuid::Uuid;

/// Progress of one piece of asynchronous work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaskState {
  #[default]
  Idle,
  InFlight,
  Succeeded,
  Failed(String),
  Cancelled,
}

impl TaskState {
  pub fn is_finished(&self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed(_) | Self::Cancelled)
  }
}

// ─── Upload ──────────────────────────────────────────────────────────────────

/// Upload progress advances in this many equal steps.
pub const UPLOAD_STEPS: u8 = 10;

/// Time between progress steps.
pub const UPLOAD_CADENCE: Duration = Duration::from_millis(300);

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
  pub name:       String,
  pub media_type: String,
  pub size:       u64,
}

/// A simulated upload running on the tokio runtime.
///
/// Progress is published as a percentage through a `watch` channel. The
/// spawned task is aborted when the handle is dropped.
pub struct UploadTask {
  progress: watch::Receiver<u8>,
  state:    watch::Receiver<TaskState>,
  cancel:   Option<oneshot::Sender<()>>,
  handle:   Option<JoinHandle<Option<ContentRef>>>,
}

impl UploadTask {
  pub fn start(file: UploadFile) -> Self { Self::with_cadence(file, UPLOAD_CADENCE) }

  pub fn with_cadence(file: UploadFile, cadence: Duration) -> Self {
    let (progress_tx, progress) = watch::channel(0u8);
    let (state_tx, state) = watch::channel(TaskState::InFlight);
    let (cancel, mut cancelled) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
      let content = ContentRef {
        url:        format!("blob:{}", Uuid::new_v4()),
        media_type: Some(file.media_type),
      };
      if file.size == 0 {
        progress_tx.send_replace(100);
        state_tx.send_replace(TaskState::Succeeded);
        return Some(content);
      }

      let mut ticker = time::interval_at(Instant::now() + cadence, cadence);
      for step in 1..=UPLOAD_STEPS {
        tokio::select! {
          _ = &mut cancelled => {
            debug!(file = %file.name, step, "upload cancelled");
            state_tx.send_replace(TaskState::Cancelled);
            return None;
          }
          _ = ticker.tick() => {
            progress_tx.send_replace(step * (100 / UPLOAD_STEPS));
          }
        }
      }
      debug!(file = %file.name, url = %content.url, "upload complete");
      state_tx.send_replace(TaskState::Succeeded);
      Some(content)
    });

    Self { progress, state, cancel: Some(cancel), handle: Some(handle) }
  }

  /// The last published percentage.
  pub fn progress(&self) -> u8 { *self.progress.borrow() }

  pub fn state(&self) -> TaskState { self.state.borrow().clone() }

  /// A receiver that observes every progress step.
  pub fn subscribe(&self) -> watch::Receiver<u8> { self.progress.clone() }

  pub fn cancel(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      let _ = cancel.send(());
    }
  }

  /// Wait for the upload to end. Yields the stand-in content reference, or
  /// the final state when the upload did not succeed.
  pub async fn finish(mut self) -> Result<ContentRef, TaskState> {
    let Some(handle) = self.handle.take() else {
      return Err(TaskState::Cancelled);
    };
    match handle.await {
      Ok(Some(content)) => Ok(content),
      Ok(None) => Err(TaskState::Cancelled),
      Err(e) => Err(TaskState::Failed(e.to_string())),
    }
  }
}

impl Drop for UploadTask {
  fn drop(&mut self) {
    if let Some(handle) = &self.handle {
      handle.abort();
    }
  }
}
