use std::path::{Path, PathBuf};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// Hand-off point for finished recordings.
///
/// The recorder only ever appends. Whatever processes the files (transcoding,
/// moving them off the capture box) owns the [UnboundedReceiver] end.
#[derive(Debug, Clone)]
pub struct ProcessingQueue {
    sender: UnboundedSender<PathBuf>,
}

impl ProcessingQueue {
    pub fn channel() -> (Self, UnboundedReceiver<PathBuf>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        (Self { sender }, receiver)
    }

    /// Queue a completed recording. Returns `false` if nothing is listening anymore.
    pub fn push(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref().to_path_buf();
        info!(path = ?path, "queued for processing");

        match self.sender.send(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = ?e.0, "processing queue closed, dropping recording");
                false
            }
        }
    }
}
