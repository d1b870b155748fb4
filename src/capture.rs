use std::path::Path;
use std::process::Child;

use crate::config::ChannelConfig;
use crate::error::Result;
use crate::guide::Schedule;

pub mod dvbtee;

/// The external tool that owns the tuner.
///
/// It is used in two one-at-a-time modes: a short guide dump, and a long-running
/// recording into a file. Callers must never have both running.
pub trait CaptureTool {
    /// Dump the guide and return the programs for the configured virtual channel.
    /// Blocks until the tool exits.
    fn fetch_guide(&self, channel: &ChannelConfig) -> Result<Schedule>;

    /// Start recording the channel into `output`. The returned child is live and
    /// owned by the caller.
    fn record(&self, channel: &ChannelConfig, output: &Path) -> Result<Child>;
}
