use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

/// Where to find the channel: physical channel, program number within the
/// multiplex, and the virtual channel the guide reports it as.
///
/// These come from a channel scan (`dvbtee -s -a0`).
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ChannelConfig {
    /// Physical channel to tune.
    #[arg(long, env = "TVRIP_CHANNEL", default_value_t = 17)]
    pub channel: u32,

    /// Program number (service id) within the transport stream.
    #[arg(long, env = "TVRIP_PROGRAM_ID", default_value_t = 5)]
    pub program_id: u32,

    /// Virtual channel as it appears in the guide, e.g. `55.3`.
    #[arg(long, env = "TVRIP_VIRTUAL_CHANNEL", default_value = "55.3")]
    pub virtual_channel: String,
}

impl ChannelConfig {
    pub fn new(channel: u32, program_id: u32, virtual_channel: impl Into<String>) -> Self {
        Self {
            channel,
            program_id,
            virtual_channel: virtual_channel.into(),
        }
    }
}

/// Static configuration, read once at startup.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Path to the dvbtee executable.
    #[arg(long, env = "TVRIP_DVBTEE", default_value = "/usr/bin/dvbtee")]
    pub dvbtee: PathBuf,

    /// Directory recordings are written into.
    #[arg(long, env = "TVRIP_WORKDIR", default_value = "recordings")]
    pub workdir: PathBuf,

    /// Pause after a failed cycle before fetching the guide again.
    #[arg(long, env = "TVRIP_RETRY_SECONDS", default_value_t = 5)]
    pub retry_seconds: u64,

    #[command(flatten)]
    pub channel: ChannelConfig,
}

impl Config {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_seconds)
    }
}
