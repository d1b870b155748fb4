use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{error, info, instrument};

use crate::capture::CaptureTool;
use crate::config::ChannelConfig;
use crate::error::Result;
use crate::guide::find_current;
use crate::queue::ProcessingQueue;
use crate::recording::Session;

/// Records a channel back to back, one file per program in the guide.
///
/// Every cycle is strictly sequential: fetch the guide, pick what is on now,
/// record it to completion, queue the file. The tuner is only ever used by one
/// capture process at a time.
pub struct Scheduler<C> {
    tool: C,
    channel: ChannelConfig,
    workdir: PathBuf,
    queue: ProcessingQueue,
    retry_delay: Duration,
}

impl<C: CaptureTool> Scheduler<C> {
    pub fn new(
        tool: C,
        channel: ChannelConfig,
        workdir: impl AsRef<Path>,
        queue: ProcessingQueue,
    ) -> Self {
        Self {
            tool,
            channel,
            workdir: workdir.as_ref().to_path_buf(),
            queue,
            retry_delay: Duration::from_secs(5),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;

        self
    }

    /// Record forever. Failed cycles are logged and retried after the retry delay.
    ///
    /// There is no shutdown path: if this process is killed mid-recording, the
    /// capture process is left running.
    pub fn run(&self) -> ! {
        info!(workdir = ?self.workdir, "begin recording loop");
        loop {
            if let Err(e) = self.run_once() {
                error!(error = %e, "recording cycle failed");
                thread::sleep(self.retry_delay);
            }
        }
    }

    /// A single cycle. Returns the path that was queued.
    #[instrument(skip_all)]
    pub fn run_once(&self) -> Result<PathBuf> {
        info!("getting program guide");
        let schedule = self.tool.fetch_guide(&self.channel)?;

        let now = Local::now().naive_local();
        let program = find_current(&schedule, now).cloned();
        match &program {
            Some(program) => info!(%program, "current program"),
            None => info!(programs = schedule.len(), "no program airing now"),
        }

        let session = Session::start(&self.tool, &self.channel, &self.workdir, program, now)?;
        let path = session.finish()?;
        self.queue.push(&path);

        Ok(path)
    }
}
