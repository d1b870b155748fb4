use std::path::{Path, PathBuf};
use std::process::Child;
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::capture::CaptureTool;
use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::guide::Program;

/// Characters that are rejected by at least one common filesystem.
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Name a recording after the current program, or just the time when the guide
/// has nothing airing.
///
/// `<station>_<YYYYMMDD_HHMM>_<title>.ts` or `<YYYYMMDD_HHMM>.ts`
pub fn recording_file_name(program: Option<&Program>, now: NaiveDateTime) -> String {
    let stamp = now.format("%Y%m%d_%H%M").to_string();
    let name = match program {
        Some(program) => {
            let name = format!("{}_{}_{}", program.station, stamp, program.title);
            name.replace(ILLEGAL_FILENAME_CHARS, "")
        }
        None => stamp,
    };

    format!("{name}.ts")
}

/// One in-progress recording: what is being recorded, where to, and the
/// capture process doing it.
#[derive(Debug)]
pub struct Session {
    program: Option<Program>,
    path: PathBuf,
    child: Child,
}

impl Session {
    /// Launch the capture tool into a freshly named file under `workdir`.
    ///
    /// A missing program still records, unattended, until the tool quits by itself.
    pub fn start<C: CaptureTool + ?Sized>(
        tool: &C,
        channel: &ChannelConfig,
        workdir: &Path,
        program: Option<Program>,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let path = workdir.join(recording_file_name(program.as_ref(), now));
        info!(path = ?path, "recording");
        let child = tool.record(channel, &path)?;

        Ok(Self {
            program,
            path,
            child,
        })
    }

    /// Run the session to completion and return the finished file.
    ///
    /// With a program, sleep until it ends and then ask the capture process to
    /// stop. The process isn't checked while sleeping. Without one, block until
    /// the capture process exits on its own; an unsuccessful exit that left no
    /// file behind fails the cycle.
    pub fn finish(self) -> Result<PathBuf> {
        let Session {
            program,
            path,
            mut child,
        } = self;

        match program {
            Some(program) => {
                info!(until = %program.end, "sleeping until program ends");
                thread::sleep(remaining(&program, Local::now().naive_local()));

                if let Err(e) = terminate(&mut child) {
                    warn!(error = %e, "termination request failed, process may have exited already");
                }
                reap(child);
            }
            None => {
                info!("no current program, waiting for capture process to exit");
                let status = child.wait().map_err(|source| Error::Wait { source })?;
                if status.success() {
                    info!(%status, "capture process exited");
                } else if path.exists() {
                    warn!(%status, path = ?path, "capture process failed, keeping partial recording");
                } else {
                    return Err(Error::RecordingExit { path, status });
                }
            }
        }

        Ok(path)
    }
}

/// Time left in `program` as of `now`, zero once it has ended.
pub fn remaining(program: &Program, now: NaiveDateTime) -> Duration {
    (program.end - now).to_std().unwrap_or(Duration::ZERO)
}

/// Ask the capture process to shut down. Does not wait for it.
#[cfg(unix)]
fn terminate(child: &mut Child) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = child.id();
    debug!(pid, "sending SIGTERM to capture process");
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(|errno| Error::Termination {
        pid,
        source: errno.into(),
    })
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> Result<()> {
    let pid = child.id();
    debug!(pid, "killing capture process");
    child
        .kill()
        .map_err(|source| Error::Termination { pid, source })
}

/// Collect the exit status off the loop's thread so a stopped capture process
/// doesn't linger as a zombie.
fn reap(mut child: Child) {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name(format!("reap-{pid}"))
        .spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "capture process reaped"),
            Err(e) => warn!(pid, error = %e, "failed to reap capture process"),
        });

    if let Err(e) = spawned {
        warn!(pid, error = %e, "could not start reaper thread");
    }
}
