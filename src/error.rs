use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a single scheduling cycle.
///
/// None of these stop the loop. A missing current program is not an error at all,
/// it shows up as `None` from [crate::guide::find_current].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to start guide dump: {source}")]
    GuideFetch {
        #[source]
        source: std::io::Error,
    },

    #[error("guide dump exited unsuccessfully ({status})")]
    GuideFetchStatus { status: ExitStatus },

    #[error("failed to start recording to {path:?}: {source}")]
    RecordingLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("capture process exited unsuccessfully ({status}) without writing {path:?}")]
    RecordingExit { path: PathBuf, status: ExitStatus },

    #[error("failed to request termination of capture process {pid}: {source}")]
    Termination {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for capture process: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create working directory {path:?}: {source}")]
    Workdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
