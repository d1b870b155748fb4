use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{debug, info, instrument};

use crate::capture::CaptureTool;
use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::guide::{parse_guide, Schedule};

/// [CaptureTool] backed by the `dvbtee` executable.
#[derive(Debug, Clone)]
pub struct DvbteeCapture {
    executable: PathBuf,
}

impl DvbteeCapture {
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
        }
    }

    fn command(&self, channel: &ChannelConfig) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .arg(format!("-c{}", channel.channel))
            .arg(format!("-I{}", channel.program_id));

        command
    }
}

impl CaptureTool for DvbteeCapture {
    #[instrument(skip_all, fields(channel = channel.channel, program_id = channel.program_id))]
    fn fetch_guide(&self, channel: &ChannelConfig) -> Result<Schedule> {
        debug!(executable = ?self.executable, "dumping guide");
        let output = self
            .command(channel)
            .arg("-E")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::GuideFetch { source })?;

        if !output.status.success() {
            return Err(Error::GuideFetchStatus {
                status: output.status,
            });
        }

        // dvbtee logs guide events on stderr; stdout is read as well in case a
        // build routes its log there.
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let schedule = parse_guide(
            stderr.lines().chain(stdout.lines()),
            &channel.virtual_channel,
        );

        info!(
            programs = schedule.len(),
            virtual_channel = channel.virtual_channel.as_str(),
            "guide fetched"
        );

        Ok(schedule)
    }

    #[instrument(skip_all, fields(output = ?output))]
    fn record(&self, channel: &ChannelConfig, output: &Path) -> Result<Child> {
        let child = self
            .command(channel)
            .arg(format!("-ofile://{}", output.display()))
            .arg("-q")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::RecordingLaunch {
                path: output.to_path_buf(),
                source,
            })?;

        debug!(pid = child.id(), "capture process started");

        Ok(child)
    }
}

#[cfg(all(test, unix))]
mod test {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use crate::capture::dvbtee::DvbteeCapture;
    use crate::capture::CaptureTool;
    use crate::config::ChannelConfig;
    use crate::error::Error;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("dvbtee");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn channel() -> ChannelConfig {
        ChannelConfig::new(17, 5, "55.3")
    }

    #[test]
    pub fn test_guide_from_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(
            dir.path(),
            r#"[ "$1" = "-c17" ] && [ "$2" = "-I5" ] && [ "$3" = "-E" ] || exit 3
echo "tuning..."
printf 'dump_epg_event: id:3 - 55.3: Movies!\t2023-01-26 07:35-09:15 Danger Signal\n' >&2
printf 'dump_epg_event: id:4 - 55.1: CBS\t2023-01-26 07:00-08:00 News\n' >&2
printf 'dump_epg_event: id:3 - 55.3: MOVIES!\t2023-01-26 07:35-09:15 Danger Signal\n' >&2"#,
        );

        let schedule = DvbteeCapture::new(&tool).fetch_guide(&channel()).unwrap();

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.iter().next().unwrap().title, "Danger Signal");
    }

    #[test]
    pub fn test_empty_guide_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "echo 'no EIT found' >&2");

        let schedule = DvbteeCapture::new(&tool).fetch_guide(&channel()).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    pub fn test_guide_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "exit 2");

        let result = DvbteeCapture::new(&tool).fetch_guide(&channel());
        assert!(matches!(result, Err(Error::GuideFetchStatus { .. })));
    }

    #[test]
    pub fn test_guide_missing_executable() {
        let dir = tempfile::tempdir().unwrap();

        let result = DvbteeCapture::new(dir.path().join("missing")).fetch_guide(&channel());
        assert!(matches!(result, Err(Error::GuideFetch { .. })));
    }

    #[test]
    pub fn test_record_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let args_file = dir.path().join("args");
        let tool = script(
            dir.path(),
            &format!("echo \"$@\" > '{}'", args_file.display()),
        );
        let output = dir.path().join("20230126_0735.ts");

        let mut child = DvbteeCapture::new(&tool).record(&channel(), &output).unwrap();
        assert!(child.wait().unwrap().success());

        let args = fs::read_to_string(&args_file).unwrap();
        assert_eq!(
            args.trim(),
            format!("-c17 -I5 -ofile://{} -q", output.display())
        );
    }

    #[test]
    pub fn test_record_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");

        let result = DvbteeCapture::new(dir.path().join("missing")).record(&channel(), &output);
        match result {
            Err(Error::RecordingLaunch { path, .. }) => assert_eq!(path, output),
            other => panic!("expected launch error, got {other:?}"),
        }
    }
}
