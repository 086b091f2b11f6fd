//! External encoder invocation.
//!
//! The encoder is a black-box subprocess fed a concat manifest. Its stdout and
//! stderr are relayed line by line to the log while it runs; the call returns
//! once the process has exited, and a non-zero status is an error.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;

use crate::common::constants::STDERR_TAIL_LINES;
use crate::config::Config;
use crate::error::EncodeError;

/// One encoder invocation: a camera's manifest for one day and its output video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    pub camera: String,
    /// `MMDD` of the day being rendered.
    pub day: String,
    pub manifest: PathBuf,
    pub output: PathBuf,
}

/// Something that can turn a manifest into a video.
#[cfg_attr(test, mockall::automock)]
pub trait FrameEncoder {
    fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError>;
}

/// Drives an ffmpeg-compatible binary through its concat demuxer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegEncoder {
    binary: PathBuf,
    frame_rate: u32,
    video_codec: String,
    video_filter: Option<String>,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>, frame_rate: u32, video_codec: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            frame_rate,
            video_codec: video_codec.into(),
            video_filter: None,
        }
    }

    pub fn with_video_filter(mut self, filter: Option<String>) -> Self {
        self.video_filter = filter;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.encoder, config.frame_rate, &config.video_codec)
            .with_video_filter(config.video_filter.clone())
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// The argument list for one run; `output` is always last.
    pub fn arguments(&self, manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-r".into(),
            self.frame_rate.to_string().into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            manifest.into(),
            "-c:v".into(),
            self.video_codec.clone().into(),
        ];

        if let Some(filter) = &self.video_filter {
            args.push("-vf".into());
            args.push(filter.clone().into());
        }

        args.push(output.into());
        args
    }

    /// Encode `manifest` into `output`, blocking until the encoder exits.
    pub fn run(&self, manifest: &Path, output: &Path) -> Result<(), EncodeError> {
        let mut child = Command::new(&self.binary)
            .args(self.arguments(manifest, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EncodeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout_relay = child.stdout.take().map(|out| spawn_relay("stdout", out));
        let stderr_relay = child.stderr.take().map(|err| spawn_relay("stderr", err));

        let status = child.wait();

        if let Some(handle) = stdout_relay {
            let _ = handle.join();
        }
        let stderr_tail = stderr_relay
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        let status = status.map_err(EncodeError::Wait)?;
        if !status.success() {
            return Err(EncodeError::Exit {
                code: status.code(),
                stderr_tail,
            });
        }

        Ok(())
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
        self.run(&job.manifest, &job.output)
    }
}

/// Relay a child stream to the log, keeping the last few lines.
///
/// ffmpeg rewrites its progress line with `\r`, so those are split too.
fn spawn_relay(label: &'static str, stream: impl Read + Send + 'static) -> JoinHandle<Vec<String>> {
    std::thread::spawn(move || {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let reader = BufReader::new(stream);

        for chunk in reader.split(b'\n') {
            let Ok(chunk) = chunk else {
                break;
            };
            let text = String::from_utf8_lossy(&chunk);

            for line in text.split('\r').map(str::trim_end).filter(|l| !l.is_empty()) {
                log_indented!("[{label}] {line}");
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            }
        }

        tail.into_iter().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_template() {
        let encoder = FfmpegEncoder::new("ffmpeg", 24, "libx264");
        let args = encoder.arguments(Path::new("/tmp/0621.txt"), Path::new("/tmp/0621.mp4"));

        let expected: Vec<OsString> = [
            "-y", "-r", "24", "-f", "concat", "-safe", "0", "-i", "/tmp/0621.txt", "-c:v",
            "libx264", "/tmp/0621.mp4",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_video_filter_precedes_output() {
        let encoder = FfmpegEncoder::new("ffmpeg", 30, "libx265")
            .with_video_filter(Some("format=yuv420p".to_string()));
        let args = encoder.arguments(Path::new("m.txt"), Path::new("out.mp4"));

        let n = args.len();
        assert_eq!(args[n - 3], OsString::from("-vf"));
        assert_eq!(args[n - 2], OsString::from("format=yuv420p"));
        assert_eq!(args[n - 1], OsString::from("out.mp4"));
        assert_eq!(args[2], OsString::from("30"));
    }

    #[test]
    #[serial_test::serial]
    fn test_missing_binary_is_spawn_error() {
        let encoder = FfmpegEncoder::new("/nonexistent/daylapse-encoder", 24, "libx264");
        let result = encoder.run(Path::new("m.txt"), Path::new("out.mp4"));
        assert!(matches!(result, Err(EncodeError::Spawn { .. })));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use serial_test::serial;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::tempdir;

        fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        #[serial]
        fn test_successful_encode_receives_arguments() {
            let dir = tempdir().unwrap();
            let args_file = dir.path().join("args.txt");
            let script = write_script(
                dir.path(),
                "encoder.sh",
                &format!(
                    "for a in \"$@\"; do echo \"$a\" >> '{}'; done\necho working\necho 'frame=1\rframe=2' >&2\nexit 0",
                    args_file.display()
                ),
            );

            let encoder = FfmpegEncoder::new(&script, 12, "libx264");
            let job = EncodeJob {
                camera: "camA".to_string(),
                day: "0621".to_string(),
                manifest: dir.path().join("0621.txt"),
                output: dir.path().join("0621.mp4"),
            };
            encoder.encode(&job).unwrap();

            let recorded = fs::read_to_string(&args_file).unwrap();
            let recorded: Vec<&str> = recorded.lines().collect();
            assert_eq!(recorded[0], "-y");
            assert_eq!(recorded[2], "12");
            assert_eq!(recorded[8], job.manifest.to_str().unwrap());
            assert_eq!(*recorded.last().unwrap(), job.output.to_str().unwrap());
        }

        #[test]
        #[serial]
        fn test_non_zero_exit_is_reported_with_stderr_tail() {
            let dir = tempdir().unwrap();
            let script = write_script(
                dir.path(),
                "failing.sh",
                "echo 'first problem' >&2\necho 'Invalid data found' >&2\nexit 3",
            );

            let encoder = FfmpegEncoder::new(&script, 24, "libx264");
            let result = encoder.run(&dir.path().join("m.txt"), &dir.path().join("out.mp4"));

            match result {
                Err(EncodeError::Exit { code, stderr_tail }) => {
                    assert_eq!(code, Some(3));
                    assert_eq!(stderr_tail, vec!["first problem", "Invalid data found"]);
                }
                other => panic!("expected exit error, got {other:?}"),
            }
        }

        #[test]
        #[serial]
        fn test_stderr_tail_is_bounded() {
            let dir = tempdir().unwrap();
            let script = write_script(
                dir.path(),
                "noisy.sh",
                "i=0\nwhile [ $i -lt 50 ]; do echo \"line $i\" >&2; i=$((i+1)); done\nexit 1",
            );

            let encoder = FfmpegEncoder::new(&script, 24, "libx264");
            let result = encoder.run(&dir.path().join("m.txt"), &dir.path().join("out.mp4"));

            let Err(EncodeError::Exit { stderr_tail, .. }) = result else {
                panic!("expected exit error");
            };
            assert_eq!(stderr_tail.len(), STDERR_TAIL_LINES);
            assert_eq!(stderr_tail.last().unwrap(), "line 49");
            assert_eq!(stderr_tail.first().unwrap(), "line 30");
        }
    }
}
