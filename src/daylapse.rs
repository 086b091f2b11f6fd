//! Run coordinator: one window, every camera, one video each.
//!
//! A run computes the twilight window once and then walks the configured
//! cameras strictly in order. For each camera it:
//! 1. locates candidate frames under the dawn day and the dusk day
//! 2. keeps only those inside the window
//! 3. writes a concat manifest into `<camera>/<year>/temp/`
//! 4. hands the manifest to the encoder and waits for it
//! 5. removes the manifest, whatever happened in 3 and 4
//!
//! A camera that fails is recorded in the [`RunSummary`] and the run moves on.
//! Only a failure before the first camera (window, lock) aborts the run.
//!
//! ```no_run
//! use daylapse::{Daylapse, config::Config, encoder::FfmpegEncoder};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let encoder = FfmpegEncoder::from_config(&config);
//! let summary = Daylapse::new(config, Box::new(encoder)).debug(true).run()?;
//! std::process::exit(summary.exit_code());
//! # }
//! ```

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::constants::*;
use crate::common::utils::{plural, private_path};
use crate::config::Config;
use crate::encoder::{EncodeJob, FrameEncoder};
use crate::error::CameraError;
use crate::frames::{self, WindowFilter};
use crate::geo::{Window, log_window_details};
use crate::io::lock::RunLock;
use crate::playlist::Playlist;
use crate::time_source::{RealTimeSource, TimeSource};

/// Why a camera produced no video without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyCameraId,
    /// Nothing on disk falls inside the window.
    NoFrames,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyCameraId => write!(f, "empty camera id"),
            SkipReason::NoFrames => write!(f, "no frames inside the window"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraOutcome {
    Encoded { output: PathBuf, frames: usize },
    /// Dry run: frames that would have been encoded.
    Planned { output: PathBuf, frames: usize },
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraReport {
    pub camera: String,
    pub outcome: CameraOutcome,
}

/// What happened to each camera, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub window: Window,
    pub reports: Vec<CameraReport>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&CameraOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn encoded(&self) -> usize {
        self.count(|o| matches!(o, CameraOutcome::Encoded { .. } | CameraOutcome::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CameraOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CameraOutcome::Failed(_)))
    }

    /// 0 when every camera was encoded or skipped, 2 when any failed.
    pub fn exit_code(&self) -> i32 {
        if self.failed() > 0 {
            EXIT_PARTIAL
        } else {
            EXIT_SUCCESS
        }
    }

    pub fn log_summary(&self) {
        log_block_start!(
            "Run finished: {} encoded, {} skipped, {} failed",
            self.encoded(),
            self.skipped(),
            self.failed()
        );
        for report in &self.reports {
            match &report.outcome {
                CameraOutcome::Encoded { output, frames } => log_indented!(
                    "{}: {} -> {}",
                    report.camera,
                    plural(*frames, "frame"),
                    private_path(output)
                ),
                CameraOutcome::Planned { output, frames } => log_indented!(
                    "{}: {} (dry run, would write {})",
                    report.camera,
                    plural(*frames, "frame"),
                    private_path(output)
                ),
                CameraOutcome::Skipped(reason) => {
                    log_indented!("{}: skipped ({reason})", report.camera)
                }
                CameraOutcome::Failed(message) => {
                    log_indented!("{}: failed ({message})", report.camera)
                }
            }
        }
    }
}

/// Removes the manifest when dropped, on every exit path.
struct ManifestGuard<'a> {
    path: &'a Path,
}

impl Drop for ManifestGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log_warning!(
                "Failed to remove manifest {}: {e}",
                private_path(self.path)
            );
        }
    }
}

/// Builder for one timelapse run.
pub struct Daylapse {
    config: Config,
    encoder: Box<dyn FrameEncoder>,
    time_source: Box<dyn TimeSource>,
    debug_enabled: bool,
    dry_run: bool,
    create_lock: bool,
}

impl Daylapse {
    pub fn new(config: Config, encoder: Box<dyn FrameEncoder>) -> Self {
        Self {
            config,
            encoder,
            time_source: Box::new(RealTimeSource),
            debug_enabled: false,
            dry_run: false,
            create_lock: true,
        }
    }

    /// Replace the system clock (used by `--at` and tests).
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    /// Locate and filter only; write nothing and never start the encoder.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Skip the run lock on the storage root.
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute the window for the current time source and log it.
    pub fn window(&self) -> Result<Window> {
        let now = self.time_source.now();
        let calculator = self.config.calculator();

        if self.time_source.is_fixed() {
            log_block_start!("Using fixed time {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
        }

        let window = calculator.compute_window(now).with_context(|| {
            format!(
                "Failed to compute the twilight window for {}",
                now.format("%Y-%m-%d %H:%M:%S UTC")
            )
        })?;

        log_window_details(&calculator, &window, self.debug_enabled);
        Ok(window)
    }

    /// Execute the run: window, lock, then every camera in order.
    pub fn run(&self) -> Result<RunSummary> {
        let window = self.window()?;

        let _lock = if self.create_lock && !self.dry_run {
            let lock = RunLock::acquire(&self.config.storage_root)
                .context("Failed to lock the storage root")?;
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Holding run lock {}", private_path(lock.path()));
            }
            Some(lock)
        } else {
            None
        };

        Ok(self.process_all(&window))
    }

    /// Process every configured camera against `window`.
    pub fn process_all(&self, window: &Window) -> RunSummary {
        let reports = self
            .config
            .cameras
            .iter()
            .map(|camera| CameraReport {
                camera: camera.clone(),
                outcome: self.process_camera(camera, window),
            })
            .collect();

        RunSummary {
            window: *window,
            reports,
        }
    }

    /// Process one camera; failures are logged and returned as an outcome.
    pub fn process_camera(&self, camera: &str, window: &Window) -> CameraOutcome {
        if camera.trim().is_empty() {
            return CameraOutcome::Skipped(SkipReason::EmptyCameraId);
        }

        log_block_start!("Camera {camera}");

        match self.try_camera(camera, window) {
            Ok(CameraOutcome::Skipped(reason)) => {
                log_pipe!();
                log_warning!("{camera}: skipped, {reason}");
                CameraOutcome::Skipped(reason)
            }
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                log_pipe!();
                log_error!("{camera}: {message}");
                CameraOutcome::Failed(message)
            }
        }
    }

    fn try_camera(&self, camera: &str, window: &Window) -> Result<CameraOutcome, CameraError> {
        let camera_root = self.config.camera_root(camera);

        let dawn_day = frames::locate(
            &camera_root,
            window.start.year,
            &window.start.month_day_key(),
        )?;
        let dusk_day = frames::locate(&camera_root, window.end.year, &window.end.month_day_key())?;
        let (candidates, duplicates) = frames::merge_candidates(dawn_day, dusk_day);

        let candidate_count = candidates.len();
        let selected = WindowFilter::from_window(window).apply(candidates);

        if self.debug_enabled {
            log_debug!(
                "{} located, {} inside the window",
                plural(candidate_count, "candidate"),
                selected.len()
            );
            if duplicates > 0 {
                log_indented!("Dropped {} seen on both days", plural(duplicates, "duplicate"));
            }
        }

        if selected.is_empty() {
            return Ok(CameraOutcome::Skipped(SkipReason::NoFrames));
        }

        let temp_dir = camera_root.join(window.start.year_key()).join(TEMP_DIR_NAME);
        let day = window.start.month_day_key();
        let manifest = temp_dir.join(format!("{day}.{MANIFEST_EXTENSION}"));
        let output = temp_dir.join(format!("{day}.{VIDEO_EXTENSION}"));
        let frame_count = selected.len();

        if self.dry_run {
            log_indented!(
                "Dry run: {} would be encoded into {}",
                plural(frame_count, "frame"),
                private_path(&output)
            );
            return Ok(CameraOutcome::Planned {
                output,
                frames: frame_count,
            });
        }

        fs::create_dir_all(&temp_dir).map_err(|source| CameraError::TempDir {
            path: temp_dir.clone(),
            source,
        })?;

        let _guard = ManifestGuard { path: &manifest };
        let playlist = Playlist::build(selected, &camera_root)?;
        playlist.write_manifest(&manifest)?;

        log_indented!(
            "Encoding {} into {}",
            plural(playlist.len(), "frame"),
            private_path(&output)
        );

        let job = EncodeJob {
            camera: camera.to_string(),
            day,
            manifest: manifest.clone(),
            output: output.clone(),
        };
        self.encoder.encode(&job)?;

        log_decorated!("Wrote {}", private_path(&output));
        Ok(CameraOutcome::Encoded {
            output,
            frames: frame_count,
        })
    }
}
