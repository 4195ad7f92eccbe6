use crate::audio::analyser::Connection;
use crate::playback::backend::PlaybackHandle;
use crate::playback::error::PipelineError;
use crate::playback::metadata::display_name;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub position: Duration,
    pub duration: Option<Duration>,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        match self.duration {
            Some(d) if !d.is_zero() => (self.position.as_secs_f32() / d.as_secs_f32()).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// One loaded file, from load until it is replaced.
pub struct PlaybackSession {
    path: PathBuf,
    name: String,
    handle: Box<dyn PlaybackHandle>,
    connection: Connection,
    playing: bool,
    last_time_update: Option<Instant>,
    time_update_due: bool,
}

impl PlaybackSession {
    pub fn new(path: &Path, handle: Box<dyn PlaybackHandle>, connection: Connection) -> Self {
        Self {
            path: path.to_path_buf(),
            name: display_name(path),
            handle,
            connection,
            playing: false,
            last_time_update: None,
            time_update_due: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration(&self) -> Option<Duration> {
        self.handle.duration()
    }

    pub fn position(&self) -> Duration {
        self.handle.position()
    }

    pub fn play(&mut self) -> Result<(), PipelineError> {
        self.handle.play()?;
        self.playing = true;
        self.time_update_due = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PipelineError> {
        self.handle.pause()?;
        self.playing = false;
        self.time_update_due = true;
        Ok(())
    }

    pub fn seek(&mut self, pos: Duration) -> Result<(), PipelineError> {
        self.handle.seek(pos)?;
        self.time_update_due = true;
        Ok(())
    }

    /// True exactly once when playback runs off the end.
    pub fn poll_ended(&mut self) -> bool {
        if self.playing && self.handle.is_finished() {
            self.playing = false;
            self.time_update_due = true;
            return true;
        }
        false
    }

    /// Playback-position callback, throttled to the media time-update cadence.
    pub fn time_update(&mut self, now: Instant) -> Option<Progress> {
        let interval_passed = self
            .last_time_update
            .map(|at| now.duration_since(at) >= TIME_UPDATE_INTERVAL)
            .unwrap_or(true);
        if !self.time_update_due && !(self.playing && interval_passed) {
            return None;
        }

        self.time_update_due = false;
        self.last_time_update = Some(now);
        Some(Progress {
            position: self.handle.position(),
            duration: self.handle.duration(),
        })
    }

    /// Pause, then sever the analyser link. The pending render frame is the
    /// pipeline's to cancel.
    pub fn teardown(mut self) {
        if let Err(e) = self.handle.pause() {
            log::warn!("pause during teardown failed: {e}");
        }
        self.handle.stop();
        self.connection.disconnect();
        log::info!("session closed: {}", self.path.display());
    }
}
