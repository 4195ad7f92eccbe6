use crate::audio::analyser::AnalyserInput;
use crate::playback::error::PipelineError;
use std::path::Path;
use std::time::Duration;

/// One decoded, playable source.
pub trait PlaybackHandle {
    /// Routes decoded samples into the analyser from now on.
    fn attach(&mut self, input: AnalyserInput);

    fn play(&mut self) -> Result<(), PipelineError>;
    fn pause(&mut self) -> Result<(), PipelineError>;

    /// Releases the output; the handle is not used afterwards.
    fn stop(&mut self);

    fn seek(&mut self, pos: Duration) -> Result<(), PipelineError>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    /// True once the source has run off the end; the position stops there.
    fn is_finished(&mut self) -> bool;
}

/// The audio platform: turns a file into a playback handle.
pub trait Backend {
    /// Returns once enough of `path` is decoded to start playback.
    fn open(&mut self, path: &Path, volume: f32) -> Result<Box<dyn PlaybackHandle>, PipelineError>;
}
