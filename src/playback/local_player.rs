use crate::audio::analyser::AnalyserInput;
use crate::audio::tap::TapSource;
use crate::playback::backend::{Backend, PlaybackHandle};
use crate::playback::error::PipelineError;
use crate::playback::metadata;
use crate::playback::probe::probe;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

type FileDecoder = Decoder<BufReader<File>>;

/// rodio-backed audio platform. The output device is opened on first use.
pub struct RodioBackend {
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self { output: None }
    }

    fn output_handle(&mut self) -> Result<OutputStreamHandle, PipelineError> {
        if let Some((_, handle)) = &self.output {
            return Ok(handle.clone());
        }
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PipelineError::NoOutputDevice(e.to_string()))?;
        log::info!("audio output opened");
        self.output = Some((stream, handle.clone()));
        Ok(handle)
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RodioBackend {
    fn open(&mut self, path: &Path, volume: f32) -> Result<Box<dyn PlaybackHandle>, PipelineError> {
        // readiness: the first packet must decode before anything touches the device
        let probed = probe(path)?;
        let info = metadata::read_track_info(path);
        let duration = info.duration.or(probed.duration);
        log::info!(
            "decoded {}: {} Hz, {} ch, duration {:?}",
            info.name,
            probed.sample_rate.unwrap_or_default(),
            probed.channels.unwrap_or_default(),
            duration
        );
        let decoder = open_decoder(path)?;

        let handle = self.output_handle()?;
        let sink = new_sink(&handle, volume)?;

        Ok(Box::new(LocalPlayback {
            handle,
            sink,
            path: path.to_path_buf(),
            duration,
            volume,
            pending: Some(decoder),
            input: None,
            clock: PlayClock::default(),
        }))
    }
}

fn open_decoder(path: &Path) -> Result<FileDecoder, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| PipelineError::decode(path, e))
}

fn new_sink(handle: &OutputStreamHandle, volume: f32) -> Result<Sink, PipelineError> {
    let sink = Sink::try_new(handle).map_err(|e| PipelineError::NoOutputDevice(e.to_string()))?;
    sink.pause();
    sink.set_volume(volume.clamp(0.0, 1.0));
    Ok(sink)
}

struct LocalPlayback {
    handle: OutputStreamHandle,
    sink: Sink,

    path: PathBuf,
    duration: Option<Duration>,
    volume: f32,

    // decoded but not yet queued; queued on attach or first play
    pending: Option<FileDecoder>,
    input: Option<AnalyserInput>,

    clock: PlayClock,
}

/// Playback position bookkeeping: the last seek target plus time spent running.
#[derive(Debug, Default, Clone, Copy)]
struct PlayClock {
    base_seek: Duration,
    started_at: Option<Instant>,
    paused_acc: Duration,
}

impl PlayClock {
    fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    fn stop(&mut self, now: Instant) {
        if let Some(start) = self.started_at.take() {
            self.paused_acc += now.saturating_duration_since(start);
        }
    }

    fn reset(&mut self, pos: Duration) {
        *self = Self {
            base_seek: pos,
            ..Self::default()
        };
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .started_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.base_seek + self.paused_acc + running
    }
}

/// A drained sink was never paused, yet nothing is playing.
fn resume_after_seek(sink_paused: bool, sink_drained: bool) -> bool {
    !sink_paused && !sink_drained
}

impl LocalPlayback {
    fn append(&mut self, decoder: FileDecoder, skip: Duration) {
        let src = decoder.convert_samples::<f32>().skip_duration(skip);
        match &self.input {
            Some(input) => self.sink.append(TapSource::new(src, input.clone())),
            None => self.sink.append(src),
        }
    }

    fn flush_pending(&mut self) {
        if let Some(decoder) = self.pending.take() {
            self.append(decoder, Duration::ZERO);
        }
    }
}

impl PlaybackHandle for LocalPlayback {
    fn attach(&mut self, input: AnalyserInput) {
        self.input = Some(input);
        self.flush_pending();
    }

    fn play(&mut self) -> Result<(), PipelineError> {
        self.flush_pending();
        if self.is_finished() {
            self.seek(Duration::ZERO)?;
        }
        if self.sink.is_paused() {
            self.sink.play();
        }
        self.clock.start(Instant::now());
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PipelineError> {
        self.clock.stop(Instant::now());
        self.sink.pause();
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.clock.stop(Instant::now());
        self.pending = None;
    }

    fn seek(&mut self, pos: Duration) -> Result<(), PipelineError> {
        let pos = match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        };
        let decoder = open_decoder(&self.path)?;
        let resume = resume_after_seek(self.sink.is_paused(), self.pending.is_none() && self.sink.empty());

        self.sink.stop();
        self.sink = new_sink(&self.handle, self.volume)?;
        self.pending = None;
        self.append(decoder, pos);

        self.clock.reset(pos);
        if resume {
            self.sink.play();
            self.clock.start(Instant::now());
        }
        Ok(())
    }

    fn position(&self) -> Duration {
        let pos = self.clock.elapsed(Instant::now());
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&mut self) -> bool {
        let drained = self.pending.is_none() && self.sink.empty();
        if drained && self.clock.is_running() {
            self.clock.stop(Instant::now());
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn undecodable_file_fails_before_opening_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ogg");
        File::create(&path).unwrap().write_all(&[0u8; 512]).unwrap();

        let mut backend = RodioBackend::new();
        let err = backend.open(&path, 1.0).err().unwrap();
        assert!(matches!(err, PipelineError::Decode { .. }), "{err}");
        assert!(backend.output.is_none());
    }

    #[test]
    fn seek_after_the_end_stays_paused() {
        assert!(resume_after_seek(false, false));
        assert!(!resume_after_seek(true, false));
        // ran off the end: sink empty but never paused
        assert!(!resume_after_seek(false, true));
    }

    #[test]
    fn clock_freezes_when_stopped() {
        let t0 = Instant::now();
        let mut clock = PlayClock::default();
        clock.start(t0);
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(3)), Duration::from_secs(3));

        clock.stop(t0 + Duration::from_secs(4));
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(60)), Duration::from_secs(4));

        clock.start(t0 + Duration::from_secs(10));
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(11)), Duration::from_secs(5));
    }

    #[test]
    fn clock_reset_starts_from_seek_target() {
        let t0 = Instant::now();
        let mut clock = PlayClock::default();
        clock.start(t0);
        clock.reset(Duration::from_secs(30));
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(5)), Duration::from_secs(30));
    }

    #[test]
    fn missing_file_reports_io() {
        let mut backend = RodioBackend::new();
        let err = backend.open(Path::new("/no/such/track.wav"), 1.0).err().unwrap();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
