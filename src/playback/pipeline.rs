use crate::audio::analyser::{Analyser, AnalyserOptions};
use crate::playback::backend::Backend;
use crate::playback::error::PipelineError;
use crate::playback::session::{PlaybackSession, Progress};
use crate::render::frames::{FrameId, FrameScheduler, FrameTask};
use crate::render::visualizer::{SpectrumFrame, SurfaceSize, Visualizer};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    NoFile,
    Playing,
    Paused,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub name: String,
    pub duration: Option<Duration>,
    pub playing: bool,
}

/// Owns the single decode/playback/analysis chain and the render task that
/// reads from it.
pub struct AudioPipeline {
    backend: Box<dyn Backend>,
    analyser_options: AnalyserOptions,
    volume: f32,

    analyser: Option<Analyser>,
    bins: Vec<u8>,

    session: Option<PlaybackSession>,
    render_task: FrameTask,
}

impl AudioPipeline {
    pub fn new(backend: Box<dyn Backend>, analyser_options: AnalyserOptions, volume: f32) -> Self {
        Self {
            backend,
            analyser_options,
            volume: volume.clamp(0.0, 1.0),
            analyser: None,
            bins: Vec::new(),
            session: None,
            render_task: FrameTask::new(),
        }
    }

    /// Creates the analyser and its frequency buffer on the first call only.
    pub fn initialize(&mut self) {
        if self.analyser.is_some() {
            return;
        }
        let analyser = Analyser::new(self.analyser_options);
        self.bins = vec![0; analyser.frequency_bin_count()];
        log::info!(
            "analyser ready: fft size {}, {} bins",
            analyser.fft_size(),
            analyser.frequency_bin_count()
        );
        self.analyser = Some(analyser);
    }

    pub fn is_initialized(&self) -> bool {
        self.analyser.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().map(|s| s.is_playing()).unwrap_or(false)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn frequency_data(&self) -> &[u8] {
        &self.bins
    }

    pub fn load_file(&mut self, path: &Path, frames: &mut FrameScheduler) -> Result<LoadedTrack, PipelineError> {
        self.initialize();

        if let Some(old) = self.session.take() {
            old.teardown();
        }
        self.render_task.cancel(frames);

        let mut handle = match self.backend.open(path, self.volume) {
            Ok(h) => h,
            Err(e) => {
                log::error!("error setting up audio for {}: {e}", path.display());
                return Err(e);
            }
        };

        let connection = match self.analyser.as_mut() {
            Some(analyser) => analyser.connect(),
            None => {
                handle.stop();
                return Err(PipelineError::Playback("analyser unavailable".to_string()));
            }
        };
        handle.attach(connection.input());

        let mut session = PlaybackSession::new(path, handle, connection);
        self.render_task.schedule(frames);
        log::info!("audio setup complete: {}", path.display());

        if let Err(e) = session.play() {
            log::error!("error playing audio: {e}");
        }

        let track = LoadedTrack {
            name: session.name().to_string(),
            duration: session.duration(),
            playing: session.is_playing(),
        };
        self.session = Some(session);
        Ok(track)
    }

    pub fn toggle_playback(&mut self) -> Toggle {
        let Some(session) = self.session.as_mut() else {
            log::warn!("toggle requested with no file loaded");
            return Toggle::NoFile;
        };

        if session.is_playing() {
            match session.pause() {
                Ok(()) => {
                    if let Some(a) = self.analyser.as_ref() {
                        a.silence();
                    }
                    Toggle::Paused
                }
                Err(e) => {
                    log::error!("error with audio playback: {e}");
                    Toggle::Failed
                }
            }
        } else {
            match session.play() {
                Ok(()) => Toggle::Playing,
                Err(e) => {
                    log::error!("error with audio playback: {e}");
                    Toggle::Failed
                }
            }
        }
    }

    /// Moves to `fraction` of the total duration. Ignored until a file with a
    /// known duration is loaded.
    pub fn seek(&mut self, fraction: f32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(duration) = session.duration() else {
            return;
        };
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let target = duration.mul_f64(fraction as f64);

        match session.seek(target) {
            Ok(()) => {
                if let Some(a) = self.analyser.as_ref() {
                    a.silence();
                }
            }
            Err(e) => log::error!("seek failed: {e}"),
        }
    }

    pub fn poll_ended(&mut self) -> bool {
        let ended = self.session.as_mut().map(|s| s.poll_ended()).unwrap_or(false);
        if ended {
            if let Some(a) = self.analyser.as_ref() {
                a.silence();
            }
            log::info!("playback ended");
        }
        ended
    }

    pub fn poll_time_update(&mut self, now: Instant) -> Option<Progress> {
        self.session.as_mut().and_then(|s| s.time_update(now))
    }

    /// One visualizer frame. Frames not owned by the live render task are
    /// stale and ignored.
    pub fn run_frame(
        &mut self,
        id: FrameId,
        frames: &mut FrameScheduler,
        visualizer: &mut Visualizer,
        surface: SurfaceSize,
    ) -> Option<SpectrumFrame> {
        if !self.render_task.owns(id) {
            return None;
        }
        self.render_task.schedule(frames);

        if let Some(analyser) = self.analyser.as_mut() {
            analyser.get_byte_frequency_data(&mut self.bins);
        }
        Some(visualizer.frame(&self.bins, surface))
    }

    pub fn shutdown(&mut self, frames: &mut FrameScheduler) {
        if let Some(old) = self.session.take() {
            old.teardown();
        }
        self.render_task.cancel(frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::analyser::{AnalyserInput, FFT_SIZE};
    use crate::render::visualizer::bar_height;
    use crate::playback::backend::PlaybackHandle;
    use crate::playback::metadata::display_name;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Shared {
        log: Rc<RefCell<Vec<String>>>,
        inputs: Rc<RefCell<Vec<AnalyserInput>>>,
        reject_play: Rc<Cell<bool>>,
        finished: Rc<Cell<bool>>,
    }

    impl Shared {
        fn push(&self, s: String) {
            self.log.borrow_mut().push(s);
        }

        fn events(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    struct FakeBackend(Shared);

    struct FakeHandle {
        name: String,
        shared: Shared,
        position: Duration,
    }

    impl Backend for FakeBackend {
        fn open(&mut self, path: &Path, _volume: f32) -> Result<Box<dyn PlaybackHandle>, PipelineError> {
            let name = display_name(path);
            self.0.push(format!("open {name}"));
            if name.contains("broken") {
                return Err(PipelineError::decode(path, "bad header"));
            }
            Ok(Box::new(FakeHandle {
                name,
                shared: self.0.clone(),
                position: Duration::ZERO,
            }))
        }
    }

    impl PlaybackHandle for FakeHandle {
        fn attach(&mut self, input: AnalyserInput) {
            self.shared.push(format!("attach {}", self.name));
            self.shared.inputs.borrow_mut().push(input);
        }

        fn play(&mut self) -> Result<(), PipelineError> {
            if self.shared.reject_play.get() {
                return Err(PipelineError::Playback("not allowed".to_string()));
            }
            self.shared.push(format!("play {}", self.name));
            Ok(())
        }

        fn pause(&mut self) -> Result<(), PipelineError> {
            self.shared.push(format!("pause {}", self.name));
            Ok(())
        }

        fn stop(&mut self) {
            self.shared.push(format!("stop {}", self.name));
        }

        fn seek(&mut self, pos: Duration) -> Result<(), PipelineError> {
            self.shared.push(format!("seek {} {}", self.name, pos.as_secs()));
            self.position = pos;
            Ok(())
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn duration(&self) -> Option<Duration> {
            Some(Duration::from_secs(120))
        }

        fn is_finished(&mut self) -> bool {
            self.shared.finished.get()
        }
    }

    fn pipeline() -> (AudioPipeline, Shared, FrameScheduler) {
        let shared = Shared::default();
        let p = AudioPipeline::new(
            Box::new(FakeBackend(shared.clone())),
            AnalyserOptions::default(),
            1.0,
        );
        (p, shared, FrameScheduler::new())
    }

    #[test]
    fn initialize_is_idempotent() {
        let (mut p, _, _) = pipeline();
        assert!(!p.is_initialized());
        p.initialize();
        p.initialize();
        assert!(p.is_initialized());
        assert_eq!(p.frequency_data().len(), 1024);
    }

    #[test]
    fn load_starts_playback_and_render_loop() {
        let (mut p, shared, mut frames) = pipeline();
        let track = p.load_file(Path::new("/music/intro.mp3"), &mut frames).unwrap();

        assert_eq!(track.name, "intro");
        assert!(track.playing);
        assert_eq!(track.duration, Some(Duration::from_secs(120)));
        assert_eq!(shared.events(), vec!["open intro", "attach intro", "play intro"]);
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn reload_tears_down_before_connecting() {
        let (mut p, shared, mut frames) = pipeline();
        p.load_file(Path::new("a.mp3"), &mut frames).unwrap();
        p.load_file(Path::new("b.flac"), &mut frames).unwrap();

        assert_eq!(
            shared.events(),
            vec!["open a", "attach a", "play a", "pause a", "stop a", "open b", "attach b", "play b"]
        );

        let inputs = shared.inputs.borrow();
        assert!(!inputs[0].is_connected());
        assert!(!inputs[0].push(&[0.5; 64]));
        assert!(inputs[1].is_connected());

        assert_eq!(frames.pending(), 1);
        assert_eq!(p.session().map(|s| s.name()), Some("b"));
    }

    #[test]
    fn many_loads_leave_one_render_loop() {
        let (mut p, _, mut frames) = pipeline();
        let mut v = Visualizer::new();
        for name in ["1.wav", "2.wav", "3.wav"] {
            p.load_file(Path::new(name), &mut frames).unwrap();
            for id in frames.take_due() {
                p.run_frame(id, &mut frames, &mut v, SurfaceSize { width: 10.0, height: 10.0 });
            }
        }
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn load_failure_is_returned() {
        let (mut p, shared, mut frames) = pipeline();
        p.load_file(Path::new("good.mp3"), &mut frames).unwrap();
        let err = p.load_file(Path::new("broken.mp3"), &mut frames).unwrap_err();

        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(!p.is_loaded());
        assert_eq!(frames.pending(), 0);
        assert!(!shared.inputs.borrow()[0].is_connected());
    }

    #[test]
    fn toggle_without_file_changes_nothing() {
        let (mut p, shared, mut frames) = pipeline();
        for _ in 0..5 {
            assert_eq!(p.toggle_playback(), Toggle::NoFile);
            assert!(!p.is_playing());
            assert!(!p.is_loaded());
        }
        assert!(shared.events().is_empty());
        assert_eq!(frames.take_due().len(), 0);
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let (mut p, shared, mut frames) = pipeline();
        p.load_file(Path::new("x.ogg"), &mut frames).unwrap();

        assert_eq!(p.toggle_playback(), Toggle::Paused);
        assert!(!p.is_playing());
        assert_eq!(p.toggle_playback(), Toggle::Playing);
        assert!(p.is_playing());
        assert_eq!(&shared.events()[3..], &["pause x", "play x"]);
    }

    #[test]
    fn rejected_play_is_logged_not_fatal() {
        let (mut p, shared, mut frames) = pipeline();
        shared.reject_play.set(true);
        let track = p.load_file(Path::new("x.ogg"), &mut frames).unwrap();
        assert!(!track.playing);
        assert!(p.is_loaded());

        assert_eq!(p.toggle_playback(), Toggle::Failed);
        assert!(!p.is_playing());
    }

    #[test]
    fn seek_is_fraction_of_duration() {
        let (mut p, shared, mut frames) = pipeline();
        p.seek(0.5);
        assert!(shared.events().is_empty());

        p.load_file(Path::new("x.ogg"), &mut frames).unwrap();
        p.seek(0.5);
        assert_eq!(shared.events().last().map(String::as_str), Some("seek x 60"));
        assert_eq!(p.session().map(|s| s.position()), Some(Duration::from_secs(60)));

        p.seek(7.0);
        assert_eq!(shared.events().last().map(String::as_str), Some("seek x 120"));
    }

    #[test]
    fn stale_frames_are_ignored() {
        let (mut p, _, mut frames) = pipeline();
        let mut v = Visualizer::new();
        p.load_file(Path::new("a.mp3"), &mut frames).unwrap();
        let stale = frames.take_due()[0];
        p.load_file(Path::new("b.mp3"), &mut frames).unwrap();

        let surface = SurfaceSize { width: 100.0, height: 40.0 };
        assert!(p.run_frame(stale, &mut frames, &mut v, surface).is_none());

        let live = frames.take_due()[0];
        let frame = p.run_frame(live, &mut frames, &mut v, surface).unwrap();
        assert_eq!(frame.bars.len(), 1024);
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn frame_draws_live_magnitudes() {
        let (mut p, shared, mut frames) = pipeline();
        let mut v = Visualizer::new();
        p.load_file(Path::new("tone.wav"), &mut frames).unwrap();

        let bin = 64;
        let sine: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin())
            .collect();
        assert!(shared.inputs.borrow()[0].push(&sine));

        let surface = SurfaceSize { width: 2048.0, height: 40.0 };
        let id = frames.take_due()[0];
        let frame = p.run_frame(id, &mut frames, &mut v, surface).unwrap();

        let level = p.frequency_data()[bin];
        assert!(level > 0);
        assert!(frame.bars[bin].height > 0.0);
        assert_eq!(frame.bars[bin].height, bar_height(level, surface.height));
        assert!(frame.bars[bin].height > frame.bars[bin + 300].height);
    }

    #[test]
    fn seek_after_end_does_not_resume() {
        let (mut p, shared, mut frames) = pipeline();
        p.load_file(Path::new("a.mp3"), &mut frames).unwrap();
        shared.finished.set(true);
        assert!(p.poll_ended());

        p.seek(0.5);
        assert_eq!(shared.events().last().map(String::as_str), Some("seek a 60"));
        assert!(!p.is_playing());
        assert_eq!(shared.events().iter().filter(|e| e.starts_with("play")).count(), 1);
    }

    #[test]
    fn end_of_track_reported_once() {
        let (mut p, shared, mut frames) = pipeline();
        p.load_file(Path::new("a.mp3"), &mut frames).unwrap();
        assert!(!p.poll_ended());

        shared.finished.set(true);
        assert!(p.poll_ended());
        assert!(!p.poll_ended());
        assert!(!p.is_playing());
        assert!(p.is_loaded());
    }

    #[test]
    fn time_updates_are_throttled() {
        let (mut p, _, mut frames) = pipeline();
        let t0 = Instant::now();
        assert!(p.poll_time_update(t0).is_none());

        p.load_file(Path::new("a.mp3"), &mut frames).unwrap();
        assert!(p.poll_time_update(t0).is_some());
        assert!(p.poll_time_update(t0 + Duration::from_millis(100)).is_none());
        assert!(p.poll_time_update(t0 + Duration::from_millis(300)).is_some());

        p.seek(0.25);
        let u = p.poll_time_update(t0 + Duration::from_millis(310)).unwrap();
        assert_eq!(u.position, Duration::from_secs(30));
        assert!((u.fraction() - 0.25).abs() < 1e-6);
    }
}
