use crate::data::config::Config;
use crate::playback::session::Progress;
use crate::render::visualizer::{SpectrumFrame, Visualizer};
use crate::ui::components::control_buttons::{Icon, IconMorph};
use crate::ui::theme::Theme;
use std::time::{Duration, Instant};

pub const NO_FILE_ALERT: &str = "Please select an audio file or drag and drop one.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug)]
pub struct PlayerState {
    pub playback: PlaybackState,
    pub now_playing: Option<String>,
    pub progress: Progress,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playback: PlaybackState::Stopped,
            now_playing: None,
            progress: Progress::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    FileInput,
    HelpModal,
    Alert,
}

#[derive(Debug, Default)]
pub struct FileInput {
    pub buf: String,
}

#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub theme: Theme,

    pub player: PlayerState,
    pub icon: IconMorph,

    pub visualizer: Visualizer,
    pub spectrum: SpectrumFrame,

    pub overlay: Overlay,
    pub file_input: FileInput,
    pub alert: Option<String>,
    pub toast: Option<(String, Instant)>,

    pub should_quit: bool,
    pub last_frame: Instant,
}

impl AppState {
    pub fn new(config: Config, theme: Theme) -> Self {
        Self {
            config,
            theme,
            player: PlayerState::default(),
            icon: IconMorph::new(),
            visualizer: Visualizer::new(),
            spectrum: SpectrumFrame::default(),
            overlay: Overlay::None,
            file_input: FileInput::default(),
            alert: None,
            toast: None,
            should_quit: false,
            last_frame: Instant::now(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.player.now_playing.is_some()
    }

    pub fn set_playing(&mut self, playing: bool, now: Instant) {
        if playing {
            self.player.playback = PlaybackState::Playing;
            self.icon.morph_to(Icon::Pause, now);
        } else {
            self.player.playback = PlaybackState::Paused;
            self.icon.morph_to(Icon::Play, now);
        }
    }

    pub fn set_toast(&mut self, msg: impl Into<String>) {
        self.toast = Some((msg.into(), Instant::now()));
    }

    /// Blocking notice; input is swallowed until it is dismissed.
    pub fn show_alert(&mut self, msg: impl Into<String>) {
        self.alert = Some(msg.into());
        self.overlay = Overlay::Alert;
    }

    pub fn open_file_input(&mut self) {
        self.overlay = Overlay::FileInput;
        self.file_input.buf.clear();
    }

    pub fn close_overlay(&mut self) {
        if self.overlay == Overlay::Alert {
            self.alert = None;
        }
        self.overlay = Overlay::None;
    }

    pub fn tick(&mut self, now: Instant) {
        self.last_frame = now;

        if let Some((_, at)) = &self.toast {
            if now.duration_since(*at) > Duration::from_millis(2500) {
                self.toast = None;
            }
        }
    }
}
