use crate::app::state::{AppState, Overlay, PlaybackState, NO_FILE_ALERT};
use crate::playback::local_player::RodioBackend;
use crate::playback::pipeline::{AudioPipeline, Toggle};
use crate::playback::session::Progress;
use crate::render::frames::FrameScheduler;
use crate::render::spectrum_renderer;
use crate::render::visualizer::SpectrumFrame;
use crate::ui::tui::{self, Tui, UiLayout};
use crate::utils::input::{map_key, map_mouse, map_paste, parse_dropped_path, Action};
use anyhow::Result;
use crossterm::event::{self, Event};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub fn run(app: &mut AppState, initial: Option<PathBuf>) -> Result<()> {
    let mut pipeline = AudioPipeline::new(
        Box::new(RodioBackend::new()),
        app.config.analyser_options(),
        app.config.volume,
    );
    let mut frames = FrameScheduler::new();

    let mut tui = Tui::new()?;
    tui.enter()?;

    if let Some(path) = initial {
        load_path(app, &mut pipeline, &mut frames, &path, Instant::now());
    }

    let res = drive(app, &mut tui, &mut pipeline, &mut frames);

    pipeline.shutdown(&mut frames);
    tui.exit()?;
    res
}

fn drive(app: &mut AppState, tui: &mut Tui, pipeline: &mut AudioPipeline, frames: &mut FrameScheduler) -> Result<()> {
    let mut last_layout = UiLayout::default();

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            let action = match event::read()? {
                Event::Key(k) => map_key(k, app.overlay),
                Event::Mouse(m) => map_mouse(m),
                Event::Paste(text) => map_paste(text, app.overlay),
                _ => Action::None,
            };
            handle_action(app, pipeline, frames, action, &last_layout, frame_start);
        }

        advance(app, pipeline, frames, &last_layout, frame_start);

        app.tick(frame_start);
        last_layout = tui.draw(app)?;

        if app.should_quit {
            return Ok(());
        }

        // frame pacing
        let frame_dt = fps_to_dt(app.config.frame_rate());
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dt {
            std::thread::sleep(frame_dt - elapsed);
        }
    }
}

fn fps_to_dt(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / fps.max(1) as u64)
}

/// Media events, then due animation frames.
fn advance(
    app: &mut AppState,
    pipeline: &mut AudioPipeline,
    frames: &mut FrameScheduler,
    layout: &UiLayout,
    now: Instant,
) {
    if pipeline.poll_ended() {
        app.set_playing(false, now);
    }
    if let Some(progress) = pipeline.poll_time_update(now) {
        app.player.progress = progress;
    }

    let surface = spectrum_renderer::surface_for(layout.spectrum);
    for id in frames.take_due() {
        if let Some(frame) = pipeline.run_frame(id, frames, &mut app.visualizer, surface) {
            app.spectrum = frame;
        }
    }
}

fn handle_action(
    app: &mut AppState,
    pipeline: &mut AudioPipeline,
    frames: &mut FrameScheduler,
    action: Action,
    layout: &UiLayout,
    now: Instant,
) {
    match action {
        Action::Quit => app.should_quit = true,
        Action::OpenFile => app.open_file_input(),
        Action::OpenHelpModal => app.overlay = Overlay::HelpModal,
        Action::CloseOverlay => app.close_overlay(),
        Action::FileChar(c) => app.file_input.buf.push(c),
        Action::FileBackspace => {
            app.file_input.buf.pop();
        }
        Action::Confirm => {
            let typed = std::mem::take(&mut app.file_input.buf);
            app.close_overlay();
            if let Some(path) = parse_dropped_path(&typed) {
                load_path(app, pipeline, frames, &path, now);
            }
        }
        Action::Drop(text) => match parse_dropped_path(&text) {
            Some(path) => {
                if app.overlay == Overlay::FileInput {
                    app.close_overlay();
                }
                load_path(app, pipeline, frames, &path, now);
            }
            None => log::debug!("ignoring drop without a path"),
        },
        Action::TogglePlayPause => match pipeline.toggle_playback() {
            Toggle::NoFile => app.show_alert(NO_FILE_ALERT),
            Toggle::Playing => app.set_playing(true, now),
            Toggle::Paused => app.set_playing(false, now),
            Toggle::Failed => {}
        },
        Action::SeekBy(secs) => {
            let Some(session) = pipeline.session() else {
                return;
            };
            let Some(total) = session.duration().filter(|d| !d.is_zero()) else {
                return;
            };
            let target = session.position().as_secs_f32() + secs as f32;
            pipeline.seek(target / total.as_secs_f32());
        }
        Action::SeekToFraction(fraction) => pipeline.seek(fraction),
        Action::MouseClick { col, row } => {
            if app.overlay != Overlay::None {
                return;
            }
            if let Some(a) = tui::hit_test(layout, app.is_loaded(), col, row) {
                handle_action(app, pipeline, frames, a, layout, now);
            }
        }
        Action::None => {}
    }
}

fn load_path(app: &mut AppState, pipeline: &mut AudioPipeline, frames: &mut FrameScheduler, path: &Path, now: Instant) {
    match pipeline.load_file(path, frames) {
        Ok(track) => {
            app.player.now_playing = Some(track.name);
            app.player.progress = Progress {
                position: Duration::ZERO,
                duration: track.duration,
            };
            app.set_playing(track.playing, now);
        }
        Err(e) => {
            log::error!("error loading audio file {}: {e}", path.display());
            app.player.now_playing = None;
            app.player.progress = Progress::default();
            app.set_playing(false, now);
            app.player.playback = PlaybackState::Stopped;
            app.spectrum = SpectrumFrame::default();
            app.set_toast(format!("Could not load {}", path.display()));
        }
    }
}
