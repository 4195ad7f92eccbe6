use crate::app::state::AppState;
use crate::ui::theme::mix_rgb;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::time::{Duration, Instant};

pub const FADE: Duration = Duration::from_millis(300);
pub const STAGGER: Duration = Duration::from_millis(150);

const PLAY_GLYPH: &str = "▶";
const PAUSE_GLYPH: &str = "⏸";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Play,
    Pause,
}

/// Two overlapping icons cross-faded: the outgoing one fades out at once, the
/// incoming one fades in after a short stagger.
#[derive(Debug, Clone, Copy)]
pub struct IconMorph {
    target: Icon,
    started_at: Option<Instant>,
}

impl IconMorph {
    pub fn new() -> Self {
        Self {
            target: Icon::Play,
            started_at: None,
        }
    }

    pub fn target(&self) -> Icon {
        self.target
    }

    pub fn morph_to(&mut self, icon: Icon, now: Instant) {
        if icon == self.target {
            return;
        }
        self.target = icon;
        self.started_at = Some(now);
    }

    /// (play, pause) opacity in 0..=1.
    pub fn opacities(&self, now: Instant) -> (f32, f32) {
        let (incoming, outgoing) = match self.started_at {
            None => (1.0, 0.0),
            Some(at) => {
                let elapsed = now.saturating_duration_since(at);
                (fade_progress(elapsed, STAGGER), 1.0 - fade_progress(elapsed, Duration::ZERO))
            }
        };
        match self.target {
            Icon::Play => (incoming, outgoing),
            Icon::Pause => (outgoing, incoming),
        }
    }
}

impl Default for IconMorph {
    fn default() -> Self {
        Self::new()
    }
}

fn fade_progress(elapsed: Duration, delay: Duration) -> f32 {
    let Some(running) = elapsed.checked_sub(delay) else {
        return 0.0;
    };
    (running.as_secs_f32() / FADE.as_secs_f32()).clamp(0.0, 1.0)
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let (play, pause) = app.icon.opacities(app.last_frame);
    let (glyph, opacity) = if play >= pause {
        (PLAY_GLYPH, play)
    } else {
        (PAUSE_GLYPH, pause)
    };

    let rgb = mix_rgb(app.theme.palette.base, app.theme.palette.accent, opacity);
    let line = Line::from(vec![
        Span::styled("[ ", Style::default().fg(app.theme.color_subtext())),
        Span::styled(
            glyph,
            Style::default().fg(app.theme.color_rgb(rgb)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ]", Style::default().fg(app.theme.color_subtext())),
    ]);

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
