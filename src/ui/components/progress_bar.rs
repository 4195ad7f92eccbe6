use crate::app::state::AppState;
use crate::playback::session::Progress;
use crate::utils::timefmt::mmss;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let w = area.width as usize;
    if w == 0 {
        return;
    }

    let filled = filled_cells(&app.player.progress, w);
    let line = Line::from(vec![
        Span::styled("━".repeat(filled), Style::default().fg(app.theme.color_accent())),
        Span::styled("─".repeat(w - filled), Style::default().fg(app.theme.color_subtext())),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

/// `current` on the left, `duration` on the right.
pub fn render_labels(f: &mut Frame, area: Rect, app: &AppState) {
    let (current, total) = time_labels(&app.player.progress);
    let style = Style::default().fg(app.theme.color_subtext());
    f.render_widget(Paragraph::new(current).style(style), area);
    f.render_widget(Paragraph::new(total).style(style).alignment(Alignment::Right), area);
}

pub fn time_labels(p: &Progress) -> (String, String) {
    let total = p.duration.map(mmss).unwrap_or_else(|| mmss(Default::default()));
    (mmss(p.position), total)
}

pub fn filled_cells(p: &Progress, width: usize) -> usize {
    ((p.fraction() * width as f32).round() as usize).min(width)
}

/// Fraction of the bar left of the clicked column.
pub fn click_fraction(area: Rect, col: u16) -> f32 {
    if area.width == 0 {
        return 0.0;
    }
    let x = col.saturating_sub(area.x) as f32;
    (x / area.width as f32).clamp(0.0, 1.0)
}
