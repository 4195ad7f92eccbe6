use crate::app::state::AppState;
use crate::ui::borders::SOLID_BORDER;
use crate::ui::components::{control_buttons, progress_bar};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Rows inside the border: title, gap, times, progress, gap, controls.
pub const HEIGHT: u16 = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct InfoPanelLayout {
    pub inner: Rect,
    pub title: Rect,
    pub time_line: Rect,
    pub progress: Rect,
    pub controls: Rect,
}

pub fn layout(area: Rect) -> InfoPanelLayout {
    let inner = area.inner(&ratatui::layout::Margin { horizontal: 2, vertical: 1 });
    let row = |dy: u16| {
        if dy < inner.height {
            Rect { x: inner.x, y: inner.y + dy, width: inner.width, height: 1 }
        } else {
            Rect::default()
        }
    };

    InfoPanelLayout {
        inner,
        title: row(0),
        time_line: row(2),
        progress: row(3),
        controls: row(5),
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let b = Block::default()
        .borders(Borders::ALL)
        .border_set(SOLID_BORDER)
        .style(Style::default().fg(app.theme.color_subtext()));
    f.render_widget(b, area);

    let l = layout(area);

    let name = app.player.now_playing.as_deref().unwrap_or("");
    let title = Line::from(vec![
        Span::styled("Now Playing: ", Style::default().fg(app.theme.color_subtext())),
        Span::styled(
            name,
            Style::default().fg(app.theme.color_text()).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(title).alignment(Alignment::Center), l.title);

    progress_bar::render_labels(f, l.time_line, app);
    progress_bar::render(f, l.progress, app);
    control_buttons::render(f, l.controls, app);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_sit_inside_the_border() {
        let l = layout(Rect { x: 0, y: 20, width: 60, height: HEIGHT });
        assert_eq!(l.title, Rect { x: 2, y: 21, width: 56, height: 1 });
        assert_eq!(l.progress.y, 24);
        assert_eq!(l.controls.y, 26);
        assert!(l.controls.y < 20 + HEIGHT - 1);
    }

    #[test]
    fn cramped_area_drops_rows() {
        let l = layout(Rect { x: 0, y: 0, width: 40, height: 4 });
        assert_eq!(l.controls, Rect::default());
        assert_eq!(l.title.height, 1);
    }
}
