use crate::app::state::AppState;
use crate::render::spectrum_renderer;
use crate::ui::borders::{DASHED_BORDER, SOLID_BORDER};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const DROP_HINT: &str = "Drop an audio file here or press O to browse";

/// Inner area the spectrum is drawn into.
pub fn spectrum_area(area: Rect) -> Rect {
    area.inner(&ratatui::layout::Margin { horizontal: 1, vertical: 1 })
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_set(SOLID_BORDER)
        .title(" Audio Visualizer ")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.color_subtext()));
    f.render_widget(outer, area);

    let inner = spectrum_area(area);
    spectrum_renderer::render(f, inner, app);

    if !app.is_loaded() {
        render_drop_zone(f, inner, app);
    }
}

fn render_drop_zone(f: &mut Frame, area: Rect, app: &AppState) {
    let w = (DROP_HINT.width() as u16 + 6).min(area.width);
    let h = 5.min(area.height);
    if w < 4 || h < 3 {
        return;
    }
    let zone = Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    };

    f.render_widget(Clear, zone);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(DASHED_BORDER)
        .style(Style::default().fg(app.theme.color_accent()).bg(app.theme.color_surface()));
    let text_area = block.inner(zone);
    f.render_widget(block, zone);

    let pad = text_area.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
    lines.push(Line::styled(DROP_HINT, Style::default().fg(app.theme.color_text())));
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
}
