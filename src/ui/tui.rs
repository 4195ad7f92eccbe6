use crate::app::state::{AppState, Overlay};
use crate::ui::components::progress_bar;
use crate::ui::panels::{info_panel, visual_panel};
use crate::utils::input::Action;
use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct UiLayout {
    pub full: Rect,
    pub spectrum: Rect,
    pub progress: Rect,
    pub controls: Rect,
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    /// Mouse capture feeds the clickable controls; bracketed paste is how a
    /// file dropped on the terminal window reaches us.
    pub fn enter(&mut self) -> Result<()> {
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            event::EnableMouseCapture,
            event::EnableBracketedPaste
        )?;
        terminal::enable_raw_mode()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            io::stdout(),
            event::DisableBracketedPaste,
            event::DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        Ok(())
    }

    pub fn draw(&mut self, app: &AppState) -> Result<UiLayout> {
        let mut out = UiLayout::default();

        self.terminal.draw(|f| {
            let size = f.size();
            out.full = size;

            f.render_widget(Clear, size);
            let mut base_style = Style::default().fg(app.theme.color_text());
            if !app.config.transparent_background {
                base_style = base_style.bg(app.theme.color_base());
            }
            f.render_widget(Block::default().style(base_style), size);

            if size.width < 40 || size.height < 14 {
                f.render_widget(
                    Paragraph::new("Terminal too small").style(Style::default().fg(app.theme.color_subtext())),
                    size,
                );
                return;
            }

            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(4),
                    Constraint::Length(info_panel::HEIGHT),
                    Constraint::Length(1),
                ])
                .split(size);

            out.spectrum = visual_panel::spectrum_area(rows[0]);
            let info = info_panel::layout(rows[1]);
            out.progress = info.progress;
            out.controls = info.controls;

            visual_panel::render(f, rows[0], app);
            info_panel::render(f, rows[1], app);

            f.render_widget(
                Paragraph::new("Space: Play/Pause  O: Open  Ctrl+K: Keys  Q: Quit")
                    .style(Style::default().fg(app.theme.color_subtext())),
                rows[2],
            );

            if app.overlay == Overlay::FileInput {
                render_file_prompt(f, size, app);
            }

            if let Some((msg, _)) = &app.toast {
                let area = Rect { x: size.x, y: size.y, width: size.width, height: 1 };
                f.render_widget(
                    Paragraph::new(msg.as_str()).style(Style::default().fg(app.theme.color_accent3())),
                    area,
                );
            }

            // modals (top-most)
            match app.overlay {
                Overlay::HelpModal => render_help_modal(f, size, app),
                Overlay::Alert => render_alert(f, size, app),
                _ => {}
            }
        })?;

        Ok(out)
    }
}

fn centered_rect(size: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(size.width.saturating_sub(4)).max(10);
    let h = height.min(size.height.saturating_sub(4)).max(5);
    Rect {
        x: size.x + (size.width.saturating_sub(w)) / 2,
        y: size.y + (size.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn render_file_prompt(f: &mut ratatui::Frame, size: Rect, app: &AppState) {
    let prompt = format!("Open file: {}", app.file_input.buf);
    let area = Rect {
        x: size.x,
        y: size.y + size.height.saturating_sub(2),
        width: size.width,
        height: 1,
    };
    f.render_widget(
        Paragraph::new(prompt).style(Style::default().fg(app.theme.color_text()).bg(app.theme.color_surface())),
        area,
    );
}

fn render_alert(f: &mut ratatui::Frame, size: Rect, app: &AppState) {
    let msg = app.alert.as_deref().unwrap_or_default();
    let area = centered_rect(size, (msg.width() as u16).saturating_add(6), 6);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(crate::ui::borders::SOLID_BORDER)
        .style(Style::default().fg(app.theme.color_accent()).bg(app.theme.color_surface()));
    f.render_widget(block, area);

    let inner = area.inner(&ratatui::layout::Margin { horizontal: 2, vertical: 1 });
    let bg = Style::default().bg(app.theme.color_surface());
    let lines = vec![
        Line::styled(msg, bg.fg(app.theme.color_text()).add_modifier(Modifier::BOLD)),
        Line::styled("", bg),
        Line::styled("Enter = OK", bg.fg(app.theme.color_subtext())),
    ];
    f.render_widget(
        Paragraph::new(lines).style(bg).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_help_modal(f: &mut ratatui::Frame, size: Rect, app: &AppState) {
    let area = centered_rect(size, 44, 12);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(crate::ui::borders::SOLID_BORDER)
        .title("Keys")
        .style(Style::default().fg(app.theme.color_subtext()).bg(app.theme.color_surface()));
    f.render_widget(block, area);

    let inner = area.inner(&ratatui::layout::Margin { horizontal: 1, vertical: 1 });

    let bg = Style::default().bg(app.theme.color_surface());
    let text = Style::default().fg(app.theme.color_text()).bg(app.theme.color_surface());
    let sub = Style::default().fg(app.theme.color_subtext()).bg(app.theme.color_surface());

    let mut lines: Vec<Line> = vec![Line::styled("Esc = Close", sub), Line::styled("", bg)];
    for l in [
        "O / Ctrl+O  Open audio file",
        "Drop file   Load it",
        "Space       Play/Pause",
        "Left/Right  Seek 5s",
        "Click bar   Seek",
        "Ctrl+K      This help",
        "Q           Quit",
    ] {
        lines.push(Line::styled(l, text));
    }

    f.render_widget(Paragraph::new(lines).style(bg).wrap(Wrap { trim: true }), inner);
}

pub fn hit_test(layout: &UiLayout, loaded: bool, col: u16, row: u16) -> Option<Action> {
    if contains(layout.controls, col, row) {
        return Some(Action::TogglePlayPause);
    }

    if contains(layout.progress, col, row) {
        return Some(Action::SeekToFraction(progress_bar::click_fraction(layout.progress, col)));
    }

    // the empty visualizer doubles as the file picker
    if !loaded && contains(layout.spectrum, col, row) {
        return Some(Action::OpenFile);
    }

    None
}

fn contains(r: Rect, col: u16, row: u16) -> bool {
    col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
}
