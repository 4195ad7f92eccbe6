use crate::app::state::AppState;
use crate::render::visualizer::{BarStroke, SurfaceSize, BACKGROUND, BAR_LIGHTNESS, BAR_SATURATION};
use crate::ui::theme::hsl_to_rgb;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Painter, Shape};
use ratatui::Frame;

// Braille cells carry 2x4 dots
const DOTS_X: u16 = 2;
const DOTS_Y: u16 = 4;

/// Drawing surface matching the displayed size of `area`.
pub fn surface_for(area: Rect) -> SurfaceSize {
    SurfaceSize {
        width: (area.width * DOTS_X) as f64,
        height: (area.height * DOTS_Y) as f64,
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let frame = &app.spectrum;
    let surface = if frame.surface.is_empty() {
        surface_for(area)
    } else {
        frame.surface
    };

    let canvas = Canvas::default()
        .background_color(app.theme.color_rgb(BACKGROUND))
        .marker(Marker::Braille)
        .x_bounds([0.0, surface.width])
        .y_bounds([0.0, surface.height])
        .paint(|ctx| {
            for bar in &frame.bars {
                if bar.center_x - bar.width / 2.0 >= surface.width {
                    break;
                }
                let rgb = hsl_to_rgb(bar.hue, BAR_SATURATION, BAR_LIGHTNESS);
                ctx.draw(&RoundedBar {
                    bar,
                    surface,
                    color: app.theme.color_rgb(rgb),
                });
            }
        });

    f.render_widget(canvas, area);
}

/// A vertical stroke from the bottom edge with a round top cap whose radius
/// is half the stroke width.
struct RoundedBar<'a> {
    bar: &'a BarStroke,
    surface: SurfaceSize,
    color: Color,
}

impl Shape for RoundedBar<'_> {
    fn draw(&self, painter: &mut Painter) {
        let bar = self.bar;
        let half = (bar.width / 2.0).max(0.0);
        let first = (bar.center_x - half).floor().max(0.0);
        let last = (bar.center_x + half).min(self.surface.width - 1.0);

        let mut col = first;
        while col <= last {
            let cx = col + 0.5;
            // distance from the stroke axis to the nearest point of this column
            let dx = ((cx - bar.center_x).abs() - 0.5).max(0.0);
            let cap = (half * half - dx * dx).max(0.0).sqrt();
            let top = (bar.height + cap).min(self.surface.height);

            let mut y = 0.5;
            while y < top {
                if let Some((px, py)) = painter.get_point(cx, y) {
                    painter.paint(px, py, self.color);
                }
                y += 1.0;
            }
            col += 1.0;
        }
    }
}
