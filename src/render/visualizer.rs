/// Opaque surface clear color, rgb(26, 26, 26).
pub const BACKGROUND: (u8, u8, u8) = (26, 26, 26);

pub const BAR_SATURATION: f32 = 0.70;
pub const BAR_LIGHTNESS: f32 = 0.50;

const BAR_WIDTH_SCALE: f64 = 2.5;
const BAR_SPACING: f64 = 1.5;

// hue is kept in tenths of a degree so it never drifts
const HUE_STEP_TENTHS: u32 = 2;
const HUE_TURN_TENTHS: u32 = 3600;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderState {
    hue_tenths: u32,
}

impl RenderState {
    pub fn advance(&mut self) {
        self.hue_tenths = (self.hue_tenths + HUE_STEP_TENTHS) % HUE_TURN_TENTHS;
    }

    pub fn hue_rotation(&self) -> f32 {
        self.hue_tenths as f32 / 10.0
    }
}

/// Drawing surface in sub-pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// One vertical round-capped stroke rising from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStroke {
    pub center_x: f64,
    pub width: f64,
    pub height: f64,
    pub hue: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumFrame {
    pub surface: SurfaceSize,
    pub bars: Vec<BarStroke>,
}

pub fn bar_height(magnitude: u8, surface_height: f64) -> f64 {
    let max_height = (surface_height - 1.0).max(0.0);
    (magnitude as f64 / 255.0) * max_height
}

pub fn bar_hue(index: usize, hue_rotation: f32) -> f32 {
    ((index as f32) * 2.0 + hue_rotation) % 360.0
}

/// Bars may overlap or leave gaps depending on bin count versus width.
pub fn layout_bars(bins: &[u8], surface: SurfaceSize, hue_rotation: f32) -> Vec<BarStroke> {
    if bins.is_empty() || surface.is_empty() {
        return Vec::new();
    }

    let bar_width = (surface.width / bins.len() as f64) * BAR_WIDTH_SCALE;
    let mut x = 0.0;
    let mut out = Vec::with_capacity(bins.len());
    for (i, &m) in bins.iter().enumerate() {
        out.push(BarStroke {
            center_x: x + bar_width / 2.0,
            width: bar_width,
            height: bar_height(m, surface.height),
            hue: bar_hue(i, hue_rotation),
        });
        x += bar_width + BAR_SPACING;
    }
    out
}

#[derive(Debug, Default)]
pub struct Visualizer {
    state: RenderState,
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hue_rotation(&self) -> f32 {
        self.state.hue_rotation()
    }

    pub fn frame(&mut self, bins: &[u8], surface: SurfaceSize) -> SpectrumFrame {
        self.state.advance();
        SpectrumFrame {
            surface,
            bars: layout_bars(bins, surface, self.state.hue_rotation()),
        }
    }
}
