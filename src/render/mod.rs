pub mod frames;
pub mod spectrum_renderer;
pub mod visualizer;
