use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

pub struct FftEngine {
    fft_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    buf: Vec<Complex<f32>>,
    mags: Vec<f32>,
}

impl FftEngine {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let window = blackman_window(fft_size);
        let buf = vec![Complex::new(0.0, 0.0); fft_size];
        let mags = vec![0.0f32; fft_size / 2];
        Self { fft_size, window, fft, buf, mags }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Windowed magnitude spectrum of the newest `fft_size` samples, scaled by 1/N.
    /// Shorter input is zero-padded at the front so the newest sample stays last.
    pub fn magnitudes(&mut self, input: &[f32]) -> &[f32] {
        let tail = &input[input.len().saturating_sub(self.fft_size)..];
        let pad = self.fft_size - tail.len();

        for i in 0..self.fft_size {
            let x = if i < pad { 0.0 } else { tail[i - pad] };
            self.buf[i] = Complex::new(x * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buf);

        let scale = 1.0 / self.fft_size as f32;
        for (m, c) in self.mags.iter_mut().zip(self.buf.iter()) {
            *m = c.norm() * scale;
        }
        &self.mags
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let tau = 2.0 * std::f32::consts::PI;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (tau * x).cos() + a2 * (2.0 * tau * x).cos()
        })
        .collect()
}
