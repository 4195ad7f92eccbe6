use crate::audio::fft::FftEngine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub const FFT_SIZE: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserOptions {
    pub min_decibels: f32,
    pub max_decibels: f32,
    pub smoothing_time_constant: f32,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing_time_constant: 0.8,
        }
    }
}

type History = Arc<Mutex<VecDeque<f32>>>;

fn lock(history: &History) -> MutexGuard<'_, VecDeque<f32>> {
    history.lock().unwrap_or_else(|e| e.into_inner())
}

/// Frequency analysis over the most recent mono samples of whatever source is
/// connected. Magnitudes are exposed as bytes on a decibel scale.
pub struct Analyser {
    options: AnalyserOptions,
    fft: FftEngine,
    history: History,
    scratch: Vec<f32>,
    smoothed: Vec<f32>,
    live: Option<Arc<AtomicBool>>,
}

impl Analyser {
    pub fn new(options: AnalyserOptions) -> Self {
        let fft = FftEngine::new(FFT_SIZE);
        Self {
            options,
            fft,
            history: Arc::new(Mutex::new(VecDeque::with_capacity(FFT_SIZE))),
            scratch: Vec::with_capacity(FFT_SIZE),
            smoothed: vec![0.0; FFT_SIZE / 2],
            live: None,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft.fft_size()
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.fft.fft_size() / 2
    }

    /// Attaches a new source. Any previous connection is severed first and the
    /// analysis state starts from silence.
    pub fn connect(&mut self) -> Connection {
        if let Some(prev) = self.live.take() {
            prev.store(false, Ordering::Release);
        }
        self.silence();
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);

        let live = Arc::new(AtomicBool::new(true));
        self.live = Some(Arc::clone(&live));
        Connection {
            input: AnalyserInput {
                live,
                history: Arc::clone(&self.history),
            },
        }
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.live
            .as_ref()
            .map(|l| l.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Drops buffered samples; the spectrum then decays through smoothing.
    pub fn silence(&self) {
        lock(&self.history).clear();
    }

    pub fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
        self.scratch.clear();
        self.scratch.extend(lock(&self.history).iter().copied());

        let tau = self.options.smoothing_time_constant.clamp(0.0, 1.0);
        let mags = self.fft.magnitudes(&self.scratch);
        for (s, &m) in self.smoothed.iter_mut().zip(mags) {
            let next = tau * *s + (1.0 - tau) * m;
            *s = if next.is_finite() { next } else { 0.0 };
        }

        let min = self.options.min_decibels;
        let range = (self.options.max_decibels - min).max(f32::EPSILON);
        for (o, &s) in out.iter_mut().zip(self.smoothed.iter()) {
            *o = to_byte(s, min, range);
        }
    }
}

fn to_byte(magnitude: f32, min_db: f32, range_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_db) / range_db;
    scaled.clamp(0.0, 255.0) as u8
}

/// Session-side handle of the source-to-analyser link. Dropping it disconnects.
pub struct Connection {
    input: AnalyserInput,
}

impl Connection {
    /// The writer end handed to the decoded stream.
    pub fn input(&self) -> AnalyserInput {
        self.input.clone()
    }

    pub fn disconnect(&self) {
        self.input.live.store(false, Ordering::Release);
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.input.is_connected()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[derive(Clone)]
pub struct AnalyserInput {
    live: Arc<AtomicBool>,
    history: History,
}

impl AnalyserInput {
    pub fn is_connected(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Appends mono samples; ignored once the connection has been severed.
    pub fn push(&self, samples: &[f32]) -> bool {
        if !self.is_connected() {
            return false;
        }
        let mut guard = lock(&self.history);
        guard.extend(samples.iter().copied());
        if guard.len() > FFT_SIZE {
            let drop = guard.len() - FFT_SIZE;
            guard.drain(0..drop);
        }
        true
    }
}
