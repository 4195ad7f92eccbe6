use crate::audio::analyser::AnalyserInput;
use rodio::Source;
use std::time::Duration;

const FLUSH_EVERY: usize = 256;

/// Pass-through source that copies a mono down-mix of everything it yields
/// into the analyser while the connection is live.
pub struct TapSource<S>
where
    S: Source<Item = f32>,
{
    inner: S,
    input: AnalyserInput,
    frame_sum: f32,
    frame_pos: u16,
    pending: Vec<f32>,
}

impl<S> TapSource<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, input: AnalyserInput) -> Self {
        Self {
            inner,
            input,
            frame_sum: 0.0,
            frame_pos: 0,
            pending: Vec::with_capacity(FLUSH_EVERY),
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.input.push(&self.pending);
            self.pending.clear();
        }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let channels = self.inner.channels().max(1);
        let Some(s) = self.inner.next() else {
            self.flush();
            return None;
        };

        self.frame_sum += s;
        self.frame_pos += 1;
        if self.frame_pos >= channels {
            self.pending.push(self.frame_sum / channels as f32);
            self.frame_sum = 0.0;
            self.frame_pos = 0;
            if self.pending.len() >= FLUSH_EVERY {
                self.flush();
            }
        }
        Some(s)
    }
}

impl<S> Source for TapSource<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}
