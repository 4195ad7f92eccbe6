use std::path::Path;

/// 16-bit stereo 440 Hz tone at 44.1 kHz.
pub fn write_wav(path: &Path, secs: f32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    let frames = (44_100.0 * secs) as usize;
    for i in 0..frames {
        let t = i as f32 / 44_100.0;
        let v = ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 8000.0) as i16;
        w.write_sample(v).unwrap();
        w.write_sample(v).unwrap();
    }
    w.finalize().unwrap();
}
