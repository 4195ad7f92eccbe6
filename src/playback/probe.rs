use crate::playback::error::PipelineError;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const MAX_BAD_PACKETS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeInfo {
    pub duration: Option<Duration>,
    pub sample_rate: Option<u32>,
    pub channels: Option<usize>,
}

/// Blocks until the first audio packet of `path` decodes, which is the point
/// where playback can begin. Any container or codec failure is a decode error.
pub fn probe(path: &Path) -> Result<ProbeInfo, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PipelineError::decode(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PipelineError::decode(path, "no audio track"))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| PipelineError::decode(path, e))?;

    let mut bad = 0;
    loop {
        let packet = format.next_packet().map_err(|e| PipelineError::decode(path, e))?;
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(_) => break,
            Err(SymphoniaError::DecodeError(e)) if bad < MAX_BAD_PACKETS => {
                log::debug!("skipping undecodable packet in {}: {e}", path.display());
                bad += 1;
            }
            Err(e) => return Err(PipelineError::decode(path, e)),
        }
    }

    let duration = match (params.n_frames, params.sample_rate) {
        (Some(n), Some(sr)) if sr > 0 => Some(Duration::from_secs_f64(n as f64 / sr as f64)),
        _ => None,
    };

    Ok(ProbeInfo {
        duration,
        sample_rate: params.sample_rate,
        channels: params.channels.map(|c| c.count()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::fixtures::write_wav;
    use std::io::Write;

    #[test]
    fn wav_reports_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 1.0);

        let info = probe(&path).unwrap();
        assert_eq!(info.sample_rate, Some(44_100));
        assert_eq!(info.channels, Some(2));
        let d = info.duration.unwrap().as_secs_f64();
        assert!((d - 1.0).abs() < 0.01, "duration {d}");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.mp3");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"this is not audio at all").unwrap();

        let err = probe(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = probe(Path::new("/definitely/not/here.flac")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
