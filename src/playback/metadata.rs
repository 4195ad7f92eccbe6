use lofty::AudioFile;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub name: String,
    pub duration: Option<Duration>,
}

pub fn read_track_info(path: &Path) -> TrackInfo {
    TrackInfo {
        name: display_name(path),
        duration: read_duration(path),
    }
}

/// File name with its final extension removed.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn read_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let d = tagged.properties().duration();
            (!d.is_zero()).then_some(d)
        }
        Err(e) => {
            log::debug!("no tag properties for {}: {e}", path.display());
            None
        }
    }
}
