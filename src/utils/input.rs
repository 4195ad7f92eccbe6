use crate::app::state::Overlay;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    TogglePlayPause,
    SeekBy(i32),
    SeekToFraction(f32),

    OpenFile,
    OpenHelpModal,
    CloseOverlay,
    Confirm,

    FileChar(char),
    FileBackspace,

    /// A file dropped on the terminal arrives as pasted text.
    Drop(String),

    MouseClick { col: u16, row: u16 },

    None,
}

pub fn map_key(ev: KeyEvent, overlay: Overlay) -> Action {
    if ev.kind == KeyEventKind::Release {
        return Action::None;
    }

    if overlay == Overlay::FileInput {
        return match ev.code {
            KeyCode::Esc => Action::CloseOverlay,
            KeyCode::Enter => Action::Confirm,
            KeyCode::Backspace => Action::FileBackspace,
            KeyCode::Char(c) => Action::FileChar(c),
            _ => Action::None,
        };
    }

    // alerts block everything until dismissed
    if overlay == Overlay::Alert {
        return match ev.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => Action::CloseOverlay,
            _ => Action::None,
        };
    }

    if overlay == Overlay::HelpModal {
        return match ev.code {
            KeyCode::Esc => Action::CloseOverlay,
            _ => Action::None,
        };
    }

    if ev.modifiers.contains(KeyModifiers::CONTROL) {
        match ev.code {
            KeyCode::Char('o') | KeyCode::Char('O') => return Action::OpenFile,
            KeyCode::Char('k') | KeyCode::Char('K') => return Action::OpenHelpModal,
            KeyCode::Char('c') | KeyCode::Char('C') => return Action::Quit,
            _ => {}
        }
    }

    match ev.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Char('o') | KeyCode::Char('O') => Action::OpenFile,
        KeyCode::Char(' ') => Action::TogglePlayPause,
        KeyCode::Left => Action::SeekBy(-5),
        KeyCode::Right => Action::SeekBy(5),
        KeyCode::Esc => Action::CloseOverlay,
        _ => Action::None,
    }
}

pub fn map_mouse(ev: MouseEvent) -> Action {
    if let MouseEventKind::Down(MouseButton::Left) = ev.kind {
        return Action::MouseClick {
            col: ev.column,
            row: ev.row,
        };
    }
    Action::None
}

pub fn map_paste(text: String, overlay: Overlay) -> Action {
    match overlay {
        Overlay::None | Overlay::FileInput => Action::Drop(text),
        _ => Action::None,
    }
}

/// Turns dropped/pasted text into a path. Terminals differ: some quote the
/// path, some backslash-escape spaces, some send a `file://` URI. Only the
/// first dropped item is used.
pub fn parse_dropped_path(text: &str) -> Option<PathBuf> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;

    let unquoted = if first.len() >= 2
        && ((first.starts_with('\'') && first.ends_with('\'')) || (first.starts_with('"') && first.ends_with('"')))
    {
        &first[1..first.len() - 1]
    } else {
        first
    };

    let (raw, is_uri) = match unquoted.strip_prefix("file://") {
        Some(rest) => (rest, true),
        None => (unquoted, false),
    };

    let out = if is_uri { percent_decode(raw) } else { unescape(raw) };
    if out.is_empty() {
        None
    } else {
        Some(PathBuf::from(out))
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, ' ' | '\'' | '"' | '(' | ')' | '&' | '\\') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn plain_paths() {
        assert_eq!(parse_dropped_path("/m/a.mp3\n"), Some(PathBuf::from("/m/a.mp3")));
        assert_eq!(parse_dropped_path("  "), None);
    }

    #[test]
    fn quoted_and_escaped_paths() {
        assert_eq!(
            parse_dropped_path("'/m/My Song.flac'"),
            Some(PathBuf::from("/m/My Song.flac"))
        );
        assert_eq!(
            parse_dropped_path("/m/My\\ Song\\ \\(live\\).flac"),
            Some(PathBuf::from("/m/My Song (live).flac"))
        );
    }

    #[test]
    fn file_uri_is_decoded() {
        assert_eq!(
            parse_dropped_path("file:///m/My%20Song.ogg"),
            Some(PathBuf::from("/m/My Song.ogg"))
        );
    }

    #[test]
    fn multi_drop_takes_first() {
        assert_eq!(
            parse_dropped_path("\n/m/one.wav\n/m/two.wav\n"),
            Some(PathBuf::from("/m/one.wav"))
        );
    }

    #[test]
    fn prompt_captures_characters() {
        assert_eq!(map_key(key(KeyCode::Char(' ')), Overlay::FileInput), Action::FileChar(' '));
        assert_eq!(map_key(key(KeyCode::Char(' ')), Overlay::None), Action::TogglePlayPause);
    }

    #[test]
    fn alert_swallows_other_keys() {
        assert_eq!(map_key(key(KeyCode::Char('q')), Overlay::Alert), Action::None);
        assert_eq!(map_key(key(KeyCode::Enter), Overlay::Alert), Action::CloseOverlay);
    }

    #[test]
    fn paste_ignored_under_modals() {
        assert_eq!(map_paste("x".into(), Overlay::HelpModal), Action::None);
        assert_eq!(map_paste("x".into(), Overlay::None), Action::Drop("x".into()));
    }
}
