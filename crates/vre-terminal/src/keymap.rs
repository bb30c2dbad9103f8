//! Decodes crossterm key/resize events into the Terminal's action
//! vocabulary (the key bindings table).

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Abort,
    Commit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ScrollLeft,
    ScrollRight,
    ToggleHide,
    CursorLeft,
    CursorRight,
    Backspace,
    DeleteForward,
    Insert(char),
    Resize(u16, u16),
    None,
}

pub fn decode(event: Event) -> Action {
    match event {
        Event::Resize(w, h) => Action::Resize(w, h),
        Event::Key(key) if key.kind != KeyEventKind::Release => decode_key(key),
        _ => Action::None,
    }
}

fn decode_key(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Action::Abort,
            KeyCode::Char('j') => Action::ScrollDown,
            KeyCode::Char('k') => Action::ScrollUp,
            KeyCode::Char('f') => Action::PageDown,
            KeyCode::Char('b') => Action::PageUp,
            KeyCode::Char('h') => Action::ScrollLeft,
            KeyCode::Char('l') => Action::ScrollRight,
            KeyCode::Char('t') => Action::ToggleHide,
            _ => Action::None,
        };
    }
    match key.code {
        KeyCode::Enter => Action::Commit,
        KeyCode::Left => Action::CursorLeft,
        KeyCode::Right => Action::CursorRight,
        KeyCode::Delete => Action::DeleteForward,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) if ('\u{14}'..='\u{7E}').contains(&c) => Action::Insert(c),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers as Mods;

    fn key(code: KeyCode, mods: Mods) -> Event {
        Event::Key(KeyEvent::new(code, mods))
    }

    #[test]
    fn control_c_and_d_abort() {
        assert_eq!(decode(key(KeyCode::Char('c'), Mods::CONTROL)), Action::Abort);
        assert_eq!(decode(key(KeyCode::Char('d'), Mods::CONTROL)), Action::Abort);
    }

    #[test]
    fn enter_commits() {
        assert_eq!(decode(key(KeyCode::Enter, Mods::NONE)), Action::Commit);
    }

    #[test]
    fn printable_ascii_inserts() {
        assert_eq!(decode(key(KeyCode::Char('a'), Mods::NONE)), Action::Insert('a'));
        assert_eq!(decode(key(KeyCode::Char('/'), Mods::NONE)), Action::Insert('/'));
    }

    #[test]
    fn delete_and_backspace_are_distinct() {
        assert_eq!(decode(key(KeyCode::Delete, Mods::NONE)), Action::DeleteForward);
        assert_eq!(decode(key(KeyCode::Backspace, Mods::NONE)), Action::Backspace);
    }

    #[test]
    fn arrows_move_the_query_cursor() {
        assert_eq!(decode(key(KeyCode::Left, Mods::NONE)), Action::CursorLeft);
        assert_eq!(decode(key(KeyCode::Right, Mods::NONE)), Action::CursorRight);
    }

    #[test]
    fn resize_event_passes_through_dimensions() {
        assert_eq!(decode(Event::Resize(120, 40)), Action::Resize(120, 40));
    }

    #[test]
    fn control_t_toggles_hide() {
        assert_eq!(decode(key(KeyCode::Char('t'), Mods::CONTROL)), Action::ToggleHide);
    }
}
