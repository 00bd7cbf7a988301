use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use finfolio_core::form::FormEvent;

/// Translates a terminal event into a form event. Events the form has no use
/// for (mouse, focus, paste, key releases, unbound keys) map to `None`.
pub fn map_event(event: &Event) -> Option<FormEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        Event::Resize(width, height) => Some(FormEvent::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<FormEvent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(FormEvent::Cancel),
        KeyCode::Esc => Some(FormEvent::Cancel),
        KeyCode::Enter => Some(FormEvent::Advance),
        // Some terminals report Shift-Tab as Tab + SHIFT instead of BackTab.
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(FormEvent::PrevField),
        KeyCode::Tab => Some(FormEvent::NextField),
        KeyCode::BackTab => Some(FormEvent::PrevField),
        KeyCode::Backspace => Some(FormEvent::DeleteChar),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(FormEvent::AppendChar(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn press_with(
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(map_event(&press(KeyCode::Enter)), Some(FormEvent::Advance));
        assert_eq!(map_event(&press(KeyCode::Tab)), Some(FormEvent::NextField));
        assert_eq!(map_event(&press(KeyCode::BackTab)), Some(FormEvent::PrevField));
        assert_eq!(
            map_event(&press_with(KeyCode::Tab, KeyModifiers::SHIFT)),
            Some(FormEvent::PrevField)
        );
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        assert_eq!(map_event(&press(KeyCode::Esc)), Some(FormEvent::Cancel));
        assert_eq!(
            map_event(&press_with(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(FormEvent::Cancel)
        );
    }

    #[test]
    fn editing_keys() {
        assert_eq!(map_event(&press(KeyCode::Backspace)), Some(FormEvent::DeleteChar));
        assert_eq!(map_event(&press(KeyCode::Char('7'))), Some(FormEvent::AppendChar('7')));
        assert_eq!(
            map_event(&press_with(KeyCode::Char('N'), KeyModifiers::SHIFT)),
            Some(FormEvent::AppendChar('N'))
        );
        assert_eq!(map_event(&press(KeyCode::Char('ç'))), Some(FormEvent::AppendChar('ç')));
    }

    #[test]
    fn plain_c_is_text() {
        assert_eq!(map_event(&press(KeyCode::Char('c'))), Some(FormEvent::AppendChar('c')));
    }

    #[test]
    fn control_and_alt_chords_are_dropped() {
        assert_eq!(map_event(&press_with(KeyCode::Char('u'), KeyModifiers::CONTROL)), None);
        assert_eq!(map_event(&press_with(KeyCode::Char('x'), KeyModifiers::ALT)), None);
    }

    #[test]
    fn unbound_keys_are_dropped() {
        assert_eq!(map_event(&press(KeyCode::Left)), None);
        assert_eq!(map_event(&press(KeyCode::F(1))), None);
        assert_eq!(map_event(&press(KeyCode::Delete)), None);
    }

    #[test]
    fn key_release_is_dropped() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });

        assert_eq!(map_event(&release), None);
    }

    #[test]
    fn resize_is_forwarded() {
        assert_eq!(
            map_event(&Event::Resize(120, 40)),
            Some(FormEvent::Resize {
                width: 120,
                height: 40
            })
        );
    }

    #[test]
    fn non_key_events_are_dropped() {
        let mouse = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });

        assert_eq!(map_event(&mouse), None);
        assert_eq!(map_event(&Event::FocusGained), None);
    }
}
