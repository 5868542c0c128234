use winit::event::{ElementState, Ime, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{InputQueue, Key};

/// Forwards a winit `WindowEvent` into the input queue.
///
/// Key presses (including platform key-repeat) and releases become
/// `Pressed`/`Released` events; committed text becomes one `Typed` event per
/// character. Returns `true` when the event was consumed.
pub fn forward_window_event(queue: &InputQueue, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let key = map_key(event.physical_key);

            match event.state {
                ElementState::Pressed => {
                    queue.on_key_down(key);
                    if let Some(text) = event.text.as_deref() {
                        forward_text(queue, text);
                    }
                }
                ElementState::Released => queue.on_key_up(key),
            }
            true
        }

        WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => {
            forward_text(queue, text);
            true
        }

        _ => false,
    }
}

fn forward_text(queue: &InputQueue, text: &str) {
    text.chars()
        .filter(|ch| is_typed_char(*ch))
        .for_each(|ch| queue.on_char_typed(ch));
}

// Control characters arrive as key text on some platforms (Escape, Delete);
// only the ones with an editing meaning are kept.
fn is_typed_char(ch: char) -> bool {
    !ch.is_control() || matches!(ch, '\n' | '\r' | '\t' | '\u{8}')
}

/// Maps a winit physical key onto the engine's `Key`.
pub fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Space => Key::Space,

            KeyCode::Insert => Key::Insert,
            KeyCode::Delete => Key::Delete,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,

            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,

            KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
            KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
            KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
            KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

            KeyCode::KeyA => Key::A,
            KeyCode::KeyB => Key::B,
            KeyCode::KeyC => Key::C,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyF => Key::F,
            KeyCode::KeyG => Key::G,
            KeyCode::KeyH => Key::H,
            KeyCode::KeyI => Key::I,
            KeyCode::KeyJ => Key::J,
            KeyCode::KeyK => Key::K,
            KeyCode::KeyL => Key::L,
            KeyCode::KeyM => Key::M,
            KeyCode::KeyN => Key::N,
            KeyCode::KeyO => Key::O,
            KeyCode::KeyP => Key::P,
            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyR => Key::R,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyT => Key::T,
            KeyCode::KeyU => Key::U,
            KeyCode::KeyV => Key::V,
            KeyCode::KeyW => Key::W,
            KeyCode::KeyX => Key::X,
            KeyCode::KeyY => Key::Y,
            KeyCode::KeyZ => Key::Z,

            KeyCode::Digit0 => Key::Digit0,
            KeyCode::Digit1 => Key::Digit1,
            KeyCode::Digit2 => Key::Digit2,
            KeyCode::Digit3 => Key::Digit3,
            KeyCode::Digit4 => Key::Digit4,
            KeyCode::Digit5 => Key::Digit5,
            KeyCode::Digit6 => Key::Digit6,
            KeyCode::Digit7 => Key::Digit7,
            KeyCode::Digit8 => Key::Digit8,
            KeyCode::Digit9 => Key::Digit9,

            KeyCode::F1 => Key::F1,
            KeyCode::F2 => Key::F2,
            KeyCode::F3 => Key::F3,
            KeyCode::F4 => Key::F4,
            KeyCode::F5 => Key::F5,
            KeyCode::F6 => Key::F6,
            KeyCode::F7 => Key::F7,
            KeyCode::F8 => Key::F8,
            KeyCode::F9 => Key::F9,
            KeyCode::F10 => Key::F10,
            KeyCode::F11 => Key::F11,
            KeyCode::F12 => Key::F12,

            other => Key::Unknown(other as u32),
        },

        // winit 0.30 uses NativeKeyCode; no stable numeric is guaranteed here.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_letters_map_to_named_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowUp)), Key::ArrowUp);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyA)), Key::A);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)), Key::Shift);
    }

    #[test]
    fn unmapped_codes_keep_a_stable_identifier() {
        let a = map_key(PhysicalKey::Code(KeyCode::NumpadAdd));
        let b = map_key(PhysicalKey::Code(KeyCode::NumpadAdd));
        assert!(matches!(a, Key::Unknown(_)));
        assert_eq!(a, b);
    }

    #[test]
    fn control_characters_are_filtered_from_text() {
        assert!(is_typed_char('a'));
        assert!(is_typed_char('\n'));
        assert!(is_typed_char('\u{8}'));
        assert!(!is_typed_char('\u{1b}'));
        assert!(!is_typed_char('\u{7f}'));
    }

    #[test]
    fn committed_ime_text_is_forwarded_per_character() {
        let queue = InputQueue::new();
        let consumed =
            forward_window_event(&queue, &WindowEvent::Ime(Ime::Commit("ab".to_string())));

        assert!(consumed);
        assert_eq!(queue.pending(), 2);
    }
}
