//! Typing text
//!
//! Turns strings into key presses on a US layout. Only printable ASCII,
//! newline and tab can be typed; anything else is skipped.

use usbd_human_interface_device::page::Keyboard;

use crate::log::warn;
use crate::{Host, KeyAction, Mods};

/// Offset a key from a run of consecutive HID codes.
fn nth(first: Keyboard, n: u8) -> Keyboard {
    Keyboard::from(first as u8 + n)
}

/// The key and modifiers that type `ch`.
pub fn lookup(ch: char) -> Option<(Keyboard, Mods)> {
    let none = Mods::empty();
    let shift = Mods::SHIFT;
    let key = match ch {
        'a'..='z' => (nth(Keyboard::A, ch as u8 - b'a'), none),
        'A'..='Z' => (nth(Keyboard::A, ch as u8 - b'A'), shift),
        // HID puts 0 after 9.
        '0' => (Keyboard::Keyboard0, none),
        '1'..='9' => (nth(Keyboard::Keyboard1, ch as u8 - b'1'), none),
        '\n' => (Keyboard::ReturnEnter, none),
        '\t' => (Keyboard::Tab, none),
        ' ' => (Keyboard::Space, none),
        '!' => (Keyboard::Keyboard1, shift),
        '"' => (Keyboard::Apostrophe, shift),
        '#' => (Keyboard::Keyboard3, shift),
        '$' => (Keyboard::Keyboard4, shift),
        '%' => (Keyboard::Keyboard5, shift),
        '&' => (Keyboard::Keyboard7, shift),
        '\'' => (Keyboard::Apostrophe, none),
        '(' => (Keyboard::Keyboard9, shift),
        ')' => (Keyboard::Keyboard0, shift),
        '*' => (Keyboard::Keyboard8, shift),
        '+' => (Keyboard::Equal, shift),
        ',' => (Keyboard::Comma, none),
        '-' => (Keyboard::Minus, none),
        '.' => (Keyboard::Dot, none),
        '/' => (Keyboard::ForwardSlash, none),
        ':' => (Keyboard::Semicolon, shift),
        ';' => (Keyboard::Semicolon, none),
        '<' => (Keyboard::Comma, shift),
        '=' => (Keyboard::Equal, none),
        '>' => (Keyboard::Dot, shift),
        '?' => (Keyboard::ForwardSlash, shift),
        '@' => (Keyboard::Keyboard2, shift),
        '[' => (Keyboard::LeftBrace, none),
        '\\' => (Keyboard::Backslash, none),
        ']' => (Keyboard::RightBrace, none),
        '^' => (Keyboard::Keyboard6, shift),
        '_' => (Keyboard::Minus, shift),
        '`' => (Keyboard::Grave, none),
        '{' => (Keyboard::LeftBrace, shift),
        '|' => (Keyboard::Backslash, shift),
        '}' => (Keyboard::RightBrace, shift),
        '~' => (Keyboard::Grave, shift),
        _ => return None,
    };
    Some(key)
}

/// Type `text` as a sequence of key presses and releases.
pub fn type_text<H: Host + ?Sized>(host: &mut H, text: &str) {
    for ch in text.chars() {
        let Some((key, mods)) = lookup(ch) else {
            warn!("typer: can't type {:?}", ch);
            continue;
        };
        host.send(KeyAction::KeyPress(key, mods));
        host.send(KeyAction::KeyRelease(key));
    }
}

#[cfg(test)]
mod test {
    use usbd_human_interface_device::page::Keyboard;

    use super::{lookup, type_text};
    use crate::{Host, KeyAction, Mods};

    #[test]
    fn keys() {
        assert_eq!(lookup('a'), Some((Keyboard::A, Mods::empty())));
        assert_eq!(lookup('z'), Some((Keyboard::Z, Mods::empty())));
        assert_eq!(lookup('Q'), Some((Keyboard::Q, Mods::SHIFT)));
        assert_eq!(lookup('1'), Some((Keyboard::Keyboard1, Mods::empty())));
        assert_eq!(lookup('9'), Some((Keyboard::Keyboard9, Mods::empty())));
        assert_eq!(lookup('0'), Some((Keyboard::Keyboard0, Mods::empty())));
        assert_eq!(lookup('@'), Some((Keyboard::Keyboard2, Mods::SHIFT)));
        assert_eq!(lookup('\n'), Some((Keyboard::ReturnEnter, Mods::empty())));
        assert_eq!(lookup('ş'), None);
        assert_eq!(lookup('\r'), None);
    }

    struct Recorder(Vec<KeyAction>);

    impl Host for Recorder {
        fn send(&mut self, action: KeyAction) {
            self.0.push(action);
        }

        fn mods(&self) -> Mods {
            Mods::empty()
        }

        fn oneshot_mods(&self) -> Mods {
            Mods::empty()
        }
    }

    #[test]
    fn typing() {
        crate::testlog::init();

        let mut host = Recorder(Vec::new());
        type_text(&mut host, "Hi ü!");
        assert_eq!(
            host.0,
            vec![
                KeyAction::KeyPress(Keyboard::H, Mods::SHIFT),
                KeyAction::KeyRelease(Keyboard::H),
                KeyAction::KeyPress(Keyboard::I, Mods::empty()),
                KeyAction::KeyRelease(Keyboard::I),
                KeyAction::KeyPress(Keyboard::Space, Mods::empty()),
                KeyAction::KeyRelease(Keyboard::Space),
                KeyAction::KeyPress(Keyboard::Keyboard1, Mods::SHIFT),
                KeyAction::KeyRelease(Keyboard::Keyboard1),
            ]
        );
    }
}
