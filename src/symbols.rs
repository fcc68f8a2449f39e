//! Symbol keys and Turkish letters
//!
//! The symbol layer keys are dual-role, but neither side is a modifier or a
//! layer: a tap types the symbol, a hold types a snippet around it, leaving
//! the cursor where the typing continues. Turkish letters are typed as a
//! macOS dead key followed by the base letter.

use usbd_human_interface_device::page::Keyboard;

use crate::caps::CapsState;
use crate::dispatch::Outcome;
use crate::event::KeyEvent;
use crate::keys::{Keycode, Symbol, Turkish};
use crate::log::debug;
use crate::usb_typer::type_text;
use crate::{Host, KeyAction, Mods};

/// What holding a symbol key types.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Expansion {
    pub text: &'static str,
    /// Pressed once after the text, to put the cursor inside it.
    pub cursor: Option<Keyboard>,
}

impl Expansion {
    const fn pair(text: &'static str) -> Expansion {
        Expansion {
            text,
            cursor: Some(Keyboard::LeftArrow),
        }
    }
}

impl Symbol {
    pub fn expansion(self) -> Expansion {
        match self {
            Symbol::Slash => Expansion {
                text: "../",
                cursor: None,
            },
            Symbol::Bracket => Expansion::pair("[]"),
            Symbol::Paren => Expansion::pair("()"),
            Symbol::AngleBracket => Expansion::pair("<>"),
            Symbol::Brace => Expansion::pair("{}"),
            Symbol::DoubleQuote => Expansion::pair("\"\""),
            Symbol::Quote => Expansion::pair("''"),
            Symbol::Underscore => Expansion::pair("__"),
            Symbol::Asterisk => Expansion::pair("**"),
            Symbol::Grave => Expansion::pair("``"),
            Symbol::CodeBlock => Expansion {
                text: "```\n\n```",
                cursor: Some(Keyboard::UpArrow),
            },
            Symbol::SwiftCodeBlock => Expansion {
                text: "```swift\n\n```",
                cursor: Some(Keyboard::UpArrow),
            },
        }
    }
}

/// The symbol stage of the pipeline.
pub(crate) fn process(event: &KeyEvent, caps: &CapsState, host: &mut dyn Host) -> Outcome {
    match event.keycode {
        Keycode::SymbolTap(symbol) if event.tap_count == 0 => {
            // The hold types once, on the press. The release has nothing to
            // undo.
            if event.pressed {
                expand(symbol.expansion(), host);
            }
            Outcome::Consumed
        }
        Keycode::SymbolTap(symbol) => {
            let (mods, key) = match symbol.tap() {
                Keycode::Modified(mods, key) => (mods, key),
                Keycode::Key(key) => (Mods::empty(), key),
                _ => return Outcome::PassThrough,
            };
            if event.pressed {
                let oneshot = host.oneshot_mods();
                host.send(KeyAction::KeyPress(key, host.mods() | oneshot | mods));
                if !oneshot.is_empty() {
                    host.send(KeyAction::ClearMods(oneshot));
                }
            } else {
                host.send(KeyAction::KeyRelease(key));
            }
            Outcome::Consumed
        }
        Keycode::Turkish(letter) => {
            if event.pressed {
                turkish(letter, caps, host);
            }
            Outcome::Consumed
        }
        _ => Outcome::PassThrough,
    }
}

fn expand(expansion: Expansion, host: &mut dyn Host) {
    debug!("symbol: expand {}", expansion.text);
    type_text(host, expansion.text);
    if let Some(key) = expansion.cursor {
        host.send(KeyAction::KeyPress(key, Mods::empty()));
        host.send(KeyAction::KeyRelease(key));
    }
}

fn turkish(letter: Turkish, caps: &CapsState, host: &mut dyn Host) {
    let oneshot = host.oneshot_mods();
    let shift = (host.mods() | oneshot).intersection(Mods::SHIFT);

    let dead = letter.dead_key();
    host.send(KeyAction::KeyPress(dead, Mods::ALT));
    host.send(KeyAction::KeyRelease(dead));

    let base = letter.base();
    host.send(KeyAction::KeyPress(base, caps.letter_mods(base, shift)));
    host.send(KeyAction::KeyRelease(base));

    if oneshot.contains(Mods::SHIFT) {
        host.send(KeyAction::ClearMods(Mods::SHIFT));
    }
}
