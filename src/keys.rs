//! Keycodes
//!
//! Everything a key in the keymap can be bound to. Instead of carving up a
//! flat 16-bit keycode space, each kind of key is its own variant, so that
//! "is this a mod-tap" is a match rather than a range check.
//!
//! The named bindings at the bottom of this file are the dual-role keys of
//! the keymap that the policy code needs to refer to by name.

use enumset::EnumSetType;
use usbd_human_interface_device::page::Keyboard;

use crate::Mods;

/// The layers of the keymap, lowest first. When several are active, the
/// highest one wins.
#[derive(EnumSetType, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    /// Default qwerty layer.
    Qwerty,
    /// Qwerty letters without the home row mods.
    QwertyLetters,
    /// Turkish letters for qwerty.
    QwertyTurkish,
    /// Colemak-DH, toggled on top of qwerty.
    Colemak,
    /// Colemak letters without the home row mods.
    ColemakLetters,
    /// Turkish letters for colemak.
    ColemakTurkish,
    Navigation,
    Mouse,
    Media,
    Numbers,
    /// Symbols used when programming.
    Symbols,
    /// Numbers, reached from the symbol layer.
    SymbolNumbers,
    Function,
}

impl Layer {
    /// The alphabetic layers. The keyboard is just typing when one of these is
    /// on top.
    pub fn is_base(self) -> bool {
        matches!(
            self,
            Layer::Qwerty
                | Layer::QwertyLetters
                | Layer::QwertyTurkish
                | Layer::Colemak
                | Layer::ColemakLetters
                | Layer::ColemakTurkish
        )
    }
}

/// Dual-role keys on the symbol layer. Tapping types the symbol, holding
/// types a snippet built around it.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    Slash,
    Bracket,
    Paren,
    AngleBracket,
    Brace,
    DoubleQuote,
    Quote,
    Underscore,
    Asterisk,
    Grave,
    CodeBlock,
    SwiftCodeBlock,
}

impl Symbol {
    /// The keycode typed when the key is tapped.
    ///
    /// The symbol layer has no room for `&` and `#`, so the two code block
    /// keys provide them.
    pub fn tap(self) -> Keycode {
        match self {
            Symbol::Slash => Keycode::Key(Keyboard::ForwardSlash),
            Symbol::Bracket => Keycode::Key(Keyboard::LeftBrace),
            Symbol::Paren => Keycode::Modified(Mods::SHIFT, Keyboard::Keyboard9),
            Symbol::AngleBracket => Keycode::Modified(Mods::SHIFT, Keyboard::Comma),
            Symbol::Brace => Keycode::Modified(Mods::SHIFT, Keyboard::LeftBrace),
            Symbol::DoubleQuote => Keycode::Modified(Mods::SHIFT, Keyboard::Apostrophe),
            Symbol::Quote => Keycode::Key(Keyboard::Apostrophe),
            Symbol::Underscore => Keycode::Modified(Mods::SHIFT, Keyboard::Minus),
            Symbol::Asterisk => Keycode::Modified(Mods::SHIFT, Keyboard::Keyboard8),
            Symbol::Grave => Keycode::Key(Keyboard::Grave),
            Symbol::CodeBlock => Keycode::Modified(Mods::SHIFT, Keyboard::Keyboard7),
            Symbol::SwiftCodeBlock => Keycode::Modified(Mods::SHIFT, Keyboard::Keyboard3),
        }
    }
}

/// Turkish letters with diacritics.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Turkish {
    /// ç
    C,
    /// ğ
    G,
    /// ı
    I,
    /// ö
    O,
    /// ş
    S,
    /// ü
    U,
}

impl Turkish {
    /// The dead key that adds the diacritic, typed with alt held.
    pub fn dead_key(self) -> Keyboard {
        match self {
            Turkish::C | Turkish::S => Keyboard::C,
            Turkish::G => Keyboard::B,
            Turkish::I => Keyboard::W,
            Turkish::O | Turkish::U => Keyboard::U,
        }
    }

    /// The letter the diacritic goes on.
    pub fn base(self) -> Keyboard {
        match self {
            Turkish::C => Keyboard::C,
            Turkish::G => Keyboard::G,
            Turkish::I => Keyboard::I,
            Turkish::O => Keyboard::O,
            Turkish::S => Keyboard::S,
            Turkish::U => Keyboard::U,
        }
    }
}

/// Keycodes handled entirely inside this keymap.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Custom {
    /// Type the firmware version.
    Version,
    /// Turn the layer indication on and off.
    RgbToggle,
    RgbBrightnessUp,
    RgbBrightnessDown,
    /// Tune the base tapping term.
    TermUp,
    TermDown,
    /// Tune the extra term given to ring and pinky fingers.
    RingPinkyUp,
    RingPinkyDown,
    /// Tune the term taken away from index fingers.
    IndexUp,
    IndexDown,
    /// Type out all of the tapping terms.
    PrintTerms,
    /// Start a snake/camel/kebab case session.
    CaseModeToggle,
    /// The keymap's own caps lock. The real one is the host's fn key.
    CapsLock,
}

/// What a key in the keymap does.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Keycode {
    /// A plain key.
    Key(Keyboard),
    /// A key sent with modifiers, such as `"` being a shifted apostrophe.
    Modified(Mods, Keyboard),
    /// Modifiers when held, `tap` when tapped.
    ModTap { mods: Mods, tap: Keyboard },
    /// A layer when held, `tap` when tapped.
    LayerTap { layer: Layer, tap: Keyboard },
    /// A symbol layer key where both the tap and the hold are macros.
    SymbolTap(Symbol),
    OneShotLayer(Layer),
    OneShotMods(Mods),
    ToggleLayer(Layer),
    /// Momentary when held, toggles when tapped.
    TapToggle(Layer),
    Turkish(Turkish),
    Custom(Custom),
    /// Falls through to the layer below.
    Transparent,
    /// Does nothing.
    No,
}

/// What a dual-role key does while it is held.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hold {
    Mods(Mods),
    Layer(Layer),
    /// Symbol keys type a snippet instead.
    Expand(Symbol),
}

fn hid_range(key: Keyboard, first: Keyboard, last: Keyboard) -> bool {
    let code = key as u8;
    code >= first as u8 && code <= last as u8
}

impl Keycode {
    /// The key behind a plain or modified keycode.
    pub fn base_key(&self) -> Option<Keyboard> {
        match *self {
            Keycode::Key(k) | Keycode::Modified(_, k) => Some(k),
            _ => None,
        }
    }

    /// For dual-role keys, what they send when tapped.
    pub fn tap_key(&self) -> Option<Keycode> {
        match *self {
            Keycode::ModTap { tap, .. } | Keycode::LayerTap { tap, .. } => Some(Keycode::Key(tap)),
            Keycode::SymbolTap(symbol) => Some(symbol.tap()),
            _ => None,
        }
    }

    /// For dual-role keys, what they do when held.
    pub fn hold(&self) -> Option<Hold> {
        match *self {
            Keycode::ModTap { mods, .. } => Some(Hold::Mods(mods)),
            Keycode::LayerTap { layer, .. } => Some(Hold::Layer(layer)),
            Keycode::SymbolTap(symbol) => Some(Hold::Expand(symbol)),
            _ => None,
        }
    }

    pub fn is_dual_role(&self) -> bool {
        matches!(
            self,
            Keycode::ModTap { .. } | Keycode::LayerTap { .. } | Keycode::SymbolTap(_)
        )
    }

    /// Symbol keys are layer-taps to the firmware, even though the layer is
    /// never used.
    pub fn is_layer_tap(&self) -> bool {
        matches!(self, Keycode::LayerTap { .. } | Keycode::SymbolTap(_))
    }

    /// Keys that only change which layer is active.
    pub fn is_layer_switch(&self) -> bool {
        matches!(
            self,
            Keycode::OneShotLayer(_) | Keycode::ToggleLayer(_) | Keycode::TapToggle(_)
        )
    }

    /// A plain, unmodified letter.
    pub fn is_letter(&self) -> bool {
        match *self {
            Keycode::Key(k) => hid_range(k, Keyboard::A, Keyboard::Z),
            _ => false,
        }
    }

    pub fn is_digit(&self) -> bool {
        match *self {
            Keycode::Key(k) => hid_range(k, Keyboard::Keyboard1, Keyboard::Keyboard0),
            _ => false,
        }
    }

    /// A bare modifier key, such as left shift.
    pub fn is_modifier(&self) -> bool {
        match *self {
            Keycode::Key(k) => hid_range(k, Keyboard::LeftControl, Keyboard::RightGUI),
            Keycode::OneShotMods(_) => true,
            _ => false,
        }
    }

    /// `_`, which is shift and minus.
    pub fn is_underscore(&self) -> bool {
        matches!(*self, Keycode::Modified(m, Keyboard::Minus) if m == Mods::SHIFT)
    }
}

/// Is this HID key a letter?
pub fn is_letter_key(key: Keyboard) -> bool {
    hid_range(key, Keyboard::A, Keyboard::Z)
}

const fn mt(mods: Mods, tap: Keyboard) -> Keycode {
    Keycode::ModTap { mods, tap }
}

const fn lt(layer: Layer, tap: Keyboard) -> Keycode {
    Keycode::LayerTap { layer, tap }
}

// Home row mods shared by both layouts.
pub const MT_A: Keycode = mt(Mods::CONTROL, Keyboard::A);
pub const MT_W: Keycode = mt(Mods::SHIFT.union(Mods::CONTROL).union(Mods::GUI), Keyboard::W);

// Qwerty mod-taps.
pub const MT_Q_E: Keycode = mt(Mods::MEH, Keyboard::E);
pub const MT_Q_R: Keycode = mt(Mods::HYPER, Keyboard::R);
pub const MT_Q_U: Keycode = mt(Mods::HYPER, Keyboard::U);
pub const MT_Q_I: Keycode = mt(Mods::MEH, Keyboard::I);
pub const MT_Q_O: Keycode = mt(Mods::SHIFT.union(Mods::CONTROL).union(Mods::GUI), Keyboard::O);
pub const MT_Q_F: Keycode = mt(Mods::SHIFT, Keyboard::F);
pub const MT_Q_D: Keycode = mt(Mods::GUI, Keyboard::D);
pub const MT_Q_S: Keycode = mt(Mods::ALT, Keyboard::S);
pub const MT_Q_J: Keycode = mt(Mods::SHIFT, Keyboard::J);
pub const MT_Q_K: Keycode = mt(Mods::GUI, Keyboard::K);
pub const MT_Q_L: Keycode = mt(Mods::ALT, Keyboard::L);
pub const MT_Q_QT: Keycode = mt(Mods::CONTROL, Keyboard::Apostrophe);

// Colemak-DH mod-taps.
pub const MT_C_F: Keycode = mt(Mods::MEH, Keyboard::F);
pub const MT_C_P: Keycode = mt(Mods::HYPER, Keyboard::P);
pub const MT_C_L: Keycode = mt(Mods::HYPER, Keyboard::L);
pub const MT_C_U: Keycode = mt(Mods::MEH, Keyboard::U);
pub const MT_C_Y: Keycode = mt(Mods::SHIFT.union(Mods::CONTROL).union(Mods::GUI), Keyboard::Y);
pub const MT_C_T: Keycode = mt(Mods::SHIFT, Keyboard::T);
pub const MT_C_S: Keycode = mt(Mods::GUI, Keyboard::S);
pub const MT_C_R: Keycode = mt(Mods::ALT, Keyboard::R);
pub const MT_C_N: Keycode = mt(Mods::SHIFT, Keyboard::N);
pub const MT_C_E: Keycode = mt(Mods::GUI, Keyboard::E);
pub const MT_C_I: Keycode = mt(Mods::ALT, Keyboard::I);
pub const MT_C_O: Keycode = mt(Mods::CONTROL, Keyboard::O);

// Thumb and bottom row layer-taps.
pub const LS_NAVI: Keycode = lt(Layer::Navigation, Keyboard::Space);
pub const LS_MOUS: Keycode = lt(Layer::Mouse, Keyboard::Tab);
pub const LS_MDIA: Keycode = lt(Layer::Media, Keyboard::Escape);
pub const LS_NUMB: Keycode = lt(Layer::Numbers, Keyboard::DeleteBackspace);
pub const LS_SNUM: Keycode = lt(Layer::SymbolNumbers, Keyboard::Equal);
pub const LS_FUNC: Keycode = lt(Layer::Function, Keyboard::ReturnEnter);
