//! ErgoDox EZ keymap
//!
//! The keystroke side of a split keyboard keymap. The surrounding firmware
//! scans the matrix, resolves dual-role keys with its own timing engine and
//! owns the USB reports. This crate sits in between: every key event is run
//! through a small pipeline ([`dispatch::Dispatcher`]) that decides whether
//! the firmware should send the key as-is, or whether something else has
//! already been typed on its behalf.
//!
//! The timing engine consults the [`tap_hold::TapHoldPolicy`] callbacks to
//! decide how long a key has to be held, and what happens when other keys
//! interrupt the hold.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
// #![deny(missing_docs)]

extern crate alloc;

use bitflags::bitflags;

pub use usbd_human_interface_device::page::Keyboard;

pub use dispatch::{Dispatcher, Outcome};
pub use event::{KeyEvent, Position};
pub use keys::{Custom, Keycode, Layer};

pub mod caps;
pub mod case_mode;
pub mod chord;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod keys;
pub mod leds;
pub mod symbols;
pub mod tap_hold;
pub mod usb_typer;

#[cfg(test)]
mod testlog;

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        mod log {
            pub use defmt::{debug, info, warn};
        }
    } else if #[cfg(feature = "log")] {
        mod log {
            pub use log::{debug, info, warn};
        }
    } else {
        mod log {
            macro_rules! debug { ($($arg:tt)*) => {{}}; }
            macro_rules! info { ($($arg:tt)*) => {{}}; }
            macro_rules! warn { ($($arg:tt)*) => {{}}; }
            pub(crate) use {debug, info, warn};
        }
    }
}

/// Which side of the keyboard are we.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn is_left(&self) -> bool {
        match *self {
            Side::Left => true,
            Side::Right => false,
        }
    }
}

bitflags! {
    /// A modifier map. Left and right modifiers are not distinguished, the
    /// host side of this keymap doesn't care which one is down.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
    pub struct Mods: u8 {
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const GUI = 0b0000_1000;
    }
}

impl Default for Mods {
    fn default() -> Self {
        Mods::empty()
    }
}

impl Mods {
    /// Control, shift and alt together.
    pub const MEH: Mods = Mods::SHIFT.union(Mods::CONTROL).union(Mods::ALT);

    /// All four modifiers.
    pub const HYPER: Mods = Mods::MEH.union(Mods::GUI);

    /// Are any of the modifiers that turn a keypress into a shortcut down?
    pub fn is_shortcut(&self) -> bool {
        self.intersects(Mods::CONTROL | Mods::ALT | Mods::GUI)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mods {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Mods({=u8:#06b})", self.bits())
    }
}

/// Indicates something that should be sent to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Press the key, with exactly these modifiers held while it is sent.
    KeyPress(Keyboard, Mods),
    /// Release a key previously pressed with `KeyPress`.
    KeyRelease(Keyboard),
    /// Hold down modifiers (the hold side of a mod-tap key).
    ModsDown(Mods),
    /// Release modifiers held down with `ModsDown`.
    ModsUp(Mods),
    /// Drop modifiers from both the held and the one-shot state.
    ClearMods(Mods),
    /// Apply modifiers to the next report only.
    WeakMods(Mods),
}

/// The firmware side of the pipeline.
///
/// Actions are applied immediately, in the order they are sent. The modifier
/// queries reflect the state of the firmware at the time of the call.
pub trait Host {
    /// Perform a single action.
    fn send(&mut self, action: KeyAction);

    /// Modifiers currently held down.
    fn mods(&self) -> Mods;

    /// Modifiers armed to apply to the next keypress only.
    fn oneshot_mods(&self) -> Mods;
}
