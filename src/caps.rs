//! Caps lock and caps word
//!
//! The host has caps lock mapped to its fn key, so there is no real caps
//! lock anymore. Instead, the keymap keeps its own caps lock flag, and while
//! it is on, it turns caps word on whenever a letter is typed. Caps word turns
//! itself off at the first key that doesn't belong in a word, which lets
//! punctuation and shortcuts work normally, and the next letter turns it back
//! on again.
//!
//! Holding shift on both sides of the board also turns caps word on. While
//! it is on, shift inverts it, and a shifted letter comes out lowercase.

use usbd_human_interface_device::page::Keyboard;

use crate::dispatch::Outcome;
use crate::event::{KeyEvent, Position};
use crate::keys::{is_letter_key, Custom, Keycode};
use crate::log::{debug, info};
use crate::{Host, KeyAction, Mods, Side};

/// What caps word does with a keypress.
enum WordKey {
    /// A letter, shift it.
    Shift,
    /// Part of a word, but left alone.
    Continue,
    /// Doesn't affect caps word at all.
    Ignore,
    /// Ends the word.
    End,
}

#[derive(Clone, Debug)]
pub struct CapsState {
    caps_lock: bool,
    caps_word: bool,
    /// Time of the last key that kept caps word going.
    last_active: u32,
    idle_timeout: u32,
    both_shifts: bool,
    invert_on_shift: bool,
    /// The key holding shift down on each side, left first.
    shifts: [Option<Position>; 2],
    /// A letter we typed lowercase, still down.
    lowered: Option<(Position, Keyboard)>,
}

impl CapsState {
    /// Caps word with both of the shift options on.
    pub fn new(idle_timeout: u32) -> CapsState {
        CapsState {
            caps_lock: false,
            caps_word: false,
            last_active: 0,
            idle_timeout,
            both_shifts: true,
            invert_on_shift: true,
            shifts: [None; 2],
            lowered: None,
        }
    }

    /// Choose whether both shifts turn caps word on, and whether shift
    /// inverts it.
    pub fn with_shift_options(mut self, both_shifts: bool, invert_on_shift: bool) -> CapsState {
        self.both_shifts = both_shifts;
        self.invert_on_shift = invert_on_shift;
        self
    }

    pub fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    pub fn caps_word(&self) -> bool {
        self.caps_word
    }

    /// Should letters typed on our behalf be capitals right now?
    pub fn shifting(&self) -> bool {
        self.caps_lock || self.caps_word
    }

    /// The modifiers to type `key` with on our behalf, when `mods` are
    /// active. Letters follow caps lock and caps word, shortcuts are left
    /// alone.
    pub fn letter_mods(&self, key: Keyboard, mods: Mods) -> Mods {
        if !is_letter_key(key) || mods.is_shortcut() {
            return mods;
        }
        if self.invert_on_shift && self.caps_word && mods.contains(Mods::SHIFT) {
            mods.difference(Mods::SHIFT)
        } else if self.shifting() {
            mods | Mods::SHIFT
        } else {
            mods
        }
    }

    /// Flip caps lock. Caps word follows it.
    pub fn toggle(&mut self, time: u32) {
        self.caps_lock = !self.caps_lock;
        if self.caps_lock {
            self.caps_word_on(time);
        } else {
            self.caps_word_off();
        }
        info!("caps lock: {}", self.caps_lock);
    }

    pub fn caps_word_on(&mut self, time: u32) {
        self.caps_word = true;
        self.last_active = time;
    }

    pub fn caps_word_off(&mut self) {
        self.caps_word = false;
    }

    /// Re-arm caps word for a letter typed with caps lock on. Returns true if
    /// caps word was turned on by this key.
    ///
    /// Only presses count, and nothing happens while a shortcut modifier is
    /// down, so that shortcuts still work with caps lock on.
    pub fn on_keypress(&mut self, event: &KeyEvent, mods: Mods) -> bool {
        if !event.pressed || !self.caps_lock || self.caps_word {
            return false;
        }
        if mods.is_shortcut() {
            return false;
        }
        if event.effective_keycode().is_letter() {
            debug!("caps lock: re-arm caps word");
            self.caps_word_on(event.time);
            true
        } else {
            false
        }
    }

    /// Run a keypress through caps word, shifting letters, and ending the word
    /// at anything that doesn't belong in one.
    pub fn process_caps_word(
        &mut self,
        event: &KeyEvent,
        mods: Mods,
        host: &mut dyn Host,
    ) -> Outcome {
        if !self.caps_word || !event.pressed {
            return Outcome::PassThrough;
        }
        if mods.is_shortcut() {
            self.caps_word_off();
            return Outcome::PassThrough;
        }
        match Self::classify(event) {
            WordKey::Shift => {
                self.last_active = event.time;
                if self.invert_on_shift && mods.contains(Mods::SHIFT) {
                    return self.lowercase(event, host);
                }
                host.send(KeyAction::WeakMods(Mods::SHIFT));
            }
            WordKey::Continue => self.last_active = event.time,
            WordKey::Ignore => (),
            WordKey::End => {
                debug!("caps word: end");
                self.caps_word_off();
            }
        }
        Outcome::PassThrough
    }

    /// Type a shifted letter without the shift. The firmware would add it
    /// back, so the press and the release are both ours.
    fn lowercase(&mut self, event: &KeyEvent, host: &mut dyn Host) -> Outcome {
        let Keycode::Key(key) = event.effective_keycode() else {
            return Outcome::PassThrough;
        };
        if let Some((_, earlier)) = self.lowered.take() {
            host.send(KeyAction::KeyRelease(earlier));
        }

        let oneshot = host.oneshot_mods();
        let mods = (host.mods() | oneshot).difference(Mods::SHIFT);
        host.send(KeyAction::KeyPress(key, mods));
        if oneshot.contains(Mods::SHIFT) {
            host.send(KeyAction::ClearMods(Mods::SHIFT));
        }
        self.lowered = Some((event.position, key));
        Outcome::Consumed
    }

    /// Modifiers went down, held by the key at `position`. Shift held on
    /// both sides turns caps word on.
    pub fn mods_down(&mut self, position: Position, mods: Mods, time: u32) {
        if mods == Mods::SHIFT {
            self.shift_down(position.side(), position, time);
        }
    }

    /// The key at `position` let go of its modifiers.
    pub fn mods_up(&mut self, position: Position) {
        for slot in self.shifts.iter_mut() {
            if *slot == Some(position) {
                *slot = None;
            }
        }
    }

    fn shift_down(&mut self, side: Side, position: Position, time: u32) {
        if !self.both_shifts {
            return;
        }
        let (mine, other) = if side.is_left() { (0, 1) } else { (1, 0) };
        self.shifts[mine] = Some(position);
        if self.shifts[other].is_some() && !self.caps_word {
            info!("caps word: both shifts");
            self.caps_word_on(time);
        }
    }

    /// Turn caps word off if it has been idle too long. There is no timer,
    /// so this is checked as events come in.
    pub fn expire(&mut self, time: u32) {
        if self.caps_word && time.wrapping_sub(self.last_active) > self.idle_timeout {
            debug!("caps word: idle");
            self.caps_word_off();
        }
    }

    fn classify(event: &KeyEvent) -> WordKey {
        // A held dual-role key is a modifier or a layer for now.
        if event.is_hold() {
            return WordKey::Ignore;
        }
        let keycode = event.effective_keycode();
        if keycode.is_letter() {
            return WordKey::Shift;
        }
        if keycode.is_digit() || keycode.is_underscore() {
            return WordKey::Continue;
        }
        if keycode.is_modifier() || keycode.is_layer_switch() {
            return WordKey::Ignore;
        }
        match keycode {
            Keycode::Key(Keyboard::DeleteBackspace) | Keycode::Key(Keyboard::DeleteForward) => {
                WordKey::Continue
            }
            Keycode::Turkish(_) => WordKey::Continue,
            Keycode::Custom(Custom::CaseModeToggle) | Keycode::Transparent | Keycode::No => {
                WordKey::Ignore
            }
            _ => WordKey::End,
        }
    }

    /// The caps lock stage of the pipeline.
    pub(crate) fn handle(&mut self, event: &KeyEvent, host: &mut dyn Host) -> Outcome {
        if event.keycode == Keycode::Custom(Custom::CapsLock) {
            if event.pressed {
                self.toggle(event.time);
            }
            return Outcome::Consumed;
        }

        if let Some((position, key)) = self.lowered {
            if event.is_release() && position == event.position {
                self.lowered = None;
                host.send(KeyAction::KeyRelease(key));
                return Outcome::Consumed;
            }
        }

        self.expire(event.time);
        match event.keycode {
            Keycode::Key(Keyboard::LeftShift) if event.pressed => {
                self.shift_down(Side::Left, event.position, event.time)
            }
            Keycode::Key(Keyboard::RightShift) if event.pressed => {
                self.shift_down(Side::Right, event.position, event.time)
            }
            Keycode::Key(Keyboard::LeftShift | Keyboard::RightShift) => {
                self.mods_up(event.position)
            }
            _ => (),
        }

        let mods = host.mods() | host.oneshot_mods();
        self.on_keypress(event, mods);
        self.process_caps_word(event, mods, host)
    }
}
