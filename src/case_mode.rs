//! Case mode
//!
//! A short session for typing identifiers. The toggle key picks the mode
//! from the modifier held with it: shift for camelCase, command for
//! snake_case, alt for kebab-case. The modifier is consumed by the toggle.
//! While the session lasts, space types the separator instead, and two
//! spaces in a row take the separator back and end the session with a real
//! space. Any key that can't be part of an identifier ends it too.

use usbd_human_interface_device::page::Keyboard;

use crate::dispatch::Outcome;
use crate::event::{KeyEvent, Position};
use crate::keys::{is_letter_key, Custom, Keycode};
use crate::log::{debug, info};
use crate::{Host, KeyAction, Mods};

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaseMode {
    Snake,
    Camel,
    Kebab,
}

impl CaseMode {
    /// The mode selected by a set of modifiers, and the modifier that
    /// selected it. Shift wins over command, which wins over alt.
    pub fn for_mods(mods: Mods) -> Option<(CaseMode, Mods)> {
        if mods.contains(Mods::SHIFT) {
            Some((CaseMode::Camel, Mods::SHIFT))
        } else if mods.contains(Mods::GUI) {
            Some((CaseMode::Snake, Mods::GUI))
        } else if mods.contains(Mods::ALT) {
            Some((CaseMode::Kebab, Mods::ALT))
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CaseModeState {
    mode: Option<CaseMode>,
    /// The last key was a space turned into a separator.
    after_separator: bool,
    /// Camel case: shift the next letter.
    shift_next: bool,
    /// A space whose release should not reach the firmware.
    swallowed: Option<Position>,
}

impl CaseModeState {
    pub fn new() -> CaseModeState {
        CaseModeState::default()
    }

    pub fn mode(&self) -> Option<CaseMode> {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    /// Start a session, with the mode picked by the held and one-shot
    /// modifiers. The selecting modifier is cleared so that it doesn't apply
    /// to the next key.
    ///
    /// Without any of the modifiers, nothing happens, and a session already
    /// running carries on in its current mode.
    pub fn activate(&mut self, held: Mods, oneshot: Mods, host: &mut dyn Host) -> Option<CaseMode> {
        let (mode, selector) = CaseMode::for_mods(held | oneshot)?;
        host.send(KeyAction::ClearMods(selector));
        self.mode = Some(mode);
        self.after_separator = false;
        self.shift_next = false;
        info!("case mode: {:?}", mode);
        Some(mode)
    }

    pub fn deactivate(&mut self) {
        if self.mode.take().is_some() {
            debug!("case mode: off");
        }
        self.after_separator = false;
        self.shift_next = false;
    }

    /// The shift to add to `key`, a letter typed on our behalf by an earlier
    /// stage. It counts as typing in the session.
    pub fn shift_for(&mut self, key: Keyboard) -> Mods {
        if self.mode.is_none() {
            return Mods::empty();
        }
        self.after_separator = false;
        if self.shift_next && is_letter_key(key) {
            self.shift_next = false;
            Mods::SHIFT
        } else {
            Mods::empty()
        }
    }

    /// Does this event end a session?
    ///
    /// Releases never do, and neither do keys that are part of an
    /// identifier, unless a modifier is down to turn them into a shortcut.
    pub fn should_terminate(event: &KeyEvent, mods: Mods) -> bool {
        if event.is_release() || event.is_hold() {
            return false;
        }
        let keycode = event.effective_keycode();
        let continues = keycode.is_letter()
            || keycode.is_digit()
            || keycode.is_underscore()
            || matches!(
                keycode,
                Keycode::Key(Keyboard::Minus)
                    | Keycode::Key(Keyboard::DeleteBackspace)
                    | Keycode::Key(Keyboard::DeleteForward)
                    | Keycode::Custom(Custom::CaseModeToggle)
                    | Keycode::Turkish(_)
            );
        if continues {
            !mods.is_empty()
        } else {
            !keycode.is_modifier() && !keycode.is_layer_switch()
        }
    }

    /// The case mode stage of the pipeline.
    pub(crate) fn handle(&mut self, event: &KeyEvent, host: &mut dyn Host) -> Outcome {
        if event.keycode == Keycode::Custom(Custom::CaseModeToggle) {
            if event.pressed {
                let (held, oneshot) = (host.mods(), host.oneshot_mods());
                self.activate(held, oneshot, host);
            }
            return Outcome::Consumed;
        }

        if self.swallowed == Some(event.position) && event.is_release() {
            self.swallowed = None;
            return Outcome::Consumed;
        }

        let Some(mode) = self.mode else {
            return Outcome::PassThrough;
        };

        // With a modifier, space is a shortcut, and ends the session.
        let mods = host.mods() | host.oneshot_mods();
        let space = event.effective_keycode() == Keycode::Key(Keyboard::Space);
        if event.pressed && space && mods.is_empty() {
            return self.space(mode, event, host);
        }

        if Self::should_terminate(event, mods) {
            self.deactivate();
            return Outcome::PassThrough;
        }

        if event.pressed && !event.is_hold() {
            self.after_separator = false;
            if self.shift_next && event.effective_keycode().is_letter() {
                self.shift_next = false;
                host.send(KeyAction::WeakMods(Mods::SHIFT));
            }
        }
        Outcome::PassThrough
    }

    fn space(&mut self, mode: CaseMode, event: &KeyEvent, host: &mut dyn Host) -> Outcome {
        if self.after_separator {
            // Second space: take the separator back, and type the space.
            if mode != CaseMode::Camel {
                host.send(KeyAction::KeyPress(Keyboard::DeleteBackspace, Mods::empty()));
                host.send(KeyAction::KeyRelease(Keyboard::DeleteBackspace));
            }
            self.deactivate();
            return Outcome::PassThrough;
        }

        match mode {
            CaseMode::Snake => tap(host, Keyboard::Minus, Mods::SHIFT),
            CaseMode::Kebab => tap(host, Keyboard::Minus, Mods::empty()),
            CaseMode::Camel => self.shift_next = true,
        }
        self.after_separator = true;
        self.swallowed = Some(event.position);
        Outcome::Consumed
    }
}

fn tap(host: &mut dyn Host, key: Keyboard, mods: Mods) {
    host.send(KeyAction::KeyPress(key, mods));
    host.send(KeyAction::KeyRelease(key));
}

#[cfg(test)]
mod test {
    use usbd_human_interface_device::page::Keyboard;

    use super::{CaseMode, CaseModeState};
    use crate::dispatch::Outcome;
    use crate::event::{KeyEvent, Position};
    use crate::keys::{self, Custom, Keycode};
    use crate::{Host, KeyAction, Mods};

    #[derive(Default)]
    struct Recorder {
        actions: Vec<KeyAction>,
        mods: Mods,
        oneshot: Mods,
    }

    impl Host for Recorder {
        fn send(&mut self, action: KeyAction) {
            if let KeyAction::ClearMods(mods) = action {
                self.mods.remove(mods);
                self.oneshot.remove(mods);
            }
            self.actions.push(action);
        }

        fn mods(&self) -> Mods {
            self.mods
        }

        fn oneshot_mods(&self) -> Mods {
            self.oneshot
        }
    }

    fn press(keycode: Keycode) -> KeyEvent {
        KeyEvent::press(keycode, Position::new(2, 1), 0)
    }

    fn key(key: Keyboard) -> KeyEvent {
        press(Keycode::Key(key))
    }

    #[test]
    fn selection() {
        assert_eq!(CaseMode::for_mods(Mods::SHIFT | Mods::GUI), Some((CaseMode::Camel, Mods::SHIFT)));
        assert_eq!(CaseMode::for_mods(Mods::GUI | Mods::ALT), Some((CaseMode::Snake, Mods::GUI)));
        assert_eq!(CaseMode::for_mods(Mods::ALT), Some((CaseMode::Kebab, Mods::ALT)));
        assert_eq!(CaseMode::for_mods(Mods::CONTROL), None);
    }

    #[test]
    fn activate_clears() {
        let mut host = Recorder {
            oneshot: Mods::SHIFT,
            ..Recorder::default()
        };
        let mut state = CaseModeState::new();
        assert_eq!(state.activate(Mods::empty(), Mods::SHIFT, &mut host), Some(CaseMode::Camel));
        assert_eq!(host.actions, vec![KeyAction::ClearMods(Mods::SHIFT)]);
        assert!(host.oneshot.is_empty());
    }

    #[test]
    fn no_modifier() {
        let mut host = Recorder::default();
        let mut state = CaseModeState::new();
        assert_eq!(state.activate(Mods::empty(), Mods::empty(), &mut host), None);
        assert_eq!(state.mode(), None);
        assert!(host.actions.is_empty());

        // A running session is left alone.
        state.activate(Mods::ALT, Mods::empty(), &mut host);
        assert_eq!(state.activate(Mods::empty(), Mods::empty(), &mut host), None);
        assert_eq!(state.mode(), Some(CaseMode::Kebab));
    }

    #[test]
    fn termination() {
        let none = Mods::empty();
        assert!(!CaseModeState::should_terminate(&key(Keyboard::A), none));
        assert!(!CaseModeState::should_terminate(&key(Keyboard::Keyboard5), none));
        assert!(!CaseModeState::should_terminate(&key(Keyboard::Minus), none));
        assert!(!CaseModeState::should_terminate(&key(Keyboard::DeleteBackspace), none));
        assert!(!CaseModeState::should_terminate(
            &press(Keycode::Modified(Mods::SHIFT, Keyboard::Minus)),
            none
        ));
        assert!(!CaseModeState::should_terminate(
            &press(Keycode::Custom(Custom::CaseModeToggle)),
            none
        ));

        assert!(CaseModeState::should_terminate(&key(Keyboard::Comma), none));
        assert!(CaseModeState::should_terminate(&key(Keyboard::ReturnEnter), none));
        assert!(CaseModeState::should_terminate(&key(Keyboard::A), Mods::CONTROL));

        let release = KeyEvent::release(Keycode::Key(Keyboard::Comma), Position::new(2, 1), 0);
        assert!(!CaseModeState::should_terminate(&release, none));

        // Holding a home row mod is not typing yet.
        assert!(!CaseModeState::should_terminate(&press(keys::MT_Q_F), none));
        assert!(CaseModeState::should_terminate(&press(keys::LS_FUNC).tapped(1), none));
    }

    #[test]
    fn snake() {
        let mut host = Recorder {
            mods: Mods::GUI,
            ..Recorder::default()
        };
        let mut state = CaseModeState::new();
        let toggle = press(Keycode::Custom(Custom::CaseModeToggle));
        assert_eq!(state.handle(&toggle, &mut host), Outcome::Consumed);
        assert_eq!(state.mode(), Some(CaseMode::Snake));
        host.actions.clear();

        assert_eq!(state.handle(&key(Keyboard::A), &mut host), Outcome::PassThrough);
        let space = key(Keyboard::Space);
        assert_eq!(state.handle(&space, &mut host), Outcome::Consumed);
        assert_eq!(
            host.actions,
            vec![
                KeyAction::KeyPress(Keyboard::Minus, Mods::SHIFT),
                KeyAction::KeyRelease(Keyboard::Minus),
            ]
        );
        let space_up = KeyEvent::release(Keycode::Key(Keyboard::Space), space.position, 10);
        assert_eq!(state.handle(&space_up, &mut host), Outcome::Consumed);
        host.actions.clear();

        // Second space takes the underscore back.
        assert_eq!(state.handle(&space, &mut host), Outcome::PassThrough);
        assert_eq!(
            host.actions,
            vec![
                KeyAction::KeyPress(Keyboard::DeleteBackspace, Mods::empty()),
                KeyAction::KeyRelease(Keyboard::DeleteBackspace),
            ]
        );
        assert_eq!(state.mode(), None);
        assert_eq!(state.handle(&space_up, &mut host), Outcome::PassThrough);
    }

    #[test]
    fn camel() {
        let mut host = Recorder::default();
        let mut state = CaseModeState::new();
        state.activate(Mods::SHIFT, Mods::empty(), &mut host);
        host.actions.clear();

        state.handle(&key(Keyboard::F), &mut host);
        state.handle(&key(Keyboard::Space), &mut host);
        assert!(host.actions.is_empty());
        state.handle(&key(Keyboard::B), &mut host);
        state.handle(&key(Keyboard::A), &mut host);
        assert_eq!(host.actions, vec![KeyAction::WeakMods(Mods::SHIFT)]);

        assert_eq!(state.handle(&key(Keyboard::Comma), &mut host), Outcome::PassThrough);
        assert_eq!(state.mode(), None);
    }

    #[test]
    fn modified_space() {
        let mut host = Recorder::default();
        let mut state = CaseModeState::new();
        state.activate(Mods::GUI, Mods::empty(), &mut host);
        host.actions.clear();
        state.handle(&key(Keyboard::X), &mut host);

        host.mods = Mods::CONTROL;
        let space = key(Keyboard::Space);
        assert_eq!(state.handle(&space, &mut host), Outcome::PassThrough);
        assert_eq!(state.mode(), None);
        assert!(host.actions.is_empty());

        // The release belongs to the firmware too.
        let space_up = KeyEvent::release(Keycode::Key(Keyboard::Space), space.position, 10);
        assert_eq!(state.handle(&space_up, &mut host), Outcome::PassThrough);
    }

    #[test]
    fn shift_for_typed_letters() {
        let mut host = Recorder::default();
        let mut state = CaseModeState::new();
        assert_eq!(state.shift_for(Keyboard::D), Mods::empty());

        state.activate(Mods::SHIFT, Mods::empty(), &mut host);
        state.handle(&key(Keyboard::Space), &mut host);
        assert_eq!(state.shift_for(Keyboard::Keyboard1), Mods::empty());
        assert_eq!(state.shift_for(Keyboard::D), Mods::SHIFT);
        assert_eq!(state.shift_for(Keyboard::E), Mods::empty());

        // The letter was typing, so the next space is a separator again.
        host.actions.clear();
        assert_eq!(state.handle(&key(Keyboard::Space), &mut host), Outcome::Consumed);
        assert_eq!(state.mode(), Some(CaseMode::Camel));
    }
}
