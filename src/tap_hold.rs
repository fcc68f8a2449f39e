//! Tap-hold policy
//!
//! The firmware's timing engine decides whether a dual-role key was tapped
//! or held. It calls back into the policy here at its decision points: when
//! the key goes down (how long is the tapping term), when another key is
//! tapped while it is down (may it resolve early), when another key is
//! pressed (is this a chord), and when it is released (retro tap).
//!
//! Home row mods on weaker fingers are slower to release, so ring and pinky
//! keys get a longer term, and the index fingers a shorter one. Both offsets
//! can be tuned from the keyboard, but only last until the next power cycle.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use crate::config::Config;
use crate::event::{Finger, KeyEvent, Position, THUMB_COL};
use crate::keys::{self, Custom, Keycode};
use crate::log::info;

/// How a chord between a held dual-role key and another key resolves.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChordDecision {
    /// The hold applies, even with both keys on the same hand.
    AllowSameHand,
    /// The hold only applies when the other key is on the other hand.
    RequireOppositeHand,
}

impl ChordDecision {
    /// Does this decision let the held key act as a hold, for these two keys?
    pub fn allows(self, held: Position, other: Position) -> bool {
        match self {
            ChordDecision::AllowSameHand => true,
            ChordDecision::RequireOppositeHand => held.opposite_hands(&other),
        }
    }
}

/// Callbacks consulted by the dual-role key timing engine.
pub trait TapHoldPolicy {
    /// How long, in ms, the key must be held to count as a hold.
    fn tapping_term(&self, keycode: Keycode, event: &KeyEvent) -> u16;

    /// May the key resolve as held as soon as another key is tapped inside the
    /// tapping term?
    fn permissive_hold(&self, keycode: Keycode) -> bool;

    /// How to treat another key pressed while a dual-role key is held.
    fn chord_decision(
        &self,
        held: Keycode,
        held_event: &KeyEvent,
        other: Keycode,
        other_event: &KeyEvent,
    ) -> ChordDecision;

    /// Should a key held past its term, and released without anything else
    /// being pressed, still send its tap?
    fn retro_tap(&self, keycode: Keycode) -> bool;
}

/// Shift and command mod-taps resolve early. The other modifiers are too
/// easy to trigger by accident during fast typing.
static PERMISSIVE_HOLD: [Keycode; 8] = [
    keys::MT_Q_F,
    keys::MT_Q_J,
    keys::MT_Q_D,
    keys::MT_Q_K,
    keys::MT_C_T,
    keys::MT_C_N,
    keys::MT_C_S,
    keys::MT_C_E,
];

/// The keymap's tapping terms, and the policy built on them.
///
/// Offsets are unsigned and applied with a fixed sign: ring and pinky are
/// added to the base, index is subtracted from it. All arithmetic saturates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TappingTerms {
    base: u16,
    ring_pinky: u16,
    index: u16,
    step: u16,
    thumb_bonus: u16,
}

impl Default for TappingTerms {
    fn default() -> Self {
        TappingTerms::new(&Config::default())
    }
}

impl TappingTerms {
    pub fn new(config: &Config) -> TappingTerms {
        TappingTerms {
            base: config.tapping_term,
            ring_pinky: config.ring_pinky_offset,
            index: config.index_offset,
            step: config.term_step,
            thumb_bonus: config.thumb_bonus,
        }
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn ring_pinky_offset(&self) -> u16 {
        self.ring_pinky
    }

    pub fn index_offset(&self) -> u16 {
        self.index
    }

    /// The term for a mod-tap pressed by this finger.
    pub fn for_finger(&self, finger: Finger) -> u16 {
        match finger {
            Finger::Pinky | Finger::Ring => self.base.saturating_add(self.ring_pinky),
            Finger::Index => self.base.saturating_sub(self.index),
            Finger::Middle | Finger::Thumb => self.base,
        }
    }

    /// Apply one of the tuning keys. Returns false for anything that isn't a
    /// tuning key.
    pub fn apply(&mut self, command: Custom) -> bool {
        let step = self.step;
        match command {
            Custom::TermUp => self.base = self.base.saturating_add(step),
            Custom::TermDown => self.base = self.base.saturating_sub(step),
            Custom::RingPinkyUp => self.ring_pinky = self.ring_pinky.saturating_add(step),
            Custom::RingPinkyDown => self.ring_pinky = self.ring_pinky.saturating_sub(step),
            Custom::IndexUp => self.index = self.index.saturating_add(step),
            Custom::IndexDown => self.index = self.index.saturating_sub(step),
            _ => return false,
        }
        info!(
            "tapping term: {} ring/pinky: +{} index: -{}",
            self.base, self.ring_pinky, self.index
        );
        true
    }

    /// The current terms, as text to type out.
    pub fn describe(&self) -> String {
        format!(
            "tapping term {}ms, ring/pinky {}ms (+{}), index {}ms (-{})",
            self.base,
            self.for_finger(Finger::Ring),
            self.ring_pinky,
            self.for_finger(Finger::Index),
            self.index,
        )
    }
}

impl TapHoldPolicy for TappingTerms {
    fn tapping_term(&self, keycode: Keycode, event: &KeyEvent) -> u16 {
        if keycode == keys::LS_NAVI {
            return self.base.saturating_add(self.thumb_bonus);
        }
        match keycode {
            Keycode::ModTap { .. } => self.for_finger(event.position.finger()),
            _ => self.base,
        }
    }

    fn permissive_hold(&self, keycode: Keycode) -> bool {
        keycode.is_layer_tap() || PERMISSIVE_HOLD.contains(&keycode)
    }

    fn chord_decision(
        &self,
        held: Keycode,
        _held_event: &KeyEvent,
        _other: Keycode,
        other_event: &KeyEvent,
    ) -> ChordDecision {
        if held.is_layer_tap() || other_event.position.col >= THUMB_COL {
            ChordDecision::AllowSameHand
        } else {
            ChordDecision::RequireOppositeHand
        }
    }

    fn retro_tap(&self, keycode: Keycode) -> bool {
        keycode == keys::LS_SNUM
    }
}

#[cfg(test)]
mod test {
    use usbd_human_interface_device::page::Keyboard;

    use super::{ChordDecision, TapHoldPolicy, TappingTerms};
    use crate::config::Config;
    use crate::event::{KeyEvent, Position};
    use crate::keys::{self, Custom, Keycode, Symbol};

    fn press(keycode: Keycode, row: u8, col: u8) -> KeyEvent {
        KeyEvent::press(keycode, Position::new(row, col), 0)
    }

    #[test]
    fn finger_terms() {
        let terms = TappingTerms::default();
        let pinky = press(keys::MT_A, 1, 2);
        let ring = press(keys::MT_Q_S, 2, 2);
        let middle = press(keys::MT_Q_D, 3, 2);
        let index = press(keys::MT_Q_F, 4, 2);

        assert_eq!(terms.tapping_term(keys::MT_A, &pinky), 200);
        assert_eq!(terms.tapping_term(keys::MT_Q_S, &ring), 200);
        assert_eq!(terms.tapping_term(keys::MT_Q_D, &middle), 180);
        assert_eq!(terms.tapping_term(keys::MT_Q_F, &index), 150);

        // Right side is mirrored.
        let right_index = press(keys::MT_Q_J, 9, 2);
        let right_pinky = press(keys::MT_Q_QT, 12, 2);
        assert!(
            terms.tapping_term(keys::MT_Q_QT, &right_pinky)
                > terms.tapping_term(keys::MT_Q_J, &right_index)
        );

        // Non mod-taps keep the base term.
        let plain = press(Keycode::Key(Keyboard::A), 1, 2);
        assert_eq!(terms.tapping_term(Keycode::Key(Keyboard::A), &plain), 180);
        let numb = press(keys::LS_NUMB, 4, 5);
        assert_eq!(terms.tapping_term(keys::LS_NUMB, &numb), 180);
    }

    #[test]
    fn thumb_bonus() {
        let terms = TappingTerms::default();
        let navi = press(keys::LS_NAVI, 10, 5);
        assert_eq!(terms.tapping_term(keys::LS_NAVI, &navi), 200);
    }

    #[test]
    fn tuning() {
        let mut terms = TappingTerms::default();
        let before = terms.clone();

        assert!(terms.apply(Custom::IndexUp));
        assert_eq!(terms.index_offset(), 35);
        assert!(terms.apply(Custom::IndexDown));
        assert_eq!(terms, before);

        assert!(terms.apply(Custom::RingPinkyUp));
        assert!(terms.apply(Custom::RingPinkyDown));
        assert!(terms.apply(Custom::TermUp));
        assert!(terms.apply(Custom::TermDown));
        assert_eq!(terms, before);

        assert!(!terms.apply(Custom::Version));
    }

    #[test]
    fn tuning_saturates() {
        let config = Config {
            index_offset: 5,
            ..Config::default()
        };
        let mut terms = TappingTerms::new(&config);
        for _ in 0..10 {
            terms.apply(Custom::IndexDown);
        }
        assert_eq!(terms.index_offset(), 0);

        let config = Config {
            tapping_term: 10,
            index_offset: 100,
            ..Config::default()
        };
        let terms = TappingTerms::new(&config);
        let index = press(keys::MT_Q_F, 4, 2);
        assert_eq!(terms.tapping_term(keys::MT_Q_F, &index), 0);
    }

    #[test]
    fn permissive() {
        let terms = TappingTerms::default();
        assert!(terms.permissive_hold(keys::LS_NAVI));
        assert!(terms.permissive_hold(keys::LS_SNUM));
        assert!(terms.permissive_hold(Keycode::SymbolTap(Symbol::Paren)));
        assert!(terms.permissive_hold(keys::MT_Q_F));
        assert!(terms.permissive_hold(keys::MT_C_E));
        assert!(!terms.permissive_hold(keys::MT_A));
        assert!(!terms.permissive_hold(keys::MT_Q_S));
        assert!(!terms.permissive_hold(Keycode::Key(Keyboard::A)));

        // No hidden state.
        assert_eq!(
            terms.permissive_hold(keys::MT_Q_F),
            terms.permissive_hold(keys::MT_Q_F)
        );
    }

    #[test]
    fn chords() {
        let terms = TappingTerms::default();
        let held = press(keys::MT_Q_F, 4, 2);
        let same_hand = press(Keycode::Key(Keyboard::D), 3, 2);
        let other_hand = press(Keycode::Key(Keyboard::J), 9, 2);
        let thumb = press(keys::LS_NAVI, 3, 5);

        let decision = terms.chord_decision(held.keycode, &held, same_hand.keycode, &same_hand);
        assert_eq!(decision, ChordDecision::RequireOppositeHand);
        assert!(!decision.allows(held.position, same_hand.position));

        let decision = terms.chord_decision(held.keycode, &held, other_hand.keycode, &other_hand);
        assert!(decision.allows(held.position, other_hand.position));

        let decision = terms.chord_decision(held.keycode, &held, thumb.keycode, &thumb);
        assert_eq!(decision, ChordDecision::AllowSameHand);

        let layer = press(keys::LS_NUMB, 4, 5);
        let decision = terms.chord_decision(layer.keycode, &layer, same_hand.keycode, &same_hand);
        assert_eq!(decision, ChordDecision::AllowSameHand);

        assert_eq!(
            terms.chord_decision(held.keycode, &held, same_hand.keycode, &same_hand),
            terms.chord_decision(held.keycode, &held, same_hand.keycode, &same_hand),
        );
    }

    #[test]
    fn retro() {
        let terms = TappingTerms::default();
        assert!(terms.retro_tap(keys::LS_SNUM));
        assert!(!terms.retro_tap(keys::LS_NAVI));
        assert!(!terms.retro_tap(keys::MT_A));
    }
}
