//! Chord tracking for home row mods.
//!
//! Once the timing engine has decided a mod-tap is held, the hold is not
//! applied right away. It waits for the next key, and the
//! [`TapHoldPolicy::chord_decision`] for the pair decides: a hold with a key
//! on the other hand is a real chord, and the modifier goes down; a "hold"
//! that rolls into a key on the same hand was just fast typing, and the
//! mod-tap is typed as its letter instead.
//!
//! Two shortcuts: a mod-tap that comes down in the middle of a typing streak
//! is a tap without waiting, and a mod-tap held for longer than the chord
//! timeout is a hold no matter what comes next.

use arrayvec::ArrayVec;
use usbd_human_interface_device::page::Keyboard;

use crate::caps::CapsState;
use crate::case_mode::CaseModeState;
use crate::dispatch::Outcome;
use crate::event::{KeyEvent, Position};
use crate::keys::{Hold, Keycode};
use crate::log::{debug, warn};
use crate::tap_hold::TapHoldPolicy;
use crate::{Host, KeyAction, Mods};

/// Keys that have been settled one way or the other, and are still down.
const MAX_SETTLED: usize = 8;

#[derive(Clone, Copy, Debug)]
enum Settled {
    /// Modifiers are down, and come up with the key.
    Hold(Mods),
    /// The tap key is down, and comes up with the key.
    Tap(Keyboard),
    /// Already typed, the release has nothing to do.
    Done,
}

#[derive(Clone, Copy, Debug)]
struct Down {
    position: Position,
    settled: Settled,
}

#[derive(Debug)]
pub struct ChordTracker {
    /// The held mod-tap waiting for the next key.
    pending: Option<KeyEvent>,
    settled: ArrayVec<Down, MAX_SETTLED>,
    /// Time of the last press of a typing key.
    last_press: Option<u32>,
    streak_timeout: u16,
    chord_timeout: u16,
}

impl ChordTracker {
    pub fn new(streak_timeout: u16, chord_timeout: u16) -> ChordTracker {
        ChordTracker {
            pending: None,
            settled: ArrayVec::new(),
            last_press: None,
            streak_timeout,
            chord_timeout,
        }
    }

    /// Is a mod-tap waiting to see what the next key is?
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Any press decides the pending key. This happens before any stage
    /// looks at the press, so they all see the modifiers of a chord as
    /// already down.
    pub(crate) fn settle_pending(
        &mut self,
        event: &KeyEvent,
        policy: &dyn TapHoldPolicy,
        caps: &mut CapsState,
        case_mode: &mut CaseModeState,
        host: &mut dyn Host,
    ) {
        if !event.pressed {
            return;
        }
        if let Some(held) = self.pending.take() {
            self.settle(&held, event, policy, caps, case_mode, host);
        }
    }

    /// The chord stage of the pipeline.
    pub(crate) fn handle(
        &mut self,
        event: &KeyEvent,
        caps: &mut CapsState,
        case_mode: &mut CaseModeState,
        host: &mut dyn Host,
    ) -> Outcome {
        if event.is_release() {
            return self.release(event, caps, host);
        }

        let outcome = match event.keycode {
            Keycode::ModTap { tap, .. } if event.tap_count == 0 => {
                if self.in_streak(event.time) {
                    debug!("chord: streak tap at {}", event.time);
                    let mods = Self::tap_mods(tap, caps, case_mode, host);
                    host.send(KeyAction::KeyPress(tap, mods));
                    self.remember(event.position, Settled::Tap(tap), caps, host);
                } else {
                    self.pending = Some(*event);
                }
                Outcome::Consumed
            }
            _ => Outcome::PassThrough,
        };

        if !event.keycode.is_modifier() {
            self.last_press = Some(event.time);
        }
        outcome
    }

    fn in_streak(&self, time: u32) -> bool {
        match self.last_press {
            Some(last) => time.wrapping_sub(last) < u32::from(self.streak_timeout),
            None => false,
        }
    }

    /// The modifiers for a letter typed here, which skips the stages that
    /// would otherwise shift it.
    fn tap_mods(
        tap: Keyboard,
        caps: &CapsState,
        case_mode: &mut CaseModeState,
        host: &dyn Host,
    ) -> Mods {
        caps.letter_mods(tap, host.mods() | case_mode.shift_for(tap))
    }

    fn settle(
        &mut self,
        held: &KeyEvent,
        other: &KeyEvent,
        policy: &dyn TapHoldPolicy,
        caps: &mut CapsState,
        case_mode: &mut CaseModeState,
        host: &mut dyn Host,
    ) {
        let Keycode::ModTap { mods, tap } = held.keycode else {
            return;
        };

        let elapsed = other.time.wrapping_sub(held.time);
        let hold = elapsed > u32::from(self.chord_timeout)
            || policy
                .chord_decision(held.keycode, held, other.keycode, other)
                .allows(held.position, other.position);

        if hold {
            debug!("chord: hold");
            host.send(KeyAction::ModsDown(mods));
            caps.mods_down(held.position, mods, other.time);
            self.remember(held.position, Settled::Hold(mods), caps, host);
        } else {
            debug!("chord: same hand, tap");
            let tap_mods = Self::tap_mods(tap, caps, case_mode, host);
            host.send(KeyAction::KeyPress(tap, tap_mods));
            host.send(KeyAction::KeyRelease(tap));
            self.remember(held.position, Settled::Done, caps, host);
        }
    }

    fn remember(
        &mut self,
        position: Position,
        settled: Settled,
        caps: &mut CapsState,
        host: &mut dyn Host,
    ) {
        let down = Down { position, settled };
        if self.settled.try_push(down).is_err() {
            // Nothing will come up with the key, so let go now.
            warn!("chord: too many keys held");
            Self::let_go(down, caps, host);
        }
    }

    fn release(&mut self, event: &KeyEvent, caps: &mut CapsState, host: &mut dyn Host) -> Outcome {
        if let Some(held) = self.pending {
            if held.position == event.position {
                // Held and released on its own. It was a hold with nothing to
                // hold, but the modifier still goes down and up, for modified
                // mouse clicks.
                self.pending = None;
                if let Some(Hold::Mods(mods)) = held.keycode.hold() {
                    host.send(KeyAction::ModsDown(mods));
                    caps.mods_down(held.position, mods, event.time);
                    host.send(KeyAction::ModsUp(mods));
                    caps.mods_up(held.position);
                }
                return Outcome::Consumed;
            }
        }

        match self.settled.iter().position(|d| d.position == event.position) {
            Some(index) => {
                let down = self.settled.remove(index);
                Self::let_go(down, caps, host);
                Outcome::Consumed
            }
            None => Outcome::PassThrough,
        }
    }

    fn let_go(down: Down, caps: &mut CapsState, host: &mut dyn Host) {
        match down.settled {
            Settled::Hold(mods) => {
                host.send(KeyAction::ModsUp(mods));
                caps.mods_up(down.position);
            }
            Settled::Tap(key) => host.send(KeyAction::KeyRelease(key)),
            Settled::Done => (),
        }
    }
}
