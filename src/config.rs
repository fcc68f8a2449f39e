//! Keymap configuration.
//!
//! The tunable numbers of the keymap. The defaults are what the keyboard
//! boots with. Nothing here is persisted by the keymap itself, but the
//! structure can be encoded so the firmware can keep a copy somewhere (and
//! hand it back at the next power on) if it wants to.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use minicbor::{Decode, Encode};

use crate::log::warn;

pub const CONFIG_TAG: u64 = 0x6b65796d6170;

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
#[cbor(tag(0x6b65796d6170))]
#[cbor(map)]
pub struct Config {
    /// Base tapping term, in ms.
    #[n(1)]
    pub tapping_term: u16,

    /// Added to the term of ring and pinky finger mod-taps.
    #[n(2)]
    pub ring_pinky_offset: u16,

    /// Taken off the term of index finger mod-taps.
    #[n(3)]
    pub index_offset: u16,

    /// How much each press of a tuning key changes a term.
    #[n(4)]
    pub term_step: u16,

    /// Added to the term of the space/navigation thumb key.
    #[n(5)]
    pub thumb_bonus: u16,

    /// A mod-tap held within this many ms of the previous keypress is
    /// typing, not a hold.
    #[n(6)]
    pub streak_timeout: u16,

    /// After this many ms, a held mod-tap is a hold no matter what hand the
    /// next key is on.
    #[n(7)]
    pub chord_timeout: u16,

    /// Caps word turns itself off after this many ms without typing.
    #[n(8)]
    pub caps_word_idle_timeout: u32,

    /// Brightness change per press of the brightness keys.
    #[n(9)]
    pub brightness_step: u8,

    /// Configurator build identifier, reported by the version key.
    #[n(10)]
    pub firmware_version: String,

    /// Holding shift on both sides turns caps word on.
    #[n(11)]
    pub both_shifts_caps_word: bool,

    /// Shift inverts caps word, typing lowercase letters.
    #[n(12)]
    pub caps_word_invert_on_shift: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tapping_term: 180,
            ring_pinky_offset: 20,
            index_offset: 30,
            term_step: 5,
            thumb_bonus: 20,
            streak_timeout: 100,
            chord_timeout: 1000,
            caps_word_idle_timeout: 5000,
            brightness_step: 16,
            firmware_version: String::from("yBAgx/KGDNl"),
            both_shifts_caps_word: true,
            caps_word_invert_on_shift: true,
        }
    }
}

impl Config {
    pub fn encode(&self) -> Result<Vec<u8>, minicbor::encode::Error<Infallible>> {
        minicbor::to_vec(self)
    }

    /// Decode a config previously produced by [`Config::encode`]. Anything
    /// that doesn't decode is reported and ignored, and the caller should
    /// fall back to the defaults.
    pub fn decode(buffer: &[u8]) -> Option<Config> {
        match minicbor::decode(buffer) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Fail to read keymap config: {:?}", e);
                None
            }
        }
    }

    /// Like `decode`, but never fails.
    pub fn decode_or_default(buffer: &[u8]) -> Config {
        Config::decode(buffer).unwrap_or_default()
    }
}
