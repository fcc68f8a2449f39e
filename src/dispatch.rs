//! The per-key pipeline.
//!
//! Every key event, presses and releases alike, is offered to each stage in
//! turn, until one of them consumes it. A consumed event has been dealt with
//! here, and the firmware must not act on it. An event that makes it through
//! all of the stages is passed back to the firmware to be handled normally.
//!
//! A press first settles a home row mod still waiting on the chord tracker,
//! so that every stage sees the modifiers that press brings down.

extern crate alloc;

use alloc::format;

use smart_leds::RGB8;

use crate::caps::CapsState;
use crate::case_mode::{CaseMode, CaseModeState};
use crate::chord::ChordTracker;
use crate::config::Config;
use crate::event::KeyEvent;
use crate::keys::{Custom, Keycode};
use crate::leds::{self, IndicatorSettings, LayerState, LED_COUNT};
use crate::log::{debug, info};
use crate::symbols;
use crate::tap_hold::TappingTerms;
use crate::usb_typer::type_text;
use crate::Host;

/// What the firmware should do with an event after the pipeline.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Handled here, drop it.
    Consumed,
    /// Process it normally.
    PassThrough,
}

#[derive(Clone, Copy, Debug)]
enum Stage {
    CapsLock,
    Chord,
    CaseMode,
    Symbols,
    Commands,
}

/// The stages, in the order they see each event.
const PIPELINE: [Stage; 5] = [
    Stage::CapsLock,
    Stage::Chord,
    Stage::CaseMode,
    Stage::Symbols,
    Stage::Commands,
];

/// All of the keymap's state.
pub struct Dispatcher {
    config: Config,
    terms: TappingTerms,
    caps: CapsState,
    chord: ChordTracker,
    case_mode: CaseModeState,
    leds: IndicatorSettings,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new(Config::default())
    }
}

impl Dispatcher {
    pub fn new(config: Config) -> Dispatcher {
        Dispatcher {
            terms: TappingTerms::new(&config),
            caps: CapsState::new(config.caps_word_idle_timeout).with_shift_options(
                config.both_shifts_caps_word,
                config.caps_word_invert_on_shift,
            ),
            chord: ChordTracker::new(config.streak_timeout, config.chord_timeout),
            case_mode: CaseModeState::new(),
            leds: IndicatorSettings::default(),
            config,
        }
    }

    /// Run one event through the pipeline.
    pub fn handle(&mut self, event: &KeyEvent, host: &mut dyn Host) -> Outcome {
        self.chord.settle_pending(event, &self.terms, &mut self.caps, &mut self.case_mode, host);

        for stage in PIPELINE {
            let outcome = match stage {
                Stage::CapsLock => self.caps.handle(event, host),
                Stage::Chord => self.chord.handle(event, &mut self.caps, &mut self.case_mode, host),
                Stage::CaseMode => self.case_mode.handle(event, host),
                Stage::Symbols => symbols::process(event, &self.caps, host),
                Stage::Commands => self.command(event, host),
            };
            if outcome == Outcome::Consumed {
                debug!("{:?} consumed by {:?}", event.keycode, stage);
                return Outcome::Consumed;
            }
        }
        Outcome::PassThrough
    }

    /// The tap-hold policy, for the timing engine.
    pub fn policy(&self) -> &TappingTerms {
        &self.terms
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn caps(&self) -> &CapsState {
        &self.caps
    }

    pub fn case_mode(&self) -> Option<CaseMode> {
        self.case_mode.mode()
    }

    pub fn led_settings(&self) -> &IndicatorSettings {
        &self.leds
    }

    /// The LED colors for the given layer state.
    pub fn indicator(&self, layers: LayerState) -> Option<[RGB8; LED_COUNT]> {
        leds::indicator(layers, &self.caps, self.case_mode.mode(), &self.leds)
    }

    fn command(&mut self, event: &KeyEvent, host: &mut dyn Host) -> Outcome {
        let Keycode::Custom(command) = event.keycode else {
            return Outcome::PassThrough;
        };
        if !event.pressed {
            return Outcome::Consumed;
        }

        match command {
            Custom::Version => {
                let version = format!(
                    "{} @ {} ({})",
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION"),
                    self.config.firmware_version
                );
                type_text(host, &version);
            }
            Custom::RgbToggle => self.leds.toggle(),
            Custom::RgbBrightnessUp => self.leds.brighter(self.config.brightness_step),
            Custom::RgbBrightnessDown => self.leds.dimmer(self.config.brightness_step),
            Custom::PrintTerms => {
                let terms = self.terms.describe();
                type_text(host, &terms);
            }
            other => {
                if !self.terms.apply(other) {
                    info!("command: {:?} not handled", other);
                    return Outcome::PassThrough;
                }
            }
        }
        Outcome::Consumed
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Stage {
    fn format(&self, fmt: defmt::Formatter) {
        let name = match self {
            Stage::CapsLock => "caps lock",
            Stage::Chord => "chord",
            Stage::CaseMode => "case mode",
            Stage::Symbols => "symbols",
            Stage::Commands => "commands",
        };
        defmt::write!(fmt, "{}", name)
    }
}
