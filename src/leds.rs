//! Layer indication on the key LEDs.
//!
//! Each layer lights the keys that do something on it, in the layer's color.
//! The keyboard has no LEDs under the thumb cluster and the outer columns,
//! which leaves 24 on each half.

use enumset::EnumSet;
use smart_leds::hsv::{hsv2rgb, Hsv};
use smart_leds::{SmartLedsWrite, RGB8};

use crate::case_mode::CaseMode;
use crate::caps::CapsState;
use crate::keys::Layer;
use crate::log::info;

pub const LED_COUNT: usize = 48;

const OFF: RGB8 = RGB8::new(0, 0, 0);

/// The active layers, as the firmware's layer state bitmask.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct LayerState(pub EnumSet<Layer>);

impl LayerState {
    /// Layers beyond the ones this keymap knows about are dropped.
    pub fn from_bits(bits: u16) -> LayerState {
        LayerState(EnumSet::from_u16_truncated(bits))
    }

    pub fn bits(&self) -> u16 {
        self.0.as_u16_truncated()
    }

    /// The layer on top. With nothing active, that is the default layer.
    pub fn highest(&self) -> Layer {
        self.0.iter().last().unwrap_or(Layer::Qwerty)
    }
}

/// User controlled LED settings.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct IndicatorSettings {
    pub enabled: bool,
    pub brightness: u8,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            enabled: true,
            brightness: u8::MAX,
        }
    }
}

impl IndicatorSettings {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        info!("layer leds: {}", self.enabled);
    }

    pub fn brighter(&mut self, step: u8) {
        self.brightness = self.brightness.saturating_add(step);
    }

    pub fn dimmer(&mut self, step: u8) {
        self.brightness = self.brightness.saturating_sub(step);
    }
}

/// Masks are written as the keyboard looks: each row is five keys of the
/// left half followed by five of the right half, and the bottom row is
/// four and four. The LEDs are chained through the right half first, in
/// reading order, and then the left half from the middle outwards.
const fn pretty(keys: [bool; LED_COUNT]) -> [bool; LED_COUNT] {
    let mut leds = [false; LED_COUNT];
    let mut row = 0;
    while row < 4 {
        let mut col = 0;
        while col < 5 {
            leds[row * 5 + col] = keys[row * 10 + 5 + col];
            leds[24 + row * 5 + col] = keys[row * 10 + 4 - col];
            col += 1;
        }
        row += 1;
    }
    let mut col = 0;
    while col < 4 {
        leds[20 + col] = keys[44 + col];
        leds[44 + col] = keys[40 + 3 - col];
        col += 1;
    }
    leds
}

const XX: bool = true;
const __: bool = false;

#[rustfmt::skip]
static QWERTY: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    __, __, __, XX,           XX, __, __, __,
]);

#[rustfmt::skip]
static LETTERS: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    __, XX, XX, XX, __,   __, XX, XX, XX, __,
    XX, XX, XX, XX, __,   __, XX, XX, XX, XX,
    __, __, __, __, __,   __, __, __, __, __,
    __, __, __, __,           __, __, __, __,
]);

#[rustfmt::skip]
static QWERTY_TURKISH: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    __, __, __, __, __,   __, XX, XX, XX, __,
    __, XX, __, __, XX,   __, __, __, __, __,
    __, __, XX, __, __,   __, __, __, __, __,
    __, __, __, __,           __, __, __, __,
]);

#[rustfmt::skip]
static COLEMAK_TURKISH: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    __, __, __, __, __,   __, __, XX, __, __,
    __, __, XX, __, XX,   __, __, __, XX, XX,
    __, __, XX, __, __,   __, __, __, __, __,
    __, __, __, __,           __, __, __, __,
]);

#[rustfmt::skip]
static NAVIGATION: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    __, __, XX, XX, __,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, __,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    __, __, __, __,           XX, __, __, __,
]);

#[rustfmt::skip]
static MOUSE: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, __,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, __,
    __, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    __, __, __, __,           XX, __, __, __,
]);

#[rustfmt::skip]
static MEDIA: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    XX, __, __, XX, XX,   XX, XX, XX, XX, __,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, __,
    __, __, __, XX, XX,   XX, XX, __, XX, __,
    __, __, __, __,           __, __, __, __,
]);

#[rustfmt::skip]
static NUMBERS: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    XX, XX, XX, XX, XX,   __, XX, XX, __, __,
    XX, XX, XX, XX, XX,   __, XX, XX, XX, XX,
    XX, XX, XX, XX, XX,   __, __, XX, XX, XX,
    __, __, __, XX,           __, __, __, __,
]);

#[rustfmt::skip]
static SYMBOLS: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, XX,   XX, XX, XX, XX, XX,
    __, __, __, XX,           __, __, __, __,
]);

#[rustfmt::skip]
static SYMBOL_NUMBERS: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    __, XX, XX, XX, __,   __, __, __, __, __,
    __, XX, XX, XX, __,   __, __, __, __, __,
    __, XX, XX, XX, __,   __, __, __, __, __,
    __, __, __, XX,           __, __, __, __,
]);

#[rustfmt::skip]
static FUNCTION: [bool; LED_COUNT] = pretty([
    __, __, __, __, __,   __, __, __, __, __,
    XX, XX, XX, XX, __,   __, XX, XX, XX, __,
    XX, XX, XX, XX, __,   XX, XX, XX, XX, XX,
    XX, XX, XX, XX, __,   __, XX, XX, XX, __,
    __, __, __, XX,           __, __, __, __,
]);

const fn hsv(hue: u8, sat: u8, val: u8) -> Hsv {
    Hsv { hue, sat, val }
}

/// The typing layers all share one color.
const BASE_COLOR: Hsv = hsv(8, 255, 255);
const SYMBOL_COLOR: Hsv = hsv(74, 255, 255);

/// Lit keys on the typing layers, with caps lock on.
const CAPS_COLOR: Hsv = hsv(0, 0, 255);
/// And while a case mode session is running.
const CASE_MODE_COLOR: Hsv = hsv(191, 255, 255);

fn layer_mask(layer: Layer) -> &'static [bool; LED_COUNT] {
    match layer {
        Layer::Qwerty | Layer::Colemak => &QWERTY,
        Layer::QwertyLetters | Layer::ColemakLetters => &LETTERS,
        Layer::QwertyTurkish => &QWERTY_TURKISH,
        Layer::ColemakTurkish => &COLEMAK_TURKISH,
        Layer::Navigation => &NAVIGATION,
        Layer::Mouse => &MOUSE,
        Layer::Media => &MEDIA,
        Layer::Numbers => &NUMBERS,
        Layer::Symbols => &SYMBOLS,
        Layer::SymbolNumbers => &SYMBOL_NUMBERS,
        Layer::Function => &FUNCTION,
    }
}

fn layer_color(layer: Layer) -> Hsv {
    match layer {
        Layer::Navigation => hsv(163, 218, 255),
        Layer::Mouse => hsv(122, 255, 255),
        Layer::Media => hsv(41, 255, 255),
        Layer::Numbers => hsv(0, 245, 255),
        Layer::Symbols | Layer::SymbolNumbers => SYMBOL_COLOR,
        Layer::Function => hsv(211, 218, 255),
        _ => BASE_COLOR,
    }
}

fn scale(color: RGB8, brightness: u8) -> RGB8 {
    let s = |c: u8| ((u16::from(c) * u16::from(brightness)) / 255) as u8;
    RGB8::new(s(color.r), s(color.g), s(color.b))
}

/// The colors for every LED, given the current state. `None` means layer
/// indication is off, and the LEDs belong to whatever else drives them.
pub fn indicator(
    layers: LayerState,
    caps: &CapsState,
    case_mode: Option<CaseMode>,
    settings: &IndicatorSettings,
) -> Option<[RGB8; LED_COUNT]> {
    if !settings.enabled {
        return None;
    }

    let layer = layers.highest();
    let color = if !layer.is_base() {
        layer_color(layer)
    } else if case_mode.is_some() {
        CASE_MODE_COLOR
    } else if caps.caps_lock() {
        CAPS_COLOR
    } else {
        layer_color(layer)
    };
    let lit = scale(hsv2rgb(color), settings.brightness);

    let mut leds = [OFF; LED_COUNT];
    for (led, on) in leds.iter_mut().zip(layer_mask(layer).iter()) {
        if *on {
            *led = lit;
        }
    }
    Some(leds)
}

/// Write the indication to the LED strip. With indication turned off, the
/// strip is left alone.
pub fn show<L: SmartLedsWrite<Color = RGB8>>(
    leds: &mut L,
    colors: Option<[RGB8; LED_COUNT]>,
) -> Result<(), L::Error> {
    match colors {
        Some(colors) => leds.write(colors.into_iter()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use core::convert::Infallible;

    use smart_leds::{SmartLedsWrite, RGB8};

    use super::{indicator, show, IndicatorSettings, LayerState, LED_COUNT, OFF};
    use crate::case_mode::CaseMode;
    use crate::caps::CapsState;
    use crate::keys::Layer;

    fn lit(leds: &[RGB8; LED_COUNT]) -> usize {
        leds.iter().filter(|c| **c != OFF).count()
    }

    #[test]
    fn highest() {
        assert_eq!(LayerState::default().highest(), Layer::Qwerty);
        let layers = LayerState::from_bits(0b1 | (1 << 3) | (1 << 9));
        assert_eq!(layers.highest(), Layer::Numbers);
        assert_eq!(layers.bits(), 0b10_0000_1001);
        // Unknown layers are dropped.
        assert_eq!(LayerState::from_bits(1 << 15).highest(), Layer::Qwerty);
    }

    #[test]
    fn masks() {
        let caps = CapsState::new(5000);
        let settings = IndicatorSettings::default();

        let leds = indicator(LayerState::default(), &caps, None, &settings).unwrap();
        // Three alpha rows, and one thumb-side key on each half.
        assert_eq!(lit(&leds), 32);
        // The right half comes first on the chain, starting at the top left.
        assert_eq!(leds[0], OFF);
        assert_ne!(leds[5], OFF);
        assert_ne!(leds[20], OFF);
        assert_eq!(leds[21], OFF);
        // The left half starts from the middle.
        assert_ne!(leds[44], OFF);
        assert_eq!(leds[47], OFF);

        let layers = LayerState::from_bits(1 << Layer::SymbolNumbers as u16);
        let leds = indicator(layers, &caps, None, &settings).unwrap();
        assert_eq!(lit(&leds), 10);
        // Only the left half.
        assert!(leds[..24].iter().all(|c| *c == OFF));
    }

    #[test]
    fn disabled() {
        let caps = CapsState::new(5000);
        let mut settings = IndicatorSettings::default();
        settings.toggle();
        assert_eq!(indicator(LayerState::default(), &caps, None, &settings), None);
    }

    #[test]
    fn brightness() {
        let caps = CapsState::new(5000);
        let mut settings = IndicatorSettings::default();
        let full = indicator(LayerState::default(), &caps, None, &settings).unwrap();

        settings.dimmer(128);
        let dim = indicator(LayerState::default(), &caps, None, &settings).unwrap();
        assert!(dim[5].r < full[5].r);

        settings.dimmer(255);
        assert_eq!(settings.brightness, 0);
        let dark = indicator(LayerState::default(), &caps, None, &settings).unwrap();
        assert_eq!(lit(&dark), 0);

        settings.brighter(200);
        settings.brighter(200);
        assert_eq!(settings.brightness, 255);
    }

    #[test]
    fn caps_and_case() {
        let mut caps = CapsState::new(5000);
        let settings = IndicatorSettings::default();
        let plain = indicator(LayerState::default(), &caps, None, &settings).unwrap();

        caps.toggle(0);
        let capital = indicator(LayerState::default(), &caps, None, &settings).unwrap();
        assert_eq!(capital[5], RGB8::new(255, 255, 255));

        let case = indicator(LayerState::default(), &caps, Some(CaseMode::Snake), &settings).unwrap();
        assert_ne!(case[5], capital[5]);
        assert_ne!(case[5], plain[5]);

        // Other layers keep their own color.
        let navi = LayerState::from_bits(1 << Layer::Navigation as u16);
        let with_caps = indicator(navi, &caps, None, &settings).unwrap();
        caps.toggle(0);
        let without = indicator(navi, &caps, None, &settings).unwrap();
        assert_eq!(with_caps, without);
    }

    struct Strip(Vec<RGB8>);

    impl SmartLedsWrite for Strip {
        type Error = Infallible;
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            self.0 = iterator.into_iter().map(|c| c.into()).collect();
            Ok(())
        }
    }

    #[test]
    fn strip() {
        let caps = CapsState::new(5000);
        let mut strip = Strip(Vec::new());
        let colors = indicator(LayerState::default(), &caps, None, &IndicatorSettings::default());
        show(&mut strip, colors).unwrap();
        assert_eq!(strip.0.len(), LED_COUNT);

        strip.0.clear();
        show(&mut strip, None).unwrap();
        assert!(strip.0.is_empty());
    }
}
