//! Key events
//!
//! The ErgoDox matrix is wired transposed compared to how the board looks:
//! the matrix `row` walks across the keyboard, 0-6 on the left half and 7-13
//! on the right half, and the matrix `col` walks down it, from the number
//! row (0) to the bottom row (4), with the thumb cluster at 5.

use crate::keys::Keycode;
use crate::Side;

/// Number of matrix rows. Half of them belong to each side.
pub const MATRIX_ROWS: u8 = 14;

/// Columns at or below this one are reached with the thumbs.
pub const THUMB_COL: u8 = 4;

/// The column holding the thumb cluster proper.
pub const THUMB_CLUSTER_COL: u8 = 5;

/// A physical key position in the matrix.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

/// The finger that normally presses a key.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Finger {
    Pinky,
    Ring,
    Middle,
    Index,
    Thumb,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Position {
        Position { row, col }
    }

    pub fn side(&self) -> Side {
        if self.row < MATRIX_ROWS / 2 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Which finger this key belongs to. The outer column and the pinky
    /// column both go to the pinky, the two inner columns to the index.
    pub fn finger(&self) -> Finger {
        if self.col >= THUMB_CLUSTER_COL {
            return Finger::Thumb;
        }
        // Distance from the outer edge of the board.
        let across = match self.side() {
            Side::Left => self.row,
            Side::Right => MATRIX_ROWS - 1 - self.row,
        };
        match across {
            0 | 1 => Finger::Pinky,
            2 => Finger::Ring,
            3 => Finger::Middle,
            _ => Finger::Index,
        }
    }

    /// Are the two keys on different halves of the keyboard?
    pub fn opposite_hands(&self, other: &Position) -> bool {
        self.side() != other.side()
    }
}

/// A single key going up or down.
///
/// For dual-role keys, `tap_count` is filled in by the firmware's timing
/// engine: 0 means the key has been resolved as held, anything else means it
/// was tapped, and how many times in a row. Other keys always carry 0.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub keycode: Keycode,
    pub pressed: bool,
    pub position: Position,
    /// Milliseconds, from a free running, wrapping counter.
    pub time: u32,
    pub tap_count: u8,
    /// Another key was pressed while this one was held.
    pub interrupted: bool,
}

impl KeyEvent {
    pub fn press(keycode: Keycode, position: Position, time: u32) -> KeyEvent {
        KeyEvent {
            keycode,
            pressed: true,
            position,
            time,
            tap_count: 0,
            interrupted: false,
        }
    }

    pub fn release(keycode: Keycode, position: Position, time: u32) -> KeyEvent {
        KeyEvent {
            pressed: false,
            ..KeyEvent::press(keycode, position, time)
        }
    }

    /// The same event, marked as the given tap of a dual-role key.
    pub fn tapped(self, count: u8) -> KeyEvent {
        KeyEvent {
            tap_count: count,
            ..self
        }
    }

    pub fn is_press(&self) -> bool {
        self.pressed
    }

    pub fn is_release(&self) -> bool {
        !self.pressed
    }

    /// The keycode this event acts as. A tapped dual-role key acts as its tap
    /// key, everything else (including a held dual-role key) as itself.
    pub fn effective_keycode(&self) -> Keycode {
        match self.keycode.tap_key() {
            Some(tap) if self.tap_count != 0 => tap,
            _ => self.keycode,
        }
    }

    /// Is this a dual-role key resolved as held?
    pub fn is_hold(&self) -> bool {
        self.keycode.is_dual_role() && self.tap_count == 0
    }
}
