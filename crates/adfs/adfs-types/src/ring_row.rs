//! Ring buffer table rows.
//!
//! The ring buffer table records the latest round of every feed. Sixteen
//! feeds of the same stride share one 32-byte row:
//!
//! ```text
//! row value (32 bytes)
//! ┌──────┬──────┬──────┬─────┬───────┐
//! │ c0   │ c1   │ c2   │ ... │ c15   │   cN = round of feed (base + N), u16 BE
//! │ (2B) │ (2B) │ (2B) │     │ (2B)  │
//! └──────┴──────┴──────┴─────┴───────┘
//! ```

use serde::{Deserialize, Serialize};

/// Feeds sharing one row of the ring buffer table.
pub const FEEDS_PER_ROW: u128 = 16;

/// Size of a row value in bytes.
pub const ROW_VALUE_BYTES: usize = 32;

/// Largest row index: `2^116 - 1`.
pub const MAX_ROW_INDEX: u128 = (1 << 116) - 1;

const CELL_BYTES: usize = 2;

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RowIndex(pub u128);

impl std::fmt::Display for RowIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One 32-byte row value, sixteen big-endian `u16` cells.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RowValue(pub [u8; ROW_VALUE_BYTES]);

impl RowValue {
    pub const ZERO: RowValue = RowValue([0u8; ROW_VALUE_BYTES]);

    /// Reads the cell at `position` (`0..16`).
    ///
    /// # Panics
    /// Panics if `position >= 16`.
    #[inline]
    pub fn cell(&self, position: usize) -> u16 {
        let at = position * CELL_BYTES;
        u16::from_be_bytes([self.0[at], self.0[at + 1]])
    }

    /// Overwrites the cell at `position` (`0..16`), leaving the other
    /// fifteen untouched.
    ///
    /// # Panics
    /// Panics if `position >= 16`.
    #[inline]
    pub fn set_cell(&mut self, position: usize, value: u16) {
        let at = position * CELL_BYTES;
        self.0[at..at + CELL_BYTES].copy_from_slice(&value.to_be_bytes());
    }

    pub fn cells(&self) -> [u16; FEEDS_PER_ROW as usize] {
        std::array::from_fn(|position| self.cell(position))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ROW_VALUE_BYTES] {
        &self.0
    }
}

impl From<[u8; ROW_VALUE_BYTES]> for RowValue {
    fn from(bytes: [u8; ROW_VALUE_BYTES]) -> Self {
        RowValue(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_touches_only_its_two_bytes() {
        let mut row = RowValue::ZERO;
        row.set_cell(2, 0x0005);
        row.set_cell(15, 0x1fff);

        assert_eq!(&row.0[4..6], &[0x00, 0x05]);
        assert_eq!(&row.0[30..32], &[0x1f, 0xff]);
        assert_eq!(row.0.iter().filter(|b| **b != 0).count(), 3);

        assert_eq!(row.cell(2), 5);
        assert_eq!(row.cell(15), 8191);
        assert_eq!(row.cell(0), 0);
    }

    #[test]
    fn cells_are_big_endian() {
        let mut bytes = [0u8; ROW_VALUE_BYTES];
        bytes[0] = 0x12;
        bytes[1] = 0x34;
        let row = RowValue::from(bytes);
        assert_eq!(row.cells()[0], 0x1234);
        assert!(row.cells()[1..].iter().all(|c| *c == 0));
    }
}
