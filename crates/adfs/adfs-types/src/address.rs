//! Address model of the feed store.
//!
//! A round of a feed lives at a linear slot address derived from the feed id,
//! the round index and the stride:
//!
//! ```text
//! slot_address = (feed_id * 2^13 + round) * 2^stride
//!
//!   bit  stride+13+115 ........ stride+13 ..... stride ...... 0
//!        │       feed_id (115b)      │ round (13b) │ 0 (stride b)│
//! ```
//!
//! The latest round of each feed is tracked in the ring buffer table, where
//! sixteen feeds of the same stride share a row:
//!
//! ```text
//! row      = (2^115 * stride + feed_id) / 16
//! position = feed_id % 16
//! ```
//!
//! Write calldata only carries `slot_address`, so the decoder walks these
//! formulas backwards through the rows to recover `(feed_id, round)`.

use std::ops::Range;

use ruint::aliases::U256;

use crate::error::OutOfRange;
use crate::feed::{FeedId, MAX_FEED_ID, MAX_ROUND_INDEX, ROUND_BITS, RoundIndex, Stride};
use crate::ring_row::{FEEDS_PER_ROW, RowIndex};
use crate::validate::{check_feed_id, check_round_index, check_row_index, check_stride};

/// Linear address of the first slot of a round. Needs up to 159 bits.
pub type SlotAddress = U256;

/// Bit position of the stride inside a row index (`2^115 / 16 = 2^111`).
const ROW_STRIDE_SHIFT: u32 = 115 - 4;

/// `(feed_id * 2^13 + round) * 2^stride`
pub fn slot_address(
    feed_id: FeedId,
    round: RoundIndex,
    stride: Stride,
) -> Result<SlotAddress, OutOfRange> {
    let feed_id = check_feed_id(feed_id)?;
    let round = check_round_index(round)?;
    let stride = check_stride(stride)?;

    let rounds = (U256::from(feed_id.0) << ROUND_BITS as usize) | U256::from(round.0);
    Ok(rounds << stride.0 as usize)
}

/// Row of the ring buffer table holding the latest round of `feed_id`.
pub fn ring_buffer_row(feed_id: FeedId, stride: Stride) -> Result<RowIndex, OutOfRange> {
    let feed_id = check_feed_id(feed_id)?;
    let stride = check_stride(stride)?;

    // 31 * 2^115 + (2^115 - 1) < 2^120, no overflow
    let linear = ((stride.0 as u128) << 115) + feed_id.0;
    Ok(RowIndex(linear / FEEDS_PER_ROW))
}

/// Cell of the row (`0..16`) that holds the round of `feed_id`.
#[inline]
pub fn ring_buffer_cell_position(feed_id: FeedId) -> usize {
    (feed_id.0 % FEEDS_PER_ROW) as usize
}

/// Stride whose feeds are stored in `row`.
pub fn row_stride(row: RowIndex) -> Result<Stride, OutOfRange> {
    let row = check_row_index(row)?;
    // row < 2^116 so the shift leaves at most 5 bits
    Ok(Stride((row.0 >> ROW_STRIDE_SHIFT) as u8))
}

/// Smallest feed id of `stride` that maps to `row`.
///
/// Fails when `row` does not belong to `stride`.
pub fn unpack_row(row: RowIndex, stride: Stride) -> Result<FeedId, OutOfRange> {
    let row = check_row_index(row)?;
    let stride = check_stride(stride)?;

    let base = (row.0 * FEEDS_PER_ROW)
        .checked_sub((stride.0 as u128) << 115)
        .filter(|base| *base <= MAX_FEED_ID)
        .ok_or(OutOfRange::RowIndex(row.0))?;
    Ok(FeedId(base))
}

/// Stride and the sixteen candidate feeds of a row, in cell order.
pub fn row_feed_ids(row: RowIndex) -> Result<(Stride, [FeedId; FEEDS_PER_ROW as usize]), OutOfRange> {
    let stride = row_stride(row)?;
    let base = unpack_row(row, stride)?;
    Ok((
        stride,
        std::array::from_fn(|position| FeedId(base.0 + position as u128)),
    ))
}

/// Feed ids sharing a ring buffer row with `feed_id`.
pub fn neighbour_feed_ids(feed_id: FeedId) -> Range<u128> {
    let begin = feed_id.0 - feed_id.0 % FEEDS_PER_ROW;
    begin..begin.saturating_add(FEEDS_PER_ROW)
}

/// Arithmetic inverse of [`slot_address`].
///
/// Returns `None` when `address` is not aligned to `2^stride`, the stride is
/// out of range or the implied feed id is beyond `2^115 - 1`.
pub fn split_slot_address(address: &SlotAddress, stride: Stride) -> Option<(FeedId, RoundIndex)> {
    let stride = check_stride(stride).ok()?;
    let shift = stride.0 as usize;

    let rounds = *address >> shift;
    if rounds << shift != *address {
        return None;
    }

    let round = (rounds.as_limbs()[0] & MAX_ROUND_INDEX as u64) as u16;
    let feed_id = u128::try_from(rounds >> ROUND_BITS as usize).ok()?;
    let feed_id = check_feed_id(FeedId(feed_id)).ok()?;
    Some((feed_id, RoundIndex(round)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MAX_STRIDE;
    use crate::ring_row::MAX_ROW_INDEX;

    #[test]
    fn slot_address_follows_formula() {
        // (5 * 8192 + 2) * 1
        assert_eq!(
            slot_address(FeedId(5), RoundIndex(2), Stride(0)).unwrap(),
            U256::from(40962u32)
        );
        // (1 * 8192 + 6) * 2
        assert_eq!(
            slot_address(FeedId(1), RoundIndex(6), Stride(1)).unwrap(),
            U256::from(0x400cu32)
        );
        assert_eq!(
            slot_address(FeedId(0), RoundIndex(0), Stride(0)).unwrap(),
            U256::ZERO
        );
    }

    #[test]
    fn slot_address_at_domain_edges() {
        let top = slot_address(FeedId(MAX_FEED_ID), RoundIndex(MAX_ROUND_INDEX), Stride(MAX_STRIDE))
            .unwrap();
        // every bit of feed and round set, shifted by 31
        assert_eq!(top.bit_len(), 115 + 13 + 31);

        assert_eq!(
            slot_address(FeedId(MAX_FEED_ID + 1), RoundIndex(0), Stride(0)),
            Err(OutOfRange::FeedId(1 << 115))
        );
        assert_eq!(
            slot_address(FeedId(0), RoundIndex(8192), Stride(0)),
            Err(OutOfRange::RoundIndex(8192))
        );
        assert_eq!(
            slot_address(FeedId(0), RoundIndex(0), Stride(32)),
            Err(OutOfRange::Stride(32))
        );
    }

    #[test]
    fn rows_group_sixteen_feeds_per_stride() {
        assert_eq!(ring_buffer_row(FeedId(0), Stride(0)).unwrap(), RowIndex(0));
        assert_eq!(ring_buffer_row(FeedId(15), Stride(0)).unwrap(), RowIndex(0));
        assert_eq!(ring_buffer_row(FeedId(16), Stride(0)).unwrap(), RowIndex(1));
        assert_eq!(ring_buffer_row(FeedId(1), Stride(1)).unwrap(), RowIndex(1 << 111));

        let top = ring_buffer_row(FeedId(MAX_FEED_ID), Stride(MAX_STRIDE)).unwrap();
        assert_eq!(top, RowIndex(MAX_ROW_INDEX));
    }

    #[test]
    fn unpack_row_inverts_ring_buffer_row() {
        for (feed, stride) in [(0u128, 0u8), (37, 0), (1, 1), (MAX_FEED_ID, 31), (1_000_003, 7)] {
            let row = ring_buffer_row(FeedId(feed), Stride(stride)).unwrap();
            assert_eq!(row_stride(row).unwrap(), Stride(stride));

            let base = unpack_row(row, Stride(stride)).unwrap();
            assert_eq!(base.0, feed - feed % 16);
            assert_eq!(base.0 + ring_buffer_cell_position(FeedId(feed)) as u128, feed);
        }
    }

    #[test]
    fn unpack_row_rejects_foreign_stride() {
        let row = ring_buffer_row(FeedId(3), Stride(2)).unwrap();
        assert!(unpack_row(row, Stride(3)).is_err());
        assert!(unpack_row(row, Stride(1)).is_err());
    }

    #[test]
    fn row_feed_ids_enumerates_cells() {
        let row = ring_buffer_row(FeedId(35), Stride(4)).unwrap();
        let (stride, feeds) = row_feed_ids(row).unwrap();
        assert_eq!(stride, Stride(4));
        assert_eq!(feeds[0], FeedId(32));
        assert_eq!(feeds[15], FeedId(47));
    }

    #[test]
    fn neighbours_share_the_row() {
        assert_eq!(neighbour_feed_ids(FeedId(5)), 0..16);
        assert_eq!(neighbour_feed_ids(FeedId(16)), 16..32);
        assert_eq!(neighbour_feed_ids(FeedId(47)), 32..48);
    }

    #[test]
    fn split_slot_address_inverts_slot_address() {
        let address = slot_address(FeedId(123_456), RoundIndex(8000), Stride(5)).unwrap();
        assert_eq!(
            split_slot_address(&address, Stride(5)),
            Some((FeedId(123_456), RoundIndex(8000)))
        );
        // not aligned to 2^5
        assert_eq!(split_slot_address(&(address + U256::from(1u8)), Stride(5)), None);
        assert_eq!(split_slot_address(&address, Stride(32)), None);
    }
}
