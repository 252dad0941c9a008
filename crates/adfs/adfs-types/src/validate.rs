//! Bounds checks shared by the write encoder, the write decoder and the read
//! codec.
//!
//! Every function returns the checked value on success so checks compose with
//! `?` at the call site:
//!
//! ```
//! use adfs_types::{FeedId, Stride, validate};
//! let stride = validate::check_stride(Stride(3)).unwrap();
//! assert!(validate::check_feed_id(FeedId(1 << 115)).is_err());
//! # let _ = stride;
//! ```

use crate::error::OutOfRange;
use crate::feed::{FeedId, MAX_FEED_ID, MAX_ROUND_INDEX, MAX_STRIDE, RoundIndex, Stride};
use crate::ring_row::{MAX_ROW_INDEX, RowIndex};

#[inline]
pub fn check_feed_id(feed_id: FeedId) -> Result<FeedId, OutOfRange> {
    if feed_id.0 > MAX_FEED_ID {
        return Err(OutOfRange::FeedId(feed_id.0));
    }
    Ok(feed_id)
}

#[inline]
pub fn check_stride(stride: Stride) -> Result<Stride, OutOfRange> {
    if stride.0 > MAX_STRIDE {
        return Err(OutOfRange::Stride(stride.0));
    }
    Ok(stride)
}

#[inline]
pub fn check_round_index(round: RoundIndex) -> Result<RoundIndex, OutOfRange> {
    if round.0 > MAX_ROUND_INDEX {
        return Err(OutOfRange::RoundIndex(round.0));
    }
    Ok(round)
}

#[inline]
pub fn check_row_index(row: RowIndex) -> Result<RowIndex, OutOfRange> {
    if row.0 > MAX_ROW_INDEX {
        return Err(OutOfRange::RowIndex(row.0));
    }
    Ok(row)
}

/// Checks that `len` bytes fit into one round of `stride` (`2^stride * 32`).
///
/// The stride itself is validated first.
pub fn check_payload_len(len: usize, stride: Stride) -> Result<usize, OutOfRange> {
    let stride = check_stride(stride)?;
    let max = stride.max_payload_len();
    if len as u64 > max {
        return Err(OutOfRange::PayloadTooLarge {
            len,
            stride: stride.0,
            max,
        });
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        assert!(check_feed_id(FeedId(MAX_FEED_ID)).is_ok());
        assert_eq!(
            check_feed_id(FeedId(MAX_FEED_ID + 1)),
            Err(OutOfRange::FeedId(1 << 115))
        );

        assert!(check_stride(Stride(31)).is_ok());
        assert_eq!(check_stride(Stride(32)), Err(OutOfRange::Stride(32)));

        assert!(check_round_index(RoundIndex(8191)).is_ok());
        assert_eq!(
            check_round_index(RoundIndex(8192)),
            Err(OutOfRange::RoundIndex(8192))
        );

        assert!(check_row_index(RowIndex(MAX_ROW_INDEX)).is_ok());
        assert!(matches!(
            check_row_index(RowIndex(MAX_ROW_INDEX + 1)),
            Err(OutOfRange::RowIndex(_))
        ));
    }

    #[test]
    fn payload_len_scales_with_stride() {
        assert!(check_payload_len(32, Stride(0)).is_ok());
        assert_eq!(
            check_payload_len(33, Stride(0)),
            Err(OutOfRange::PayloadTooLarge {
                len: 33,
                stride: 0,
                max: 32
            })
        );
        assert!(check_payload_len(128, Stride(2)).is_ok());
        assert!(check_payload_len(129, Stride(2)).is_err());
        assert!(check_payload_len(0, Stride(0)).is_ok());
    }

    #[test]
    fn payload_check_rejects_bad_stride_first() {
        assert_eq!(check_payload_len(1, Stride(40)), Err(OutOfRange::Stride(40)));
    }
}
