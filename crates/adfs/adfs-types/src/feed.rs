use serde::{Deserialize, Serialize};

/// Largest feed id the store can address: `2^115 - 1`.
pub const MAX_FEED_ID: u128 = (1 << 115) - 1;

/// Largest stride. A round of a stride-31 feed spans `2^31` slots.
pub const MAX_STRIDE: u8 = 31;

/// Number of bits reserved for the round index inside a slot address.
pub const ROUND_BITS: u32 = 13;

/// Rounds kept per feed before the circular buffer wraps (8192).
pub const MAX_HISTORY: u64 = 1 << ROUND_BITS;

pub const MAX_ROUND_INDEX: u16 = (1 << ROUND_BITS) - 1;

/// Size of one addressable slot of the store, in bytes.
pub const SLOT_BYTES: usize = 32;

// FeedId is assigned outside of this workspace and never changes once a feed exists
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FeedId(pub u128);

// log2 of the number of 32-byte slots a single round of the feed occupies
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Stride(pub u8);

// position inside the feed's circular history, 0..=8191
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RoundIndex(pub u16);

impl Stride {
    /// Number of 32-byte slots one round occupies.
    ///
    /// Only meaningful for validated strides (`<= 31`); saturates at
    /// `u64::MAX` beyond 63.
    #[inline]
    pub fn slots(self) -> u64 {
        1u64.checked_shl(self.0 as u32).unwrap_or(u64::MAX)
    }

    /// Largest payload, in bytes, one round of this stride can hold.
    #[inline]
    pub fn max_payload_len(self) -> u64 {
        self.slots().saturating_mul(SLOT_BYTES as u64)
    }
}

impl RoundIndex {
    /// Maps a monotonically increasing per-feed update counter onto the
    /// circular buffer. The result is always in range.
    #[inline]
    pub fn from_counter(counter: u64) -> Self {
        RoundIndex((counter % MAX_HISTORY) as u16)
    }
}

impl From<u128> for FeedId {
    fn from(value: u128) -> Self {
        FeedId(value)
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for Stride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for RoundIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A feed's identity together with the stride that shapes its address space.
///
/// Changing the stride of an existing feed moves every one of its rounds, so
/// the pair is what the store actually keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedKey {
    pub feed_id: FeedId,
    pub stride: Stride,
}

impl FeedKey {
    pub fn new(feed_id: impl Into<FeedId>, stride: u8) -> Self {
        Self {
            feed_id: feed_id.into(),
            stride: Stride(stride),
        }
    }
}

/// Layout of the header that precedes the feed entries of a write.
///
/// The store contract decides which one it expects; calldata does not carry
/// a marker, so the reader of a write has to be told.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// `blockNumber(8)`
    #[default]
    BlockNumber,
    /// `sourceAccumulator(32) ++ destinationAccumulator(32)`
    Accumulator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_slot_math() {
        assert_eq!(Stride(0).slots(), 1);
        assert_eq!(Stride(0).max_payload_len(), 32);
        assert_eq!(Stride(2).max_payload_len(), 128);
        assert_eq!(Stride(31).slots(), 1 << 31);
    }

    #[test]
    fn unvalidated_strides_saturate() {
        assert_eq!(Stride(63).slots(), 1 << 63);
        assert_eq!(Stride(63).max_payload_len(), u64::MAX);
        assert_eq!(Stride(64).slots(), u64::MAX);
        assert_eq!(Stride(255).max_payload_len(), u64::MAX);
    }

    #[test]
    fn counters_wrap_around_history() {
        assert_eq!(RoundIndex::from_counter(0), RoundIndex(0));
        assert_eq!(RoundIndex::from_counter(8191), RoundIndex(8191));
        assert_eq!(RoundIndex::from_counter(8192), RoundIndex(0));
        assert_eq!(RoundIndex::from_counter(8192 * 3 + 7), RoundIndex(7));
    }

    #[test]
    fn domain_constants() {
        assert_eq!(MAX_FEED_ID, 2u128.pow(115) - 1);
        assert_eq!(MAX_ROUND_INDEX, 8191);
        assert_eq!(MAX_HISTORY, 8192);
    }
}
