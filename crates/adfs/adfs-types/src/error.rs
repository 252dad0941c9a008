/// A field value outside the domain the store can address.
///
/// Every check in [`crate::validate`] fails with its own variant so callers can
/// tell which input needs fixing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutOfRange {
    #[error("feed id {0} exceeds 2^115 - 1")]
    FeedId(u128),

    #[error("stride {0} exceeds 31")]
    Stride(u8),

    #[error("round index {0} exceeds 8191")]
    RoundIndex(u16),

    #[error("ring buffer row {0} exceeds 2^116 - 1")]
    RowIndex(u128),

    #[error("payload of {len} bytes does not fit stride {stride} (max {max} bytes)")]
    PayloadTooLarge { len: usize, stride: u8, max: u64 },
}
