use adfs_types::{OutOfRange, U256};

/// Failure to build calldata. All of these are caller input errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),

    #[error("batch of {0} feeds does not fit the 4-byte feed count")]
    TooManyFeeds(usize),
}

/// Failure to parse a buffer at all.
///
/// Inconsistencies that still leave a usable result are reported as
/// [`crate::DecodeIssue`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("input truncated at offset {offset}: needed {needed} bytes, {remaining} left")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("length prefix at offset {offset} declares {len} bytes, more than a 32-byte word")]
    LengthPrefixTooWide { offset: usize, len: usize },

    #[error("response of {len} bytes is not a whole number of 32-byte slots")]
    MisalignedResponse { len: usize },

    #[error("round index word 0x{0:x} is not a valid round")]
    InvalidRoundWord(U256),

    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
}
