#![forbid(unsafe_code)]

pub mod address;
pub mod error;
pub mod feed;
pub mod ring_row;
pub mod validate;

pub use address::{
    SlotAddress, neighbour_feed_ids, ring_buffer_cell_position, ring_buffer_row, row_feed_ids,
    row_stride, slot_address, split_slot_address, unpack_row,
};
pub use error::OutOfRange;
pub use feed::{
    FeedId, FeedKey, HeaderMode, MAX_FEED_ID, MAX_HISTORY, MAX_ROUND_INDEX, MAX_STRIDE, ROUND_BITS,
    RoundIndex, SLOT_BYTES, Stride,
};
pub use ring_row::{FEEDS_PER_ROW, MAX_ROW_INDEX, ROW_VALUE_BYTES, RowIndex, RowValue};

// the EVM word type is part of the public surface through SlotAddress
pub use ruint::aliases::U256;
