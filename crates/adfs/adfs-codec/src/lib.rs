//! Calldata codec for the Aggregated Data Feed Store.
//!
//! Writes go through [`encode_write`] / [`decode_write`], reads through
//! [`encode_read`] / [`decode_read_response`]. Address arithmetic and bounds
//! live in `adfs_types`.

#![forbid(unsafe_code)]

mod codec;
mod decode;
mod error;
mod read;
mod table;
mod wire;
mod write;

pub use codec::{FeedStoreCodec, RawCodec};
pub use decode::{DecodeIssue, DecodedWrite, FeedEntry, RingBufferRecord, decode_write};
pub use error::{DecodeError, EncodeError};
pub use read::{
    GET_DATA_AT_INDEX, GET_LATEST_DATA, GET_LATEST_DATA_AND_INDEX, GET_LATEST_INDEX,
    GET_LATEST_SINGLE_DATA, GET_LATEST_SINGLE_DATA_AND_INDEX, ReadQuery, ReadResponse, SlotSlice,
    decode_read_response, encode_read, expected_response_len, packed_feed_id, pad_to_slots,
    split_into_slots, unpack_feed_id,
};
pub use table::RingBufferTable;
pub use wire::{ByteReader, MAX_PREFIXED_LEN, read_length_prefixed, write_length_prefixed};
pub use write::{
    ACCUMULATOR_BYTES, FeedUpdate, WRITE_OPCODE, WriteBatch, WriteHeader, encode_write,
};
