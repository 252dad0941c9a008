//! Raw read queries and their responses.
//!
//! Reads bypass ABI encoding entirely. A query is a selector byte followed
//! by a 128-bit id that folds the stride into its top byte:
//!
//! ```text
//! opcode(1) ++ packedId(16) [++ round(2)] [++ startSlot(4) ++ slotCount(4)]
//!
//! packedId = stride << 120 | feed_id
//! ```
//!
//! Responses are raw bytes, one 32-byte word per slot. Queries returning the
//! round ("AndIndex") prepend it as a 32-byte big-endian word.

use adfs_types::{
    FeedId, FeedKey, RoundIndex, SLOT_BYTES, Stride, U256,
    validate::{check_feed_id, check_round_index, check_stride},
};

use crate::error::{DecodeError, EncodeError};
use crate::wire::ByteReader;

pub const GET_LATEST_INDEX: u8 = 0x81;
pub const GET_LATEST_SINGLE_DATA: u8 = 0x82;
pub const GET_LATEST_SINGLE_DATA_AND_INDEX: u8 = 0x83;
pub const GET_LATEST_DATA: u8 = 0x84;
pub const GET_LATEST_DATA_AND_INDEX: u8 = 0x85;
pub const GET_DATA_AT_INDEX: u8 = 0x86;

const STRIDE_SHIFT: u32 = 120;
const ID_MASK: u128 = (1 << STRIDE_SHIFT) - 1;

/// Window of slots to read from a multi-slot round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSlice {
    pub start_slot: u32,
    /// `0` reads to the end of the round.
    pub slot_count: u32,
}

impl SlotSlice {
    pub fn new(start_slot: u32, slot_count: u32) -> Self {
        Self {
            start_slot,
            slot_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadQuery {
    LatestIndex(FeedKey),
    LatestSingleData(FeedKey),
    LatestSingleDataAndIndex(FeedKey),
    LatestData {
        feed: FeedKey,
        slice: Option<SlotSlice>,
    },
    LatestDataAndIndex {
        feed: FeedKey,
        slice: Option<SlotSlice>,
    },
    DataAtIndex {
        feed: FeedKey,
        round: RoundIndex,
        slice: Option<SlotSlice>,
    },
}

impl ReadQuery {
    pub fn opcode(&self) -> u8 {
        match self {
            ReadQuery::LatestIndex(_) => GET_LATEST_INDEX,
            ReadQuery::LatestSingleData(_) => GET_LATEST_SINGLE_DATA,
            ReadQuery::LatestSingleDataAndIndex(_) => GET_LATEST_SINGLE_DATA_AND_INDEX,
            ReadQuery::LatestData { .. } => GET_LATEST_DATA,
            ReadQuery::LatestDataAndIndex { .. } => GET_LATEST_DATA_AND_INDEX,
            ReadQuery::DataAtIndex { .. } => GET_DATA_AT_INDEX,
        }
    }

    pub fn feed(&self) -> FeedKey {
        match *self {
            ReadQuery::LatestIndex(feed)
            | ReadQuery::LatestSingleData(feed)
            | ReadQuery::LatestSingleDataAndIndex(feed)
            | ReadQuery::LatestData { feed, .. }
            | ReadQuery::LatestDataAndIndex { feed, .. }
            | ReadQuery::DataAtIndex { feed, .. } => feed,
        }
    }

    pub fn slice(&self) -> Option<SlotSlice> {
        match *self {
            ReadQuery::LatestData { slice, .. }
            | ReadQuery::LatestDataAndIndex { slice, .. }
            | ReadQuery::DataAtIndex { slice, .. } => slice,
            _ => None,
        }
    }

    fn returns_index(&self) -> bool {
        matches!(
            self,
            ReadQuery::LatestIndex(_)
                | ReadQuery::LatestSingleDataAndIndex(_)
                | ReadQuery::LatestDataAndIndex { .. }
        )
    }
}

/// Decoded response of a read query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResponse {
    Index(RoundIndex),
    Data(Vec<Vec<u8>>),
    IndexAndData { index: RoundIndex, data: Vec<Vec<u8>> },
}

/// Folds the stride into the top byte of the 128-bit id.
pub fn packed_feed_id(feed: FeedKey) -> Result<u128, EncodeError> {
    let feed_id = check_feed_id(feed.feed_id)?;
    let stride = check_stride(feed.stride)?;
    Ok(((stride.0 as u128) << STRIDE_SHIFT) | feed_id.0)
}

/// Inverse of [`packed_feed_id`].
pub fn unpack_feed_id(packed: u128) -> Result<FeedKey, DecodeError> {
    let stride = check_stride(Stride((packed >> STRIDE_SHIFT) as u8))?;
    let feed_id = check_feed_id(FeedId(packed & ID_MASK))?;
    Ok(FeedKey { feed_id, stride })
}

pub fn encode_read(query: &ReadQuery) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(1 + 16 + 2 + 8);
    out.push(query.opcode());
    out.extend_from_slice(&packed_feed_id(query.feed())?.to_be_bytes());

    if let ReadQuery::DataAtIndex { round, .. } = query {
        out.extend_from_slice(&check_round_index(*round)?.0.to_be_bytes());
    }
    if let Some(slice) = query.slice() {
        out.extend_from_slice(&slice.start_slot.to_be_bytes());
        out.extend_from_slice(&slice.slot_count.to_be_bytes());
    }
    Ok(out)
}

/// Splits raw response bytes into consecutive 32-byte slots.
///
/// A trailing partial chunk is returned as-is.
pub fn split_into_slots(bytes: &[u8]) -> Vec<&[u8]> {
    bytes.chunks(SLOT_BYTES).collect()
}

/// Left pads `payload` with zeros to a whole number of slots, the form in
/// which a stored value comes back from `LatestData`.
pub fn pad_to_slots(payload: &[u8]) -> Vec<u8> {
    let slots = payload.len().div_ceil(SLOT_BYTES).max(1);
    let mut out = vec![0u8; slots * SLOT_BYTES - payload.len()];
    out.extend_from_slice(payload);
    out
}

/// Response length a well-behaved store returns for `query`, when it can
/// be known from the query alone.
pub fn expected_response_len(query: &ReadQuery) -> Option<usize> {
    let index_word = if query.returns_index() { SLOT_BYTES } else { 0 };
    let data = match query {
        ReadQuery::LatestIndex(_) => 0,
        ReadQuery::LatestSingleData(_) | ReadQuery::LatestSingleDataAndIndex(_) => SLOT_BYTES,
        _ => match query.slice() {
            Some(slice) if slice.slot_count == 0 => return None,
            Some(slice) => slice.slot_count as usize * SLOT_BYTES,
            None => {
                let stride = check_stride(query.feed().stride).ok()?;
                usize::try_from(stride.slots()).ok()? * SLOT_BYTES
            }
        },
    };
    Some(index_word + data)
}

/// Interprets the raw bytes returned for `query`.
///
/// Single-word queries must return exactly their fixed length. Multi-slot
/// data must be slot aligned unless the query asked for an explicit slice,
/// in which case a final partial slot is kept.
pub fn decode_read_response(query: &ReadQuery, bytes: &[u8]) -> Result<ReadResponse, DecodeError> {
    let mut reader = ByteReader::new(bytes);

    let response = match query {
        ReadQuery::LatestIndex(_) => ReadResponse::Index(read_round_word(&mut reader)?),
        ReadQuery::LatestSingleData(_) => {
            ReadResponse::Data(vec![reader.read_bytes(SLOT_BYTES)?.to_vec()])
        }
        ReadQuery::LatestSingleDataAndIndex(_) => ReadResponse::IndexAndData {
            index: read_round_word(&mut reader)?,
            data: vec![reader.read_bytes(SLOT_BYTES)?.to_vec()],
        },
        ReadQuery::LatestData { slice, .. } | ReadQuery::DataAtIndex { slice, .. } => {
            return Ok(ReadResponse::Data(split_data(bytes, slice.is_some())?));
        }
        ReadQuery::LatestDataAndIndex { slice, .. } => {
            let index = read_round_word(&mut reader)?;
            return Ok(ReadResponse::IndexAndData {
                index,
                data: split_data(&bytes[reader.offset()..], slice.is_some())?,
            });
        }
    };

    // single-word responses have a fixed length
    if !reader.is_empty() {
        return Err(DecodeError::MisalignedResponse { len: bytes.len() });
    }
    Ok(response)
}

fn read_round_word(reader: &mut ByteReader<'_>) -> Result<RoundIndex, DecodeError> {
    let word = U256::from_be_bytes(reader.read_array::<SLOT_BYTES>()?);
    let round = u16::try_from(word).map_err(|_| DecodeError::InvalidRoundWord(word))?;
    check_round_index(RoundIndex(round)).map_err(|_| DecodeError::InvalidRoundWord(word))
}

fn split_data(bytes: &[u8], sliced: bool) -> Result<Vec<Vec<u8>>, DecodeError> {
    if !sliced && bytes.len() % SLOT_BYTES != 0 {
        return Err(DecodeError::MisalignedResponse { len: bytes.len() });
    }
    Ok(split_into_slots(bytes)
        .into_iter()
        .map(<[u8]>::to_vec)
        .collect())
}
