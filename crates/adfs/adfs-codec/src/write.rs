//! Write calldata encoder.
//!
//! # Layout
//!
//! ```text
//! opcode                 1 byte (0x00)
//! header                 blockNumber(8)  |  sourceAccumulator(32) ++ destinationAccumulator(32)
//! feedCount              4 bytes, big-endian
//! feedCount x entry:
//!   stride               1 byte
//!   address              length-prefixed, slot_address(feed_id, round, stride)
//!   byteCount            length-prefixed, payload length
//!   payload              byteCount bytes
//! rows until the end, ascending row index:
//!   rowIndex             length-prefixed
//!   rowValue             32 bytes
//! ```
//!
//! Entries never carry the feed id or the round explicitly. The rows are
//! what lets a reader of the calldata (the store contract, or
//! [`crate::decode_write`]) put names back on the addresses.

use std::collections::{BTreeMap, HashSet};

use adfs_types::{
    FeedId, FeedKey, HeaderMode, RoundIndex, RowIndex, RowValue, Stride, U256,
    ring_buffer_cell_position, ring_buffer_row, slot_address, validate::check_payload_len,
};
use tracing::{debug, warn};

use crate::error::EncodeError;
use crate::table::RingBufferTable;
use crate::wire::write_length_prefixed;

/// Selector of the write entry point.
pub const WRITE_OPCODE: u8 = 0x00;

pub const ACCUMULATOR_BYTES: usize = 32;

/// Header preceding the feed entries. Which variant the store expects is a
/// property of the deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteHeader {
    BlockNumber(u64),
    Accumulator {
        source: [u8; ACCUMULATOR_BYTES],
        destination: [u8; ACCUMULATOR_BYTES],
    },
}

impl WriteHeader {
    pub fn mode(&self) -> HeaderMode {
        match self {
            WriteHeader::BlockNumber(_) => HeaderMode::BlockNumber,
            WriteHeader::Accumulator { .. } => HeaderMode::Accumulator,
        }
    }

    /// Size of the header on the wire, opcode included.
    pub fn encoded_len(mode: HeaderMode) -> usize {
        match mode {
            HeaderMode::BlockNumber => 1 + 8,
            HeaderMode::Accumulator => 1 + 2 * ACCUMULATOR_BYTES,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            WriteHeader::BlockNumber(block_number) => {
                out.extend_from_slice(&block_number.to_be_bytes())
            }
            WriteHeader::Accumulator {
                source,
                destination,
            } => {
                out.extend_from_slice(source);
                out.extend_from_slice(destination);
            }
        }
    }
}

/// One new round for one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdate {
    pub feed_id: FeedId,
    pub stride: Stride,
    pub round: RoundIndex,
    pub payload: Vec<u8>,
}

impl FeedUpdate {
    pub fn new(feed_id: u128, stride: u8, round: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            feed_id: FeedId(feed_id),
            stride: Stride(stride),
            round: RoundIndex(round),
            payload: payload.into(),
        }
    }

    pub fn key(&self) -> FeedKey {
        FeedKey {
            feed_id: self.feed_id,
            stride: self.stride,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    pub header: WriteHeader,
    pub feeds: Vec<FeedUpdate>,
}

impl WriteBatch {
    pub fn new(header: WriteHeader, feeds: Vec<FeedUpdate>) -> Self {
        Self { header, feeds }
    }
}

/// Serializes `batch` into write calldata.
///
/// `prior` supplies the ring buffer rows as the store currently holds them;
/// every row touched by the batch starts from its prior value (zero if
/// unknown) and only the cells of the written feeds are overwritten. Feeds
/// sharing a row are merged into one row entry, later updates win.
///
/// # Errors
/// - [`EncodeError::OutOfRange`] if any feed id, stride, round or payload
///   length is outside its domain.
/// - [`EncodeError::TooManyFeeds`] if the batch cannot be counted in 4 bytes.
pub fn encode_write(batch: &WriteBatch, prior: &RingBufferTable) -> Result<Vec<u8>, EncodeError> {
    let feed_count = u32::try_from(batch.feeds.len())
        .map_err(|_| EncodeError::TooManyFeeds(batch.feeds.len()))?;

    let payload_bytes: usize = batch.feeds.iter().map(|f| f.payload.len()).sum();
    let mut out = Vec::with_capacity(
        WriteHeader::encoded_len(batch.header.mode()) + 4 + payload_bytes + batch.feeds.len() * 24,
    );

    out.push(WRITE_OPCODE);
    batch.header.write_to(&mut out);
    out.extend_from_slice(&feed_count.to_be_bytes());

    let mut rows: BTreeMap<RowIndex, RowValue> = BTreeMap::new();
    let mut seen = HashSet::with_capacity(batch.feeds.len());

    for update in &batch.feeds {
        write_feed_entry(&mut out, update)?;

        let row = ring_buffer_row(update.feed_id, update.stride)?;
        rows.entry(row)
            .or_insert_with(|| prior.row(row))
            .set_cell(ring_buffer_cell_position(update.feed_id), update.round.0);

        if !seen.insert(update.key()) {
            warn!(
                feed_id = %update.feed_id,
                stride = %update.stride,
                "feed written more than once in a batch; ring buffer keeps the last round"
            );
        }
    }

    for (row, value) in &rows {
        write_length_prefixed(&mut out, &U256::from(row.0));
        out.extend_from_slice(value.as_bytes());
    }

    debug!(
        feeds = feed_count,
        rows = rows.len(),
        bytes = out.len(),
        "encoded ADFS write"
    );
    Ok(out)
}

fn write_feed_entry(out: &mut Vec<u8>, update: &FeedUpdate) -> Result<(), EncodeError> {
    let address = slot_address(update.feed_id, update.round, update.stride)?;
    let len = check_payload_len(update.payload.len(), update.stride)?;

    out.push(update.stride.0);
    write_length_prefixed(out, &address);
    write_length_prefixed(out, &U256::from(len));
    out.extend_from_slice(&update.payload);
    Ok(())
}
