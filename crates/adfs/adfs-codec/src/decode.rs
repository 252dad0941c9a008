//! Write calldata decoder.
//!
//! # Two passes
//!
//! Entries in write calldata only carry a `(stride, slot_address)` pair, so
//! the decoder works in two passes:
//!
//! 1. **Parse**: header, `feedCount` entries and every trailing ring buffer
//!    row, without interpreting addresses.
//! 2. **Reconcile**: for each row, enumerate its sixteen feeds, read each
//!    feed's round from its cell and compute the address that round would
//!    live at. Entries with that `(stride, address)` get their feed id and
//!    round filled in.
//!
//! Only a buffer that cannot be parsed is an error. Anything found while
//! reconciling is collected as a [`DecodeIssue`] next to the best-effort
//! result, since historical calldata may legitimately disagree with itself
//! (rows updated by other transactions, feeds written twice in one batch).

use std::collections::HashMap;

use adfs_types::{
    FeedId, FeedKey, HeaderMode, MAX_ROW_INDEX, RoundIndex, RowIndex, RowValue, SlotAddress,
    Stride, U256, row_feed_ids, slot_address,
    validate::{check_payload_len, check_round_index, check_stride},
};
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::wire::ByteReader;
use crate::write::{ACCUMULATOR_BYTES, WriteHeader};

/// Smallest possible entry: stride, and two zero-length prefixes.
const MIN_ENTRY_BYTES: usize = 3;

/// A feed entry as found in the calldata.
///
/// `feed_id` and `round` stay `None` until a ring buffer row resolves the
/// entry's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub stride: Stride,
    pub address: SlotAddress,
    pub feed_id: Option<FeedId>,
    pub round: Option<RoundIndex>,
    pub payload: Vec<u8>,
}

impl FeedEntry {
    pub fn is_resolved(&self) -> bool {
        self.feed_id.is_some() && self.round.is_some()
    }

    pub fn key(&self) -> Option<FeedKey> {
        self.feed_id.map(|feed_id| FeedKey {
            feed_id,
            stride: self.stride,
        })
    }
}

/// A ring buffer row as found in the calldata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingBufferRecord {
    /// Raw row index; may exceed the table's domain in malformed input.
    pub row: U256,
    pub value: RowValue,
}

impl RingBufferRecord {
    /// The row index, if it is inside `[0, 2^116 - 1]`.
    pub fn index(&self) -> Option<RowIndex> {
        u128::try_from(self.row)
            .ok()
            .filter(|row| *row <= MAX_ROW_INDEX)
            .map(RowIndex)
    }
}

/// Non-fatal finding of the decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeIssue {
    #[error("ring buffer cell of feed {feed_id} (stride {stride}) holds round {value}, above 8191")]
    RingBufferIndex {
        feed_id: FeedId,
        stride: Stride,
        value: u16,
    },

    #[error("entry {entry} declares stride {stride}, above 31")]
    InvalidStride { entry: usize, stride: u8 },

    #[error("entry {entry} carries {len} bytes, more than the {max} its stride allows")]
    PayloadExceedsStride { entry: usize, len: usize, max: u64 },

    #[error("ring buffer row {row} is outside the table")]
    RowOutOfRange { row: U256 },

    #[error("entry {entry} at address {address} (stride {stride}) matches no ring buffer cell")]
    UnresolvedEntry {
        entry: usize,
        stride: Stride,
        address: SlotAddress,
    },
}

/// Everything recovered from one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWrite {
    pub opcode: u8,
    pub header: WriteHeader,
    pub feeds: Vec<FeedEntry>,
    pub ring_buffer_rows: Vec<RingBufferRecord>,
    pub issues: Vec<DecodeIssue>,
}

impl DecodedWrite {
    pub fn resolved(&self) -> impl Iterator<Item = &FeedEntry> {
        self.feeds.iter().filter(|entry| entry.is_resolved())
    }
}

/// Decodes write calldata produced by [`crate::encode_write`] or captured
/// from chain history.
///
/// `mode` selects the header layout; the calldata itself does not say.
///
/// # Errors
/// [`DecodeError`] only when the buffer cannot be parsed (truncated fields,
/// oversize length prefixes). Reconciliation problems are returned in
/// [`DecodedWrite::issues`].
pub fn decode_write(calldata: &[u8], mode: HeaderMode) -> Result<DecodedWrite, DecodeError> {
    let mut reader = ByteReader::new(calldata);

    let opcode = reader.read_u8()?;
    let header = match mode {
        HeaderMode::BlockNumber => WriteHeader::BlockNumber(reader.read_u64_be()?),
        HeaderMode::Accumulator => WriteHeader::Accumulator {
            source: reader.read_array::<ACCUMULATOR_BYTES>()?,
            destination: reader.read_array::<ACCUMULATOR_BYTES>()?,
        },
    };

    let feed_count = reader.read_u32_be()? as usize;
    // the count is untrusted, don't let it size the allocation
    let mut feeds = Vec::with_capacity(feed_count.min(reader.remaining() / MIN_ENTRY_BYTES));
    for _ in 0..feed_count {
        feeds.push(read_feed_entry(&mut reader)?);
    }

    let mut ring_buffer_rows = Vec::new();
    while !reader.is_empty() {
        ring_buffer_rows.push(read_row(&mut reader)?);
    }

    let mut issues = Vec::new();
    check_entries(&feeds, &mut issues);
    reconcile(&mut feeds, &ring_buffer_rows, &mut issues);

    for (entry, feed) in feeds.iter().enumerate() {
        if !feed.is_resolved() && check_stride(feed.stride).is_ok() {
            issues.push(DecodeIssue::UnresolvedEntry {
                entry,
                stride: feed.stride,
                address: feed.address,
            });
        }
    }

    for issue in &issues {
        warn!(%issue, "ADFS write decoded with issue");
    }
    debug!(
        feeds = feeds.len(),
        rows = ring_buffer_rows.len(),
        issues = issues.len(),
        "decoded ADFS write"
    );

    Ok(DecodedWrite {
        opcode,
        header,
        feeds,
        ring_buffer_rows,
        issues,
    })
}

fn read_feed_entry(reader: &mut ByteReader<'_>) -> Result<FeedEntry, DecodeError> {
    let stride = Stride(reader.read_u8()?);
    let address = reader.read_length_prefixed()?;

    let count_at = reader.offset();
    let byte_count = reader.read_length_prefixed()?;
    let byte_count = usize::try_from(byte_count).map_err(|_| DecodeError::TruncatedInput {
        offset: count_at,
        needed: usize::MAX,
        remaining: reader.remaining(),
    })?;
    let payload = reader.read_bytes(byte_count)?.to_vec();

    Ok(FeedEntry {
        stride,
        address,
        feed_id: None,
        round: None,
        payload,
    })
}

fn read_row(reader: &mut ByteReader<'_>) -> Result<RingBufferRecord, DecodeError> {
    let row = reader.read_length_prefixed()?;
    let value = RowValue(reader.read_array()?);
    Ok(RingBufferRecord { row, value })
}

fn check_entries(feeds: &[FeedEntry], issues: &mut Vec<DecodeIssue>) {
    for (entry, feed) in feeds.iter().enumerate() {
        if check_stride(feed.stride).is_err() {
            issues.push(DecodeIssue::InvalidStride {
                entry,
                stride: feed.stride.0,
            });
            continue;
        }
        if check_payload_len(feed.payload.len(), feed.stride).is_err() {
            issues.push(DecodeIssue::PayloadExceedsStride {
                entry,
                len: feed.payload.len(),
                max: feed.stride.max_payload_len(),
            });
        }
    }
}

/// Resolves entry identities from the ring buffer rows.
///
/// Entries are keyed on `(stride, address)`: the same address value can be
/// produced by different feeds under different strides.
fn reconcile(feeds: &mut [FeedEntry], rows: &[RingBufferRecord], issues: &mut Vec<DecodeIssue>) {
    let mut by_address: HashMap<(Stride, SlotAddress), Vec<usize>> = HashMap::new();
    for (entry, feed) in feeds.iter().enumerate() {
        if check_stride(feed.stride).is_ok() {
            by_address
                .entry((feed.stride, feed.address))
                .or_default()
                .push(entry);
        }
    }

    for record in rows {
        let Some((stride, candidates)) = record.index().and_then(|row| row_feed_ids(row).ok())
        else {
            issues.push(DecodeIssue::RowOutOfRange { row: record.row });
            continue;
        };

        // every cell counts, round 0 is a valid round
        for (position, feed_id) in candidates.into_iter().enumerate() {
            let value = record.value.cell(position);
            let Ok(round) = check_round_index(RoundIndex(value)) else {
                issues.push(DecodeIssue::RingBufferIndex {
                    feed_id,
                    stride,
                    value,
                });
                continue;
            };

            let Ok(address) = slot_address(feed_id, round, stride) else {
                continue;
            };
            if let Some(entries) = by_address.get(&(stride, address)) {
                for &entry in entries {
                    feeds[entry].feed_id = Some(feed_id);
                    feeds[entry].round = Some(round);
                }
            }
        }
    }
}
