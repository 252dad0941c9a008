//! Serializable views of decoded calldata, byte strings rendered as hex.

use adfs_codec::{DecodedWrite, FeedEntry, ReadResponse, RingBufferRecord, WriteHeader};
use adfs_types::U256;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct WriteView {
    pub opcode: u8,
    pub header: HeaderView,
    pub feeds: Vec<FeedView>,
    pub ring_buffer_rows: Vec<RowView>,
    pub issues: Vec<String>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HeaderView {
    BlockNumber { block_number: u64 },
    Accumulator { source: String, destination: String },
}

#[derive(Serialize, Debug)]
pub struct FeedView {
    pub stride: u8,
    pub address: U256,
    pub feed_id: Option<String>,
    pub round: Option<u16>,
    pub payload: String,
}

#[derive(Serialize, Debug)]
pub struct RowView {
    pub row: U256,
    pub value: String,
    pub cells: Vec<u16>,
}

#[derive(Serialize, Debug)]
pub struct ResponseView {
    pub index: Option<u16>,
    pub data: Vec<String>,
}

impl From<&DecodedWrite> for WriteView {
    fn from(write: &DecodedWrite) -> Self {
        Self {
            opcode: write.opcode,
            header: match write.header {
                WriteHeader::BlockNumber(block_number) => HeaderView::BlockNumber { block_number },
                WriteHeader::Accumulator {
                    source,
                    destination,
                } => HeaderView::Accumulator {
                    source: hex::encode(source),
                    destination: hex::encode(destination),
                },
            },
            feeds: write.feeds.iter().map(FeedView::from).collect(),
            ring_buffer_rows: write.ring_buffer_rows.iter().map(RowView::from).collect(),
            issues: write.issues.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<&FeedEntry> for FeedView {
    fn from(entry: &FeedEntry) -> Self {
        Self {
            stride: entry.stride.0,
            address: entry.address,
            // u128 does not survive every JSON consumer
            feed_id: entry.feed_id.map(|id| id.to_string()),
            round: entry.round.map(|round| round.0),
            payload: hex::encode(&entry.payload),
        }
    }
}

impl From<&RingBufferRecord> for RowView {
    fn from(record: &RingBufferRecord) -> Self {
        Self {
            row: record.row,
            value: hex::encode(record.value.as_bytes()),
            cells: record.value.cells().to_vec(),
        }
    }
}

impl From<&ReadResponse> for ResponseView {
    fn from(response: &ReadResponse) -> Self {
        let slots = |data: &[Vec<u8>]| -> Vec<String> { data.iter().map(hex::encode).collect() };
        match response {
            ReadResponse::Index(index) => Self {
                index: Some(index.0),
                data: Vec::new(),
            },
            ReadResponse::Data(data) => Self {
                index: None,
                data: slots(data),
            },
            ReadResponse::IndexAndData { index, data } => Self {
                index: Some(index.0),
                data: slots(data),
            },
        }
    }
}
