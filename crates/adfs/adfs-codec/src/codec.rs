use adfs_types::HeaderMode;

use crate::decode::{DecodedWrite, decode_write};
use crate::error::{DecodeError, EncodeError};
use crate::read::{ReadQuery, ReadResponse, decode_read_response, encode_read};
use crate::table::RingBufferTable;
use crate::write::{WriteBatch, encode_write};

/// Calldata codec of a feed store deployment.
///
/// Callers that talk to more than one deployment hold a codec per store
/// rather than picking free functions by hand.
pub trait FeedStoreCodec {
    fn header_mode(&self) -> HeaderMode;

    fn encode_write(
        &self,
        batch: &WriteBatch,
        prior: &RingBufferTable,
    ) -> Result<Vec<u8>, EncodeError>;

    fn decode_write(&self, calldata: &[u8]) -> Result<DecodedWrite, DecodeError>;

    fn encode_read(&self, query: &ReadQuery) -> Result<Vec<u8>, EncodeError>;

    fn decode_read_response(
        &self,
        query: &ReadQuery,
        response: &[u8],
    ) -> Result<ReadResponse, DecodeError>;
}

/// The raw (non ABI) calldata format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCodec {
    mode: HeaderMode,
}

impl RawCodec {
    pub fn new(mode: HeaderMode) -> Self {
        Self { mode }
    }
}

impl FeedStoreCodec for RawCodec {
    fn header_mode(&self) -> HeaderMode {
        self.mode
    }

    fn encode_write(
        &self,
        batch: &WriteBatch,
        prior: &RingBufferTable,
    ) -> Result<Vec<u8>, EncodeError> {
        encode_write(batch, prior)
    }

    fn decode_write(&self, calldata: &[u8]) -> Result<DecodedWrite, DecodeError> {
        decode_write(calldata, self.mode)
    }

    fn encode_read(&self, query: &ReadQuery) -> Result<Vec<u8>, EncodeError> {
        encode_read(query)
    }

    fn decode_read_response(
        &self,
        query: &ReadQuery,
        response: &[u8],
    ) -> Result<ReadResponse, DecodeError> {
        decode_read_response(query, response)
    }
}
