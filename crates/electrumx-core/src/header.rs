//! Binary block header codec.
//!
//! Servers ship block headers as hex strings holding one or more raw
//! 80-byte consensus records back to back. This module decodes those
//! records into [`BlockHeader`] values and renders them for display.
//!
//! Hash fields are kept in wire order (little-endian, as serialized) and
//! only reversed when producing display hex.

use std::fmt;

use bitcoin::hashes::{sha256d, Hash};

use crate::error::HeaderError;
use crate::rpc::types::BlockHeadersResult;

/// Size of one serialized block header.
pub const HEADER_SIZE: usize = 80;

// ==============================================================================
// Block Header
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    pub version: i32,
    /// Previous block hash, wire order.
    pub prev_block: [u8; 32],
    /// Merkle root, wire order.
    pub merkle_root: [u8; 32],
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Decode exactly one header from `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, HeaderError> {
        let record: &[u8; HEADER_SIZE] = bytes.try_into().map_err(|_| HeaderError::Length {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self::from_record(record))
    }

    /// Decode the hex payload returned by `blockchain.block.header`, which
    /// must hold exactly one record.
    pub fn from_hex(payload: &str) -> Result<Self, HeaderError> {
        let raw = hex::decode(payload)?;
        Self::decode(&raw)
    }

    fn from_record(record: &[u8; HEADER_SIZE]) -> Self {
        Self {
            version: i32::from_le_bytes(word(record, 0)),
            prev_block: hash(record, 4),
            merkle_root: hash(record, 36),
            timestamp: u32::from_le_bytes(word(record, 68)),
            bits: u32::from_le_bytes(word(record, 72)),
            nonce: u32::from_le_bytes(word(record, 76)),
        }
    }

    /// Serialize back into the 80-byte wire record.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_block);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Double SHA-256 of the serialized header, wire order.
    pub fn block_hash(&self) -> [u8; 32] {
        sha256d::Hash::hash(&self.encode()).to_byte_array()
    }

    pub fn block_hash_hex(&self) -> String {
        display_hex(&self.block_hash())
    }

    pub fn prev_block_hex(&self) -> String {
        display_hex(&self.prev_block)
    }

    pub fn merkle_root_hex(&self) -> String {
        display_hex(&self.merkle_root)
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hash       {}", self.block_hash_hex())?;
        writeln!(f, "Version    {}", self.version)?;
        writeln!(f, "PrevBlock  {}", self.prev_block_hex())?;
        writeln!(f, "MerkleRoot {}", self.merkle_root_hex())?;
        writeln!(f, "Timestamp  {}", self.timestamp)?;
        writeln!(f, "Bits       {}", self.bits)?;
        write!(f, "Nonce      {}", self.nonce)
    }
}

fn word(record: &[u8; HEADER_SIZE], at: usize) -> [u8; 4] {
    [record[at], record[at + 1], record[at + 2], record[at + 3]]
}

fn hash(record: &[u8; HEADER_SIZE], at: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&record[at..at + 32]);
    out
}

/// Reverse a wire-order hash into conventional display order.
pub fn reverse_hash(hash: &[u8; 32]) -> [u8; 32] {
    let mut out = *hash;
    out.reverse();
    out
}

/// Hex-encode a wire-order hash in display order.
pub fn display_hex(hash: &[u8; 32]) -> String {
    hex::encode(reverse_hash(hash))
}

// ==============================================================================
// Concatenated Headers
// ==============================================================================

/// Decode a hex blob of back-to-back headers.
///
/// Fails as a whole if the blob is not valid hex or leaves a partial record
/// at the end; there is no best-effort prefix result.
pub fn decode_headers(payload: &str) -> Result<Vec<BlockHeader>, HeaderError> {
    let raw = hex::decode(payload)?;

    let records = raw.chunks_exact(HEADER_SIZE);
    let remainder = records.remainder().len();
    if remainder != 0 {
        return Err(HeaderError::TruncatedRecord {
            complete: raw.len() / HEADER_SIZE,
            remainder,
        });
    }

    records.map(BlockHeader::decode).collect()
}

/// Headers returned by one `blockchain.block.headers` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeaderBatch {
    pub headers: Vec<BlockHeader>,
    pub count: u32,
    /// Server-side cap on headers per request.
    pub max: u32,
}

impl BlockHeaderBatch {
    pub fn from_result(result: &BlockHeadersResult) -> Result<Self, HeaderError> {
        let headers = decode_headers(&result.hex)?;
        if headers.len() != result.count as usize {
            return Err(HeaderError::CountMismatch {
                reported: result.count,
                decoded: headers.len(),
            });
        }
        Ok(Self {
            headers,
            count: result.count,
            max: result.max,
        })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockHeader> {
        self.headers.iter()
    }
}

impl fmt::Display for BlockHeaderBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Count      {}", self.count)?;
        write!(f, "Max        {}", self.max)?;
        for header in self.iter() {
            write!(f, "\n\n{header}")?;
        }
        Ok(())
    }
}
