//! ElectrumX RPC layer.
//!
//! Defines the [`ElectrumRpc`] trait with one binding per supported method,
//! the line-oriented [`Connection`] transport, and the TCP implementation
//! ([`ElectrumClient`]), plus a scripted test peer (`mock`).
//!
//! A connection carries one request at a time. Replies are not matched to
//! requests by id, so every binding borrows the client mutably for the whole
//! round trip.

mod client;
mod connection;
#[cfg(test)]
pub mod mock;
pub mod protocol;
pub mod types;

pub use client::ElectrumClient;
pub use connection::{ClientConfig, Connection, DEFAULT_HOST, DEFAULT_PORT};
pub use protocol::{decode_response, encode_request};
pub use types::{BlockHeadersResult, Envelope, FeeEstimate, HistoryEntry, ScriptHashBalance};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::header::{BlockHeader, BlockHeaderBatch};
use crate::types::ScriptHash;

/// The ElectrumX methods this client speaks.
///
/// Each call performs exactly one request and reads exactly one reply.
/// Failures are never retried.
#[async_trait]
pub trait ElectrumRpc: Send {
    /// Raw hex of the header at `height`.
    async fn get_block_header(&mut self, height: u32) -> Result<Envelope<String>, CoreError>;

    /// A run of up to `count` consecutive headers starting at `start_height`.
    async fn get_block_headers(
        &mut self,
        start_height: u32,
        count: u32,
    ) -> Result<Envelope<BlockHeadersResult>, CoreError>;

    /// Fee per kilobyte needed to confirm within `blocks` blocks.
    async fn estimate_fee(&mut self, blocks: u32) -> Result<Envelope<FeeEstimate>, CoreError>;

    /// Minimum fee per kilobyte for mempool acceptance.
    async fn relay_fee(&mut self) -> Result<Envelope<f64>, CoreError>;

    async fn script_hash_balance(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<Envelope<ScriptHashBalance>, CoreError>;

    async fn script_hash_history(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<Envelope<Vec<HistoryEntry>>, CoreError>;

    /// The reply line exactly as received. Its result shape is not stable
    /// across server versions, so it is not parsed.
    async fn script_hash_mempool(&mut self, script_hash: &ScriptHash) -> Result<String, CoreError>;

    async fn get_block_header_decoded(&mut self, height: u32) -> Result<BlockHeader, CoreError> {
        let envelope = self.get_block_header(height).await?;
        Ok(BlockHeader::from_hex(&envelope.result)?)
    }

    async fn get_block_headers_decoded(
        &mut self,
        start_height: u32,
        count: u32,
    ) -> Result<BlockHeaderBatch, CoreError> {
        let envelope = self.get_block_headers(start_height, count).await?;
        Ok(BlockHeaderBatch::from_result(&envelope.result)?)
    }

    /// Run the binding that matches `method`.
    async fn call(&mut self, method: &Method) -> Result<Reply, CoreError> {
        let reply = match method {
            Method::BlockHeader { height } => {
                Reply::BlockHeader(self.get_block_header(*height).await?)
            }
            Method::BlockHeaders {
                start_height,
                count,
            } => Reply::BlockHeaders(self.get_block_headers(*start_height, *count).await?),
            Method::EstimateFee { blocks } => Reply::EstimateFee(self.estimate_fee(*blocks).await?),
            Method::RelayFee => Reply::RelayFee(self.relay_fee().await?),
            Method::ScriptHashBalance(hash) => {
                Reply::ScriptHashBalance(self.script_hash_balance(hash).await?)
            }
            Method::ScriptHashHistory(hash) => {
                Reply::ScriptHashHistory(self.script_hash_history(hash).await?)
            }
            Method::ScriptHashMempool(hash) => {
                Reply::ScriptHashMempool(self.script_hash_mempool(hash).await?)
            }
        };
        Ok(reply)
    }
}

// ==============================================================================
// Method / Reply
// ==============================================================================

/// One supported RPC call together with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    BlockHeader { height: u32 },
    BlockHeaders { start_height: u32, count: u32 },
    EstimateFee { blocks: u32 },
    RelayFee,
    ScriptHashBalance(ScriptHash),
    ScriptHashHistory(ScriptHash),
    ScriptHashMempool(ScriptHash),
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockHeader { .. } => protocol::BLOCK_HEADER,
            Self::BlockHeaders { .. } => protocol::BLOCK_HEADERS,
            Self::EstimateFee { .. } => protocol::ESTIMATE_FEE,
            Self::RelayFee => protocol::RELAY_FEE,
            Self::ScriptHashBalance(_) => protocol::SCRIPTHASH_GET_BALANCE,
            Self::ScriptHashHistory(_) => protocol::SCRIPTHASH_GET_HISTORY,
            Self::ScriptHashMempool(_) => protocol::SCRIPTHASH_GET_MEMPOOL,
        }
    }

    pub fn params(&self) -> Vec<serde_json::Value> {
        match self {
            Self::BlockHeader { height } => vec![serde_json::json!(height)],
            Self::BlockHeaders {
                start_height,
                count,
            } => vec![serde_json::json!(start_height), serde_json::json!(count)],
            Self::EstimateFee { blocks } => vec![serde_json::json!(blocks)],
            Self::RelayFee => Vec::new(),
            Self::ScriptHashBalance(hash)
            | Self::ScriptHashHistory(hash)
            | Self::ScriptHashMempool(hash) => vec![serde_json::json!(hash.to_hex())],
        }
    }
}

/// A decoded reply, tagged by the method that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    BlockHeader(Envelope<String>),
    BlockHeaders(Envelope<BlockHeadersResult>),
    EstimateFee(Envelope<FeeEstimate>),
    RelayFee(Envelope<f64>),
    ScriptHashBalance(Envelope<ScriptHashBalance>),
    ScriptHashHistory(Envelope<Vec<HistoryEntry>>),
    ScriptHashMempool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_params_match_arity() {
        let hash = ScriptHash::from_byte_array([0xab; 32]);
        assert_eq!(Method::RelayFee.params().len(), 0);
        assert_eq!(Method::BlockHeader { height: 1 }.params().len(), 1);
        assert_eq!(
            Method::BlockHeaders {
                start_height: 1,
                count: 2
            }
            .params(),
            vec![serde_json::json!(1), serde_json::json!(2)]
        );
        assert_eq!(
            Method::ScriptHashHistory(hash).params(),
            vec![serde_json::json!("ab".repeat(32))]
        );
    }

    #[test]
    fn method_names() {
        assert_eq!(
            Method::EstimateFee { blocks: 6 }.name(),
            "blockchain.estimatefee"
        );
        assert_eq!(
            Method::ScriptHashMempool(ScriptHash::from_byte_array([0; 32])).name(),
            "blockchain.scripthash.get_mempool"
        );
    }
}
