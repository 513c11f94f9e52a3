//! Typed results for each supported RPC method, plus the envelope that
//! wraps all of them.

use std::fmt;

use bitcoin::Txid;
use serde::Deserialize;

// ==============================================================================
// Envelope
// ==============================================================================

/// The `{id, jsonrpc, result}` wrapper around every reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub id: u64,
    pub jsonrpc: String,
    pub result: T,
}

// ==============================================================================
// Block Headers
// ==============================================================================

/// Result of `blockchain.block.headers`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockHeadersResult {
    /// Headers returned, between zero and the number requested.
    pub count: u32,
    /// Raw headers concatenated in order, hex-encoded.
    pub hex: String,
    /// Maximum headers the server returns for a single request.
    pub max: u32,
}

// ==============================================================================
// Fees
// ==============================================================================

/// Result of `blockchain.estimatefee`, in coin units per kilobyte.
///
/// The server sends `-1` when the daemon has too little data to estimate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "f64")]
pub enum FeeEstimate {
    PerKilobyte(f64),
    Unavailable,
}

impl From<f64> for FeeEstimate {
    fn from(value: f64) -> Self {
        if value == -1.0 {
            Self::Unavailable
        } else {
            Self::PerKilobyte(value)
        }
    }
}

impl FeeEstimate {
    pub fn per_kilobyte(self) -> Option<f64> {
        match self {
            Self::PerKilobyte(fee) => Some(fee),
            Self::Unavailable => None,
        }
    }
}

impl fmt::Display for FeeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerKilobyte(fee) => write!(f, "{fee}"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

// ==============================================================================
// Script Hash Queries
// ==============================================================================

/// Result of `blockchain.scripthash.get_balance`, in satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScriptHashBalance {
    pub confirmed: i64,
    /// Can be negative when mempool transactions spend confirmed coins.
    pub unconfirmed: i64,
}

/// One item of `blockchain.scripthash.get_history`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    /// Confirmation height; `0` or `-1` for mempool transactions.
    pub height: i64,
    pub tx_hash: Txid,
    /// Only present for mempool transactions.
    #[serde(default)]
    pub fee: Option<u64>,
}

impl HistoryEntry {
    pub fn is_confirmed(&self) -> bool {
        self.height > 0
    }
}
