//! Domain types shared between the RPC layer and its callers.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ==============================================================================
// Script Hash
// ==============================================================================

/// The 32-byte key ElectrumX indexes outputs by: the SHA-256 of an output
/// script, byte-reversed. Stored in the reversed (wire) order, so `to_hex`
/// yields the RPC parameter directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptHash([u8; 32]);

impl ScriptHash {
    pub const fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parses the 64-character hex form used on the wire.
impl FromStr for ScriptHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CoreError::ScriptHash(format!("`{s}`: {e}")))?;
        Ok(Self(bytes))
    }
}
