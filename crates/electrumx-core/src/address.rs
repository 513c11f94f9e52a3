//! Address to script-hash derivation.
//!
//! See <https://electrumx.readthedocs.io/en/latest/protocol-basics.html#script-hashes>.

use bitcoin::address::NetworkUnchecked;
use bitcoin::hashes::{sha256, Hash};
use bitcoin::{Address, Network};

use crate::error::CoreError;
use crate::header::reverse_hash;
use crate::types::ScriptHash;

impl ScriptHash {
    /// Derive the script hash for `address` on `network`.
    pub fn from_address(address: &str, network: Network) -> Result<Self, CoreError> {
        let invalid = |message: String| CoreError::Address {
            address: address.to_owned(),
            message,
        };

        let unchecked: Address<NetworkUnchecked> =
            address.parse().map_err(|e| invalid(format!("{e}")))?;
        let checked = unchecked
            .require_network(network)
            .map_err(|e| invalid(format!("{e}")))?;

        let script = checked.script_pubkey();
        let digest = sha256::Hash::hash(script.as_bytes()).to_byte_array();
        Ok(Self::from_byte_array(reverse_hash(&digest)))
    }
}
