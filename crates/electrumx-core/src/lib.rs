pub mod address;
pub mod error;
pub mod header;
pub mod rpc;
#[cfg(test)]
mod test_util;
pub mod types;

pub use error::{CoreError, HeaderError, RpcError};
pub use header::{BlockHeader, BlockHeaderBatch};
pub use types::ScriptHash;
