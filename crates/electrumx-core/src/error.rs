#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(#[from] RpcError),

    #[error("invalid block header data: {0}")]
    Header(#[from] HeaderError),

    #[error("invalid address `{address}`: {message}")]
    Address { address: String, message: String },

    #[error("invalid script hash: {0}")]
    ScriptHash(String),
}

/// Failures of a single request/reply exchange with the server.
///
/// None of these are retried; each one ends the call that produced it.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("write request: {0}")]
    Write(#[source] std::io::Error),

    #[error("read response: {0}")]
    Read(#[source] std::io::Error),

    #[error("encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid response to {method}: {message}")]
    Decode {
        method: &'static str,
        message: String,
    },

    /// The server answered with a JSON-RPC `error` member instead of a result.
    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("invalid hex payload: {0}")]
    Encoding(#[from] hex::FromHexError),

    #[error("truncated header record: {remainder} bytes left after {complete} full headers")]
    TruncatedRecord { complete: usize, remainder: usize },

    #[error("expected a single {expected}-byte header, got {actual} bytes")]
    Length { expected: usize, actual: usize },

    #[error("server reported {reported} headers but the payload holds {decoded}")]
    CountMismatch { reported: u32, decoded: usize },
}
