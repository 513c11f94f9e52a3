use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::{CoreError, RpcError};

use super::types::Envelope;

pub const BLOCK_HEADER: &str = "blockchain.block.header";
pub const BLOCK_HEADERS: &str = "blockchain.block.headers";
pub const ESTIMATE_FEE: &str = "blockchain.estimatefee";
pub const RELAY_FEE: &str = "blockchain.relayfee";
pub const SCRIPTHASH_GET_BALANCE: &str = "blockchain.scripthash.get_balance";
pub const SCRIPTHASH_GET_HISTORY: &str = "blockchain.scripthash.get_history";
pub const SCRIPTHASH_GET_MEMPOOL: &str = "blockchain.scripthash.get_mempool";

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: &'a [serde_json::Value],
}

#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    id: Option<u64>,
    jsonrpc: Option<String>,
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

/// Writes requests in the spacing that ElectrumX clients have always sent:
/// no space after the first key, `": "` after the others, and `", "`
/// between entries and array items.
#[derive(Default)]
struct WireFormatter {
    keys: usize,
}

impl Formatter for WireFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.keys += 1;
        if self.keys == 1 {
            writer.write_all(b":")
        } else {
            writer.write_all(b": ")
        }
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

/// Serialize one request line, newline included.
pub fn encode_request(
    id: u64,
    method: &str,
    params: &[serde_json::Value],
) -> Result<Vec<u8>, RpcError> {
    let req = JsonRpcRequest { id, method, params };
    let mut buf = Vec::with_capacity(64 + method.len());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, WireFormatter::default());
    req.serialize(&mut ser).map_err(RpcError::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Parse one reply line into the envelope shape `method` is known to return.
pub fn decode_response<T: DeserializeOwned>(
    method: &'static str,
    line: &[u8],
) -> Result<Envelope<T>, CoreError> {
    let decode_err = |message: String| RpcError::Decode { method, message };

    let decoded: JsonRpcResponse = serde_json::from_slice(line)
        .map_err(|e| decode_err(format!("decode JSON-RPC response: {e}")))?;

    if let Some(err) = decoded.error {
        return Err(parse_jsonrpc_error(method, err).into());
    }

    let id = decoded
        .id
        .ok_or_else(|| decode_err("missing id".to_owned()))?;
    let jsonrpc = decoded
        .jsonrpc
        .ok_or_else(|| decode_err("missing jsonrpc".to_owned()))?;
    let result = decoded
        .result
        .ok_or_else(|| decode_err("missing result".to_owned()))?;
    let result = serde_json::from_value(result)
        .map_err(|e| decode_err(format!("unexpected result shape: {e}")))?;

    Ok(Envelope {
        id,
        jsonrpc,
        result,
    })
}

/// Parse a JSON-RPC error value into a structured `RpcError`.
///
/// Errors of the form `{"code": <int>, "message": <string>}` become
/// `Server`; anything else is reported as a decode failure carrying the raw
/// JSON.
fn parse_jsonrpc_error(method: &'static str, err: serde_json::Value) -> RpcError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => RpcError::Server {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => RpcError::Decode {
            method,
            message: format!("non-standard JSON-RPC error: {err}"),
        },
    }
}
