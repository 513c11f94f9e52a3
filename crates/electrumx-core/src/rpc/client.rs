use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};
use crate::types::ScriptHash;

use super::connection::{ClientConfig, Connection};
use super::protocol::{decode_response, encode_request};
use super::types::{BlockHeadersResult, Envelope, FeeEstimate, HistoryEntry, ScriptHashBalance};
use super::{ElectrumRpc, Method};

/// Every request carries the same id; replies are matched by order alone.
const REQUEST_ID: u64 = 0;

/// ElectrumX client over a single owned stream.
pub struct ElectrumClient<S = TcpStream> {
    conn: Connection<S>,
}

impl ElectrumClient<TcpStream> {
    pub async fn connect(config: &ClientConfig) -> Result<Self, CoreError> {
        let conn = Connection::connect(config).await?;
        Ok(Self::new(conn))
    }
}

impl<S> ElectrumClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(conn: Connection<S>) -> Self {
        Self { conn }
    }

    pub fn peer(&self) -> &str {
        self.conn.peer()
    }

    async fn round_trip(&mut self, method: &Method) -> Result<Vec<u8>, CoreError> {
        let name = method.name();
        let params = method.params();
        debug!(
            rpc.id = REQUEST_ID,
            rpc.method = name,
            rpc.params = params.len(),
            "rpc call"
        );

        let request = encode_request(REQUEST_ID, name, &params)?;
        self.conn.send(&request).await?;
        let line = self.conn.receive().await?;

        debug!(rpc.method = name, body_len = line.len(), "rpc response");
        trace!(rpc.method = name, body = %String::from_utf8_lossy(&line), "rpc response body");
        Ok(line)
    }

    async fn rpc_call<T: DeserializeOwned>(
        &mut self,
        method: Method,
    ) -> Result<Envelope<T>, CoreError> {
        let line = self.round_trip(&method).await?;
        decode_response(method.name(), &line)
    }
}

#[async_trait]
impl<S> ElectrumRpc for ElectrumClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn get_block_header(&mut self, height: u32) -> Result<Envelope<String>, CoreError> {
        self.rpc_call(Method::BlockHeader { height }).await
    }

    async fn get_block_headers(
        &mut self,
        start_height: u32,
        count: u32,
    ) -> Result<Envelope<BlockHeadersResult>, CoreError> {
        self.rpc_call(Method::BlockHeaders {
            start_height,
            count,
        })
        .await
    }

    async fn estimate_fee(&mut self, blocks: u32) -> Result<Envelope<FeeEstimate>, CoreError> {
        self.rpc_call(Method::EstimateFee { blocks }).await
    }

    async fn relay_fee(&mut self) -> Result<Envelope<f64>, CoreError> {
        self.rpc_call(Method::RelayFee).await
    }

    async fn script_hash_balance(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<Envelope<ScriptHashBalance>, CoreError> {
        self.rpc_call(Method::ScriptHashBalance(*script_hash)).await
    }

    async fn script_hash_history(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<Envelope<Vec<HistoryEntry>>, CoreError> {
        self.rpc_call(Method::ScriptHashHistory(*script_hash)).await
    }

    async fn script_hash_mempool(&mut self, script_hash: &ScriptHash) -> Result<String, CoreError> {
        let method = Method::ScriptHashMempool(*script_hash);
        let line = self.round_trip(&method).await?;
        String::from_utf8(line).map_err(|e| {
            RpcError::Decode {
                method: method.name(),
                message: format!("reply is not UTF-8: {e}"),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeaderError;
    use crate::rpc::mock::MockPeer;
    use crate::rpc::Reply;
    use crate::test_util::{BLOCK_1_HEADER_HEX, GENESIS_HEADER_HEX};

    fn script_hash() -> ScriptHash {
        "eafd9bc024177ba93572c1cc3a83f555dadbb81ca94cd9761ef5211ce794cea9"
            .parse()
            .expect("valid script hash")
    }

    #[tokio::test]
    async fn block_headers_decoded_returns_full_batch() {
        let reply = format!(
            r#"{{"id":0,"jsonrpc":"2.0","result":{{"count":2,"hex":"{GENESIS_HEADER_HEX}{BLOCK_1_HEADER_HEX}","max":2016}}}}"#
        );
        let (mut client, peer) = MockPeer::new().reply(reply).spawn();

        let batch = client
            .get_block_headers_decoded(0, 2)
            .await
            .expect("batch must decode");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.max, 2016);
        assert_eq!(batch.headers[1].prev_block, batch.headers[0].block_hash());

        let requests = peer.await.expect("peer task");
        assert_eq!(
            requests,
            vec![r#"{"id":0, "method": "blockchain.block.headers", "params": [0, 2]}"#]
        );
    }

    #[tokio::test]
    async fn block_header_decoded_rejects_batch_payload() {
        let reply = format!(
            r#"{{"id":0,"jsonrpc":"2.0","result":"{GENESIS_HEADER_HEX}{BLOCK_1_HEADER_HEX}"}}"#
        );
        let (mut client, _peer) = MockPeer::new().reply(reply).spawn();

        let err = client
            .get_block_header_decoded(0)
            .await
            .expect_err("two headers is not one");
        assert!(matches!(err, CoreError::Header(HeaderError::Length { .. })));
    }

    #[tokio::test]
    async fn script_hash_calls_send_quoted_hex() {
        let (mut client, peer) = MockPeer::new()
            .reply(r#"{"id":0,"jsonrpc":"2.0","result":{"confirmed":103873966,"unconfirmed":23684400}}"#)
            .reply(r#"{"id":0,"jsonrpc":"2.0","result":[]}"#)
            .spawn();

        let balance = client
            .script_hash_balance(&script_hash())
            .await
            .expect("balance");
        assert_eq!(balance.result.confirmed, 103_873_966);
        assert_eq!(balance.result.unconfirmed, 23_684_400);

        let history = client
            .script_hash_history(&script_hash())
            .await
            .expect("history");
        assert!(history.result.is_empty());

        let requests = peer.await.expect("peer task");
        assert_eq!(
            requests[0],
            r#"{"id":0, "method": "blockchain.scripthash.get_balance", "params": ["eafd9bc024177ba93572c1cc3a83f555dadbb81ca94cd9761ef5211ce794cea9"]}"#
        );
        assert!(requests[1].contains("\"blockchain.scripthash.get_history\""));
    }

    #[tokio::test]
    async fn mempool_reply_is_passed_through() {
        let raw = r#"{"id":0,"jsonrpc":"2.0","result":[{"tx_hash":"ab","height":0,"fee":24310}]}"#;
        let (mut client, _peer) = MockPeer::new().reply(raw).spawn();

        let reply = client
            .script_hash_mempool(&script_hash())
            .await
            .expect("mempool");
        assert_eq!(reply, raw);
    }

    #[tokio::test]
    async fn call_dispatches_by_method() {
        let (mut client, _peer) = MockPeer::new()
            .reply(r#"{"id":0,"jsonrpc":"2.0","result":-1}"#)
            .reply(r#"{"id":0,"jsonrpc":"2.0","result":1e-05}"#)
            .spawn();

        let reply = client
            .call(&Method::EstimateFee { blocks: 2 })
            .await
            .expect("estimatefee");
        match reply {
            Reply::EstimateFee(env) => assert_eq!(env.result, FeeEstimate::Unavailable),
            other => panic!("unexpected reply: {other:?}"),
        }

        let reply = client.call(&Method::RelayFee).await.expect("relayfee");
        assert!(matches!(reply, Reply::RelayFee(env) if env.result == 0.00001));
    }

    #[tokio::test]
    async fn closed_peer_is_read_error() {
        let (mut client, peer) = MockPeer::new().close_after_request().spawn();

        let err = client.relay_fee().await.expect_err("peer hung up");
        assert!(matches!(err, CoreError::Rpc(RpcError::Read(_))));

        let requests = peer.await.expect("peer task");
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn missing_result_is_decode_error() {
        let (mut client, _peer) = MockPeer::new().reply(r#"{"id":0,"jsonrpc":"2.0"}"#).spawn();

        let err = client.get_block_header(1).await.expect_err("no result");
        assert!(matches!(err, CoreError::Rpc(RpcError::Decode { .. })));
    }
}
