use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;

use super::client::ElectrumClient;
use super::connection::Connection;

/// A scripted in-memory server for testing. Answers each received request
/// line with the next canned reply, then hangs up. The spawned task returns
/// every request line it read, without delimiters.
#[derive(Default)]
pub struct MockPeer {
    replies: Vec<String>,
    read_before_close: bool,
}

impl MockPeer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, line: impl Into<String>) -> Self {
        self.replies.push(line.into());
        self
    }

    /// After the scripted replies, accept one more request and close
    /// without answering it.
    pub fn close_after_request(mut self) -> Self {
        self.read_before_close = true;
        self
    }

    pub fn spawn(self) -> (ElectrumClient<DuplexStream>, JoinHandle<Vec<String>>) {
        let (client_half, server_half) = duplex(64 * 1024);
        let handle = tokio::spawn(async move {
            let mut stream = BufReader::new(server_half);
            let mut requests = Vec::new();

            for reply in self.replies {
                let Some(request) = read_request(&mut stream).await else {
                    return requests;
                };
                requests.push(request);
                let framed = format!("{reply}\n");
                if stream.get_mut().write_all(framed.as_bytes()).await.is_err() {
                    return requests;
                }
            }

            if self.read_before_close {
                if let Some(request) = read_request(&mut stream).await {
                    requests.push(request);
                }
            }
            requests
        });

        let client = ElectrumClient::new(Connection::new(client_half, "mock"));
        (client, handle)
    }
}

async fn read_request(stream: &mut BufReader<DuplexStream>) -> Option<String> {
    let mut line = String::new();
    match stream.read_line(&mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches('\n').to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::ElectrumRpc;

    #[tokio::test]
    async fn records_requests_in_order() {
        let (mut client, peer) = MockPeer::new()
            .reply(r#"{"id":0,"jsonrpc":"2.0","result":0.0001}"#)
            .reply(r#"{"id":0,"jsonrpc":"2.0","result":"00"}"#)
            .spawn();

        client.relay_fee().await.expect("relayfee");
        client.get_block_header(5).await.expect("header");

        let requests = peer.await.expect("peer task");
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("blockchain.relayfee"));
        assert!(requests[1].ends_with("\"params\": [5]}"));
    }
}
