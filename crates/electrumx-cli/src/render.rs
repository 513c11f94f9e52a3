//! Human-readable rendering of RPC replies.

use std::fmt::{self, Display, Write};

use electrumx_core::rpc::{Envelope, HistoryEntry, Reply};
use electrumx_core::{BlockHeader, BlockHeaderBatch, CoreError};

/// Render `reply` for the terminal. With `verbose`, header hex is decoded
/// into its fields first.
pub fn reply(reply: &Reply, verbose: bool) -> Result<String, CoreError> {
    let text = match reply {
        Reply::BlockHeader(env) if verbose => {
            let header = BlockHeader::from_hex(&env.result)?;
            envelope(env, header)
        }
        Reply::BlockHeader(env) => envelope(env, Labeled("Result", &env.result)),
        Reply::BlockHeaders(env) if verbose => {
            let batch = BlockHeaderBatch::from_result(&env.result)?;
            envelope(env, batch)
        }
        Reply::BlockHeaders(env) => envelope(
            env,
            format!(
                "{}\n{}\n{}",
                Labeled("Count", env.result.count),
                Labeled("Hex", &env.result.hex),
                Labeled("Max", env.result.max)
            ),
        ),
        Reply::EstimateFee(env) => envelope(env, Labeled("Result", env.result)),
        Reply::RelayFee(env) => envelope(env, Labeled("Result", env.result)),
        Reply::ScriptHashBalance(env) => envelope(
            env,
            format!(
                "{}\n{}",
                Labeled("Confirmed", env.result.confirmed),
                Labeled("Unconfirmed", env.result.unconfirmed)
            ),
        ),
        Reply::ScriptHashHistory(env) => envelope(env, history(&env.result)),
        Reply::ScriptHashMempool(raw) => raw.clone(),
    };
    Ok(text)
}

fn envelope<T>(env: &Envelope<T>, body: impl Display) -> String {
    format!(
        "{}\n{}\n{body}",
        Labeled("ID", env.id),
        Labeled("Jsonrpc", &env.jsonrpc)
    )
}

fn history(entries: &[HistoryEntry]) -> String {
    let mut out = Labeled("Result", format!("{} transactions", entries.len())).to_string();
    for entry in entries {
        let _ = write!(out, "\n  {:>8}  {}", entry.height, entry.tx_hash);
        if let Some(fee) = entry.fee {
            let _ = write!(out, "  fee={fee}");
        }
    }
    out
}

struct Labeled<'a, T>(&'a str, T);

impl<T: Display> Display for Labeled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12} {}", format!("{}:", self.0), self.1)
    }
}
