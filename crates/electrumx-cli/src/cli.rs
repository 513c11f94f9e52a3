use clap::{Parser, Subcommand};

/// electrumx — query an ElectrumX server over its line-delimited JSON-RPC protocol.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// ElectrumX server host.
    #[arg(long, default_value = electrumx_core::rpc::DEFAULT_HOST, env = "ELECTRUMX_HOST")]
    pub host: String,

    /// ElectrumX server TCP port.
    #[arg(long, default_value_t = electrumx_core::rpc::DEFAULT_PORT, env = "ELECTRUMX_PORT")]
    pub port: u16,

    /// Network that addresses are decoded for (bitcoin, testnet, signet, regtest).
    #[arg(long, default_value = "bitcoin", env = "ELECTRUMX_NETWORK")]
    pub network: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Return the block header at the given height.
    #[command(name = "getblockheader")]
    GetBlockHeader {
        /// The height of the block, a non-negative integer.
        #[arg(long, default_value_t = 0)]
        height: u32,

        /// Decode the header instead of printing raw hex.
        #[arg(long)]
        verbose: bool,
    },

    /// Return a concatenated chunk of block headers from the main chain.
    #[command(name = "getblockheaders")]
    GetBlockHeaders {
        /// The height of the first header requested, a non-negative integer.
        #[arg(long, alias = "start_height", default_value_t = 0)]
        start_height: u32,

        /// The number of headers requested, a non-negative integer.
        #[arg(long, default_value_t = 0)]
        count: u32,

        /// Decode the headers instead of printing raw hex.
        #[arg(long)]
        verbose: bool,
    },

    /// Return the estimated fee per kilobyte for confirmation within a number of blocks.
    #[command(name = "estimatefee")]
    EstimateFee {
        /// The number of blocks to target for confirmation.
        #[arg(long)]
        number: Option<u32>,
    },

    /// Return the minimum fee a low-priority transaction must pay to enter the mempool.
    #[command(name = "relayfee")]
    RelayFee,

    /// Print the script hash ElectrumX indexes an address under.
    #[command(name = "decodeaddress")]
    DecodeAddress {
        #[arg(long)]
        address: String,
    },

    /// Return the confirmed and unconfirmed balances of an address.
    #[command(name = "scripthashgetbalance")]
    ScriptHashGetBalance {
        #[arg(long)]
        address: String,
    },

    /// Return the confirmed and mempool history of an address.
    #[command(name = "scripthashgethistory")]
    ScriptHashGetHistory {
        #[arg(long)]
        address: String,
    },

    /// Return the raw mempool reply for an address.
    #[command(name = "scripthashgetmempool")]
    ScriptHashGetMempool {
        #[arg(long)]
        address: String,
    },
}
