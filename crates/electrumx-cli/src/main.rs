mod cli;
mod render;

use bitcoin::Network;
use clap::Parser;
use eyre::{bail, eyre, WrapErr};

use electrumx_core::rpc::{ClientConfig, ElectrumClient, ElectrumRpc, Method};
use electrumx_core::{CoreError, RpcError, ScriptHash};

use cli::Command;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let network = map_network(&args.network)?;
    let (method, verbose) = match args.command {
        Command::DecodeAddress { address } => {
            let script_hash = ScriptHash::from_address(&address, network)?;
            println!("{script_hash}");
            return Ok(());
        }
        command => plan(command, network)?,
    };

    let config = ClientConfig::new(args.host, args.port);
    let mut client = ElectrumClient::connect(&config).await.map_err(|err| {
        if matches!(err, CoreError::Rpc(RpcError::Connect { .. })) {
            let message = format_connect_error(&config.address(), &err.to_string());
            eyre!(message).wrap_err("while attempting to connect to ElectrumX")
        } else {
            eyre!(err)
        }
    })?;
    tracing::debug!(peer = client.peer(), method = method.name(), "connected");

    let reply = client
        .call(&method)
        .await
        .wrap_err_with(|| format!("{} failed", method.name()))?;
    println!("{}", render::reply(&reply, verbose)?);
    Ok(())
}

/// Turn a subcommand into the RPC it performs and whether to decode headers.
///
/// Zero is treated as "not set" for heights and counts, so height 0 cannot
/// be requested from the command line.
fn plan(command: Command, network: Network) -> eyre::Result<(Method, bool)> {
    let planned = match command {
        Command::GetBlockHeader { height, verbose } => {
            if height == 0 {
                bail!("`height` flag must be set");
            }
            (Method::BlockHeader { height }, verbose)
        }
        Command::GetBlockHeaders {
            start_height,
            count,
            verbose,
        } => {
            if start_height == 0 || count == 0 {
                bail!("both `start-height` and `count` flags must be set");
            }
            (
                Method::BlockHeaders {
                    start_height,
                    count,
                },
                verbose,
            )
        }
        Command::EstimateFee { number } => {
            let Some(blocks) = number else {
                bail!("`number` flag must be set");
            };
            (Method::EstimateFee { blocks }, false)
        }
        Command::RelayFee => (Method::RelayFee, false),
        Command::ScriptHashGetBalance { address } => (
            Method::ScriptHashBalance(ScriptHash::from_address(&address, network)?),
            false,
        ),
        Command::ScriptHashGetHistory { address } => (
            Method::ScriptHashHistory(ScriptHash::from_address(&address, network)?),
            false,
        ),
        Command::ScriptHashGetMempool { address } => (
            Method::ScriptHashMempool(ScriptHash::from_address(&address, network)?),
            false,
        ),
        Command::DecodeAddress { .. } => bail!("decodeaddress does not contact the server"),
    };
    Ok(planned)
}

fn format_connect_error(addr: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not connect to ElectrumX at `{addr}`"),
        format!("error: {source_error}"),
    ];

    if source_error.contains("refused") {
        lines.push(
            "hint: nothing is listening there; verify the server is running and --host/--port"
                .into(),
        );
    } else if source_error.contains("lookup") || source_error.contains("not known") {
        lines.push(
            "hint: hostname resolution failed; verify the host name and your DNS/network".into(),
        );
    } else if source_error.contains("timed out") || source_error.contains("unreachable") {
        lines.push("hint: the host did not answer; verify network access and firewalls".into());
    }

    lines.join("\n")
}

fn map_network(name: &str) -> eyre::Result<Network> {
    match name {
        "bitcoin" | "main" | "mainnet" => Ok(Network::Bitcoin),
        "testnet" | "test" => Ok(Network::Testnet),
        "signet" => Ok(Network::Signet),
        "regtest" => Ok(Network::Regtest),
        _ => Err(eyre!("unrecognized network `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_counts_as_unset() {
        let err = plan(
            Command::GetBlockHeader {
                height: 0,
                verbose: false,
            },
            Network::Bitcoin,
        )
        .expect_err("zero height must be rejected");
        assert!(err.to_string().contains("`height` flag must be set"));
    }

    #[test]
    fn headers_plan_carries_verbose_flag() {
        let (method, verbose) = plan(
            Command::GetBlockHeaders {
                start_height: 10,
                count: 3,
                verbose: true,
            },
            Network::Bitcoin,
        )
        .expect("valid plan");
        assert_eq!(
            method,
            Method::BlockHeaders {
                start_height: 10,
                count: 3
            }
        );
        assert!(verbose);
    }

    #[test]
    fn estimate_fee_accepts_explicit_zero() {
        let (method, _) =
            plan(Command::EstimateFee { number: Some(0) }, Network::Bitcoin).expect("zero is set");
        assert_eq!(method, Method::EstimateFee { blocks: 0 });

        assert!(plan(Command::EstimateFee { number: None }, Network::Bitcoin).is_err());
    }

    #[test]
    fn address_commands_derive_script_hash() {
        let (method, _) = plan(
            Command::ScriptHashGetBalance {
                address: "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".into(),
            },
            Network::Bitcoin,
        )
        .expect("valid address");
        let hex = "eafd9bc024177ba93572c1cc3a83f555dadbb81ca94cd9761ef5211ce794cea9";
        let expected: ScriptHash = hex.parse().expect("valid script hash");
        assert_eq!(method, Method::ScriptHashBalance(expected));
    }

    #[test]
    fn map_network_accepts_known_names() {
        assert_eq!(map_network("bitcoin").expect("known"), Network::Bitcoin);
        assert_eq!(map_network("regtest").expect("known"), Network::Regtest);
        assert!(map_network("dogecoin").is_err());
    }

    #[test]
    fn connect_error_adds_refused_hint() {
        let message = format_connect_error("127.0.0.1:60401", "Connection refused (os error 111)");
        assert!(message.contains("hint: nothing is listening"));
    }
}
