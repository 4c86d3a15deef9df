//! ether-ctl — send or receive a single file over TCP.

use anyhow::{bail, Context, Result};
use ether_core::EtherConfig;

mod cmd;
mod console;

fn print_usage(config: &EtherConfig) {
    println!("Usage: ether-ctl [--host <host>] [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  send <file>       Send a file to the receiver at --host:--port");
    println!("  receive [dir]     Wait for one file and store it in dir");
    println!("  probe             Check that --host:--port accepts connections");
    println!("  addrs [--all]     List this machine's IPv4 addresses (--all adds loopback)");
    println!("  config            Show configuration, writing defaults if missing");
    println!();
    println!("Options:");
    println!("  --host <host>   Receiver host (default: {})", config.network.host);
    println!("  --port <port>   Receiver port (default: {})", config.network.port);
    println!();
    println!("Ctrl-C cancels a running transfer. Set RUST_LOG=debug for protocol logs.");
}

/// Parse a TCP port in 1..=65535.
fn parse_port(value: &str) -> Result<u16> {
    let port: u16 = value
        .parse()
        .with_context(|| format!("invalid port {value:?}"))?;
    if port == 0 {
        bail!("port must be between 1 and 65535");
    }
    Ok(port)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = EtherConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        EtherConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                config.network.port =
                    parse_port(args.get(i).context("--port requires a value")?)?;
            }
            "--host" => {
                i += 1;
                let host = args.get(i).context("--host requires a value")?.trim();
                if host.is_empty() {
                    bail!("--host must not be empty");
                }
                config.network.host = host.to_string();
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["send", path] => cmd::send::cmd_send(&config, path).await,
        ["receive"] => cmd::receive::cmd_receive(&config, None).await,
        ["receive", dir] => cmd::receive::cmd_receive(&config, Some(*dir)).await,
        ["probe"] => {
            if !cmd::probe::cmd_probe(&config).await? {
                std::process::exit(2);
            }
            Ok(())
        }
        ["addrs"] => cmd::addrs::cmd_addrs(false, config.network.port).await,
        ["addrs", "--all"] => cmd::addrs::cmd_addrs(true, config.network.port).await,
        ["config"] => cmd::config::cmd_config(&config),
        ["help"] | ["--help"] | ["-h"] | [] => {
            print_usage(&config);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage(&config);
            std::process::exit(1);
        }
    }
}
