//! rpc9k demo
//!
//! Walks the built-in example tree served by the in-process stub:
//! - dial the root namespace
//! - invoke `Example:rpc` with `[1, 2, 3]` and scan the echo
//! - fetch `Example`, then invoke `rpc` on it directly
//! - encode the `Example` envelope and decode it again
//!
//! Reads `rpc9k.yaml` from the working directory when present.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use rpc9k_client::{config, Connector, StubServer};
use rpc9k_core::error::Result;
use rpc9k_core::protocol::Envelope;

const CONFIG_PATH: &str = "rpc9k.yaml";

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = err.code().as_str(), error = %err, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = if Path::new(CONFIG_PATH).exists() {
        config::load_from_file(CONFIG_PATH)?
    } else {
        config::ClientConfig::default()
    };

    let stub = Arc::new(StubServer::example());
    let connector = Connector::from_config(&cfg, stub.clone());

    let root = connector.dial(&cfg.client.root_url).into_result()?;
    tracing::info!(url = %root.url(), kind = %root.envelope().kind(), "dialed");

    let mut output: Vec<i64> = Vec::new();
    root.invoke("Example:rpc", &[1, 2, 3])
        .scan(&mut output)
        .into_result()?;
    println!("Example:rpc -> {output:?}");

    let example = root.fetch("Example").into_result()?;
    println!("fetched {} ({})", example.url(), example.envelope().kind());

    example
        .invoke("rpc", &[4, 5, 6])
        .scan(&mut output)
        .into_result()?;
    println!("rpc -> {output:?}");

    let encoded = example.envelope().to_json_string()?;
    println!("json {encoded}");
    let decoded = Envelope::decode_str(&encoded)?;
    println!("decoded {} routes={:?}", decoded.kind(), decoded.routes());

    tracing::info!(requests = stub.calls(), "done");
    Ok(())
}
