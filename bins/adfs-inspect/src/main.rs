mod cli;
mod view;

use std::fs;

use adfs_codec::{FeedStoreCodec, RawCodec, expected_response_len};
use adfs_config::{InspectConfig, OutputFormat};
use adfs_types::HeaderMode;
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, DecodeArgs};
use view::{ResponseView, WriteView};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => InspectConfig::load(path)?,
        None => InspectConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = if cli.json {
        OutputFormat::Json
    } else {
        config.output
    };

    match cli.command {
        Command::Decode(args) => decode(&args, config.header_mode, output),
        Command::Query(args) => {
            let query = args.to_query()?;
            let calldata = RawCodec::default().encode_read(&query)?;
            info!(opcode = query.opcode(), bytes = calldata.len(), "built read query");
            println!("0x{}", hex::encode(calldata));
            Ok(())
        }
        Command::Response { query, bytes } => {
            let query = query.to_query()?;
            let bytes = parse_hex(&bytes)?;
            if let Some(expected) =
                expected_response_len(&query).filter(|expected| *expected != bytes.len())
            {
                warn!(expected, actual = bytes.len(), "unexpected response length");
            }
            let response = RawCodec::default().decode_read_response(&query, &bytes)?;
            print(&ResponseView::from(&response), output)
        }
    }
}

fn decode(args: &DecodeArgs, configured: HeaderMode, output: OutputFormat) -> anyhow::Result<()> {
    let raw = match (&args.calldata, &args.file) {
        (Some(calldata), _) => calldata.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?,
        (None, None) => anyhow::bail!("either --calldata or --file is required"),
    };
    let mode = if args.accumulator {
        HeaderMode::Accumulator
    } else {
        configured
    };

    let calldata = parse_hex(&raw)?;
    let decoded = RawCodec::new(mode)
        .decode_write(&calldata)
        .context("calldata is not a valid ADFS write")?;
    info!(
        feeds = decoded.feeds.len(),
        resolved = decoded.resolved().count(),
        issues = decoded.issues.len(),
        "decoded write"
    );
    print(&WriteView::from(&decoded), output)
}

fn parse_hex(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).context("input is not valid hex")
}

fn print<T: Serialize + std::fmt::Debug>(value: &T, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{value:#?}"),
    }
    Ok(())
}
