//! rosutil: offline RouterOS literal and script tool.
//!
//! Decodes and encodes script literals and assembles parameterised scripts
//! the same way a session would before uploading them.

mod error;
mod json;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ros_script::{decode, encode, escape_text};
use ros_util::{append_script_chunked, ScriptParam, ScriptParams, SessionConfig};
use tracing::{debug, error, info};

use crate::error::{CliError, CliResult};

#[derive(Debug, Parser)]
#[command(name = "rosutil", version, about = "RouterOS script literal tool")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a literal and print it as JSON
    Decode {
        /// Literal text, e.g. '{name="ether1";mtu=1500}'
        literal: String,
    },
    /// Encode JSON as a literal
    Encode {
        /// JSON value, e.g. '{"name":"ether1"}'
        json: String,
    },
    /// Escape text for use inside a quoted literal
    Escape {
        /// Text to escape
        text: String,
    },
    /// Print a script with parameter declarations prepended
    Prepare {
        /// Script source file
        script: PathBuf,

        /// Parameter as name=literal (repeatable)
        #[arg(short, long = "param", value_name = "NAME=LITERAL")]
        params: Vec<String>,

        /// Parameter read from a file as name=path (repeatable)
        #[arg(short, long = "stream", value_name = "NAME=PATH")]
        streams: Vec<String>,

        /// Session configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "rosutil starting");

    if let Err(e) = run(cli.command) {
        error!(error = %e, "rosutil failed");
        eprintln!("rosutil: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Decode { literal } => {
            let value = decode(&literal);
            debug!(kind = value.type_name(), "Decoded literal");
            writeln!(out, "{}", serde_json::to_string_pretty(&json::to_json(&value))?)?;
        }
        Command::Encode { json } => {
            let parsed: serde_json::Value = serde_json::from_str(&json)?;
            writeln!(out, "{}", encode(&json::from_json(&parsed)))?;
        }
        Command::Escape { text } => {
            writeln!(out, "{}", escape_text(text.as_bytes()))?;
        }
        Command::Prepare {
            script,
            params,
            streams,
            config,
        } => {
            let config = match config {
                Some(path) => SessionConfig::load(path)?,
                None => SessionConfig::default(),
            };
            let source = std::fs::read_to_string(&script)?;

            let mut files = Vec::with_capacity(streams.len());
            for spec in &streams {
                let (name, path) = split_param(spec)?;
                debug!(name, path, "Opening streamed parameter");
                files.push((name.to_string(), File::open(path)?));
            }

            let mut script_params = ScriptParams::new();
            for spec in &params {
                let (name, literal) = split_param(spec)?;
                script_params.push(name, ScriptParam::Value(decode(literal)));
            }
            for (name, file) in files.iter_mut() {
                script_params.push(name.as_str(), ScriptParam::Stream(file as &mut dyn Read));
            }

            let written = append_script_chunked(
                &mut out,
                &source,
                &mut script_params,
                config.effective_chunk_size(),
            )?;
            writeln!(out)?;
            info!(bytes = written, "Script prepared");
        }
    }
    Ok(())
}

fn split_param(spec: &str) -> CliResult<(&str, &str)> {
    match spec.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(CliError::InvalidParam(spec.to_string())),
    }
}
