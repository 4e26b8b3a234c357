use clap::{Args, Subcommand};
use std::path::PathBuf;

use framesync_codec::{DecoderConfig, OversizePolicy, Protocol, ProtocolSpec, DEFAULT_CHUNK_SIZE};

use crate::exit::{frame_error, io_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod demo;
pub mod encode;
pub mod protocols;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames from a capture file or stdin.
    Decode(DecodeArgs),
    /// Build a capture from hex frames.
    Encode(EncodeArgs),
    /// Replay the built-in header/value sample.
    Demo(DemoArgs),
    /// List built-in protocol presets.
    Protocols(ProtocolsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Demo(args) => demo::run(args, format),
        Command::Protocols(args) => protocols::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Wire format selection shared by `decode` and `encode`.
#[derive(Args, Debug)]
pub struct ProtocolArgs {
    /// Built-in protocol preset.
    #[arg(
        long,
        short = 'p',
        value_name = "NAME",
        default_value = "header-value",
        conflicts_with = "config"
    )]
    pub protocol: Protocol,
    /// JSON protocol document (see `protocols --spec`).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Stop with an error on an out-of-range length instead of resynchronizing.
    #[arg(long)]
    pub fail_on_oversize: bool,
}

impl ProtocolArgs {
    /// Display name of the selected protocol.
    pub fn name(&self) -> String {
        match &self.config {
            Some(path) => path.display().to_string(),
            None => self.protocol.name().to_string(),
        }
    }

    pub fn load(&self) -> CliResult<DecoderConfig> {
        let config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
                ProtocolSpec::from_json(&text)
                    .and_then(|spec| spec.build())
                    .map_err(|err| frame_error(&format!("load {}", path.display()), err))?
            }
            None => self.protocol.config(),
        };

        if self.fail_on_oversize {
            return Ok(config.with_oversize_policy(OversizePolicy::Fail));
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode. Reads stdin when omitted.
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub protocol: ProtocolArgs,
    /// Bytes handed to the decoder per call.
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = at_least_one()
    )]
    pub chunk_size: usize,
    /// Treat the input as hex text.
    #[arg(long)]
    pub hex: bool,
    /// Exit after printing N frames.
    #[arg(long, value_name = "N", value_parser = at_least_one())]
    pub count: Option<usize>,
}

fn at_least_one() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::new().range(1..)
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub protocol: ProtocolArgs,
    /// Frame as TAG:VALUE hex (repeatable), e.g. `99:04` or `7E:DEADBEEF`.
    #[arg(long = "frame", value_name = "TAG:VALUE", required = true)]
    pub frames: Vec<String>,
    /// Write the capture to FILE instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Emit hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Feed the sample one byte at a time.
    #[arg(long)]
    pub bytewise: bool,
}

#[derive(Args, Debug)]
pub struct ProtocolsArgs {
    /// Print the JSON protocol document for one preset.
    #[arg(long, value_name = "NAME")]
    pub spec: Option<Protocol>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
