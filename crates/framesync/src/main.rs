mod cmd;
mod exit;
mod hex;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "framesync",
    version,
    about = "Decode tag/length/value frames from noisy byte streams"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "FRAMESYNC_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "FRAMESYNC_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framesync_codec::Protocol;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "framesync",
            "decode",
            "capture.bin",
            "--protocol",
            "masked-tlv",
            "--chunk-size",
            "3",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.protocol.protocol, Protocol::MaskedTlv);
                assert_eq!(args.chunk_size, 3);
                assert!(args.input.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_protocol_with_config() {
        let err = Cli::try_parse_from([
            "framesync",
            "decode",
            "--protocol",
            "marker-tlv",
            "--config",
            "proto.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_protocol() {
        let err = Cli::try_parse_from(["framesync", "decode", "--protocol", "nope"])
            .expect_err("unknown preset should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn decode_rejects_zero_count_and_chunk_size() {
        for flag in ["--count", "--chunk-size"] {
            let err = Cli::try_parse_from(["framesync", "decode", flag, "0"])
                .expect_err("zero should be rejected");
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{flag}");
        }
        let cli = Cli::try_parse_from(["framesync", "decode", "--count", "1"])
            .expect("one frame is a valid limit");
        assert!(matches!(cli.command, Command::Decode(ref args) if args.count == Some(1)));
    }

    #[test]
    fn encode_requires_frames() {
        let err = Cli::try_parse_from(["framesync", "encode"])
            .expect_err("encode without frames should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["framesync", "protocols", "--format", "json"])
            .expect("global flag should parse");
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Command::Protocols(_)));
    }
}
