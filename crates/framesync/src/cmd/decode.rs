use std::fs::File;
use std::io::{Cursor, Read};

use framesync_codec::{
    DecodeStats, FrameDecoder, FrameError, FrameReader, Phase, ReaderConfig, TracingObserver,
};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::hex::parse_hex;
use crate::output::{FramePrinter, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.protocol.load()?;
    let name = args.protocol.name();
    let input = open_input(&args)?;

    let decoder = FrameDecoder::with_observer(config, (TracingObserver, DecodeStats::default()));
    let mut reader = FrameReader::with_decoder(
        input,
        decoder,
        ReaderConfig {
            chunk_size: args.chunk_size,
        },
    );
    let mut printer = FramePrinter::new(format, &name);

    let mut failure = None;
    loop {
        match reader.read_frame() {
            Ok(frame) => {
                printer.print(&frame);
                if args.count.is_some_and(|count| printer.printed() >= count) {
                    break;
                }
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    printer.finish();

    let decoder = reader.decoder();
    let stats = decoder.observer().1;
    tracing::info!(
        protocol = %name,
        frames = stats.frames,
        value_bytes = stats.value_bytes,
        discarded_bytes = stats.discarded_bytes,
        rejected_lengths = stats.rejected_lengths,
        offset = decoder.stream_offset(),
        "decode finished"
    );
    if failure.is_none() && decoder.phase() != Phase::AwaitingTag {
        tracing::warn!(
            phase = ?decoder.phase(),
            value_bytes = decoder.state().value_bytes_collected(),
            "input ended inside a frame"
        );
    }

    match failure {
        Some(err) => Err(frame_error("decode failed", err)),
        None => Ok(SUCCESS),
    }
}

fn open_input(args: &DecodeArgs) -> CliResult<Box<dyn Read>> {
    let mut input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).map_err(|err| io_error(&format!("open {}", path.display()), err))?,
        ),
        None => Box::new(std::io::stdin().lock()),
    };

    if !args.hex {
        return Ok(input);
    }

    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|err| io_error("read hex input", err))?;
    let bytes = parse_hex(&text).map_err(|msg| CliError::usage(format!("hex input: {msg}")))?;
    Ok(Box::new(Cursor::new(bytes)))
}
