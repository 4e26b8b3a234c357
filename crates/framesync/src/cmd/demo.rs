use framesync_codec::{EventLog, FrameDecoder, Protocol, TracingObserver};

use crate::cmd::DemoArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::hex::to_hex;
use crate::output::{FramePrinter, OutputFormat};

/// A header/value capture delivered in two reads; the second read completes
/// the pair left open by the first.
const SAMPLE: [&[u8]; 2] = [
    &[0x99, 0x04, 0x22, 0x39, 0x99, 0x03, 0x99, 0x02, 0x99],
    &[0x01, 0x99, 0x07, 0x99, 0x08],
];

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let protocol = Protocol::HeaderValue;
    let mut decoder =
        FrameDecoder::with_observer(protocol.config(), (TracingObserver, EventLog::new()));
    let mut printer = FramePrinter::new(format, protocol.name());

    for (call, chunk) in SAMPLE.into_iter().enumerate() {
        let pieces: Vec<&[u8]> = if args.bytewise {
            chunk.chunks(1).collect()
        } else {
            vec![chunk]
        };
        for piece in pieces {
            let frames = decoder
                .decode(piece)
                .map_err(|err| frame_error("demo decode failed", err))?;
            for frame in &frames {
                printer.print(frame);
            }
        }
        tracing::debug!(call, input = %to_hex(chunk), phase = ?decoder.phase(), "chunk fed");
    }

    let frames = printer.printed();
    printer.finish();

    let discarded = decoder.observer().1.discarded();
    tracing::info!(
        protocol = protocol.name(),
        frames,
        discarded = %to_hex(&discarded),
        "demo finished"
    );

    Ok(SUCCESS)
}
