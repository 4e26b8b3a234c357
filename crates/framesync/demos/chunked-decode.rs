//! Encode a few frames, bury them in noise, and decode them back through a
//! reader that delivers three bytes per read.
//!
//! Run with:
//!   cargo run --example chunked-decode

use std::io::Cursor;

use framesync::codec::{
    DecodeStats, FrameDecoder, FrameReader, FrameWriter, Protocol, ReaderConfig, SYNC_WORD,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Protocol::SyncWordTlv.config();

    let mut writer = FrameWriter::new(vec![0x13, 0xDA, 0x37], config.clone());
    for payload in [&b"alpha"[..], b"", b"gamma ray"] {
        writer.send(&SYNC_WORD, payload)?;
        writer.get_mut().push(0x00);
    }
    let capture = writer.into_inner();
    eprintln!("capture: {} bytes", capture.len());

    let decoder = FrameDecoder::with_observer(config, DecodeStats::default());
    let mut reader =
        FrameReader::with_decoder(Cursor::new(capture), decoder, ReaderConfig { chunk_size: 3 });

    for frame in reader.by_ref() {
        let frame = frame?;
        eprintln!(
            "frame: {} value bytes: {:?}",
            frame.length(),
            String::from_utf8_lossy(&frame.value)
        );
    }

    let stats = reader.decoder().observer();
    eprintln!(
        "frames={} discarded={} rejected={}",
        stats.frames, stats.discarded_bytes, stats.rejected_lengths
    );
    Ok(())
}
