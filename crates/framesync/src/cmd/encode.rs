use std::io::Write;

use bytes::BytesMut;
use framesync_codec::{encode_frames, Frame};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::hex::{parse_hex, to_hex};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let config = args.protocol.load()?;
    let frames = args
        .frames
        .iter()
        .map(|arg| parse_frame_arg(arg))
        .collect::<CliResult<Vec<_>>>()?;

    let mut wire = BytesMut::new();
    encode_frames(&config, &frames, &mut wire).map_err(|err| frame_error("encode failed", err))?;
    tracing::debug!(
        frames = frames.len(),
        bytes = wire.len(),
        protocol = %args.protocol.name(),
        "encoded capture"
    );

    let mut data = wire.to_vec();
    if args.hex {
        data = to_hex(&data).into_bytes();
        data.push(b'\n');
    }

    match &args.out {
        Some(path) => std::fs::write(path, &data)
            .map_err(|err| io_error(&format!("write {}", path.display()), err))?,
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(&data)
                .and_then(|()| out.flush())
                .map_err(|err| io_error("write stdout", err))?;
        }
    }

    Ok(SUCCESS)
}

/// Parse `TAG:VALUE`, both hex; the value may be empty.
fn parse_frame_arg(arg: &str) -> CliResult<Frame> {
    let (tag, value) = arg
        .split_once(':')
        .ok_or_else(|| CliError::usage(format!("frame {arg:?}: expected TAG:VALUE")))?;
    let tag = parse_hex(tag).map_err(|msg| CliError::usage(format!("frame {arg:?}: {msg}")))?;
    let value = parse_hex(value).map_err(|msg| CliError::usage(format!("frame {arg:?}: {msg}")))?;
    Ok(Frame::new(tag, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tag_and_value() {
        let frame = parse_frame_arg("DA BB AD 00:01 02").unwrap();
        assert_eq!(frame.tag.as_ref(), &[0xDA, 0xBB, 0xAD, 0x00]);
        assert_eq!(frame.value.as_ref(), &[0x01, 0x02]);
    }

    #[test]
    fn empty_value_is_allowed() {
        let frame = parse_frame_arg("7E:").unwrap();
        assert!(frame.value.is_empty());
    }

    #[test]
    fn missing_separator_is_usage_error() {
        let err = parse_frame_arg("7E01").unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
