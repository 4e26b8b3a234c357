//! `tokio_util::codec` integration.

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, Frame};
use crate::config::DecoderConfig;
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};
use crate::observer::{DecodeObserver, TracingObserver};
use crate::reader::feed_chunk;

/// Frame codec for `FramedRead` / `FramedWrite`.
///
/// Every buffered byte is handed to the decoder on each `decode` call, so the
/// read buffer never holds partial frames; those live in the scanner state.
#[derive(Debug)]
pub struct FrameCodec<O = TracingObserver> {
    decoder: FrameDecoder<O>,
    pending: VecDeque<Result<Frame>>,
}

impl FrameCodec<TracingObserver> {
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_decoder(FrameDecoder::new(config))
    }
}

impl<O: DecodeObserver> FrameCodec<O> {
    pub fn with_decoder(decoder: FrameDecoder<O>) -> Self {
        Self {
            decoder,
            pending: VecDeque::new(),
        }
    }

    pub fn decoder(&self) -> &FrameDecoder<O> {
        &self.decoder
    }

    pub fn into_decoder(self) -> FrameDecoder<O> {
        self.decoder
    }
}

impl<O: DecodeObserver> Decoder for FrameCodec<O> {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if !src.is_empty() {
            let chunk = src.split();
            feed_chunk(&mut self.decoder, &mut self.pending, &chunk);
        }
        self.pending.pop_front().transpose()
    }
}

impl<O: DecodeObserver> Encoder<Frame> for FrameCodec<O> {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        encode_frame(self.decoder.config(), &item.tag, &item.value, dst)
    }
}
