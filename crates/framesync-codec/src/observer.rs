//! Decode anomaly reporting.
//!
//! The decoder performs no I/O of its own. Everything worth reporting is
//! handed to a [`DecodeObserver`] as a [`DecodeEvent`].

use serde::Serialize;

/// Something the decoder did that a caller may want to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DecodeEvent {
    /// A byte was dropped while searching for a tag.
    ByteDiscarded {
        byte: u8,
        /// Absolute stream offset of the dropped byte.
        offset: u64,
    },
    /// A matched tag was followed by a length outside `0..=capacity`.
    LengthRejected {
        raw: u8,
        length: i64,
        capacity: usize,
        /// Absolute stream offset of the length byte.
        offset: u64,
    },
    /// A complete frame was emitted.
    FrameDecoded {
        length: usize,
        /// Absolute stream offset one past the frame's last byte.
        end_offset: u64,
    },
}

/// Receives decode events.
pub trait DecodeObserver {
    fn on_event(&mut self, event: &DecodeEvent);
}

impl<O: DecodeObserver + ?Sized> DecodeObserver for &mut O {
    fn on_event(&mut self, event: &DecodeEvent) {
        (**self).on_event(event);
    }
}

impl<O: DecodeObserver + ?Sized> DecodeObserver for Box<O> {
    fn on_event(&mut self, event: &DecodeEvent) {
        (**self).on_event(event);
    }
}

/// Fan out to two observers.
impl<A: DecodeObserver, B: DecodeObserver> DecodeObserver for (A, B) {
    fn on_event(&mut self, event: &DecodeEvent) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecodeObserver for NoopObserver {
    fn on_event(&mut self, _event: &DecodeEvent) {}
}

/// Emits events as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn on_event(&mut self, event: &DecodeEvent) {
        match *event {
            DecodeEvent::ByteDiscarded { byte, offset } => {
                tracing::warn!(byte, offset, "unexpected byte discarded");
            }
            DecodeEvent::LengthRejected {
                raw,
                length,
                capacity,
                offset,
            } => {
                tracing::warn!(
                    raw,
                    length,
                    capacity,
                    offset,
                    "frame length out of range, resynchronizing"
                );
            }
            DecodeEvent::FrameDecoded { length, end_offset } => {
                tracing::trace!(length, end_offset, "frame decoded");
            }
        }
    }
}

/// Running counters over decode events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub frames: u64,
    pub value_bytes: u64,
    pub discarded_bytes: u64,
    pub rejected_lengths: u64,
}

impl DecodeObserver for DecodeStats {
    fn on_event(&mut self, event: &DecodeEvent) {
        match event {
            DecodeEvent::ByteDiscarded { .. } => self.discarded_bytes += 1,
            DecodeEvent::LengthRejected { .. } => self.rejected_lengths += 1,
            DecodeEvent::FrameDecoded { length, .. } => {
                self.frames += 1;
                self.value_bytes += *length as u64;
            }
        }
    }
}

/// Records every event in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<DecodeEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DecodeEvent] {
        &self.events
    }

    /// Bytes reported as discarded, in stream order.
    pub fn discarded(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DecodeEvent::ByteDiscarded { byte, .. } => Some(*byte),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DecodeObserver for EventLog {
    fn on_event(&mut self, event: &DecodeEvent) {
        self.events.push(event.clone());
    }
}
