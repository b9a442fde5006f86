//! Tagged point-to-point message transport.
//!
//! # Framing
//!
//! Every message travels as one frame:
//!
//! ```text
//! ┌────────────────┬──────┬───────────────────┐
//! │ len: u32 (LE)  │ tag  │ payload (len B)   │
//! └────────────────┴──────┴───────────────────┘
//! ```
//!
//! [`write_frame`] / [`read_frame`] work over any `Write` / `Read`, so a
//! socket transport can reuse them.  [`ChannelTransport`] carries the same
//! frames over in-process channels.
//!
//! Delivery between one pair of ranks is reliable and in order; there is no
//! acknowledgement or retry.

use std::fmt;
use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::{PartitionError, PartitionResult};

// ── Tag ───────────────────────────────────────────────────────────────────────

/// Message tag.  A worker receives exactly one message of each, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Rects = 1,
    Edges = 2,
    Paths = 3,
}

impl Tag {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tag {
    type Error = PartitionError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Tag::Rects),
            2 => Ok(Tag::Edges),
            3 => Ok(Tag::Paths),
            other => Err(PartitionError::Transport(format!("unknown message tag {other}"))),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tag::Rects => "RECTS",
            Tag::Edges => "EDGES",
            Tag::Paths => "PATHS",
        })
    }
}

// ── Framing ───────────────────────────────────────────────────────────────────

pub fn write_frame<W: Write>(mut w: W, tag: Tag, payload: &[u8]) -> PartitionResult<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        PartitionError::Encode(format!("{tag} payload of {} bytes exceeds the frame limit", payload.len()))
    })?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(&[tag.as_u8()])?;
    w.write_all(payload)?;
    w.flush()?;
    Ok(())
}

/// Read one frame, returning its raw tag byte and payload.
///
/// The payload buffer grows with the bytes actually received, so a corrupt
/// length prefix cannot force a large allocation.
pub fn read_frame<R: Read>(mut r: R) -> PartitionResult<(u8, Vec<u8>)> {
    let mut len = [0u8; 4];
    r.read_exact(&mut len)?;
    let mut tag = [0u8; 1];
    r.read_exact(&mut tag)?;

    let len = u64::from(u32::from_le_bytes(len));
    let mut payload = Vec::new();
    let got = r.by_ref().take(len).read_to_end(&mut payload)?;
    if got as u64 != len {
        return Err(PartitionError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("frame announced {len} payload bytes but carried {got}"),
        )));
    }
    Ok((tag[0], payload))
}

/// Read one frame and check that it carries `expected`.
pub fn expect_frame<R: Read>(r: R, expected: Tag) -> PartitionResult<Vec<u8>> {
    let (got, payload) = read_frame(r)?;
    if got != expected.as_u8() {
        return Err(PartitionError::UnexpectedTag { expected, got });
    }
    Ok(payload)
}

// ── Transport trait ───────────────────────────────────────────────────────────

/// One rank's endpoint in a fixed-size world of ranks.
pub trait Transport {
    fn rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// Send `payload` to `dest` under `tag`.
    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> PartitionResult<()>;

    /// Block for the next message from `src`; it must carry `tag`.
    fn recv(&self, src: usize, tag: Tag) -> PartitionResult<Vec<u8>>;
}

// ── ChannelTransport ──────────────────────────────────────────────────────────

/// In-process transport: one channel per ordered pair of ranks.
pub struct ChannelTransport {
    rank:    usize,
    outbox:  Vec<Sender<Vec<u8>>>,
    inbox:   Vec<Receiver<Vec<u8>>>,
}

impl ChannelTransport {
    /// Create connected endpoints for ranks `0..size`, in rank order.
    pub fn world(size: usize) -> Vec<ChannelTransport> {
        let mut outboxes: Vec<Vec<Sender<Vec<u8>>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Vec<u8>>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

        for (src, outbox) in outboxes.iter_mut().enumerate() {
            for inbox in inboxes.iter_mut() {
                let (tx, rx) = mpsc::channel();
                outbox.push(tx);
                inbox[src] = Some(rx);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outbox, inbox))| ChannelTransport {
                rank,
                outbox,
                inbox: inbox.into_iter().flatten().collect(),
            })
            .collect()
    }

    fn check_rank(&self, rank: usize) -> PartitionResult<()> {
        if rank < self.outbox.len() {
            Ok(())
        } else {
            Err(PartitionError::RankOutOfRange { rank, size: self.outbox.len() })
        }
    }
}

impl Transport for ChannelTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.outbox.len()
    }

    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> PartitionResult<()> {
        self.check_rank(dest)?;
        let mut frame = Vec::with_capacity(payload.len() + 5);
        write_frame(&mut frame, tag, payload)?;
        self.outbox[dest]
            .send(frame)
            .map_err(|_| PartitionError::Transport(format!("rank {dest} is gone")))?;
        log::debug!("rank {} → rank {dest}: {tag} ({} bytes)", self.rank, payload.len());
        Ok(())
    }

    fn recv(&self, src: usize, tag: Tag) -> PartitionResult<Vec<u8>> {
        self.check_rank(src)?;
        let frame = self.inbox[src]
            .recv()
            .map_err(|_| PartitionError::Transport(format!("rank {src} hung up before sending {tag}")))?;
        let payload = expect_frame(frame.as_slice(), tag)?;
        log::debug!("rank {} ← rank {src}: {tag} ({} bytes)", self.rank, payload.len());
        Ok(payload)
    }
}
