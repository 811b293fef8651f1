//! Stream framing for chat responses.
//!
//! The wire protocol is SSE-flavored: frames are separated by a blank line,
//! payload lines carry a `data:` prefix, and a literal `[DONE]` payload
//! marks the logical end of the response.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// Prefix of payload-bearing lines within a frame.
const DATA_PREFIX: &str = "data:";

/// Sentinel payload marking the logical end of the stream. Dropped here;
/// it never reaches the decoder.
const DONE_SENTINEL: &str = "[DONE]";

/// Splits an unbounded byte stream into blank-line-delimited frames.
///
/// The carry buffer holds raw bytes so a multi-byte UTF-8 sequence split
/// across reads reassembles before decoding: the frame sequence is
/// identical no matter how the input is chunked.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buf: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every complete frame it finishes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buf.windows(2).position(|w| w == b"\n\n") {
            let frame = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
            self.buf.drain(..pos + 2);
            frames.push(frame);
        }
        frames
    }

    /// End of stream. The protocol terminates every frame with the blank
    /// line, so leftover bytes are a protocol anomaly to warn about, never
    /// data to deliver.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&std::mem::take(&mut self.buf)).into_owned())
    }
}

/// Extract the `data:` payloads from one frame, dropping the `[DONE]`
/// sentinel. Other lines (comments, keepalives) are ignored.
pub fn data_payloads(frame: &str) -> Vec<String> {
    frame
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .map(|payload| payload.trim().to_string())
        .filter(|payload| payload != DONE_SENTINEL)
        .collect()
}

/// Stream adapter: response bytes in, raw frame payloads out.
pub struct PayloadStream<S> {
    inner: S,
    splitter: FrameSplitter,
    pending: VecDeque<String>,
}

impl<S> PayloadStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            splitter: FrameSplitter::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<S, E> Stream for PayloadStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<String, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if let Some(payload) = this.pending.pop_front() {
            return Poll::Ready(Some(Ok(payload)));
        }

        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    for frame in this.splitter.feed(&bytes) {
                        this.pending.extend(data_payloads(&frame));
                    }
                    if let Some(payload) = this.pending.pop_front() {
                        return Poll::Ready(Some(Ok(payload)));
                    }
                    // No complete payload yet, keep polling for more bytes.
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    if let Some(leftover) = this.splitter.finish() {
                        tracing::warn!(
                            bytes = leftover.len(),
                            "stream ended with an unterminated frame, discarding"
                        );
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Create a payload stream from a byte stream.
pub fn payload_stream<S, E>(stream: S) -> PayloadStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    PayloadStream::new(stream)
}
