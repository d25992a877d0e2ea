//! Server-Sent Events (SSE) parsing for streaming responses

use crate::ClientError;
use bytes::{Bytes, BytesMut};
use futures::stream::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The data of a single SSE event; `event` and `id` fields are skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub data: String,
}

pin_project! {
    /// A stream that parses SSE events from a byte stream
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        buffer: BytesMut,
    }
}

impl<S, E> SseStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ClientError>,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: BytesMut::new(),
        }
    }
}

/// Position and length of the first blank-line event separator
fn find_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_event(raw: &str) -> Option<SseEvent> {
    let mut data = Vec::new();

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if key == "data" {
            data.push(value);
        }
    }

    if data.is_empty() {
        return None;
    }
    Some(SseEvent {
        data: data.join("\n"),
    })
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ClientError>,
{
    type Item = Result<SseEvent, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            while let Some((pos, len)) = find_boundary(&this.buffer[..]) {
                let raw = this.buffer.split_to(pos + len);
                if let Some(event) = parse_event(&String::from_utf8_lossy(&raw)) {
                    return Poll::Ready(Some(Ok(event)));
                }
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e.into()))),
                Poll::Ready(None) => {
                    // trailing event without a final blank line
                    if !this.buffer.is_empty() {
                        let remaining = this.buffer.split();
                        if let Some(event) = parse_event(&String::from_utf8_lossy(&remaining)) {
                            return Poll::Ready(Some(Ok(event)));
                        }
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Helper function to create an SSE stream from a response
pub fn sse_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<SseEvent, ClientError>> + Send {
    SseStream::new(response.bytes_stream())
}
