use crate::domain::event::PaymentEvent;
use crate::domain::ports::PaymentStream;
use crate::error::{ForwarderError, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;

/// Incremental decoder for `text/event-stream` frames.
///
/// Frames arrive split across arbitrary chunk boundaries; the decoder
/// buffers until a blank line completes a frame and yields the
/// concatenated `data:` payload of each one.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the payloads of every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let frame: String = self.buffer.drain(..end + 2).collect();
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("data:") {
                    if !data.is_empty() {
                        data.push('\n');
                    }
                    data.push_str(rest.trim_start());
                }
            }
            if !data.is_empty() {
                payloads.push(data);
            }
        }
        payloads
    }
}

/// Adapts a raw event-stream body into a lazy sequence of payment records.
///
/// Horizon brackets the stream with bare `"hello"` / `"byebye"` string
/// frames; only JSON object payloads are records. A payload that fails to
/// deserialize is surfaced as a per-item error so the caller can decide to
/// reopen the stream.
pub fn payment_records<S, E>(upstream: S) -> PaymentStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<ForwarderError> + Send + 'static,
{
    let state = (
        Box::pin(upstream),
        SseDecoder::new(),
        VecDeque::<Result<PaymentEvent>>::new(),
    );
    futures::stream::unfold(state, |(mut upstream, mut decoder, mut ready)| async move {
        loop {
            if let Some(item) = ready.pop_front() {
                return Some((item, (upstream, decoder, ready)));
            }
            match upstream.next().await {
                Some(Ok(chunk)) => {
                    for payload in decoder.feed(&chunk) {
                        if !payload.starts_with('{') {
                            continue;
                        }
                        ready.push_back(
                            serde_json::from_str::<PaymentEvent>(&payload)
                                .map_err(ForwarderError::from),
                        );
                    }
                }
                Some(Err(e)) => return Some((Err(e.into()), (upstream, decoder, ready))),
                None => return None,
            }
        }
    })
    .boxed()
}
