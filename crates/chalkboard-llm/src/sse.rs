//! Server-sent event framing shared by the streaming providers

use crate::provider::LlmError;
use futures::StreamExt;

/// One `event:`/`data:` frame. `event` is empty when the server omits it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Split a byte stream into SSE frames. Multiple `data:` lines in one frame
/// are joined with `\n`; frames without data are dropped.
pub(crate) fn sse_events(
    bytes_stream: impl futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl futures::Stream<Item = Result<SseEvent, LlmError>> + Send {
    async_stream::stream! {
        // Raw bytes: a chunk may end in the middle of a UTF-8 sequence.
        let mut buffer: Vec<u8> = Vec::new();

        tokio::pin!(bytes_stream);

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(LlmError::StreamError(e.to_string()));
                    return;
                }
            };

            buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

            while let Some(event_end) = find_frame_end(&buffer) {
                let frame: Vec<u8> = buffer.drain(..event_end + 2).take(event_end).collect();
                match decode_frame(frame) {
                    Ok(Some(event)) => yield Ok(event),
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        match decode_frame(buffer) {
            Ok(Some(event)) => yield Ok(event),
            Ok(None) => {}
            Err(e) => yield Err(e),
        }
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn decode_frame(frame: Vec<u8>) -> Result<Option<SseEvent>, LlmError> {
    let text = String::from_utf8(frame)
        .map_err(|e| LlmError::InvalidResponse(format!("non-UTF-8 event: {}", e)))?;
    Ok(parse_frame(text.trim_end()))
}

fn parse_frame(frame: &str) -> Option<SseEvent> {
    let mut event = String::new();
    let mut data: Vec<&str> = Vec::new();

    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event = rest.trim_start().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            data.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if data.is_empty() {
        return None;
    }
    Some(SseEvent { event, data: data.join("\n") })
}
