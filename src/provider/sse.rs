//! Server-Sent Events parsing for streamed completions
//!
//! A generic line buffer splits the byte stream into `data:` payloads, and a
//! provider-specific [`SseEventParser`] pulls the text delta out of each one.

use bytes::Bytes;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{ProviderError, network_error};

/// Provider-specific JSON extractor
pub trait SseEventParser: Send + Sync {
    /// Extract the text delta from one `data:` payload
    ///
    /// Returns None if the event carries no text or parsing fails.
    fn parse_data(&self, data: &str) -> Option<String>;

    /// Check if this payload signals the end of the stream
    fn is_done(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Line buffer that survives events split across network chunks
///
/// Bytes are buffered raw and decoded one complete line at a time, so a
/// multi-byte character split between chunks is reassembled first.
pub struct SseParser<P: SseEventParser> {
    buffer: Vec<u8>,
    parser: P,
    done: bool,
}

impl<P: SseEventParser> SseParser<P> {
    pub fn new(parser: P) -> Self {
        Self {
            buffer: Vec::new(),
            parser,
            done: false,
        }
    }

    /// Whether the end-of-stream marker has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk of bytes and return the text deltas it completed
    ///
    /// Incomplete trailing lines stay buffered until the next chunk.
    /// Complete lines that are not valid UTF-8 are skipped.
    pub fn parse_chunk(&mut self, bytes: &Bytes) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut results = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            self.handle_line(&line, &mut results);
        }
        results
    }

    /// Process whatever is left in the buffer once the stream ended
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        let mut results = Vec::new();
        self.handle_line(&line, &mut results);
        results
    }

    fn handle_line(&mut self, line: &[u8], results: &mut Vec<String>) {
        let Ok(line) = std::str::from_utf8(line) else {
            log::debug!("Skipping SSE line that is not valid UTF-8");
            return;
        };
        let line = line.trim();
        if self.done || line.is_empty() || line.starts_with("event:") {
            return;
        }

        let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
            return;
        };

        if self.parser.is_done(data) {
            self.done = true;
            return;
        }

        if let Some(text) = self.parser.parse_data(data)
            && !text.is_empty()
        {
            results.push(text);
        }
    }
}

/// Anthropic `content_block_delta` events:
/// `{"type":"content_block_delta","delta":{"text":"..."}}`
pub struct AnthropicEventParser;

impl SseEventParser for AnthropicEventParser {
    fn parse_data(&self, data: &str) -> Option<String> {
        let json: serde_json::Value = serde_json::from_str(data).ok()?;

        if json.get("type")?.as_str()? != "content_block_delta" {
            return None;
        }

        json.get("delta")?
            .get("text")?
            .as_str()
            .map(|s| s.to_string())
    }

    fn is_done(&self, data: &str) -> bool {
        data == "[DONE]" || data.contains("\"type\":\"message_stop\"")
    }
}

/// OpenAI chat completion chunks:
/// `{"choices":[{"delta":{"content":"..."}}]}`
pub struct OpenAiEventParser;

impl SseEventParser for OpenAiEventParser {
    fn parse_data(&self, data: &str) -> Option<String> {
        let json: serde_json::Value = serde_json::from_str(data).ok()?;

        json.get("choices")?
            .get(0)?
            .get("delta")?
            .get("content")?
            .as_str()
            .map(|s| s.to_string())
    }
}

/// Read a streamed response to the end and join its text deltas
///
/// Cancellation is checked between chunks; a cancelled token aborts the
/// read with [`ProviderError::Cancelled`].
pub async fn collect_stream<P: SseEventParser>(
    provider: &str,
    response: reqwest::Response,
    parser: P,
    cancel: &CancellationToken,
) -> Result<String, ProviderError> {
    let mut parser = SseParser::new(parser);
    let mut stream = response.bytes_stream();
    let mut completion = String::new();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for text in parser.parse_chunk(&bytes) {
                    completion.push_str(&text);
                }
                if parser.is_done() {
                    break;
                }
            }
            Some(Err(e)) => return Err(network_error(provider, e)),
            None => {
                for text in parser.finish() {
                    completion.push_str(&text);
                }
                break;
            }
        }
    }

    Ok(completion)
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod sse_tests;
