//! Incremental server-sent-events framing.
//!
//! The assistants API streams SSE frames over a chunked HTTP body. Chunk
//! boundaries fall anywhere, so the decoder buffers raw bytes and yields
//! complete frames as they close (blank line). Only the `event` and `data`
//! fields are used; comment lines and unknown fields are skipped per the
//! SSE spec.

/// One complete server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    event: String,
    data: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of body bytes, returning every frame completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                // Blank line closes the frame.
                if !self.event.is_empty() || !self.data.is_empty() {
                    frames.push(SseFrame {
                        event: std::mem::take(&mut self.event),
                        data: std::mem::take(&mut self.data),
                    });
                }
            } else if let Some(value) = line.strip_prefix("event:") {
                self.event = value.trim_start().to_string();
            } else if let Some(value) = line.strip_prefix("data:") {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value.trim_start());
            }
            // Comments (":...") and unknown fields are ignored.
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_complete_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: thread.message.delta\ndata: {\"x\":1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "thread.message.delta");
        assert_eq!(frames[0].data, "{\"x\":1}");
    }

    #[test]
    fn reassembles_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: done\nda").is_empty());
        let frames = decoder.feed(b"ta: [DONE]\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "done");
        assert_eq!(frames[0].data, "[DONE]");
    }

    #[test]
    fn joins_multi_line_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: first\ndata: second\n\n");
        assert_eq!(frames[0].data, "first\nsecond");
    }

    #[test]
    fn skips_comment_lines() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\n\nevent: e\ndata: d\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "e");
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: e\r\ndata: d\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "d");
    }

    #[test]
    fn yields_multiple_frames_from_one_chunk() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: a\ndata: 1\n\nevent: b\ndata: 2\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].event, "b");
    }
}
