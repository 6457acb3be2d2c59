//! Incremental `text/event-stream` wire-format parser.
//!
//! The HTTP body of an event stream arrives as arbitrary byte chunks;
//! a chunk may end mid-line or mid-frame. [`SseParser`] buffers input
//! across [`push`](SseParser::push) calls and emits complete
//! [`SseFrame`]s as soon as their terminating blank line is seen.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name from the `event:` field, or `"message"` if absent.
    pub event: String,
    /// Concatenated `data:` payload; multi-line data is joined with `\n`.
    pub data: String,
}

/// Stateful parser accumulating chunks into frames.
///
/// Field handling follows the event-stream format: `event:` sets the
/// name of the next frame, `data:` lines accumulate, a line starting
/// with `:` is a comment, other fields (`id:`, `retry:`) are ignored,
/// and a blank line dispatches. A blank line with no accumulated data
/// dispatches nothing.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event_type: Option<String>,
    data_lines: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of body bytes, returning every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop(); // trailing \n
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(frame) = self.handle_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn handle_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None; // comment (often used as keep-alive)
        }

        let (field, value) = match line.split_once(':') {
            Some((field, rest)) => (field, rest.strip_prefix(' ').unwrap_or(rest)),
            // A field name with no colon carries an empty value.
            None => (line, ""),
        };

        match field {
            "event" => self.event_type = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // `id` and `retry` are not used by the job service.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event_type = self.event_type.take();
        if self.data_lines.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data_lines).join("\n");
        Some(SseFrame {
            event: event_type.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(parser: &mut SseParser, input: &str) -> Vec<SseFrame> {
        parser.push(input.as_bytes())
    }

    #[test]
    fn single_frame() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, "event: status\ndata: {\"progress\":10}\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: "status".to_string(),
                data: "{\"progress\":10}".to_string(),
            }]
        );
    }

    #[test]
    fn default_event_name_is_message() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, "data: hello\n\n");
        assert_eq!(frames[0].event, "message");
        assert_eq!(frames[0].data, "hello");
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"event: sta").is_empty());
        assert!(parser.push(b"tus\ndata: {\"progress\"").is_empty());
        let frames = parser.push(b": 50}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "status");
        assert_eq!(frames[0].data, "{\"progress\": 50}");
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        let mut parser = SseParser::new();
        let frames = push_all(
            &mut parser,
            "event: status\ndata: a\n\nevent: result\ndata: b\n\n",
        );
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, "status");
        assert_eq!(frames[1].event, "result");
    }

    #[test]
    fn multi_line_data_joined_with_newline() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, "data: first\ndata: second\n\n");
        assert_eq!(frames[0].data, "first\nsecond");
    }

    #[test]
    fn crlf_line_endings() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, "event: status\r\ndata: x\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "status");
        assert_eq!(frames[0].data, "x");
    }

    #[test]
    fn comments_are_ignored() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, ": keep-alive\n\ndata: real\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "real");
    }

    #[test]
    fn blank_line_without_data_dispatches_nothing() {
        let mut parser = SseParser::new();
        assert!(push_all(&mut parser, "event: status\n\n").is_empty());
        // The event name must not leak into the next frame.
        let frames = push_all(&mut parser, "data: x\n\n");
        assert_eq!(frames[0].event, "message");
    }

    #[test]
    fn value_without_leading_space() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, "data:compact\n\n");
        assert_eq!(frames[0].data, "compact");
    }

    #[test]
    fn unknown_fields_ignored() {
        let mut parser = SseParser::new();
        let frames = push_all(&mut parser, "id: 7\nretry: 1000\ndata: x\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "x");
    }

    #[test]
    fn utf8_split_across_chunks() {
        let mut parser = SseParser::new();
        let input = "data: über\n\n".as_bytes();
        // Split inside the two-byte 'ü' sequence.
        let split = input.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(parser.push(&input[..split]).is_empty());
        let frames = parser.push(&input[split..]);
        assert_eq!(frames[0].data, "über");
    }
}
