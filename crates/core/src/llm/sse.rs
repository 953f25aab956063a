/// A decoded server-sent event from a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Line-buffered decoder for `text/event-stream` bodies. Bytes are buffered
/// until a full line arrives, so multi-byte characters split across network
/// chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that had no newline.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let line = std::mem::take(&mut self.buf);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(line);
    let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data == "[DONE]" {
        Some(SseEvent::Done)
    } else if data.is_empty() {
        None
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let body = "data: {\"a\":\"é\"}\n\n: keep-alive\ndata: [DONE]\n".as_bytes();
        let split = body.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut events = decoder.push(&body[..split]);
        assert!(events.is_empty());
        events.extend(decoder.push(&body[split..]));

        assert_eq!(
            events,
            vec![SseEvent::Data("{\"a\":\"é\"}".into()), SseEvent::Done]
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn flushes_a_trailing_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some(SseEvent::Data("tail".into())));
    }
}
