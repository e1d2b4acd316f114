//! Incremental decoder for `text/event-stream` bodies.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `message` unless the server named the event.
    pub event: String,
    pub data: String,
}

const DEFAULT_EVENT: &str = "message";

/// Feeds on arbitrary chunks of the response body and yields every event completed by them.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Option<String>,
}

impl SseDecoder {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.drain(..=newline).collect::<Vec<_>>();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            // `id` and `retry` only matter for reconnecting, which the dashboard never does.
            _ => trace!(field, "Ignoring event stream field"),
        }
        None
    }

    /// Blocks without any `data` line are dropped along with their event name.
    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let data = self.data.take()?;
        Some(SseEvent {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(name: &str, data: &str) -> SseEvent {
        SseEvent {
            event: name.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn decodes_named_and_unnamed_events() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"event: update\ndata: {\"key\":\"x\"}\n\ndata: ping\n\n");
        assert_eq!(events, [event("update", "{\"key\":\"x\"}"), event("message", "ping")]);
    }

    #[test]
    fn handles_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"event: upd").is_empty());
        assert!(decoder.feed(b"ate\r\ndata: a\r\n").is_empty());
        assert_eq!(decoder.feed(b"data: b\r\n\r\n"), [event("update", "a\nb")]);
    }

    #[test]
    fn skips_comments_and_blank_keepalives() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b": keepalive\n\n\n").is_empty());
        assert_eq!(decoder.feed(b"id: 7\nretry: 100\nevent: update\ndata\n\n"), [event("update", "")]);
    }

    #[test]
    fn drops_events_without_data() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"event: update\n\n").is_empty());
        // The dropped name does not leak into the next block.
        assert_eq!(decoder.feed(b"data: x\n\n"), [event("message", "x")]);
    }
}
