//! Line-level decoder for `data:`-prefixed server-sent-event streams.

/// Accumulates raw response bytes and yields the payload of every complete
/// `data:` line. Comment lines (`:keep-alive`), blank lines, and lines
/// without the marker are dropped. A partial trailing line stays buffered
/// until the next chunk completes it.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the response body; returns the payloads of every
    /// line this chunk completed, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=end).collect();
            if let Some(data) = data_payload(line.trim_end_matches(['\n', '\r'])) {
                payloads.push(data.to_string());
            }
        }
        payloads
    }
}

fn data_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    if rest.is_empty() { None } else { Some(rest) }
}

#[cfg(test)]
mod tests {
    use super::SseDecoder;

    #[test]
    fn yields_payloads_of_complete_data_lines() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: {\"type\":\"text\"}\ndata: {\"type\":\"done\"}\n");
        assert_eq!(payloads, vec![r#"{"type":"text"}"#, r#"{"type":"done"}"#]);
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":").is_empty());
        assert!(decoder.feed(b"\"done\"").is_empty());
        let payloads = decoder.feed(b"}\n");
        assert_eq!(payloads, vec![r#"{"type":"done"}"#]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: one\r\ndata: two\r\n");
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[test]
    fn skips_comments_blanks_and_unmarked_lines() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b":keep-alive\n\nevent: ping\ndata: kept\n");
        assert_eq!(payloads, vec!["kept"]);
    }

    #[test]
    fn empty_data_lines_are_dropped() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data:\ndata: \n").is_empty());
    }

    #[test]
    fn marker_without_space_is_accepted() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data:{\"type\":\"done\"}\n");
        assert_eq!(payloads, vec![r#"{"type":"done"}"#]);
    }
}
