// Server-Sent Events decoding for `streamGenerateContent?alt=sse`.
//
// Network chunks do not line up with events: a `data:` line (or even a
// multi-byte character) can be split across reads. The decoder buffers raw
// bytes and only emits payloads for complete lines.

/// Incremental SSE decoder yielding the payload of each `data:` line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns the payloads of all lines it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        data_payload(&line).into_iter().collect()
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\n', '\r']);
    let payload = line.strip_prefix("data:")?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.is_empty() {
        return None;
    }
    Some(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_events_are_emitted() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: {\"a\":1}\r\n\r\ndata: {\"a\":2}\n\n");
        assert_eq!(out, vec![r#"{"a":1}"#, r#"{"a":2}"#]);
    }

    #[test]
    fn split_lines_wait_for_newline() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"te").is_empty());
        let out = decoder.push(b"xt\":\"hi\"}\n");
        assert_eq!(out, vec![r#"{"text":"hi"}"#]);
    }

    #[test]
    fn multibyte_characters_survive_chunk_boundaries() {
        let bytes = "data: Uchaguzi – mwezi\n".as_bytes();
        // Split inside the three-byte en dash.
        let split = bytes.iter().position(|&b| b == 0xE2).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(decoder.push(&bytes[split..]), vec!["Uchaguzi – mwezi"]);
    }

    #[test]
    fn comments_and_other_fields_are_ignored() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b": keep-alive\nevent: message\nid: 7\ndata: x\n");
        assert_eq!(out, vec!["x"]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), vec!["tail"]);
        assert!(decoder.finish().is_empty());
    }
}
