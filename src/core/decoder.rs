//! Stateful UTF-8 decoding for chunked response bodies.
//!
//! Transport chunk boundaries are arbitrary, so a multi-byte character may
//! arrive split across two or more reads. [`Utf8StreamDecoder`] holds back an
//! incomplete trailing sequence until the bytes that complete it arrive.
//! Malformed sequences decode to U+FFFD instead of failing the stream.

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk. Bytes belonging to a character that is not yet
    /// complete are carried over to the following call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut decoded = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    decoded.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(invalid_len) => {
                            decoded.push(REPLACEMENT);
                            rest = &after[invalid_len..];
                        }
                        None => {
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }
        decoded
    }

    /// Flush at end of stream. A dangling partial sequence becomes a single
    /// replacement character.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_byte_character_split_at_boundary_decodes_once() {
        let bytes = "café".as_bytes();
        let split = bytes.len() - 1;
        let mut decoder = Utf8StreamDecoder::new();

        let first = decoder.decode(&bytes[..split]);
        assert_eq!(first, "caf");
        assert!(decoder.has_pending());

        let second = decoder.decode(&bytes[split..]);
        assert_eq!(second, "é");
        assert_eq!(format!("{first}{second}"), "café");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn four_byte_character_split_across_three_chunks() {
        let llama = "🦙".as_bytes();
        let mut decoder = Utf8StreamDecoder::new();

        assert_eq!(decoder.decode(&llama[..1]), "");
        assert_eq!(decoder.decode(&llama[1..3]), "");
        assert_eq!(decoder.decode(&llama[3..]), "🦙");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = Utf8StreamDecoder::new();
        let decoded = decoder.decode(b"ok\xFFgo");
        assert_eq!(decoded, "ok\u{FFFD}go");
    }

    #[test]
    fn dangling_sequence_is_flushed_as_replacement() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"end\xE2\x82"), "end");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert!(decoder.finish().is_empty());
    }
}
