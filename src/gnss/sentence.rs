use core::str;
use core::str::Utf8Error;

use log::{debug, warn};

const MAX_NMEA_SENTENCE_SIZE: usize = 128;

type Buffer = [u8; MAX_NMEA_SENTENCE_SIZE];

/// Byte-at-a-time NMEA framer: `$`, body, `*hh`, CR LF
#[derive(Debug)]
pub struct SentenceBuffer {
    cursor: usize,
    buffer: Buffer,

    state: ParseState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for a start-of-sentence marker
    Waiting,

    /// Collecting characters of the sentence
    Collecting,

    /// Past `'*'`; exactly two hex characters follow
    InChecksum { count: usize },

    /// Checksum read, waiting for LF
    Terminating,

    /// Last sentence handed out; the next byte starts over
    Complete,
}

impl Default for SentenceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceBuffer {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            buffer: [0; MAX_NMEA_SENTENCE_SIZE],

            state: ParseState::Waiting,
        }
    }

    /// Returns false and resets when the sentence outgrows the buffer
    fn push_byte(&mut self, byte: u8) -> bool {
        if self.cursor >= self.buffer.len() {
            self.reset("Buffer overflow");
            return false;
        }

        self.buffer[self.cursor] = byte;
        self.cursor += 1;
        true
    }

    pub fn as_string(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.buffer[..self.cursor])
    }

    pub fn feed(&mut self, byte: u8) -> Option<&str> {
        if self.state == ParseState::Complete {
            self.reset("Previous sentence consumed");
        }

        match self.state {
            ParseState::Waiting | ParseState::Complete => {
                if byte == b'$' {
                    self.push_byte(byte);
                    self.state = ParseState::Collecting;
                }
            }

            ParseState::Collecting => match byte {
                b'*' => {
                    if self.push_byte(byte) {
                        self.state = ParseState::InChecksum { count: 0 };
                    }
                }

                b'\r' | b'\n' => {
                    warn!(
                        "Sentence terminated without checksum: {}",
                        self.as_string().unwrap_or("<invalid utf-8>")
                    );
                    self.reset("Sentence terminated without checksum");
                }

                // A new start marker abandons the partial sentence
                b'$' => {
                    self.reset("Start-of-sentence marker inside sentence");
                    self.push_byte(byte);
                    self.state = ParseState::Collecting;
                }

                _ => {
                    self.push_byte(byte);
                }
            },

            ParseState::InChecksum { count } => {
                if !byte.is_ascii_hexdigit() {
                    self.reset("Non-hex checksum digit");
                    return None;
                }
                if !self.push_byte(byte) {
                    return None;
                }

                self.state = if count + 1 == 2 {
                    ParseState::Terminating
                } else {
                    ParseState::InChecksum { count: count + 1 }
                };
            }

            ParseState::Terminating => match byte {
                b'\n' => {
                    self.state = ParseState::Complete;

                    match str::from_utf8(&self.buffer[..self.cursor]) {
                        Ok(sentence) => return Some(sentence),
                        Err(_) => warn!("Invalid UTF-8 in NMEA sentence"),
                    }
                }

                b'\r' => {}

                _ => self.reset("Unexpected byte after checksum"),
            },
        }

        None
    }

    pub fn reset(&mut self, reason: &str) {
        self.cursor = 0;
        self.buffer.fill(0);

        self.state = ParseState::Waiting;

        debug!("Resetting sentence buffer -- {}", reason);
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    const RMC: &str = "$GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E*68";

    fn feed_all(buffer: &mut SentenceBuffer, bytes: &[u8]) -> std::vec::Vec<std::string::String> {
        let mut sentences = std::vec::Vec::new();
        for &byte in bytes {
            if let Some(sentence) = buffer.feed(byte) {
                sentences.push(sentence.into());
            }
        }
        sentences
    }

    #[test]
    fn frames_crlf_terminated_sentence() {
        let mut buffer = SentenceBuffer::new();

        let sentences = feed_all(&mut buffer, format!("noise{RMC}\r\n").as_bytes());

        assert_eq!(sentences, [RMC]);
    }

    #[test]
    fn back_to_back_sentences() {
        let mut buffer = SentenceBuffer::new();

        let sentences = feed_all(&mut buffer, format!("{RMC}\r\n{RMC}\n").as_bytes());

        assert_eq!(sentences, [RMC, RMC]);
    }

    #[test]
    fn missing_checksum_is_dropped() {
        let mut buffer = SentenceBuffer::new();

        let sentences = feed_all(&mut buffer, b"$GPRMC,225446,V,,,,,,,191194,,\r\n");

        assert!(sentences.is_empty());
    }

    #[test]
    fn overflow_resets() {
        let mut buffer = SentenceBuffer::new();
        let mut long = std::string::String::from("$GP");
        long.push_str(&"9".repeat(MAX_NMEA_SENTENCE_SIZE));

        let sentences = feed_all(&mut buffer, format!("{long}*00\r\n{RMC}\r\n").as_bytes());

        assert_eq!(sentences, [RMC]);
    }

    #[test]
    fn restart_marker_abandons_partial() {
        let mut buffer = SentenceBuffer::new();

        let sentences = feed_all(&mut buffer, format!("$GPGSA,A,3{RMC}\r\n").as_bytes());

        assert_eq!(sentences, [RMC]);
    }
}
