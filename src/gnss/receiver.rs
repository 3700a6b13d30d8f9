use log::{debug, info, warn};

use super::{GnssError, Positioning, SentenceBuffer};

/// Holds the most recent fix seen on the receiver's byte stream
#[derive(Debug, Default)]
pub struct GnssReceiver {
    sentences: SentenceBuffer,
    latest: Option<Positioning>,
}

impl GnssReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk of receiver output. Returns the fix held afterwards;
    /// a void RMC sentence drops the held fix.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<Positioning> {
        for &byte in bytes {
            let Some(sentence) = self.sentences.feed(byte) else {
                continue;
            };
            debug!("nmea: {}", sentence);

            match Self::parse(sentence) {
                Ok(positioning) => {
                    info!(
                        "Positioning: ({}, {})",
                        positioning.latitude, positioning.longitude
                    );
                    self.latest = Some(positioning);
                }
                Err(GnssError::NoFix) => {
                    debug!("Receiver reports no fix");
                    self.latest = None;
                }
                Err(GnssError::UnsupportedSentence) => {}
                Err(e) => warn!("Dropping NMEA sentence: {}", e),
            }
        }

        self.latest
    }

    pub fn latest(&self) -> Option<Positioning> {
        self.latest
    }

    fn parse(sentence: &str) -> Result<Positioning, GnssError> {
        // `$` + two-letter talker id, then the sentence type
        if sentence.get(3..6) != Some("RMC") {
            return Err(GnssError::UnsupportedSentence);
        }

        nmea::parse_str(sentence)
            .map_err(|e| {
                debug!("NMEA parse error: {:?}", e);
                GnssError::ParseError
            })
            .and_then(Positioning::try_from)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    const FIX: &str = "$GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E*68\r\n";
    const VOID: &str = "$GPRMC,225446,V,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E*7F\r\n";
    const SOUTH: &str = "$GPRMC,081836,A,3751.65,S,14507.36,E,000.0,360.0,130998,011.3,E*62\r\n";

    #[test]
    fn nothing_before_first_fix() {
        let mut receiver = GnssReceiver::new();

        assert!(receiver.feed(VOID.as_bytes()).is_none());
        assert!(receiver.latest().is_none());
    }

    #[test]
    fn fix_split_across_chunks() {
        let mut receiver = GnssReceiver::new();
        let (head, tail) = FIX.split_at(20);

        assert!(receiver.feed(head.as_bytes()).is_none());
        let fix = receiver.feed(tail.as_bytes()).unwrap();

        assert!((fix.latitude - 49.274_166).abs() < 1e-5);
    }

    #[test]
    fn latest_fix_in_chunk_wins() {
        let mut receiver = GnssReceiver::new();

        let fix = receiver.feed(format!("{FIX}{SOUTH}").as_bytes()).unwrap();

        assert!(fix.latitude < 0.0);
        assert_eq!(receiver.latest(), Some(fix));
    }

    #[test]
    fn void_status_clears_fix() {
        let mut receiver = GnssReceiver::new();
        receiver.feed(FIX.as_bytes());

        assert!(receiver.feed(VOID.as_bytes()).is_none());
    }

    #[test]
    fn other_sentences_are_ignored() {
        let mut receiver = GnssReceiver::new();
        receiver.feed(FIX.as_bytes());

        let gsa = "$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39\r\n";
        assert!(receiver.feed(gsa.as_bytes()).is_some());
    }

    #[test]
    fn bad_checksum_keeps_previous_fix() {
        let mut receiver = GnssReceiver::new();
        receiver.feed(FIX.as_bytes());

        let corrupted = SOUTH.replace("*62", "*63");
        let fix = receiver.feed(corrupted.as_bytes()).unwrap();

        assert!(fix.latitude > 0.0);
    }
}
