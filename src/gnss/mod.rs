//! NMEA front-end: frames the receiver's byte stream into sentences and
//! turns RMC sentences into fixes.

mod error;
pub mod positioning;
mod receiver;
mod sentence;

pub use error::GnssError;
pub use positioning::Positioning;
pub use receiver::GnssReceiver;
pub use sentence::SentenceBuffer;
