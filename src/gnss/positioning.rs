use chrono::NaiveDateTime;
use nmea::sentences::rmc::RmcStatusOfFix;
use nmea::ParseResult;

use super::GnssError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Positioning {
    pub latitude: f64,
    pub longitude: f64,
    /// Present when the sentence carried both date and time
    pub datetime: Option<NaiveDateTime>,
    /// Knots
    pub speed: Option<f32>,
    pub heading: Option<f32>,
}

impl Positioning {
    /// Narrowed to the precision of the uplink record
    pub fn coordinates(&self) -> (f32, f32) {
        (self.latitude as f32, self.longitude as f32)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Positioning {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl TryFrom<ParseResult> for Positioning {
    type Error = GnssError;

    fn try_from(data: ParseResult) -> Result<Self, Self::Error> {
        let ParseResult::RMC(rmc) = data else {
            return Err(GnssError::UnsupportedSentence);
        };

        if rmc.status_of_fix == RmcStatusOfFix::Invalid {
            return Err(GnssError::NoFix);
        }

        let latitude = rmc.lat.ok_or(GnssError::MissingField("latitude"))?;
        let longitude = rmc.lon.ok_or(GnssError::MissingField("longitude"))?;
        let datetime = rmc
            .fix_date
            .zip(rmc.fix_time)
            .map(|(date, time)| date.and_time(time));

        Ok(Positioning {
            latitude,
            longitude,
            datetime,
            speed: rmc.speed_over_ground,
            heading: rmc.true_course,
        })
    }
}
