use core::fmt;

use heapless::String;

use super::{bytes_from_hex, hex_string, WireError};

pub const SENSOR_REPORT_LEN: usize = 12;
pub const SENSOR_REPORT_HEX_LEN: usize = 2 * SENSOR_REPORT_LEN;

// Wire scaling: roll spans 360 degrees, pitch 180 degrees, battery 5 volts,
// each over 256 steps. Angles are offset so 0 degrees sits at 128.
const ANGLE_OFFSET: f64 = 128.0;
const ROLL_SPAN_DEG: f64 = 360.0;
const PITCH_SPAN_DEG: f64 = 180.0;
const VOLT_SPAN: f64 = 5.0;
const STEPS: f64 = 256.0;

/// What caused the device to resume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeReason {
    PowerOn,
    Accelerometer,
    PushButton,
    Timer,
    IntPin,
    Unknown(u8),
}

impl WakeReason {
    pub fn code(self) -> u8 {
        match self {
            Self::PowerOn => 0,
            Self::Accelerometer => 1,
            Self::PushButton => 2,
            Self::Timer => 4,
            Self::IntPin => 8,
            Self::Unknown(code) => code,
        }
    }
}

impl From<u8> for WakeReason {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::PowerOn,
            1 => Self::Accelerometer,
            2 => Self::PushButton,
            4 => Self::Timer,
            8 => Self::IntPin,
            other => Self::Unknown(other),
        }
    }
}

/// One uplink sample: position, attitude, battery and wake reason.
///
/// Attitude and battery are carried in engineering units here and quantized
/// to a single byte each on the wire, so only values on the 8-bit grid
/// survive a round trip unchanged. Latitude and longitude are sent as-is,
/// including NaN and infinities. `(0.0, 0.0)` is the "no fix" sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReport {
    pub lat: f32,
    pub lng: f32,
    /// Degrees
    pub roll: f32,
    /// Degrees
    pub pitch: f32,
    /// Volts
    pub volt: f32,
    /// Raw wake-reason code
    pub wake: u8,
}

impl SensorReport {
    pub fn to_bytes(&self) -> [u8; SENSOR_REPORT_LEN] {
        let mut bytes = [0u8; SENSOR_REPORT_LEN];

        bytes[0..4].copy_from_slice(&self.lat.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.lng.to_le_bytes());
        bytes[8] = quantize(ANGLE_OFFSET, self.roll, STEPS / ROLL_SPAN_DEG);
        bytes[9] = quantize(ANGLE_OFFSET, self.pitch, STEPS / PITCH_SPAN_DEG);
        bytes[10] = quantize(0.0, self.volt, STEPS / VOLT_SPAN);
        bytes[11] = self.wake;

        bytes
    }

    pub fn from_hex(hex: &str) -> Result<Self, WireError> {
        let bytes: [u8; SENSOR_REPORT_LEN] = bytes_from_hex(hex)?;
        Self::try_from(&bytes[..])
    }

    pub fn to_hex(&self) -> String<SENSOR_REPORT_HEX_LEN> {
        hex_string(&self.to_bytes())
    }

    pub fn wake_reason(&self) -> WakeReason {
        WakeReason::from(self.wake)
    }

    /// Position, unless the report carries the no-fix sentinel
    pub fn fix(&self) -> Option<(f32, f32)> {
        if self.lat == 0.0 && self.lng == 0.0 {
            None
        } else {
            Some((self.lat, self.lng))
        }
    }
}

impl TryFrom<&[u8]> for SensorReport {
    type Error = WireError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: &[u8; SENSOR_REPORT_LEN] = bytes
            .try_into()
            .map_err(|_| WireError::length(SENSOR_REPORT_LEN, bytes.len()))?;

        Ok(Self {
            lat: f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            lng: f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            roll: dequantize(ANGLE_OFFSET, bytes[8], ROLL_SPAN_DEG),
            pitch: dequantize(ANGLE_OFFSET, bytes[9], PITCH_SPAN_DEG),
            volt: dequantize(0.0, bytes[10], VOLT_SPAN),
            wake: bytes[11],
        })
    }
}

impl fmt::Display for SensorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat={} lng={} roll={} pitch={} volt={} wake={:?}",
            self.lat,
            self.lng,
            self.roll,
            self.pitch,
            self.volt,
            self.wake_reason()
        )
    }
}

/// Round half away from zero; the cast saturates out-of-range values and
/// maps NaN to 0.
fn quantize(offset: f64, value: f32, steps_per_unit: f64) -> u8 {
    libm::round(offset + f64::from(value) * steps_per_unit) as u8
}

fn dequantize(offset: f64, wire: u8, span: f64) -> f32 {
    ((f64::from(wire) - offset) * span / STEPS) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Malformed;

    #[test]
    fn zero_report_decodes_to_level_attitude() {
        let report = SensorReport::from_hex("000000000000000080800000").unwrap();

        assert_eq!(
            report,
            SensorReport {
                lat: 0.0,
                lng: 0.0,
                roll: 0.0,
                pitch: 0.0,
                volt: 0.0,
                wake: 0,
            }
        );
        assert_eq!(report.fix(), None);
        assert_eq!(report.wake_reason(), WakeReason::PowerOn);
    }

    #[test]
    fn encodes_known_sample() {
        let report = SensorReport {
            lat: 52.5,
            lng: -1.25,
            roll: 10.0,
            pitch: -20.0,
            volt: 3.7,
            wake: 4,
        };

        assert_eq!(report.to_hex().as_str(), "000052420000a0bf8764bd04");
        assert_eq!(report.fix(), Some((52.5, -1.25)));
    }

    #[test]
    fn wire_form_is_stable_across_round_trips() {
        for quantized in 0u8..=255 {
            let bytes = [
                0x9a, 0x99, 0x51, 0x42, 0x66, 0x66, 0x06, 0xc0, quantized, 255 - quantized,
                quantized, 8,
            ];

            let decoded = decode(&bytes);
            assert_eq!(decoded.to_bytes(), bytes);
            assert_eq!(decode(&decoded.to_bytes()), decoded);
        }
    }

    #[test]
    fn nan_coordinates_pass_through() {
        let mut bytes = [0x80u8; SENSOR_REPORT_LEN];
        bytes[0..4].copy_from_slice(&f32::NAN.to_le_bytes());
        bytes[4..8].copy_from_slice(&f32::INFINITY.to_le_bytes());

        let decoded = decode(&bytes);
        assert!(decoded.lat.is_nan());
        assert_eq!(decoded.lng, f32::INFINITY);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 25/512 V lands exactly on 2.5 steps
        let report = SensorReport {
            volt: 0.048828125,
            ..decode(&[0x80; SENSOR_REPORT_LEN])
        };

        assert_eq!(report.to_bytes()[10], 3);
    }

    #[test]
    fn out_of_range_attitude_saturates() {
        let report = SensorReport {
            lat: 0.0,
            lng: 0.0,
            roll: 400.0,
            pitch: -200.0,
            volt: f32::NAN,
            wake: 0,
        };

        let bytes = report.to_bytes();
        assert_eq!(bytes[8], 255);
        assert_eq!(bytes[9], 0);
        assert_eq!(bytes[10], 0);
    }

    #[test]
    fn rejects_wrong_sizes() {
        for len in [10, 13] {
            let bytes = [0u8; 13];
            assert_eq!(
                SensorReport::try_from(&bytes[..len]),
                Err(WireError::MalformedPayload(Malformed::Length {
                    expected: SENSOR_REPORT_LEN,
                    actual: len
                }))
            );
        }
        assert!(SensorReport::from_hex("0000000000000000808000").is_err());
        assert!(SensorReport::from_hex("00000000000000008080000g").is_err());
    }

    #[test]
    fn unknown_wake_codes_are_kept() {
        let mut bytes = [0x80u8; SENSOR_REPORT_LEN];
        bytes[11] = 3;

        let decoded = decode(&bytes);
        assert_eq!(decoded.wake_reason(), WakeReason::Unknown(3));
        assert_eq!(decoded.wake_reason().code(), 3);
    }

    fn decode(bytes: &[u8]) -> SensorReport {
        SensorReport::try_from(bytes).unwrap()
    }
}
