//! Boundary to the hardware the tracker drives but does not own.

use core::fmt;

use crate::wire::WakeReason;

/// GPS, accelerometer and battery readings
pub trait Sensors {
    /// Current fix as `(lat, lng)`, `None` while the receiver has none
    fn coordinates(&mut self) -> Option<(f32, f32)>;
    /// Degrees
    fn roll(&mut self) -> f32;
    /// Degrees
    fn pitch(&mut self) -> f32;
    /// Volts
    fn battery_voltage(&mut self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Transmission error
    Transmit,
    /// Reception error
    Receive,
    /// Nothing received before the radio's own deadline
    Timeout,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmit => write!(f, "transmit failed"),
            Self::Receive => write!(f, "receive failed"),
            Self::Timeout => write!(f, "receive timed out"),
        }
    }
}

/// Blocking wide-area radio. Region and frequency are set up by the provider.
pub trait Radio {
    /// Whether the next `send` expects a downlink reply
    fn set_receive_mode(&mut self, enabled: bool);
    fn send(&mut self, payload: &[u8]) -> Result<(), RadioError>;
    /// Block until a reply arrives or the radio gives up; returns its length
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, RadioError>;
}

/// RGB indicator colour, `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb(pub u32);

impl Rgb {
    pub const OFF: Self = Self(0x000000);
    pub const GREEN: Self = Self(0x00ff00);
    pub const BLUE: Self = Self(0x0000ff);
    pub const RED: Self = Self(0xff0000);
    pub const WHITE: Self = Self(0xffffff);
}

/// Board services: time, indicator LED and wake cause
pub trait Platform {
    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
    /// Monotonic milliseconds since boot
    fn uptime_ms(&self) -> u64;
    fn set_led(&mut self, color: Rgb);
    fn wake_reason(&self) -> WakeReason;
}

impl<T: Sensors + ?Sized> Sensors for &mut T {
    fn coordinates(&mut self) -> Option<(f32, f32)> {
        (**self).coordinates()
    }

    fn roll(&mut self) -> f32 {
        (**self).roll()
    }

    fn pitch(&mut self) -> f32 {
        (**self).pitch()
    }

    fn battery_voltage(&mut self) -> f32 {
        (**self).battery_voltage()
    }
}

impl<T: Radio + ?Sized> Radio for &mut T {
    fn set_receive_mode(&mut self, enabled: bool) {
        (**self).set_receive_mode(enabled)
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        (**self).send(payload)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, RadioError> {
        (**self).receive(buf)
    }
}

impl<T: Platform + ?Sized> Platform for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }

    fn uptime_ms(&self) -> u64 {
        (**self).uptime_ms()
    }

    fn set_led(&mut self, color: Rgb) {
        (**self).set_led(color)
    }

    fn wake_reason(&self) -> WakeReason {
        (**self).wake_reason()
    }
}
