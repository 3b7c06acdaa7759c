//! 24C-series serial EEPROM engines
//!
//! # Bus protocol
//!
//! Every transaction starts with the 7-bit device address. A write
//! transaction then carries the two internal address bytes (MSB first)
//! followed by up to one page of payload in a single continuous frame; a
//! read transaction writes the two address bytes, repeated-starts into a
//! read phase, and streams as many bytes as requested while the device
//! auto-increments its internal pointer.
//!
//! # Write cycle
//!
//! After a write frame the device commits the page to nonvolatile storage
//! and NACKs everything on the bus for up to a few milliseconds (t_WC,
//! 5 ms rated for 24C64 parts). The engines detect completion by ack
//! polling: issuing address-only writes until one is acknowledged.

use embedded_hal::i2c::ErrorKind;

use eeprom24_core::geometry::MAX_PAGE_SIZE;

pub mod asynch;
pub mod blocking;

#[cfg(test)]
pub(crate) mod mock;

pub use blocking::SerialEeprom;

/// Write frame buffer size: two address bytes plus one page of payload
pub(crate) const FRAME_LEN: usize = 2 + MAX_PAGE_SIZE as usize;

/// Retry and write-cycle polling parameters
///
/// All caps are explicit so tests can exercise the bounds with a
/// fast-failing bus instead of real timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Attempts per bus transaction before a transient fault becomes fatal
    pub max_attempts: u8,
    /// Ack-poll attempts per write segment before the write cycle is
    /// declared stuck
    pub max_poll_attempts: u16,
    /// Pause between ack polls, in microseconds
    pub poll_interval_us: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            // 64 polls x 100 us comfortably covers the 5 ms rated t_WC
            max_poll_attempts: 64,
            poll_interval_us: 100,
        }
    }
}

/// Whether a bus fault is worth retrying
///
/// No-acknowledge covers both line noise and a device still in its write
/// cycle; arbitration loss is transient by definition. Everything else
/// (bus errors, overruns, HAL-specific faults) fails fast.
pub(crate) fn is_transient<E: embedded_hal::i2c::Error>(err: &E) -> bool {
    matches!(
        err.kind(),
        ErrorKind::NoAcknowledge(_) | ErrorKind::ArbitrationLoss
    )
}
