//! Blocking EEPROM engine
//!
//! Executes logical read/write requests as a sequence of I2C transactions
//! over [`embedded_hal::i2c::I2c`]. A call returns only once its whole
//! transaction plan, including write-cycle polling, has completed or failed
//! definitively.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use eeprom24_core::{Error, Geometry, Segment, WritePlan};

use super::{is_transient, EngineConfig, FRAME_LEN};

/// Blocking access engine for one 24C-series EEPROM
///
/// Assumes exclusive ownership of the bus handle for the duration of each
/// call; callers running from multiple contexts must serialize access
/// themselves (e.g. behind a mutex owning the engine).
pub struct SerialEeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    geometry: Geometry,
    config: EngineConfig,
    frame: [u8; FRAME_LEN],
}

impl<I2C, D> SerialEeprom<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create an engine for a device with the given geometry
    ///
    /// `geometry` must satisfy [`Geometry::is_valid`]; the delay is used
    /// only to pace write-cycle polls.
    pub fn new(i2c: I2C, delay: D, geometry: Geometry, config: EngineConfig) -> Self {
        debug_assert!(geometry.is_valid());
        Self {
            i2c,
            delay,
            geometry,
            config,
            frame: [0; FRAME_LEN],
        }
    }

    /// Device geometry this engine was built for
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Retry and polling parameters
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Release the bus and delay handles
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Read `buf.len()` bytes starting at `offset`
    ///
    /// One bus transaction regardless of length: the device auto-increments
    /// its internal pointer across page boundaries on reads. The range is
    /// validated before any bus activity; a zero-length read is a no-op.
    pub fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.check_range(offset, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }

        let word = self.geometry.word_address(offset);
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self
                .i2c
                .write_read(self.geometry.device_address, &word, buf)
            {
                Ok(()) => return Ok(()),
                Err(e) if is_transient(&e) && attempts < self.config.max_attempts => continue,
                Err(e) => return Err(Error::Bus { offset, source: e }),
            }
        }
    }

    /// Write `data` starting at `offset`
    ///
    /// The request is split into page-aligned segments, one write
    /// transaction each, with write-cycle ack polling in between. Device
    /// writes are not transactional across segments: if a later segment
    /// fails, earlier segments stay committed and the device holds a mix of
    /// old and new data. The error's offset says where the plan stopped.
    pub fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.check_range(offset, data.len())?;

        for segment in WritePlan::new(&self.geometry, offset, data.len()) {
            let payload = &data[segment.payload_range(offset)];
            self.write_segment(segment, payload)?;
        }
        Ok(())
    }

    fn check_range(&self, offset: u32, len: usize) -> Result<(), Error<I2C::Error>> {
        if self.geometry.contains(offset, len) {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                offset,
                len: len as u32,
                capacity: self.geometry.capacity,
            })
        }
    }

    /// One page segment: address bytes + payload in a single continuous
    /// frame, then poll until the device's write cycle completes.
    ///
    /// A poll-budget exhaustion counts as a failed attempt and re-issues
    /// the whole segment (page writes are idempotent).
    fn write_segment(
        &mut self,
        segment: Segment,
        payload: &[u8],
    ) -> Result<(), Error<I2C::Error>> {
        let frame_len = 2 + payload.len();
        self.frame[..2].copy_from_slice(&self.geometry.word_address(segment.offset));
        self.frame[2..frame_len].copy_from_slice(payload);

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self
                .i2c
                .write(self.geometry.device_address, &self.frame[..frame_len])
            {
                Ok(()) => match self.wait_write_cycle() {
                    Ok(true) => return Ok(()),
                    Ok(false) if attempts < self.config.max_attempts => continue,
                    Ok(false) => {
                        return Err(Error::WriteCycleTimeout {
                            offset: segment.offset,
                        })
                    }
                    Err(e) => {
                        return Err(Error::Bus {
                            offset: segment.offset,
                            source: e,
                        })
                    }
                },
                Err(e) if is_transient(&e) && attempts < self.config.max_attempts => continue,
                Err(e) => {
                    return Err(Error::Bus {
                        offset: segment.offset,
                        source: e,
                    })
                }
            }
        }
    }

    /// Ack-poll the device after a write frame
    ///
    /// Address-only writes until one is acknowledged. Returns `Ok(true)` on
    /// completion, `Ok(false)` when the poll budget runs out, `Err` on a
    /// non-transient bus fault.
    fn wait_write_cycle(&mut self) -> Result<bool, I2C::Error> {
        for _ in 0..self.config.max_poll_attempts {
            match self.i2c.write(self.geometry.device_address, &[]) {
                Ok(()) => return Ok(true),
                Err(e) if is_transient(&e) => {
                    self.delay.delay_us(self.config.poll_interval_us)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }
}
