//! Async EEPROM engine
//!
//! Same state machine as [`blocking`](super::blocking), over
//! [`embedded_hal_async::i2c::I2c`]. The future suspends only between bus
//! transactions - never inside one, since a transaction is atomic on the
//! wire. Dropping the future therefore cancels between transactions: a page
//! whose write frame already completed will still commit inside the device.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use eeprom24_core::{Error, Geometry, Segment, WritePlan};

use super::{is_transient, EngineConfig, FRAME_LEN};

/// Async access engine for one 24C-series EEPROM
///
/// Same exclusivity contract as the blocking engine: one logical call owns
/// the bus handle until it resolves.
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
    /// One bus transaction regardless of length; see the blocking engine
    /// for the full contract.
    pub async fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
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
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) if is_transient(&e) && attempts < self.config.max_attempts => continue,
                Err(e) => return Err(Error::Bus { offset, source: e }),
            }
        }
    }

    /// Write `data` starting at `offset`
    ///
    /// Not transactional across page segments: on failure, or if the future
    /// is dropped mid-call, segments that already completed stay committed.
    pub async fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.check_range(offset, data.len())?;

        for segment in WritePlan::new(&self.geometry, offset, data.len()) {
            let payload = &data[segment.payload_range(offset)];
            self.write_segment(segment, payload).await?;
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

    async fn write_segment(
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
                .await
            {
                Ok(()) => match self.wait_write_cycle().await {
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

    async fn wait_write_cycle(&mut self) -> Result<bool, I2C::Error> {
        for _ in 0..self.config.max_poll_attempts {
            match self.i2c.write(self.geometry.device_address, &[]).await {
                Ok(()) => return Ok(true),
                Err(e) if is_transient(&e) => {
                    self.delay.delay_us(self.config.poll_interval_us).await
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }
}
