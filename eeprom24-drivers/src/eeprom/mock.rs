//! Mock I2C bus with an in-memory EEPROM behind it (test only)
//!
//! Models the device behavior the engine has to get right:
//!
//! - internal address pointer, set by the two word-address bytes
//! - intra-page pointer rollover on writes (with a tripwire flag - a
//!   correct engine never triggers it)
//! - full-array auto-increment on reads
//! - write-cycle busyness: after a data write the next `busy_after_write`
//!   transactions are NACKed (each attempt stands in for elapsed time)
//! - scripted fault injection and a transaction log for verification

use std::collections::VecDeque;

use embedded_hal::i2c::{
    ErrorKind, ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress,
};

use eeprom24_core::Geometry;

/// Faults the mock can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// Device did not acknowledge its address
    Nack,
    /// Arbitration lost to another (imaginary) master
    ArbitrationLoss,
    /// Non-transient bus fault
    General,
}

impl embedded_hal::i2c::Error for MockFault {
    fn kind(&self) -> ErrorKind {
        match self {
            MockFault::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockFault::ArbitrationLoss => ErrorKind::ArbitrationLoss,
            MockFault::General => ErrorKind::Bus,
        }
    }
}

/// One successfully completed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    /// Write transaction; empty payload is an ack poll
    Write(Vec<u8>),
    /// Write-then-read transaction (repeated start)
    WriteRead { command: Vec<u8>, len: usize },
}

/// Mock bus master plus the device model behind it
#[derive(Debug)]
pub struct MockBus {
    geometry: Geometry,
    mem: Vec<u8>,
    pointer: usize,
    busy: u32,
    /// Transactions to NACK after each data write (write-cycle length)
    pub busy_after_write: u32,
    /// Script applied to upcoming transaction starts: `Some` fails the
    /// transaction, `None` lets it through
    pub faults: VecDeque<Option<MockFault>>,
    /// Count of transaction starts, including NACKed/faulted ones
    pub started: usize,
    /// Log of completed transactions
    pub ops: Vec<BusOp>,
    /// Set if a write transaction rolled the pointer over within a page
    pub page_wrapped: bool,
}

impl MockBus {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            mem: vec![0xFF; geometry.capacity as usize],
            pointer: 0,
            busy: 0,
            busy_after_write: 0,
            faults: VecDeque::new(),
            started: 0,
            ops: Vec::new(),
            page_wrapped: false,
        }
    }

    /// Preload device memory directly, bypassing the bus
    pub fn fill(&mut self, offset: usize, data: &[u8]) {
        self.mem[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Device memory contents
    pub fn mem(&self, offset: usize, len: usize) -> &[u8] {
        &self.mem[offset..offset + len]
    }

    /// Fail the next `n` transaction starts with `fault`
    pub fn fail_next(&mut self, n: usize, fault: MockFault) {
        self.faults.extend(std::iter::repeat(Some(fault)).take(n));
    }

    /// Let the next `n` transaction starts through unscripted
    pub fn pass_next(&mut self, n: usize) {
        self.faults.extend(std::iter::repeat(None).take(n));
    }

    /// Completed write frames that carried data (not polls)
    pub fn data_frames(&self) -> Vec<Vec<u8>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Write(bytes) if bytes.len() > 2 => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    fn begin(&mut self, address: u8) -> Result<(), MockFault> {
        self.started += 1;
        assert_eq!(
            address, self.geometry.device_address,
            "transaction addressed to the wrong device"
        );
        if let Some(Some(fault)) = self.faults.pop_front() {
            return Err(fault);
        }
        if self.busy > 0 {
            self.busy -= 1;
            return Err(MockFault::Nack);
        }
        Ok(())
    }

    fn write_phase(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            // Address-only ack poll
            return;
        }
        assert!(
            bytes.len() >= 2,
            "write frame must start with the two word-address bytes"
        );
        let word = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        self.pointer = word % self.mem.len();

        let data = &bytes[2..];
        let page = self.geometry.page_size as usize;
        for (i, &byte) in data.iter().enumerate() {
            self.mem[self.pointer] = byte;
            let page_base = self.pointer - self.pointer % page;
            self.pointer = page_base + (self.pointer % page + 1) % page;
            if self.pointer == page_base && i + 1 < data.len() {
                // The device rolled over inside the page; on real hardware
                // the rest of this frame would overwrite the page start
                self.page_wrapped = true;
            }
        }
        if !data.is_empty() {
            self.busy = self.busy_after_write;
        }
    }

    fn read_phase(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.mem[self.pointer];
            self.pointer = (self.pointer + 1) % self.mem.len();
        }
    }

    fn run(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), MockFault> {
        self.begin(address)?;
        match operations {
            [Operation::Write(bytes)] => {
                self.write_phase(bytes);
                self.ops.push(BusOp::Write(bytes.to_vec()));
            }
            [Operation::Write(command), Operation::Read(buf)] => {
                self.write_phase(command);
                let command = command.to_vec();
                self.read_phase(buf);
                self.ops.push(BusOp::WriteRead {
                    command,
                    len: buf.len(),
                });
            }
            _ => panic!("unexpected transaction shape"),
        }
        Ok(())
    }
}

impl ErrorType for MockBus {
    type Error = MockFault;
}

impl embedded_hal::i2c::I2c for MockBus {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

impl embedded_hal_async::i2c::I2c for MockBus {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

/// No-op delay for tests; poll pacing is modelled by the busy counter
#[derive(Debug, Default)]
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

impl embedded_hal_async::delay::DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_wrap_tripwire_fires_on_oversized_frames() {
        let mut bus = MockBus::new(Geometry::M24C64);
        // 30 bytes starting 4 bytes before a page boundary
        let mut frame = vec![0x00, 28];
        frame.extend_from_slice(&[0xEE; 30]);
        bus.run(0x50, &mut [Operation::Write(&frame)]).unwrap();

        assert!(bus.page_wrapped);
        // The overflow landed back at the start of the same page
        assert_eq!(bus.mem(0, 1)[0], 0xEE);
        assert_eq!(bus.mem(32, 1)[0], 0xFF);
    }

    #[test]
    fn reads_auto_increment_across_pages() {
        let mut bus = MockBus::new(Geometry::M24C64);
        bus.fill(30, &[1, 2, 3, 4]);

        let mut buf = [0; 4];
        bus.run(
            0x50,
            &mut [Operation::Write(&[0x00, 30]), Operation::Read(&mut buf)],
        )
        .unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn busy_window_nacks_then_recovers() {
        let mut bus = MockBus::new(Geometry::M24C64);
        bus.busy_after_write = 1;

        let frame = [0x00, 0x00, 0xAB];
        bus.run(0x50, &mut [Operation::Write(&frame)]).unwrap();
        assert_eq!(
            bus.run(0x50, &mut [Operation::Write(&[])]),
            Err(MockFault::Nack)
        );
        bus.run(0x50, &mut [Operation::Write(&[])]).unwrap();
    }
}
