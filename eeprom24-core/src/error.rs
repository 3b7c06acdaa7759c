//! Driver error taxonomy

/// Errors surfaced by the EEPROM access engine
///
/// `E` is the bus implementation's error type. Validation failures are
/// detected before any bus activity; bus failures are reported only after
/// the engine's internal retry budget is exhausted, and carry the device
/// offset of the failing segment so the caller can retry the logical
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The requested range does not fit the device. Never retried; no bus
    /// traffic was generated.
    OutOfRange {
        /// Requested start offset
        offset: u32,
        /// Requested length in bytes
        len: u32,
        /// Device capacity the request was checked against
        capacity: u32,
    },
    /// A bus transaction failed and the retry budget is spent
    Bus {
        /// Device offset of the failing transaction (segment start for
        /// writes, request start for reads)
        offset: u32,
        /// The underlying bus fault
        source: E,
    },
    /// The device kept NACKing write-cycle polls past the poll budget
    WriteCycleTimeout {
        /// Device offset of the segment whose write cycle never completed
        offset: u32,
    },
}

impl<E> Error<E> {
    /// Device offset the error relates to
    pub fn offset(&self) -> u32 {
        match self {
            Error::OutOfRange { offset, .. } => *offset,
            Error::Bus { offset, .. } => *offset,
            Error::WriteCycleTimeout { offset } => *offset,
        }
    }
}
