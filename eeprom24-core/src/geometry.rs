//! Device geometry configuration
//!
//! A 24C-series EEPROM is described by four protocol parameters: total
//! capacity, physical page size, 7-bit bus address and the bus clock the
//! part is rated for. The driver takes a [`Geometry`] value at construction
//! instead of compile-time constants, so tests and multi-device setups can
//! use different geometries side by side.

/// Largest physical page this driver supports.
///
/// Bounds the driver's fixed write-frame buffer (2 address bytes + one
/// page of payload).
pub const MAX_PAGE_SIZE: u32 = 32;

/// Direction code the bus master ORs into the address byte for a write
/// phase (datasheet R/W bit = 0). Applied on the wire by the `embedded-hal`
/// implementation; kept here so the datasheet-facing contract stays visible.
pub const REQUEST_WRITE: u8 = 0x00;

/// Direction code for a read phase (datasheet R/W bit = 1).
pub const REQUEST_READ: u8 = 0x01;

/// Protocol parameters of one EEPROM device
///
/// Read-only after construction. Invariant: `capacity` is an exact multiple
/// of `page_size` (see [`Geometry::is_valid`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Total capacity in bytes
    pub capacity: u32,
    /// Physical page size in bytes (largest atomically committed write)
    pub page_size: u32,
    /// 7-bit bus address (datasheet 0xA0 is the 8-bit form with the R/W
    /// bit included; the 7-bit form is 0xA0 >> 1)
    pub device_address: u8,
    /// Bus clock the part is driven at, in Hz
    pub bus_frequency_hz: u32,
}

impl Geometry {
    /// 24C64-class part: 64 Kbit (8 KiB), 32-byte page, address 0xA0 >> 1,
    /// 300 kHz bus clock
    pub const M24C64: Self = Self {
        capacity: 8192,
        page_size: 32,
        device_address: 0xA0 >> 1,
        bus_frequency_hz: 300_000,
    };

    /// Check the geometry invariants
    ///
    /// Capacity must be a non-zero exact multiple of the page size, the
    /// page must fit the driver's frame buffer, the whole array must be
    /// reachable through the two word-address bytes, and the bus address
    /// must fit 7 bits.
    pub const fn is_valid(&self) -> bool {
        self.page_size > 0
            && self.page_size <= MAX_PAGE_SIZE
            && self.capacity > 0
            && self.capacity % self.page_size == 0
            && self.capacity <= 1 << 16
            && self.device_address <= 0x7F
    }

    /// Number of physical pages
    pub const fn page_count(&self) -> u32 {
        self.capacity / self.page_size
    }

    /// Encode a byte offset as the device's two internal address bytes,
    /// most-significant first
    pub const fn word_address(&self, offset: u32) -> [u8; 2] {
        [(offset >> 8) as u8, offset as u8]
    }

    /// Whether `[offset, offset + len)` lies inside the device
    ///
    /// Overflow-safe; a zero-length range at `offset == capacity` is
    /// accepted (it touches no cell).
    pub fn contains(&self, offset: u32, len: usize) -> bool {
        offset as u64 + len as u64 <= self.capacity as u64
    }
}
