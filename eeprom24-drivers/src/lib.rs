//! EEPROM transaction engine
//!
//! This crate executes the access plans from `eeprom24-core` against a real
//! bus, generic over the `embedded-hal` I2C traits:
//!
//! - [`eeprom::blocking::SerialEeprom`] - blocking engine
//! - [`eeprom::asynch::SerialEeprom`] - async engine (suspends only at
//!   bus-transaction boundaries)
//!
//! The engine owns page segmentation, write-cycle completion polling and
//! bounded retry of transient bus faults. It performs no logging; errors
//! propagate to the caller with the failing device offset attached.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod eeprom;
