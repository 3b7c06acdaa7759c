//! Board-agnostic core logic for the 24C-series EEPROM driver
//!
//! This crate contains everything about the device protocol that does not
//! touch a bus peripheral:
//!
//! - Device geometry (capacity, page size, bus address, clock target)
//! - Access-range validation
//! - Write transaction planning (page-boundary segmentation)
//! - The driver error taxonomy
//!
//! The hardware-facing transaction engine lives in `eeprom24-drivers`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod plan;

// Re-export key types at crate root for convenience
pub use error::Error;
pub use geometry::Geometry;
pub use plan::{Segment, WritePlan};
