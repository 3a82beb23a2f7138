//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the motor controllers and sensors.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod superstructure;
