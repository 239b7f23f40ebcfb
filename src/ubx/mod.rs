//! # UBX Protocol Module
//!
//! Implementation of the u-blox UBX binary protocol layer.
//!
//! This module handles:
//! - Frame reassembly from arbitrary byte chunks with sync-marker scanning
//! - Fletcher-style checksum validation
//! - NAV-POSLLH position decoding
//! - An extensible decoder registry keyed by message class/id

pub mod assembler;
pub mod checksum;
pub mod decoder;
pub mod protocol;
