// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Peripheral implementations for the Freescale/NXP HCS12 (S12) MCU family.
//!
//! The S12 D-family devices (MC9S12Dx256) place their peripheral register
//! blocks in the first 1 KiB of the address map. After reset the blocks sit
//! at the addresses given by the `*_BASE` constants in each module; the MMC
//! `INITRG` register can relocate the whole window, which this crate does
//! not model.
//!
//! Reference: MC9S12DT256 Device User Guide, 9S12DT256DGV3/D V03.04.

#![no_std]

pub mod atd;
pub mod bkp;
pub mod crg;
pub mod ect;
pub mod eeprom;
pub mod flash;
pub mod iic;
pub mod int;
pub mod mebi;
pub mod mmc;
pub mod mscan;
pub mod pim;
pub mod pwm;
pub mod sci;
pub mod spi;

mod errorcode;
mod static_ref;

pub use crate::errorcode::ErrorCode;
pub use crate::static_ref::StaticRef;
