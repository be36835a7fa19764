// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Peripheral bindings for the MC9S12DG256 microcontroller.
//!
//! The DG256 is an S12 D-family derivative with 256 KiB of banked
//! flash, 12 KiB RAM, 4 KiB EEPROM and, of the family's peripheral
//! complement, two ATDs, two SCIs, three SPIs, one IIC and the CAN0,
//! CAN1 and CAN4 controllers (the DP256 adds CAN2 and CAN3, the DJ256
//! drops CAN4).
//!
//! The register blocks themselves are shared across the family and live
//! in the `hcs12` crate; this crate pins down which instances exist and
//! where the interrupt vectors sit.

#![no_std]

pub mod interrupts;

pub use hcs12::{ErrorCode, StaticRef};

pub use hcs12::atd::{self, ATD0_BASE, ATD1_BASE};
pub use hcs12::bkp::{self, BKP_BASE};
pub use hcs12::crg::{self, CRG_BASE};
pub use hcs12::ect::{self, ECT_BASE};
pub use hcs12::eeprom::{self, EEPROM_BASE};
pub use hcs12::flash::{self, FLASH_BASE};
pub use hcs12::iic::{self, IIC_BASE};
pub use hcs12::int::{self, INT_BASE};
pub use hcs12::mebi::{self, MEBI_BASE};
pub use hcs12::mmc::{self, MMC_BASE};
pub use hcs12::mscan::{self, CAN0_BASE, CAN1_BASE, CAN4_BASE};
pub use hcs12::pim::{self, PIM_BASE};
pub use hcs12::pwm::{self, PWM_BASE};
pub use hcs12::sci::{self, SCI0_BASE, SCI1_BASE};
pub use hcs12::spi::{self, SPI0_BASE, SPI1_BASE, SPI2_BASE};

/// RAM after reset, relocatable through MMC INITRM.
pub const RAM_BASE: u16 = 0x1000;
pub const RAM_SIZE: u16 = 0x3000;

/// EEPROM after reset; the first 4 KiB overlap the register window and
/// RAM, leaving 0x0400-0x0FFF accessible.
pub const EEPROM_SIZE: u16 = 0x1000;

/// Fixed flash windows in the local map, plus the banked window that
/// PPAGE pages 16 KiB at a time.
pub const FLASH_FIXED_LOW: u16 = 0x4000;
pub const FLASH_PAGED_WINDOW: u16 = 0x8000;
pub const FLASH_PAGED_WINDOW_SIZE: u16 = 0x4000;
pub const FLASH_FIXED_HIGH: u16 = 0xC000;

/// PPAGE values backing the 256 KiB flash.
pub const FLASH_FIRST_PAGE: u8 = 0x30;
pub const FLASH_LAST_PAGE: u8 = 0x3F;

/// High byte of PARTID on the Dx256 derivatives; the low byte carries
/// the mask set revision.
pub const PARTID_FAMILY: u8 = 0x04;

/// True when the PARTID word read from the MMC names a Dx256 device.
pub fn partid_matches(partid: u16) -> bool {
    (partid >> 8) as u8 == PARTID_FAMILY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_map_is_consistent() {
        // RAM ends where the fixed flash begins.
        assert_eq!(RAM_BASE + RAM_SIZE, FLASH_FIXED_LOW);
        // Sixteen 16 KiB pages make up the 256 KiB flash.
        let pages = (FLASH_LAST_PAGE - FLASH_FIRST_PAGE + 1) as u32;
        assert_eq!(pages * FLASH_PAGED_WINDOW_SIZE as u32, 256 * 1024);
    }

    #[test]
    fn partid_family_check() {
        // Mask set revisions 0x0400..0x04FF all name a Dx256 die.
        assert!(partid_matches(0x0400));
        assert!(partid_matches(0x0401));
        assert!(!partid_matches(0x0102));
    }
}
