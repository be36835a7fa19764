// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Module mapping control (MMC).
//!
//! Controls the placement of the internal RAM, EEPROM and register window
//! inside the 64 KiB map, and the PPAGE window used to bank the 16 KiB
//! flash page at 0x8000. The MMC registers are interleaved with the INT
//! module registers in the 0x0010-0x001F range; the gaps here are the INT
//! registers and the factory test registers.

use tock_registers::interfaces::Readable;
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;

pub const MMC_BASE: StaticRef<MmcRegisters> =
    unsafe { StaticRef::new(0x0010 as *const MmcRegisters) };

register_structs! {
    pub MmcRegisters {
        /// Initialization of internal RAM position register; 0x0010
        (0x00 => initrm: ReadWrite<u8, INITRM::Register>),
        /// Initialization of internal registers position register; 0x0011
        (0x01 => initrg: ReadWrite<u8, INITRG::Register>),
        /// Initialization of internal EEPROM position register; 0x0012
        (0x02 => initee: ReadWrite<u8, INITEE::Register>),
        /// Miscellaneous system control register; 0x0013
        (0x03 => misc: ReadWrite<u8, MISC::Register>),
        /// MTST0, INT registers, MTST1; 0x0014-0x0019
        (0x04 => _reserved0),
        /// Part ID register; 0x001A-0x001B
        (0x0A => partid: ReadOnly<u16>),
        /// Memory size register zero; 0x001C
        (0x0C => memsiz0: ReadOnly<u8, MEMSIZ0::Register>),
        /// Memory size register one; 0x001D
        (0x0D => memsiz1: ReadOnly<u8, MEMSIZ1::Register>),
        /// INTCR and HPRIO (INT module); 0x001E-0x001F
        (0x0E => _reserved1),
        /// Program page index register; 0x0030
        (0x20 => ppage: ReadWrite<u8, PPAGE::Register>),
        (0x21 => _reserved2),
        (0x22 => @END),
    }
}

register_bitfields![u8,
    pub INITRM [
        /// RAM position, bits 15:11 of the base address
        RAM OFFSET(3) NUMBITS(5) [],
        /// Align RAM to the high end of its block
        RAMHAL OFFSET(0) NUMBITS(1) []
    ],
    pub INITRG [
        /// Register window position, bits 14:11 of the base address
        REG OFFSET(3) NUMBITS(4) []
    ],
    pub INITEE [
        /// EEPROM position, bits 15:12 of the base address
        EE OFFSET(4) NUMBITS(4) [],
        /// EEPROM enable
        EEON OFFSET(0) NUMBITS(1) []
    ],
    pub MISC [
        /// External access stretch
        EXSTR OFFSET(2) NUMBITS(2) [],
        /// Flash in second half of memory map
        ROMHM OFFSET(1) NUMBITS(1) [],
        /// Flash enable
        ROMON OFFSET(0) NUMBITS(1) []
    ],
    pub MEMSIZ0 [
        /// Allocated register space
        REG_SW OFFSET(7) NUMBITS(1) [],
        /// Allocated EEPROM space
        EEP_SW OFFSET(4) NUMBITS(2) [],
        /// Allocated RAM space
        RAM_SW OFFSET(0) NUMBITS(3) []
    ],
    pub MEMSIZ1 [
        /// Allocated flash/ROM space
        ROM_SW OFFSET(6) NUMBITS(2) [],
        /// Allocated off-chip space
        PAG_SW OFFSET(0) NUMBITS(2) []
    ],
    pub PPAGE [
        /// Program page index for the 0x8000-0xBFFF window
        PIX OFFSET(0) NUMBITS(6) []
    ],
];

/// Read the factory part ID word, used to identify the device derivative
/// and mask set.
pub fn part_id() -> u16 {
    MMC_BASE.partid.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<MmcRegisters>(), 0x22);
        assert_eq!(offset_of!(MmcRegisters, initrm), 0x00);
        // PARTID is a word register: high byte at 0x1A, low byte at 0x1B.
        assert_eq!(offset_of!(MmcRegisters, partid), 0x0A);
        assert_eq!(offset_of!(MmcRegisters, memsiz0), 0x0C);
        assert_eq!(offset_of!(MmcRegisters, ppage), 0x20);
        assert_eq!(MMC_BASE.as_ptr() as usize, 0x0010);
    }
}
