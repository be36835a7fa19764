// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Interrupt module (INT).
//!
//! The S12 core serves interrupts through the vector table at
//! 0xFF80-0xFFFF; this block only holds the IRQ pin configuration, the
//! priority elevation register and the test registers. The block is split
//! across 0x0015-0x0016 and 0x001E-0x001F, interleaved with the MMC.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;

pub const INT_BASE: StaticRef<IntRegisters> =
    unsafe { StaticRef::new(0x0015 as *const IntRegisters) };

register_structs! {
    pub IntRegisters {
        /// Interrupt test control register; 0x0015
        (0x00 => itcr: ReadWrite<u8, ITCR::Register>),
        /// Interrupt test register; 0x0016
        (0x01 => itest: ReadWrite<u8, ITEST::Register>),
        (0x02 => _reserved0),
        /// Interrupt control register; 0x001E
        (0x09 => intcr: ReadWrite<u8, INTCR::Register>),
        /// Highest priority I interrupt; 0x001F
        (0x0A => hprio: ReadWrite<u8, HPRIO::Register>),
        (0x0B => @END),
    }
}

register_bitfields![u8,
    pub ITCR [
        /// Write to the interrupt test registers
        WRTINT OFFSET(4) NUMBITS(1) [],
        /// Test register select
        ADR OFFSET(0) NUMBITS(4) []
    ],
    pub ITEST [
        /// Each bit covers two adjacent vectors in the selected group
        INTE OFFSET(7) NUMBITS(1) [],
        INTC OFFSET(6) NUMBITS(1) [],
        INTA OFFSET(5) NUMBITS(1) [],
        INT8 OFFSET(4) NUMBITS(1) [],
        INT6 OFFSET(3) NUMBITS(1) [],
        INT4 OFFSET(2) NUMBITS(1) [],
        INT2 OFFSET(1) NUMBITS(1) [],
        INT0 OFFSET(0) NUMBITS(1) []
    ],
    pub INTCR [
        /// IRQ pin edge (1) or level (0) sensitivity
        IRQE OFFSET(7) NUMBITS(1) [],
        /// IRQ pin enable
        IRQEN OFFSET(6) NUMBITS(1) []
    ],
    pub HPRIO [
        /// Low byte of the vector promoted to highest I-interrupt priority
        PSEL OFFSET(1) NUMBITS(7) []
    ],
];

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<IntRegisters>(), 0x0B);
        assert_eq!(offset_of!(IntRegisters, itcr), 0x00);
        assert_eq!(offset_of!(IntRegisters, intcr), 0x09);
        assert_eq!(offset_of!(IntRegisters, hprio), 0x0A);
        // Absolute addresses: INTCR at 0x001E, HPRIO at 0x001F.
        assert_eq!(INT_BASE.as_ptr() as usize + 0x09, 0x001E);
    }
}
