// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Multiplexed external bus interface (MEBI).
//!
//! Ports A, B, E and K double as the external address/data bus in expanded
//! modes; in single-chip mode they are general purpose I/O. The data and
//! data direction registers live in the core register space at 0x0000,
//! not in the PIM block with the other ports.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;

pub const MEBI_BASE: StaticRef<MebiRegisters> =
    unsafe { StaticRef::new(0x0000 as *const MebiRegisters) };

register_structs! {
    pub MebiRegisters {
        /// Port A data register; 0x0000
        (0x00 => porta: ReadWrite<u8, PINS::Register>),
        /// Port B data register; 0x0001
        (0x01 => portb: ReadWrite<u8, PINS::Register>),
        /// Port A data direction register; 0x0002
        (0x02 => ddra: ReadWrite<u8, PINS::Register>),
        /// Port B data direction register; 0x0003
        (0x03 => ddrb: ReadWrite<u8, PINS::Register>),
        (0x04 => _reserved0),
        /// Port E data register; 0x0008
        (0x08 => porte: ReadWrite<u8, PORTE::Register>),
        /// Port E data direction register; PE1/PE0 are input only; 0x0009
        (0x09 => ddre: ReadWrite<u8, DDRE::Register>),
        /// Port E assignment register; 0x000A
        (0x0A => pear: ReadWrite<u8, PEAR::Register>),
        /// Mode register; 0x000B
        (0x0B => mode: ReadWrite<u8, MODE::Register>),
        /// Pull-up control register; 0x000C
        (0x0C => pucr: ReadWrite<u8, PUCR::Register>),
        /// Reduced drive of I/O lines; 0x000D
        (0x0D => rdriv: ReadWrite<u8, RDRIV::Register>),
        /// External bus interface control; 0x000E
        (0x0E => ebictl: ReadWrite<u8, EBICTL::Register>),
        (0x0F => _reserved1),
        /// Port K data register; 0x0032
        (0x32 => portk: ReadWrite<u8, PINS::Register>),
        /// Port K data direction register; 0x0033
        (0x33 => ddrk: ReadWrite<u8, PINS::Register>),
        (0x34 => @END),
    }
}

register_bitfields![u8,
    /// Generic per-pin layout shared by the port data and data direction
    /// registers.
    pub PINS [
        P7 OFFSET(7) NUMBITS(1) [],
        P6 OFFSET(6) NUMBITS(1) [],
        P5 OFFSET(5) NUMBITS(1) [],
        P4 OFFSET(4) NUMBITS(1) [],
        P3 OFFSET(3) NUMBITS(1) [],
        P2 OFFSET(2) NUMBITS(1) [],
        P1 OFFSET(1) NUMBITS(1) [],
        P0 OFFSET(0) NUMBITS(1) []
    ],
    pub PORTE [
        PE7 OFFSET(7) NUMBITS(1) [],
        PE6 OFFSET(6) NUMBITS(1) [],
        PE5 OFFSET(5) NUMBITS(1) [],
        PE4 OFFSET(4) NUMBITS(1) [],
        PE3 OFFSET(3) NUMBITS(1) [],
        PE2 OFFSET(2) NUMBITS(1) [],
        /// IRQ pin input
        PE1 OFFSET(1) NUMBITS(1) [],
        /// XIRQ pin input
        PE0 OFFSET(0) NUMBITS(1) []
    ],
    pub DDRE [
        DDRE7 OFFSET(7) NUMBITS(1) [],
        DDRE6 OFFSET(6) NUMBITS(1) [],
        DDRE5 OFFSET(5) NUMBITS(1) [],
        DDRE4 OFFSET(4) NUMBITS(1) [],
        DDRE3 OFFSET(3) NUMBITS(1) [],
        DDRE2 OFFSET(2) NUMBITS(1) []
    ],
    pub PEAR [
        /// No access output enable
        NOACCE OFFSET(7) NUMBITS(1) [],
        /// Pipe status signal output enable
        PIPOE OFFSET(5) NUMBITS(1) [],
        /// No external E clock
        NECLK OFFSET(4) NUMBITS(1) [],
        /// Low strobe output enable
        LSTRE OFFSET(3) NUMBITS(1) [],
        /// Read/write output enable
        RDWE OFFSET(2) NUMBITS(1) []
    ],
    pub MODE [
        /// Mode select, latched from MODC/MODB/MODA pins at reset
        MOD OFFSET(5) NUMBITS(3) [
            SpecialSingleChip = 0,
            EmulationNarrow = 1,
            SpecialTest = 2,
            EmulationWide = 3,
            NormalSingleChip = 4,
            NormalExpandedNarrow = 5,
            PeripheralMode = 6,
            NormalExpandedWide = 7
        ],
        /// Internal visibility of bus activity
        IVIS OFFSET(3) NUMBITS(1) [],
        /// Emulate port K
        EMK OFFSET(1) NUMBITS(1) [],
        /// Emulate port E
        EME OFFSET(0) NUMBITS(1) []
    ],
    pub PUCR [
        PUPKE OFFSET(7) NUMBITS(1) [],
        PUPEE OFFSET(4) NUMBITS(1) [],
        PUPBE OFFSET(1) NUMBITS(1) [],
        PUPAE OFFSET(0) NUMBITS(1) []
    ],
    pub RDRIV [
        RDPK OFFSET(7) NUMBITS(1) [],
        RDPE OFFSET(4) NUMBITS(1) [],
        RDPB OFFSET(1) NUMBITS(1) [],
        RDPA OFFSET(0) NUMBITS(1) []
    ],
    pub EBICTL [
        /// E clock stretches during external accesses
        ESTR OFFSET(0) NUMBITS(1) []
    ],
];

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<MebiRegisters>(), 0x34);
        assert_eq!(offset_of!(MebiRegisters, porta), 0x00);
        assert_eq!(offset_of!(MebiRegisters, porte), 0x08);
        assert_eq!(offset_of!(MebiRegisters, mode), 0x0B);
        assert_eq!(offset_of!(MebiRegisters, portk), 0x32);
        assert_eq!(MEBI_BASE.as_ptr() as usize, 0x0000);
    }

    #[test]
    fn pin_masks_partition_the_byte() {
        let fields = [
            PINS::P0,
            PINS::P1,
            PINS::P2,
            PINS::P3,
            PINS::P4,
            PINS::P5,
            PINS::P6,
            PINS::P7,
        ];
        let mut combined: u8 = 0;
        for field in fields {
            let mask = field.mask << field.shift;
            // Single-bit fields must not overlap each other.
            assert_eq!(combined & mask, 0);
            combined |= mask;
        }
        assert_eq!(combined, 0xFF);
    }
}
