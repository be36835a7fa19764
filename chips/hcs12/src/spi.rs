// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Serial peripheral interface (SPI).
//!
//! Three instances on D-family devices. The baud generator divides the
//! bus clock by `(SPPR + 1) * 2^(SPR + 1)`, so the fastest rate is bus/2
//! and the slowest bus/2048.

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const SPI0_BASE: StaticRef<SpiRegisters> =
    unsafe { StaticRef::new(0x00D8 as *const SpiRegisters) };
pub const SPI1_BASE: StaticRef<SpiRegisters> =
    unsafe { StaticRef::new(0x00F0 as *const SpiRegisters) };
pub const SPI2_BASE: StaticRef<SpiRegisters> =
    unsafe { StaticRef::new(0x00F8 as *const SpiRegisters) };

register_structs! {
    pub SpiRegisters {
        /// Control register 1; 0x00
        (0x00 => spicr1: ReadWrite<u8, SPICR1::Register>),
        /// Control register 2; 0x01
        (0x01 => spicr2: ReadWrite<u8, SPICR2::Register>),
        /// Baud rate register; 0x02
        (0x02 => spibr: ReadWrite<u8, SPIBR::Register>),
        /// Status register; 0x03
        (0x03 => spisr: ReadOnly<u8, SPISR::Register>),
        (0x04 => _reserved0),
        /// Data register; 0x05
        (0x05 => spidr: ReadWrite<u8>),
        (0x06 => _reserved1),
        (0x08 => @END),
    }
}

register_bitfields![u8,
    pub SPICR1 [
        /// SPI interrupt enable
        SPIE OFFSET(7) NUMBITS(1) [],
        /// SPI system enable
        SPE OFFSET(6) NUMBITS(1) [],
        /// Transmit empty interrupt enable
        SPTIE OFFSET(5) NUMBITS(1) [],
        /// Master mode
        MSTR OFFSET(4) NUMBITS(1) [],
        /// Clock idles high
        CPOL OFFSET(3) NUMBITS(1) [],
        /// Sample on the second clock edge
        CPHA OFFSET(2) NUMBITS(1) [],
        /// Slave select output enable
        SSOE OFFSET(1) NUMBITS(1) [],
        /// LSB transmitted first
        LSBFE OFFSET(0) NUMBITS(1) []
    ],
    pub SPICR2 [
        /// Mode fault detection enable
        MODFEN OFFSET(4) NUMBITS(1) [],
        /// Bidirectional output enable
        BIDIROE OFFSET(3) NUMBITS(1) [],
        /// SPI stops in wait mode
        SPISWAI OFFSET(1) NUMBITS(1) [],
        /// Single-wire bidirectional mode
        SPC0 OFFSET(0) NUMBITS(1) []
    ],
    pub SPIBR [
        /// Baud rate preselection
        SPPR OFFSET(4) NUMBITS(3) [],
        /// Baud rate selection
        SPR OFFSET(0) NUMBITS(3) []
    ],
    pub SPISR [
        /// Transfer complete flag
        SPIF OFFSET(7) NUMBITS(1) [],
        /// Transmit register empty flag
        SPTEF OFFSET(5) NUMBITS(1) [],
        /// Mode fault flag
        MODF OFFSET(4) NUMBITS(1) []
    ],
];

/// Pick `(SPPR, SPR)` for the fastest SCK at or below `sck_hz`. `None`
/// when even the largest divisor (2048) is still too fast.
pub fn baud_selection(bus_hz: u32, sck_hz: u32) -> Option<(u8, u8)> {
    if sck_hz == 0 {
        return None;
    }
    let mut best: Option<(u8, u8, u32)> = None;
    for sppr in 0..=7u32 {
        for spr in 0..=7u32 {
            let div = (sppr + 1) << (spr + 1);
            let rate = bus_hz / div;
            if rate == 0 || rate > sck_hz {
                continue;
            }
            match best {
                Some((_, _, r)) if r >= rate => {}
                _ => best = Some((sppr as u8, spr as u8, rate)),
            }
        }
    }
    best.map(|(sppr, spr, _)| (sppr, spr))
}

pub struct Spi {
    registers: StaticRef<SpiRegisters>,
}

impl Spi {
    pub const fn new(registers: StaticRef<SpiRegisters>) -> Spi {
        Spi { registers }
    }

    /// Enable master mode at the fastest rate not exceeding `sck_hz`,
    /// mode 0, MSB first, hardware slave select disabled.
    pub fn enable_master(&self, bus_hz: u32, sck_hz: u32) -> Result<(), ErrorCode> {
        let (sppr, spr) = baud_selection(bus_hz, sck_hz).ok_or(ErrorCode::INVAL)?;
        let regs = self.registers;
        regs.spibr.write(SPIBR::SPPR.val(sppr) + SPIBR::SPR.val(spr));
        regs.spicr2.set(0);
        regs.spicr1.write(SPICR1::SPE::SET + SPICR1::MSTR::SET);
        Ok(())
    }

    pub fn disable(&self) {
        self.registers.spicr1.set(0);
    }

    /// Full-duplex byte exchange; spins for the transfer to finish.
    pub fn transfer_byte(&self, byte: u8) -> u8 {
        let regs = self.registers;
        while !regs.spisr.is_set(SPISR::SPTEF) {}
        regs.spidr.set(byte);
        while !regs.spisr.is_set(SPISR::SPIF) {}
        regs.spidr.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<SpiRegisters>(), 0x08);
        assert_eq!(offset_of!(SpiRegisters, spibr), 0x02);
        assert_eq!(offset_of!(SpiRegisters, spisr), 0x03);
        assert_eq!(offset_of!(SpiRegisters, spidr), 0x05);
        assert_eq!(SPI0_BASE.as_ptr() as usize, 0x00D8);
        assert_eq!(SPI1_BASE.as_ptr() as usize, 0x00F0);
        assert_eq!(SPI2_BASE.as_ptr() as usize, 0x00F8);
    }

    #[test]
    fn baud_selection_picks_fastest_fit() {
        // 24 MHz bus, 12 MHz requested: bus/2 fits exactly.
        assert_eq!(baud_selection(24_000_000, 12_000_000), Some((0, 0)));
        // 4 MHz requested: bus/6 = 4 MHz via SPPR=2, SPR=0.
        assert_eq!(baud_selection(24_000_000, 4_000_000), Some((2, 0)));
        // Slower than bus/2048 is unreachable.
        assert_eq!(baud_selection(24_000_000, 1_000), None);
        assert_eq!(baud_selection(24_000_000, 0), None);
    }
}
