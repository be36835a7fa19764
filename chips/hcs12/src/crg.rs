// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Clock and reset generator (CRG).
//!
//! The CRG supplies the bus clock, either straight from the external
//! oscillator or from the PLL. `PLLCLK = OSCCLK * (SYNR + 1) / (REFDV + 1)`
//! and the bus clock is half of the selected source, so with `PLLSEL` set
//! the bus clock is `PLLCLK / 2`. Following the convention of the original
//! Freescale tooling, the speeds this module works with are the doubled
//! values (i.e. `SYSCLK`), which keeps the divisor search integral.
//!
//! The CRG also houses the COP watchdog and the real-time interrupt.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;
use crate::ErrorCode;

pub const CRG_BASE: StaticRef<CrgRegisters> =
    unsafe { StaticRef::new(0x0034 as *const CrgRegisters) };

register_structs! {
    pub CrgRegisters {
        /// CRG synthesizer register; 0x0034
        (0x00 => synr: ReadWrite<u8, SYNR::Register>),
        /// CRG reference divider register; 0x0035
        (0x01 => refdv: ReadWrite<u8, REFDV::Register>),
        /// CTFLG test register, unimplemented in normal modes; 0x0036
        (0x02 => _reserved0),
        /// CRG flags register; 0x0037
        (0x03 => crgflg: ReadWrite<u8, CRGFLG::Register>),
        /// CRG interrupt enable register; 0x0038
        (0x04 => crgint: ReadWrite<u8, CRGINT::Register>),
        /// CRG clock select register; 0x0039
        (0x05 => clksel: ReadWrite<u8, CLKSEL::Register>),
        /// CRG PLL control register; 0x003A
        (0x06 => pllctl: ReadWrite<u8, PLLCTL::Register>),
        /// CRG RTI control register; 0x003B
        (0x07 => rtictl: ReadWrite<u8, RTICTL::Register>),
        /// CRG COP control register; 0x003C
        (0x08 => copctl: ReadWrite<u8, COPCTL::Register>),
        /// FORBYP and CTCTL test registers; 0x003D-0x003E
        (0x09 => _reserved1),
        /// CRG COP timer arm/reset register; 0x003F
        (0x0B => armcop: ReadWrite<u8>),
        (0x0C => @END),
    }
}

register_bitfields![u8,
    pub SYNR [
        /// PLL multiplier, PLLCLK = OSCCLK * (SYN + 1) / (REFDV + 1)
        SYN OFFSET(0) NUMBITS(6) []
    ],
    pub REFDV [
        /// Reference divider for the PLL input
        REFDV OFFSET(0) NUMBITS(4) []
    ],
    pub CRGFLG [
        /// Real-time interrupt flag, cleared by writing 1
        RTIF OFFSET(7) NUMBITS(1) [],
        /// Power-on reset flag
        PORF OFFSET(6) NUMBITS(1) [],
        /// PLL lock interrupt flag, cleared by writing 1
        LOCKIF OFFSET(4) NUMBITS(1) [],
        /// PLL lock status
        LOCK OFFSET(3) NUMBITS(1) [],
        /// Track status
        TRACK OFFSET(2) NUMBITS(1) [],
        /// Self clock mode interrupt flag, cleared by writing 1
        SCMIF OFFSET(1) NUMBITS(1) [],
        /// Self clock mode status
        SCM OFFSET(0) NUMBITS(1) []
    ],
    pub CRGINT [
        RTIE OFFSET(7) NUMBITS(1) [],
        LOCKIE OFFSET(4) NUMBITS(1) [],
        SCMIE OFFSET(1) NUMBITS(1) []
    ],
    pub CLKSEL [
        /// Selects PLLCLK (1) or OSCCLK (0) as the SYSCLK source
        PLLSEL OFFSET(7) NUMBITS(1) [],
        /// Pseudo stop: oscillator keeps running in stop mode
        PSTP OFFSET(6) NUMBITS(1) [],
        SYSWAI OFFSET(5) NUMBITS(1) [],
        ROAWAI OFFSET(4) NUMBITS(1) [],
        PLLWAI OFFSET(3) NUMBITS(1) [],
        CWAI OFFSET(2) NUMBITS(1) [],
        RTIWAI OFFSET(1) NUMBITS(1) [],
        COPWAI OFFSET(0) NUMBITS(1) []
    ],
    pub PLLCTL [
        /// Clock monitor enable
        CME OFFSET(7) NUMBITS(1) [],
        /// PLL on
        PLLON OFFSET(6) NUMBITS(1) [],
        /// Automatic bandwidth control
        AUTO OFFSET(5) NUMBITS(1) [],
        /// Acquisition bandwidth (manual mode only)
        ACQ OFFSET(4) NUMBITS(1) [],
        /// RTI enable during pseudo stop
        PRE OFFSET(2) NUMBITS(1) [],
        /// COP enable during pseudo stop
        PCE OFFSET(1) NUMBITS(1) [],
        /// Self clock mode enable
        SCME OFFSET(0) NUMBITS(1) []
    ],
    pub RTICTL [
        /// Merged interrupt rate select, RTR[6:4] prescale with RTR[3:0] modulus
        RTR OFFSET(0) NUMBITS(7) [],
        /// Prescale rate select
        RTR_PRESCALE OFFSET(4) NUMBITS(3) [],
        /// Modulus counter select
        RTR_MODULUS OFFSET(0) NUMBITS(4) []
    ],
    pub COPCTL [
        /// Window COP mode
        WCOP OFFSET(7) NUMBITS(1) [],
        /// COP and RTI stop in active BDM mode
        RSBCK OFFSET(6) NUMBITS(1) [],
        /// COP timeout rate
        CR OFFSET(0) NUMBITS(3) [
            Disabled = 0,
            Rate2Pow14 = 1,
            Rate2Pow16 = 2,
            Rate2Pow18 = 3,
            Rate2Pow20 = 4,
            Rate2Pow22 = 5,
            Rate2Pow23 = 6,
            Rate2Pow24 = 7
        ]
    ],
];

/// First half of the COP arm/reset sequence written to ARMCOP.
const COP_ARM: u8 = 0x55;
/// Second half of the COP arm/reset sequence written to ARMCOP.
const COP_RESET: u8 = 0xAA;

/// Search for synthesizer and reference divider values that produce
/// `system_khz` from `xtal_khz`. The equation is
/// `SYSCLK = OSCCLK * (synr + 1) / (refdv + 1)` with `synr` in 0..=63 and
/// `refdv` in 0..=15. Returns `(synr, refdv)` for the first exact match.
pub fn pll_divisors(xtal_khz: u32, system_khz: u32) -> Option<(u8, u8)> {
    for refdv in 0..=15u8 {
        for synr in 0..=63u8 {
            let speed = xtal_khz * (synr as u32 + 1) / (refdv as u32 + 1);
            if speed == system_khz {
                return Some((synr, refdv));
            }
        }
    }
    None
}

pub struct Crg {
    registers: StaticRef<CrgRegisters>,
}

impl Crg {
    pub const fn new(registers: StaticRef<CrgRegisters>) -> Crg {
        Crg { registers }
    }

    /// Run the system from the PLL at `system_khz`, given the external
    /// oscillator speed. Programs the synthesizer, blocks until the PLL
    /// reports lock and then switches SYSCLK over. Fails with `INVAL` when
    /// no exact divisor pair exists for the requested speed.
    pub fn engage_pll(&self, xtal_khz: u32, system_khz: u32) -> Result<(), ErrorCode> {
        let (synr, refdv) = pll_divisors(xtal_khz, system_khz).ok_or(ErrorCode::INVAL)?;
        let regs = self.registers;

        // Default to the oscillator while the loop frequency changes.
        regs.clksel.modify(CLKSEL::PLLSEL::CLEAR);
        regs.synr.write(SYNR::SYN.val(synr));
        regs.refdv.write(REFDV::REFDV.val(refdv));
        // Reset state already has the PLL on with automatic bandwidth
        // control, but this routine may run again after the PLL was turned
        // off for stop mode.
        regs.pllctl.modify(PLLCTL::PLLON::SET + PLLCTL::AUTO::SET);
        while !regs.crgflg.is_set(CRGFLG::LOCK) {}
        regs.clksel.modify(CLKSEL::PLLSEL::SET);
        Ok(())
    }

    /// Switch SYSCLK back to the external oscillator.
    pub fn select_oscillator(&self) {
        self.registers.clksel.modify(CLKSEL::PLLSEL::CLEAR);
    }

    /// Configure the COP watchdog timeout rate. `Disabled` turns the
    /// watchdog off (only possible until an application locks it).
    pub fn set_cop_rate(&self, rate: COPCTL::CR::Value) {
        self.registers.copctl.write(COPCTL::CR.val(rate as u8));
    }

    /// Service the COP watchdog. Must complete the 0x55/0xAA pair before
    /// the configured timeout elapses.
    pub fn service_cop(&self) {
        self.registers.armcop.set(COP_ARM);
        self.registers.armcop.set(COP_RESET);
    }

    /// True once the PLL has locked onto the programmed frequency.
    pub fn pll_locked(&self) -> bool {
        self.registers.crgflg.is_set(CRGFLG::LOCK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<CrgRegisters>(), 0x0C);
        assert_eq!(offset_of!(CrgRegisters, synr), 0x00);
        assert_eq!(offset_of!(CrgRegisters, crgflg), 0x03);
        assert_eq!(offset_of!(CrgRegisters, clksel), 0x05);
        assert_eq!(offset_of!(CrgRegisters, copctl), 0x08);
        assert_eq!(offset_of!(CrgRegisters, armcop), 0x0B);
        assert_eq!(CRG_BASE.as_ptr() as usize, 0x0034);
    }

    #[test]
    fn rti_rate_merge() {
        // The merged RTR field must cover exactly its two constituent
        // groups, and its shift must be the lowest set bit of the mask.
        let merged = (RTICTL::RTR.mask as u32) << RTICTL::RTR.shift;
        let prescale = (RTICTL::RTR_PRESCALE.mask as u32) << RTICTL::RTR_PRESCALE.shift;
        let modulus = (RTICTL::RTR_MODULUS.mask as u32) << RTICTL::RTR_MODULUS.shift;
        assert_eq!(merged, prescale | modulus);
        assert_eq!(RTICTL::RTR.shift as u32, merged.trailing_zeros());
    }

    #[test]
    fn pll_divisor_search() {
        // Dragon12 board: 16 MHz crystal, 48 MHz SYSCLK (24 MHz bus).
        assert_eq!(pll_divisors(16000, 48000), Some((2, 0)));
        // 4 MHz crystal to 24 MHz SYSCLK.
        assert_eq!(pll_divisors(4000, 24000), Some((5, 0)));
        // Unreachable speed.
        assert_eq!(pll_divisors(16000, 48001), None);
    }
}
