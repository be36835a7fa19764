// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Analog-to-digital converter (ATD).
//!
//! 10-bit successive approximation converter with an 8-channel input mux
//! and an 8-entry result FIFO. D-family devices carry two instances,
//! ATD0 at 0x0080 and ATD1 at 0x0120.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const ATD0_BASE: StaticRef<AtdRegisters> =
    unsafe { StaticRef::new(0x0080 as *const AtdRegisters) };
pub const ATD1_BASE: StaticRef<AtdRegisters> =
    unsafe { StaticRef::new(0x0120 as *const AtdRegisters) };

register_structs! {
    pub AtdRegisters {
        /// Control registers 0 and 1, factory test use; 0x00-0x01
        (0x00 => _reserved0),
        /// Control register 2, power and trigger configuration; 0x02
        (0x02 => atdctl2: ReadWrite<u8, ATDCTL2::Register>),
        /// Control register 3, sequence length and freeze; 0x03
        (0x03 => atdctl3: ReadWrite<u8, ATDCTL3::Register>),
        /// Control register 4, resolution and clock prescaler; 0x04
        (0x04 => atdctl4: ReadWrite<u8, ATDCTL4::Register>),
        /// Control register 5, channel select; writing starts a sequence; 0x05
        (0x05 => atdctl5: ReadWrite<u8, ATDCTL5::Register>),
        /// Status register 0; 0x06
        (0x06 => atdstat0: ReadWrite<u8, ATDSTAT0::Register>),
        (0x07 => _reserved1),
        /// Test registers; 0x08-0x09
        (0x08 => _reserved2),
        (0x0A => _reserved3),
        /// Status register 1, per-channel conversion complete flags; 0x0B
        (0x0B => atdstat1: ReadOnly<u8, CCF::Register>),
        (0x0C => _reserved4),
        /// Input enable register, digital input buffer control; 0x0D
        (0x0D => atddien: ReadWrite<u8>),
        (0x0E => _reserved5),
        /// Port data register, raw pin state; 0x0F
        (0x0F => portad: ReadOnly<u8>),
        /// Conversion result registers 0-7; 0x10-0x1F
        (0x10 => atddr: [ReadOnly<u16>; 8]),
        (0x20 => @END),
    }
}

register_bitfields![u8,
    pub ATDCTL2 [
        /// ATD power up
        ADPU OFFSET(7) NUMBITS(1) [],
        /// Fast flag clear, reads of a result clear its CCF
        AFFC OFFSET(6) NUMBITS(1) [],
        /// Power down in wait mode
        AWAI OFFSET(5) NUMBITS(1) [],
        /// External trigger level (1) or edge (0)
        ETRIGLE OFFSET(4) NUMBITS(1) [],
        /// External trigger polarity
        ETRIGP OFFSET(3) NUMBITS(1) [],
        /// External trigger enable
        ETRIGE OFFSET(2) NUMBITS(1) [],
        /// Sequence complete interrupt enable
        ASCIE OFFSET(1) NUMBITS(1) [],
        /// Sequence complete interrupt flag
        ASCIF OFFSET(0) NUMBITS(1) []
    ],
    pub ATDCTL3 [
        /// Conversions per sequence, S8C:S4C:S2C:S1C, 0 means eight
        S8C OFFSET(6) NUMBITS(1) [],
        S4C OFFSET(5) NUMBITS(1) [],
        S2C OFFSET(4) NUMBITS(1) [],
        S1C OFFSET(3) NUMBITS(1) [],
        /// Results land in consecutive result registers
        FIFO OFFSET(2) NUMBITS(1) [],
        /// Behavior in BDM freeze mode
        FRZ OFFSET(0) NUMBITS(2) [
            Continue = 0,
            FinishThenFreeze = 2,
            FreezeImmediately = 3
        ]
    ],
    pub ATDCTL4 [
        /// 8-bit resolution instead of 10-bit
        SRES8 OFFSET(7) NUMBITS(1) [],
        /// Sample time in ATD clock periods
        SMP OFFSET(5) NUMBITS(2) [
            Periods2 = 0,
            Periods4 = 1,
            Periods8 = 2,
            Periods16 = 3
        ],
        /// ATD clock = bus clock / (2 * (PRS + 1))
        PRS OFFSET(0) NUMBITS(5) []
    ],
    pub ATDCTL5 [
        /// Right justified result data
        DJM OFFSET(7) NUMBITS(1) [],
        /// Signed result data
        DSGN OFFSET(6) NUMBITS(1) [],
        /// Continuous conversion sequences
        SCAN OFFSET(5) NUMBITS(1) [],
        /// Sample across channels instead of one channel repeatedly
        MULT OFFSET(4) NUMBITS(1) [],
        /// Input channel select
        CC OFFSET(0) NUMBITS(3) []
    ],
    pub ATDSTAT0 [
        /// Sequence complete flag, cleared by writing 1
        SCF OFFSET(7) NUMBITS(1) [],
        /// External trigger overrun flag
        ETORF OFFSET(5) NUMBITS(1) [],
        /// FIFO overrun flag
        FIFOR OFFSET(4) NUMBITS(1) [],
        /// Conversion counter, result register for the current conversion
        CC OFFSET(0) NUMBITS(3) []
    ],
    pub CCF [
        CCF7 OFFSET(7) NUMBITS(1) [],
        CCF6 OFFSET(6) NUMBITS(1) [],
        CCF5 OFFSET(5) NUMBITS(1) [],
        CCF4 OFFSET(4) NUMBITS(1) [],
        CCF3 OFFSET(3) NUMBITS(1) [],
        CCF2 OFFSET(2) NUMBITS(1) [],
        CCF1 OFFSET(1) NUMBITS(1) [],
        CCF0 OFFSET(0) NUMBITS(1) []
    ],
];

/// Smallest PRS value keeping the ATD clock at or below 2 MHz. The
/// converter needs 500 kHz to 2 MHz; returns `None` when the bus clock
/// is too slow to reach 500 kHz even undivided.
pub fn prescaler_for(bus_khz: u32) -> Option<u8> {
    for prs in 0..=31u32 {
        let atd_khz = bus_khz / (2 * (prs + 1));
        if atd_khz <= 2000 {
            if atd_khz < 500 {
                return None;
            }
            return Some(prs as u8);
        }
    }
    None
}

pub struct Atd {
    registers: StaticRef<AtdRegisters>,
}

impl Atd {
    pub const fn new(registers: StaticRef<AtdRegisters>) -> Atd {
        Atd { registers }
    }

    /// Power the converter and configure it for polled single sequences
    /// of one 10-bit, right justified conversion.
    pub fn enable(&self, bus_khz: u32) -> Result<(), ErrorCode> {
        let prs = prescaler_for(bus_khz).ok_or(ErrorCode::INVAL)?;
        let regs = self.registers;
        regs.atdctl2.write(ATDCTL2::ADPU::SET + ATDCTL2::AFFC::SET);
        regs.atdctl3.write(ATDCTL3::S1C::SET);
        regs.atdctl4
            .write(ATDCTL4::SMP::Periods4 + ATDCTL4::PRS.val(prs));
        Ok(())
    }

    pub fn disable(&self) {
        self.registers.atdctl2.modify(ATDCTL2::ADPU::CLEAR);
    }

    /// Run one conversion on `channel` and busy-wait for the result.
    pub fn sample(&self, channel: u8) -> Result<u16, ErrorCode> {
        if channel > 7 {
            return Err(ErrorCode::INVAL);
        }
        let regs = self.registers;
        if !regs.atdctl2.is_set(ATDCTL2::ADPU) {
            return Err(ErrorCode::OFF);
        }
        regs.atdctl5
            .write(ATDCTL5::DJM::SET + ATDCTL5::CC.val(channel));
        while !regs.atdstat0.is_set(ATDSTAT0::SCF) {}
        Ok(regs.atddr[0].get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<AtdRegisters>(), 0x20);
        assert_eq!(offset_of!(AtdRegisters, atdctl2), 0x02);
        assert_eq!(offset_of!(AtdRegisters, atdstat1), 0x0B);
        assert_eq!(offset_of!(AtdRegisters, portad), 0x0F);
        assert_eq!(offset_of!(AtdRegisters, atddr), 0x10);
        assert_eq!(ATD0_BASE.as_ptr() as usize, 0x0080);
        assert_eq!(ATD1_BASE.as_ptr() as usize, 0x0120);
    }

    #[test]
    fn prescaler_in_range() {
        // 24 MHz bus: /12 gives exactly 2 MHz, PRS = 5.
        assert_eq!(prescaler_for(24_000), Some(5));
        // 8 MHz bus: /4 gives 2 MHz, PRS = 1.
        assert_eq!(prescaler_for(8_000), Some(1));
        // 500 kHz bus: even /2 lands below the minimum ATD clock.
        assert_eq!(prescaler_for(500), None);
    }
}
