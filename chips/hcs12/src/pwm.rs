// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Pulse-width modulator (PWM).
//!
//! Eight 8-bit channels, concatenable in pairs to four 16-bit channels.
//! Each channel picks one of two prescaled clocks (A or B) or their
//! scaled variants (SA, SB).

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const PWM_BASE: StaticRef<PwmRegisters> =
    unsafe { StaticRef::new(0x00A0 as *const PwmRegisters) };

register_structs! {
    pub PwmRegisters {
        /// PWM enable register; 0x00
        (0x00 => pwme: ReadWrite<u8, CHANNELS::Register>),
        /// PWM polarity register; 0x01
        (0x01 => pwmpol: ReadWrite<u8, CHANNELS::Register>),
        /// PWM clock select register; 0x02
        (0x02 => pwmclk: ReadWrite<u8, CHANNELS::Register>),
        /// PWM prescale clock select register; 0x03
        (0x03 => pwmprclk: ReadWrite<u8, PWMPRCLK::Register>),
        /// PWM center align enable register; 0x04
        (0x04 => pwmcae: ReadWrite<u8, CHANNELS::Register>),
        /// PWM control register; 0x05
        (0x05 => pwmctl: ReadWrite<u8, PWMCTL::Register>),
        /// Test and prescale counter registers; 0x06-0x07
        (0x06 => _reserved0),
        /// PWM scale A register; 0x08
        (0x08 => pwmscla: ReadWrite<u8>),
        /// PWM scale B register; 0x09
        (0x09 => pwmsclb: ReadWrite<u8>),
        /// Scale counter registers; 0x0A-0x0B
        (0x0A => _reserved1),
        /// PWM channel counter registers 0-7; 0x0C-0x13
        (0x0C => pwmcnt: [ReadWrite<u8>; 8]),
        /// PWM channel period registers 0-7; 0x14-0x1B
        (0x14 => pwmper: [ReadWrite<u8>; 8]),
        /// PWM channel duty registers 0-7; 0x1C-0x23
        (0x1C => pwmdty: [ReadWrite<u8>; 8]),
        /// PWM shutdown register; 0x24
        (0x24 => pwmsdn: ReadWrite<u8, PWMSDN::Register>),
        (0x25 => _reserved2),
        (0x28 => @END),
    }
}

register_bitfields![u8,
    /// Per-channel layout shared by PWME, PWMPOL, PWMCLK and PWMCAE.
    pub CHANNELS [
        CH7 OFFSET(7) NUMBITS(1) [],
        CH6 OFFSET(6) NUMBITS(1) [],
        CH5 OFFSET(5) NUMBITS(1) [],
        CH4 OFFSET(4) NUMBITS(1) [],
        CH3 OFFSET(3) NUMBITS(1) [],
        CH2 OFFSET(2) NUMBITS(1) [],
        CH1 OFFSET(1) NUMBITS(1) [],
        CH0 OFFSET(0) NUMBITS(1) []
    ],
    pub PWMPRCLK [
        /// Clock B prescaler, divide the bus clock by 2^PCKB
        PCKB OFFSET(4) NUMBITS(3) [],
        /// Clock A prescaler, divide the bus clock by 2^PCKA
        PCKA OFFSET(0) NUMBITS(3) []
    ],
    pub PWMCTL [
        /// Concatenate channels 6 and 7 into one 16-bit channel
        CON67 OFFSET(7) NUMBITS(1) [],
        CON45 OFFSET(6) NUMBITS(1) [],
        CON23 OFFSET(5) NUMBITS(1) [],
        CON01 OFFSET(4) NUMBITS(1) [],
        /// PWM stops in wait mode
        PSWAI OFFSET(3) NUMBITS(1) [],
        /// PWM freezes in BDM freeze mode
        PFRZ OFFSET(2) NUMBITS(1) []
    ],
    pub PWMSDN [
        /// Shutdown interrupt flag, cleared by writing 1
        PWMIF OFFSET(7) NUMBITS(1) [],
        PWMIE OFFSET(6) NUMBITS(1) [],
        /// Restart the channels at the next period boundary
        PWMRSTRT OFFSET(5) NUMBITS(1) [],
        /// Output level while shut down
        PWMLVL OFFSET(4) NUMBITS(1) [],
        /// Current state of the PWM7 input pin
        PWM7IN OFFSET(2) NUMBITS(1) [],
        /// Active level of the shutdown input
        PWM7INL OFFSET(1) NUMBITS(1) [],
        /// Emergency shutdown via the PWM7 pin
        PWM7ENA OFFSET(0) NUMBITS(1) []
    ],
];

pub struct Pwm {
    registers: StaticRef<PwmRegisters>,
}

impl Pwm {
    pub const fn new(registers: StaticRef<PwmRegisters>) -> Pwm {
        Pwm { registers }
    }

    /// Set the clock A and B prescaler exponents. The channel clock is
    /// the bus clock divided by `2^pcka` (channels using clock A) or
    /// `2^pckb` (channels using clock B).
    pub fn set_prescalers(&self, pcka: u8, pckb: u8) -> Result<(), ErrorCode> {
        if pcka > 7 || pckb > 7 {
            return Err(ErrorCode::INVAL);
        }
        self.registers
            .pwmprclk
            .write(PWMPRCLK::PCKA.val(pcka) + PWMPRCLK::PCKB.val(pckb));
        Ok(())
    }

    /// Program period and duty for `channel` and switch it on. Duty is
    /// in channel clock counts, left aligned, active high.
    pub fn enable_channel(&self, channel: u8, period: u8, duty: u8) -> Result<(), ErrorCode> {
        if channel > 7 {
            return Err(ErrorCode::INVAL);
        }
        if duty > period {
            return Err(ErrorCode::SIZE);
        }
        let regs = self.registers;
        let idx = channel as usize;
        regs.pwmper[idx].set(period);
        regs.pwmdty[idx].set(duty);
        // The counter only resets on a period register change while the
        // channel is disabled; clear it so the first period is full.
        regs.pwmcnt[idx].set(0);
        regs.pwmpol.set(regs.pwmpol.get() | (1 << channel));
        regs.pwme.set(regs.pwme.get() | (1 << channel));
        Ok(())
    }

    pub fn disable_channel(&self, channel: u8) -> Result<(), ErrorCode> {
        if channel > 7 {
            return Err(ErrorCode::INVAL);
        }
        let regs = self.registers;
        regs.pwme.set(regs.pwme.get() & !(1 << channel));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<PwmRegisters>(), 0x28);
        assert_eq!(offset_of!(PwmRegisters, pwmprclk), 0x03);
        assert_eq!(offset_of!(PwmRegisters, pwmscla), 0x08);
        assert_eq!(offset_of!(PwmRegisters, pwmcnt), 0x0C);
        assert_eq!(offset_of!(PwmRegisters, pwmper), 0x14);
        assert_eq!(offset_of!(PwmRegisters, pwmdty), 0x1C);
        assert_eq!(offset_of!(PwmRegisters, pwmsdn), 0x24);
        assert_eq!(PWM_BASE.as_ptr() as usize, 0x00A0);
    }

    #[test]
    fn prescaler_fields_do_not_touch() {
        let a = PWMPRCLK::PCKA.mask << PWMPRCLK::PCKA.shift;
        let b = PWMPRCLK::PCKB.mask << PWMPRCLK::PCKB.shift;
        assert_eq!(a & b, 0);
        assert_eq!(a, 0b0000_0111);
        assert_eq!(b, 0b0111_0000);
    }
}
