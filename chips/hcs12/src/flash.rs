// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Flash controller (FTS).
//!
//! Drives the banked program flash through the command state machine:
//! load address and data, write a command code, then launch it by
//! clearing CBEIF. The state machine clock must be divided down to
//! 150-200 kHz from the oscillator before any command is accepted.
//!
//! On 256K devices the flash is split in banks selected through
//! FCNFG[BKSEL]; the controller registers are shared between banks.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const FLASH_BASE: StaticRef<FlashRegisters> =
    unsafe { StaticRef::new(0x0100 as *const FlashRegisters) };

/// Command codes accepted by FCMD.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum FlashCommand {
    EraseVerify = 0x05,
    ProgramWord = 0x20,
    SectorErase = 0x40,
    MassErase = 0x41,
}

register_structs! {
    pub FlashRegisters {
        /// Clock divider register, writable once after reset; 0x00
        (0x00 => fclkdiv: ReadWrite<u8, FCLKDIV::Register>),
        /// Security register, loaded from the configuration field; 0x01
        (0x01 => fsec: ReadOnly<u8, FSEC::Register>),
        (0x02 => _reserved0),
        /// Configuration register; 0x03
        (0x03 => fcnfg: ReadWrite<u8, FCNFG::Register>),
        /// Protection register; 0x04
        (0x04 => fprot: ReadWrite<u8, FPROT::Register>),
        /// Status register, error flags cleared by writing 1; 0x05
        (0x05 => fstat: ReadWrite<u8, FSTAT::Register>),
        /// Command register; 0x06
        (0x06 => fcmd: ReadWrite<u8, FCMD::Register>),
        (0x07 => _reserved1),
        /// Address buffer registers; 0x08-0x09
        (0x08 => faddr: ReadWrite<u16>),
        /// Data buffer registers; 0x0A-0x0B
        (0x0A => fdata: ReadWrite<u16>),
        (0x0C => _reserved2),
        (0x10 => @END),
    }
}

register_bitfields![u8,
    pub FCLKDIV [
        /// Divider loaded flag, set by the first write
        FDIVLD OFFSET(7) NUMBITS(1) [],
        /// Prescale the oscillator by 8 before FDIV
        PRDIV8 OFFSET(6) NUMBITS(1) [],
        /// Clock divider, FCLK = input / (FDIV + 1)
        FDIV OFFSET(0) NUMBITS(6) []
    ],
    pub FSEC [
        /// Backdoor key access enable
        KEYEN OFFSET(6) NUMBITS(2) [],
        /// Unsecured when SEC == 0b10
        SEC OFFSET(0) NUMBITS(2) []
    ],
    pub FCNFG [
        /// Command buffer empty interrupt enable
        CBEIE OFFSET(7) NUMBITS(1) [],
        /// Command complete interrupt enable
        CCIE OFFSET(6) NUMBITS(1) [],
        /// Backdoor key writes enable
        KEYACC OFFSET(5) NUMBITS(1) [],
        /// Register bank select on multi-bank devices
        BKSEL OFFSET(0) NUMBITS(2) []
    ],
    pub FPROT [
        /// Protection disabled for the unprotected region
        FPOPEN OFFSET(7) NUMBITS(1) [],
        /// Higher address range protection disable
        FPHDIS OFFSET(5) NUMBITS(1) [],
        /// Higher address range size
        FPHS OFFSET(3) NUMBITS(2) [],
        /// Lower address range protection disable
        FPLDIS OFFSET(2) NUMBITS(1) [],
        /// Lower address range size
        FPLS OFFSET(0) NUMBITS(2) []
    ],
    pub FSTAT [
        /// Command buffer empty, write 1 to launch the loaded command
        CBEIF OFFSET(7) NUMBITS(1) [],
        /// Command complete
        CCIF OFFSET(6) NUMBITS(1) [],
        /// Protection violation, cleared by writing 1
        PVIOL OFFSET(5) NUMBITS(1) [],
        /// Access error, cleared by writing 1
        ACCERR OFFSET(4) NUMBITS(1) [],
        /// Erase verify result
        BLANK OFFSET(2) NUMBITS(1) []
    ],
    pub FCMD [
        CMDB OFFSET(0) NUMBITS(7) []
    ],
];

/// FCLKDIV value putting the state machine clock in its 150-200 kHz
/// window, or `None` when no divider setting lands there. Oscillators
/// above 12.8 MHz need the /8 prescaler first.
pub fn clock_divider(osc_hz: u32) -> Option<(bool, u8)> {
    let (prdiv8, input) = if osc_hz > 12_800_000 {
        (true, osc_hz / 8)
    } else {
        (false, osc_hz)
    };
    for fdiv in 0..=63u32 {
        let fclk = input / (fdiv + 1);
        if fclk <= 200_000 {
            if fclk < 150_000 {
                return None;
            }
            return Some((prdiv8, fdiv as u8));
        }
    }
    None
}

pub struct Flash {
    registers: StaticRef<FlashRegisters>,
}

impl Flash {
    pub const fn new(registers: StaticRef<FlashRegisters>) -> Flash {
        Flash { registers }
    }

    /// Program the command clock divider. Must happen once before the
    /// first command; FCLKDIV only accepts its first write after reset.
    pub fn init(&self, osc_hz: u32) -> Result<(), ErrorCode> {
        let (prdiv8, fdiv) = clock_divider(osc_hz).ok_or(ErrorCode::INVAL)?;
        let mut setting = FCLKDIV::FDIV.val(fdiv);
        if prdiv8 {
            setting += FCLKDIV::PRDIV8::SET;
        }
        self.registers.fclkdiv.write(setting);
        if !self.registers.fclkdiv.is_set(FCLKDIV::FDIVLD) {
            return Err(ErrorCode::FAIL);
        }
        Ok(())
    }

    /// Select the register bank commands apply to.
    pub fn select_bank(&self, bank: u8) -> Result<(), ErrorCode> {
        if bank > 3 {
            return Err(ErrorCode::INVAL);
        }
        self.registers.fcnfg.modify(FCNFG::BKSEL.val(bank));
        Ok(())
    }

    /// Program one aligned 16-bit word. `address` is the word-aligned
    /// local address within the selected bank.
    pub fn program_word(&self, address: u16, word: u16) -> Result<(), ErrorCode> {
        if address & 1 != 0 {
            return Err(ErrorCode::INVAL);
        }
        self.run_command(FlashCommand::ProgramWord, address, word)
    }

    /// Erase the 512-byte sector containing `address`.
    pub fn erase_sector(&self, address: u16) -> Result<(), ErrorCode> {
        self.run_command(FlashCommand::SectorErase, address & !1, 0xFFFF)
    }

    /// Erase-verify the selected bank. `Ok(true)` when blank.
    pub fn blank_check(&self) -> Result<bool, ErrorCode> {
        self.run_command(FlashCommand::EraseVerify, 0, 0xFFFF)?;
        Ok(self.registers.fstat.is_set(FSTAT::BLANK))
    }

    fn run_command(&self, command: FlashCommand, address: u16, data: u16) -> Result<(), ErrorCode> {
        let regs = self.registers;
        if !regs.fclkdiv.is_set(FCLKDIV::FDIVLD) {
            return Err(ErrorCode::OFF);
        }
        while !regs.fstat.is_set(FSTAT::CBEIF) {}
        // Stale error flags abort the next launch; clear them up front.
        regs.fstat.write(FSTAT::PVIOL::SET + FSTAT::ACCERR::SET);
        regs.faddr.set(address >> 1);
        regs.fdata.set(data);
        regs.fcmd.write(FCMD::CMDB.val(command as u8));
        regs.fstat.write(FSTAT::CBEIF::SET);
        while !regs.fstat.is_set(FSTAT::CCIF) {}
        if regs.fstat.is_set(FSTAT::PVIOL) {
            regs.fstat.write(FSTAT::PVIOL::SET);
            return Err(ErrorCode::INVAL);
        }
        if regs.fstat.is_set(FSTAT::ACCERR) {
            regs.fstat.write(FSTAT::ACCERR::SET);
            return Err(ErrorCode::FAIL);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<FlashRegisters>(), 0x10);
        assert_eq!(offset_of!(FlashRegisters, fcnfg), 0x03);
        assert_eq!(offset_of!(FlashRegisters, fstat), 0x05);
        assert_eq!(offset_of!(FlashRegisters, faddr), 0x08);
        assert_eq!(offset_of!(FlashRegisters, fdata), 0x0A);
        assert_eq!(FLASH_BASE.as_ptr() as usize, 0x0100);
    }

    #[test]
    fn clock_divider_window() {
        // 16 MHz crystal: prescale to 2 MHz, /10 lands at 200 kHz.
        assert_eq!(clock_divider(16_000_000), Some((true, 9)));
        // 8 MHz: no prescale, /40 lands at 200 kHz.
        assert_eq!(clock_divider(8_000_000), Some((false, 39)));
        // 4 MHz: /20 gives exactly 200 kHz.
        assert_eq!(clock_divider(4_000_000), Some((false, 19)));
        // Below 150 kHz no setting reaches the window.
        assert_eq!(clock_divider(100_000), None);
    }

    #[test]
    fn command_codes() {
        assert_eq!(FlashCommand::EraseVerify as u8, 0x05);
        assert_eq!(FlashCommand::ProgramWord as u8, 0x20);
        assert_eq!(FlashCommand::SectorErase as u8, 0x40);
        assert_eq!(FlashCommand::MassErase as u8, 0x41);
    }
}
