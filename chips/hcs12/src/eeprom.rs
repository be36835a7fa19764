// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! EEPROM controller (EETS).
//!
//! Command interface for the 4 KiB byte-erasable EEPROM. Mirrors the
//! flash controller's launch sequence with a 4-byte sector size and an
//! extra sector-modify command that folds erase and program together.

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::flash::clock_divider;
use crate::static_ref::StaticRef;

pub const EEPROM_BASE: StaticRef<EepromRegisters> =
    unsafe { StaticRef::new(0x0110 as *const EepromRegisters) };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum EepromCommand {
    EraseVerify = 0x05,
    ProgramWord = 0x20,
    SectorErase = 0x40,
    MassErase = 0x41,
    SectorModify = 0x60,
}

register_structs! {
    pub EepromRegisters {
        /// Clock divider register, writable once after reset; 0x00
        (0x00 => eclkdiv: ReadWrite<u8, ECLKDIV::Register>),
        (0x01 => _reserved0),
        /// Configuration register; 0x03
        (0x03 => ecnfg: ReadWrite<u8, ECNFG::Register>),
        /// Protection register; 0x04
        (0x04 => eprot: ReadWrite<u8, EPROT::Register>),
        /// Status register; 0x05
        (0x05 => estat: ReadWrite<u8, ESTAT::Register>),
        /// Command register; 0x06
        (0x06 => ecmd: ReadWrite<u8, ECMD::Register>),
        (0x07 => _reserved1),
        /// Address buffer registers; 0x08-0x09
        (0x08 => eaddr: ReadWrite<u16>),
        /// Data buffer registers; 0x0A-0x0B
        (0x0A => edata: ReadWrite<u16>),
        (0x0C => @END),
    }
}

register_bitfields![u8,
    pub ECLKDIV [
        EDIVLD OFFSET(7) NUMBITS(1) [],
        PRDIV8 OFFSET(6) NUMBITS(1) [],
        EDIV OFFSET(0) NUMBITS(6) []
    ],
    pub ECNFG [
        CBEIE OFFSET(7) NUMBITS(1) [],
        CCIE OFFSET(6) NUMBITS(1) []
    ],
    pub EPROT [
        /// Protection disabled outside the protected range
        EPOPEN OFFSET(7) NUMBITS(1) [],
        /// Protection of the high address range disabled
        EPDIS OFFSET(2) NUMBITS(1) [],
        /// Protected range size at the top of the EEPROM
        EP OFFSET(0) NUMBITS(2) []
    ],
    pub ESTAT [
        CBEIF OFFSET(7) NUMBITS(1) [],
        CCIF OFFSET(6) NUMBITS(1) [],
        PVIOL OFFSET(5) NUMBITS(1) [],
        ACCERR OFFSET(4) NUMBITS(1) [],
        BLANK OFFSET(2) NUMBITS(1) []
    ],
    pub ECMD [
        CMDB OFFSET(0) NUMBITS(7) []
    ],
];

pub struct Eeprom {
    registers: StaticRef<EepromRegisters>,
}

impl Eeprom {
    pub const fn new(registers: StaticRef<EepromRegisters>) -> Eeprom {
        Eeprom { registers }
    }

    /// Program the command clock divider, shared 150-200 kHz window
    /// with the flash controller.
    pub fn init(&self, osc_hz: u32) -> Result<(), ErrorCode> {
        let (prdiv8, ediv) = clock_divider(osc_hz).ok_or(ErrorCode::INVAL)?;
        let mut setting = ECLKDIV::EDIV.val(ediv);
        if prdiv8 {
            setting += ECLKDIV::PRDIV8::SET;
        }
        self.registers.eclkdiv.write(setting);
        if !self.registers.eclkdiv.is_set(ECLKDIV::EDIVLD) {
            return Err(ErrorCode::FAIL);
        }
        Ok(())
    }

    /// Program one aligned word.
    pub fn program_word(&self, address: u16, word: u16) -> Result<(), ErrorCode> {
        if address & 1 != 0 {
            return Err(ErrorCode::INVAL);
        }
        self.run_command(EepromCommand::ProgramWord, address, word)
    }

    /// Erase the 4-byte sector containing `address` and program `word`
    /// into its addressed word in one command.
    pub fn modify_sector(&self, address: u16, word: u16) -> Result<(), ErrorCode> {
        if address & 1 != 0 {
            return Err(ErrorCode::INVAL);
        }
        self.run_command(EepromCommand::SectorModify, address, word)
    }

    /// Erase the 4-byte sector containing `address`.
    pub fn erase_sector(&self, address: u16) -> Result<(), ErrorCode> {
        self.run_command(EepromCommand::SectorErase, address & !1, 0xFFFF)
    }

    fn run_command(&self, command: EepromCommand, address: u16, data: u16) -> Result<(), ErrorCode> {
        let regs = self.registers;
        if !regs.eclkdiv.is_set(ECLKDIV::EDIVLD) {
            return Err(ErrorCode::OFF);
        }
        while !regs.estat.is_set(ESTAT::CBEIF) {}
        regs.estat.write(ESTAT::PVIOL::SET + ESTAT::ACCERR::SET);
        regs.eaddr.set(address >> 1);
        regs.edata.set(data);
        regs.ecmd.write(ECMD::CMDB.val(command as u8));
        regs.estat.write(ESTAT::CBEIF::SET);
        while !regs.estat.is_set(ESTAT::CCIF) {}
        if regs.estat.is_set(ESTAT::PVIOL) {
            regs.estat.write(ESTAT::PVIOL::SET);
            return Err(ErrorCode::INVAL);
        }
        if regs.estat.is_set(ESTAT::ACCERR) {
            regs.estat.write(ESTAT::ACCERR::SET);
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
        assert_eq!(size_of::<EepromRegisters>(), 0x0C);
        assert_eq!(offset_of!(EepromRegisters, ecnfg), 0x03);
        assert_eq!(offset_of!(EepromRegisters, estat), 0x05);
        assert_eq!(offset_of!(EepromRegisters, eaddr), 0x08);
        assert_eq!(EEPROM_BASE.as_ptr() as usize, 0x0110);
    }

    #[test]
    fn sector_modify_code() {
        assert_eq!(EepromCommand::SectorModify as u8, 0x60);
    }
}
