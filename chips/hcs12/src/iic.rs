// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Inter-IC bus (IIC).
//!
//! Single I2C controller with 7-bit addressing. The driver is a polled
//! bus master; each byte spins on the transfer complete interrupt flag.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const IIC_BASE: StaticRef<IicRegisters> =
    unsafe { StaticRef::new(0x00E0 as *const IicRegisters) };

register_structs! {
    pub IicRegisters {
        /// Bus address register, own slave address; 0x00
        (0x00 => ibad: ReadWrite<u8, IBAD::Register>),
        /// Bus frequency divider register; 0x01
        (0x01 => ibfd: ReadWrite<u8>),
        /// Bus control register; 0x02
        (0x02 => ibcr: ReadWrite<u8, IBCR::Register>),
        /// Bus status register; 0x03
        (0x03 => ibsr: ReadWrite<u8, IBSR::Register>),
        /// Bus data register; 0x04
        (0x04 => ibdr: ReadWrite<u8>),
        (0x05 => _reserved0),
        (0x08 => @END),
    }
}

register_bitfields![u8,
    pub IBAD [
        /// Own address when addressed as a slave
        ADR OFFSET(1) NUMBITS(7) []
    ],
    pub IBCR [
        /// Bus enable
        IBEN OFFSET(7) NUMBITS(1) [],
        /// Interrupt enable
        IBIE OFFSET(6) NUMBITS(1) [],
        /// Master (1) or slave (0); the 0-to-1 transition sends START,
        /// 1-to-0 sends STOP
        MSSL OFFSET(5) NUMBITS(1) [],
        /// Transmit (1) or receive (0)
        TXRX OFFSET(4) NUMBITS(1) [],
        /// Do not acknowledge received bytes
        TXAK OFFSET(3) NUMBITS(1) [],
        /// Generate a repeated START
        RSTA OFFSET(2) NUMBITS(1) [],
        /// Bus stops in wait mode
        IBSWAI OFFSET(0) NUMBITS(1) []
    ],
    pub IBSR [
        /// Transfer complete flag
        TCF OFFSET(7) NUMBITS(1) [],
        /// Addressed as a slave
        IAAS OFFSET(6) NUMBITS(1) [],
        /// Bus busy
        IBB OFFSET(5) NUMBITS(1) [],
        /// Arbitration lost, cleared by writing 1
        IBAL OFFSET(4) NUMBITS(1) [],
        /// Slave read/write direction
        SRW OFFSET(2) NUMBITS(1) [],
        /// Interrupt flag, cleared by writing 1
        IBIF OFFSET(1) NUMBITS(1) [],
        /// Acknowledge received from the far end, 0 means ACK
        RXAK OFFSET(0) NUMBITS(1) []
    ],
];

pub struct Iic {
    registers: StaticRef<IicRegisters>,
}

impl Iic {
    pub const fn new(registers: StaticRef<IicRegisters>) -> Iic {
        Iic { registers }
    }

    /// Enable the module. `ibfd` is the raw frequency divider code from
    /// the divider table in the reference manual.
    pub fn enable(&self, ibfd: u8) {
        let regs = self.registers;
        regs.ibfd.set(ibfd);
        regs.ibcr.write(IBCR::IBEN::SET);
    }

    pub fn disable(&self) {
        self.registers.ibcr.set(0);
    }

    /// Master write of `buffer` to the 7-bit `address`. Fails with
    /// [`ErrorCode::BUSY`] when another master holds the bus and
    /// [`ErrorCode::NOACK`] when the address or a data byte goes
    /// unacknowledged.
    pub fn write(&self, address: u8, buffer: &[u8]) -> Result<(), ErrorCode> {
        let regs = self.registers;
        if regs.ibsr.is_set(IBSR::IBB) {
            return Err(ErrorCode::BUSY);
        }
        regs.ibcr.modify(IBCR::TXRX::SET + IBCR::MSSL::SET);
        let result = self.send_byte(address << 1).and_then(|()| {
            for byte in buffer {
                self.send_byte(*byte)?;
            }
            Ok(())
        });
        // STOP regardless of the outcome so the bus is released.
        regs.ibcr.modify(IBCR::MSSL::CLEAR + IBCR::TXRX::CLEAR);
        result
    }

    fn send_byte(&self, byte: u8) -> Result<(), ErrorCode> {
        let regs = self.registers;
        regs.ibdr.set(byte);
        while !regs.ibsr.is_set(IBSR::IBIF) {}
        regs.ibsr.write(IBSR::IBIF::SET);
        if regs.ibsr.is_set(IBSR::IBAL) {
            regs.ibsr.write(IBSR::IBAL::SET);
            return Err(ErrorCode::FAIL);
        }
        if regs.ibsr.is_set(IBSR::RXAK) {
            return Err(ErrorCode::NOACK);
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
        assert_eq!(size_of::<IicRegisters>(), 0x08);
        assert_eq!(offset_of!(IicRegisters, ibad), 0x00);
        assert_eq!(offset_of!(IicRegisters, ibcr), 0x02);
        assert_eq!(offset_of!(IicRegisters, ibdr), 0x04);
        assert_eq!(IIC_BASE.as_ptr() as usize, 0x00E0);
    }

    #[test]
    fn own_address_field() {
        // 7-bit address sits above the read/write bit.
        assert_eq!(IBAD::ADR.shift, 1);
        assert_eq!(IBAD::ADR.mask, 0x7F);
    }
}
