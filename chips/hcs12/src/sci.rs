// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Serial communication interface (SCI).
//!
//! Asynchronous UART, two instances on D-family devices (SCI0 at 0x00C8
//! and SCI1 at 0x00D0). The baud generator divides the bus clock by
//! 16 times the 13-bit SBR divisor.
//!
//! The driver here is a polled 8N1 port; reception is non-blocking and
//! transmission spins on the data register empty flag.

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const SCI0_BASE: StaticRef<SciRegisters> =
    unsafe { StaticRef::new(0x00C8 as *const SciRegisters) };
pub const SCI1_BASE: StaticRef<SciRegisters> =
    unsafe { StaticRef::new(0x00D0 as *const SciRegisters) };

register_structs! {
    pub SciRegisters {
        /// Baud rate registers, high byte at 0x00 and low at 0x01
        (0x00 => scibd: ReadWrite<u16, SCIBD::Register>),
        /// Control register 1, frame format; 0x02
        (0x02 => scicr1: ReadWrite<u8, SCICR1::Register>),
        /// Control register 2, transmitter/receiver enables; 0x03
        (0x03 => scicr2: ReadWrite<u8, SCICR2::Register>),
        /// Status register 1; reading it arms the flag clearing; 0x04
        (0x04 => scisr1: ReadOnly<u8, SCISR1::Register>),
        /// Status register 2; 0x05
        (0x05 => scisr2: ReadWrite<u8, SCISR2::Register>),
        /// Data register high, ninth data bits; 0x06
        (0x06 => scidrh: ReadWrite<u8, SCIDRH::Register>),
        /// Data register low; 0x07
        (0x07 => scidrl: ReadWrite<u8>),
        (0x08 => @END),
    }
}

register_bitfields![u16,
    pub SCIBD [
        /// Infrared modulation enable
        IREN OFFSET(15) NUMBITS(1) [],
        /// Infrared narrow pulse width
        TNP OFFSET(13) NUMBITS(2) [],
        /// Baud divisor, baud = bus clock / (16 * SBR)
        SBR OFFSET(0) NUMBITS(13) []
    ],
];

register_bitfields![u8,
    pub SCICR1 [
        /// Loop back mode
        LOOPS OFFSET(7) NUMBITS(1) [],
        /// SCI stops in wait mode
        SCISWAI OFFSET(6) NUMBITS(1) [],
        /// Receiver source in loop mode
        RSRC OFFSET(5) NUMBITS(1) [],
        /// 9-bit data characters
        M OFFSET(4) NUMBITS(1) [],
        /// Wake by address mark instead of idle line
        WAKE OFFSET(3) NUMBITS(1) [],
        /// Idle line type
        ILT OFFSET(2) NUMBITS(1) [],
        /// Parity enable
        PE OFFSET(1) NUMBITS(1) [],
        /// Odd parity
        PT OFFSET(0) NUMBITS(1) []
    ],
    pub SCICR2 [
        /// Transmit interrupt enable
        TIE OFFSET(7) NUMBITS(1) [],
        /// Transmission complete interrupt enable
        TCIE OFFSET(6) NUMBITS(1) [],
        /// Receiver interrupt enable
        RIE OFFSET(5) NUMBITS(1) [],
        /// Idle line interrupt enable
        ILIE OFFSET(4) NUMBITS(1) [],
        /// Transmitter enable
        TE OFFSET(3) NUMBITS(1) [],
        /// Receiver enable
        RE OFFSET(2) NUMBITS(1) [],
        /// Receiver wakeup
        RWU OFFSET(1) NUMBITS(1) [],
        /// Send break
        SBK OFFSET(0) NUMBITS(1) []
    ],
    pub SCISR1 [
        /// Transmit data register empty
        TDRE OFFSET(7) NUMBITS(1) [],
        /// Transmission complete
        TC OFFSET(6) NUMBITS(1) [],
        /// Receive data register full
        RDRF OFFSET(5) NUMBITS(1) [],
        /// Idle line detected
        IDLE OFFSET(4) NUMBITS(1) [],
        /// Receiver overrun
        OR OFFSET(3) NUMBITS(1) [],
        /// Noise flag
        NF OFFSET(2) NUMBITS(1) [],
        /// Framing error
        FE OFFSET(1) NUMBITS(1) [],
        /// Parity error
        PF OFFSET(0) NUMBITS(1) []
    ],
    pub SCISR2 [
        /// 13-bit break characters
        BRK13 OFFSET(2) NUMBITS(1) [],
        /// Transmit pin direction in single-wire mode
        TXDIR OFFSET(1) NUMBITS(1) [],
        /// Receiver active flag
        RAF OFFSET(0) NUMBITS(1) []
    ],
    pub SCIDRH [
        /// Ninth received bit
        R8 OFFSET(7) NUMBITS(1) [],
        /// Ninth bit to transmit
        T8 OFFSET(6) NUMBITS(1) []
    ],
];

/// Baud divisor for the 16x oversampling generator. `None` when the
/// requested rate is zero or the divisor does not fit the 13-bit field.
pub fn baud_divisor(bus_hz: u32, baud: u32) -> Option<u16> {
    if baud == 0 {
        return None;
    }
    let sbr = bus_hz / 16 / baud;
    if sbr == 0 || sbr > 0x1FFF {
        return None;
    }
    Some(sbr as u16)
}

pub struct Sci {
    registers: StaticRef<SciRegisters>,
}

impl Sci {
    pub const fn new(registers: StaticRef<SciRegisters>) -> Sci {
        Sci { registers }
    }

    /// Configure 8N1 at `baud` and enable the transmitter and receiver.
    pub fn enable(&self, bus_hz: u32, baud: u32) -> Result<(), ErrorCode> {
        let sbr = baud_divisor(bus_hz, baud).ok_or(ErrorCode::INVAL)?;
        let regs = self.registers;
        regs.scibd.write(SCIBD::SBR.val(sbr));
        regs.scicr1.set(0);
        regs.scicr2.write(SCICR2::TE::SET + SCICR2::RE::SET);
        Ok(())
    }

    pub fn disable(&self) {
        self.registers.scicr2.set(0);
    }

    /// Queue one byte, spinning until the data register drains.
    pub fn transmit_byte(&self, byte: u8) {
        let regs = self.registers;
        while !regs.scisr1.is_set(SCISR1::TDRE) {}
        regs.scidrl.set(byte);
    }

    pub fn transmit_buffer(&self, buffer: &[u8]) {
        for byte in buffer {
            self.transmit_byte(*byte);
        }
    }

    /// One received byte if the receiver holds one, without blocking.
    /// Reading SR1 then the data register clears RDRF and OR.
    pub fn receive_byte(&self) -> Option<u8> {
        let regs = self.registers;
        if regs.scisr1.is_set(SCISR1::RDRF) {
            Some(regs.scidrl.get())
        } else {
            None
        }
    }

    /// True once the last queued byte has fully left the shifter.
    pub fn transmit_idle(&self) -> bool {
        self.registers.scisr1.is_set(SCISR1::TC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<SciRegisters>(), 0x08);
        assert_eq!(offset_of!(SciRegisters, scibd), 0x00);
        assert_eq!(offset_of!(SciRegisters, scicr1), 0x02);
        assert_eq!(offset_of!(SciRegisters, scidrl), 0x07);
        assert_eq!(SCI0_BASE.as_ptr() as usize, 0x00C8);
        assert_eq!(SCI1_BASE.as_ptr() as usize, 0x00D0);
    }

    #[test]
    fn baud_divisors() {
        // 24 MHz bus at common rates.
        assert_eq!(baud_divisor(24_000_000, 9600), Some(156));
        assert_eq!(baud_divisor(24_000_000, 57600), Some(26));
        assert_eq!(baud_divisor(24_000_000, 115200), Some(13));
        // Rate too high for the divisor to stay nonzero.
        assert_eq!(baud_divisor(1_000_000, 115_200), None);
        // Rate so low the divisor overflows 13 bits.
        assert_eq!(baud_divisor(24_000_000, 100), None);
        assert_eq!(baud_divisor(24_000_000, 0), None);
    }

    #[test]
    fn sbr_field_is_13_bits() {
        let mask: u32 = (SCIBD::SBR.mask as u32) << SCIBD::SBR.shift;
        assert_eq!(mask, 0x1FFF);
    }
}
