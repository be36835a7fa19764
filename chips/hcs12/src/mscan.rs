// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Motorola scalable CAN (MSCAN).
//!
//! CAN 2.0 A/B controller with a five-deep receive FIFO behind one
//! foreground buffer and three transmit buffers. D-family devices carry
//! CAN0, CAN1 and CAN4.
//!
//! Configuration registers are only writable in initialization mode,
//! entered through a INITRQ/INITAK handshake in CANCTL0/CANCTL1. The
//! driver keeps the acceptance filters open and runs the buffers polled.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const CAN0_BASE: StaticRef<MscanRegisters> =
    unsafe { StaticRef::new(0x0140 as *const MscanRegisters) };
pub const CAN1_BASE: StaticRef<MscanRegisters> =
    unsafe { StaticRef::new(0x0180 as *const MscanRegisters) };
pub const CAN4_BASE: StaticRef<MscanRegisters> =
    unsafe { StaticRef::new(0x0280 as *const MscanRegisters) };

register_structs! {
    pub MscanRegisters {
        /// Control register 0; 0x00
        (0x00 => canctl0: ReadWrite<u8, CANCTL0::Register>),
        /// Control register 1; 0x01
        (0x01 => canctl1: ReadWrite<u8, CANCTL1::Register>),
        /// Bus timing register 0; 0x02
        (0x02 => canbtr0: ReadWrite<u8, CANBTR0::Register>),
        /// Bus timing register 1; 0x03
        (0x03 => canbtr1: ReadWrite<u8, CANBTR1::Register>),
        /// Receiver flag register; 0x04
        (0x04 => canrflg: ReadWrite<u8, CANRFLG::Register>),
        /// Receiver interrupt enable register; 0x05
        (0x05 => canrier: ReadWrite<u8, CANRIER::Register>),
        /// Transmitter flag register; 0x06
        (0x06 => cantflg: ReadWrite<u8, CANTFLG::Register>),
        /// Transmitter interrupt enable register; 0x07
        (0x07 => cantier: ReadWrite<u8, CANTFLG::Register>),
        /// Transmitter message abort request register; 0x08
        (0x08 => cantarq: ReadWrite<u8, CANTFLG::Register>),
        /// Transmitter message abort acknowledge register; 0x09
        (0x09 => cantaak: ReadOnly<u8, CANTFLG::Register>),
        /// Transmit buffer selection register; 0x0A
        (0x0A => cantbsel: ReadWrite<u8, CANTFLG::Register>),
        /// Identifier acceptance control register; 0x0B
        (0x0B => canidac: ReadWrite<u8, CANIDAC::Register>),
        (0x0C => _reserved0),
        /// Receive error counter; 0x0E
        (0x0E => canrxerr: ReadOnly<u8>),
        /// Transmit error counter; 0x0F
        (0x0F => cantxerr: ReadOnly<u8>),
        /// Identifier acceptance registers, first bank; 0x10-0x13
        (0x10 => canidar0: [ReadWrite<u8>; 4]),
        /// Identifier mask registers, first bank; 0x14-0x17
        (0x14 => canidmr0: [ReadWrite<u8>; 4]),
        /// Identifier acceptance registers, second bank; 0x18-0x1B
        (0x18 => canidar1: [ReadWrite<u8>; 4]),
        /// Identifier mask registers, second bank; 0x1C-0x1F
        (0x1C => canidmr1: [ReadWrite<u8>; 4]),
        /// Receive foreground buffer identifier registers; 0x20-0x23
        (0x20 => rxidr: [ReadOnly<u8>; 4]),
        /// Receive foreground buffer data segment; 0x24-0x2B
        (0x24 => rxdsr: [ReadOnly<u8>; 8]),
        /// Receive foreground buffer data length; 0x2C
        (0x2C => rxdlr: ReadOnly<u8, DLR::Register>),
        (0x2D => _reserved1),
        /// Receive buffer timestamp; 0x2E-0x2F
        (0x2E => rxtsr: ReadOnly<u16>),
        /// Transmit buffer identifier registers; 0x30-0x33
        (0x30 => txidr: [ReadWrite<u8>; 4]),
        /// Transmit buffer data segment; 0x34-0x3B
        (0x34 => txdsr: [ReadWrite<u8>; 8]),
        /// Transmit buffer data length; 0x3C
        (0x3C => txdlr: ReadWrite<u8, DLR::Register>),
        /// Transmit buffer priority; 0x3D
        (0x3D => txtbpr: ReadWrite<u8>),
        /// Transmit buffer timestamp; 0x3E-0x3F
        (0x3E => txtsr: ReadOnly<u16>),
        (0x40 => @END),
    }
}

register_bitfields![u8,
    pub CANCTL0 [
        /// Received frame flag
        RXFRM OFFSET(7) NUMBITS(1) [],
        /// Receiver active status
        RXACT OFFSET(6) NUMBITS(1) [],
        /// Stop clocks in wait mode
        CSWAI OFFSET(5) NUMBITS(1) [],
        /// Synchronized to the bus
        SYNCH OFFSET(4) NUMBITS(1) [],
        /// Timestamp enable
        TIME OFFSET(3) NUMBITS(1) [],
        /// Wake-up enable
        WUPE OFFSET(2) NUMBITS(1) [],
        /// Sleep mode request
        SLPRQ OFFSET(1) NUMBITS(1) [],
        /// Initialization mode request
        INITRQ OFFSET(0) NUMBITS(1) []
    ],
    pub CANCTL1 [
        /// MSCAN enable
        CANE OFFSET(7) NUMBITS(1) [],
        /// Clock from the bus clock (1) or the oscillator (0)
        CLKSRC OFFSET(6) NUMBITS(1) [],
        /// Loopback self test
        LOOPB OFFSET(5) NUMBITS(1) [],
        /// Listen only mode
        LISTEN OFFSET(4) NUMBITS(1) [],
        /// Wake-up filter enable
        WUPM OFFSET(2) NUMBITS(1) [],
        /// Sleep mode acknowledge
        SLPAK OFFSET(1) NUMBITS(1) [],
        /// Initialization mode acknowledge
        INITAK OFFSET(0) NUMBITS(1) []
    ],
    pub CANBTR0 [
        /// Synchronization jump width, in quanta minus one
        SJW OFFSET(6) NUMBITS(2) [],
        /// Baud rate prescaler minus one
        BRP OFFSET(0) NUMBITS(6) []
    ],
    pub CANBTR1 [
        /// Three-sample point instead of one
        SAMP OFFSET(7) NUMBITS(1) [],
        /// Time segment 2, in quanta minus one
        TSEG2 OFFSET(4) NUMBITS(3) [],
        /// Time segment 1, in quanta minus one
        TSEG1 OFFSET(0) NUMBITS(4) []
    ],
    pub CANRFLG [
        /// Wake-up interrupt flag
        WUPIF OFFSET(7) NUMBITS(1) [],
        /// Status change interrupt flag
        CSCIF OFFSET(6) NUMBITS(1) [],
        /// Receiver status
        RSTAT OFFSET(4) NUMBITS(2) [
            Ok = 0,
            Warning = 1,
            ErrorPassive = 2,
            BusOff = 3
        ],
        /// Transmitter status
        TSTAT OFFSET(2) NUMBITS(2) [
            Ok = 0,
            Warning = 1,
            ErrorPassive = 2,
            BusOff = 3
        ],
        /// Overrun interrupt flag
        OVRIF OFFSET(1) NUMBITS(1) [],
        /// Receive buffer full flag, write 1 to release the buffer
        RXF OFFSET(0) NUMBITS(1) []
    ],
    pub CANRIER [
        WUPIE OFFSET(7) NUMBITS(1) [],
        CSCIE OFFSET(6) NUMBITS(1) [],
        RSTATE OFFSET(4) NUMBITS(2) [],
        TSTATE OFFSET(2) NUMBITS(2) [],
        OVRIE OFFSET(1) NUMBITS(1) [],
        RXFIE OFFSET(0) NUMBITS(1) []
    ],
    /// Per-buffer layout shared by CANTFLG, CANTIER, CANTARQ, CANTAAK
    /// and CANTBSEL.
    pub CANTFLG [
        TX2 OFFSET(2) NUMBITS(1) [],
        TX1 OFFSET(1) NUMBITS(1) [],
        TX0 OFFSET(0) NUMBITS(1) []
    ],
    pub CANIDAC [
        /// Identifier acceptance mode
        IDAM OFFSET(4) NUMBITS(2) [
            TwoFilters32 = 0,
            FourFilters16 = 1,
            EightFilters8 = 2,
            FilterClosed = 3
        ],
        /// Filter that accepted the foreground buffer's frame
        IDHIT OFFSET(0) NUMBITS(3) []
    ],
    pub DLR [
        DLC OFFSET(0) NUMBITS(4) []
    ],
];

/// A CAN 2.0 identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CanId {
    /// 11-bit base identifier.
    Standard(u16),
    /// 29-bit extended identifier.
    Extended(u32),
}

/// One data frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CanFrame {
    pub id: CanId,
    pub data: [u8; 8],
    pub len: u8,
}

/// Register-encoded bit timing: values ready for CANBTR0/CANBTR1.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BitTiming {
    /// Prescaler minus one.
    pub brp: u8,
    /// Time segment 1 minus one.
    pub tseg1: u8,
    /// Time segment 2 minus one.
    pub tseg2: u8,
}

// Segment pairs for 8 to 25 quanta per bit, sample point 68-78%.
const BIT_TIMINGS: [(u8, u8); 18] = [
    (5, 2),  //  8 quanta
    (6, 2),  //  9
    (6, 3),  // 10
    (7, 3),  // 11
    (8, 3),  // 12
    (9, 3),  // 13
    (9, 4),  // 14
    (10, 4), // 15
    (11, 4), // 16
    (12, 4), // 17
    (12, 5), // 18
    (13, 5), // 19
    (14, 5), // 20
    (15, 5), // 21
    (15, 6), // 22
    (16, 6), // 23
    (16, 7), // 24
    (16, 8), // 25
];

/// Exact bit timing for `baud` from a `can_clk_hz` input clock, or
/// `None` when no prescaler and quanta count divide evenly.
pub fn bit_timing(can_clk_hz: u32, baud: u32) -> Option<BitTiming> {
    if baud == 0 {
        return None;
    }
    for brp in 1..=64u32 {
        for (tseg1, tseg2) in BIT_TIMINGS {
            let quanta = 1 + tseg1 as u32 + tseg2 as u32;
            if can_clk_hz == baud * quanta * brp {
                return Some(BitTiming {
                    brp: (brp - 1) as u8,
                    tseg1: tseg1 - 1,
                    tseg2: tseg2 - 1,
                });
            }
        }
    }
    None
}

/// Pack an identifier into the four IDR bytes of a transmit buffer.
/// Data frame, RTR clear.
pub fn pack_id(id: CanId) -> [u8; 4] {
    match id {
        CanId::Standard(id) => {
            let id = id & 0x7FF;
            [(id >> 3) as u8, ((id & 0x07) as u8) << 5, 0, 0]
        }
        CanId::Extended(id) => {
            let id = id & 0x1FFF_FFFF;
            [
                (id >> 21) as u8,
                // SRR and IDE are both set in an extended identifier.
                ((((id >> 18) & 0x07) as u8) << 5) | 0x18 | (((id >> 15) & 0x07) as u8),
                (id >> 7) as u8,
                ((id & 0x7F) as u8) << 1,
            ]
        }
    }
}

/// Recover the identifier from the four IDR bytes of a receive buffer.
pub fn unpack_id(idr: [u8; 4]) -> CanId {
    if idr[1] & 0x08 != 0 {
        let id = ((idr[0] as u32) << 21)
            | (((idr[1] >> 5) as u32) << 18)
            | (((idr[1] & 0x07) as u32) << 15)
            | ((idr[2] as u32) << 7)
            | ((idr[3] >> 1) as u32);
        CanId::Extended(id)
    } else {
        CanId::Standard(((idr[0] as u16) << 3) | ((idr[1] >> 5) as u16))
    }
}

pub struct Mscan {
    registers: StaticRef<MscanRegisters>,
}

impl Mscan {
    pub const fn new(registers: StaticRef<MscanRegisters>) -> Mscan {
        Mscan { registers }
    }

    /// Bring the controller onto the bus at `baud`, clocked from the
    /// bus clock, all acceptance filters open.
    pub fn enable(&self, bus_hz: u32, baud: u32) -> Result<(), ErrorCode> {
        let timing = bit_timing(bus_hz, baud).ok_or(ErrorCode::INVAL)?;
        let regs = self.registers;

        regs.canctl0.modify(CANCTL0::INITRQ::SET);
        while !regs.canctl1.is_set(CANCTL1::INITAK) {}

        regs.canctl1.write(CANCTL1::CANE::SET + CANCTL1::CLKSRC::SET);
        regs.canbtr0.write(CANBTR0::SJW.val(0) + CANBTR0::BRP.val(timing.brp));
        regs.canbtr1
            .write(CANBTR1::TSEG2.val(timing.tseg2) + CANBTR1::TSEG1.val(timing.tseg1));
        regs.canidac.write(CANIDAC::IDAM::TwoFilters32);
        for i in 0..4 {
            regs.canidmr0[i].set(0xFF);
            regs.canidmr1[i].set(0xFF);
        }

        regs.canctl0.modify(CANCTL0::INITRQ::CLEAR);
        while regs.canctl1.is_set(CANCTL1::INITAK) {}
        while !regs.canctl0.is_set(CANCTL0::SYNCH) {}
        Ok(())
    }

    pub fn disable(&self) {
        let regs = self.registers;
        regs.canctl0.modify(CANCTL0::INITRQ::SET);
        while !regs.canctl1.is_set(CANCTL1::INITAK) {}
        regs.canctl1.modify(CANCTL1::CANE::CLEAR);
    }

    /// Queue `frame` in a free transmit buffer. Fails with
    /// [`ErrorCode::BUSY`] when all three buffers are in flight.
    pub fn transmit(&self, frame: &CanFrame) -> Result<(), ErrorCode> {
        if frame.len > 8 {
            return Err(ErrorCode::SIZE);
        }
        let regs = self.registers;
        let free = regs.cantflg.get() & 0x07;
        if free == 0 {
            return Err(ErrorCode::BUSY);
        }
        // Writing CANTBSEL selects the lowest numbered flagged buffer;
        // reading it back tells which one that was.
        regs.cantbsel.set(free);
        let selected = regs.cantbsel.get();

        let idr = pack_id(frame.id);
        for (reg, byte) in regs.txidr.iter().zip(idr) {
            reg.set(byte);
        }
        for i in 0..frame.len as usize {
            regs.txdsr[i].set(frame.data[i]);
        }
        regs.txdlr.write(DLR::DLC.val(frame.len));
        regs.txtbpr.set(0);
        // Clearing the TXE flag hands the buffer to the controller.
        regs.cantflg.set(selected);
        Ok(())
    }

    /// True once at least one transmit buffer is free.
    pub fn transmit_ready(&self) -> bool {
        self.registers.cantflg.get() & 0x07 != 0
    }

    /// Take the frame in the foreground receive buffer, if any, and
    /// release the buffer back to the FIFO.
    pub fn receive(&self) -> Option<CanFrame> {
        let regs = self.registers;
        if !regs.canrflg.is_set(CANRFLG::RXF) {
            return None;
        }
        let mut idr = [0u8; 4];
        for (byte, reg) in idr.iter_mut().zip(regs.rxidr.iter()) {
            *byte = reg.get();
        }
        let len = regs.rxdlr.read(DLR::DLC).min(8);
        let mut data = [0u8; 8];
        for i in 0..len as usize {
            data[i] = regs.rxdsr[i].get();
        }
        regs.canrflg.write(CANRFLG::RXF::SET);
        Some(CanFrame {
            id: unpack_id(idr),
            data,
            len,
        })
    }

    /// Current error counters as (receive, transmit).
    pub fn error_counters(&self) -> (u8, u8) {
        let regs = self.registers;
        (regs.canrxerr.get(), regs.cantxerr.get())
    }

    pub fn bus_off(&self) -> bool {
        self.registers.canrflg.matches_all(CANRFLG::TSTAT::BusOff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<MscanRegisters>(), 0x40);
        assert_eq!(offset_of!(MscanRegisters, canbtr0), 0x02);
        assert_eq!(offset_of!(MscanRegisters, canidac), 0x0B);
        assert_eq!(offset_of!(MscanRegisters, canidar0), 0x10);
        assert_eq!(offset_of!(MscanRegisters, rxidr), 0x20);
        assert_eq!(offset_of!(MscanRegisters, txidr), 0x30);
        assert_eq!(offset_of!(MscanRegisters, txtbpr), 0x3D);
        assert_eq!(CAN0_BASE.as_ptr() as usize, 0x0140);
        assert_eq!(CAN4_BASE.as_ptr() as usize, 0x0280);
    }

    #[test]
    fn bit_timing_exact_rates() {
        // 24 MHz clock at 500 kbit/s: 24000/500 = 48 = 2 * 24 quanta.
        let timing = bit_timing(24_000_000, 500_000).unwrap();
        let quanta = 1 + (timing.tseg1 as u32 + 1) + (timing.tseg2 as u32 + 1);
        assert_eq!((timing.brp as u32 + 1) * quanta * 500_000, 24_000_000);
        // The selected entry must also sample inside the 68-78% window.
        let sample = (1 + timing.tseg1 as u32 + 1) * 100 / quanta;
        assert!((68..=78).contains(&sample));

        // 24 MHz at 125 kbit/s also divides evenly.
        assert!(bit_timing(24_000_000, 125_000).is_some());

        // 10 MHz at 300 kbit/s leaves a remainder for every entry.
        assert_eq!(bit_timing(10_000_000, 300_000), None);
        assert_eq!(bit_timing(24_000_000, 0), None);
    }

    #[test]
    fn bit_timing_sample_point() {
        // Every table entry samples between 68% and 78% of the bit.
        for (tseg1, tseg2) in BIT_TIMINGS {
            let quanta = 1 + tseg1 as u32 + tseg2 as u32;
            let sample = (1 + tseg1 as u32) * 100 / quanta;
            assert!((68..=78).contains(&sample), "{}tq at {}%", quanta, sample);
        }
    }

    #[test]
    fn standard_id_packing() {
        // 0x123 = 0b100_1000_1100.
        let idr = pack_id(CanId::Standard(0x123));
        assert_eq!(idr, [0x24, 0x60, 0x00, 0x00]);
        // IDE clear marks the frame as standard.
        assert_eq!(idr[1] & 0x08, 0);
        assert_eq!(unpack_id(idr), CanId::Standard(0x123));
    }

    #[test]
    fn extended_id_packing() {
        let idr = pack_id(CanId::Extended(0x1234_5678));
        // SRR and IDE both set.
        assert_eq!(idr[1] & 0x18, 0x18);
        assert_eq!(unpack_id(idr), CanId::Extended(0x1234_5678));

        // Top of the range survives the round trip.
        let idr = pack_id(CanId::Extended(0x1FFF_FFFF));
        assert_eq!(unpack_id(idr), CanId::Extended(0x1FFF_FFFF));
    }

    #[test]
    fn transmit_buffer_flags_cover_three_buffers() {
        let mask = (CANTFLG::TX0.mask << CANTFLG::TX0.shift)
            | (CANTFLG::TX1.mask << CANTFLG::TX1.shift)
            | (CANTFLG::TX2.mask << CANTFLG::TX2.shift);
        assert_eq!(mask, 0x07);
    }
}
