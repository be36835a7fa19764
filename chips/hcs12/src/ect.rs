// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Enhanced capture timer (ECT).
//!
//! A 16-bit free-running counter with eight input capture/output compare
//! channels, two 8-bit pulse accumulators (cascadable to 16 bit) and a
//! 16-bit modulus down-counter. The counter runs at the bus clock divided
//! by the TSCR2 PR prescaler.
//!
//! [`TimerMs`] layers a polling based millisecond clock on top of the free
//! running counter, for code that needs coarse timeouts without taking an
//! interrupt vector.

use core::cell::Cell;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;

pub const ECT_BASE: StaticRef<EctRegisters> =
    unsafe { StaticRef::new(0x0040 as *const EctRegisters) };

register_structs! {
    pub EctRegisters {
        /// Timer input capture/output compare select; 0x0040
        (0x00 => tios: ReadWrite<u8, CH::Register>),
        /// Timer compare force register; 0x0041
        (0x01 => cforc: ReadWrite<u8, CH::Register>),
        /// Output compare 7 mask register; 0x0042
        (0x02 => oc7m: ReadWrite<u8, CH::Register>),
        /// Output compare 7 data register; 0x0043
        (0x03 => oc7d: ReadWrite<u8, CH::Register>),
        /// Timer count register, word access only; 0x0044-0x0045
        (0x04 => tcnt: ReadWrite<u16>),
        /// Timer system control register 1; 0x0046
        (0x06 => tscr1: ReadWrite<u8, TSCR1::Register>),
        /// Timer toggle on overflow register; 0x0047
        (0x07 => ttov: ReadWrite<u8, CH::Register>),
        /// Timer control register 1, output action channels 7-4; 0x0048
        (0x08 => tctl1: ReadWrite<u8, TCTL1::Register>),
        /// Timer control register 2, output action channels 3-0; 0x0049
        (0x09 => tctl2: ReadWrite<u8, TCTL2::Register>),
        /// Timer control register 3, capture edge channels 7-4; 0x004A
        (0x0A => tctl3: ReadWrite<u8, TCTL3::Register>),
        /// Timer control register 4, capture edge channels 3-0; 0x004B
        (0x0B => tctl4: ReadWrite<u8, TCTL4::Register>),
        /// Timer interrupt enable register; 0x004C
        (0x0C => tie: ReadWrite<u8, CH::Register>),
        /// Timer system control register 2; 0x004D
        (0x0D => tscr2: ReadWrite<u8, TSCR2::Register>),
        /// Main timer interrupt flag 1, cleared by writing 1; 0x004E
        (0x0E => tflg1: ReadWrite<u8, CH::Register>),
        /// Main timer interrupt flag 2; 0x004F
        (0x0F => tflg2: ReadWrite<u8, TFLG2::Register>),
        /// Timer input capture/output compare registers 0-7; 0x0050-0x005F
        (0x10 => tc: [ReadWrite<u16>; 8]),
        /// 16-bit pulse accumulator A control register; 0x0060
        (0x20 => pactl: ReadWrite<u8, PACTL::Register>),
        /// Pulse accumulator A flag register; 0x0061
        (0x21 => paflg: ReadWrite<u8, PAFLG::Register>),
        /// Pulse accumulators count 3:2 register; 0x0062-0x0063
        (0x22 => pacn32: ReadWrite<u16, PACNT32::Register>),
        /// Pulse accumulators count 1:0 register; 0x0064-0x0065
        (0x24 => pacn10: ReadWrite<u16, PACNT10::Register>),
        /// Modulus down-counter control register; 0x0066
        (0x26 => mcctl: ReadWrite<u8, MCCTL::Register>),
        /// Modulus down-counter flag register; 0x0067
        (0x27 => mcflg: ReadWrite<u8, MCFLG::Register>),
        /// Input control pulse accumulator register; 0x0068
        (0x28 => icpar: ReadWrite<u8, ICPAR::Register>),
        /// Delay counter control register; 0x0069
        (0x29 => dlyct: ReadWrite<u8, DLYCT::Register>),
        /// Input control overwrite register; 0x006A
        (0x2A => icovw: ReadWrite<u8, CH::Register>),
        /// Input control system control register; 0x006B
        (0x2B => icsys: ReadWrite<u8, ICSYS::Register>),
        /// TIMTST test register and reserved space; 0x006C-0x006F
        (0x2C => _reserved0),
        /// 16-bit pulse accumulator B control register; 0x0070
        (0x30 => pbctl: ReadWrite<u8, PBCTL::Register>),
        /// Pulse accumulator B flag register; 0x0071
        (0x31 => pbflg: ReadWrite<u8, PBFLG::Register>),
        /// 8-bit pulse accumulators holding 3:2 register; 0x0072-0x0073
        (0x32 => pa32h: ReadOnly<u16, PAH32::Register>),
        /// 8-bit pulse accumulators holding 1:0 register; 0x0074-0x0075
        (0x34 => pa10h: ReadOnly<u16, PAH10::Register>),
        /// Modulus down-counter count register; 0x0076-0x0077
        (0x36 => mccnt: ReadWrite<u16>),
        /// Timer input capture holding registers 0-3; 0x0078-0x007F
        (0x38 => tch: [ReadOnly<u16>; 4]),
        (0x40 => @END),
    }
}

register_bitfields![u8,
    /// Per-channel layout shared by TIOS, CFORC, OC7M, OC7D, TTOV, TIE,
    /// TFLG1 and ICOVW.
    pub CH [
        C7 OFFSET(7) NUMBITS(1) [],
        C6 OFFSET(6) NUMBITS(1) [],
        C5 OFFSET(5) NUMBITS(1) [],
        C4 OFFSET(4) NUMBITS(1) [],
        C3 OFFSET(3) NUMBITS(1) [],
        C2 OFFSET(2) NUMBITS(1) [],
        C1 OFFSET(1) NUMBITS(1) [],
        C0 OFFSET(0) NUMBITS(1) []
    ],
    pub TSCR1 [
        /// Timer enable
        TEN OFFSET(7) NUMBITS(1) [],
        /// Timer stops in wait mode
        TSWAI OFFSET(6) NUMBITS(1) [],
        /// Timer freezes in BDM freeze mode
        TSFRZ OFFSET(5) NUMBITS(1) [],
        /// Timer fast flag clear all
        TFFCA OFFSET(4) NUMBITS(1) []
    ],
    pub TCTL1 [
        OM7 OFFSET(7) NUMBITS(1) [],
        OL7 OFFSET(6) NUMBITS(1) [],
        OM6 OFFSET(5) NUMBITS(1) [],
        OL6 OFFSET(4) NUMBITS(1) [],
        OM5 OFFSET(3) NUMBITS(1) [],
        OL5 OFFSET(2) NUMBITS(1) [],
        OM4 OFFSET(1) NUMBITS(1) [],
        OL4 OFFSET(0) NUMBITS(1) []
    ],
    pub TCTL2 [
        OM3 OFFSET(7) NUMBITS(1) [],
        OL3 OFFSET(6) NUMBITS(1) [],
        OM2 OFFSET(5) NUMBITS(1) [],
        OL2 OFFSET(4) NUMBITS(1) [],
        OM1 OFFSET(3) NUMBITS(1) [],
        OL1 OFFSET(2) NUMBITS(1) [],
        OM0 OFFSET(1) NUMBITS(1) [],
        OL0 OFFSET(0) NUMBITS(1) []
    ],
    pub TCTL3 [
        EDG7B OFFSET(7) NUMBITS(1) [],
        EDG7A OFFSET(6) NUMBITS(1) [],
        EDG6B OFFSET(5) NUMBITS(1) [],
        EDG6A OFFSET(4) NUMBITS(1) [],
        EDG5B OFFSET(3) NUMBITS(1) [],
        EDG5A OFFSET(2) NUMBITS(1) [],
        EDG4B OFFSET(1) NUMBITS(1) [],
        EDG4A OFFSET(0) NUMBITS(1) []
    ],
    pub TCTL4 [
        EDG3B OFFSET(7) NUMBITS(1) [],
        EDG3A OFFSET(6) NUMBITS(1) [],
        EDG2B OFFSET(5) NUMBITS(1) [],
        EDG2A OFFSET(4) NUMBITS(1) [],
        EDG1B OFFSET(3) NUMBITS(1) [],
        EDG1A OFFSET(2) NUMBITS(1) [],
        EDG0B OFFSET(1) NUMBITS(1) [],
        EDG0A OFFSET(0) NUMBITS(1) []
    ],
    pub TSCR2 [
        /// Timer overflow interrupt enable
        TOI OFFSET(7) NUMBITS(1) [],
        /// Counter reset on channel 7 compare
        TCRE OFFSET(3) NUMBITS(1) [],
        /// Bus clock prescaler, divide by 2^PR
        PR OFFSET(0) NUMBITS(3) [
            Div1 = 0,
            Div2 = 1,
            Div4 = 2,
            Div8 = 3,
            Div16 = 4,
            Div32 = 5,
            Div64 = 6,
            Div128 = 7
        ]
    ],
    pub TFLG2 [
        /// Timer overflow flag, cleared by writing 1
        TOF OFFSET(7) NUMBITS(1) []
    ],
    pub PACTL [
        /// Pulse accumulator A enable
        PAEN OFFSET(6) NUMBITS(1) [],
        /// Event count (0) or gated time (1) mode
        PAMOD OFFSET(5) NUMBITS(1) [],
        /// Edge or gate level select
        PEDGE OFFSET(4) NUMBITS(1) [],
        /// Timer counter clock select
        CLK OFFSET(2) NUMBITS(2) [
            BusPrescaled = 0,
            PaClock = 1,
            PaClockDiv256 = 2,
            PaClockDiv65536 = 3
        ],
        /// Accumulator A overflow interrupt enable
        PAOVI OFFSET(1) NUMBITS(1) [],
        /// Accumulator A input interrupt enable
        PAI OFFSET(0) NUMBITS(1) []
    ],
    pub PAFLG [
        PAOVF OFFSET(1) NUMBITS(1) [],
        PAIF OFFSET(0) NUMBITS(1) []
    ],
    pub MCCTL [
        /// Modulus counter underflow interrupt enable
        MCZI OFFSET(7) NUMBITS(1) [],
        /// Modulus mode enable
        MODMC OFFSET(6) NUMBITS(1) [],
        /// Reads of MCCNT return the load register
        RDMCL OFFSET(5) NUMBITS(1) [],
        /// Force latch of input capture and pulse accumulator registers
        ICLAT OFFSET(4) NUMBITS(1) [],
        /// Force load of the modulus counter
        FLMC OFFSET(3) NUMBITS(1) [],
        /// Modulus counter enable
        MCEN OFFSET(2) NUMBITS(1) [],
        /// Modulus counter prescaler
        MCPR OFFSET(0) NUMBITS(2) [
            Div1 = 0,
            Div4 = 1,
            Div8 = 2,
            Div16 = 3
        ]
    ],
    pub MCFLG [
        /// Modulus counter underflow flag, cleared by writing 1
        MCZF OFFSET(7) NUMBITS(1) [],
        /// First input capture polarities
        POLF3 OFFSET(3) NUMBITS(1) [],
        POLF2 OFFSET(2) NUMBITS(1) [],
        POLF1 OFFSET(1) NUMBITS(1) [],
        POLF0 OFFSET(0) NUMBITS(1) []
    ],
    pub ICPAR [
        PA3EN OFFSET(3) NUMBITS(1) [],
        PA2EN OFFSET(2) NUMBITS(1) [],
        PA1EN OFFSET(1) NUMBITS(1) [],
        PA0EN OFFSET(0) NUMBITS(1) []
    ],
    pub DLYCT [
        /// Delay before pulse edges are recognized
        DLY OFFSET(0) NUMBITS(2) [
            Disabled = 0,
            Cycles256 = 1,
            Cycles512 = 2,
            Cycles1024 = 3
        ]
    ],
    pub ICSYS [
        /// Share input 3/7, 2/6, 1/5, 0/4 pins
        SH37 OFFSET(7) NUMBITS(1) [],
        SH26 OFFSET(6) NUMBITS(1) [],
        SH15 OFFSET(5) NUMBITS(1) [],
        SH04 OFFSET(4) NUMBITS(1) [],
        /// Timer flag-setting mode
        TFMOD OFFSET(3) NUMBITS(1) [],
        /// 8-bit maximum pulse accumulator count
        PACMX OFFSET(2) NUMBITS(1) [],
        /// Input capture buffer enable
        BUFEN OFFSET(1) NUMBITS(1) [],
        /// Input control latch quit mode
        LATQ OFFSET(0) NUMBITS(1) []
    ],
    pub PBCTL [
        /// Pulse accumulator B enable
        PBEN OFFSET(6) NUMBITS(1) [],
        /// Accumulator B overflow interrupt enable
        PBOVI OFFSET(1) NUMBITS(1) []
    ],
    pub PBFLG [
        PBOVF OFFSET(1) NUMBITS(1) []
    ],
];

register_bitfields![u16,
    /// Cascaded pulse accumulator pair 3 (high byte) and 2 (low byte).
    pub PACNT32 [
        PACN3 OFFSET(8) NUMBITS(8) [],
        PACN2 OFFSET(0) NUMBITS(8) []
    ],
    /// Cascaded pulse accumulator pair 1 (high byte) and 0 (low byte).
    pub PACNT10 [
        PACN1 OFFSET(8) NUMBITS(8) [],
        PACN0 OFFSET(0) NUMBITS(8) []
    ],
    pub PAH32 [
        PA3H OFFSET(8) NUMBITS(8) [],
        PA2H OFFSET(0) NUMBITS(8) []
    ],
    pub PAH10 [
        PA1H OFFSET(8) NUMBITS(8) [],
        PA0H OFFSET(0) NUMBITS(8) []
    ],
];

/// Polling based millisecond clock over the free-running counter.
///
/// Uses a fixed /4 prescaler: S12 derivatives run at bus speeds up to
/// 32 MHz, typically a multiple of 4 MHz, and scaling the counter down
/// gives a useful range between counter overflows. The delta arithmetic
/// wraps correctly across counter overflow.
pub struct TimerMs {
    registers: StaticRef<EctRegisters>,
    counts_per_ms: Cell<u16>,
    last_count: Cell<u16>,
    milliseconds: Cell<u32>,
}

impl TimerMs {
    pub const fn new(registers: StaticRef<EctRegisters>) -> TimerMs {
        TimerMs {
            registers,
            counts_per_ms: Cell::new(0),
            last_count: Cell::new(0),
            milliseconds: Cell::new(0),
        }
    }

    /// Place the timer subsystem back into its reset configuration.
    pub fn reset(&self) {
        let regs = self.registers;
        regs.tie.set(0);
        regs.tscr1.set(0);
        regs.tscr2.set(0);
        regs.tios.set(0);
        regs.ttov.set(0);
        regs.tctl1.set(0);
        regs.tctl2.set(0);
        regs.tctl3.set(0);
        regs.tctl4.set(0);
    }

    /// Start the free-running counter and the millisecond accounting.
    pub fn start(&self, bus_khz: u32) {
        let regs = self.registers;
        self.reset();
        regs.tscr2.modify(TSCR2::PR::Div4);
        // With the /4 prescaler the counter ticks bus_khz / 4 times per
        // millisecond.
        self.counts_per_ms.set((bus_khz / 4) as u16);
        regs.tscr1.modify(TSCR1::TEN::SET);
        self.milliseconds.set(0);
        self.last_count.set(regs.tcnt.get());
    }

    /// Fold counter progress into the millisecond count. Called from
    /// [`Self::now_ms`]; only needed directly when polling rarely.
    pub fn update(&self) {
        let now = self.registers.tcnt.get();
        let delta = now.wrapping_sub(self.last_count.get());
        let per_ms = self.counts_per_ms.get();
        if per_ms == 0 {
            return;
        }
        if delta >= per_ms {
            let ms = delta / per_ms;
            self.milliseconds
                .set(self.milliseconds.get().wrapping_add(ms as u32));
            self.last_count
                .set(self.last_count.get().wrapping_add(ms * per_ms));
        }
    }

    /// Milliseconds elapsed since [`Self::start`]. Updates the clock, so
    /// calling this in a loop is sufficient for timeout detection.
    pub fn now_ms(&self) -> u32 {
        self.update();
        self.milliseconds.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<EctRegisters>(), 0x40);
        // The free-running counter is the canonical wide/narrow overlay:
        // one 16-bit register at 0x0044 whose high byte is 0x0044 and low
        // byte 0x0045, with its successor directly behind it.
        assert_eq!(offset_of!(EctRegisters, tcnt), 0x04);
        assert_eq!(offset_of!(EctRegisters, tscr1), 0x06);
        assert_eq!(offset_of!(EctRegisters, tc), 0x10);
        assert_eq!(offset_of!(EctRegisters, pactl), 0x20);
        assert_eq!(offset_of!(EctRegisters, pbctl), 0x30);
        assert_eq!(offset_of!(EctRegisters, tch), 0x38);
        assert_eq!(ECT_BASE.as_ptr() as usize, 0x0040);
    }

    #[test]
    fn prescaler_group() {
        // PR is the merged view of the PR2/PR1/PR0 bits.
        assert_eq!(TSCR2::PR.mask << TSCR2::PR.shift, 0b0000_0111);
        assert_eq!(TSCR2::PR.shift, 0);
    }

    #[test]
    fn accumulator_pair_reassembles_word() {
        use tock_registers::interfaces::{Readable, Writeable};
        use tock_registers::registers::InMemoryRegister;

        // Writing the two 8-bit halves must produce the same pattern as
        // one big-endian word write.
        let reg = InMemoryRegister::<u16, PACNT32::Register>::new(0);
        reg.write(PACNT32::PACN3.val(0x12) + PACNT32::PACN2.val(0x34));
        assert_eq!(reg.get(), 0x1234);
        assert_eq!(reg.read(PACNT32::PACN3), 0x12);
        assert_eq!(reg.read(PACNT32::PACN2), 0x34);

        let hi = (PACNT32::PACN3.mask as u32) << PACNT32::PACN3.shift;
        let lo = (PACNT32::PACN2.mask as u32) << PACNT32::PACN2.shift;
        assert_eq!(hi | lo, 0xFFFF);
        assert_eq!(hi & lo, 0);
    }

    #[test]
    fn millisecond_arithmetic_wraps() {
        // The counter delta survives a 16-bit overflow: 0xFFF0 -> 0x0010
        // is 0x20 counts.
        let last: u16 = 0xFFF0;
        let now: u16 = 0x0010;
        assert_eq!(now.wrapping_sub(last), 0x20);
    }
}
