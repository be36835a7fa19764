// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Breakpoint module (BKP), used by debuggers for hardware breakpoints.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;

pub const BKP_BASE: StaticRef<BkpRegisters> =
    unsafe { StaticRef::new(0x0028 as *const BkpRegisters) };

register_structs! {
    pub BkpRegisters {
        /// Breakpoint control register 0; 0x0028
        (0x00 => bkpct0: ReadWrite<u8, BKPCT0::Register>),
        /// Breakpoint control register 1; 0x0029
        (0x01 => bkpct1: ReadWrite<u8, BKPCT1::Register>),
        /// First address memory expansion breakpoint register; 0x002A
        (0x02 => bkp0x: ReadWrite<u8, BKPX::Register>),
        /// First address high byte breakpoint register; 0x002B
        (0x03 => bkp0h: ReadWrite<u8>),
        /// First address low byte breakpoint register; 0x002C
        (0x04 => bkp0l: ReadWrite<u8>),
        /// Second address memory expansion breakpoint register; 0x002D
        (0x05 => bkp1x: ReadWrite<u8, BKPX::Register>),
        /// Data (second address) high byte breakpoint register; 0x002E
        (0x06 => bkp1h: ReadWrite<u8>),
        /// Data (second address) low byte breakpoint register; 0x002F
        (0x07 => bkp1l: ReadWrite<u8>),
        (0x08 => @END),
    }
}

register_bitfields![u8,
    pub BKPCT0 [
        /// Breakpoint enable
        BKEN OFFSET(7) NUMBITS(1) [],
        /// Full (address + data) mode instead of dual address mode
        BKFULL OFFSET(6) NUMBITS(1) [],
        /// Break to BDM instead of SWI
        BKBDM OFFSET(5) NUMBITS(1) [],
        /// Break on tagged instruction instead of any access
        BKTAG OFFSET(4) NUMBITS(1) []
    ],
    pub BKPCT1 [
        BK0MBH OFFSET(7) NUMBITS(1) [],
        BK0MBL OFFSET(6) NUMBITS(1) [],
        BK1MBH OFFSET(5) NUMBITS(1) [],
        BK1MBL OFFSET(4) NUMBITS(1) [],
        BK0RWE OFFSET(3) NUMBITS(1) [],
        BK0RW OFFSET(2) NUMBITS(1) [],
        BK1RWE OFFSET(1) NUMBITS(1) [],
        BK1RW OFFSET(0) NUMBITS(1) []
    ],
    pub BKPX [
        /// Expansion page for the breakpoint address
        BKV OFFSET(0) NUMBITS(6) []
    ],
];

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<BkpRegisters>(), 0x08);
        assert_eq!(offset_of!(BkpRegisters, bkpct0), 0x00);
        assert_eq!(offset_of!(BkpRegisters, bkp1l), 0x07);
        assert_eq!(BKP_BASE.as_ptr() as usize, 0x0028);
    }
}
