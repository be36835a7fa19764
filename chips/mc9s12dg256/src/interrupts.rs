// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Interrupt vector addresses.
//!
//! Each vector is the address of a two-byte slot holding the handler
//! address; the table occupies 0xFF80-0xFFFF at the top of the fixed
//! flash. Vectors for the CAN2, CAN3 and BDLC modules exist in the
//! family table but those modules are not fitted on the DG256.

pub const RESET: u16 = 0xFFFE;
pub const CLOCK_MONITOR_FAIL: u16 = 0xFFFC;
pub const COP_FAIL: u16 = 0xFFFA;
pub const UNIMPLEMENTED_OPCODE_TRAP: u16 = 0xFFF8;
pub const SWI: u16 = 0xFFF6;
pub const XIRQ: u16 = 0xFFF4;
pub const IRQ: u16 = 0xFFF2;
pub const RTI: u16 = 0xFFF0;

pub const TIMER_CHANNEL_0: u16 = 0xFFEE;
pub const TIMER_CHANNEL_1: u16 = 0xFFEC;
pub const TIMER_CHANNEL_2: u16 = 0xFFEA;
pub const TIMER_CHANNEL_3: u16 = 0xFFE8;
pub const TIMER_CHANNEL_4: u16 = 0xFFE6;
pub const TIMER_CHANNEL_5: u16 = 0xFFE4;
pub const TIMER_CHANNEL_6: u16 = 0xFFE2;
pub const TIMER_CHANNEL_7: u16 = 0xFFE0;
pub const TIMER_OVERFLOW: u16 = 0xFFDE;
pub const PULSE_ACC_A_OVERFLOW: u16 = 0xFFDC;
pub const PULSE_ACC_A_INPUT_EDGE: u16 = 0xFFDA;

pub const SPI0: u16 = 0xFFD8;
pub const SCI0: u16 = 0xFFD6;
pub const SCI1: u16 = 0xFFD4;
pub const ATD0: u16 = 0xFFD2;
pub const ATD1: u16 = 0xFFD0;
pub const PORT_J: u16 = 0xFFCE;
pub const PORT_H: u16 = 0xFFCC;
pub const MODULUS_COUNTER_UNDERFLOW: u16 = 0xFFCA;
pub const PULSE_ACC_B_OVERFLOW: u16 = 0xFFC8;
pub const PLL_LOCK: u16 = 0xFFC6;
pub const SELF_CLOCK_MODE: u16 = 0xFFC4;
pub const IIC: u16 = 0xFFC0;
pub const SPI1: u16 = 0xFFBE;
pub const SPI2: u16 = 0xFFBC;
pub const EEPROM: u16 = 0xFFBA;
pub const FLASH: u16 = 0xFFB8;

pub const CAN0_WAKEUP: u16 = 0xFFB6;
pub const CAN0_ERRORS: u16 = 0xFFB4;
pub const CAN0_RECEIVE: u16 = 0xFFB2;
pub const CAN0_TRANSMIT: u16 = 0xFFB0;
pub const CAN1_WAKEUP: u16 = 0xFFAE;
pub const CAN1_ERRORS: u16 = 0xFFAC;
pub const CAN1_RECEIVE: u16 = 0xFFAA;
pub const CAN1_TRANSMIT: u16 = 0xFFA8;
pub const CAN4_WAKEUP: u16 = 0xFF96;
pub const CAN4_ERRORS: u16 = 0xFF94;
pub const CAN4_RECEIVE: u16 = 0xFF92;
pub const CAN4_TRANSMIT: u16 = 0xFF90;

pub const PORT_P: u16 = 0xFF8E;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_are_aligned_and_in_table() {
        let vectors = [
            RESET,
            CLOCK_MONITOR_FAIL,
            COP_FAIL,
            UNIMPLEMENTED_OPCODE_TRAP,
            SWI,
            XIRQ,
            IRQ,
            RTI,
            TIMER_CHANNEL_0,
            TIMER_CHANNEL_7,
            TIMER_OVERFLOW,
            SPI0,
            SCI0,
            SCI1,
            ATD0,
            ATD1,
            PLL_LOCK,
            IIC,
            EEPROM,
            FLASH,
            CAN0_WAKEUP,
            CAN0_TRANSMIT,
            CAN4_WAKEUP,
            CAN4_TRANSMIT,
            PORT_P,
        ];
        for vector in vectors {
            assert_eq!(vector & 1, 0);
            assert!(vector >= 0xFF80);
        }
    }

    #[test]
    fn can_vector_blocks_are_contiguous() {
        // Each controller owns four consecutive vectors ordered
        // transmit, receive, errors, wakeup from the low address up.
        assert_eq!(CAN0_TRANSMIT + 2, CAN0_RECEIVE);
        assert_eq!(CAN0_RECEIVE + 2, CAN0_ERRORS);
        assert_eq!(CAN0_ERRORS + 2, CAN0_WAKEUP);
        assert_eq!(CAN1_TRANSMIT + 2, CAN1_RECEIVE);
        assert_eq!(CAN4_TRANSMIT + 2, CAN4_RECEIVE);
    }
}
