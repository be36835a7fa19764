// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Port integration module (PIM).
//!
//! General purpose I/O for ports T, S, M, P, H and J, each an 8-byte
//! window of data, input, direction, drive and pull registers. Ports P,
//! H and J add pin interrupt enable/flag registers; S and M instead
//! carry wired-or mode registers, and port M holds the module routing
//! register that remaps CAN and SPI pins.
//!
//! Ports A, B, E and K live in the core register space, see the
//! external bus interface block.

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::errorcode::ErrorCode;
use crate::static_ref::StaticRef;

pub const PIM_BASE: StaticRef<PimRegisters> =
    unsafe { StaticRef::new(0x0240 as *const PimRegisters) };

register_structs! {
    pub PimRegisters {
        /// Port T data register; 0x00
        (0x00 => ptt: ReadWrite<u8>),
        /// Port T input register; 0x01
        (0x01 => ptit: ReadOnly<u8>),
        /// Port T data direction register; 0x02
        (0x02 => ddrt: ReadWrite<u8>),
        /// Port T reduced drive register; 0x03
        (0x03 => rdrt: ReadWrite<u8>),
        /// Port T pull device enable register; 0x04
        (0x04 => pert: ReadWrite<u8>),
        /// Port T polarity select register; 0x05
        (0x05 => ppst: ReadWrite<u8>),
        (0x06 => _reserved0),
        /// Port S data register; 0x08
        (0x08 => pts: ReadWrite<u8>),
        /// Port S input register; 0x09
        (0x09 => ptis: ReadOnly<u8>),
        /// Port S data direction register; 0x0A
        (0x0A => ddrs: ReadWrite<u8>),
        /// Port S reduced drive register; 0x0B
        (0x0B => rdrs: ReadWrite<u8>),
        /// Port S pull device enable register; 0x0C
        (0x0C => pers: ReadWrite<u8>),
        /// Port S polarity select register; 0x0D
        (0x0D => ppss: ReadWrite<u8>),
        /// Port S wired-or mode register; 0x0E
        (0x0E => woms: ReadWrite<u8>),
        (0x0F => _reserved1),
        /// Port M data register; 0x10
        (0x10 => ptm: ReadWrite<u8>),
        /// Port M input register; 0x11
        (0x11 => ptim: ReadOnly<u8>),
        /// Port M data direction register; 0x12
        (0x12 => ddrm: ReadWrite<u8>),
        /// Port M reduced drive register; 0x13
        (0x13 => rdrm: ReadWrite<u8>),
        /// Port M pull device enable register; 0x14
        (0x14 => perm: ReadWrite<u8>),
        /// Port M polarity select register; 0x15
        (0x15 => ppsm: ReadWrite<u8>),
        /// Port M wired-or mode register; 0x16
        (0x16 => womm: ReadWrite<u8>),
        /// Module routing register; 0x17
        (0x17 => modrr: ReadWrite<u8, MODRR::Register>),
        /// Port P data register; 0x18
        (0x18 => ptp: ReadWrite<u8>),
        /// Port P input register; 0x19
        (0x19 => ptip: ReadOnly<u8>),
        /// Port P data direction register; 0x1A
        (0x1A => ddrp: ReadWrite<u8>),
        /// Port P reduced drive register; 0x1B
        (0x1B => rdrp: ReadWrite<u8>),
        /// Port P pull device enable register; 0x1C
        (0x1C => perp: ReadWrite<u8>),
        /// Port P polarity select register; 0x1D
        (0x1D => ppsp: ReadWrite<u8>),
        /// Port P interrupt enable register; 0x1E
        (0x1E => piep: ReadWrite<u8>),
        /// Port P interrupt flag register, cleared by writing 1; 0x1F
        (0x1F => pifp: ReadWrite<u8>),
        /// Port H data register; 0x20
        (0x20 => pth: ReadWrite<u8>),
        /// Port H input register; 0x21
        (0x21 => ptih: ReadOnly<u8>),
        /// Port H data direction register; 0x22
        (0x22 => ddrh: ReadWrite<u8>),
        /// Port H reduced drive register; 0x23
        (0x23 => rdrh: ReadWrite<u8>),
        /// Port H pull device enable register; 0x24
        (0x24 => perh: ReadWrite<u8>),
        /// Port H polarity select register; 0x25
        (0x25 => ppsh: ReadWrite<u8>),
        /// Port H interrupt enable register; 0x26
        (0x26 => pieh: ReadWrite<u8>),
        /// Port H interrupt flag register; 0x27
        (0x27 => pifh: ReadWrite<u8>),
        /// Port J data register; 0x28
        (0x28 => ptj: ReadWrite<u8>),
        /// Port J input register; 0x29
        (0x29 => ptij: ReadOnly<u8>),
        /// Port J data direction register; 0x2A
        (0x2A => ddrj: ReadWrite<u8>),
        /// Port J reduced drive register; 0x2B
        (0x2B => rdrj: ReadWrite<u8>),
        /// Port J pull device enable register; 0x2C
        (0x2C => perj: ReadWrite<u8>),
        /// Port J polarity select register; 0x2D
        (0x2D => ppsj: ReadWrite<u8>),
        /// Port J interrupt enable register; 0x2E
        (0x2E => piej: ReadWrite<u8>),
        /// Port J interrupt flag register; 0x2F
        (0x2F => pifj: ReadWrite<u8>),
        (0x30 => @END),
    }
}

register_bitfields![u8,
    pub MODRR [
        /// Route SPI0 from port S to port P
        MODRR4 OFFSET(4) NUMBITS(1) [],
        /// Route CAN4 pins
        CAN4 OFFSET(2) NUMBITS(2) [
            PortJ76 = 0,
            PortM43 = 1,
            PortM65 = 2
        ],
        /// Route CAN0 pins
        CAN0 OFFSET(0) NUMBITS(2) [
            PortM10 = 0,
            PortM32 = 1,
            PortM54 = 2,
            PortJ76 = 3
        ]
    ],
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GpioPort {
    T,
    S,
    M,
    P,
    H,
    J,
}

struct PortView<'a> {
    data: &'a ReadWrite<u8>,
    input: &'a ReadOnly<u8>,
    ddr: &'a ReadWrite<u8>,
    pull_enable: &'a ReadWrite<u8>,
    pull_polarity: &'a ReadWrite<u8>,
}

pub struct Pim {
    registers: StaticRef<PimRegisters>,
}

impl Pim {
    pub const fn new(registers: StaticRef<PimRegisters>) -> Pim {
        Pim { registers }
    }

    fn view(&self, port: GpioPort) -> PortView<'_> {
        let regs = &*self.registers;
        match port {
            GpioPort::T => PortView {
                data: &regs.ptt,
                input: &regs.ptit,
                ddr: &regs.ddrt,
                pull_enable: &regs.pert,
                pull_polarity: &regs.ppst,
            },
            GpioPort::S => PortView {
                data: &regs.pts,
                input: &regs.ptis,
                ddr: &regs.ddrs,
                pull_enable: &regs.pers,
                pull_polarity: &regs.ppss,
            },
            GpioPort::M => PortView {
                data: &regs.ptm,
                input: &regs.ptim,
                ddr: &regs.ddrm,
                pull_enable: &regs.perm,
                pull_polarity: &regs.ppsm,
            },
            GpioPort::P => PortView {
                data: &regs.ptp,
                input: &regs.ptip,
                ddr: &regs.ddrp,
                pull_enable: &regs.perp,
                pull_polarity: &regs.ppsp,
            },
            GpioPort::H => PortView {
                data: &regs.pth,
                input: &regs.ptih,
                ddr: &regs.ddrh,
                pull_enable: &regs.perh,
                pull_polarity: &regs.ppsh,
            },
            GpioPort::J => PortView {
                data: &regs.ptj,
                input: &regs.ptij,
                ddr: &regs.ddrj,
                pull_enable: &regs.perj,
                pull_polarity: &regs.ppsj,
            },
        }
    }

    pub fn make_output(&self, port: GpioPort, pin: u8) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        view.ddr.set(view.ddr.get() | mask);
        Ok(())
    }

    pub fn make_input(&self, port: GpioPort, pin: u8) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        view.ddr.set(view.ddr.get() & !mask);
        Ok(())
    }

    pub fn set(&self, port: GpioPort, pin: u8) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        view.data.set(view.data.get() | mask);
        Ok(())
    }

    pub fn clear(&self, port: GpioPort, pin: u8) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        view.data.set(view.data.get() & !mask);
        Ok(())
    }

    pub fn toggle(&self, port: GpioPort, pin: u8) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        view.data.set(view.data.get() ^ mask);
        Ok(())
    }

    /// Pin state from the input register, valid in either direction.
    pub fn read(&self, port: GpioPort, pin: u8) -> Result<bool, ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        Ok(view.input.get() & mask != 0)
    }

    /// Enable the pull device on an input pin, pulling up or down.
    pub fn enable_pull(&self, port: GpioPort, pin: u8, up: bool) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        if up {
            view.pull_polarity.set(view.pull_polarity.get() & !mask);
        } else {
            view.pull_polarity.set(view.pull_polarity.get() | mask);
        }
        view.pull_enable.set(view.pull_enable.get() | mask);
        Ok(())
    }

    pub fn disable_pull(&self, port: GpioPort, pin: u8) -> Result<(), ErrorCode> {
        let view = self.view(port);
        let mask = pin_mask(pin)?;
        view.pull_enable.set(view.pull_enable.get() & !mask);
        Ok(())
    }

    /// Reroute the CAN0 pins, e.g. onto PJ7/PJ6 on boards that wire
    /// the transceiver there.
    pub fn route_can0(&self, routing: MODRR::CAN0::Value) {
        let regs = self.registers;
        regs.modrr
            .set((regs.modrr.get() & !0x03) | (routing as u8));
    }
}

fn pin_mask(pin: u8) -> Result<u8, ErrorCode> {
    if pin > 7 {
        return Err(ErrorCode::INVAL);
    }
    Ok(1 << pin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<PimRegisters>(), 0x30);
        assert_eq!(offset_of!(PimRegisters, ptt), 0x00);
        assert_eq!(offset_of!(PimRegisters, pts), 0x08);
        assert_eq!(offset_of!(PimRegisters, modrr), 0x17);
        assert_eq!(offset_of!(PimRegisters, ptp), 0x18);
        assert_eq!(offset_of!(PimRegisters, pifj), 0x2F);
        assert_eq!(PIM_BASE.as_ptr() as usize, 0x0240);
    }

    #[test]
    fn pin_masks() {
        assert_eq!(pin_mask(0), Ok(0x01));
        assert_eq!(pin_mask(7), Ok(0x80));
        assert_eq!(pin_mask(8), Err(ErrorCode::INVAL));
    }

    #[test]
    fn can0_routing_codes() {
        assert_eq!(MODRR::CAN0::Value::PortM10 as u8, 0);
        assert_eq!(MODRR::CAN0::Value::PortJ76 as u8, 3);
    }
}
