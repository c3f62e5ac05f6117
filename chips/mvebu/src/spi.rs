// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Serial Peripheral Interface (SPI) host controller.
//!
//! Polled driver for the SPI controller found on Marvell EBU SoCs. The
//! controller shifts one byte per data-out write; completion is
//! detected by polling the serial-memory read-ready bit in the
//! interrupt cause register. There is no interrupt-driven or DMA path.
//!
//! Hardware access is routed through the [`SpiRegisterBank`]
//! capability so the clock, mode, and transfer logic can run against a
//! fake register file in unit tests. On hardware, [`MmioRegisterBank`]
//! backs the capability with the memory-mapped register block.

use core::cell::Cell;

use spi_hil::debug;
use spi_hil::spi::{
    BoardSpiHooks, ClockPhase, ClockPolarity, DataOrder, Mode, SpiHost, TransferFlags,
};
use spi_hil::utilities::StaticRef;
use spi_hil::ErrorCode;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{InMemoryRegister, ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Serial memory interface register block.
    pub SpiRegisters {
        /// Control: chip-select enable and index, controller ready.
        (0x00 => ctrl: ReadWrite<u32, CTRL::Register>),
        /// Interface configuration: prescaler, chunk size, address
        /// length, and mode bits.
        (0x04 => cfg: ReadWrite<u32, CFG::Register>),
        /// Data out: writing starts a transfer of the low byte(s).
        (0x08 => dout: ReadWrite<u32>),
        /// Data in: received byte(s), valid once read-ready is set.
        (0x0c => din: ReadOnly<u32>),
        /// Interrupt cause.
        (0x10 => irq_cause: ReadWrite<u32, IRQ::Register>),
        /// Interrupt mask.
        (0x14 => irq_mask: ReadWrite<u32, IRQ::Register>),
        /// Timing parameters 1: MISO sample point.
        (0x18 => timing1: ReadWrite<u32, TIMING1::Register>),
        (0x1c => _reserved0),
        (0x20 => @END),
    }
}

register_bitfields![u32,
    CTRL [
        /// Drive the external chip-select line active.
        CSN_ACT OFFSET(0) NUMBITS(1) [],
        /// Serial memory data transfer ready.
        SMEMRDY OFFSET(1) NUMBITS(1) [],
        /// Chip-select index addressed by transfers.
        CS OFFSET(2) NUMBITS(3) []
    ],
    CFG [
        /// Clock prescaler applied to the core clock.
        CLKPRESCL OFFSET(0) NUMBITS(5) [],
        /// Transfer chunk size.
        XFERLEN OFFSET(5) NUMBITS(1) [
            OneByte = 0,
            TwoByte = 1
        ],
        /// Serial memory address length.
        ADRLEN OFFSET(8) NUMBITS(2) [
            OneByte = 0,
            TwoByte = 1,
            ThreeByte = 2,
            FourByte = 3
        ],
        /// Clock polarity (CPOL).
        CPOL OFFSET(11) NUMBITS(1) [],
        /// Clock phase (CPHA).
        CPHA OFFSET(12) NUMBITS(1) [],
        /// Transmit least-significant bit first.
        TXLSBF OFFSET(13) NUMBITS(1) [],
        /// Receive least-significant bit first.
        RXLSBF OFFSET(14) NUMBITS(1) []
    ],
    IRQ [
        /// Serial memory data read-ready.
        SMEMRDIRQ OFFSET(0) NUMBITS(1) []
    ],
    TIMING1 [
        /// MISO sample point.
        TMISO_SAMPLE OFFSET(6) NUMBITS(2) []
    ]
];

/// Poll iterations allowed per byte before reporting a timeout.
/// Corresponds to roughly one second at the polling granularity used.
pub const BYTE_TIMEOUT: u32 = 10_000;

/// Fixed offset added to the computed clock divisor.
const PRESCALER_OFFSET: u32 = 0x10;
/// Smallest divisor the prescaler field supports.
const PRESCALER_MIN: u32 = 0x12;
/// Largest divisor the prescaler field supports (the field mask).
const PRESCALER_MAX: u32 = 0x1f;
/// Largest chip-select index the CTRL.CS field can hold.
const CS_MAX: u32 = 0x7;
/// Core clock frequency at which erratum FE-9144572 applies.
const ERRATUM_TCLK_HZ: u32 = 250_000_000;

pub const SPI0_BASE: StaticRef<SpiRegisters> =
    unsafe { StaticRef::new(0xf101_0600 as *const SpiRegisters) };

/// Registers the driver touches, as seen through [`SpiRegisterBank`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Register {
    Ctrl,
    Cfg,
    Dout,
    Din,
    IrqCause,
    IrqMask,
    Timing1,
}

/// Word-level access to the controller's register file.
///
/// The driver performs all hardware access through this trait so that
/// its configuration and transfer logic is independent of how the
/// registers are reached.
pub trait SpiRegisterBank {
    fn read(&self, reg: Register) -> u32;
    fn write(&self, reg: Register, value: u32);
}

/// [`SpiRegisterBank`] over the memory-mapped register block.
pub struct MmioRegisterBank {
    registers: StaticRef<SpiRegisters>,
}

impl MmioRegisterBank {
    pub const fn new(registers: StaticRef<SpiRegisters>) -> MmioRegisterBank {
        MmioRegisterBank { registers }
    }
}

impl SpiRegisterBank for MmioRegisterBank {
    fn read(&self, reg: Register) -> u32 {
        match reg {
            Register::Ctrl => self.registers.ctrl.get(),
            Register::Cfg => self.registers.cfg.get(),
            Register::Dout => self.registers.dout.get(),
            Register::Din => self.registers.din.get(),
            Register::IrqCause => self.registers.irq_cause.get(),
            Register::IrqMask => self.registers.irq_mask.get(),
            Register::Timing1 => self.registers.timing1.get(),
        }
    }

    fn write(&self, reg: Register, value: u32) {
        match reg {
            Register::Ctrl => self.registers.ctrl.set(value),
            Register::Cfg => self.registers.cfg.set(value),
            Register::Dout => self.registers.dout.set(value),
            // The received-data register is read-only.
            Register::Din => {}
            Register::IrqCause => self.registers.irq_cause.set(value),
            Register::IrqMask => self.registers.irq_mask.set(value),
            Register::Timing1 => self.registers.timing1.set(value),
        }
    }
}

/// Controller variant, selected by the board description.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Variant {
    Orion,
    Armada375,
    Armada380,
    ArmadaXp,
}

impl Variant {
    /// Whether erratum FE-9144572 (data corruption on reads at 50 MHz
    /// with CPOL=CPHA=1 and a 250 MHz core clock) applies.
    const fn has_50mhz_ac_erratum(self) -> bool {
        matches!(self, Variant::Armada380)
    }
}

/// SPI host controller instance.
///
/// Single-threaded and fully synchronous: every operation blocks until
/// completion or an internal per-byte timeout. The caller serializes
/// access; the driver performs no locking.
pub struct MvebuSpi<'a, B: SpiRegisterBank> {
    bank: B,
    variant: Variant,
    tclk_hz: u32,
    prescaler: Cell<u32>,
    timeouts: Cell<u32>,
    board_hooks: Option<&'a dyn BoardSpiHooks>,
}

impl<'a, B: SpiRegisterBank> MvebuSpi<'a, B> {
    pub const fn new(
        bank: B,
        variant: Variant,
        tclk_hz: u32,
        board_hooks: Option<&'a dyn BoardSpiHooks>,
    ) -> MvebuSpi<'a, B> {
        MvebuSpi {
            bank,
            variant,
            tclk_hz,
            prescaler: Cell::new(0),
            timeouts: Cell::new(0),
            board_hooks,
        }
    }

    /// Last divisor programmed by `set_speed`.
    pub fn clock_prescaler(&self) -> u32 {
        self.prescaler.get()
    }

    /// Number of per-byte completion timeouts observed since
    /// construction. Timeouts do not abort a transfer; this counter is
    /// the diagnostic record of them.
    pub fn timeout_count(&self) -> u32 {
        self.timeouts.get()
    }

    fn cs_activate(&self) {
        let ctrl = InMemoryRegister::<u32, CTRL::Register>::new(self.bank.read(Register::Ctrl));
        ctrl.modify(CTRL::CSN_ACT::SET);
        self.bank.write(Register::Ctrl, ctrl.get());
    }

    fn cs_deactivate(&self) {
        let ctrl = InMemoryRegister::<u32, CTRL::Register>::new(self.bank.read(Register::Ctrl));
        ctrl.modify(CTRL::CSN_ACT::CLEAR);
        self.bank.write(Register::Ctrl, ctrl.get());
    }

    /// Clock one byte out and poll for the byte clocked in. Returns
    /// `None` if read-ready never asserted within the budget.
    fn exchange_byte(&self, out: u8) -> Option<u8> {
        // The read-ready event must be cleared before the write to the
        // data-out register starts the next shift.
        let cause = InMemoryRegister::<u32, IRQ::Register>::new(self.bank.read(Register::IrqCause));
        cause.modify(IRQ::SMEMRDIRQ::CLEAR);
        self.bank.write(Register::IrqCause, cause.get());

        self.bank.write(Register::Dout, out as u32);

        for _ in 0..BYTE_TIMEOUT {
            let cause =
                InMemoryRegister::<u32, IRQ::Register>::new(self.bank.read(Register::IrqCause));
            if cause.is_set(IRQ::SMEMRDIRQ) {
                return Some(self.bank.read(Register::Din) as u8);
            }
        }
        None
    }

    /// Erratum FE-9144572: with a 250 MHz core clock and the interface
    /// configured for CPOL=CPHA=1, reads from the device can return
    /// corrupt data. The workaround moves the MISO sample point to the
    /// alternate value for that configuration only.
    fn apply_50mhz_ac_timing_erratum(&self, mode: Mode) {
        let timing =
            InMemoryRegister::<u32, TIMING1::Register>::new(self.bank.read(Register::Timing1));

        if self.tclk_hz == ERRATUM_TCLK_HZ
            && mode.polarity == ClockPolarity::IdleHigh
            && mode.phase == ClockPhase::SampleTrailing
        {
            timing.modify(TIMING1::TMISO_SAMPLE.val(2));
        } else {
            timing.modify(TIMING1::TMISO_SAMPLE.val(1));
        }

        self.bank.write(Register::Timing1, timing.get());
    }
}

impl<'a, B: SpiRegisterBank> SpiHost for MvebuSpi<'a, B> {
    fn init(&self) -> Result<(), ErrorCode> {
        let ctrl = InMemoryRegister::<u32, CTRL::Register>::new(0);
        ctrl.write(CTRL::SMEMRDY::SET);
        self.bank.write(Register::Ctrl, ctrl.get());

        // Clear any pending read-ready event (write-one-to-clear),
        // then mask all interrupt sources; completion is detected by
        // polling the cause register.
        let cause = InMemoryRegister::<u32, IRQ::Register>::new(0);
        cause.write(IRQ::SMEMRDIRQ::SET);
        self.bank.write(Register::IrqCause, cause.get());
        self.bank.write(Register::IrqMask, 0);

        Ok(())
    }

    fn claim_bus(&self, cs: u32) -> Result<(), ErrorCode> {
        if cs > CS_MAX {
            return Err(ErrorCode::INVAL);
        }

        let ctrl = InMemoryRegister::<u32, CTRL::Register>::new(self.bank.read(Register::Ctrl));
        ctrl.modify(CTRL::CS.val(cs));
        self.bank.write(Register::Ctrl, ctrl.get());

        match self.board_hooks {
            Some(hooks) => hooks.pre_claim(cs),
            None => Ok(()),
        }
    }

    fn release_bus(&self) -> Result<(), ErrorCode> {
        match self.board_hooks {
            Some(hooks) => hooks.post_release(),
            None => Ok(()),
        }
    }

    fn set_speed(&self, rate: u32) -> Result<(), ErrorCode> {
        if rate == 0 {
            return Err(ErrorCode::INVAL);
        }

        let mut prescaler = (self.tclk_hz / 2 / rate) + PRESCALER_OFFSET;
        if prescaler < PRESCALER_MIN {
            prescaler = PRESCALER_MIN;
        }
        if prescaler > PRESCALER_MAX {
            prescaler = PRESCALER_MAX;
        }
        self.prescaler.set(prescaler);

        // Full overwrite: nothing else varies this register between
        // configuration calls, and set_mode reprograms the mode bits
        // immediately after on every reconfiguration.
        let cfg = InMemoryRegister::<u32, CFG::Register>::new(0);
        cfg.write(CFG::ADRLEN::ThreeByte + CFG::CLKPRESCL.val(prescaler));
        self.bank.write(Register::Cfg, cfg.get());

        Ok(())
    }

    fn set_mode(&self, mode: Mode) -> Result<(), ErrorCode> {
        let cfg = InMemoryRegister::<u32, CFG::Register>::new(self.bank.read(Register::Cfg));
        cfg.modify(CFG::CPOL::CLEAR + CFG::CPHA::CLEAR + CFG::TXLSBF::CLEAR + CFG::RXLSBF::CLEAR);

        if mode.polarity == ClockPolarity::IdleHigh {
            cfg.modify(CFG::CPOL::SET);
        }
        if mode.phase == ClockPhase::SampleTrailing {
            cfg.modify(CFG::CPHA::SET);
        }
        if let DataOrder::LSBFirst = mode.order {
            cfg.modify(CFG::TXLSBF::SET + CFG::RXLSBF::SET);
        }

        self.bank.write(Register::Cfg, cfg.get());

        if self.variant.has_50mhz_ac_erratum() {
            self.apply_50mhz_ac_timing_erratum(mode);
        }

        Ok(())
    }

    fn transfer(
        &self,
        bitlen: usize,
        write: Option<&[u8]>,
        mut read: Option<&mut [u8]>,
        flags: TransferFlags,
    ) -> Result<(), ErrorCode> {
        // Bytes the loop below will clock. A trailing residue of 1-4
        // bits is never transferred (known limitation inherited from
        // the hardware's bit counter and the byte-wise engine).
        let byte_count = (bitlen + 3) / 8;
        if write.map_or(false, |buf| buf.len() < byte_count) {
            return Err(ErrorCode::SIZE);
        }
        if read.as_ref().map_or(false, |buf| buf.len() < byte_count) {
            return Err(ErrorCode::SIZE);
        }

        if flags.begin {
            self.cs_activate();
        }

        // Handle data in 1-byte chunks. The hardware also has a 2-byte
        // mode, which this driver does not use.
        let cfg = InMemoryRegister::<u32, CFG::Register>::new(self.bank.read(Register::Cfg));
        cfg.modify(CFG::XFERLEN::OneByte);
        self.bank.write(Register::Cfg, cfg.get());

        let mut remaining = bitlen;
        let mut index = 0;
        while remaining > 4 {
            let out = write.map_or(0, |buf| buf[index]);
            match self.exchange_byte(out) {
                Some(byte) => {
                    if let Some(buf) = read.as_deref_mut() {
                        buf[index] = byte;
                    }
                }
                None => {
                    // A stuck byte is reported and skipped; the rest
                    // of the transfer still runs, and an END flag
                    // below still releases chip-select.
                    self.timeouts.set(self.timeouts.get() + 1);
                    debug!("mvebu-spi: timeout waiting for read-ready, byte {}", index);
                }
            }
            index += 1;
            remaining = remaining.saturating_sub(8);
        }

        if flags.end {
            self.cs_deactivate();
        }

        Ok(())
    }
}
