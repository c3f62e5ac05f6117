// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Interface for synchronous SPI host (master) controllers.
//!
//! This interface targets controllers that move data with blocking,
//! polled transfers: every operation completes (or times out
//! internally) before it returns. An external bus-management layer is
//! responsible for serializing access to one controller; no locking
//! happens at this level.

use crate::ErrorCode;

/// Data order defines the order of bits sent over the wire: most
/// significant first, or least significant first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DataOrder {
    /// Send the most significant bit first.
    MSBFirst,
    /// Send the least significant bit first.
    LSBFirst,
}

/// Clock polarity (CPOL) defines whether the SPI clock is high or low
/// when idle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockPolarity {
    /// The clock is low when the SPI bus is not active. This is CPOL = 0.
    IdleLow,
    /// The clock is high when the SPI bus is not active. This is CPOL = 1.
    IdleHigh,
}

/// Clock phase (CPHA) defines whether to sample and send data on a
/// leading or trailing clock edge.
///
/// Consult a SPI reference on how CPHA interacts with CPOL.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockPhase {
    /// Sample on the leading clock edge. This is CPHA = 0.
    SampleLeading,
    /// Sample on the trailing clock edge. This is CPHA = 1.
    SampleTrailing,
}

/// A complete SPI mode setting: polarity, phase, and bit order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mode {
    pub polarity: ClockPolarity,
    pub phase: ClockPhase,
    pub order: DataOrder,
}

/// Chip-select scoping for one transfer request.
///
/// A logical message may be split across several requests sharing a
/// single chip-select window: pass [`TransferFlags::BEGIN`] on the
/// first request and [`TransferFlags::END`] on the last. Chip-select
/// is guaranteed deasserted after an END-flagged request, whether or
/// not the transfer saw timeouts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransferFlags {
    /// Assert chip-select before the first byte of this request.
    pub begin: bool,
    /// Deassert chip-select after the last byte of this request.
    pub end: bool,
}

impl TransferFlags {
    /// Continue an already-open chip-select window.
    pub const NONE: TransferFlags = TransferFlags {
        begin: false,
        end: false,
    };
    /// Open a chip-select window that later requests will continue.
    pub const BEGIN: TransferFlags = TransferFlags {
        begin: true,
        end: false,
    };
    /// Close the current chip-select window after this request.
    pub const END: TransferFlags = TransferFlags {
        begin: false,
        end: true,
    };
    /// A self-contained request: assert and deassert around it.
    pub const BEGIN_END: TransferFlags = TransferFlags {
        begin: true,
        end: true,
    };
}

/// Trait for synchronous SPI host controllers.
///
/// The operation surface mirrors what a generic bus-management layer
/// needs: one-time initialization, claiming and releasing the bus
/// around a transaction, mode/speed configuration, and the transfer
/// primitive itself.
pub trait SpiHost {
    /// Initialize the controller into its idle-ready state: clear any
    /// pending completion events and configure event masking for
    /// polled operation. Called once after construction, before any
    /// other operation.
    fn init(&self) -> Result<(), ErrorCode>;

    /// Select which chip-select line subsequent transfers address and
    /// run the board's pre-claim hook, if any. `cs` is the controller's
    /// chip-select index, not a GPIO number.
    fn claim_bus(&self, cs: u32) -> Result<(), ErrorCode>;

    /// Run the board's post-release hook, if any. The controller state
    /// itself needs no teardown.
    fn release_bus(&self) -> Result<(), ErrorCode>;

    /// Program the bus clock as close to (but not above) `rate` Hz as
    /// the controller's divisor allows.
    fn set_speed(&self, rate: u32) -> Result<(), ErrorCode>;

    /// Program clock polarity, clock phase, and bit order. Bits of the
    /// configuration register outside the mode field are preserved.
    fn set_mode(&self, mode: Mode) -> Result<(), ErrorCode>;

    /// Exchange `bitlen` bits: clock out bytes from `write` (or zeros
    /// if `write` is `None`) while capturing received bytes into
    /// `read` (if present). Only whole bytes are moved; see the
    /// implementation for the exact residual-bit behavior.
    fn transfer(
        &self,
        bitlen: usize,
        write: Option<&[u8]>,
        read: Option<&mut [u8]>,
        flags: TransferFlags,
    ) -> Result<(), ErrorCode>;
}

/// Board-specific chip-select muxing hooks.
///
/// Some boards route a controller's chip-select through external
/// muxing that must be switched around a transaction. Boards that need
/// this supply an implementation to the driver at construction; the
/// default bodies do nothing.
pub trait BoardSpiHooks {
    /// Called after the controller has been programmed with `cs`,
    /// before any transfer in the claimed window.
    fn pre_claim(&self, _cs: u32) -> Result<(), ErrorCode> {
        Ok(())
    }

    /// Called when the bus is released.
    fn post_release(&self) -> Result<(), ErrorCode> {
        Ok(())
    }
}
