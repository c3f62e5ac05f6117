// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Driver-facing abstractions shared by SPI host controller
//! implementations: error codes, debug output, the host controller
//! interface, and register-pointer utilities.

#![no_std]

pub mod debug;
pub mod spi;
pub mod utilities;

mod errorcode;
pub use errorcode::ErrorCode;
