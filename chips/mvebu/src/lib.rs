// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Peripheral implementations for the Marvell EBU SoC family
//! (Orion, Armada 375, Armada 380, Armada XP).

#![no_std]

pub mod spi;
