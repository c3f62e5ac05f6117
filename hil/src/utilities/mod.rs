// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Utility types for chip crates.

mod static_ref;
pub use self::static_ref::StaticRef;
