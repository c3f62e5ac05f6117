// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Standard error enum for invoking operations.

/// Standard errors.
///
/// This does not feature any success cases; operations that can fail
/// return `Result<_, ErrorCode>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// Underlying system is busy; retry
    BUSY = 1,
    /// An invalid parameter was passed
    INVAL = 2,
    /// Parameter passed was too large
    SIZE = 3,
    /// Operation or command is unsupported
    NOSUPPORT = 4,
    /// Device does not exist
    NODEVICE = 5,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}
