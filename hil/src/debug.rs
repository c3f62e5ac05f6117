// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Support for in-driver debugging output.
//!
//! Boards install a [`core::fmt::Write`] implementation (typically a
//! UART wrapper) once during setup with [`set_debug_writer`]. Driver
//! code then prints diagnostics with the `debug!` macro. Output is
//! silently dropped until a writer is installed.

use core::fmt::{Arguments, Write};

static mut DEBUG_WRITER: Option<&'static mut dyn Write> = None;

/// Install the sink used by the `debug!` macro.
///
/// # Safety
///
/// Must be called from board setup code before any other thread of
/// execution can invoke `debug!`, and at most once.
pub unsafe fn set_debug_writer(writer: &'static mut dyn Write) {
    *core::ptr::addr_of_mut!(DEBUG_WRITER) = Some(writer);
}

/// Internal helper for the `debug!` macro. Not intended to be called
/// directly.
pub fn debug_print(args: Arguments) {
    // The writer is installed once during board setup and never while
    // output is in flight; targets are single-threaded.
    unsafe {
        if let Some(writer) = &mut *core::ptr::addr_of_mut!(DEBUG_WRITER) {
            let _ = writer.write_fmt(args);
        }
    }
}

/// In-driver `println()` analog, terminated with `\r\n`.
#[macro_export]
macro_rules! debug {
    () => ({
        $crate::debug::debug_print(format_args!("\r\n"))
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_print(format_args!(concat!($msg, "\r\n")))
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_print(format_args!(concat!($fmt, "\r\n"), $($arg)+))
    });
}
