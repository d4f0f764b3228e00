// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        $crate::_log::info!(target: concat!("psdl::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        $crate::_log::info!(target: concat!("psdl::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        $crate::_log::warn!(target: concat!("psdl::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        $crate::_log::warn!(target: concat!("psdl::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at debug level if diagnostics logging is enabled.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if $crate::is_diagnostics_enabled() {
            $crate::_log::debug!(target: concat!("psdl::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if $crate::is_diagnostics_enabled() {
            $crate::_log::debug!(target: concat!("psdl::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// This function is meant to be called once at the start of the program.
/// It does not install a logger: the embedding application picks the `log` backend,
/// this only toggles the per scan point diagnostics emitted by the builder.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}
