// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

//! Handlers for functions a remote caller can invoke on the node.
//!
//! Handlers only record the request and acknowledge it. The work happens on the next
//! acquisition cycle, and its outcome is only reported through the log.

use crate::commands::PendingCommands;
use core::str::FromStr;
use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, warn};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Status returned when the request has been queued.
pub const STATUS_ACCEPTED: i32 = 1;
/// Status returned for a function name the node does not know.
pub const STATUS_UNKNOWN_FUNCTION: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum RemoteFunction {
    /// Argument is the reference weight currently on the scale.
    Calibrate,
    /// Argument is ignored.
    Tare,
}

pub fn invoke<M: RawMutex>(commands: &PendingCommands<M>, name: &str, argument: &str) -> i32 {
    match RemoteFunction::from_str(name) {
        Ok(RemoteFunction::Calibrate) => calibrate(commands, argument),
        Ok(RemoteFunction::Tare) => tare(commands, argument),
        Err(_) => {
            warn!("Unknown remote function {}", name);
            STATUS_UNKNOWN_FUNCTION
        }
    }
}

pub fn calibrate<M: RawMutex>(commands: &PendingCommands<M>, argument: &str) -> i32 {
    let reference_weight = parse_integer_argument(argument);
    debug!("Calibration requested with reference weight {}", reference_weight);
    commands.request_calibration(reference_weight);
    STATUS_ACCEPTED
}

pub fn tare<M: RawMutex>(commands: &PendingCommands<M>, _argument: &str) -> i32 {
    debug!("Tare requested");
    commands.request_tare();
    STATUS_ACCEPTED
}

/// Lenient integer parse: leading ASCII whitespace, an optional sign, then as many digits as
/// follow. Anything unparseable gives 0 and values past the `i32` range saturate.
pub fn parse_integer_argument(argument: &str) -> i32 {
    let trimmed = argument.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + (digit - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::PendingCommand;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn calibrate_queues_the_reference_weight() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        assert_eq!(invoke(&commands, "calibrate", "500"), STATUS_ACCEPTED);
        assert_eq!(
            commands.take(),
            PendingCommand {
                calibrate: Some(500),
                tare: false
            }
        );
    }

    #[test]
    fn tare_ignores_its_argument() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        assert_eq!(invoke(&commands, "tare", "anything at all"), STATUS_ACCEPTED);
        assert_eq!(
            commands.take(),
            PendingCommand {
                calibrate: None,
                tare: true
            }
        );
    }

    #[test]
    fn unknown_function_changes_nothing() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        assert_eq!(invoke(&commands, "reboot", ""), STATUS_UNKNOWN_FUNCTION);
        assert_eq!(invoke(&commands, "Calibrate", "10"), STATUS_UNKNOWN_FUNCTION);
        assert!(commands.peek().is_empty());
    }

    #[test]
    fn garbage_reference_weight_is_queued_as_zero() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        invoke(&commands, "calibrate", "ten kilos");
        assert_eq!(commands.take().calibrate, Some(0));
    }

    #[test]
    fn integer_argument_parsing() {
        assert_eq!(parse_integer_argument("42"), 42);
        assert_eq!(parse_integer_argument("  \t-17"), -17);
        assert_eq!(parse_integer_argument("+8"), 8);
        assert_eq!(parse_integer_argument("12.75"), 12);
        assert_eq!(parse_integer_argument("50kg"), 50);
        assert_eq!(parse_integer_argument(""), 0);
        assert_eq!(parse_integer_argument("-"), 0);
        assert_eq!(parse_integer_argument("x12"), 0);
        assert_eq!(parse_integer_argument("99999999999"), i32::MAX);
        assert_eq!(parse_integer_argument("-99999999999"), i32::MIN);
    }

    #[test]
    fn only_ascii_whitespace_is_skipped() {
        assert_eq!(parse_integer_argument("\n\r\x0c 12"), 12);
        assert_eq!(parse_integer_argument("\u{a0}12"), 0);
        assert_eq!(parse_integer_argument("\u{2003}-5"), 0);
    }

    #[test]
    fn function_names_round_trip() {
        use strum::IntoEnumIterator;
        for function in RemoteFunction::iter() {
            let name: &'static str = function.into();
            assert_eq!(RemoteFunction::from_str(name), Ok(function));
        }
    }
}
