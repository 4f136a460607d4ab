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

use log::LevelFilter;
use std::io::{Error as IoError, ErrorKind, Result as IoResult};

const OPTIONS_WITH_VALUES: [&str; 2] = ["--log-level", "--port"];

/// A remote function call as given on the command line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub port: Option<String>,
    pub function: String,
    pub argument: String,
}

pub(crate) fn parse_log_level(args: &[String]) -> LevelFilter {
    option_value(args, "--log-level")
        .map(|level_str| match level_str.to_uppercase().as_str() {
            "OFF" => LevelFilter::Off,
            "TRACE" => LevelFilter::Trace,
            "DEBUG" => LevelFilter::Debug,
            "INFO" => LevelFilter::Info,
            "WARN" => LevelFilter::Warn,
            "ERROR" => LevelFilter::Error,
            _ => LevelFilter::Info,
        })
        .unwrap_or(LevelFilter::Info)
}

/// Parse `[--port P] [--log-level L] <function> [argument]`. The first element of `args`
/// is the program name.
pub(crate) fn parse_invocation(args: &[String]) -> IoResult<Invocation> {
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if OPTIONS_WITH_VALUES.contains(&arg.as_str()) {
            iter.next();
        } else {
            positional.push(arg.clone());
        }
    }

    let mut positional = positional.into_iter();
    let function = positional
        .next()
        .ok_or_else(|| IoError::new(ErrorKind::InvalidInput, "No function name provided"))?;
    let argument = positional.next().unwrap_or_default();
    if let Some(extra) = positional.next() {
        return Err(IoError::new(
            ErrorKind::InvalidInput,
            format!("Unexpected argument: {}", extra),
        ));
    }

    Ok(Invocation {
        port: option_value(args, "--port").map(str::to_owned),
        function,
        argument,
    })
}

fn option_value<'a>(args: &'a [String], option: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == option)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
