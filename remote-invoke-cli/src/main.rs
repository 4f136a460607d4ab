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

mod cbor_messaging;
mod util;

use crate::cbor_messaging::{receive_message, send_message};
use crate::util::{parse_invocation, parse_log_level};
use loadcell_messages::builder::NodeMessagesBuilder;
use loadcell_messages::{NodeMessages, MAX_MESSAGE_SIZE};
use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::process::ExitCode;
use std::time::Duration;

const BAUD_RATE: u32 = 115200;
const TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> IoResult<ExitCode> {
    let args: Vec<String> = std::env::args().collect();

    env_logger::Builder::from_default_env()
        .filter_level(parse_log_level(&args))
        .format_timestamp_millis()
        .init();

    let invocation = match parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            log::error!("{}", e);
            eprintln!(
                "Usage: remote-invoke-cli [--port <PORT>] [--log-level <LEVEL>] \
                 <calibrate <WEIGHT> | tare>"
            );
            return Ok(ExitCode::FAILURE);
        }
    };

    let port_name = match invocation.port {
        Some(port) => port,
        None => {
            let ports = serialport::available_ports()
                .map_err(|e| IoError::new(ErrorKind::Other, e.to_string()))?;
            for port in &ports {
                log::debug!("Found serial port {}", port.port_name);
            }
            match ports.into_iter().next() {
                Some(port) => port.port_name,
                None => {
                    log::error!("No serial ports found!");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    };

    log::info!("Connecting to: {}", port_name);
    let mut serial = serialport::new(&port_name, BAUD_RATE)
        .timeout(TIMEOUT)
        .open()
        .map_err(|e| IoError::new(ErrorKind::ConnectionRefused, e.to_string()))?;

    // Give device time to initialize
    std::thread::sleep(Duration::from_millis(100));

    let mut buffer = [0u8; MAX_MESSAGE_SIZE + 2];

    send_message(&mut serial, &NodeMessagesBuilder::new().hello())?;
    match receive_message::<NodeMessages>(&mut serial, &mut buffer)? {
        NodeMessages::HelloResp(hello_resp) => {
            let version = hello_resp.version;
            log::info!(
                "Node firmware version {}.{}.{}",
                version.major,
                version.minor,
                version.patch
            );
        }
        other => {
            log::error!("Expected HelloResp but got {:?}", other);
            return Ok(ExitCode::FAILURE);
        }
    }

    let call = NodeMessagesBuilder::new()
        .function_call()
        .name(&invocation.function)
        .argument(&invocation.argument)
        .build();
    log::debug!("Sending {:?}", call);
    send_message(&mut serial, &call)?;

    match receive_message::<NodeMessages>(&mut serial, &mut buffer)? {
        NodeMessages::FunctionResult(result) => {
            println!("{}", result.status);
            if result.status < 0 {
                log::error!("Node rejected {}", invocation.function);
                Ok(ExitCode::FAILURE)
            } else {
                log::info!(
                    "{} accepted, the result shows up in the node's log",
                    invocation.function
                );
                Ok(ExitCode::SUCCESS)
            }
        }
        other => {
            log::error!("Expected FunctionResult but got {:?}", other);
            Ok(ExitCode::FAILURE)
        }
    }
}
