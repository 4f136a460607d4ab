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

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! Hardware independent core of the load-cell scale node.
//!
//! Everything in here is generic over the sensor and the non-volatile store so it can be
//! driven by the firmware on target and by fakes in host tests. The flash backed store is
//! generic over the NOR flash for the same reason.

pub mod average;
pub mod calibration;
pub mod commands;
pub mod config;
pub mod flash_store;
pub mod node;
pub mod remote;
pub mod sensor;
pub mod settings;
pub mod store;
pub mod workflow;

pub use average::AverageWindow;
pub use calibration::{CalibrationError, CalibrationSettings, CalibrationState};
pub use commands::{PendingCommand, PendingCommands};
pub use flash_store::FlashEeprom;
pub use node::{CycleReport, Measurement, ScaleNode, StartupError};
pub use sensor::{LoadCellSensor, SensorError};
pub use store::{EepromImage, NvStore, StoreError};
pub use workflow::{
    CalibrationOutcome, CalibrationWorkflow, TareOutcome, WorkflowError, WorkflowState,
};

#[cfg(test)]
pub(crate) mod test_support;
