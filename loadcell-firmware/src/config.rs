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

use core::ops::Range;
use embassy_time::Duration;

/// Pause between acquisition cycles.
pub const CYCLE_DELAY: Duration = Duration::from_millis(1500);

/// Upper bound on one averaged tare or calibration acquisition.
pub const ACQUISITION_TIMEOUT: Duration = Duration::from_secs(2);

/// Attempts to bring the sensor up before giving up.
pub const SENSOR_INIT_RETRIES: u32 = 5;
/// Delay after the first failed attempt, doubled after each further failure.
pub const SENSOR_INIT_BACKOFF: Duration = Duration::from_millis(100);

/// How often a node that failed to start repeats its error.
pub const PARKED_REPORT_INTERVAL: Duration = Duration::from_secs(10);

pub const LOAD_CELL_I2C_FREQUENCY: u32 = 400_000;

#[cfg(feature = "pico")]
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

const NVM_PARTITION_SIZE: u32 = 16 * 1024;

/// Flash reserved for settings, outside the program image (see memory.x).
pub const NVM_PARTITION: Range<u32> = (FLASH_SIZE as u32 - NVM_PARTITION_SIZE)..FLASH_SIZE as u32;

/// Area of the partition used for the settings map, relative to the partition start.
pub const SETTINGS_RANGE: Range<u32> = 0..NVM_PARTITION_SIZE;

pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x4005;
pub const USB_MANUFACTURER: &str = "Paul Hampson";
pub const USB_PRODUCT: &str = "Load Cell Scale Node";
