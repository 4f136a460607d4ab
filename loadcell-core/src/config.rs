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

/// Number of recent weights the smoothed reading is averaged over.
pub const AVERAGE_WINDOW_SIZE: usize = 4;

/// Raw samples averaged by the sensor for each tare or calibration.
pub const CALIBRATION_SAMPLE_COUNT: usize = 64;

/// Size in bytes of the emulated EEPROM region holding the settings.
pub const STORE_SIZE: usize = 100;

pub const DEFAULT_CALIBRATION_FACTOR: f32 = 1.0;
pub const DEFAULT_ZERO_OFFSET: i32 = 0;
