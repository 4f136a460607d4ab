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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Nothing answered on the bus at the sensor's address.
    NotDetected,
    BusError,
    /// The sensor did not finish its internal calibration or power up sequence.
    InitialisationFailed,
    /// Averaged acquisition did not complete in time.
    Timeout,
}

/// Load-cell amplifier giving signed raw ADC readings.
pub trait LoadCellSensor {
    /// True when a new conversion is waiting to be read.
    async fn is_ready(&mut self) -> Result<bool, SensorError>;

    /// Read the latest conversion.
    async fn read_raw(&mut self) -> Result<i32, SensorError>;

    /// Collect `sample_count` conversions and return their mean. Implementations bound the
    /// time this takes and return [`SensorError::Timeout`] when it runs out.
    async fn read_raw_averaged(&mut self, sample_count: usize) -> Result<i32, SensorError>;
}
